use anyhow::Result;
use clap::{Parser, Subcommand};
use lifetime_semantics_demo::{customer_values, grow_container, move_out, rule_of_five, Traced};
use tracing::Level;

#[derive(Parser)]
#[command(name = "lifetime-demo")]
#[command(about = "Walks through copy, move and release of owned buffers")]
#[command(version)]
struct Cli {
    /// Most verbose narration to show: `debug` shows copies and moves, `trace` adds
    /// every allocation and release
    #[arg(long, global = true, default_value_t = Level::DEBUG)]
    log_level: Level,

    #[command(subcommand)]
    demo: Demo,
}

#[derive(Subcommand, Clone, Copy)]
enum Demo {
    /// Copy construction and copy assignment of C strings
    RuleOfFive,
    /// Moving out of a buffer leaves it empty
    MoveOut,
    /// Filling and growing a vector of buffers
    Containers,
    /// Copying, moving and assigning a customer
    Customer,
    /// Every demo in turn
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .without_time()
        .init();

    match cli.demo {
        Demo::RuleOfFive => run_rule_of_five(),
        Demo::MoveOut => run_move_out(),
        Demo::Containers => run_containers(),
        Demo::Customer => run_customer(),
        Demo::All => {
            run_rule_of_five()?;
            run_move_out()?;
            run_containers()?;
            run_customer()
        }
    }
}

fn run_rule_of_five() -> Result<()> {
    rule_of_five(Traced)?;
    Ok(())
}

fn run_move_out() -> Result<()> {
    move_out(Traced)?;
    Ok(())
}

fn run_containers() -> Result<()> {
    let v = grow_container(Traced)?;
    println!("holding {} strings", v.len());
    Ok(())
}

fn run_customer() -> Result<()> {
    customer_values(Traced)?;
    Ok(())
}
