mod customer;
mod error;
mod observe;
mod owned_buf;

pub use customer::Customer;
pub use error::{Error, Result};
pub use observe::{AllocStats, Budget, Event, Observer, Silent, Traced};
pub use owned_buf::OwnedBuf;

/// Copy construction and copy assignment. Prints `abc abc def abc`, then every buffer is
/// released at the end of the scope, in reverse order of construction.
pub fn rule_of_five<O: Observer>(observer: O) -> Result<String> {
    let o1 = OwnedBuf::from_bytes_in(b"abc", observer)?;
    let o2 = o1.try_clone()?;
    let mut o3 = OwnedBuf::from_bytes_in(b"def", o1.observer().clone())?;
    let before = format!("{o1} {o2} {o3}");
    o3.copy_assign(&o2)?;
    let line = format!("{before} {o3}");
    println!("{line}");
    Ok(line)
}

/// Moving out of `p` leaves it empty but perfectly usable. Returns what `q` and `p` hold
/// afterwards.
pub fn move_out<O: Observer>(observer: O) -> Result<(String, String)> {
    let mut p = OwnedBuf::from_bytes_in(b"abc", observer)?;
    let q = p.take();
    println!("q: {q:?}, p: {p:?}");
    Ok((q.to_string(), p.to_string()))
}

/// Fills a vector with room for three strings: a copy of `s`, a temporary built from
/// `s`, and finally `s` itself, which is no longer needed and so gets moved.
pub fn create_and_insert<O: Observer>(observer: O) -> Result<Vec<OwnedBuf<O>>> {
    let mut coll = Vec::with_capacity(3);
    let mut s = OwnedBuf::from_bytes_in(b"data", observer)?;

    coll.push(s.try_clone()?);
    // The temporary is moved into the vector without another copy.
    coll.push(OwnedBuf::from_bytes_in(
        &[s.as_bytes(), s.as_bytes()].concat(),
        s.observer().clone(),
    )?);
    coll.push(s.take());

    Ok(coll)
}

/// Growing past capacity relocates the buffers by plain memcpy, so no buffer storage is
/// allocated, copied or released while the vector grows.
pub fn grow_container<O: Observer>(observer: O) -> Result<Vec<OwnedBuf<O>>> {
    let mut v = create_and_insert(observer)?;
    let extra = OwnedBuf::from_bytes_in(b"more", v[0].observer().clone())?;
    println!("size: {}, capacity: {}", v.len(), v.capacity());
    v.push(extra);
    println!("size: {}, capacity: {}", v.len(), v.capacity());
    for buf in &v {
        print!("{buf} ");
    }
    println!();
    Ok(v)
}

/// The customer walk-through: build, copy, move, assign.
pub fn customer_values<O: Observer>(observer: O) -> Result<String> {
    let mut c = Customer::new_in("Wolfgang Amadeus Mozart", observer)?;
    for value in [42, 77, 13] {
        c.add_value(value);
    }
    println!("c: {c}");

    let mut customers = Vec::new();
    customers.push(c.try_clone()?);
    customers.push(c.take());
    println!("c after move: {c}");

    let mut other = Customer::new_in("Joseph Haydn", c.name().observer().clone())?;
    other.copy_assign(&customers[0])?;
    c.move_assign(&mut other);

    let line = customers
        .iter()
        .chain([&c])
        .map(|customer| customer.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(line)
}
