use std::fmt;

use crate::{
    error::{Error, Result},
    observe::{Observer, Silent},
    owned_buf::OwnedBuf,
};

/// A customer with a name and some values.
///
/// Every special operation forwards member-wise, and the name buffer narrates what
/// happened through its observer (`COPY Mozart`, `MOVEASSIGN Mozart`, ...).
#[derive(Clone)]
pub struct Customer<O: Observer = Silent> {
    name: OwnedBuf<O>,
    values: Vec<i32>,
}

impl Customer {
    pub fn new(name: &str) -> Result<Customer> {
        Customer::new_in(name, Silent)
    }
}

impl<O: Observer> Customer<O> {
    pub fn new_in(name: &str, observer: O) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(Self {
            name: OwnedBuf::from_bytes_in(name.as_bytes(), observer)?,
            values: Vec::new(),
        })
    }

    /// Empty after the customer was moved from.
    pub fn name(&self) -> &OwnedBuf<O> {
        &self.name
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn add_value(&mut self, value: i32) {
        self.values.push(value);
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            name: self.name.try_clone()?,
            values: self.values.clone(),
        })
    }

    /// Moves name and values out, leaving an empty customer behind.
    pub fn take(&mut self) -> Self {
        Self {
            name: self.name.take(),
            values: std::mem::take(&mut self.values),
        }
    }

    /// On failure nothing changes: the values are copied first, and the name's copy
    /// assignment is itself all-or-nothing.
    pub fn copy_assign(&mut self, other: &Self) -> Result<()> {
        let values = other.values.clone();
        self.name.copy_assign(&other.name)?;
        self.values = values;
        Ok(())
    }

    pub fn move_assign(&mut self, other: &mut Self) {
        self.name.move_assign(&mut other.name);
        self.values = std::mem::take(&mut other.values);
    }
}

impl<O: Observer> fmt::Display for Customer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: ", self.name)?;
        for value in &self.values {
            write!(f, "{value} ")?;
        }
        f.write_str("]")
    }
}

impl<O: Observer> fmt::Debug for Customer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Customer")
            .field("name", &self.name)
            .field("values", &self.values)
            .finish()
    }
}
