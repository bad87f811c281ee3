use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Storage for `requested` bytes could not be obtained. `source` is absent when the
    /// observer refused the allocation or the size itself overflowed.
    #[error("could not allocate {requested} bytes")]
    AllocationFailure {
        requested: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    #[error("customer name must not be empty")]
    EmptyName,
}

impl Error {
    pub(crate) fn alloc(requested: usize) -> Error {
        Error::AllocationFailure {
            requested,
            source: None,
        }
    }

    pub(crate) fn reserve(requested: usize, source: TryReserveError) -> Error {
        Error::AllocationFailure {
            requested,
            source: Some(source),
        }
    }

    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Error::AllocationFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
