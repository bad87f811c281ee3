//! Instrumentation for [`OwnedBuf`](crate::OwnedBuf) lifetimes.
//!
//! The buffer never prints anything itself. Whoever wants to see copies, moves and
//! releases hands an [`Observer`] to the constructor and every derived instance (copies,
//! moved-into values) carries a clone of it along.

use std::cell::Cell;

use tracing::{debug, trace};

/// Something that happened to an owned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Fresh storage of `bytes` bytes (terminator included) was obtained.
    Allocated { bytes: usize },
    /// Storage of `bytes` bytes was given back.
    Released { bytes: usize },
    /// A deep copy of `len` content bytes was made.
    Copied { len: usize },
    /// Ownership of `len` content bytes changed hands without copying.
    Moved { len: usize },
    CopyAssigned { len: usize },
    MoveAssigned { len: usize },
}

/// Hook invoked around buffer lifecycle operations.
///
/// Clones of an observer must share whatever state they keep, since a copy of a buffer
/// reports through a clone of its source's observer.
pub trait Observer: Clone {
    /// Called before `bytes` bytes are requested from the allocator. Returning `false`
    /// turns the request into an allocation failure.
    fn admit(&self, bytes: usize) -> bool {
        let _ = bytes;
        true
    }

    /// Called after `event`, with the content that the event concerned.
    fn notify(&self, event: Event, content: &[u8]);
}

/// Observes nothing. This is the default observer and has no runtime cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Silent;

impl Observer for Silent {
    #[inline]
    fn notify(&self, _event: Event, _content: &[u8]) {}
}

/// Narrates every event through `tracing`.
///
/// Copies and moves are reported at `DEBUG` in the classic `COPY abc` / `MOVE abc` form,
/// allocations and releases at `TRACE`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traced;

impl Observer for Traced {
    fn notify(&self, event: Event, content: &[u8]) {
        let content = String::from_utf8_lossy(content);
        match event {
            Event::Allocated { bytes } => trace!(bytes, "ALLOC {content}"),
            Event::Released { bytes } => trace!(bytes, "FREE {content}"),
            Event::Copied { len } => debug!(len, "COPY {content}"),
            Event::Moved { len } => debug!(len, "MOVE {content}"),
            Event::CopyAssigned { len } => debug!(len, "COPYASSIGN {content}"),
            Event::MoveAssigned { len } => debug!(len, "MOVEASSIGN {content}"),
        }
    }
}

/// Counts allocations, releases and copy/move activity.
///
/// Meant to be shared by reference (`&AllocStats` is itself an observer). Counters are
/// plain cells, so a single instance must stay on one thread.
#[derive(Debug, Default)]
pub struct AllocStats {
    allocations: Cell<usize>,
    releases: Cell<usize>,
    live_bytes: Cell<usize>,
    copies: Cell<usize>,
    moves: Cell<usize>,
    assignments: Cell<usize>,
}

impl AllocStats {
    pub fn new() -> AllocStats {
        AllocStats::default()
    }

    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// Allocations that have not been released yet.
    pub fn live(&self) -> usize {
        self.allocations.get() - self.releases.get()
    }

    pub fn live_bytes(&self) -> usize {
        self.live_bytes.get()
    }

    pub fn copies(&self) -> usize {
        self.copies.get()
    }

    pub fn moves(&self) -> usize {
        self.moves.get()
    }

    /// Copy and move assignments combined.
    pub fn assignments(&self) -> usize {
        self.assignments.get()
    }
}

impl Observer for &AllocStats {
    fn notify(&self, event: Event, _content: &[u8]) {
        let bump = |cell: &Cell<usize>| cell.set(cell.get() + 1);
        match event {
            Event::Allocated { bytes } => {
                bump(&self.allocations);
                self.live_bytes.set(self.live_bytes.get() + bytes);
            }
            Event::Released { bytes } => {
                bump(&self.releases);
                self.live_bytes.set(self.live_bytes.get() - bytes);
            }
            Event::Copied { .. } => bump(&self.copies),
            Event::Moved { .. } => bump(&self.moves),
            Event::CopyAssigned { .. } | Event::MoveAssigned { .. } => bump(&self.assignments),
        }
    }
}

/// Caps the number of live bytes that buffers observed by it may hold.
///
/// Requests that would push the total past the limit are refused, which surfaces as
/// [`Error::AllocationFailure`](crate::Error::AllocationFailure). Released bytes return
/// to the budget.
#[derive(Debug)]
pub struct Budget {
    limit: usize,
    used: Cell<usize>,
}

impl Budget {
    pub fn new(limit: usize) -> Budget {
        Budget {
            limit,
            used: Cell::new(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.used.get()
    }
}

impl Observer for &Budget {
    fn admit(&self, bytes: usize) -> bool {
        self.used
            .get()
            .checked_add(bytes)
            .is_some_and(|total| total <= self.limit)
    }

    fn notify(&self, event: Event, _content: &[u8]) {
        match event {
            Event::Allocated { bytes } => self.used.set(self.used.get() + bytes),
            Event::Released { bytes } => self.used.set(self.used.get() - bytes),
            _ => {}
        }
    }
}

/// Both observers see every event; an allocation needs both to admit it.
impl<A: Observer, B: Observer> Observer for (A, B) {
    fn admit(&self, bytes: usize) -> bool {
        self.0.admit(bytes) && self.1.admit(bytes)
    }

    fn notify(&self, event: Event, content: &[u8]) {
        self.0.notify(event, content);
        self.1.notify(event, content);
    }
}
