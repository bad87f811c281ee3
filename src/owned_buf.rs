//! A heap-allocated, NUL-terminated byte string with exactly one owner.
//!
//! This is the "rule of five" object spelled out by hand: construction, deep copy, move,
//! copy assignment, move assignment and release. Rust already moves values by memcpy
//! and forbids using the source afterwards, so [`OwnedBuf::take`] exists for the other
//! kind of move, the one that leaves a valid, empty value behind.

use std::{
    alloc::{handle_alloc_error, Layout},
    ffi::CStr,
    fmt,
    ops::Deref,
};

use crate::{
    error::{Error, Result},
    observe::{Event, Observer, Silent},
};

/// An exclusively owned C-style string.
///
/// Either no storage at all (the empty sentinel) or a boxed slice of `len() + 1` bytes
/// whose last byte is NUL. No two instances ever share storage.
pub struct OwnedBuf<O: Observer = Silent> {
    // `None` is the sentinel. `Some` is never shorter than one byte.
    data: Option<Box<[u8]>>,
    observer: O,
}

impl OwnedBuf {
    /// The empty sentinel. Does not allocate.
    pub const fn new() -> OwnedBuf {
        OwnedBuf {
            data: None,
            observer: Silent,
        }
    }

    /// Copies `bytes` into fresh storage and appends a terminator.
    pub fn from_bytes(bytes: &[u8]) -> Result<OwnedBuf> {
        OwnedBuf::from_bytes_in(bytes, Silent)
    }

    pub fn from_c_str(s: &CStr) -> Result<OwnedBuf> {
        OwnedBuf::from_c_str_in(s, Silent)
    }

    /// A buffer of `count` zero bytes (plus the terminator).
    pub fn zeroed(count: usize) -> Result<OwnedBuf> {
        OwnedBuf::zeroed_in(count, Silent)
    }
}

impl<O: Observer> OwnedBuf<O> {
    pub fn new_in(observer: O) -> Self {
        Self {
            data: None,
            observer,
        }
    }

    /// Copies `bytes` into fresh storage of `bytes.len() + 1` bytes. Interior NULs are
    /// kept; only [`as_c_str`](Self::as_c_str) stops at them.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if the observer refuses the request or the allocator
    /// cannot satisfy it. Nothing is allocated in that case.
    pub fn from_bytes_in(bytes: &[u8], observer: O) -> Result<Self> {
        let storage = allocate(bytes.len(), &observer, |v| v.extend_from_slice(bytes))?;
        Ok(Self::adopt(storage, observer))
    }

    /// Measures `s` up to its terminator and copies it.
    pub fn from_c_str_in(s: &CStr, observer: O) -> Result<Self> {
        Self::from_bytes_in(s.to_bytes(), observer)
    }

    pub fn zeroed_in(count: usize, observer: O) -> Result<Self> {
        let storage = allocate(count, &observer, |v| v.resize(count, 0))?;
        Ok(Self::adopt(storage, observer))
    }

    fn adopt(storage: Box<[u8]>, observer: O) -> Self {
        let bytes = storage.len();
        let this = Self {
            data: Some(storage),
            observer,
        };
        this.observer
            .notify(Event::Allocated { bytes }, this.as_bytes());
        this
    }

    /// Number of content bytes, terminator excluded.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |data| data.len() - 1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this instance owns storage. `false` only for the sentinel; an empty string
    /// built with [`from_bytes`](OwnedBuf::from_bytes) still owns its terminator.
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The content bytes. The view borrows `self`, so it cannot outlive the buffer or
    /// survive a [`take`](Self::take).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            Some(data) => &data[..data.len() - 1],
            None => &[],
        }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.data {
            Some(data) => {
                let len = data.len() - 1;
                &mut data[..len]
            }
            None => &mut [],
        }
    }

    /// The content bytes followed by the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        match &self.data {
            Some(data) => &data[..],
            None => b"\0",
        }
    }

    /// The content as a C string, cut short at the first interior NUL if there is one.
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(self.as_bytes_with_nul()).unwrap_or_default()
    }

    /// Deep copy into fresh storage sized from the known length. `self` is untouched.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`], under the same conditions as construction.
    pub fn try_clone(&self) -> Result<Self> {
        let copy = self.duplicate(self.observer.clone())?;
        copy.observer
            .notify(Event::Copied { len: copy.len() }, copy.as_bytes());
        Ok(copy)
    }

    fn duplicate(&self, observer: O) -> Result<Self> {
        match self.data {
            Some(_) => Self::from_bytes_in(self.as_bytes(), observer),
            None => Ok(Self::new_in(observer)),
        }
    }

    /// Moves the content out, leaving the sentinel behind. Never allocates, never fails.
    pub fn take(&mut self) -> Self {
        let moved = self.take_quiet();
        moved
            .observer
            .notify(Event::Moved { len: moved.len() }, moved.as_bytes());
        moved
    }

    fn take_quiet(&mut self) -> Self {
        Self {
            data: self.data.take(),
            observer: self.observer.clone(),
        }
    }

    /// Exchanges contents (and observers) with `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Replaces the content of `self` with a copy of `other`'s.
    ///
    /// The copy is made before anything is released, so on failure `self` is exactly as
    /// it was. The previous storage is released before this returns.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if the copy cannot be made.
    pub fn copy_assign(&mut self, other: &Self) -> Result<()> {
        let mut replacement = other.duplicate(self.observer.clone())?;
        self.swap(&mut replacement);
        drop(replacement);
        self.observer
            .notify(Event::CopyAssigned { len: self.len() }, self.as_bytes());
        Ok(())
    }

    /// Takes over `other`'s content, leaving `other` as the sentinel. Whatever `self`
    /// owned before is released right away.
    pub fn move_assign(&mut self, other: &mut Self) {
        let previous = std::mem::replace(self, other.take_quiet());
        drop(previous);
        self.observer
            .notify(Event::MoveAssigned { len: self.len() }, self.as_bytes());
    }
}

impl<O: Observer> Drop for OwnedBuf<O> {
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            let bytes = data.len();
            self.observer
                .notify(Event::Released { bytes }, &data[..bytes - 1]);
        }
    }
}

/// Reserves exactly `len + 1` bytes, lets `fill` write `len` of them and terminates.
fn allocate<O: Observer>(
    len: usize,
    observer: &O,
    fill: impl FnOnce(&mut Vec<u8>),
) -> Result<Box<[u8]>> {
    let size = len.checked_add(1).ok_or_else(|| Error::alloc(len))?;
    if !observer.admit(size) {
        return Err(Error::alloc(size));
    }
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(size)
        .map_err(|e| Error::reserve(size, e))?;
    fill(&mut storage);
    storage.push(0);
    Ok(storage.into_boxed_slice())
}

/// Allocator failures go to `handle_alloc_error`; a refusal by the observer (or a size
/// that overflowed) only panics, so it can still be caught.
fn alloc_failed(err: Error) -> ! {
    match err {
        Error::AllocationFailure {
            requested,
            source: Some(_),
        } => match Layout::array::<u8>(requested) {
            Ok(layout) => handle_alloc_error(layout),
            Err(_) => panic!("capacity overflow"),
        },
        err => panic!("{err}"),
    }
}

/// Like `Vec`, an infallible clone treats allocation failure as fatal. Use
/// [`OwnedBuf::try_clone`] under a [`Budget`](crate::Budget).
impl<O: Observer> Clone for OwnedBuf<O> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => alloc_failed(err),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.copy_assign(source) {
            alloc_failed(err)
        }
    }
}

impl<O: Observer + Default> Default for OwnedBuf<O> {
    fn default() -> Self {
        Self::new_in(O::default())
    }
}

impl<O: Observer> Deref for OwnedBuf<O> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<O: Observer> AsRef<[u8]> for OwnedBuf<O> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<O: Observer, P: Observer> PartialEq<OwnedBuf<P>> for OwnedBuf<O> {
    fn eq(&self, other: &OwnedBuf<P>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<O: Observer> Eq for OwnedBuf<O> {}

impl<O: Observer> fmt::Debug for OwnedBuf<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedBuf")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

impl<O: Observer> fmt::Display for OwnedBuf<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl TryFrom<&CStr> for OwnedBuf {
    type Error = Error;

    fn try_from(value: &CStr) -> Result<Self> {
        OwnedBuf::from_c_str(value)
    }
}

impl TryFrom<&str> for OwnedBuf {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        OwnedBuf::from_bytes(value.as_bytes())
    }
}
