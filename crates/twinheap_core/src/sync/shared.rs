//! # Shared Frame Allocator
//!
//! `Arc<Mutex<FrameAllocator>>` with a narrower API.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::frame::FrameAllocator;

/// A frame allocator behind one lock, cloneable across threads.
///
/// ## Usage
///
/// ```rust
/// use twinheap_core::{FrameAllocator, HeapSide, SharedFrameAllocator};
///
/// let shared = SharedFrameAllocator::new(FrameAllocator::new(4096, 16)?);
/// let worker = shared.clone();
///
/// std::thread::spawn(move || {
///     worker.with(|frames| frames.allocate(HeapSide::Upper, 128).map(|_| ()))
/// })
/// .join()
/// .unwrap()?;
///
/// assert_eq!(shared.lock().stats().upper_used, 128);
/// # Ok::<(), twinheap_core::FrameError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SharedFrameAllocator {
    inner: Arc<Mutex<FrameAllocator>>,
}

impl SharedFrameAllocator {
    /// Wraps `allocator`.
    #[must_use]
    pub fn new(allocator: FrameAllocator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    /// Locks the allocator for a sequence of calls.
    ///
    /// Checkpoints captured under one guard may be released under another;
    /// the stack discipline spans the whole allocator, not the guard.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, FrameAllocator> {
        self.inner.lock()
    }

    /// Runs `f` with the allocator locked.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut FrameAllocator) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Takes the allocator back if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other handles exist.
    pub fn try_unwrap(self) -> Result<FrameAllocator, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
