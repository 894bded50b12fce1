//! # Memory Pool
//!
//! One contiguous, aligned block obtained from the system allocator at
//! startup and returned to it at shutdown.

// SAFETY: This module owns a raw allocation and hands out views into it.
// Every unsafe block is bounds-checked against the pool capacity first.
#![allow(unsafe_code)]

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use super::heap::align_up;
use crate::error::{FrameError, FrameResult};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a pool.
///
/// Checkpoints and blocks record the pool they came from so that handing
/// them to a different pool (or to a pool re-created after shutdown) is
/// detected instead of corrupting the cursors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The backing block of a frame allocator.
///
/// The whole block is zeroed once at creation, so every byte is
/// initialized for the lifetime of the pool.
///
/// # Thread Safety
///
/// The pool is `Send` but not `Sync`. Use one pool per thread or wrap the
/// owning allocator in a mutex.
pub struct MemoryPool {
    block: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    alignment: usize,
    id: PoolId,
}

impl MemoryPool {
    /// Allocates a pool of at least `capacity_bytes`, rounded up to a
    /// multiple of `alignment`, whose base is aligned to `alignment`.
    ///
    /// # Errors
    ///
    /// [`FrameError::InitializationFailure`] if `alignment` is not a power
    /// of two, the rounded size overflows, or the system allocator fails.
    pub fn new(capacity_bytes: usize, alignment: usize) -> FrameResult<Self> {
        let failure = |reason: String| FrameError::InitializationFailure {
            capacity: capacity_bytes,
            alignment,
            reason,
        };

        if !alignment.is_power_of_two() {
            return Err(failure("alignment must be a power of two".to_owned()));
        }
        let capacity = align_up(capacity_bytes, alignment)
            .ok_or_else(|| failure("capacity overflows when aligned".to_owned()))?;

        // A zero-capacity pool still owns one aligned unit so the layout is never empty.
        let layout = Layout::from_size_align(capacity.max(alignment), alignment)
            .map_err(|e| failure(e.to_string()))?;

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let block = NonNull::new(raw)
            .ok_or_else(|| failure("system allocator returned null".to_owned()))?;

        let pool = Self {
            block,
            layout,
            capacity,
            alignment,
            id: PoolId::next(),
        };
        tracing::info!(
            pool = %pool.id,
            capacity = pool.capacity,
            alignment = pool.alignment,
            "frame pool initialized"
        );
        Ok(pool)
    }

    /// Returns the block to the system allocator.
    pub fn shutdown(self) {
        drop(self);
    }

    /// Identity of this pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Usable capacity in bytes (a multiple of the alignment).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alignment of the base and of every allocation.
    #[inline]
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// Address of the first byte of the pool.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> NonNull<u8> {
        self.block
    }

    /// Address `offset` bytes past the base.
    ///
    /// # Panics
    ///
    /// Panics if `offset > capacity`.
    #[inline]
    #[must_use]
    pub fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.capacity, "offset {offset} outside pool");
        // SAFETY: offset is within (or one past) the allocated block.
        unsafe { NonNull::new_unchecked(self.block.as_ptr().add(offset)) }
    }

    /// Shared view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range leaves the pool.
    #[must_use]
    pub fn bytes(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        // SAFETY: the range is inside the block, which is fully initialized,
        // and the returned borrow is tied to `&self`.
        Some(unsafe { std::slice::from_raw_parts(self.block.as_ptr().add(offset), len) })
    }

    /// Mutable view of `len` bytes starting at `offset`.
    ///
    /// Returns `None` if the range leaves the pool.
    #[must_use]
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> Option<&mut [u8]> {
        let end = offset.checked_add(len)?;
        if end > self.capacity {
            return None;
        }
        // SAFETY: the range is inside the block, which is fully initialized,
        // and the returned borrow is tied to `&mut self`, so it is unique.
        Some(unsafe { std::slice::from_raw_parts_mut(self.block.as_ptr().add(offset), len) })
    }
}

impl Drop for MemoryPool {
    fn drop(&mut self) {
        // SAFETY: `block` was allocated in `new` with exactly this layout.
        unsafe {
            dealloc(self.block.as_ptr(), self.layout);
        }
        tracing::info!(pool = %self.id, "frame pool released");
    }
}

impl fmt::Debug for MemoryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPool")
            .field("id", &self.id)
            .field("base", &self.block)
            .field("capacity", &self.capacity)
            .field("alignment", &self.alignment)
            .finish()
    }
}

// SAFETY: MemoryPool exclusively owns its block; nothing else aliases it.
unsafe impl Send for MemoryPool {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_rounds_capacity_and_aligns_base() {
        for alignment in [1, 2, 8, 16, 64, 4096] {
            let pool = MemoryPool::new(100, alignment).unwrap();
            assert_eq!(pool.capacity() % alignment, 0);
            assert!(pool.capacity() >= 100);
            assert_eq!(pool.base().as_ptr() as usize % alignment, 0);
        }
    }

    #[test]
    fn test_pool_rejects_bad_alignment() {
        for alignment in [0, 3, 24] {
            let err = MemoryPool::new(1024, alignment).unwrap_err();
            assert!(matches!(err, FrameError::InitializationFailure { .. }));
        }
    }

    #[test]
    fn test_pool_rejects_overflowing_capacity() {
        let err = MemoryPool::new(usize::MAX, 16).unwrap_err();
        assert!(matches!(err, FrameError::InitializationFailure { .. }));
    }

    #[test]
    fn test_pool_ids_are_unique() {
        let a = MemoryPool::new(64, 16).unwrap();
        let b = MemoryPool::new(64, 16).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_pool_views_are_bounds_checked() {
        let mut pool = MemoryPool::new(64, 16).unwrap();
        assert!(pool.bytes(0, 64).is_some());
        assert!(pool.bytes(48, 17).is_none());
        assert!(pool.bytes(usize::MAX, 2).is_none());

        pool.bytes_mut(8, 4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(pool.bytes(8, 4).unwrap(), &[1, 2, 3, 4]);
        assert!(pool.bytes(0, 8).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_capacity_pool() {
        let pool = MemoryPool::new(0, 16).unwrap();
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.ptr_at(0), pool.base());
    }
}
