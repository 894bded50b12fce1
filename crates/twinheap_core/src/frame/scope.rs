//! # Frame Scope
//!
//! RAII guard around a checkpoint: everything allocated through the scope
//! is rolled back when it drops, unless the scope is committed.

use std::ops::{Deref, DerefMut};

use super::allocator::FrameAllocator;
use super::checkpoint::FrameCheckpoint;
use crate::error::FrameResult;
use crate::memory::HeapSide;

/// A frame that rolls itself back on drop.
///
/// ## Usage
///
/// ```rust
/// use twinheap_core::{FrameAllocator, HeapSide};
///
/// let mut frames = FrameAllocator::new(1024, 16)?;
/// {
///     let mut scope = frames.scope(HeapSide::Upper);
///     scope.allocate(HeapSide::Upper, 256)?;
///     // Dropped without commit: the 256 bytes are reclaimed.
/// }
/// assert_eq!(frames.free(), 1024);
///
/// let mut scope = frames.scope(HeapSide::Upper);
/// scope.allocate(HeapSide::Upper, 256)?;
/// scope.commit();
/// assert_eq!(frames.free(), 768);
/// # Ok::<(), twinheap_core::FrameError>(())
/// ```
pub struct FrameScope<'a> {
    allocator: &'a mut FrameAllocator,
    checkpoint: Option<FrameCheckpoint>,
    heap: HeapSide,
}

impl<'a> FrameScope<'a> {
    pub(crate) fn new(allocator: &'a mut FrameAllocator, heap: HeapSide) -> Self {
        let checkpoint = allocator.capture(heap);
        Self {
            allocator,
            checkpoint: Some(checkpoint),
            heap,
        }
    }

    /// Heap this scope guards.
    #[inline]
    #[must_use]
    pub fn heap(&self) -> HeapSide {
        self.heap
    }

    /// Keeps every allocation made in the scope.
    pub fn commit(mut self) {
        self.checkpoint = None;
    }

    /// Rolls the scope back now and reports the outcome.
    ///
    /// # Errors
    ///
    /// Whatever [`FrameAllocator::release`] reports, e.g. when an outer
    /// checkpoint on the same heap was released inside the scope.
    pub fn rollback(mut self) -> FrameResult<()> {
        match self.checkpoint.take() {
            Some(checkpoint) => self.allocator.release(checkpoint),
            None => Ok(()),
        }
    }
}

impl Deref for FrameScope<'_> {
    type Target = FrameAllocator;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.allocator
    }
}

impl DerefMut for FrameScope<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.allocator
    }
}

impl Drop for FrameScope<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            if let Err(err) = self.allocator.release(checkpoint) {
                tracing::error!(%err, heap = %self.heap, "frame scope rollback failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_rolls_back_on_drop() {
        let mut frames = FrameAllocator::new(512, 16).unwrap();
        frames.allocate(HeapSide::Lower, 32).unwrap();
        {
            let mut scope = frames.scope(HeapSide::Lower);
            scope.allocate(HeapSide::Lower, 100).unwrap();
            scope.allocate(HeapSide::Lower, 100).unwrap();
            assert_eq!(scope.cursor(HeapSide::Lower), 32 + 224);
        }
        assert_eq!(frames.cursor(HeapSide::Lower), 32);
    }

    #[test]
    fn test_commit_keeps_allocations() {
        let mut frames = FrameAllocator::new(512, 16).unwrap();
        let mut scope = frames.scope(HeapSide::Upper);
        let block = scope.allocate(HeapSide::Upper, 64).unwrap();
        scope.commit();
        assert!(frames.is_live(block));
        assert_eq!(frames.cursor(HeapSide::Upper), 448);
    }

    #[test]
    fn test_scope_only_rolls_back_its_own_heap() {
        let mut frames = FrameAllocator::new(512, 16).unwrap();
        {
            let mut scope = frames.scope(HeapSide::Lower);
            scope.allocate(HeapSide::Lower, 16).unwrap();
            scope.allocate(HeapSide::Upper, 16).unwrap();
        }
        assert_eq!(frames.cursor(HeapSide::Lower), 0);
        assert_eq!(frames.cursor(HeapSide::Upper), 496);
    }

    #[test]
    fn test_nested_scopes() {
        let mut frames = FrameAllocator::new(512, 16).unwrap();
        let mut outer = frames.scope(HeapSide::Lower);
        outer.allocate(HeapSide::Lower, 16).unwrap();
        {
            let mut inner = outer.scope(HeapSide::Lower);
            inner.allocate(HeapSide::Lower, 64).unwrap();
            inner.rollback().unwrap();
        }
        assert_eq!(outer.cursor(HeapSide::Lower), 16);
        outer.rollback().unwrap();
        assert_eq!(frames.cursor(HeapSide::Lower), 0);
    }
}
