//! # Checkpoints and Blocks
//!
//! The two values a frame allocator hands out: a [`FrameCheckpoint`] to
//! roll a heap back, and a [`FrameBlock`] describing one allocation.

use crate::memory::{HeapSide, PoolId};

/// A saved cursor position on one heap.
///
/// Releasing the checkpoint rolls the heap back to this position,
/// reclaiming everything allocated on that heap since the capture.
/// Checkpoints are consumed by release and cannot be copied, so the same
/// checkpoint can never be released twice.
///
/// ## Stack discipline
///
/// ```text
/// let c1 = capture(Lower);     // cursor = 0
/// allocate(Lower, 16);         // cursor = 16
/// let c2 = capture(Lower);     // cursor = 16
/// release(c1);                 // cursor = 0   (OK, also discards c2's frame)
/// release(c2);                 // ERROR: 16 is ahead of the cursor
/// ```
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a frame is only reclaimed when its checkpoint is released"]
pub struct FrameCheckpoint {
    heap: HeapSide,
    saved: usize,
    pool: PoolId,
}

impl FrameCheckpoint {
    pub(crate) const fn new(heap: HeapSide, saved: usize, pool: PoolId) -> Self {
        Self { heap, saved, pool }
    }

    /// Heap this checkpoint was captured on.
    #[inline]
    #[must_use]
    pub const fn heap(&self) -> HeapSide {
        self.heap
    }

    /// Cursor offset at capture time.
    #[inline]
    #[must_use]
    pub const fn saved_offset(&self) -> usize {
        self.saved
    }

    /// Pool this checkpoint was captured from.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }
}

/// One allocation made from a frame allocator.
///
/// A block is a plain description (offset and length); it does not borrow
/// the allocator. Its bytes are reached through
/// [`FrameAllocator::bytes_mut`](super::FrameAllocator::bytes_mut), which
/// refuses blocks whose frame has been released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameBlock {
    heap: HeapSide,
    offset: usize,
    len: usize,
    reserved: usize,
    pool: PoolId,
}

impl FrameBlock {
    pub(crate) const fn new(
        heap: HeapSide,
        offset: usize,
        len: usize,
        reserved: usize,
        pool: PoolId,
    ) -> Self {
        Self {
            heap,
            offset,
            len,
            reserved,
            pool,
        }
    }

    /// Heap the block was allocated on.
    #[inline]
    #[must_use]
    pub const fn heap(&self) -> HeapSide {
        self.heap
    }

    /// Offset of the first byte from the pool base.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Requested length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the block holds no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the allocation consumed, rounded up to the pool alignment.
    #[inline]
    #[must_use]
    pub const fn reserved(&self) -> usize {
        self.reserved
    }

    /// Pool the block was allocated from.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> PoolId {
        self.pool
    }
}
