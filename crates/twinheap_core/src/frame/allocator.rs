//! # Frame Allocator
//!
//! A [`MemoryPool`] plus a [`DualHeap`]: allocation bumps one of two
//! cursors, and releasing a [`FrameCheckpoint`] moves it back in O(1).

use std::ptr::NonNull;

use bytemuck::Pod;

use super::checkpoint::{FrameBlock, FrameCheckpoint};
use super::scope::FrameScope;
use crate::config::FrameConfig;
use crate::error::{FrameError, FrameResult};
use crate::memory::{DualHeap, HeapSide, MemoryPool, PoolId};

/// Snapshot of pool usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Pool capacity in bytes.
    pub capacity: usize,
    /// Alignment every allocation is rounded to.
    pub alignment: usize,
    /// Bytes allocated on the lower heap.
    pub lower_used: usize,
    /// Bytes allocated on the upper heap.
    pub upper_used: usize,
    /// Bytes free between the two cursors.
    pub free: usize,
    /// Highest `lower_used + upper_used` since creation or the last reset.
    pub peak_used: usize,
}

/// Dual-heap frame allocator over one pre-allocated pool.
///
/// # Thread Safety
///
/// Not internally synchronized. Use one allocator per thread, or share one
/// through [`SharedFrameAllocator`](crate::SharedFrameAllocator).
///
/// # Example
///
/// ```rust
/// use twinheap_core::{FrameAllocator, HeapSide};
///
/// let mut frames = FrameAllocator::new(1024, 16)?;
///
/// let frame = frames.capture(HeapSide::Lower);
/// let block = frames.allocate(HeapSide::Lower, 100)?;
/// frames.bytes_mut(block)?.fill(0xAB);
///
/// // Throw away everything allocated since the capture.
/// frames.release(frame)?;
/// assert_eq!(frames.cursor(HeapSide::Lower), 0);
/// # Ok::<(), twinheap_core::FrameError>(())
/// ```
#[derive(Debug)]
pub struct FrameAllocator {
    pool: MemoryPool,
    heap: DualHeap,
}

impl FrameAllocator {
    /// Creates an allocator over a fresh pool of `capacity_bytes`
    /// (rounded up to `alignment`).
    ///
    /// # Errors
    ///
    /// [`FrameError::InitializationFailure`] if the pool cannot be created.
    pub fn new(capacity_bytes: usize, alignment: usize) -> FrameResult<Self> {
        let pool = MemoryPool::new(capacity_bytes, alignment)?;
        let heap = DualHeap::new(pool.capacity(), pool.alignment());
        Ok(Self { pool, heap })
    }

    /// Creates an allocator from a validated configuration.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] if the configuration fails validation,
    /// or [`FrameError::InitializationFailure`] if the pool cannot be created.
    pub fn from_config(config: &FrameConfig) -> FrameResult<Self> {
        config.validate()?;
        Self::new(config.capacity_bytes, config.alignment)
    }

    /// Releases the pool. Outstanding checkpoints and blocks become
    /// foreign to every later allocator.
    pub fn shutdown(self) {
        self.pool.shutdown();
    }

    /// Identity of the underlying pool.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.pool.id()
    }

    /// Pool capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Alignment of every allocation.
    #[inline]
    #[must_use]
    pub const fn alignment(&self) -> usize {
        self.pool.alignment()
    }

    /// Address of the first byte of the pool.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> NonNull<u8> {
        self.pool.base()
    }

    /// Current cursor of `side`, as an offset from the base.
    #[inline]
    #[must_use]
    pub const fn cursor(&self, side: HeapSide) -> usize {
        self.heap.cursor(side)
    }

    /// Bytes free between the two cursors.
    #[inline]
    #[must_use]
    pub const fn free(&self) -> usize {
        self.heap.free()
    }

    /// Allocates `bytes` (rounded up to the alignment) from `side`.
    ///
    /// The returned memory is not cleared; it may hold bytes from frames
    /// that were rolled back. Use [`allocate_zeroed`](Self::allocate_zeroed)
    /// when that matters.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfMemory`] if the two heaps would overlap. Nothing
    /// changes in that case.
    pub fn allocate(&mut self, side: HeapSide, bytes: usize) -> FrameResult<FrameBlock> {
        match self.heap.bump(side, bytes) {
            Ok((offset, reserved)) => Ok(FrameBlock::new(side, offset, bytes, reserved, self.id())),
            Err(err) => {
                tracing::debug!(pool = %self.id(), %err, "frame allocation failed");
                Err(err)
            }
        }
    }

    /// Like [`allocate`](Self::allocate), but clears the block.
    ///
    /// # Errors
    ///
    /// [`FrameError::OutOfMemory`] if the two heaps would overlap.
    pub fn allocate_zeroed(&mut self, side: HeapSide, bytes: usize) -> FrameResult<FrameBlock> {
        let block = self.allocate(side, bytes)?;
        self.bytes_mut(block)?.fill(0);
        Ok(block)
    }

    /// Allocates room for `count` values of `T`.
    ///
    /// # Errors
    ///
    /// [`FrameError::TypeMismatch`] if `T` is zero-sized or needs more
    /// alignment than the pool provides, [`FrameError::OutOfMemory`] if the
    /// request does not fit.
    pub fn allocate_slice<T: Pod>(
        &mut self,
        side: HeapSide,
        count: usize,
    ) -> FrameResult<FrameBlock> {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return Err(type_mismatch::<T>("zero-sized types cannot be allocated".to_owned()));
        }
        if std::mem::align_of::<T>() > self.alignment() {
            return Err(type_mismatch::<T>(format!(
                "needs {}-byte alignment, pool provides {}",
                std::mem::align_of::<T>(),
                self.alignment()
            )));
        }
        let bytes = size.checked_mul(count).ok_or(FrameError::OutOfMemory {
            heap: side,
            requested: usize::MAX,
            available: self.free(),
        })?;
        self.allocate(side, bytes)
    }

    /// Snapshots the cursor of `side`.
    #[inline]
    pub fn capture(&self, side: HeapSide) -> FrameCheckpoint {
        FrameCheckpoint::new(side, self.heap.cursor(side), self.id())
    }

    /// Checks whether `checkpoint` could be released right now, without
    /// releasing it.
    ///
    /// # Errors
    ///
    /// [`FrameError::ForeignCheckpoint`] if it came from another pool,
    /// [`FrameError::InvalidFrameRelease`] if its saved cursor is ahead of
    /// the current one.
    pub fn check_release(&self, checkpoint: &FrameCheckpoint) -> FrameResult<()> {
        self.check_pool(checkpoint.pool())?;
        let heap = checkpoint.heap();
        if !self.heap.can_rewind(heap, checkpoint.saved_offset()) {
            return Err(FrameError::InvalidFrameRelease {
                heap,
                saved: checkpoint.saved_offset(),
                cursor: self.heap.cursor(heap),
            });
        }
        Ok(())
    }

    /// Rolls the checkpoint's heap back to the saved cursor, reclaiming
    /// every allocation made on that heap since the capture.
    ///
    /// With the `unchecked-release` feature the stack-order check is skipped
    /// (debug builds still assert it). The pool identity is always checked,
    /// and the cursors never cross or leave the pool.
    ///
    /// # Errors
    ///
    /// See [`check_release`](Self::check_release). With `unchecked-release`
    /// only [`FrameError::ForeignCheckpoint`] is reported. The cursor is
    /// untouched on error.
    pub fn release(&mut self, checkpoint: FrameCheckpoint) -> FrameResult<()> {
        let checked = if cfg!(feature = "unchecked-release") {
            debug_assert!(
                self.heap.can_rewind(checkpoint.heap(), checkpoint.saved_offset()),
                "frame released out of stack order"
            );
            self.check_pool(checkpoint.pool())
        } else {
            self.check_release(&checkpoint)
        };
        if let Err(err) = checked {
            tracing::error!(pool = %self.id(), %err, "frame release rejected");
            return Err(err);
        }

        tracing::trace!(
            pool = %self.id(),
            heap = %checkpoint.heap(),
            offset = checkpoint.saved_offset(),
            "frame released"
        );
        self.heap.rewind(checkpoint.heap(), checkpoint.saved_offset());
        Ok(())
    }

    /// Captures a checkpoint on `side` that is released when the returned
    /// scope is dropped, unless [`FrameScope::commit`] is called.
    pub fn scope(&mut self, side: HeapSide) -> FrameScope<'_> {
        FrameScope::new(self, side)
    }

    /// Returns both heaps to empty. Every outstanding block becomes stale.
    pub fn reset(&mut self) {
        self.heap.reset();
    }

    /// Address of the first byte of `block`.
    ///
    /// # Errors
    ///
    /// [`FrameError::ForeignCheckpoint`] if the block came from another pool.
    pub fn block_ptr(&self, block: FrameBlock) -> FrameResult<NonNull<u8>> {
        self.check_pool(block.pool())?;
        Ok(self.pool.ptr_at(block.offset()))
    }

    /// Whether `block` still lies inside the allocated region of its heap.
    #[must_use]
    pub fn is_live(&self, block: FrameBlock) -> bool {
        if block.pool() != self.id() {
            return false;
        }
        match block.heap() {
            HeapSide::Lower => block
                .offset()
                .checked_add(block.len())
                .is_some_and(|end| end <= self.heap.cursor(HeapSide::Lower)),
            HeapSide::Upper => block.offset() >= self.heap.cursor(HeapSide::Upper),
        }
    }

    /// The bytes of a live block.
    ///
    /// # Errors
    ///
    /// [`FrameError::ForeignCheckpoint`] for blocks of another pool,
    /// [`FrameError::StaleBlock`] once the block's frame has been released.
    pub fn bytes(&self, block: FrameBlock) -> FrameResult<&[u8]> {
        self.check_live(block)?;
        self.pool
            .bytes(block.offset(), block.len())
            .ok_or_else(|| stale(block))
    }

    /// Mutable bytes of a live block.
    ///
    /// # Errors
    ///
    /// Same as [`bytes`](Self::bytes).
    pub fn bytes_mut(&mut self, block: FrameBlock) -> FrameResult<&mut [u8]> {
        self.check_live(block)?;
        self.pool
            .bytes_mut(block.offset(), block.len())
            .ok_or_else(|| stale(block))
    }

    /// A live block viewed as a slice of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`bytes`](Self::bytes), plus [`FrameError::TypeMismatch`] if
    /// the block's size or address does not fit `T`.
    pub fn slice<T: Pod>(&self, block: FrameBlock) -> FrameResult<&[T]> {
        bytemuck::try_cast_slice(self.bytes(block)?)
            .map_err(|e| type_mismatch::<T>(format!("{e:?}")))
    }

    /// A live block viewed as a mutable slice of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`slice`](Self::slice).
    pub fn slice_mut<T: Pod>(&mut self, block: FrameBlock) -> FrameResult<&mut [T]> {
        bytemuck::try_cast_slice_mut(self.bytes_mut(block)?)
            .map_err(|e| type_mismatch::<T>(format!("{e:?}")))
    }

    /// Current usage figures.
    #[must_use]
    pub const fn stats(&self) -> FrameStats {
        FrameStats {
            capacity: self.heap.capacity(),
            alignment: self.heap.alignment(),
            lower_used: self.heap.used(HeapSide::Lower),
            upper_used: self.heap.used(HeapSide::Upper),
            free: self.heap.free(),
            peak_used: self.heap.peak_used(),
        }
    }

    fn check_pool(&self, found: PoolId) -> FrameResult<()> {
        if found == self.id() {
            Ok(())
        } else {
            Err(FrameError::ForeignCheckpoint {
                expected: self.id(),
                found,
            })
        }
    }

    fn check_live(&self, block: FrameBlock) -> FrameResult<()> {
        self.check_pool(block.pool())?;
        if self.is_live(block) {
            Ok(())
        } else {
            Err(stale(block))
        }
    }
}

fn stale(block: FrameBlock) -> FrameError {
    FrameError::StaleBlock {
        heap: block.heap(),
        offset: block.offset(),
        len: block.len(),
    }
}

fn type_mismatch<T>(reason: String) -> FrameError {
    FrameError::TypeMismatch {
        type_name: std::any::type_name::<T>(),
        reason,
    }
}
