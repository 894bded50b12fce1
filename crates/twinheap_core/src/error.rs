//! # Frame Allocator Error Types
//!
//! All errors that can occur while initializing, allocating from, or
//! rolling back a frame allocator.

use thiserror::Error;

use crate::memory::{HeapSide, PoolId};

/// Errors that can occur in the frame allocator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The backing pool could not be created.
    #[error("frame pool initialization failed ({capacity} bytes, {alignment}-byte alignment): {reason}")]
    InitializationFailure {
        /// Requested capacity in bytes.
        capacity: usize,
        /// Requested alignment in bytes.
        alignment: usize,
        /// Why the pool could not be created.
        reason: String,
    },

    /// Configuration could not be read or failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request would make the two heaps overlap.
    #[error("out of frame memory on {heap} heap: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Heap the allocation was made on.
        heap: HeapSide,
        /// Requested size in bytes (before alignment rounding).
        requested: usize,
        /// Free bytes between the two cursors.
        available: usize,
    },

    /// A checkpoint was released out of stack order, or reused.
    #[error("invalid frame release on {heap} heap: checkpoint at offset {saved}, cursor at offset {cursor}")]
    InvalidFrameRelease {
        /// Heap the checkpoint was captured on.
        heap: HeapSide,
        /// Offset saved in the checkpoint.
        saved: usize,
        /// Current cursor offset of the heap.
        cursor: usize,
    },

    /// A checkpoint or block was handed to a pool that did not produce it.
    #[error("checkpoint belongs to pool {found}, not pool {expected}")]
    ForeignCheckpoint {
        /// Pool the operation was issued against.
        expected: PoolId,
        /// Pool recorded in the checkpoint or block.
        found: PoolId,
    },

    /// A block was accessed after the frame containing it was released.
    #[error("block at offset {offset} ({len} bytes) on {heap} heap is no longer allocated")]
    StaleBlock {
        /// Heap the block was allocated on.
        heap: HeapSide,
        /// Block offset from the pool base.
        offset: usize,
        /// Block length in bytes.
        len: usize,
    },

    /// Frame memory cannot be viewed as the requested element type.
    #[error("cannot view frame memory as {type_name}: {reason}")]
    TypeMismatch {
        /// Name of the element type.
        type_name: &'static str,
        /// Why the view is not possible.
        reason: String,
    },
}

/// Result type for frame allocator operations.
pub type FrameResult<T> = Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_heap() {
        let err = FrameError::OutOfMemory {
            heap: HeapSide::Upper,
            requested: 32,
            available: 16,
        };
        assert_eq!(
            err.to_string(),
            "out of frame memory on upper heap: requested 32 bytes, 16 available"
        );

        let err = FrameError::InvalidFrameRelease {
            heap: HeapSide::Lower,
            saved: 16,
            cursor: 0,
        };
        assert!(err.to_string().contains("lower heap"));
    }
}
