//! # TWINHEAP Core
//!
//! Fragmentation-free frame memory for real-time loops on fixed memory:
//! - One pool allocated at startup, nothing from the system after that
//! - O(1) allocation from either end of the pool
//! - O(1) bulk release back to any earlier checkpoint
//!
//! ## Architecture
//!
//! ```text
//! FrameAllocator
//! ├── MemoryPool   (one aligned block, owned for the allocator's lifetime)
//! └── DualHeap     (lower cursor ──►      ◄── upper cursor)
//!
//! FrameCheckpoint  (heap + saved cursor, released in stack order)
//! FrameScope       (checkpoint that rolls back on drop)
//! DomainPools      (system / texture / sound pools, MasterFrame across all)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use twinheap_core::{FrameAllocator, HeapSide};
//!
//! let mut frames = FrameAllocator::new(1024, 16)?;
//! let start = frames.capture(HeapSide::Lower);
//!
//! let a = frames.allocate(HeapSide::Lower, 100)?; // rounds to 112
//! let b = frames.allocate(HeapSide::Lower, 50)?;  // rounds to 64
//! assert_eq!((a.offset(), b.offset()), (0, 112));
//!
//! frames.release(start)?;
//! assert_eq!(frames.allocate(HeapSide::Lower, 10)?.offset(), 0);
//! # Ok::<(), twinheap_core::FrameError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod frame;
pub mod memory;
pub mod sync;

pub use config::{DomainConfig, FrameConfig};
pub use error::{FrameError, FrameResult};
pub use frame::{
    DomainPools, FrameAllocator, FrameBlock, FrameCheckpoint, FrameScope, FrameStats,
    MasterFrame, MemoryDomain,
};
pub use memory::{HeapSide, MemoryPool, PoolId};
pub use sync::SharedFrameAllocator;
