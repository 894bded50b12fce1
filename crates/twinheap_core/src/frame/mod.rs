//! # Frames
//!
//! Checkpoint/rollback on top of the dual heap.
//!
//! ## Lifecycle
//!
//! ```text
//! init ──► capture ──► allocate* ──┬──► keep        ──► capture ...
//!                                  └──► release ──► (heap as it was at capture)
//! ... ──► shutdown
//! ```
//!
//! Checkpoints on one heap form a stack: release them in the reverse order
//! of capture. Releasing an older checkpoint also discards every younger
//! one; releasing a younger one afterwards is an error.

mod allocator;
mod checkpoint;
mod master;
mod scope;

pub use allocator::{FrameAllocator, FrameStats};
pub use checkpoint::{FrameBlock, FrameCheckpoint};
pub use master::{DomainPools, MasterFrame, MemoryDomain};
pub use scope::FrameScope;
