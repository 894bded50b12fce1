//! # Shared Access
//!
//! The frame allocator has no internal synchronization. Callers that need
//! it on more than one thread serialize every call through one lock:
//!
//! ```text
//! Thread 1 (Logic):    lock ──► capture/allocate ──► unlock
//! Thread 2 (Loader):   lock ──► allocate/release ──► unlock
//! ```
//!
//! One mutex guards the whole allocator, so cursors and checkpoints are
//! never observed half-updated.

mod shared;

pub use shared::SharedFrameAllocator;
