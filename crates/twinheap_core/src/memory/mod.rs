//! # Memory Management
//!
//! The raw pool and the two cursors that carve it up.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once at startup. After that:
//! - No system allocations
//! - No per-allocation bookkeeping
//! - Predictable, flat latency
//!
//! ```text
//! base                                                       base + capacity
//!  │                                                                      │
//!  ▼                                                                      ▼
//!  ┌──────────────────────┬───────────────────────┬───────────────────────┐
//!  │  lower heap  ──────► │         free          │ ◄──────  upper heap   │
//!  └──────────────────────┴───────────────────────┴───────────────────────┘
//!                         ▲                       ▲
//!                   lower cursor             upper cursor
//! ```

mod heap;
mod pool;

pub use heap::{align_up, DualHeap, HeapSide};
pub use pool::{MemoryPool, PoolId};
