//! # TWINHEAP Loader
//!
//! Loads named objects (models, textures, sound banks) from storage into
//! frame memory. Object bytes never touch the system allocator: each
//! object is sized, allocated on the chosen heap, and read in place.
//!
//! ## Loading a level
//!
//! ```rust
//! use twinheap_core::{FrameAllocator, HeapSide};
//! use twinheap_loader::{MemorySource, ObjectLoader};
//!
//! let loader = ObjectLoader::new(MemorySource::new().with("CopCar", vec![7u8; 100]));
//! let mut frames = FrameAllocator::new(1024, 16)?;
//!
//! let level = frames.capture(HeapSide::Lower);
//! let cop = loader.load(&mut frames, HeapSide::Lower, "CopCar")?;
//! assert_eq!(cop.block.len(), 100);
//!
//! // Unload the level.
//! frames.release(level)?;
//! assert_eq!(frames.free(), 1024);
//! # Ok::<(), twinheap_loader::LoadError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod loader;
pub mod source;

pub use error::{LoadError, LoadResult};
pub use loader::{LoadedObject, ObjectLoader};
pub use source::{DirectorySource, MemorySource, ObjectSource};
