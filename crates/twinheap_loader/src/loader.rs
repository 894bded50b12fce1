//! # Object Loader
//!
//! Loads named objects into one heap of a frame allocator. A batch is all
//! or nothing: if any object fails, every allocation the batch made is
//! rolled back before the error is returned.

use twinheap_core::{FrameAllocator, FrameBlock, HeapSide};

use crate::error::{LoadError, LoadResult};
use crate::source::ObjectSource;

/// An object resident in frame memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedObject {
    /// Name the object was loaded under.
    pub name: String,
    /// Where its bytes live.
    pub block: FrameBlock,
}

/// Reads objects from a source into frame memory.
///
/// ## Usage
///
/// ```rust
/// use twinheap_core::{FrameAllocator, HeapSide};
/// use twinheap_loader::{MemorySource, ObjectLoader};
///
/// let source = MemorySource::new()
///     .with("CopCar", vec![1u8; 40])
///     .with("RobberCar", vec![2u8; 24]);
/// let loader = ObjectLoader::new(source);
/// let mut frames = FrameAllocator::new(1024, 16)?;
///
/// let cars = loader.load_batch(&mut frames, HeapSide::Upper, &["CopCar", "RobberCar"])?;
/// assert_eq!(frames.bytes(cars[1].block)?, &[2u8; 24]);
/// # Ok::<(), twinheap_loader::LoadError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ObjectLoader<S> {
    source: S,
}

impl<S: ObjectSource> ObjectLoader<S> {
    /// A loader reading from `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The underlying source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Loads one object into `heap`.
    ///
    /// On failure nothing stays allocated.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`], [`LoadError::EmptyObject`], a read error,
    /// or [`LoadError::Frame`] if the object does not fit.
    pub fn load(
        &self,
        frames: &mut FrameAllocator,
        heap: HeapSide,
        name: &str,
    ) -> LoadResult<LoadedObject> {
        let mut scope = frames.scope(heap);
        let object = self.load_into(&mut scope, heap, name)?;
        scope.commit();
        Ok(object)
    }

    /// Loads every object in `names` into `heap`, in order.
    ///
    /// # Errors
    ///
    /// The first failure. The heap is then exactly as it was before the
    /// call; objects loaded earlier in the batch are discarded.
    pub fn load_batch<N: AsRef<str>>(
        &self,
        frames: &mut FrameAllocator,
        heap: HeapSide,
        names: &[N],
    ) -> LoadResult<Vec<LoadedObject>> {
        let mut scope = frames.scope(heap);
        let mut loaded = Vec::with_capacity(names.len());

        for name in names {
            match self.load_into(&mut scope, heap, name.as_ref()) {
                Ok(object) => loaded.push(object),
                Err(err) => {
                    tracing::warn!(
                        object = name.as_ref(),
                        %heap,
                        discarded = loaded.len(),
                        %err,
                        "object batch rolled back"
                    );
                    scope.rollback()?;
                    return Err(err);
                }
            }
        }

        scope.commit();
        Ok(loaded)
    }

    fn load_into(
        &self,
        frames: &mut FrameAllocator,
        heap: HeapSide,
        name: &str,
    ) -> LoadResult<LoadedObject> {
        let size = self.source.size_of(name)?;
        if size == 0 {
            return Err(LoadError::EmptyObject(name.to_owned()));
        }

        let block = frames.allocate(heap, size)?;
        self.source.read_into(name, frames.bytes_mut(block)?)?;

        tracing::debug!(object = name, %heap, offset = block.offset(), size, "object loaded");
        Ok(LoadedObject {
            name: name.to_owned(),
            block,
        })
    }
}
