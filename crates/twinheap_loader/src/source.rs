//! # Object Sources
//!
//! Where object bytes come from. A source answers two questions: how big
//! is an object, and copy it into this buffer.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use crate::error::{LoadError, LoadResult};

/// A named-object store the loader can read from.
pub trait ObjectSource {
    /// Size of `name` in bytes.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] if there is no such object, or an I/O error.
    fn size_of(&self, name: &str) -> LoadResult<usize>;

    /// Copies `name` into `dest`, which is exactly `size_of(name)` bytes.
    ///
    /// # Errors
    ///
    /// [`LoadError::SizeMismatch`] if `dest` is the wrong size, or an I/O error.
    fn read_into(&self, name: &str, dest: &mut [u8]) -> LoadResult<()>;
}

impl<S: ObjectSource + ?Sized> ObjectSource for &S {
    fn size_of(&self, name: &str) -> LoadResult<usize> {
        (**self).size_of(name)
    }

    fn read_into(&self, name: &str, dest: &mut [u8]) -> LoadResult<()> {
        (**self).read_into(name, dest)
    }
}

/// Objects stored as files in one directory.
///
/// Object names are relative paths below the root; names that would
/// escape it (absolute paths, `..`) are reported as not found.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// A source reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory objects are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> LoadResult<PathBuf> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if contained {
            Ok(self.root.join(relative))
        } else {
            Err(LoadError::NotFound(name.to_owned()))
        }
    }
}

impl ObjectSource for DirectorySource {
    fn size_of(&self, name: &str) -> LoadResult<usize> {
        let path = self.resolve(name)?;
        let metadata = std::fs::metadata(&path).map_err(|e| LoadError::from_io(name, e))?;
        if !metadata.is_file() {
            return Err(LoadError::NotFound(name.to_owned()));
        }
        usize::try_from(metadata.len()).map_err(|_| LoadError::Io {
            name: name.to_owned(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "object larger than the address space",
            ),
        })
    }

    fn read_into(&self, name: &str, dest: &mut [u8]) -> LoadResult<()> {
        let expected = self.size_of(name)?;
        if expected != dest.len() {
            return Err(LoadError::SizeMismatch {
                name: name.to_owned(),
                expected,
                actual: dest.len(),
            });
        }
        let mut file = File::open(self.resolve(name)?).map_err(|e| LoadError::from_io(name, e))?;
        file.read_exact(dest).map_err(|e| LoadError::from_io(name, e))
    }
}

/// Objects held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    objects: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an object.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.insert(name.into(), bytes.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the source holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectSource for MemorySource {
    fn size_of(&self, name: &str) -> LoadResult<usize> {
        self.objects
            .get(name)
            .map(Vec::len)
            .ok_or_else(|| LoadError::NotFound(name.to_owned()))
    }

    fn read_into(&self, name: &str, dest: &mut [u8]) -> LoadResult<()> {
        let bytes = self
            .objects
            .get(name)
            .ok_or_else(|| LoadError::NotFound(name.to_owned()))?;
        if bytes.len() != dest.len() {
            return Err(LoadError::SizeMismatch {
                name: name.to_owned(),
                expected: bytes.len(),
                actual: dest.len(),
            });
        }
        dest.copy_from_slice(bytes);
        Ok(())
    }
}
