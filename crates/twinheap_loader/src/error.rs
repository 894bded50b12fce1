//! # Loader Error Types
//!
//! Everything that can stop an object from reaching frame memory.

use std::io;

use thiserror::Error;
use twinheap_core::FrameError;

/// Errors that can occur while loading objects.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source has no object with this name.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The object exists but holds no bytes.
    #[error("object {0} is empty")]
    EmptyObject(String),

    /// The destination does not match the object's size.
    #[error("object {name} is {expected} bytes, destination holds {actual}")]
    SizeMismatch {
        /// Object name.
        name: String,
        /// Size reported by the source.
        expected: usize,
        /// Size of the destination block.
        actual: usize,
    },

    /// Reading the object failed.
    #[error("failed to read object {name}: {source}")]
    Io {
        /// Object name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Frame memory could not hold the object.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl LoadError {
    /// Wraps an I/O error, mapping `NotFound` to [`LoadError::NotFound`].
    #[must_use]
    pub fn from_io(name: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(name.to_owned())
        } else {
            Self::Io {
                name: name.to_owned(),
                source,
            }
        }
    }
}

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;
