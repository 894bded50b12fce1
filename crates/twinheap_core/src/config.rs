//! # Frame Pool Configuration
//!
//! Pool sizes are read from TOML once at startup.
//!
//! ```toml
//! # Single pool
//! capacity_bytes = 16777216
//! alignment = 16
//! ```
//!
//! ```toml
//! # One pool per memory domain
//! [system]
//! capacity_bytes = 33554432
//!
//! [texture]
//! capacity_bytes = 67108864
//! alignment = 256
//!
//! [sound]
//! capacity_bytes = 8388608
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::frame::MemoryDomain;

/// Size and alignment of one frame pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Pool size in bytes. Rounded up to a multiple of `alignment`.
    pub capacity_bytes: usize,
    /// Alignment of every allocation. Must be a power of two.
    pub alignment: usize,
}

impl FrameConfig {
    /// Default pool size: 16MB.
    pub const DEFAULT_CAPACITY: usize = 16 * 1024 * 1024;

    /// Default alignment, enough for SIMD vectors.
    pub const DEFAULT_ALIGNMENT: usize = 16;

    /// A pool of `capacity_bytes` with the default alignment.
    #[must_use]
    pub const fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            alignment: Self::DEFAULT_ALIGNMENT,
        }
    }

    /// Replaces the alignment.
    #[must_use]
    pub const fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Checks that the values describe a usable pool.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] if the alignment is not a power of two,
    /// the capacity is zero, or the aligned capacity overflows.
    pub fn validate(&self) -> FrameResult<()> {
        if !self.alignment.is_power_of_two() {
            return Err(FrameError::InvalidConfig(format!(
                "alignment {} is not a power of two",
                self.alignment
            )));
        }
        if self.capacity_bytes == 0 {
            return Err(FrameError::InvalidConfig("capacity_bytes must be non-zero".to_owned()));
        }
        if crate::memory::align_up(self.capacity_bytes, self.alignment).is_none() {
            return Err(FrameError::InvalidConfig(format!(
                "capacity_bytes {} overflows when aligned to {}",
                self.capacity_bytes, self.alignment
            )));
        }
        Ok(())
    }

    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> FrameResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| FrameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> FrameResult<Self> {
        Self::from_toml_str(&read_config(path.as_ref())?)
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// One [`FrameConfig`] per memory domain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainConfig {
    /// System memory pool.
    pub system: FrameConfig,
    /// Texture memory pool.
    pub texture: FrameConfig,
    /// Sound memory pool.
    pub sound: FrameConfig,
}

impl DomainConfig {
    /// Configuration of `domain`.
    #[must_use]
    pub const fn get(&self, domain: MemoryDomain) -> &FrameConfig {
        match domain {
            MemoryDomain::System => &self.system,
            MemoryDomain::Texture => &self.texture,
            MemoryDomain::Sound => &self.sound,
        }
    }

    /// Validates every domain.
    ///
    /// # Errors
    ///
    /// The first invalid domain, named in the message.
    pub fn validate(&self) -> FrameResult<()> {
        for domain in MemoryDomain::ALL {
            self.get(domain).validate().map_err(|e| match e {
                FrameError::InvalidConfig(msg) => {
                    FrameError::InvalidConfig(format!("[{domain}] {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Parses and validates a domain configuration.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> FrameResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| FrameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a domain configuration file.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> FrameResult<Self> {
        Self::from_toml_str(&read_config(path.as_ref())?)
    }
}

fn read_config(path: &Path) -> FrameResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| FrameError::InvalidConfig(format!("cannot read {}: {e}", path.display())))
}
