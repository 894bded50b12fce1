//! # Master Frames
//!
//! A console title typically splits memory into several independent
//! domains (system RAM, texture memory, sound memory), each with its own
//! frame allocator. A [`MasterFrame`] snapshots all of them at once so a
//! whole level can be unloaded with one call.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::allocator::{FrameAllocator, FrameStats};
use super::checkpoint::FrameCheckpoint;
use crate::config::DomainConfig;
use crate::error::FrameResult;
use crate::memory::HeapSide;

/// A memory domain with its own pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryDomain {
    /// General system memory.
    System,
    /// Texture memory.
    Texture,
    /// Sound memory.
    Sound,
}

impl MemoryDomain {
    /// All domains, system first. Master frames release them in reverse.
    pub const ALL: [Self; 3] = [Self::System, Self::Texture, Self::Sound];
}

impl fmt::Display for MemoryDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Texture => f.write_str("texture"),
            Self::Sound => f.write_str("sound"),
        }
    }
}

/// One checkpoint per memory domain, captured together.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a master frame is only reclaimed when it is released"]
pub struct MasterFrame {
    system: FrameCheckpoint,
    texture: FrameCheckpoint,
    sound: FrameCheckpoint,
}

impl MasterFrame {
    /// The checkpoint captured for `domain`.
    #[must_use]
    pub fn checkpoint(&self, domain: MemoryDomain) -> &FrameCheckpoint {
        match domain {
            MemoryDomain::System => &self.system,
            MemoryDomain::Texture => &self.texture,
            MemoryDomain::Sound => &self.sound,
        }
    }
}

/// A frame allocator per memory domain.
#[derive(Debug)]
pub struct DomainPools {
    system: FrameAllocator,
    texture: FrameAllocator,
    sound: FrameAllocator,
}

impl DomainPools {
    /// Creates every domain pool from `config`.
    ///
    /// # Errors
    ///
    /// The first configuration or initialization error of any domain.
    pub fn new(config: &DomainConfig) -> FrameResult<Self> {
        Ok(Self {
            system: FrameAllocator::from_config(&config.system)?,
            texture: FrameAllocator::from_config(&config.texture)?,
            sound: FrameAllocator::from_config(&config.sound)?,
        })
    }

    /// Allocator for `domain`.
    #[must_use]
    pub fn get(&self, domain: MemoryDomain) -> &FrameAllocator {
        match domain {
            MemoryDomain::System => &self.system,
            MemoryDomain::Texture => &self.texture,
            MemoryDomain::Sound => &self.sound,
        }
    }

    /// Mutable allocator for `domain`.
    #[must_use]
    pub fn get_mut(&mut self, domain: MemoryDomain) -> &mut FrameAllocator {
        match domain {
            MemoryDomain::System => &mut self.system,
            MemoryDomain::Texture => &mut self.texture,
            MemoryDomain::Sound => &mut self.sound,
        }
    }

    /// Captures `side` of every domain.
    pub fn capture_all(&self, side: HeapSide) -> MasterFrame {
        MasterFrame {
            system: self.system.capture(side),
            texture: self.texture.capture(side),
            sound: self.sound.capture(side),
        }
    }

    /// Releases every checkpoint of `frame`.
    ///
    /// All three are validated before any is released, so either every
    /// domain rolls back or none does. Validation runs even with the
    /// `unchecked-release` feature.
    ///
    /// # Errors
    ///
    /// The first validation error, in [`MemoryDomain::ALL`] order.
    pub fn release_all(&mut self, frame: MasterFrame) -> FrameResult<()> {
        for domain in MemoryDomain::ALL {
            self.get(domain).check_release(frame.checkpoint(domain))?;
        }
        let MasterFrame {
            system,
            texture,
            sound,
        } = frame;
        self.sound.release(sound)?;
        self.texture.release(texture)?;
        self.system.release(system)
    }

    /// Usage figures for `domain`.
    #[must_use]
    pub fn stats(&self, domain: MemoryDomain) -> FrameStats {
        self.get(domain).stats()
    }

    /// Releases every pool.
    pub fn shutdown(self) {
        self.sound.shutdown();
        self.texture.shutdown();
        self.system.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameConfig;
    use crate::error::FrameError;

    fn pools() -> DomainPools {
        DomainPools::new(&DomainConfig {
            system: FrameConfig::new(1024),
            texture: FrameConfig::new(4096),
            sound: FrameConfig::new(512),
        })
        .unwrap()
    }

    #[test]
    fn test_master_frame_rolls_back_every_domain() {
        let mut pools = pools();
        let level = pools.capture_all(HeapSide::Lower);

        for domain in MemoryDomain::ALL {
            pools.get_mut(domain).allocate(HeapSide::Lower, 200).unwrap();
        }
        assert_eq!(pools.stats(MemoryDomain::Texture).lower_used, 208);

        pools.release_all(level).unwrap();
        for domain in MemoryDomain::ALL {
            assert_eq!(pools.get(domain).cursor(HeapSide::Lower), 0);
        }
        pools.shutdown();
    }

    #[test]
    fn test_master_frame_release_is_all_or_nothing() {
        let mut pools = pools();
        let outer = pools.get(MemoryDomain::Sound).capture(HeapSide::Lower);
        pools
            .get_mut(MemoryDomain::System)
            .allocate(HeapSide::Lower, 16)
            .unwrap();
        pools
            .get_mut(MemoryDomain::Sound)
            .allocate(HeapSide::Lower, 16)
            .unwrap();
        let level = pools.capture_all(HeapSide::Lower);

        // Pop the sound pool below the master frame.
        pools.get_mut(MemoryDomain::Sound).release(outer).unwrap();
        pools
            .get_mut(MemoryDomain::System)
            .allocate(HeapSide::Lower, 32)
            .unwrap();

        let err = pools.release_all(level).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidFrameRelease {
                heap: HeapSide::Lower,
                ..
            }
        ));
        // System was not rolled back because sound failed validation.
        assert_eq!(pools.get(MemoryDomain::System).cursor(HeapSide::Lower), 48);
    }

    #[test]
    fn test_domain_names() {
        assert_eq!(MemoryDomain::Texture.to_string(), "texture");
    }
}
