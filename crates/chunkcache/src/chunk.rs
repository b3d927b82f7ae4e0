//! Chunk classes and their fixed sizes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of a small chunk, in size units
pub const SMALL_CHUNK_SIZE: u32 = 8;

/// Size of a large chunk, in size units
pub const LARGE_CHUNK_SIZE: u32 = 64;

/// Which partition a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkClass {
    /// 8-unit chunks, held in the LRU partition
    Small,
    /// 64-unit chunks, held in the hybrid partition
    Large,
}

impl ChunkClass {
    /// Both classes, small first
    pub const ALL: [ChunkClass; 2] = [ChunkClass::Small, ChunkClass::Large];

    /// Resolve a raw chunk size tag
    pub fn from_size(size: u32) -> Result<Self> {
        match size {
            SMALL_CHUNK_SIZE => Ok(ChunkClass::Small),
            LARGE_CHUNK_SIZE => Ok(ChunkClass::Large),
            other => Err(Error::UnsupportedChunkClass(other)),
        }
    }

    /// Fixed chunk size of this class
    pub fn size(self) -> u32 {
        match self {
            ChunkClass::Small => SMALL_CHUNK_SIZE,
            ChunkClass::Large => LARGE_CHUNK_SIZE,
        }
    }
}

impl TryFrom<u32> for ChunkClass {
    type Error = Error;

    fn try_from(size: u32) -> Result<Self> {
        ChunkClass::from_size(size)
    }
}

impl fmt::Display for ChunkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkClass::Small => write!(f, "small({})", SMALL_CHUNK_SIZE),
            ChunkClass::Large => write!(f, "large({})", LARGE_CHUNK_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size() {
        assert_eq!(ChunkClass::from_size(8), Ok(ChunkClass::Small));
        assert_eq!(ChunkClass::try_from(64), Ok(ChunkClass::Large));
        assert_eq!(ChunkClass::from_size(16), Err(Error::UnsupportedChunkClass(16)));
        assert_eq!(ChunkClass::from_size(0), Err(Error::UnsupportedChunkClass(0)));
    }

    #[test]
    fn test_size_matches_tag() {
        for class in ChunkClass::ALL {
            assert_eq!(ChunkClass::from_size(class.size()), Ok(class));
        }
    }
}
