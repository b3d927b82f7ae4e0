//! Error types for chunkcache

use std::fmt;

/// Result type alias for chunkcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache construction and routing
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Chunk size tag is neither the small nor the large class
    UnsupportedChunkClass(u32),

    /// Split fraction outside `[0, 1]`
    InvalidSplit(f64),

    /// A partition would end up unable to hold a single entry
    ZeroCapacity {
        /// Chunk size of the empty partition
        chunk_size: u32,
        /// Budget (in size units) that was assigned to it
        budget: u64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedChunkClass(tag) => {
                write!(f, "Unsupported chunk class: {} (expected 8 or 64)", tag)
            }
            Error::InvalidSplit(fraction) => {
                write!(f, "Capacity misconfiguration: split fraction {} not in [0, 1]", fraction)
            }
            Error::ZeroCapacity { chunk_size, budget } => write!(
                f,
                "Capacity misconfiguration: budget of {} units holds no {}-unit chunk",
                budget, chunk_size
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let msg = Error::UnsupportedChunkClass(16).to_string();
        assert!(msg.contains("16"));

        let msg = Error::ZeroCapacity { chunk_size: 64, budget: 10 }.to_string();
        assert!(msg.contains("64-unit"));
    }
}
