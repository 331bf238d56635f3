use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// Default chunk size used when nothing else is configured
pub const DEFAULT_CHUNK_SIZE: usize = 2;

/// Number of elements per chunk; always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ChunkSize(NonZeroUsize);

impl ChunkSize {
    /// Chunk size of one element
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    /// Create a chunk size, rejecting zero
    pub fn new(size: usize) -> Result<Self> {
        Self::try_from(size)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl From<NonZeroUsize> for ChunkSize {
    fn from(size: NonZeroUsize) -> Self {
        Self(size)
    }
}

impl From<ChunkSize> for u64 {
    fn from(size: ChunkSize) -> Self {
        size.get() as u64
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! impl_chunk_size_try_from {
    ($($ty:ty),* $(,)?) => {$(
        impl TryFrom<$ty> for ChunkSize {
            type Error = ChunkerError;

            fn try_from(value: $ty) -> Result<Self> {
                usize::try_from(value)
                    .ok()
                    .and_then(NonZeroUsize::new)
                    .map(Self)
                    .ok_or_else(|| {
                        ChunkerError::invalid_argument(format!(
                            "chunk_size must be >= 1, got {value}"
                        ))
                    })
            }
        }
    )*};
}

impl_chunk_size_try_from!(i32, i64, isize, u32, u64, usize);

/// Configuration for chunking behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum number of elements per chunk
    pub chunk_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkerConfig {
    /// One chunk per source element
    pub fn single() -> Self {
        Self { chunk_size: 1 }
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Validated chunk size
    pub fn chunk_size(&self) -> Result<ChunkSize> {
        ChunkSize::new(self.chunk_size)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.chunk_size().map(|_| ())
    }
}
