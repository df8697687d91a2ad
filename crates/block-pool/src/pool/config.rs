//! Block pool configuration

use crate::error::{PoolError, PoolResult};

/// Configuration for [`BlockPool`](super::BlockPool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for blocks handed out by `allocate` (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for released blocks (for debugging)
    pub dealloc_pattern: Option<u8>,

    /// Grow the pool when the free list runs dry
    pub growable: bool,

    /// Upper bound on total blocks growth may reach
    pub max_blocks: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
            growable: true,
            max_blocks: None,
        }
    }
}

impl PoolConfig {
    /// Production configuration - no fill patterns, no statistics
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            growable: true,
            max_blocks: None,
        }
    }

    /// Debug configuration - statistics and fill patterns always on
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
            growable: true,
            max_blocks: None,
        }
    }

    /// Fixed-capacity configuration - never grows past the initial capacity
    #[must_use]
    pub fn fixed() -> Self {
        Self {
            growable: false,
            ..Self::production()
        }
    }

    /// Caps growth at `max_blocks` total blocks
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    /// Checks the configuration against the initial capacity
    pub fn validate(&self, initial_capacity: usize) -> PoolResult<()> {
        match self.max_blocks {
            Some(0) => Err(PoolError::invalid_config("max_blocks must be non-zero")),
            Some(limit) if initial_capacity > limit => Err(PoolError::invalid_config(format!(
                "initial capacity {initial_capacity} exceeds max_blocks {limit}"
            ))),
            _ => Ok(()),
        }
    }
}
