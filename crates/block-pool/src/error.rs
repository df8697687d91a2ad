//! Error types for nebula-block-pool
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.
//!
//! Only construction, explicit growth and the typed [`PoolBox`] surface
//! report errors. [`BlockPool::allocate`] reports exhaustion as `None`,
//! and misuse of the unsafe release path (double free, foreign pointers,
//! use after reset) is not detected at all in release builds.
//!
//! [`PoolBox`]: crate::pool::PoolBox
//! [`BlockPool::allocate`]: crate::pool::BlockPool::allocate

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

/// Result alias used throughout the crate
pub type PoolResult<T> = core::result::Result<T, PoolError>;

// ============================================================================
// Main Error Type
// ============================================================================

/// Block pool errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // --- Construction Errors ---
    #[error("Invalid alignment: {alignment} (must be a non-zero power of two)")]
    InvalidAlignment { alignment: usize },

    #[error("Block size {block_size} is too small to hold a free-list link ({min} bytes)")]
    BlockTooSmall { block_size: usize, min: usize },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // --- Reservation Errors ---
    #[error("Out of memory: failed to reserve {size} bytes for a region aligned to {align}")]
    OutOfMemory { size: usize, align: usize },

    #[error("Size overflow during operation: {operation}")]
    SizeOverflow { operation: &'static str },

    // --- Growth Errors ---
    #[error("Pool growth is disabled by configuration")]
    GrowthDisabled,

    #[error("Pool reached its configured block limit ({limit})")]
    CapacityLimit { limit: usize },

    // --- Typed View Errors ---
    #[error(
        "Value layout ({size} bytes, align {align}) does not fit a block ({block_size} bytes, align {alignment})"
    )]
    LayoutMismatch {
        size: usize,
        align: usize,
        block_size: usize,
        alignment: usize,
    },

    #[error("Pool exhausted after growth (total blocks: {total_blocks})")]
    Exhausted { total_blocks: usize },
}

impl PoolError {
    /// Check if error is retryable
    ///
    /// Reservation failures and exhaustion may clear up once other blocks
    /// are released; configuration and layout errors never do.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OutOfMemory { .. } | Self::CapacityLimit { .. } | Self::Exhausted { .. }
        )
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAlignment { .. } => "POOL:CONFIG:ALIGN",
            Self::BlockTooSmall { .. } => "POOL:CONFIG:BLOCK_SIZE",
            Self::InvalidConfig { .. } => "POOL:CONFIG:INVALID",
            Self::OutOfMemory { .. } => "POOL:REGION:OOM",
            Self::SizeOverflow { .. } => "POOL:REGION:OVERFLOW",
            Self::GrowthDisabled => "POOL:GROW:DISABLED",
            Self::CapacityLimit { .. } => "POOL:GROW:LIMIT",
            Self::LayoutMismatch { .. } => "POOL:BOX:LAYOUT",
            Self::Exhausted { .. } => "POOL:BOX:EXHAUSTED",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create block too small error
    pub fn block_too_small(block_size: usize) -> Self {
        Self::BlockTooSmall {
            block_size,
            min: core::mem::size_of::<*mut u8>(),
        }
    }

    /// Create invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create out of memory error
    pub fn out_of_memory(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "Backing region reservation failed");

        Self::OutOfMemory { size, align }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        Self::SizeOverflow { operation }
    }

    /// Create capacity limit error
    pub fn capacity_limit(limit: usize) -> Self {
        Self::CapacityLimit { limit }
    }

    /// Create layout mismatch error for a value of type `T`
    pub fn layout_mismatch<T>(block_size: usize, alignment: usize) -> Self {
        Self::LayoutMismatch {
            size: core::mem::size_of::<T>(),
            align: core::mem::align_of::<T>(),
            block_size,
            alignment,
        }
    }

    /// Create exhausted error
    pub fn exhausted(total_blocks: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(total_blocks, "Block pool exhausted");

        Self::Exhausted { total_blocks }
    }
}
