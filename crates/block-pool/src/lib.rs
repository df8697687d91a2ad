//! # nebula-block-pool
//!
//! Fixed-size block pool allocator for the Nebula ecosystem.
//!
//! A [`BlockPool`] reserves one contiguous region, slices it into equally
//! sized, aligned blocks and threads the free ones into an intrusive LIFO
//! list. Allocation and release are O(1) pointer swaps behind a spin lock,
//! so the pool can be shared between threads. When the free list runs dry
//! the pool reserves another region for the added blocks and keeps the old
//! ones alive, so blocks handed out earlier never move.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_block_pool::prelude::*;
//!
//! // Raw blocks: 32 bytes each, 8 of them, 16-byte aligned
//! let pool = BlockPool::new(32, 8, 16)?;
//! let block = pool.allocate().expect("pool can grow");
//! assert_eq!(block.as_ptr() as usize % 16, 0);
//! // SAFETY: block came from this pool and is released exactly once
//! unsafe { pool.deallocate(block) };
//!
//! // Typed values with automatic release
//! let nodes = BlockPool::for_type::<(u32, u64)>(4)?;
//! let node = PoolBox::new_in((7, 42), &nodes)?;
//! assert_eq!(node.1, 42);
//! # Ok::<(), PoolError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured events through `tracing`
//!
//! ## Caller obligations
//!
//! Exhaustion is an expected outcome and shows up as `None` from
//! [`BlockPool::allocate`]. Releasing a block twice, releasing a foreign
//! pointer, or touching blocks after [`BlockPool::reset`] are contract
//! violations; they are `unsafe` to express and are not detected in
//! release builds.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::perf)]
#![warn(clippy::pedantic)]
#![warn(rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
// Precision loss in usize -> f64 casts is acceptable for stats
#![allow(clippy::cast_precision_loss)]
// Free-list links are read through pointers cast from u8 blocks on purpose
#![allow(clippy::cast_ptr_alignment)]

// Error types
pub mod error;

// Core modules
pub mod lock;
pub mod pool;
pub mod utils;

// Re-export core types for convenience
pub use crate::error::{PoolError, PoolResult};
pub use crate::lock::{SpinLock, SpinLockGuard};
pub use crate::pool::{BlockPool, DEFAULT_ALIGNMENT, PoolBox, PoolConfig, PoolStats};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::error::{PoolError, PoolResult};
    pub use crate::pool::{BlockPool, PoolBox, PoolConfig, PoolStats};
}
