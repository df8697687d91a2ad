//! Block pool implementation
//!
//! A pool of fixed-size blocks with an intrusive free list guarded by a
//! spin lock. Provides O(1) allocation/deallocation and grows on demand.
//!
//! ## Modules
//! - `allocator` - Main `BlockPool` implementation
//! - `config` - Configuration variants (production, debug, fixed)
//! - `pool_box` - RAII smart pointer for pool-allocated values
//! - `region` - Backing regions and free-chain slicing
//! - `stats` - Statistics snapshot type

pub mod allocator;
pub mod config;
pub mod pool_box;
mod region;
pub mod stats;

pub use allocator::{BlockPool, DEFAULT_ALIGNMENT};
pub use config::PoolConfig;
pub use pool_box::PoolBox;
pub use stats::PoolStats;
