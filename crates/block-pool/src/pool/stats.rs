//! Block pool statistics

/// Point-in-time snapshot of a [`BlockPool`](super::BlockPool)
///
/// All fields are read under the pool lock, so they are mutually
/// consistent. Allocation counters only move when
/// [`PoolConfig::track_stats`](super::PoolConfig::track_stats) is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Requested size of each block
    pub block_size: usize,
    /// Distance between consecutive blocks (block size rounded up to the alignment)
    pub stride: usize,
    /// Blocks across all regions
    pub total_blocks: usize,
    /// Blocks handed out and not yet released
    pub used_blocks: usize,
    /// Blocks currently on the free list
    pub free_blocks: usize,
    /// Regions retained by the pool, including superseded ones
    pub region_count: usize,
    /// Bytes reserved across all regions, padding included
    pub reserved_bytes: usize,
    /// Total allocations performed
    pub total_allocs: u64,
    /// Total deallocations performed
    pub total_deallocs: u64,
    /// Highest `used_blocks` observed
    pub peak_used: usize,
    /// Number of successful growths
    pub grow_count: u64,
    /// Number of resets
    pub reset_count: u64,
}

impl PoolStats {
    /// Fraction of the current capacity in use, in `0.0..=1.0`
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.total_blocks == 0 {
            0.0
        } else {
            self.used_blocks as f64 / self.total_blocks as f64
        }
    }
}
