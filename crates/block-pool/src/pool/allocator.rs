//! Main block pool implementation
//!
//! # Safety
//!
//! This module implements a thread-safe fixed-size block pool:
//! - Blocks are carved out of raw regions (see [`region`](super::region))
//! - Free blocks form an intrusive LIFO list threaded through their first word
//! - A single [`SpinLock`] serializes every free-list and capacity mutation
//! - Growth reserves a region for the added blocks and splices it in front
//!   of the free list
//!
//! ## Invariants
//!
//! - Every block is either on the free list or owned by a consumer, never both
//! - `used_blocks + free_blocks == total_blocks` while callers honour the
//!   release contract, where `total_blocks` sums the blocks of all regions
//! - Every region start, and therefore every block, is aligned to `alignment`
//! - Regions are never released before the pool is dropped, so blocks handed
//!   out before a growth stay valid after it

use core::fmt;
use core::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::{debug, info, warn};

use super::region::{FreeBlock, Region};
use super::{PoolConfig, PoolStats};
use crate::error::{PoolError, PoolResult};
use crate::lock::SpinLock;
use crate::utils::{align_up, check_alignment};

/// Alignment used by [`BlockPool::with_default_alignment`]
///
/// Matches the strictest fundamental alignment on mainstream 64-bit targets.
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Mutable pool state, only ever touched under the pool lock
struct PoolState {
    /// Head of the free list (null when exhausted)
    free_head: *mut FreeBlock,

    /// Every region reserved so far; the last one is current
    regions: Vec<Region>,

    /// Blocks across all regions
    total_blocks: usize,

    /// Blocks handed out and not yet released
    used_blocks: usize,

    /// Blocks currently on the free list
    free_blocks: usize,

    // Statistics
    total_allocs: u64,
    total_deallocs: u64,
    peak_used: usize,
    grow_count: u64,
    reset_count: u64,
}

// SAFETY: PoolState is Send because:
// - free_head only points into regions owned by this same state
// - Regions are Send (exclusively owned reservations)
// - The state is only reachable through the pool's SpinLock
unsafe impl Send for PoolState {}

impl PoolState {
    fn owns(&self, ptr: *const u8, stride: usize) -> bool {
        self.regions
            .iter()
            .any(|region| region.owns_block(ptr, stride))
    }
}

/// Pool of equally sized, aligned memory blocks
///
/// Blocks are handed out by [`allocate`](Self::allocate) and returned with
/// [`deallocate`](Self::deallocate). When the free list is empty the pool
/// grows by half its current capacity (at least one block) by reserving a
/// new region for the added blocks; blocks from earlier regions remain
/// valid and stay part of the pool.
///
/// # Memory Layout
/// ```text
/// region:  [pad][Block0][Block1][Block2]...[BlockN-1]
///                  ↓       ↓               ↓
/// free:    head → [free] → [free] → ... → [free] → null
/// ```
///
/// # Examples
/// ```
/// use nebula_block_pool::BlockPool;
///
/// let pool = BlockPool::new(16, 2, 8)?;
/// let a = pool.allocate().expect("first block");
/// let b = pool.allocate().expect("second block");
/// let c = pool.allocate().expect("grown block");
/// assert_eq!(pool.total_blocks(), 3);
///
/// // SAFETY: each block came from this pool and is released once.
/// unsafe {
///     pool.deallocate(a);
///     pool.deallocate(b);
///     pool.deallocate(c);
/// }
/// assert_eq!(pool.used_blocks(), 0);
/// # Ok::<(), nebula_block_pool::PoolError>(())
/// ```
pub struct BlockPool {
    /// Free list, regions and counters
    state: SpinLock<PoolState>,

    /// Requested size of each block
    block_size: usize,

    /// Distance between consecutive blocks
    stride: usize,

    /// Alignment of every block
    alignment: usize,

    /// Configuration
    config: PoolConfig,
}

impl BlockPool {
    /// Creates a pool with the default configuration
    ///
    /// # Parameters
    /// - `block_size`: size of each block in bytes (at least pointer-sized)
    /// - `capacity`: number of blocks in the first region (may be zero)
    /// - `alignment`: alignment of every block (non-zero power of two)
    pub fn new(block_size: usize, capacity: usize, alignment: usize) -> PoolResult<Self> {
        Self::with_config(block_size, capacity, alignment, PoolConfig::default())
    }

    /// Creates a pool aligned to [`DEFAULT_ALIGNMENT`]
    pub fn with_default_alignment(block_size: usize, capacity: usize) -> PoolResult<Self> {
        Self::new(block_size, capacity, DEFAULT_ALIGNMENT)
    }

    /// Creates a pool whose blocks fit a value of type `T`
    pub fn for_type<T>(capacity: usize) -> PoolResult<Self> {
        let block_size = core::mem::size_of::<T>().max(core::mem::size_of::<*mut u8>());
        Self::new(block_size, capacity, core::mem::align_of::<T>())
    }

    /// Creates a pool with custom configuration
    ///
    /// # Errors
    /// Returns an error if:
    /// - `alignment` is not a power of two
    /// - `block_size` is too small to hold a pointer
    /// - `config` is inconsistent with `capacity`
    /// - the first region cannot be reserved
    pub fn with_config(
        block_size: usize,
        capacity: usize,
        alignment: usize,
        config: PoolConfig,
    ) -> PoolResult<Self> {
        check_alignment(alignment)?;

        if block_size < core::mem::size_of::<*mut u8>() {
            return Err(PoolError::block_too_small(block_size));
        }

        config.validate(capacity)?;

        let stride = align_up(block_size, alignment)?;

        let mut regions = Vec::new();
        let mut free_head = ptr::null_mut();
        if capacity > 0 {
            let region = Region::reserve(stride, capacity, alignment)?;
            // SAFETY: Linking a freshly reserved region.
            // - stride is the stride the region was reserved with
            // - No block has been handed out yet
            free_head = unsafe { region.link_chain(stride, ptr::null_mut()) };
            regions.push(region);
        }

        #[cfg(feature = "logging")]
        debug!(block_size, stride, capacity, alignment, "Block pool created");

        Ok(Self {
            state: SpinLock::new(PoolState {
                free_head,
                regions,
                total_blocks: capacity,
                used_blocks: 0,
                free_blocks: capacity,
                total_allocs: 0,
                total_deallocs: 0,
                peak_used: 0,
                grow_count: 0,
                reset_count: 0,
            }),
            block_size,
            stride,
            alignment,
            config,
        })
    }

    /// Returns the requested size of each block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the alignment of each block
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Returns the distance between consecutive blocks
    ///
    /// This is the block size rounded up to the alignment, so every block,
    /// not only the first one in a region, is aligned.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the configuration the pool was built with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the number of blocks across all regions
    pub fn total_blocks(&self) -> usize {
        self.state.lock().total_blocks
    }

    /// Returns the number of blocks handed out and not yet released
    pub fn used_blocks(&self) -> usize {
        self.state.lock().used_blocks
    }

    /// Returns the number of blocks on the free list
    pub fn free_blocks(&self) -> usize {
        self.state.lock().free_blocks
    }

    /// Returns the number of regions retained, superseded ones included
    pub fn region_count(&self) -> usize {
        self.state.lock().regions.len()
    }

    /// Checks if the free list is empty (the next allocation grows)
    pub fn is_exhausted(&self) -> bool {
        self.state.lock().free_head.is_null()
    }

    /// Returns the aligned start of the current region
    pub fn region_start(&self) -> Option<NonNull<u8>> {
        self.state.lock().regions.last().map(Region::start)
    }

    /// Checks if `ptr` is the start of a block of this pool
    ///
    /// Says nothing about whether that block is currently allocated.
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.state.lock().owns(ptr, self.stride)
    }

    /// Checks if a value of type `T` fits in one block
    pub fn fits<T>(&self) -> bool {
        core::mem::size_of::<T>() <= self.block_size && core::mem::align_of::<T>() <= self.alignment
    }

    /// Takes a block from the free list, growing the pool if it is empty
    ///
    /// Returns `None` only when the pool was exhausted and growth failed
    /// (configuration refused it or the region could not be reserved).
    /// Treat that as "pool exhausted": decline the operation or retry later.
    ///
    /// The block's contents are unspecified; initialize it before reading.
    pub fn allocate(&self) -> Option<NonNull<u8>> {
        let block = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if state.free_head.is_null() && self.grow_locked(state).is_err() {
                return None;
            }

            let head = NonNull::new(state.free_head)?;

            // SAFETY: Popping the free list head.
            // - head is non-null and on the free list, so its link is valid
            // - The lock gives exclusive access to the free list
            state.free_head = unsafe { FreeBlock::next(head.as_ptr()) };
            state.used_blocks += 1;
            state.free_blocks -= 1;

            if self.config.track_stats {
                state.total_allocs += 1;
                state.peak_used = state.peak_used.max(state.used_blocks);
            }

            head.cast::<u8>()
        };

        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: Filling a block that was just popped.
            // - The block is off the free list and not yet returned
            // - It spans block_size bytes inside a live region
            unsafe { ptr::write_bytes(block.as_ptr(), pattern, self.block_size) };
        }

        Some(block)
    }

    /// Returns a block to the front of the free list
    ///
    /// # Safety
    ///
    /// Caller must ensure:
    /// - `block` was returned by [`allocate`](Self::allocate) on this pool
    /// - `block` has not been released since, and the pool was not reset since
    /// - Nothing reads or writes through `block` after this call
    ///
    /// Violations corrupt the free list. Debug builds assert that `block`
    /// belongs to the pool; release builds do not check.
    pub unsafe fn deallocate(&self, block: NonNull<u8>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        debug_assert!(
            state.owns(block.as_ptr(), self.stride),
            "deallocate: block {block:p} does not belong to this pool"
        );
        debug_assert!(
            state.used_blocks > 0,
            "deallocate: no blocks are outstanding"
        );

        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: Caller hands the whole block back (contract above).
            unsafe { ptr::write_bytes(block.as_ptr(), pattern, self.block_size) };
        }

        let block = block.as_ptr().cast::<FreeBlock>();

        // SAFETY: Pushing onto the free list.
        // - The block is at least pointer-sized (validated at construction)
        // - The caller no longer uses it, so its first word is ours
        unsafe { FreeBlock::set_next(block, state.free_head) };
        state.free_head = block;
        state.used_blocks = state.used_blocks.saturating_sub(1);
        state.free_blocks += 1;

        if self.config.track_stats {
            state.total_deallocs += 1;
        }
    }

    /// Grows the pool now, even if free blocks remain
    ///
    /// The new blocks are placed in front of the existing free list.
    /// Returns the new total block count.
    pub fn grow(&self) -> PoolResult<usize> {
        let mut guard = self.state.lock();
        self.grow_locked(&mut guard)
    }

    /// Marks every block of every region free again
    ///
    /// The free list is rebuilt from scratch in region order, discarding
    /// its previous shape.
    ///
    /// # Safety
    ///
    /// Caller must ensure no block handed out by this pool is still in use.
    /// Every previously returned pointer is invalid after this call.
    pub unsafe fn reset(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut head = ptr::null_mut();
        for region in state.regions.iter().rev() {
            // SAFETY: Relinking a whole region.
            // - stride is the stride every region was reserved with
            // - Caller guarantees no block is in use
            head = unsafe { region.link_chain(self.stride, head) };
        }

        state.free_head = head;
        state.free_blocks = state.total_blocks;
        state.used_blocks = 0;
        state.reset_count += 1;

        #[cfg(feature = "logging")]
        debug!(total_blocks = state.total_blocks, "Block pool reset");
    }

    /// Get a consistent snapshot of the pool counters
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();

        PoolStats {
            block_size: self.block_size,
            stride: self.stride,
            total_blocks: state.total_blocks,
            used_blocks: state.used_blocks,
            free_blocks: state.free_blocks,
            region_count: state.regions.len(),
            reserved_bytes: state.regions.iter().map(Region::reserved_bytes).sum(),
            total_allocs: state.total_allocs,
            total_deallocs: state.total_deallocs,
            peak_used: state.peak_used,
            grow_count: state.grow_count,
            reset_count: state.reset_count,
        }
    }

    /// Reserves a region for the blocks the next capacity adds and splices
    /// it in front of the free list. Must be called with the lock held.
    fn grow_locked(&self, state: &mut PoolState) -> PoolResult<usize> {
        let result = self.try_grow(state);

        #[cfg(feature = "logging")]
        {
            if let Err(err) = &result {
                warn!(error = %err, total_blocks = state.total_blocks, "Block pool growth failed");
            }
        }

        result
    }

    fn try_grow(&self, state: &mut PoolState) -> PoolResult<usize> {
        if !self.config.growable {
            return Err(PoolError::GrowthDisabled);
        }

        let previous = state.total_blocks;
        let mut capacity = next_capacity(previous)?;

        if let Some(limit) = self.config.max_blocks {
            if previous >= limit {
                return Err(PoolError::capacity_limit(limit));
            }
            capacity = capacity.min(limit);
        }

        let additional = capacity - previous;
        let region = Region::reserve(self.stride, additional, self.alignment)?;

        // SAFETY: Splicing a fresh region in front of the free list.
        // - None of the region's blocks has been handed out
        // - The current head (possibly null) becomes the new chain's tail link
        state.free_head = unsafe { region.link_chain(self.stride, state.free_head) };
        state.free_blocks += additional;
        state.total_blocks = capacity;
        state.regions.push(region);
        state.grow_count += 1;

        #[cfg(feature = "logging")]
        info!(
            previous,
            total_blocks = capacity,
            regions = state.regions.len(),
            "Block pool resized"
        );

        Ok(capacity)
    }
}

/// Next capacity: one and a half times the current one, at least one more
fn next_capacity(total: usize) -> PoolResult<usize> {
    let grown = total
        .checked_add(total / 2)
        .ok_or_else(|| PoolError::size_overflow("grow capacity"))?;

    Ok(if grown > total { grown } else { total + 1 })
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        let state = self.state.get_mut();

        #[cfg(feature = "logging")]
        {
            if state.used_blocks > 0 {
                warn!(
                    used_blocks = state.used_blocks,
                    "Block pool dropped with outstanding blocks"
                );
            }
            debug!(regions = state.regions.len(), "Block pool released");
        }

        state.free_head = ptr::null_mut();
        state.regions.clear();
    }
}

impl fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();

        f.debug_struct("BlockPool")
            .field("block_size", &self.block_size)
            .field("stride", &self.stride)
            .field("alignment", &self.alignment)
            .field("total_blocks", &state.total_blocks)
            .field("used_blocks", &state.used_blocks)
            .field("free_blocks", &state.free_blocks)
            .field("regions", &state.regions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_capacity() {
        assert_eq!(next_capacity(0), Ok(1));
        assert_eq!(next_capacity(1), Ok(2));
        assert_eq!(next_capacity(2), Ok(3));
        assert_eq!(next_capacity(3), Ok(4));
        assert_eq!(next_capacity(10), Ok(15));
        assert!(next_capacity(usize::MAX).is_err());
    }

    #[test]
    fn test_send_sync_bounds() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BlockPool>();
        assert_sync::<BlockPool>();
    }

    #[test]
    fn test_stride_rounds_to_alignment() {
        let pool = BlockPool::new(12, 4, 8).unwrap();
        assert_eq!(pool.block_size(), 12);
        assert_eq!(pool.stride(), 16);

        let pool = BlockPool::new(12, 4, 4).unwrap();
        assert_eq!(pool.stride(), 12);
    }

    #[test]
    fn test_debug_format() {
        let pool = BlockPool::new(16, 2, 8).unwrap();
        let text = format!("{pool:?}");
        assert!(text.contains("BlockPool"));
        assert!(text.contains("total_blocks: 2"));
    }
}
