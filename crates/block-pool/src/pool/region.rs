//! Backing regions and the intrusive free chain
//!
//! # Safety
//!
//! A region is one raw reservation of `stride * blocks + alignment - 1`
//! bytes. The first aligned address inside it is the start of block 0;
//! block `i` starts `i * stride` bytes later. The trailing padding
//! guarantees the last block ends inside the reservation wherever the
//! aligned start lands.
//!
//! While a block is free its first word holds the address of the next free
//! block (or null). While it is allocated the pool never touches it. Which
//! view applies is decided by free-list membership alone; there is no tag
//! stored in the block.

use core::alloc::Layout;
use core::ptr::{self, NonNull};
use std::alloc;

use crate::error::{PoolError, PoolResult};
use crate::utils::align_ptr;

/// Link view of a free block.
///
/// Blocks may be aligned more loosely than a pointer (alignment 1, 2 or 4
/// with a pointer-sized stride that is not a multiple of 8), so the link is
/// always accessed with unaligned reads and writes.
#[repr(C)]
pub(crate) struct FreeBlock {
    next: *mut FreeBlock,
}

impl FreeBlock {
    /// Reads the link stored in a free block.
    ///
    /// # Safety
    ///
    /// `block` must point to a free block of at least pointer size.
    #[inline]
    pub(crate) unsafe fn next(block: *mut FreeBlock) -> *mut FreeBlock {
        // SAFETY: Caller guarantees `block` is a live free block.
        // - addr_of! avoids creating a reference to possibly unaligned memory
        unsafe { ptr::addr_of!((*block).next).read_unaligned() }
    }

    /// Stores `next` as the link of a free block.
    ///
    /// # Safety
    ///
    /// `block` must point to a block of at least pointer size that the pool
    /// owns exclusively (free, or being released by its consumer).
    #[inline]
    pub(crate) unsafe fn set_next(block: *mut FreeBlock, next: *mut FreeBlock) {
        // SAFETY: Caller guarantees exclusive access to at least one word.
        unsafe { ptr::addr_of_mut!((*block).next).write_unaligned(next) }
    }
}

/// One raw reservation sliced into equally sized blocks.
pub(crate) struct Region {
    /// Pointer returned by the system allocator
    raw: NonNull<u8>,

    /// Layout the reservation was made with
    layout: Layout,

    /// First aligned address inside the reservation
    start: NonNull<u8>,

    /// Number of blocks the region was sliced into
    blocks: usize,
}

// SAFETY: Region is Send because:
// - It exclusively owns its reservation; nothing else frees it
// - Raw pointers are plain addresses, no thread-local state is involved
// - The pool only touches region memory while holding its lock
unsafe impl Send for Region {}

impl Region {
    /// Reserves a region for `blocks` blocks of `stride` bytes, aligned to
    /// `alignment`.
    ///
    /// `blocks` must be non-zero and `stride` at least pointer-sized, which
    /// the pool validates before calling.
    pub(crate) fn reserve(stride: usize, blocks: usize, alignment: usize) -> PoolResult<Self> {
        debug_assert!(blocks > 0);
        debug_assert!(stride >= core::mem::size_of::<*mut u8>());

        let size = stride
            .checked_mul(blocks)
            .and_then(|bytes| bytes.checked_add(alignment - 1))
            .ok_or_else(|| PoolError::size_overflow("region size"))?;
        let layout =
            Layout::from_size_align(size, 1).map_err(|_| PoolError::size_overflow("region layout"))?;

        // SAFETY: layout has a non-zero size (blocks > 0, stride > 0).
        let raw = unsafe { alloc::alloc(layout) };
        let raw = NonNull::new(raw).ok_or_else(|| PoolError::out_of_memory(size, alignment))?;

        let start = match align_ptr(raw, alignment) {
            Ok(start) => start,
            Err(err) => {
                // SAFETY: raw was just allocated with this layout.
                unsafe { alloc::dealloc(raw.as_ptr(), layout) };
                return Err(err);
            }
        };

        Ok(Self {
            raw,
            layout,
            start,
            blocks,
        })
    }

    /// Aligned start of block 0.
    #[inline]
    pub(crate) fn start(&self) -> NonNull<u8> {
        self.start
    }

    /// Bytes reserved from the system allocator, padding included.
    #[inline]
    pub(crate) fn reserved_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Links every block into a fresh chain ending in `tail_next` and
    /// returns the chain's head (block 0).
    ///
    /// # Safety
    ///
    /// `stride` must be the stride the region was reserved with, and no
    /// block of this region may be in use by a consumer or already be on
    /// the free list.
    pub(crate) unsafe fn link_chain(&self, stride: usize, tail_next: *mut FreeBlock) -> *mut FreeBlock {
        let base = self.start.as_ptr();
        let mut next = tail_next;

        // Walk backwards so each block can point at the one after it
        for index in (0..self.blocks).rev() {
            // SAFETY: index < blocks, so the block lies inside the
            // reservation (see module docs). Caller guarantees exclusivity.
            unsafe {
                let block = base.add(index * stride).cast::<FreeBlock>();
                FreeBlock::set_next(block, next);
                next = block;
            }
        }

        next
    }

    /// Whether `ptr` is the start of one of this region's blocks.
    pub(crate) fn owns_block(&self, ptr: *const u8, stride: usize) -> bool {
        let start = self.start.as_ptr() as usize;
        let addr = ptr as usize;

        let Some(offset) = addr.checked_sub(start) else {
            return false;
        };

        offset % stride == 0 && offset / stride < self.blocks
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: raw was allocated in `reserve` with exactly this layout
        // and is released exactly once, here.
        unsafe { alloc::dealloc(self.raw.as_ptr(), self.layout) };
    }
}
