//! Smart pointer for pool-allocated values

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use super::BlockPool;
use crate::error::{PoolError, PoolResult};

/// RAII smart pointer for a value living in a pool block
///
/// This is the typed consumer view of a block: the value is constructed in
/// place on creation, dropped in place when the box is dropped, and the
/// block is then returned to the pool. Similar to `Box` but backed by a
/// [`BlockPool`]; the borrow on the pool keeps it alive for as long as the
/// box exists.
///
/// # Examples
/// ```
/// use nebula_block_pool::{BlockPool, PoolBox};
///
/// let pool = BlockPool::for_type::<[u64; 2]>(4)?;
/// let mut pair = PoolBox::new_in([1, 2], &pool)?;
/// pair[1] = 20;
/// assert_eq!(*pair, [1, 20]);
/// assert_eq!(pool.used_blocks(), 1);
///
/// drop(pair);
/// assert_eq!(pool.used_blocks(), 0);
/// # Ok::<(), nebula_block_pool::PoolError>(())
/// ```
pub struct PoolBox<'pool, T> {
    ptr: NonNull<T>,
    pool: &'pool BlockPool,
}

impl<'pool, T> PoolBox<'pool, T> {
    /// Moves `value` into a block taken from `pool`
    ///
    /// # Errors
    /// - [`PoolError::LayoutMismatch`] if `T` does not fit a block
    /// - [`PoolError::Exhausted`] if the pool is exhausted and cannot grow
    pub fn new_in(value: T, pool: &'pool BlockPool) -> PoolResult<Self> {
        if !pool.fits::<T>() {
            return Err(PoolError::layout_mismatch::<T>(
                pool.block_size(),
                pool.alignment(),
            ));
        }

        let block = pool
            .allocate()
            .ok_or_else(|| PoolError::exhausted(pool.total_blocks()))?;
        let ptr = block.cast::<T>();

        // SAFETY: Constructing the value in place.
        // - The block is at least size_of::<T>() bytes (fits check above)
        // - Blocks are aligned to pool.alignment() >= align_of::<T>()
        // - The block was just handed out, nothing else refers to it
        unsafe { ptr.as_ptr().write(value) };

        Ok(Self { ptr, pool })
    }

    /// Returns the pool this value lives in
    pub fn pool(&self) -> &'pool BlockPool {
        self.pool
    }

    /// Returns the raw block address
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Consumes the `PoolBox` and returns the contained value
    ///
    /// The block goes back to the pool.
    #[must_use]
    pub fn into_inner(self) -> T {
        let this = core::mem::ManuallyDrop::new(self);

        // SAFETY: Moving the value out.
        // - ptr points to an initialized T (from new_in)
        // - ManuallyDrop keeps Drop from dropping it a second time
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };

        // SAFETY: Returning the block.
        // - The block came from this pool's allocate and is released once
        // - The value was moved out, nothing refers to the block anymore
        unsafe { this.pool.deallocate(this.ptr.cast()) };

        value
    }
}

impl<T> Deref for PoolBox<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: ptr points to an initialized T owned by this box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for PoolBox<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: ptr points to an initialized T and &mut self is exclusive.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for PoolBox<'_, T> {
    fn drop(&mut self) {
        // SAFETY: Dropping the value and returning the block.
        // 1. drop_in_place runs T's destructor on the initialized value
        // 2. The block came from this pool's allocate and is released once
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.pool.deallocate(self.ptr.cast());
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PoolBox<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

// SAFETY: PoolBox owns its T exclusively, and BlockPool is Sync, so moving
// the box to another thread is as safe as moving the T.
unsafe impl<T: Send> Send for PoolBox<'_, T> {}

// SAFETY: Shared access to the box only gives out &T.
unsafe impl<T: Sync> Sync for PoolBox<'_, T> {}
