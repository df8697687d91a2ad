//! Alignment helpers
//!
//! Unlike a plain bit trick, every helper here validates the alignment
//! first: a zero or non-power-of-two alignment is a programming error and
//! is reported as [`PoolError::InvalidAlignment`] instead of silently
//! producing a wrong address.

use core::ptr::NonNull;

use crate::error::{PoolError, PoolResult};

/// Checks that `alignment` is a non-zero power of two
#[inline]
pub fn check_alignment(alignment: usize) -> PoolResult<()> {
    if alignment.is_power_of_two() {
        Ok(())
    } else {
        Err(PoolError::invalid_alignment(alignment))
    }
}

/// Returns the smallest multiple of `alignment` that is `>= value`
///
/// # Examples
/// ```
/// use nebula_block_pool::utils::align_up;
///
/// assert_eq!(align_up(7, 8).unwrap(), 8);
/// assert_eq!(align_up(8, 8).unwrap(), 8);
/// assert_eq!(align_up(9, 8).unwrap(), 16);
/// assert!(align_up(9, 6).is_err());
/// ```
#[inline]
pub fn align_up(value: usize, alignment: usize) -> PoolResult<usize> {
    check_alignment(alignment)?;
    let mask = alignment - 1;
    value
        .checked_add(mask)
        .map(|bumped| bumped & !mask)
        .ok_or_else(|| PoolError::size_overflow("align_up"))
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use nebula_block_pool::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(!is_aligned(17, 8));
/// ```
#[inline(always)]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Returns the first address `>= ptr` that satisfies `alignment`
///
/// The returned pointer keeps the provenance of `ptr`. It is at most
/// `alignment - 1` bytes past `ptr`, so callers that reserved that much
/// padding may dereference it.
#[inline]
pub fn align_ptr(ptr: NonNull<u8>, alignment: usize) -> PoolResult<NonNull<u8>> {
    let addr = ptr.as_ptr() as usize;
    let offset = align_up(addr, alignment)? - addr;
    NonNull::new(ptr.as_ptr().wrapping_add(offset))
        .ok_or_else(|| PoolError::size_overflow("align_ptr"))
}
