//! Spin-wait mutual exclusion for pool state.
//!
//! Critical sections in the pool are a handful of pointer writes (or one
//! region reservation when growing), so the lock busy-polls instead of
//! parking the thread. Every failed attempt yields to the OS scheduler,
//! which keeps a preempted holder from being starved by spinning waiters.
//!
//! The lock is not re-entrant: acquiring it again on the same thread
//! before the guard is dropped deadlocks.

use core::fmt;

use spin::mutex::{SpinMutex, SpinMutexGuard};
use spin::relax::Yield;

/// RAII guard returned by [`SpinLock::lock`]; the lock is released on drop.
pub type SpinLockGuard<'a, T> = SpinMutexGuard<'a, T>;

/// A spin-wait lock that yields on contention.
pub struct SpinLock<T> {
    inner: SpinMutex<T, Yield>,
}

impl<T> SpinLock<T> {
    /// Creates an unlocked lock protecting `value`.
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            inner: SpinMutex::new(value),
        }
    }

    /// Acquires the lock, spinning (and yielding) until it is available.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.inner.lock()
    }

    /// Acquires the lock only if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.inner.try_lock()
    }

    /// Whether some thread currently holds the lock.
    ///
    /// The answer may be stale by the time it is observed.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Exclusive access without locking; `&mut self` already proves it.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Consumes the lock and returns the protected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
