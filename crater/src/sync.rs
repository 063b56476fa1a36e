//! Scoped exclusive lock
//!
//! `embassy_sync::blocking_mutex::Mutex` only grants access inside a closure that runs with the
//! raw mutex held, which for `CriticalSectionRawMutex` means interrupts are masked for the whole
//! closure. [`ScopedLock`] holds the raw mutex only while it flips the lock flag. The data is then
//! accessed through a guard, which releases the lock when dropped.
//!
//! The flag is only loaded and stored, never compare-exchanged, so the lock works on cores
//! without atomic read-modify-write instructions.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Exclusive lock that hands out a scoped guard
///
/// Acquisition is not re-entrant: locking twice from the same context spins forever.
pub struct ScopedLock<M: RawMutex, T: ?Sized> {
    raw: M,
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

unsafe impl<M: RawMutex + Send, T: ?Sized + Send> Send for ScopedLock<M, T> {}
unsafe impl<M: RawMutex + Sync, T: ?Sized + Send> Sync for ScopedLock<M, T> {}

impl<M: RawMutex, T> ScopedLock<M, T> {
    pub const fn new(value: T) -> Self {
        Self {
            raw: M::INIT,
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<M: RawMutex, T: ?Sized> ScopedLock<M, T> {
    /// Acquires the lock, spinning until it is free
    pub fn lock(&self) -> Locked<'_, M, T> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            core::hint::spin_loop();
        }
    }

    /// Acquires the lock if it is free
    pub fn try_lock(&self) -> Option<Locked<'_, M, T>> {
        let acquired = self.raw.lock(|| {
            if self.locked.load(Ordering::Acquire) {
                false
            } else {
                self.locked.store(true, Ordering::Relaxed);
                true
            }
        });

        acquired.then_some(Locked {
            lock: self,
            _data: PhantomData,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Borrows the data without locking; the exclusive borrow proves there is no guard
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<M: RawMutex, T: Default> Default for ScopedLock<M, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Exclusive access to the data of a [`ScopedLock`]
///
/// The lock is released when the guard is dropped.
pub struct Locked<'a, M: RawMutex, T: ?Sized> {
    lock: &'a ScopedLock<M, T>,
    _data: PhantomData<&'a mut T>,
}

impl<M: RawMutex, T: ?Sized> Deref for Locked<'_, M, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the guard is the only live accessor while the flag is set
        unsafe { &*self.lock.data.get() }
    }
}

impl<M: RawMutex, T: ?Sized> DerefMut for Locked<'_, M, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the guard is the only live accessor while the flag is set
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<M: RawMutex, T: ?Sized> Drop for Locked<'_, M, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
