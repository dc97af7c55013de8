//! # Mutex.
//!
//! Mutex is a synchronization primitive that allows **only one thread at a
//! time** to access a critical section of code, protecting shared resources
//! such as memory, files, or device state from concurrent modification.
//! Unlike the spin lock, it **blocks** threads trying to acquire it if another
//! thread already holds the lock.
//!
//! The [`Mutex`] maintains the list of threads sleeping on the mutex.
//! When unlocking, the kernel **wakes up** one of the waiting threads.
//! A thread falls asleep with [`Current::park_with`], which publishes the
//! [`ParkHandle`] of the thread before it sleeps.
//!
//! |                | SpinLock                 | Mutex                      |
//! |----------------|--------------------------|----------------------------|
//! | Waiting thread | Spins (busy-waits)       | Sleeps                     |
//! | CPU usage      | High (wastes CPU cycles) | Low (no busy waiting)      |
//! | Overhead       | Low (fast if uncontended)| Higher (due to sleep/wake) |
//!
//! ## Lost wakeups
//!
//! A waiter re-checks the lock and enqueues itself while holding the waiter
//! queue, and the owner releases the lock while holding the same queue. So
//! either the waiter sees the lock free, or the owner sees the waiter in the
//! queue.
//!
//! [`Current::park_with`]: keos::thread::Current::park_with

use alloc::collections::vec_deque::VecDeque;
use core::ops::{Deref, DerefMut};
use keos::{
    sync::{SpinLock, SpinLockGuard, WouldBlock},
    thread::{Current, ParkHandle},
};

/// A mutual exclusion primitive useful for protecting shared data
///
/// This mutex will block threads waiting for the lock to become available.
/// The mutex can be created via a [`new`] constructor. Each mutex has a
/// type parameter which represents the data that it is protecting. The data can
/// only be accessed through the guards returned from [`lock`] and
/// [`try_lock`], which guarantees that the data is only ever accessed when the
/// mutex is locked.
///
/// [`new`]: Self::new
/// [`lock`]: Self::lock
/// [`try_lock`]: Self::try_lock
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use keos::thread::ThreadBuilder;
/// use keos_synchprobs::sync::Mutex;
///
/// const N: usize = 10;
///
/// let data = Arc::new(Mutex::new(0));
/// let handles = (0..N)
///     .map(|_| {
///         let data = Arc::clone(&data);
///         ThreadBuilder::new("work").spawn(move || {
///             let mut data = data.lock();
///             *data += 1;
///             // the lock must be "explicitly" unlocked.
///             data.unlock();
///         })
///     })
///     .collect::<Vec<_>>();
/// for handle in handles {
///     assert_eq!(handle.join(), 0);
/// }
/// let data = Arc::into_inner(data).unwrap();
/// assert_eq!(data.into_inner(), N);
/// ```
pub struct Mutex<T> {
    t: SpinLock<T>,
    waiters: SpinLock<VecDeque<ParkHandle>>,
}

unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Creates a new mutex in an unlocked state ready for use.
    #[inline]
    pub const fn new(t: T) -> Mutex<T> {
        Mutex {
            t: SpinLock::new(t),
            waiters: SpinLock::new(VecDeque::new()),
        }
    }
}

impl<T> Mutex<T> {
    /// Acquires a mutex, blocking the current thread until it is able to do
    /// so.
    ///
    /// This function will block the local thread until it is available to
    /// acquire the mutex. Upon returning, the thread is the only thread
    /// with the lock held. The returned guard must be released with
    /// [`MutexGuard::unlock`].
    ///
    /// The exact behavior on locking a mutex in the thread which already
    /// holds the lock is left unspecified. However, this function will not
    /// return on the second call.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        loop {
            if let Ok(guard) = self.try_lock() {
                return guard;
            }
            let waiters = self.waiters.lock();
            if let Ok(guard) = self.try_lock() {
                waiters.unlock();
                return guard;
            }
            Current::park_with(move |handle| {
                let mut waiters = waiters;
                waiters.push_back(handle);
                waiters.unlock();
            });
        }
    }

    /// Attempts to acquire this lock.
    ///
    /// If the lock could not be acquired at this time, then [`Err`] is
    /// returned. Otherwise, an guard is returned.
    ///
    /// This function does not block.
    ///
    /// # Errors
    ///
    /// If the mutex could not be acquired because it is already locked, then
    /// this call will return the [`WouldBlock`] error.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, T>, WouldBlock> {
        if let Ok(guard) = self.t.try_lock() {
            Ok(MutexGuard {
                guard: Some(guard),
                lock: self,
            })
        } else {
            Err(WouldBlock)
        }
    }

    /// Consumes this mutex, returning the underlying data.
    pub fn into_inner(self) -> T
    where
        T: Sized,
    {
        self.t.into_inner()
    }
}

impl<T: Default> Default for Mutex<T> {
    /// Creates a `Mutex<T>`, with the `Default` value for T.
    fn default() -> Mutex<T> {
        Mutex::new(Default::default())
    }
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.guard.as_ref().unwrap()
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.guard.as_mut().unwrap()
    }
}

/// An implementation of a "scoped lock" of a mutex. When this structure
/// is dropped (falls out of scope) without unlocking, the panic occurs.
///
/// The lock must be explicitly unlocked by [`unlock`] method.
///
/// The data protected by the mutex can be accessed through this guard.
///
/// This structure is created by the [`lock`] and [`try_lock`] methods on
/// [`Mutex`].
///
/// [`lock`]: Mutex::lock
/// [`try_lock`]: Mutex::try_lock
/// [`unlock`]: MutexGuard::unlock
pub struct MutexGuard<'a, T: 'a> {
    guard: Option<SpinLockGuard<'a, T>>,
    lock: &'a Mutex<T>,
}

unsafe impl<T: Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T> MutexGuard<'a, T> {
    /// Releases the underlying [`Mutex`].
    ///
    /// As the guard does **not** automatically release the lock on drop,
    /// the caller must explicitly invoke [`unlock`] to mark the lock
    /// as available again.
    ///
    /// [`unlock`]: MutexGuard::unlock
    pub fn unlock(mut self) {
        self.release();
        core::mem::forget(self);
    }

    /// The mutex this guard belongs to.
    pub(crate) fn mutex(&self) -> &'a Mutex<T> {
        self.lock
    }

    fn release(&mut self) {
        let mut waiters = self.lock.waiters.lock();
        if let Some(guard) = self.guard.take() {
            guard.unlock();
        }
        let next = waiters.pop_front();
        waiters.unlock();
        if let Some(next) = next {
            next.unpark();
        }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.release();
            return;
        }
        panic!("`.unlock()` must be explicitly called for MutexGuard.");
    }
}
