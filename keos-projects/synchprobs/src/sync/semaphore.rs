//! # Semaphore.
//!
//! A **semaphore** is a fundamental synchronization primitive used to regulate
//! concurrent access to a finite set of resources. It maintains an internal
//! count representing the number of available "permits." Each permit grants a
//! thread the right to access a shared resource.
//!
//! The semaphore is built from a [`Mutex`] protecting the permit count and a
//! [`ConditionVariable`] on which the threads sleep while the count is zero.
//!
//! ## `Semaphore` in KeOS
//!
//! In KeOS, the [`Semaphore`] is combined with a resource to protect. Threads
//! acquire a permit by calling [`Semaphore::wait`], and release it either
//! explicitly via [`Semaphore::signal`] or implicitly using the
//! [`SemaphorePermits`] RAII guard.
//!
//! - [`Semaphore::wait()`]: Decrements the permit count if a permit is
//!   available. If no permits remain, the calling thread blocks until one
//!   becomes available.
//!
//! - [`Semaphore::signal()`]: Increments the permit count and wakes one blocked
//!   thread, if any.
//!
//! - [`SemaphorePermits`]: An RAII-based wrapper that automatically calls
//!   `signal()` when dropped.
//!
//! A permit can outlive the scope that acquired it: leak the guard with
//! [`core::mem::forget`] and return the permit later with
//! [`Semaphore::signal`]. The serial admission controller holds the
//! intersection this way between `before_entry` and `after_exit`.
//!
//! #### Usage Example
//!
//! ```rust
//! use keos_synchprobs::sync::Semaphore;
//!
//! let sema = Semaphore::new(3, ()); // Allows up to 3 concurrent threads.
//!
//! // Acquire a permit (blocks if unavailable)
//! let permit = sema.wait();
//! assert_eq!(sema.permits(), 2);
//!
//! // Permit is automatically released when `permit` goes out of scope.
//! drop(permit);
//! assert_eq!(sema.permits(), 3);
//! ```
//!
//! [`Mutex`]: crate::sync::Mutex
//! [`ConditionVariable`]: crate::sync::ConditionVariable

use core::ops::Deref;
use keos::sync::WouldBlock;

use super::{condition_variable::ConditionVariable, mutex::Mutex};

/// Counting semaphore.
///
/// A semaphore maintains a set of permits and resource. Permits are used to
/// synchronize access to a shared resource. A semaphore differs from a mutex in
/// that it can allow more than one concurrent caller to access the shared
/// resource at a time.
pub struct Semaphore<T> {
    resource: T,
    permits: Mutex<usize>,
    available: ConditionVariable,
}

impl<T> Semaphore<T> {
    /// Creates a new semaphore initialized with a specified number of permits.
    ///
    /// # Arguments
    ///
    /// * `permits` - The initial number of available permits.
    /// * `resource` - A resource combined with this semaphore.
    pub fn new(permits: usize, resource: T) -> Self {
        Self {
            resource,
            permits: Mutex::new(permits),
            available: ConditionVariable::new(),
        }
    }

    /// Waits until a permit becomes available and then acquires it.
    ///
    /// If no permits are available, this function will block the current thread
    /// until another thread calls `signal()` to release a permit.
    ///
    /// This method returns a [`SemaphorePermits`] RAII guard. When the guard is
    /// dropped, it will automatically release the acquired permit.
    pub fn wait(&self) -> SemaphorePermits<'_, T> {
        let mut permits = self.available.wait_while(&self.permits, |permits| *permits == 0);
        *permits -= 1;
        permits.unlock();
        SemaphorePermits { sema: self }
    }

    /// Acquires a permit only if one is available right now.
    pub fn try_wait(&self) -> Result<SemaphorePermits<'_, T>, WouldBlock> {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            permits.unlock();
            return Err(WouldBlock);
        }
        *permits -= 1;
        permits.unlock();
        Ok(SemaphorePermits { sema: self })
    }

    /// Releases a permit back to the semaphore.
    ///
    /// This method increases the number of available permits by one, and if any
    /// threads are blocked in `wait()`, one will be woken up to acquire the
    /// newly released permit.
    pub fn signal(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.signal(permits);
    }

    /// The number of permits available at this moment.
    pub fn permits(&self) -> usize {
        let permits = self.permits.lock();
        let count = *permits;
        permits.unlock();
        count
    }
}

/// An RAII implementation of a "scoped semaphore". When this structure
/// is dropped (falls out of scope), the semaphore will be signaled.
///
/// The data protected by the semaphore can be accessed through this guard via
/// its [`Deref`] implementations.
///
/// This structure is created by the [`wait`] method on [`Semaphore`].
///
/// [`wait`]: Semaphore::wait
pub struct SemaphorePermits<'a, T> {
    sema: &'a Semaphore<T>,
}

impl<T> Deref for SemaphorePermits<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.sema.resource
    }
}

impl<T> Drop for SemaphorePermits<'_, T> {
    fn drop(&mut self) {
        self.sema.signal()
    }
}
