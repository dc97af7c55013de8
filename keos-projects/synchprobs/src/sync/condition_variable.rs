//! # Condition Variable.
//!
//! A **Condition Variable** allows a thread to efficiently block until a
//! certain condition is met, without consuming CPU cycles. It is always used
//! in conjunction with a [`Mutex`] that guards access to shared data. It is
//! generally used when a thread needs to *wait for a specific state*
//! in shared data, and another thread will *notify* it when that state changes.
//!
//! ## `ConditionVariable` in KeOS
//! Condition variable must work with the shared [`Mutex`]. To enforce this,
//! KeOS's [`ConditionVariable`] api takes either [`Mutex`] or [`MutexGuard`] as
//! an argument. This enforces that the apis are called with a mutex, but does
//! not fully ensure that the mutex is the associated one.
//!
//! The [`ConditionVariable::wait_while`] method automatically checks the
//! predicate, blocks the current thread if the condition is true, and re-checks
//! it upon wakeup:
//!
//! ```rust,ignore
//! let guard = condvar.wait_while(&mutex, |state| state.is_empty());
//! ```
//!
//! When the caller already holds the guard (e.g. it inspects the state before
//! deciding which condition variable to sleep on), [`ConditionVariable::wait`]
//! releases the guard, sleeps, and hands the guard back after the wakeup.
//!
//! There are two signaling methods that consume the [`MutexGuard`]:
//! - [`ConditionVariable::signal`] wakes **one** waiting thread and
//! - [`ConditionVariable::broadcast`] wakes **all** waiting threads.
//!
//! [`ConditionVariable::wake_one`] and [`ConditionVariable::wake_all`] do the
//! same while letting the caller keep the guard, which is handy when a single
//! critical section must notify several condition variables.
//!
//! A waiter publishes its [`ParkHandle`] *before* the mutex is released, and
//! the notifier pops the handles while holding the mutex. So a notification
//! sent after the waiter checked its predicate always reaches it.
//!
//! [`Mutex`]: crate::sync::Mutex
//! [`ParkHandle`]: keos::thread::ParkHandle

use super::mutex::{Mutex, MutexGuard};
use crossbeam_queue::SegQueue;
use keos::thread::{Current, ParkHandle};

/// A Condition Variable
///
/// Condition variables represent the ability to block a thread such that it
/// consumes no CPU time while waiting for an event to occur. Condition
/// variables are typically associated with a boolean predicate (a condition)
/// and a mutex. The predicate is always verified inside of the mutex before
/// determining that a thread must block.
///
/// Functions in this module will block the current **thread** of execution.
/// Note that any attempt to use multiple mutexes on the same condition
/// variable may result in a runtime panic.
#[derive(Default)]
pub struct ConditionVariable {
    waiters: SegQueue<ParkHandle>,
}

impl ConditionVariable {
    /// Creates a new condition variable which is ready to be waited on and
    /// signaled.
    pub fn new() -> Self {
        Self {
            waiters: SegQueue::new(),
        }
    }

    /// Atomically releases `guard` and blocks the current thread until this
    /// condition variable is notified, then reacquires the mutex.
    ///
    /// The wakeup may be stale by the time the mutex is reacquired; callers
    /// re-check their condition in a loop.
    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let mutex = guard.mutex();
        Current::park_with(|handle| {
            self.waiters.push(handle);
            guard.unlock();
        });
        mutex.lock()
    }

    /// Blocks the current thread while `predicate` returns `true`.
    ///
    /// This function takes reference of a [`Mutex`] and checks the
    /// predicate. If it returns `true`, the thread is blocked and the mutex is
    /// temporarily released. When the thread is signaled and wakes up, it
    /// reacquires the mutex and re-evaluates the predicate. This loop continues
    /// until the predicate returns `false`.
    ///
    /// There is **no need to check the predicate before calling** `wait_while`.
    /// It performs the entire check-and-sleep logic internally.
    pub fn wait_while<'a, T>(
        &self,
        mutex: &'a Mutex<T>,
        mut predicate: impl FnMut(&mut T) -> bool,
    ) -> MutexGuard<'a, T> {
        let mut guard = mutex.lock();
        while predicate(&mut guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Wakes up one blocked thread on this condvar, and releases the guard.
    ///
    /// If there is a blocked thread on this condition variable, then it will
    /// be woken up from its call to [`wait_while`]. Calls to `signal` are not
    /// buffered in any way.
    ///
    /// To wake up all threads, see [`broadcast`].
    ///
    /// [`broadcast`]: ConditionVariable::broadcast
    /// [`wait_while`]: ConditionVariable::wait_while
    pub fn signal<T>(&self, guard: MutexGuard<'_, T>) {
        self.wake_one(&guard);
        guard.unlock();
    }

    /// Wakes up all blocked threads on this condvar, and releases the guard.
    ///
    /// This method will ensure that any current waiters on the condition
    /// variable are awoken. Calls to `broadcast()` are not buffered in any
    /// way.
    ///
    /// To wake up only one thread, see [`signal`].
    ///
    /// [`signal`]: ConditionVariable::signal
    pub fn broadcast<T>(&self, guard: MutexGuard<'_, T>) {
        self.wake_all(&guard);
        guard.unlock();
    }

    /// Wakes up one blocked thread while the caller keeps the guard.
    pub fn wake_one<T>(&self, _guard: &MutexGuard<'_, T>) {
        if let Some(handle) = self.waiters.pop() {
            handle.unpark();
        }
    }

    /// Wakes up all blocked threads while the caller keeps the guard.
    pub fn wake_all<T>(&self, _guard: &MutexGuard<'_, T>) {
        while let Some(handle) = self.waiters.pop() {
            handle.unpark();
        }
    }

    /// Returns `true` if a thread is blocked on this condvar.
    pub fn has_waiters(&self) -> bool {
        !self.waiters.is_empty()
    }
}
