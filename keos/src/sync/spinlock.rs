//! SMP-supported spinlock.
//!
//! To acquire a lock on a multiprocessor, a thread 1) polls a variable that
//! represents whether the value is locked or not, 2) sets the variable when it
//! holds the `lock`, and 3) unsets the variable when it `unlock`s.
//!
//! The step 1 and 2 must be executed ATOMICALLY with the atomic
//! read-modify-write instructions of the CPU.
//!
//! A waiting thread never sleeps; it keeps polling with an exponential
//! backoff. Keep the critical sections protected by a [`SpinLock`] short, and
//! never park a thread while holding one.

pub use abyss::spinlock::{SpinLock, SpinLockGuard, WouldBlock};
