//! Low-level synchronization primitives of the kernel.
//!
//! The kernel itself only provides the busy-waiting [`SpinLock`]. Sleeping
//! primitives (mutexes, condition variables, semaphores) are built on top of
//! it together with [`Current::park_with`].
//!
//! [`Current::park_with`]: crate::thread::Current::park_with

pub mod spinlock;

pub use spinlock::{SpinLock, SpinLockGuard, WouldBlock};
