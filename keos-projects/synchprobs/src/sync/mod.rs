//! # Synchronization Primitives.
//!
//! The intersection is shared by every vehicle thread, and the admission
//! controllers must make most of them **sleep** while they wait for their
//! turn. The kernel only offers the [`SpinLock`], which keeps the waiting
//! thread busy, and the parking facility of [`keos::thread`]. This module
//! builds the sleeping primitives on top of them:
//!
//! - [`Mutex`]: A mutual exclusion primitive that ensures only one thread can
//!   access a critical section at a time. Unlike a spinlock, a mutex puts the
//!   thread to sleep if the lock is unavailable.
//!
//! - [`ConditionVariable`]: A coordination mechanism that allows threads to
//!   sleep until a particular condition becomes true. It is used in
//!   conjunction with a mutex.
//!
//! - [`Semaphore`]: A counting synchronization primitive that controls access
//!   to a shared resource by maintaining a counter.
//!
//! - [`Lock`]: A lock that records its holder, so that only the thread that
//!   acquired it can release it.
//!
//! | Primitive             | Blocks Thread? | Owner tracked? | Typical Use Case                         |
//! |-----------------------|----------------|----------------|------------------------------------------|
//! | [`SpinLock`]          | No (busy wait) | No             | Short critical sections inside the kernel |
//! | [`Mutex`]             | Yes            | No             | Exclusive access to shared data          |
//! | [`ConditionVariable`] | Yes            | No             | Waiting for a condition to become true   |
//! | [`Semaphore`]         | Yes            | No             | Limiting access to a bounded resource    |
//! | [`Lock`]              | Yes            | Yes            | Ownership that spans function calls      |
//!
//! Every guard in this module must be released explicitly, exactly like the
//! guard of the [`SpinLock`].
//!
//! [`SpinLock`]: keos::sync::SpinLock
//! [`Mutex`]: crate::sync::mutex::Mutex
//! [`ConditionVariable`]: crate::sync::condition_variable::ConditionVariable
//! [`Semaphore`]: crate::sync::semaphore::Semaphore
//! [`Lock`]: crate::sync::lock::Lock

pub mod condition_variable;
pub mod lock;
pub mod mutex;
pub mod semaphore;

pub use condition_variable::*;
pub use lock::*;
pub use mutex::*;
pub use semaphore::*;
