//! # KeOS: kernel services for the synchronization problems
//!
//! This crate is the kernel layer the synchronization problems run on. It
//! offers exactly the services a synchronization problem consumes from its
//! environment, and nothing more:
//!
//! - **Threads**: create a named thread, join it, and ask for the id or the
//!   state of a thread ([`thread`]).
//! - **Parking**: put the current thread to sleep until another thread wakes
//!   it up ([`thread::Current::park_with`] and [`thread::ParkHandle`]). Every
//!   sleeping primitive (mutex, condition variable, semaphore) is built on
//!   this single mechanism.
//! - **Spinlocks**: the busy-waiting lock used to protect the short critical
//!   sections inside the sleeping primitives ([`sync::SpinLock`]).
//! - **Console**: [`print!`], [`println!`], [`info!`], [`warning!`] and
//!   [`debug!`].
//! - **Test driver**: [`TestDriver`] runs a list of test cases, each in its
//!   own thread, and reports the results.
//!
//! ## Implementation Notes
//!
//! Guards of the locks in KeOS are **not** released when they go out of
//! scope. A guard must be released with an explicit `unlock()` call; dropping
//! a guard that still holds its lock panics and reports where the lock was
//! taken. This makes every critical section visible in the code:
//!
//! ```
//! use keos::sync::SpinLock;
//!
//! let lock = SpinLock::new(0);
//! let mut guard = lock.lock();
//! *guard += 1;
//! guard.unlock();
//! ```
//!
//! Never park a thread while holding a [`sync::SpinLock`]: the other threads
//! spin on it until the parked thread is woken up.
//!
//! ### Selectively run tests
//!
//! In KeOS, you can run one or more specific test cases by passing their names
//! as arguments to the test runner. For example:
//!
//! ```bash
//! $ cargo run -- sync::mutex::smoke controller::lock_order::opposite_straights
//! ```
//!
//! Pass `-q` to silence the log messages, or `-v` to see the debug messages.

extern crate alloc;

pub mod sync;
pub mod thread;

pub use abyss::{QUITE, VERBOSE, debug, info, print, println, warning};
use alloc::{collections::btree_set::BTreeSet, string::String, vec::Vec};
use core::sync::atomic::Ordering;

/// Enum representing errors that can occur during a kernel operation.
///
/// This enum is used to categorize errors encountered by the kernel operation.
/// Each variant corresponds to a specific type of error that might
/// occur during the handling of a kernel operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    /// Operation is not permitted. (EPERM)
    OperationNotPermitted,
    /// No such entry. (ENOENT)
    NoSuchEntry,
    /// Out of memory. (ENOMEM)
    NoMemory,
    /// Invalid arguement. (EINVAL)
    InvalidArgument,
}

// Test utilities
#[doc(hidden)]
pub trait TestCase
where
    Self: Sync + Send,
{
    fn name(&'static self) -> &'static str;
    fn run(&'static self) -> bool;
}

impl<T> TestCase for T
where
    T: Fn() + Send + Sync + 'static,
{
    fn name(&'static self) -> &'static str {
        core::any::type_name::<T>()
    }
    fn run(&'static self) -> bool {
        crate::print!("test {} ... ", core::any::type_name::<T>());
        if thread::ThreadBuilder::new(core::any::type_name::<T>())
            .spawn(self)
            .join()
            == 0
        {
            crate::println!("ok");
            true
        } else {
            crate::println!("FAILED");
            false
        }
    }
}

/// A driver for running tests.
pub struct TestDriver {
    _p: (),
}

impl TestDriver {
    /// Run the given tests, filtered by the command line arguments.
    ///
    /// Returns `true` if every selected test passed.
    pub fn start(tests: &[&'static dyn TestCase]) -> bool {
        Self::start_with(tests, std::env::args().skip(1))
    }

    /// Run the given tests, filtered by `args`.
    ///
    /// Each argument is either a test name without the crate prefix
    /// (e.g. `sync::mutex::smoke`), `-q` to silence the log, or `-v` to
    /// enable the debug messages.
    pub fn start_with(
        tests: &[&'static dyn TestCase],
        args: impl IntoIterator<Item = String>,
    ) -> bool {
        let mut filter = BTreeSet::new();
        for arg in args {
            match arg.as_str() {
                "-q" => QUITE.store(true, Ordering::SeqCst),
                "-v" => VERBOSE.store(true, Ordering::SeqCst),
                _ => {
                    filter.insert(arg);
                }
            }
        }
        let tests = tests
            .iter()
            .copied()
            .filter(|test| {
                if filter.is_empty() {
                    return true;
                }
                let name = test.name();
                let r = name.split("::").next().map(|n| n.len() + 2).unwrap_or(0);
                filter.contains(&name[r..])
            })
            .collect::<Vec<_>>();
        let (total, mut succ) = (tests.len(), 0);
        crate::println!(
            "Running {} test{}",
            total,
            if total == 1 { "" } else { "s" }
        );

        for test in tests {
            if test.run() {
                succ += 1;
            }
        }
        crate::println!(
            "test result: {}. {} passed; {} failed",
            if total == succ { "ok" } else { "FAILED" },
            succ,
            total - succ
        );
        total == succ
    }
}
