//! The abyss of kernel that sits right above the host.
//!
//! This crate contains the lowest-level pieces that every other crate in the
//! workspace builds on: the busy-waiting [`SpinLock`] and the console print
//! utilities.
//!
//! You are **not** supposed to use the modules of this crate directly. Use the
//! re-exports of the [`keos`] crate instead.
//!
//! [`keos`]: ../keos/index.html
//! [`SpinLock`]: spinlock::SpinLock

use core::sync::atomic::AtomicBool;

#[doc(hidden)]
#[macro_use]
pub mod kprint;
#[doc(hidden)]
pub mod spinlock;

#[cfg(doc)]
pub use spinlock::SpinLock;

/// Silences `info!`, `warning!` and `debug!`.
#[doc(hidden)]
pub static QUITE: AtomicBool = AtomicBool::new(false);

/// Enables `debug!`, which is off by default.
#[doc(hidden)]
pub static VERBOSE: AtomicBool = AtomicBool::new(false);
