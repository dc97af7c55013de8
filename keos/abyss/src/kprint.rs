//! Kernel print utilities.

use crate::spinlock::SpinLock;
use core::fmt::Write;

/// Console device of the host.
///
/// Everything goes to the standard error, so that the output of a test
/// harness stays clean.
pub struct ConsoleSink;

impl Write for ConsoleSink {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        std::eprint!("{s}");
        Ok(())
    }
}

static CONSOLE: SpinLock<ConsoleSink> = SpinLock::new(ConsoleSink);

#[doc(hidden)]
pub fn _print(fmt: core::fmt::Arguments<'_>) {
    let mut guard = CONSOLE.lock();
    let _ = write!(&mut *guard, "{fmt}");
    guard.unlock();
}

/// Prints out the message.
///
/// Use the format! syntax to write data to the console.
/// This first holds the lock for console device.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::kprint::_print(format_args!($($arg)*)));
}

/// Prints out the message with a newline.
///
/// Use the format! syntax to write data to the console.
/// This first holds the lock for console device.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

/// Display an information message.
///
/// Use the format! syntax to write data to the console.
/// This first holds the lock for console device.
#[macro_export]
macro_rules! info {
    () => (if !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[INFO]\n") });
    ($($arg:tt)*) => (if !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[INFO] {}\n", format_args!($($arg)*)) });
}

/// Display a warning message.
///
/// Use the format! syntax to write data to the console.
/// This first holds the lock for console device.
#[macro_export]
macro_rules! warning {
    () => (if !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[WARN]\n") });
    ($($arg:tt)*) => (if !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[WARN] {}\n", format_args!($($arg)*)) });
}

/// Display a debug message.
///
/// Debug messages are printed only when [`VERBOSE`] is set, as they are
/// emitted on hot paths (e.g. every vehicle entering the intersection).
///
/// [`VERBOSE`]: crate::VERBOSE
#[macro_export]
macro_rules! debug {
    () => (if $crate::VERBOSE.load(core::sync::atomic::Ordering::SeqCst) && !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[DEBUG]\n") });
    ($($arg:tt)*) => (if $crate::VERBOSE.load(core::sync::atomic::Ordering::SeqCst) && !$crate::QUITE.load(core::sync::atomic::Ordering::SeqCst) { $crate::print!("[DEBUG] {}\n", format_args!($($arg)*))} );
}
