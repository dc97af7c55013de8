//! # Lock.
//!
//! A [`Lock`] is a sleeping lock that remembers **which thread** holds it.
//! Unlike [`Mutex`], it does not protect any data and it has no guard: the
//! holder calls [`Lock::acquire`] and, possibly much later and from a
//! different function, [`Lock::release`]. Only the holder may release it.
//!
//! This makes it fit to represent ownership of a part of the world that is
//! not a Rust value, e.g. the right of a vehicle to drive along a path in the
//! intersection.
//!
//! [`Mutex`]: crate::sync::Mutex

use super::{condition_variable::ConditionVariable, mutex::Mutex};
use alloc::string::String;
use keos::{KernelError, sync::WouldBlock, thread::Current};

/// A named lock owned by a thread.
pub struct Lock {
    name: String,
    holder: Mutex<Option<u64>>,
    released: ConditionVariable,
}

impl Lock {
    /// Creates a new, free lock.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            holder: Mutex::new(None),
            released: ConditionVariable::new(),
        }
    }

    /// The name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquires the lock, blocking until its holder releases it.
    ///
    /// # Panics
    ///
    /// Panics if the current thread already holds the lock.
    pub fn acquire(&self) {
        let tid = Current::get_tid();
        let mut holder = self.holder.lock();
        if *holder == Some(tid) {
            holder.unlock();
            panic!("Lock `{}` is acquired twice by thread {tid}.", self.name);
        }
        while holder.is_some() {
            holder = self.released.wait(holder);
        }
        *holder = Some(tid);
        holder.unlock();
    }

    /// Acquires the lock only if it is free right now.
    pub fn try_acquire(&self) -> Result<(), WouldBlock> {
        let mut holder = self.holder.lock();
        let result = if holder.is_none() {
            *holder = Some(Current::get_tid());
            Ok(())
        } else {
            Err(WouldBlock)
        };
        holder.unlock();
        result
    }

    /// Releases the lock and wakes up one waiter.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::OperationNotPermitted`] if the current thread
    /// does not hold the lock.
    pub fn release(&self) -> Result<(), KernelError> {
        let mut holder = self.holder.lock();
        if *holder != Some(Current::get_tid()) {
            holder.unlock();
            return Err(KernelError::OperationNotPermitted);
        }
        *holder = None;
        self.released.signal(holder);
        Ok(())
    }

    /// Returns `true` if the current thread holds the lock.
    pub fn do_i_hold(&self) -> bool {
        let holder = self.holder.lock();
        let mine = *holder == Some(Current::get_tid());
        holder.unlock();
        mine
    }

    /// Returns `true` if nobody holds or waits for the lock.
    pub fn is_idle(&self) -> bool {
        let holder = self.holder.lock();
        let idle = holder.is_none() && !self.released.has_waiters();
        holder.unlock();
        idle
    }
}
