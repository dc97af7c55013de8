//! # Exit status of processes.
//!
//! The vehicles of a simulation are children of the driver, and the driver
//! waits for each of them to learn how it ended. [`ProcessTable`] keeps the
//! parent and the exit status of every process until its parent collects
//! the status with [`ProcessTable::waitpid`].
//!
//! - A process that exits stays in the table as a zombie until its parent
//!   waits for it.
//! - When a parent exits, its zombie children are reaped and its live
//!   children become orphans. Nobody waits for an orphan, so an orphan is
//!   removed as soon as it exits.
//!
//! One [`Mutex`] guards the table and one [`ConditionVariable`] is broadcast
//! on every exit.
//!
//! [`Mutex`]: crate::sync::Mutex
//! [`ConditionVariable`]: crate::sync::ConditionVariable

use crate::sync::{ConditionVariable, Mutex};
use alloc::{collections::btree_map::BTreeMap, vec::Vec};
use core::sync::atomic::{AtomicU64, Ordering};
use keos::KernelError;

/// A process id.
pub type Pid = u64;

struct Process {
    parent: Option<Pid>,
    exit_code: Option<i32>,
}

/// Table of the processes and their exit status.
pub struct ProcessTable {
    processes: Mutex<BTreeMap<Pid, Process>>,
    exited: ConditionVariable,
    next_pid: AtomicU64,
}

impl ProcessTable {
    /// Create an empty table. The first pid handed out is 1.
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(BTreeMap::new()),
            exited: ConditionVariable::new(),
            next_pid: AtomicU64::new(1),
        }
    }

    /// Register a new process, child of `parent`.
    ///
    /// # Errors
    ///
    /// [`KernelError::NoSuchEntry`] if `parent` is not a live process.
    pub fn spawn(&self, parent: Option<Pid>) -> Result<Pid, KernelError> {
        let mut processes = self.processes.lock();
        if let Some(parent) = parent {
            if !matches!(processes.get(&parent), Some(Process { exit_code: None, .. })) {
                processes.unlock();
                return Err(KernelError::NoSuchEntry);
            }
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        processes.insert(
            pid,
            Process {
                parent,
                exit_code: None,
            },
        );
        processes.unlock();
        Ok(pid)
    }

    /// Terminate `pid` with `code`.
    ///
    /// # Errors
    ///
    /// [`KernelError::NoSuchEntry`] if `pid` is unknown or already exited.
    pub fn exit(&self, pid: Pid, code: i32) -> Result<(), KernelError> {
        let mut processes = self.processes.lock();
        let parent = match processes.get_mut(&pid) {
            Some(process) if process.exit_code.is_none() => {
                process.exit_code = Some(code);
                Some(process.parent)
            }
            _ => None,
        };
        let Some(parent) = parent else {
            processes.unlock();
            return Err(KernelError::NoSuchEntry);
        };
        let children = processes
            .iter()
            .filter(|(_, process)| process.parent == Some(pid))
            .map(|(child, process)| (*child, process.exit_code.is_some()))
            .collect::<Vec<_>>();
        for (child, zombie) in children {
            if zombie {
                processes.remove(&child);
            } else if let Some(process) = processes.get_mut(&child) {
                process.parent = None;
            }
        }
        if parent.is_none() {
            processes.remove(&pid);
        }
        self.exited.broadcast(processes);
        Ok(())
    }

    /// Wait for the child `pid` of `caller` to exit, reap it, and return its
    /// exit code.
    ///
    /// # Errors
    ///
    /// - [`KernelError::InvalidArgument`] if `options` is not 0.
    /// - [`KernelError::NoSuchEntry`] if `pid` is unknown.
    /// - [`KernelError::OperationNotPermitted`] if `pid` is not a child of
    ///   `caller`.
    pub fn waitpid(&self, caller: Pid, pid: Pid, options: i32) -> Result<i32, KernelError> {
        if options != 0 {
            return Err(KernelError::InvalidArgument);
        }
        let mut processes = self.processes.lock();
        loop {
            let status = match processes.get(&pid) {
                None => Err(KernelError::NoSuchEntry),
                Some(process) if process.parent != Some(caller) => {
                    Err(KernelError::OperationNotPermitted)
                }
                Some(process) => Ok(process.exit_code),
            };
            match status {
                Ok(None) => processes = self.exited.wait(processes),
                Ok(Some(code)) => {
                    processes.remove(&pid);
                    processes.unlock();
                    return Ok(code);
                }
                Err(e) => {
                    processes.unlock();
                    return Err(e);
                }
            }
        }
    }

    /// Returns `true` if `pid` has not exited yet.
    pub fn is_alive(&self, pid: Pid) -> bool {
        let processes = self.processes.lock();
        let alive = matches!(processes.get(&pid), Some(Process { exit_code: None, .. }));
        processes.unlock();
        alive
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
