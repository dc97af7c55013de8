//! Thread abstration, an abstraction of an execution context.
//!
//! ## The threading model
//!
//! An executing kernel consists of a collection of threads, each with their
//! own stack and local state. Threads can be named, and provide some built-in
//! support for low-level synchronization.
//!
//! In this kernel, every thread is backed by a thread of the host. The kernel
//! keeps track of the id and the state of each live thread, and provides the
//! single blocking primitive that every synchronization primitive builds on:
//! [`Current::park_with`], which puts the current thread to sleep until its
//! [`ParkHandle`] is consumed by [`ParkHandle::unpark`].
use crate::{KernelError, sync::SpinLock};
use alloc::{collections::btree_map::BTreeMap, string::String};
use core::{
    cell::Cell,
    sync::atomic::{AtomicU64, Ordering},
};
use crossbeam_utils::sync::{Parker, Unparker};

/// A possible state of the thread.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ThreadState {
    /// Thread is running (or is ready to run).
    Running,
    /// Thread is parked.
    Parked,
    /// Thread is exited with exitcode.
    Exited(i32),
}

static NEXT_TID: AtomicU64 = AtomicU64::new(1);
static THREAD_STATE_TABLE: SpinLock<BTreeMap<u64, ThreadState>> = SpinLock::new(BTreeMap::new());

fn set_state(tid: u64, state: ThreadState) {
    let mut tst = THREAD_STATE_TABLE.lock();
    match state {
        ThreadState::Exited(_) => {
            tst.remove(&tid);
        }
        state => {
            tst.insert(tid, state);
        }
    }
    tst.unlock();
}

/// Get the state of the thread `tid`.
///
/// Only live threads are tracked; an exited (or never existed) thread
/// reports [`KernelError::NoSuchEntry`].
pub fn get_state_by_tid(tid: u64) -> Result<ThreadState, KernelError> {
    let tst = THREAD_STATE_TABLE.lock();
    let result = tst.get(&tid).copied();
    tst.unlock();
    result.ok_or(KernelError::NoSuchEntry)
}

/// Per-thread bookkeeping of the kernel.
struct Local {
    tid: u64,
    parker: Parker,
}

impl Local {
    fn register(tid: u64) -> Self {
        set_state(tid, ThreadState::Running);
        Self {
            tid,
            parker: Parker::new(),
        }
    }
}

impl Drop for Local {
    fn drop(&mut self) {
        set_state(self.tid, ThreadState::Exited(0));
    }
}

thread_local! {
    // Set by `ThreadBuilder` before the first touch of `CURRENT`, so that the
    // spawned thread takes the tid already handed out to its `JoinHandle`.
    static RESERVED_TID: Cell<Option<u64>> = const { Cell::new(None) };
    static CURRENT: Local = Local::register(
        RESERVED_TID
            .with(|tid| tid.take())
            .unwrap_or_else(|| NEXT_TID.fetch_add(1, Ordering::SeqCst)),
    );
}

/// A handle to wake up a parked thread.
///
/// The handle is created by [`Current::park_with`] for the current thread.
/// Consuming it with [`ParkHandle::unpark`] wakes the thread up. If the
/// handle is unparked before the thread actually falls asleep, the thread
/// does not sleep at all; a wakeup is never lost.
pub struct ParkHandle {
    /// Thread id of the parked thread.
    pub tid: u64,
    unparker: Unparker,
}

impl ParkHandle {
    /// Consume the handle and unpark the underlying thread.
    pub fn unpark(self) {
        self.unparker.unpark();
    }
}

/// A handle to join thread.
pub struct JoinHandle {
    /// Thread id of this handle.
    pub tid: u64,
    inner: std::thread::JoinHandle<i32>,
}

impl JoinHandle {
    /// Join this handle and returns exit code.
    ///
    /// A thread that returns normally exits with 0. A thread that panics
    /// exits with -1.
    pub fn join(self) -> i32 {
        self.inner.join().unwrap_or(-1)
    }
}

/// The opaque structure indicating the running thread.
pub struct Current {
    _p: (),
}

impl Current {
    /// Run a function `f` with [`ParkHandle`] for current thread, and then park
    /// the current thread.
    ///
    /// `f` is where the handle gets published (e.g. pushed into a waiter
    /// queue). The thread is marked as [`ThreadState::Parked`] before `f` runs
    /// and back to [`ThreadState::Running`] once it is woken up.
    pub fn park_with(f: impl FnOnce(ParkHandle)) {
        CURRENT.with(|th| {
            set_state(th.tid, ThreadState::Parked);
            f(ParkHandle {
                tid: th.tid,
                unparker: th.parker.unparker().clone(),
            });
            th.parker.park();
            set_state(th.tid, ThreadState::Running);
        });
    }

    /// Get the current thread's id.
    pub fn get_tid() -> u64 {
        CURRENT.with(|th| th.tid)
    }

    /// Give up the cpu to another runnable thread.
    pub fn yield_now() {
        std::thread::yield_now();
    }
}

/// A struct to build a new thread.
pub struct ThreadBuilder {
    name: String,
    tid: u64,
}

impl ThreadBuilder {
    /// Create a new thread builder for thread `name`.
    pub fn new<I>(name: I) -> Self
    where
        String: From<I>,
    {
        Self {
            name: String::from(name),
            tid: NEXT_TID.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Get the thread id of this thread.
    pub fn get_tid(&self) -> u64 {
        self.tid
    }

    /// Spawn the thread.
    ///
    /// # Panics
    ///
    /// Panics if the host refuses to create a thread. Use
    /// [`ThreadBuilder::try_spawn`] to handle the failure.
    pub fn spawn<F: FnOnce() + Send + 'static>(self, thread_fn: F) -> JoinHandle {
        let name = self.name.clone();
        match self.try_spawn(thread_fn) {
            Ok(handle) => handle,
            Err(e) => panic!("Failed to spawn thread `{name}`: {e:?}"),
        }
    }

    /// Spawn the thread, reporting [`KernelError::NoMemory`] if the thread
    /// can not be created.
    pub fn try_spawn<F: FnOnce() + Send + 'static>(
        self,
        thread_fn: F,
    ) -> Result<JoinHandle, KernelError> {
        let Self { name, tid } = self;
        set_state(tid, ThreadState::Running);
        std::thread::Builder::new()
            .name(name)
            .spawn(move || {
                RESERVED_TID.with(|reserved| reserved.set(Some(tid)));
                CURRENT.with(|_| ());
                thread_fn();
                0
            })
            .map(|inner| JoinHandle { tid, inner })
            .map_err(|_| {
                set_state(tid, ThreadState::Exited(-1));
                KernelError::NoMemory
            })
    }
}
