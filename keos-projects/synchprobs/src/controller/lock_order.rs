//! Admission by ordered per-movement locks.
//!
//! Every movement owns a [`Lock`]; holding it means "this movement is inside
//! the intersection". To enter, a vehicle takes the locks of every movement
//! in its conflict set (its own included) in ascending [`Movement::index`]
//! order. Once it holds all of them, no conflicting vehicle is inside and
//! none can enter, so it keeps only its own lock and releases the others.
//!
//! The whole conflict set is taken under one bookkeeping [`Mutex`], all or
//! nothing. If a lock of the set is held, the vehicle gives back the ones it
//! took and sleeps on a [`ConditionVariable`] broadcast on every departure.
//! A waiting vehicle therefore holds no lock at all, and a movement that
//! conflicts with nobody inside is admitted at once even while conflicting
//! vehicles are waiting.
//!
//! [`Mutex`]: crate::sync::Mutex
//! [`ConditionVariable`]: crate::sync::ConditionVariable

use super::AdmissionController;
use crate::{
    TrafficError,
    conflict::CONFLICTS,
    movement::Movement,
    sync::{ConditionVariable, Lock, Mutex},
};
use alloc::format;
use arrayvec::ArrayVec;
use keos::sync::WouldBlock;

/// The lock-hierarchy admission controller.
pub struct LockOrderController {
    bookkeeping: Mutex<()>,
    departed: ConditionVariable,
    locks: [Lock; Movement::COUNT],
    conflict_sets: [ArrayVec<Movement, { Movement::COUNT }>; Movement::COUNT],
}

impl LockOrderController {
    /// Create the twelve movement locks and precompute the conflict sets.
    pub fn new() -> Self {
        Self {
            bookkeeping: Mutex::new(()),
            departed: ConditionVariable::new(),
            locks: core::array::from_fn(|i| Lock::new(format!("{}", Movement::ALL[i]))),
            conflict_sets: core::array::from_fn(|i| CONFLICTS.conflict_set(Movement::ALL[i])),
        }
    }

    fn lock(&self, movement: Movement) -> &Lock {
        &self.locks[movement.index()]
    }

    // Take the conflict set of `movement` in ascending order and keep only
    // its own lock. Gives everything back if a lock is held. Called with the
    // bookkeeping mutex held.
    fn claim(&self, movement: Movement) -> Result<(), WouldBlock> {
        let set = &self.conflict_sets[movement.index()];
        for (taken, other) in set.iter().enumerate() {
            if self.lock(*other).try_acquire().is_err() {
                for held in set[..taken].iter().rev() {
                    let released = self.lock(*held).release();
                    debug_assert!(released.is_ok());
                }
                return Err(WouldBlock);
            }
        }
        for other in set.iter().filter(|other| **other != movement) {
            let released = self.lock(*other).release();
            debug_assert!(released.is_ok());
        }
        Ok(())
    }
}

impl Default for LockOrderController {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionController for LockOrderController {
    fn name(&self) -> &'static str {
        "lock-order"
    }

    fn admit(&self, movement: Movement) {
        let mut guard = self.bookkeeping.lock();
        while self.claim(movement).is_err() {
            guard = self.departed.wait(guard);
        }
        guard.unlock();
    }

    fn try_admit(&self, movement: Movement) -> Result<(), WouldBlock> {
        let guard = self.bookkeeping.lock();
        let result = self.claim(movement);
        guard.unlock();
        result
    }

    fn release(&self, movement: Movement) -> Result<(), TrafficError> {
        let guard = self.bookkeeping.lock();
        let lock = self.lock(movement);
        if lock.release().is_err() {
            guard.unlock();
            keos::warning!("{}: released by a thread that does not hold it", lock.name());
            return Err(TrafficError::MisuseViolation(
                "movement released by a thread that was not admitted",
            ));
        }
        self.departed.broadcast(guard);
        Ok(())
    }

    fn is_idle(&self) -> bool {
        let guard = self.bookkeeping.lock();
        let idle = !self.departed.has_waiters() && self.locks.iter().all(Lock::is_idle);
        guard.unlock();
        idle
    }
}
