//! # The intersection.
//!
//! [`Intersection`] is what the vehicles talk to. It classifies the request,
//! lets the chosen [`AdmissionController`] decide when the vehicle may go,
//! and records every vehicle inside with the thread that drove it in, to
//! catch protocol violations the same way whatever the controller.
//!
//! A vehicle goes through `Requesting -> Admitted -> Departed`.
//! [`Intersection::before_entry`] and [`Intersection::after_exit`] drive the
//! two transitions. [`Intersection::enter`] does the same with a typed
//! [`Admission`] token:
//!
//! ```rust
//! use keos_synchprobs::{ControllerKind, Direction, Intersection};
//!
//! let intersection = Intersection::new(ControllerKind::LockOrder);
//! let admission = intersection.enter(Direction::North, Direction::South).unwrap();
//! // ... cross ...
//! admission.exit().unwrap();
//! intersection.cleanup().unwrap();
//! ```
//!
//! ## Process-wide intersection
//!
//! The free functions [`controller_init`], [`before_entry`], [`after_exit`]
//! and [`controller_cleanup`] operate on a single intersection shared by the
//! whole process, mirroring the interface a simulation driver expects.

use crate::{
    TrafficError,
    controller::{AdmissionController, ControllerKind},
    direction::Direction,
    movement::Movement,
    sync::Mutex,
};
use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::marker::PhantomData;
use keos::{sync::SpinLock, thread::Current};

/// A four-way intersection guarded by an [`AdmissionController`].
pub struct Intersection {
    kind: ControllerKind,
    controller: Box<dyn AdmissionController>,
    // The vehicles inside, with the tid of the thread that entered.
    inside: Mutex<Vec<(Movement, u64)>>,
}

impl Intersection {
    /// Create an empty intersection guarded by a controller of `kind`.
    pub fn new(kind: ControllerKind) -> Self {
        let controller = kind.build();
        keos::info!("intersection: {} controller ready", controller.name());
        Self {
            kind,
            controller,
            inside: Mutex::new(Vec::new()),
        }
    }

    /// The kind of the controller guarding this intersection.
    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    /// Block until the vehicle driving from `origin` to `destination` may
    /// enter.
    ///
    /// # Errors
    ///
    /// [`TrafficError::IllegalMovement`] for a U-turn, before blocking.
    pub fn before_entry(&self, origin: Direction, destination: Direction) -> Result<(), TrafficError> {
        let movement = Movement::new(origin, destination)?;
        keos::debug!("{movement}: arrives");
        self.controller.admit(movement);
        self.record_entry(movement);
        Ok(())
    }

    /// Let the vehicle enter only if it can do so without waiting.
    ///
    /// Returns `Ok(false)` if the vehicle would have to wait.
    pub fn try_before_entry(
        &self,
        origin: Direction,
        destination: Direction,
    ) -> Result<bool, TrafficError> {
        let movement = Movement::new(origin, destination)?;
        if self.controller.try_admit(movement).is_err() {
            keos::debug!("{movement}: would block");
            return Ok(false);
        }
        self.record_entry(movement);
        Ok(true)
    }

    /// Record that the vehicle driving from `origin` to `destination` left.
    ///
    /// Never blocks. Must be called by the thread that entered.
    pub fn after_exit(&self, origin: Direction, destination: Direction) -> Result<(), TrafficError> {
        let movement = Movement::new(origin, destination)?;
        match self.leave(movement) {
            Err(TrafficError::MisuseViolation(what)) => TrafficError::misuse(what),
            result => result,
        }
    }

    // Departure without the misuse policy. Violations come back as plain
    // `MisuseViolation`s.
    fn leave(&self, movement: Movement) -> Result<(), TrafficError> {
        let tid = Current::get_tid();
        let mut inside = self.inside.lock();
        let Some(position) = inside.iter().position(|vehicle| *vehicle == (movement, tid)) else {
            let entered_elsewhere = inside.iter().any(|(other, _)| *other == movement);
            inside.unlock();
            return Err(TrafficError::MisuseViolation(if entered_elsewhere {
                "a vehicle left from a thread that did not enter"
            } else {
                "a vehicle left without entering"
            }));
        };
        inside.swap_remove(position);
        inside.unlock();
        if let Err(e) = self.controller.release(movement) {
            // Put the bookkeeping back; the vehicle is still considered inside.
            let mut inside = self.inside.lock();
            inside.push((movement, tid));
            inside.unlock();
            return Err(e);
        }
        keos::debug!("{movement}: leaves");
        Ok(())
    }

    /// Like [`Intersection::before_entry`], but returns a token that must be
    /// spent with [`Admission::exit`].
    pub fn enter(
        &self,
        origin: Direction,
        destination: Direction,
    ) -> Result<Admission<'_>, TrafficError> {
        let movement = Movement::new(origin, destination)?;
        self.before_entry(origin, destination)?;
        Ok(Admission {
            intersection: self,
            movement,
            _not_send: PhantomData,
        })
    }

    /// The movements currently inside, in ascending order.
    pub fn occupants(&self) -> Vec<Movement> {
        let inside = self.inside.lock();
        let mut occupants = inside.iter().map(|(movement, _)| *movement).collect::<Vec<_>>();
        inside.unlock();
        occupants.sort();
        occupants
    }

    /// Tear the intersection down.
    ///
    /// # Errors
    ///
    /// Misuse if a vehicle is still inside or waiting.
    pub fn cleanup(self) -> Result<(), TrafficError> {
        if let Some(what) = self.busy() {
            return TrafficError::misuse(what);
        }
        keos::info!("intersection: {} controller cleaned up", self.controller.name());
        Ok(())
    }

    fn busy(&self) -> Option<&'static str> {
        let occupants = self.occupants();
        if !occupants.is_empty() {
            keos::warning!("intersection: still occupied by {occupants:?}");
            return Some("cleanup while vehicles are inside");
        }
        if !self.controller.is_idle() {
            return Some("cleanup while vehicles are waiting");
        }
        None
    }

    fn record_entry(&self, movement: Movement) {
        let mut inside = self.inside.lock();
        inside.push((movement, Current::get_tid()));
        inside.unlock();
        keos::debug!("{movement}: enters");
    }
}

/// A vehicle inside the intersection.
///
/// Created by [`Intersection::enter`]. Dropping it without calling
/// [`Admission::exit`] panics, as the vehicle would block the conflicting
/// traffic forever.
pub struct Admission<'a> {
    intersection: &'a Intersection,
    movement: Movement,
    // A vehicle leaves on the thread it entered on.
    _not_send: PhantomData<*const ()>,
}

impl Admission<'_> {
    /// The movement of the vehicle.
    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Leave the intersection.
    pub fn exit(self) -> Result<(), TrafficError> {
        let result = self
            .intersection
            .after_exit(self.movement.origin, self.movement.destination());
        core::mem::forget(self);
        result
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            // Already unwinding: a violation here must not panic again.
            if let Err(e) = self.intersection.leave(self.movement) {
                keos::warning!("{}: not released while unwinding: {e:?}", self.movement);
            }
            return;
        }
        panic!("`.exit()` must be explicitly called for Admission.");
    }
}

static INTERSECTION: SpinLock<Option<Arc<Intersection>>> = SpinLock::new(None);

fn current() -> Result<Arc<Intersection>, TrafficError> {
    let slot = INTERSECTION.lock();
    let intersection = slot.clone();
    slot.unlock();
    match intersection {
        Some(intersection) => Ok(intersection),
        None => TrafficError::misuse("intersection used before init or after cleanup"),
    }
}

/// Create the process-wide intersection.
pub fn controller_init(kind: ControllerKind) -> Result<(), TrafficError> {
    let intersection = Arc::new(Intersection::new(kind));
    let mut slot = INTERSECTION.lock();
    if slot.is_some() {
        slot.unlock();
        return TrafficError::misuse("intersection initialized twice");
    }
    *slot = Some(intersection);
    slot.unlock();
    Ok(())
}

/// Tear the process-wide intersection down.
///
/// Every vehicle must have left.
pub fn controller_cleanup() -> Result<(), TrafficError> {
    let mut slot = INTERSECTION.lock();
    let intersection = slot.take();
    slot.unlock();
    let Some(intersection) = intersection else {
        return TrafficError::misuse("cleanup without init");
    };
    let (intersection, what) = match Arc::try_unwrap(intersection) {
        Ok(intersection) => match intersection.busy() {
            None => return intersection.cleanup(),
            Some(what) => (Arc::new(intersection), what),
        },
        Err(intersection) => (intersection, "cleanup while requests are in flight"),
    };
    // Still in use: leave it in place.
    let mut slot = INTERSECTION.lock();
    *slot = Some(intersection);
    slot.unlock();
    TrafficError::misuse(what)
}

/// [`Intersection::before_entry`] on the process-wide intersection.
pub fn before_entry(origin: Direction, destination: Direction) -> Result<(), TrafficError> {
    current()?.before_entry(origin, destination)
}

/// [`Intersection::after_exit`] on the process-wide intersection.
pub fn after_exit(origin: Direction, destination: Direction) -> Result<(), TrafficError> {
    current()?.after_exit(origin, destination)
}
