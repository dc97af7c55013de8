//! Admission by quadrant occupancy.
//!
//! One mutex guards the set of occupied [`Quadrants`]. A vehicle computes
//! the [`footprint`] of its movement and sleeps while any quadrant of it is
//! occupied; it always sleeps on the condition variable of the first busy
//! quadrant in ring order. When the whole footprint is free it claims every
//! quadrant at once, so a vehicle never holds part of its path while
//! waiting for the rest.
//!
//! A departing vehicle frees its quadrants and wakes every sleeper of each
//! of them: a sleeper may need several quadrants, so waking a single one
//! could pick a vehicle that still can not proceed while another could.

use super::AdmissionController;
use crate::{
    TrafficError,
    movement::Movement,
    quadrant::{Quadrants, footprint},
    sync::{ConditionVariable, Mutex},
};
use keos::sync::WouldBlock;

/// The quadrant-flag admission controller.
pub struct QuadrantController {
    occupied: Mutex<Quadrants>,
    vacated: [ConditionVariable; 4],
}

impl QuadrantController {
    /// Create a controller with an empty intersection.
    pub fn new() -> Self {
        Self {
            occupied: Mutex::new(Quadrants::empty()),
            vacated: core::array::from_fn(|_| ConditionVariable::new()),
        }
    }

    fn first_busy(occupied: Quadrants, needed: Quadrants) -> Option<usize> {
        (occupied & needed).each().next().and_then(Quadrants::ring_index)
    }
}

impl Default for QuadrantController {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionController for QuadrantController {
    fn name(&self) -> &'static str {
        "quadrant"
    }

    fn admit(&self, movement: Movement) {
        let needed = footprint(movement);
        let mut occupied = self.occupied.lock();
        while let Some(busy) = Self::first_busy(*occupied, needed) {
            occupied = self.vacated[busy].wait(occupied);
        }
        occupied.insert(needed);
        occupied.unlock();
    }

    fn try_admit(&self, movement: Movement) -> Result<(), WouldBlock> {
        let needed = footprint(movement);
        let mut occupied = self.occupied.lock();
        let result = if occupied.intersects(needed) {
            Err(WouldBlock)
        } else {
            occupied.insert(needed);
            Ok(())
        };
        occupied.unlock();
        result
    }

    fn release(&self, movement: Movement) -> Result<(), TrafficError> {
        let freed = footprint(movement);
        let mut occupied = self.occupied.lock();
        if !occupied.contains(freed) {
            occupied.unlock();
            keos::warning!("{movement}: released quadrants {freed:?} are not occupied");
            return Err(TrafficError::MisuseViolation(
                "movement released while its quadrants are free",
            ));
        }
        occupied.remove(freed);
        for quadrant in freed.each() {
            if let Some(index) = quadrant.ring_index() {
                self.vacated[index].wake_all(&occupied);
            }
        }
        occupied.unlock();
        Ok(())
    }

    fn is_idle(&self) -> bool {
        let occupied = self.occupied.lock();
        let idle = occupied.is_empty() && !self.vacated.iter().any(ConditionVariable::has_waiters);
        occupied.unlock();
        idle
    }
}
