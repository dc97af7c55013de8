//! Admission of one vehicle at a time.
//!
//! The intersection is a single resource guarded by a one-permit
//! [`Semaphore`]. The permit is taken in [`admit`] and given back in
//! [`release`], which may run in a different call frame, so the RAII permit
//! is forgotten on admission and the semaphore is signaled by hand.
//!
//! This is always correct and never concurrent; the other controllers are
//! measured against it.
//!
//! [`admit`]: AdmissionController::admit
//! [`release`]: AdmissionController::release

use super::AdmissionController;
use crate::{TrafficError, movement::Movement, sync::Semaphore};
use keos::sync::WouldBlock;

/// The single-permit admission controller.
pub struct SerialController {
    intersection: Semaphore<()>,
}

impl SerialController {
    /// Create a controller with a free intersection.
    pub fn new() -> Self {
        Self {
            intersection: Semaphore::new(1, ()),
        }
    }
}

impl Default for SerialController {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionController for SerialController {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn admit(&self, _movement: Movement) {
        core::mem::forget(self.intersection.wait());
    }

    fn try_admit(&self, _movement: Movement) -> Result<(), WouldBlock> {
        self.intersection.try_wait().map(core::mem::forget)
    }

    fn release(&self, movement: Movement) -> Result<(), TrafficError> {
        if self.intersection.permits() != 0 {
            keos::warning!("{movement}: released an empty intersection");
            return Err(TrafficError::MisuseViolation(
                "movement released while the intersection is empty",
            ));
        }
        self.intersection.signal();
        Ok(())
    }

    fn is_idle(&self) -> bool {
        self.intersection.permits() == 1
    }
}
