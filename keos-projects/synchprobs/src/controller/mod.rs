//! # Admission controllers.
//!
//! An admission controller decides when a vehicle may enter the
//! intersection. [`AdmissionController::admit`] blocks until the movement is
//! compatible with everything inside, and marks it as inside.
//! [`AdmissionController::release`] marks it as gone and wakes the vehicles
//! that may now proceed.
//!
//! Three controllers implement the same contract:
//!
//! | Controller                | Resource                          | Concurrency                     |
//! |---------------------------|-----------------------------------|---------------------------------|
//! | [`LockOrderController`]   | One [`Lock`] per movement         | Exactly the conflict relation   |
//! | [`QuadrantController`]    | Four quadrant flags, one mutex    | Disjoint footprints             |
//! | [`SerialController`]      | One permit of a [`Semaphore`]     | One vehicle at a time           |
//!
//! [`Lock`]: crate::sync::Lock
//! [`Semaphore`]: crate::sync::Semaphore

pub mod lock_order;
pub mod quadrant;
pub mod serial;

pub use lock_order::LockOrderController;
pub use quadrant::QuadrantController;
pub use serial::SerialController;

use crate::{TrafficError, movement::Movement};
use alloc::boxed::Box;
use keos::sync::WouldBlock;

/// A strategy to admit vehicles into the intersection.
pub trait AdmissionController: Send + Sync {
    /// A short name for the log.
    fn name(&self) -> &'static str;

    /// Block until `movement` may enter, then mark it as inside.
    fn admit(&self, movement: Movement);

    /// Mark `movement` as inside if it may enter right now.
    fn try_admit(&self, movement: Movement) -> Result<(), WouldBlock>;

    /// Mark a previously admitted `movement` as gone.
    ///
    /// Must be called by the thread that admitted the movement.
    fn release(&self, movement: Movement) -> Result<(), TrafficError>;

    /// Returns `true` if nobody is inside or waiting.
    fn is_idle(&self) -> bool;
}

/// Selects an [`AdmissionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// [`LockOrderController`].
    LockOrder,
    /// [`QuadrantController`].
    Quadrant,
    /// [`SerialController`].
    Serial,
}

impl ControllerKind {
    /// Every controller.
    pub const ALL: [ControllerKind; 3] = [
        ControllerKind::LockOrder,
        ControllerKind::Quadrant,
        ControllerKind::Serial,
    ];

    /// Create a fresh controller of this kind.
    pub fn build(self) -> Box<dyn AdmissionController> {
        match self {
            ControllerKind::LockOrder => Box::new(LockOrderController::new()),
            ControllerKind::Quadrant => Box::new(QuadrantController::new()),
            ControllerKind::Serial => Box::new(SerialController::new()),
        }
    }
}

impl Default for ControllerKind {
    fn default() -> Self {
        if cfg!(feature = "quadrant") {
            ControllerKind::Quadrant
        } else {
            ControllerKind::LockOrder
        }
    }
}
