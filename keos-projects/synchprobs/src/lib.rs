//! # Synchronization Problems: The Traffic Intersection
//!
//! Vehicles arrive at a four-way intersection from the north, east, south
//! and west, and each wants to leave on one of the other three roads. The
//! intersection is a shared resource: two vehicles whose paths cross must
//! never be inside at the same time, while vehicles whose paths do not cross
//! should be allowed to drive through together.
//!
//! In this project, you build the **admission controller** of the
//! intersection. Every vehicle is a thread that calls
//! [`Intersection::before_entry`] before it drives in, and
//! [`Intersection::after_exit`] after it drives out. `before_entry` puts the
//! thread to sleep until the vehicle can enter safely; `after_exit` wakes up
//! the vehicles that may proceed.
//!
//! ## Getting Started
//!
//! To get started, navigate to the `synchprobs/grader` directory and run:
//!
//! ```bash
//! $ cargo run
//! ```
//!
//! Enable the `quadrant` feature to make the quadrant controller the
//! default:
//!
//! ```bash
//! $ cargo run --features keos-synchprobs/quadrant
//! ```
//!
//! ## Project Outline
//!
//! - [`Synchronization Primitives`]: the sleeping primitives the controllers
//!   are built from.
//! - [`Movements`]: classify a request into a right turn, a straight crossing
//!   or a left turn.
//! - [`Conflict Model`]: which movements may be inside together.
//! - [`Admission Controllers`]: three strategies to admit the vehicles.
//! - [`Intersection`]: the interface of the vehicles.
//! - [`Simulation`]: a crowd of vehicles with an independent monitor.
//! - [`Exit Status`]: how the driver collects the exit status of its
//!   children.
//!
//! [`Synchronization Primitives`]: sync
//! [`Movements`]: movement
//! [`Conflict Model`]: conflict
//! [`Admission Controllers`]: controller
//! [`Simulation`]: simulation
//! [`Exit Status`]: process

#![deny(rustdoc::broken_intra_doc_links)]

extern crate alloc;

pub mod conflict;
pub mod controller;
pub mod direction;
pub mod error;
pub mod intersection;
pub mod movement;
pub mod process;
pub mod quadrant;
pub mod simulation;
pub mod sync;

pub use controller::{AdmissionController, ControllerKind};
pub use direction::Direction;
pub use error::TrafficError;
pub use intersection::{
    Admission, Intersection, after_exit, before_entry, controller_cleanup, controller_init,
};
pub use movement::{Movement, MovementClass, classify};
