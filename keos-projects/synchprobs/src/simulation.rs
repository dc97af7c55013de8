//! # Traffic simulation.
//!
//! The simulation drives an [`Intersection`] with a crowd of vehicle
//! threads. Each vehicle repeatedly picks a random legal movement, asks to
//! enter, crosses while yielding the cpu a few times, and leaves. A
//! [`Monitor`] independent from the controller watches the vehicles inside
//! and counts every pair of conflicting movements it sees together.
//!
//! Every vehicle is a child process of the driver in a [`ProcessTable`]. A
//! vehicle exits with 0 once it is done, 1 if the intersection refused one of
//! its requests, and -1 if it crashed; the driver collects the status of each
//! of them with [`ProcessTable::waitpid`].
//!
//! The random movements come from a [`ChaCha8Rng`] seeded by the
//! configuration, with one stream per vehicle, so the sequence of requests
//! of every vehicle is reproducible.
//!
//! ```rust
//! use keos_synchprobs::{ControllerKind, simulation::{self, SimulationConfigBuilder}};
//!
//! let config = SimulationConfigBuilder::new()
//!     .controller(ControllerKind::Quadrant)
//!     .vehicles(4)
//!     .rounds(8)
//!     .build();
//! let report = simulation::run(&config).unwrap();
//! assert_eq!(report.admitted, 32);
//! assert_eq!(report.violations, 0);
//! ```

use crate::{
    TrafficError,
    conflict::conflicts,
    controller::ControllerKind,
    intersection::Intersection,
    movement::Movement,
    process::{Pid, ProcessTable},
};
use alloc::{format, sync::Arc, vec::Vec};
use keos::{
    sync::SpinLock,
    thread::{Current, ThreadBuilder},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Parameters of a simulation. Built with [`SimulationConfigBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    controller: ControllerKind,
    vehicles: usize,
    rounds: usize,
    seed: u64,
    crossing_yields: usize,
}

impl SimulationConfig {
    /// The admission controller under test.
    pub fn controller(&self) -> ControllerKind {
        self.controller
    }

    /// The number of vehicle threads.
    pub fn vehicles(&self) -> usize {
        self.vehicles
    }

    /// The number of crossings per vehicle.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            controller: ControllerKind::default(),
            vehicles: 8,
            rounds: 16,
            seed: 0,
            crossing_yields: 8,
        }
    }
}

/// Builder of a [`SimulationConfig`], starting from the defaults.
#[derive(Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the admission controller.
    pub fn controller(mut self, controller: ControllerKind) -> Self {
        self.config.controller = controller;
        self
    }

    /// Sets the number of vehicle threads.
    pub fn vehicles(mut self, vehicles: usize) -> Self {
        self.config.vehicles = vehicles;
        self
    }

    /// Sets the number of crossings each vehicle makes.
    pub fn rounds(mut self, rounds: usize) -> Self {
        self.config.rounds = rounds;
        self
    }

    /// Sets the seed of the random movements.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Sets how many times a vehicle yields the cpu while crossing. More
    /// yields keep the vehicles inside longer, and make them meet more.
    pub fn crossing_yields(mut self, crossing_yields: usize) -> Self {
        self.config.crossing_yields = crossing_yields;
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> SimulationConfig {
        self.config
    }
}

/// What a simulation observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// The admission controller under test.
    pub controller: ControllerKind,
    /// Number of crossings.
    pub admitted: usize,
    /// Number of crossings per movement, indexed by [`Movement::index`].
    pub per_movement: [usize; Movement::COUNT],
    /// The largest number of vehicles seen inside at once.
    pub max_concurrent: usize,
    /// Number of conflicting pairs seen inside at once.
    pub violations: usize,
}

#[derive(Default)]
struct MonitorState {
    inside: Vec<Movement>,
    admitted: usize,
    per_movement: [usize; Movement::COUNT],
    max_concurrent: usize,
    violations: usize,
}

/// Watches the vehicles inside the intersection.
#[derive(Default)]
pub struct Monitor {
    state: SpinLock<MonitorState>,
}

impl Monitor {
    /// A vehicle doing `movement` is now inside.
    pub fn enter(&self, movement: Movement) {
        let mut state = self.state.lock();
        let conflicting = state
            .inside
            .iter()
            .filter(|other| conflicts(movement, **other))
            .count();
        state.violations += conflicting;
        state.inside.push(movement);
        state.admitted += 1;
        state.per_movement[movement.index()] += 1;
        state.max_concurrent = state.max_concurrent.max(state.inside.len());
        state.unlock();
        if conflicting != 0 {
            keos::warning!("monitor: {movement} entered next to {conflicting} conflicting vehicle(s)");
        }
    }

    /// A vehicle doing `movement` left.
    pub fn exit(&self, movement: Movement) {
        let mut state = self.state.lock();
        if let Some(position) = state.inside.iter().position(|other| *other == movement) {
            state.inside.swap_remove(position);
        }
        state.unlock();
    }

    /// Summarize the observations.
    pub fn report(&self, controller: ControllerKind) -> SimulationReport {
        let state = self.state.lock();
        let report = SimulationReport {
            controller,
            admitted: state.admitted,
            per_movement: state.per_movement,
            max_concurrent: state.max_concurrent,
            violations: state.violations,
        };
        state.unlock();
        report
    }
}

fn drive(
    intersection: &Intersection,
    monitor: &Monitor,
    movement: Movement,
    crossing_yields: usize,
) -> Result<(), TrafficError> {
    let admission = intersection.enter(movement.origin, movement.destination())?;
    monitor.enter(movement);
    for _ in 0..crossing_yields {
        Current::yield_now();
    }
    monitor.exit(movement);
    admission.exit()
}

// Reports the exit status of a vehicle to the process table when the vehicle
// thread ends, even by a panic.
struct ExitStatus<'a> {
    processes: &'a ProcessTable,
    pid: Pid,
    code: i32,
}

impl Drop for ExitStatus<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.processes.exit(self.pid, self.code) {
            keos::warning!("simulation: vehicle {} can not exit: {e:?}", self.pid);
        }
    }
}

/// Run a simulation to completion.
///
/// # Errors
///
/// - [`TrafficError::ResourceExhaustion`] if a vehicle thread can not be
///   spawned. The vehicles already on the road finish their rounds first.
/// - [`TrafficError::MisuseViolation`] if a vehicle did not exit with 0, or
///   the intersection is not idle at the end.
pub fn run(config: &SimulationConfig) -> Result<SimulationReport, TrafficError> {
    let SimulationConfig {
        controller,
        vehicles,
        rounds,
        seed,
        crossing_yields,
    } = *config;
    keos::info!("simulation: {vehicles} vehicles x {rounds} rounds, seed {seed}");
    let intersection = Arc::new(Intersection::new(controller));
    let monitor = Arc::new(Monitor::default());
    let processes = Arc::new(ProcessTable::new());
    let driver = processes.spawn(None)?;

    let mut children = Vec::with_capacity(vehicles);
    let mut spawn_error = None;
    for vehicle in 0..vehicles {
        let pid = processes.spawn(Some(driver))?;
        let (intersection, monitor, table) =
            (intersection.clone(), monitor.clone(), processes.clone());
        let spawned = ThreadBuilder::new(format!("vehicle{vehicle}")).try_spawn(move || {
            let mut status = ExitStatus {
                processes: &table,
                pid,
                code: -1,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(vehicle as u64);
            for _ in 0..rounds {
                let movement = Movement::random(&mut rng);
                if let Err(e) = drive(&intersection, &monitor, movement, crossing_yields) {
                    keos::warning!("vehicle{vehicle}: {movement} failed with {e:?}");
                    status.code = 1;
                    return;
                }
            }
            status.code = 0;
        });
        match spawned {
            Ok(handle) => children.push((pid, handle)),
            Err(e) => {
                keos::warning!("simulation: vehicle{vehicle} can not be spawned: {e:?}");
                processes.exit(pid, -1)?;
                spawn_error = Some(e);
                break;
            }
        }
    }

    let mut failed = 0;
    for (pid, handle) in children {
        if processes.waitpid(driver, pid, 0)? != 0 {
            failed += 1;
        }
        handle.join();
    }
    processes.exit(driver, 0)?;
    if let Some(e) = spawn_error {
        return Err(e.into());
    }
    if failed != 0 {
        keos::warning!("simulation: {failed} vehicle(s) failed");
        return Err(TrafficError::MisuseViolation("a vehicle failed"));
    }

    let intersection = Arc::try_unwrap(intersection)
        .map_err(|_| TrafficError::MisuseViolation("intersection still in use"))?;
    intersection.cleanup()?;
    let report = monitor.report(controller);
    keos::info!(
        "simulation: {} crossings, up to {} vehicles inside at once, {} violations",
        report.admitted,
        report.max_concurrent,
        report.violations
    );
    Ok(report)
}
