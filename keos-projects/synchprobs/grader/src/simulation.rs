use keos_synchprobs::{
    ControllerKind, Direction::*, Movement,
    simulation::{self, Monitor, SimulationConfig, SimulationConfigBuilder, SimulationReport},
};

pub fn config_defaults() {
    let config = SimulationConfigBuilder::new().build();
    assert_eq!(config, SimulationConfig::default());
    assert_eq!(config.controller(), ControllerKind::default());
    assert_eq!(config.vehicles(), 8);
    assert_eq!(config.rounds(), 16);

    let config = SimulationConfigBuilder::new()
        .controller(ControllerKind::Serial)
        .vehicles(3)
        .rounds(5)
        .build();
    assert_eq!(config.controller(), ControllerKind::Serial);
    assert_eq!(config.vehicles(), 3);
    assert_eq!(config.rounds(), 5);
}

/// The monitor counts conflicting pairs, not vehicles.
pub fn monitor_counts_violations() {
    let north_south = Movement::new(North, South).unwrap();
    let south_north = Movement::new(South, North).unwrap();
    let east_west = Movement::new(East, West).unwrap();

    let monitor = Monitor::default();
    monitor.enter(north_south);
    monitor.enter(south_north);
    assert_eq!(monitor.report(ControllerKind::Serial).violations, 0);
    monitor.enter(east_west);
    monitor.exit(east_west);
    monitor.exit(south_north);
    monitor.exit(north_south);

    let report = monitor.report(ControllerKind::Serial);
    assert_eq!(report.violations, 2);
    assert_eq!(report.admitted, 3);
    assert_eq!(report.max_concurrent, 3);
    assert_eq!(report.per_movement[east_west.index()], 1);
}

fn stress(controller: ControllerKind) -> SimulationReport {
    let config = SimulationConfigBuilder::new()
        .controller(controller)
        .vehicles(8)
        .rounds(32)
        .seed(0x5eed)
        .build();
    let report = simulation::run(&config).unwrap();
    assert_eq!(report.controller, controller);
    assert_eq!(report.violations, 0);
    assert_eq!(report.admitted, 8 * 32);
    assert_eq!(report.per_movement.iter().sum::<usize>(), report.admitted);
    assert!(report.max_concurrent >= 1);
    report
}

pub fn stress_lock_order() {
    stress(ControllerKind::LockOrder);
}

pub fn stress_quadrant() {
    stress(ControllerKind::Quadrant);
}

pub fn stress_serial() {
    assert_eq!(stress(ControllerKind::Serial).max_concurrent, 1);
}

/// The requests only depend on the seed.
pub fn reproducible() {
    let run = |controller, seed| {
        let config = SimulationConfigBuilder::new()
            .controller(controller)
            .vehicles(4)
            .rounds(12)
            .seed(seed)
            .crossing_yields(1)
            .build();
        simulation::run(&config).unwrap().per_movement
    };
    let first = run(ControllerKind::LockOrder, 7);
    assert_eq!(first, run(ControllerKind::Quadrant, 7));
    assert_eq!(first, run(ControllerKind::Serial, 7));
    assert_eq!(first.iter().sum::<usize>(), 48);
}
