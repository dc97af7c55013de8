//! Every grader case as a `#[test]`, so `cargo test` runs them in parallel.

use synchprobs_grader::*;

macro_rules! grade {
    ($($name:ident => $case:path),* $(,)?) => {
        $(
            #[test]
            fn $name() {
                assert!(keos::TestDriver::start_with(&[&$case], Vec::<String>::new()));
            }
        )*
    };
}

grade! {
    mutex_smoke => sync::mutex::smoke,
    mutex_smoke_many => sync::mutex::smoke_many,
    mutex_parking => sync::mutex::parking,
    condvar_bounded_buffer_1 => sync::condition_variable::bounded_buffer_1,
    condvar_bounded_buffer_2 => sync::condition_variable::bounded_buffer_2,
    sema_0 => sync::semaphore::sema_0,
    sema_1 => sync::semaphore::sema_1,
    sema_exec_order => sync::semaphore::exec_order,
    sema_n_permits => sync::semaphore::n_permits,
    lock_ownership => sync::lock::ownership,
    lock_blocking => sync::lock::blocking,

    classify_all_pairs => traffic::classify_all_pairs,
    movement_order => traffic::movement_order,
    illegal_movement => traffic::illegal_movement,
    conflict_oracle => traffic::conflict_oracle,
    conflict_symmetry => traffic::conflict_symmetry,
    conflict_diagonal => traffic::conflict_diagonal,
    conflict_rules => traffic::conflict_rules,
    conflict_sets => traffic::conflict_sets,
    quadrant_footprints => traffic::quadrant_footprints,
    quadrant_covers_conflicts => traffic::quadrant_covers_conflicts,

    lock_order_opposite_straights => controller::lock_order::opposite_straights,
    lock_order_opposite_rights => controller::lock_order::opposite_rights,
    lock_order_same_right_turns => controller::lock_order::same_right_turns,
    lock_order_admits_exactly_compatible => controller::lock_order::admits_exactly_compatible,
    lock_order_illegal_movement => controller::lock_order::illegal_movement,
    lock_order_exit_without_entry => controller::lock_order::exit_without_entry,
    lock_order_compatible_passes_waiter => controller::lock_order::compatible_passes_waiter,
    lock_order_exit_from_other_thread => controller::lock_order::exit_from_other_thread,
    lock_order_cleanup_while_occupied => controller::lock_order::cleanup_while_occupied,
    quadrant_opposite_straights => controller::quadrant::opposite_straights,
    quadrant_opposite_rights => controller::quadrant::opposite_rights,
    quadrant_same_right_turns => controller::quadrant::same_right_turns,
    quadrant_refuses_conflicting => controller::quadrant::refuses_conflicting,
    quadrant_illegal_movement => controller::quadrant::illegal_movement,
    quadrant_exit_without_entry => controller::quadrant::exit_without_entry,
    quadrant_compatible_passes_waiter => controller::quadrant::compatible_passes_waiter,
    quadrant_exit_from_other_thread => controller::quadrant::exit_from_other_thread,
    quadrant_cleanup_while_occupied => controller::quadrant::cleanup_while_occupied,
    serial_one_at_a_time => controller::serial::one_at_a_time,
    serial_same_right_turns => controller::serial::same_right_turns,
    serial_refuses_conflicting => controller::serial::refuses_conflicting,
    serial_exit_without_entry => controller::serial::exit_without_entry,
    serial_exit_from_other_thread => controller::serial::exit_from_other_thread,
    serial_cleanup_while_occupied => controller::serial::cleanup_while_occupied,
    admission_token => controller::admission_token,
    admission_unwinds => controller::admission_unwinds,
    process_wide => controller::process_wide,

    waitpid_returns_status => process::waitpid_returns_status,
    waitpid_blocks => process::waitpid_blocks,
    waitpid_errors => process::waitpid_errors,
    exit_twice => process::exit_twice,
    orphans => process::orphans,

    config_defaults => simulation::config_defaults,
    monitor_counts_violations => simulation::monitor_counts_violations,
    stress_lock_order => simulation::stress_lock_order,
    stress_quadrant => simulation::stress_quadrant,
    stress_serial => simulation::stress_serial,
    reproducible => simulation::reproducible,
}

#[test]
fn every_case_is_graded() {
    assert_eq!(TESTS.len(), 59);
}
