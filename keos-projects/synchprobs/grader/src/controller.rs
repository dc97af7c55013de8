use core::sync::atomic::{AtomicBool, Ordering};
use keos::thread::{Current, JoinHandle, ThreadBuilder};
use keos_synchprobs::{
    ControllerKind,
    Direction::{self, *},
    Intersection, Movement, TrafficError, after_exit, before_entry,
    conflict::conflicts,
    controller_cleanup, controller_init,
    quadrant::footprint,
    sync::Semaphore,
};
use std::sync::Arc;

fn movement(origin: Direction, destination: Direction) -> Movement {
    Movement::new(origin, destination).unwrap()
}

/// A vehicle thread that enters, and stays inside until told to leave.
struct Vehicle {
    handle: JoinHandle,
    entered: Arc<AtomicBool>,
    leave: Arc<Semaphore<()>>,
}

impl Vehicle {
    fn drive(intersection: &Arc<Intersection>, origin: Direction, destination: Direction) -> Self {
        let entered = Arc::new(AtomicBool::new(false));
        let leave = Arc::new(Semaphore::new(0, ()));
        let handle = {
            let (intersection, entered, leave) =
                (intersection.clone(), entered.clone(), leave.clone());
            ThreadBuilder::new(format!("{origin}->{destination}")).spawn(move || {
                intersection.before_entry(origin, destination).unwrap();
                entered.store(true, Ordering::SeqCst);
                core::mem::forget(leave.wait());
                intersection.after_exit(origin, destination).unwrap();
            })
        };
        Vehicle {
            handle,
            entered,
            leave,
        }
    }

    fn entered(&self) -> bool {
        self.entered.load(Ordering::SeqCst)
    }

    fn wait_entered(&self) {
        while !self.entered() {
            Current::yield_now();
        }
    }

    fn wait_blocked(&self) {
        crate::wait_until_parked(self.handle.tid);
        assert!(!self.entered(), "vehicle {} entered", self.handle.tid);
    }

    fn leave(self) {
        self.leave.signal();
        assert_eq!(self.handle.join(), 0);
    }
}

fn finish(intersection: Arc<Intersection>) {
    let intersection = Arc::into_inner(intersection).expect("a vehicle is still running");
    assert!(intersection.occupants().is_empty());
    assert_eq!(intersection.cleanup(), Ok(()));
}

/// N->S and S->N cross together; E->W waits for both of them.
fn opposite_straights(kind: ControllerKind) {
    let intersection = Arc::new(Intersection::new(kind));
    let north_south = Vehicle::drive(&intersection, North, South);
    let south_north = Vehicle::drive(&intersection, South, North);
    north_south.wait_entered();
    south_north.wait_entered();
    assert_eq!(
        intersection.occupants(),
        vec![movement(North, South), movement(South, North)]
    );

    let east_west = Vehicle::drive(&intersection, East, West);
    east_west.wait_blocked();

    north_south.leave();
    assert!(!east_west.entered());
    east_west.wait_blocked();

    south_north.leave();
    east_west.wait_entered();
    assert_eq!(intersection.occupants(), vec![movement(East, West)]);
    east_west.leave();
    finish(intersection);
}

/// N->W and S->E enter without waiting.
fn opposite_rights(kind: ControllerKind) {
    let intersection = Intersection::new(kind);
    assert_eq!(intersection.try_before_entry(North, West), Ok(true));
    assert_eq!(intersection.try_before_entry(South, East), Ok(true));
    assert_eq!(
        intersection.occupants(),
        vec![movement(North, West), movement(South, East)]
    );
    assert_eq!(intersection.after_exit(South, East), Ok(()));
    assert_eq!(intersection.after_exit(North, West), Ok(()));
    assert_eq!(intersection.cleanup(), Ok(()));
}

/// A second N->W waits for the first one.
fn same_right_turns(kind: ControllerKind) {
    let intersection = Arc::new(Intersection::new(kind));
    let first = Vehicle::drive(&intersection, North, West);
    first.wait_entered();
    let second = Vehicle::drive(&intersection, North, West);
    second.wait_blocked();
    assert_eq!(intersection.occupants(), vec![movement(North, West)]);
    first.leave();
    second.wait_entered();
    second.leave();
    finish(intersection);
}

/// A vehicle waiting for a conflicting one does not hold back a movement
/// compatible with everything inside.
fn compatible_passes_waiter(kind: ControllerKind) {
    let intersection = Arc::new(Intersection::new(kind));
    let south_north = Vehicle::drive(&intersection, South, North);
    south_north.wait_entered();
    let east_south = Vehicle::drive(&intersection, East, South);
    east_south.wait_blocked();

    let north_south = {
        let intersection = intersection.clone();
        ThreadBuilder::new("N->S").spawn(move || {
            assert_eq!(intersection.try_before_entry(North, South), Ok(true));
            assert_eq!(
                intersection.occupants(),
                vec![movement(North, South), movement(South, North)]
            );
            assert_eq!(intersection.after_exit(North, South), Ok(()));
        })
    };
    assert_eq!(north_south.join(), 0);
    assert!(!east_south.entered());

    south_north.leave();
    east_south.wait_entered();
    east_south.leave();
    finish(intersection);
}

/// Only the vehicle thread that entered may leave.
fn exit_from_other_thread(kind: ControllerKind) {
    let intersection = Arc::new(Intersection::new(kind));
    assert_eq!(intersection.before_entry(North, South), Ok(()));
    {
        let intersection = intersection.clone();
        crate::expect_misuse(move || intersection.after_exit(North, South));
    }
    assert_eq!(intersection.occupants(), vec![movement(North, South)]);
    assert_eq!(intersection.try_before_entry(East, West), Ok(false));
    assert_eq!(intersection.after_exit(North, South), Ok(()));
    finish(intersection);
}

/// Tries every pair of movements: `b` while `a` is inside.
fn try_pairs(kind: ControllerKind, admitted: impl Fn(Movement, Movement) -> bool) {
    let intersection = Intersection::new(kind);
    for a in Movement::ALL {
        assert_eq!(intersection.before_entry(a.origin, a.destination()), Ok(()));
        for b in Movement::ALL {
            let expected = admitted(a, b);
            assert_eq!(
                intersection.try_before_entry(b.origin, b.destination()),
                Ok(expected),
                "{b} while {a} is inside"
            );
            if expected {
                assert_eq!(intersection.after_exit(b.origin, b.destination()), Ok(()));
            }
        }
        assert_eq!(intersection.after_exit(a.origin, a.destination()), Ok(()));
    }
    assert_eq!(intersection.cleanup(), Ok(()));
}

/// U-turns are rejected up front and leave no trace.
fn illegal_movement(kind: ControllerKind) {
    let intersection = Intersection::new(kind);
    assert_eq!(
        intersection.before_entry(North, North),
        Err(TrafficError::IllegalMovement(North))
    );
    assert_eq!(
        intersection.try_before_entry(South, South),
        Err(TrafficError::IllegalMovement(South))
    );
    assert_eq!(
        intersection.after_exit(East, East),
        Err(TrafficError::IllegalMovement(East))
    );
    assert!(intersection.enter(West, West).is_err());
    assert!(intersection.occupants().is_empty());
    assert_eq!(intersection.cleanup(), Ok(()));
}

fn exit_without_entry(kind: ControllerKind) {
    crate::expect_misuse(move || Intersection::new(kind).after_exit(North, South));
    crate::expect_misuse(move || {
        let intersection = Intersection::new(kind);
        intersection.before_entry(North, South)?;
        intersection.after_exit(East, West)
    });
}

fn cleanup_while_occupied(kind: ControllerKind) {
    crate::expect_misuse(move || {
        let intersection = Intersection::new(kind);
        intersection.before_entry(West, East)?;
        intersection.cleanup()
    });
}

pub mod lock_order {
    use super::*;

    pub fn opposite_straights() {
        super::opposite_straights(ControllerKind::LockOrder);
    }

    pub fn opposite_rights() {
        super::opposite_rights(ControllerKind::LockOrder);
    }

    pub fn same_right_turns() {
        super::same_right_turns(ControllerKind::LockOrder);
    }

    /// A movement is admitted right away exactly when nothing conflicting
    /// is inside.
    pub fn admits_exactly_compatible() {
        try_pairs(ControllerKind::LockOrder, |a, b| !conflicts(a, b));
    }

    pub fn illegal_movement() {
        super::illegal_movement(ControllerKind::LockOrder);
    }

    pub fn exit_without_entry() {
        super::exit_without_entry(ControllerKind::LockOrder);
    }

    pub fn compatible_passes_waiter() {
        super::compatible_passes_waiter(ControllerKind::LockOrder);
    }

    pub fn exit_from_other_thread() {
        super::exit_from_other_thread(ControllerKind::LockOrder);
    }

    pub fn cleanup_while_occupied() {
        super::cleanup_while_occupied(ControllerKind::LockOrder);
    }
}

pub mod quadrant {
    use super::*;

    pub fn opposite_straights() {
        super::opposite_straights(ControllerKind::Quadrant);
    }

    pub fn opposite_rights() {
        super::opposite_rights(ControllerKind::Quadrant);
    }

    pub fn same_right_turns() {
        super::same_right_turns(ControllerKind::Quadrant);
    }

    /// A movement is admitted right away exactly when its quadrants are
    /// free, which is never the case next to a conflicting movement.
    pub fn refuses_conflicting() {
        try_pairs(ControllerKind::Quadrant, |a, b| {
            let disjoint = !footprint(a).intersects(footprint(b));
            assert!(!(disjoint && conflicts(a, b)));
            disjoint
        });
    }

    pub fn illegal_movement() {
        super::illegal_movement(ControllerKind::Quadrant);
    }

    pub fn exit_without_entry() {
        super::exit_without_entry(ControllerKind::Quadrant);
    }

    pub fn compatible_passes_waiter() {
        super::compatible_passes_waiter(ControllerKind::Quadrant);
    }

    pub fn exit_from_other_thread() {
        super::exit_from_other_thread(ControllerKind::Quadrant);
    }

    pub fn cleanup_while_occupied() {
        super::cleanup_while_occupied(ControllerKind::Quadrant);
    }
}

pub mod serial {
    use super::*;

    /// Even compatible movements cross one at a time.
    pub fn one_at_a_time() {
        let intersection = Arc::new(Intersection::new(ControllerKind::Serial));
        let north_south = Vehicle::drive(&intersection, North, South);
        north_south.wait_entered();
        let south_north = Vehicle::drive(&intersection, South, North);
        south_north.wait_blocked();
        assert_eq!(intersection.try_before_entry(East, North), Ok(false));
        north_south.leave();
        south_north.wait_entered();
        south_north.leave();
        finish(intersection);
    }

    pub fn same_right_turns() {
        super::same_right_turns(ControllerKind::Serial);
    }

    pub fn refuses_conflicting() {
        try_pairs(ControllerKind::Serial, |_, _| false);
    }

    pub fn exit_without_entry() {
        super::exit_without_entry(ControllerKind::Serial);
    }

    pub fn exit_from_other_thread() {
        super::exit_from_other_thread(ControllerKind::Serial);
    }

    pub fn cleanup_while_occupied() {
        super::cleanup_while_occupied(ControllerKind::Serial);
    }
}

/// `enter` hands out a token that must be spent with `exit`.
pub fn admission_token() {
    let intersection = Intersection::new(ControllerKind::default());
    let admission = intersection.enter(North, South).unwrap();
    assert_eq!(admission.movement(), movement(North, South));
    assert_eq!(intersection.occupants(), vec![movement(North, South)]);
    assert_eq!(intersection.try_before_entry(East, West), Ok(false));
    assert_eq!(admission.exit(), Ok(()));
    assert!(intersection.occupants().is_empty());
    assert_eq!(intersection.cleanup(), Ok(()));

    let forgetful = ThreadBuilder::new("forgetful").spawn(|| {
        let intersection = Intersection::new(ControllerKind::default());
        let _admission = intersection.enter(West, North).unwrap();
    });
    assert_eq!(forgetful.join(), -1);
}

/// A vehicle that crashes inside gives its place back while unwinding, even
/// when it already left by hand.
pub fn admission_unwinds() {
    for kind in ControllerKind::ALL {
        let intersection = Arc::new(Intersection::new(kind));

        let crashed = {
            let intersection = intersection.clone();
            ThreadBuilder::new("crashed").spawn(move || {
                let _admission = intersection.enter(North, South).unwrap();
                panic!("crash inside the intersection");
            })
        };
        assert_eq!(crashed.join(), -1);
        assert!(intersection.occupants().is_empty());
        assert_eq!(intersection.try_before_entry(East, West), Ok(true));
        assert_eq!(intersection.after_exit(East, West), Ok(()));

        let left_twice = {
            let intersection = intersection.clone();
            ThreadBuilder::new("left twice").spawn(move || {
                let _admission = intersection.enter(West, East).unwrap();
                intersection.after_exit(West, East).unwrap();
                panic!("crash after leaving");
            })
        };
        assert_eq!(left_twice.join(), -1);
        assert!(intersection.occupants().is_empty());
        finish(intersection);
    }
}

/// The process-wide intersection follows init, use, cleanup.
pub fn process_wide() {
    crate::expect_misuse(|| before_entry(North, South));
    assert_eq!(controller_init(ControllerKind::default()), Ok(()));
    crate::expect_misuse(|| controller_init(ControllerKind::Serial));

    let vehicles = Movement::ALL.map(|m| {
        ThreadBuilder::new(format!("{m}")).spawn(move || {
            for _ in 0..8 {
                before_entry(m.origin, m.destination()).unwrap();
                Current::yield_now();
                after_exit(m.origin, m.destination()).unwrap();
            }
        })
    });
    for vehicle in vehicles {
        assert_eq!(vehicle.join(), 0);
    }

    assert_eq!(before_entry(East, West), Ok(()));
    crate::expect_misuse(controller_cleanup);
    assert_eq!(after_exit(East, West), Ok(()));
    assert_eq!(controller_cleanup(), Ok(()));

    crate::expect_misuse(|| after_exit(North, South));
    crate::expect_misuse(controller_cleanup);
}
