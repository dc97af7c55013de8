use keos_synchprobs::{
    Direction::{self, *},
    Movement,
    MovementClass::{self, *},
    TrafficError, classify,
    conflict::{CONFLICTS, conflicts},
    quadrant::{Quadrants, footprint},
};

fn movement(origin: Direction, destination: Direction) -> Movement {
    Movement::new(origin, destination).unwrap()
}

/// Every (origin, destination) pair has the expected class.
pub fn classify_all_pairs() {
    let expected: [(Direction, Direction, Option<MovementClass>); 16] = [
        (North, North, None),
        (North, East, Some(LeftTurn)),
        (North, South, Some(Straight)),
        (North, West, Some(RightTurn)),
        (East, North, Some(RightTurn)),
        (East, East, None),
        (East, South, Some(LeftTurn)),
        (East, West, Some(Straight)),
        (South, North, Some(Straight)),
        (South, East, Some(RightTurn)),
        (South, South, None),
        (South, West, Some(LeftTurn)),
        (West, North, Some(LeftTurn)),
        (West, East, Some(Straight)),
        (West, South, Some(RightTurn)),
        (West, West, None),
    ];
    for (origin, destination, class) in expected {
        assert_eq!(
            classify(origin, destination),
            class,
            "{origin}->{destination}"
        );
    }
}

/// Movements are ordered by origin, then by class, and know their
/// destination.
pub fn movement_order() {
    for (i, m) in Movement::ALL.iter().enumerate() {
        assert_eq!(m.index(), i);
        assert_eq!(Movement::from_index(i), Some(*m));
        assert_eq!(classify(m.origin, m.destination()), Some(m.class));
        assert_eq!(movement(m.origin, m.destination()), *m);
    }
    assert!(Movement::ALL.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(Movement::from_index(Movement::COUNT), None);
    assert_eq!(Movement::ALL[0].to_string(), "N->W");
    assert_eq!(movement(East, West).to_string(), "E->W");
    assert_eq!(Direction::try_from(3u8).ok(), Some(West));
    assert!(Direction::try_from(4u8).is_err());
    for d in Direction::ALL {
        assert_eq!(d.opposite().opposite(), d);
        assert_ne!(d.opposite(), d);
    }
}

/// U-turns are rejected.
pub fn illegal_movement() {
    for d in Direction::ALL {
        assert_eq!(Movement::new(d, d), Err(TrafficError::IllegalMovement(d)));
    }
}

#[rustfmt::skip]
const ORACLE: [[u8; 12]; 12] = [
    // N: R  S  L  E: R  S  L  S: R  S  L  W: R  S  L
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], // N R
    [0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1], // N S
    [0, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1], // N L
    [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0], // E R
    [0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1], // E S
    [0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0], // E L
    [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0], // S R
    [0, 0, 1, 0, 1, 1, 0, 1, 0, 0, 1, 1], // S S
    [0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1], // S L
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0], // W R
    [0, 1, 1, 0, 0, 1, 0, 1, 1, 0, 1, 0], // W S
    [0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1], // W L
];

/// The conflict relation matches the reference matrix.
pub fn conflict_oracle() {
    for a in Movement::ALL {
        for b in Movement::ALL {
            assert_eq!(
                conflicts(a, b),
                ORACLE[a.index()][b.index()] == 1,
                "{a} vs {b}"
            );
        }
    }
}

pub fn conflict_symmetry() {
    for a in Movement::ALL {
        for b in Movement::ALL {
            assert_eq!(conflicts(a, b), conflicts(b, a), "{a} vs {b}");
        }
    }
}

/// Two vehicles doing the same movement are serialized.
pub fn conflict_diagonal() {
    for m in Movement::ALL {
        assert!(conflicts(m, m), "{m}");
        assert!(CONFLICTS.row(m)[m.index()]);
    }
}

pub fn conflict_rules() {
    // Right turns only wait for each other on the same road.
    for right in Movement::ALL.into_iter().filter(|m| m.class == RightTurn) {
        for other in Movement::ALL {
            assert_eq!(conflicts(right, other), right == other, "{right} vs {other}");
        }
    }
    // Opposite straights pass side by side, perpendicular ones cross.
    assert!(!conflicts(movement(North, South), movement(South, North)));
    assert!(!conflicts(movement(East, West), movement(West, East)));
    assert!(conflicts(movement(North, South), movement(East, West)));
    assert!(conflicts(movement(North, South), movement(West, East)));
    assert!(conflicts(movement(South, North), movement(East, West)));
    // Opposite left turns pass each other.
    assert!(!conflicts(movement(North, East), movement(South, West)));
    assert!(!conflicts(movement(East, South), movement(West, North)));
    // A left turn crosses the oncoming straight and the perpendicular roads.
    assert!(conflicts(movement(North, East), movement(South, North)));
    for left in Movement::ALL.into_iter().filter(|m| m.class == LeftTurn) {
        for other in Movement::ALL.into_iter().filter(|m| m.class != RightTurn) {
            let perpendicular =
                other.origin != left.origin && other.origin != left.origin.opposite();
            if perpendicular {
                assert!(conflicts(left, other), "{left} vs {other}");
            }
        }
    }
    // Lanes of the same road never cross.
    assert!(!conflicts(movement(North, East), movement(North, South)));
    assert!(!conflicts(movement(North, West), movement(North, East)));
}

/// Conflict sets are sorted, contain the movement, and match the relation.
pub fn conflict_sets() {
    for m in Movement::ALL {
        let set = CONFLICTS.conflict_set(m);
        assert!(set.contains(&m));
        assert!(set.windows(2).all(|w| w[0].index() < w[1].index()));
        assert_eq!(
            set.len(),
            CONFLICTS.row(m).iter().filter(|c| **c).count()
        );
        assert!(!CONFLICTS.compatible_with(m, &set));
        if m.class == RightTurn {
            assert_eq!(set.as_slice(), &[m]);
        }
    }
    let north_south = movement(North, South);
    assert!(CONFLICTS.compatible_with(
        north_south,
        &[movement(South, North), movement(West, South), movement(North, West)]
    ));
}

pub fn quadrant_footprints() {
    assert_eq!(footprint(movement(North, West)), Quadrants::NW);
    assert_eq!(footprint(movement(East, North)), Quadrants::NE);
    assert_eq!(footprint(movement(South, East)), Quadrants::SE);
    assert_eq!(footprint(movement(West, South)), Quadrants::SW);
    assert_eq!(footprint(movement(North, South)), Quadrants::NW | Quadrants::SW);
    assert_eq!(footprint(movement(West, East)), Quadrants::SW | Quadrants::SE);
    assert_eq!(
        footprint(movement(North, East)),
        Quadrants::NW | Quadrants::SW | Quadrants::SE
    );
    for m in Movement::ALL {
        let size = footprint(m).bits().count_ones() as usize;
        assert_eq!(size, m.class as usize + 1, "{m}");
    }
    assert_eq!(Quadrants::all().each().count(), 4);
    for (i, q) in Quadrants::RING.into_iter().enumerate() {
        assert_eq!(q.ring_index(), Some(i));
    }
}

/// Conflicting movements always share a quadrant.
pub fn quadrant_covers_conflicts() {
    for a in Movement::ALL {
        for b in Movement::ALL {
            if conflicts(a, b) {
                assert!(footprint(a).intersects(footprint(b)), "{a} vs {b}");
            }
        }
    }
    // The four right turns fit together.
    let rights = Movement::ALL
        .into_iter()
        .filter(|m| m.class == RightTurn)
        .fold(Quadrants::empty(), |acc, m| {
            assert!(!acc.intersects(footprint(m)));
            acc | footprint(m)
        });
    assert_eq!(rights, Quadrants::all());
}
