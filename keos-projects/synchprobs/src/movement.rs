//! Movements through the intersection and their classifier.
//!
//! A vehicle drives from an origin to a destination. Of the sixteen
//! (origin, destination) pairs, twelve are legal: the four U-turns, where the
//! destination is the origin, are rejected. Each legal pair is exactly one of
//! a right turn, a straight crossing or a left turn:
//!
//! | origin | right turn | straight | left turn |
//! |--------|------------|----------|-----------|
//! | N      | W          | S        | E         |
//! | E      | N          | W        | S         |
//! | S      | E          | N        | W         |
//! | W      | S          | E        | N         |

use crate::{TrafficError, direction::Direction};
use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use rand::Rng;

/// The shape of a movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum MovementClass {
    /// Turn to the right, the shortest path.
    RightTurn = 0,
    /// Cross to the opposite road.
    Straight = 1,
    /// Turn to the left, sweeping across the intersection.
    LeftTurn = 2,
}

impl MovementClass {
    /// All classes, in the order of their discriminants.
    pub const ALL: [MovementClass; 3] = [
        MovementClass::RightTurn,
        MovementClass::Straight,
        MovementClass::LeftTurn,
    ];

    /// Quarter turns clockwise from the origin to the destination.
    const fn steps(self) -> usize {
        match self {
            MovementClass::RightTurn => 3,
            MovementClass::Straight => 2,
            MovementClass::LeftTurn => 1,
        }
    }
}

/// Classify the movement from `origin` to `destination`.
///
/// Returns `None` for a U-turn.
pub const fn classify(origin: Direction, destination: Direction) -> Option<MovementClass> {
    match (destination.index() + 4 - origin.index()) % 4 {
        1 => Some(MovementClass::LeftTurn),
        2 => Some(MovementClass::Straight),
        3 => Some(MovementClass::RightTurn),
        _ => None,
    }
}

/// A legal movement through the intersection.
///
/// Movements are totally ordered by [`Movement::index`], which sorts by
/// origin and then by class. Every admission controller that needs to take
/// several per-movement resources takes them in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Movement {
    /// The road the vehicle arrives on.
    pub origin: Direction,
    /// The shape of the movement.
    pub class: MovementClass,
}

impl Movement {
    /// The number of legal movements.
    pub const COUNT: usize = 12;

    /// All legal movements, sorted by [`Movement::index`].
    pub const ALL: [Movement; Movement::COUNT] = {
        let mut all = [Movement {
            origin: Direction::North,
            class: MovementClass::RightTurn,
        }; Movement::COUNT];
        let mut i = 0;
        while i < Movement::COUNT {
            all[i] = Movement {
                origin: Direction::ALL[i / 3],
                class: MovementClass::ALL[i % 3],
            };
            i += 1;
        }
        all
    };

    /// The movement from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// [`TrafficError::IllegalMovement`] for a U-turn.
    pub fn new(origin: Direction, destination: Direction) -> Result<Self, TrafficError> {
        classify(origin, destination)
            .map(|class| Movement { origin, class })
            .ok_or(TrafficError::IllegalMovement(origin))
    }

    /// The road the vehicle leaves on.
    pub const fn destination(self) -> Direction {
        self.origin.clockwise(self.class.steps())
    }

    /// Position of this movement in the global order, in `0..12`.
    #[inline]
    pub const fn index(self) -> usize {
        self.origin as usize * 3 + self.class as usize
    }

    /// Inverse of [`Movement::index`].
    pub fn from_index(index: usize) -> Option<Movement> {
        let origin = Direction::try_from(u8::try_from(index / 3).ok()?).ok()?;
        let class = MovementClass::try_from((index % 3) as u8).ok()?;
        Some(Movement { origin, class })
    }

    /// Pick a legal movement uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Movement {
        Movement::ALL[rng.gen_range(0..Movement::COUNT)]
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination())
    }
}
