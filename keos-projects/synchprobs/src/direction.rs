//! Compass directions of the intersection.

use core::fmt;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// One of the four roads meeting at the intersection.
///
/// A direction is used both as the origin (the road a vehicle arrives on)
/// and the destination (the road it leaves on). The discriminants go
/// clockwise, so turning right is a step counter-clockwise on the compass
/// and turning left is a step clockwise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u8)]
pub enum Direction {
    /// North.
    North = 0,
    /// East.
    East = 1,
    /// South.
    South = 2,
    /// West.
    West = 3,
}

impl Direction {
    /// All directions, in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The position of this direction in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction `steps` quarter turns clockwise from this one.
    pub const fn clockwise(self, steps: usize) -> Direction {
        Self::ALL[(self.index() + steps) % 4]
    }

    /// The direction across the intersection.
    pub const fn opposite(self) -> Direction {
        self.clockwise(2)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        })
    }
}
