//! # Quadrants of the intersection.
//!
//! The intersection is split into four cells. Traffic keeps to the right, so
//! a vehicle arriving from the north enters the north-west cell, and then
//! sweeps counter-clockwise (as seen on a map) along the ring
//! `NW -> SW -> SE -> NE -> NW` until it reaches its exit:
//!
//! ```text
//!           N
//!      +----+----+
//!      | NW | NE |
//!   W  +----+----+  E
//!      | SW | SE |
//!      +----+----+
//!           S
//! ```
//!
//! A right turn occupies one cell, a straight crossing two and a left turn
//! three. Two movements whose footprints are disjoint never meet, so the
//! footprint overlap is a conservative approximation of the conflict
//! relation: every conflicting pair overlaps, and a few compatible pairs
//! (e.g. opposite left turns) overlap as well.

use crate::{direction::Direction, movement::Movement};

bitflags::bitflags! {
    /// A set of quadrants.
    pub struct Quadrants: u8 {
        /// North-west.
        const NW = 0b0001;
        /// South-west.
        const SW = 0b0010;
        /// South-east.
        const SE = 0b0100;
        /// North-east.
        const NE = 0b1000;
    }
}

impl Quadrants {
    /// The quadrants in the order a vehicle sweeps through them.
    pub const RING: [Quadrants; 4] = [Quadrants::NW, Quadrants::SW, Quadrants::SE, Quadrants::NE];

    /// Position of a single quadrant in [`Quadrants::RING`].
    pub fn ring_index(self) -> Option<usize> {
        Self::RING.iter().position(|q| *q == self)
    }

    /// Iterate over the single quadrants of this set, in ring order.
    pub fn each(self) -> impl Iterator<Item = Quadrants> {
        Self::RING.into_iter().filter(move |q| self.contains(*q))
    }
}

/// The ring position of the quadrant a vehicle from `origin` enters first.
const fn entry(origin: Direction) -> usize {
    match origin {
        Direction::North => 0,
        Direction::West => 1,
        Direction::South => 2,
        Direction::East => 3,
    }
}

/// The quadrants `movement` drives through.
pub fn footprint(movement: Movement) -> Quadrants {
    let span = movement.class as usize + 1;
    (0..span).fold(Quadrants::empty(), |acc, step| {
        acc | Quadrants::RING[(entry(movement.origin) + step) % 4]
    })
}
