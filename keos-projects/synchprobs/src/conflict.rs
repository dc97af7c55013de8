//! # The conflict model.
//!
//! Two movements **conflict** when their paths through the intersection can
//! meet, so they must never be inside the intersection at the same time. The
//! relation is derived from the geometry once, at compile time, and never
//! changes:
//!
//! - Two movements from the same origin conflict only if they are the same
//!   movement. Vehicles queue on their own lane, and the three lanes of an
//!   approach fan out without crossing.
//! - A right turn hugs its own corner and crosses nobody else.
//! - Two straight crossings conflict if they come from perpendicular roads,
//!   and run side by side if they come from opposite roads.
//! - A left turn conflicts with every straight crossing or left turn from a
//!   perpendicular road, and with the straight crossing coming towards it.
//!   Two left turns from opposite roads pass each other.
//!
//! The resulting 12x12 matrix, with `x` marking a conflict:
//!
//! ```text
//!          N       E       S       W
//!        R S L   R S L   R S L   R S L
//! N  R   x . .   . . .   . . .   . . .
//!    S   . x .   . x x   . . x   . x x
//!    L   . . x   . x x   . x .   . x x
//! E  R   . . .   x . .   . . .   . . .
//!    S   . x x   . x .   . x x   . . x
//!    L   . x x   . . x   . x x   . x .
//! S  R   . . .   . . .   x . .   . . .
//!    S   . . x   . x x   . x .   . x x
//!    L   . x .   . x x   . . x   . x x
//! W  R   . . .   . . .   . . .   x . .
//!    S   . x x   . . x   . x x   . x .
//!    L   . x x   . x .   . x x   . . x
//! ```

use crate::movement::{Movement, MovementClass};
use arrayvec::ArrayVec;

/// How the roads of two movements relate.
#[derive(Clone, Copy)]
enum Approach {
    Same,
    Opposite,
    Perpendicular,
}

const fn approach(a: Movement, b: Movement) -> Approach {
    match (a.origin.index() + 4 - b.origin.index()) % 4 {
        0 => Approach::Same,
        2 => Approach::Opposite,
        _ => Approach::Perpendicular,
    }
}

const fn paths_meet(a: Movement, b: Movement) -> bool {
    use MovementClass::*;
    match (approach(a, b), a.class, b.class) {
        (Approach::Same, _, _) => a.class as u8 == b.class as u8,
        (_, RightTurn, _) | (_, _, RightTurn) => false,
        (Approach::Opposite, Straight, Straight) | (Approach::Opposite, LeftTurn, LeftTurn) => {
            false
        }
        (Approach::Opposite, _, _) | (Approach::Perpendicular, _, _) => true,
    }
}

/// The conflict relation as a boolean matrix indexed by [`Movement::index`].
pub struct ConflictTable {
    matrix: [[bool; Movement::COUNT]; Movement::COUNT],
}

/// The conflict relation of the intersection.
pub static CONFLICTS: ConflictTable = ConflictTable::derive();

impl ConflictTable {
    /// Derive the table from the geometry.
    pub const fn derive() -> Self {
        let mut matrix = [[false; Movement::COUNT]; Movement::COUNT];
        let mut i = 0;
        while i < Movement::COUNT {
            let mut j = 0;
            while j < Movement::COUNT {
                matrix[i][j] = paths_meet(Movement::ALL[i], Movement::ALL[j]);
                j += 1;
            }
            i += 1;
        }
        Self { matrix }
    }

    /// Returns `true` if `a` and `b` may not be inside at the same time.
    #[inline]
    pub const fn conflicts(&self, a: Movement, b: Movement) -> bool {
        self.matrix[a.index()][b.index()]
    }

    /// Every movement that conflicts with `movement`, in ascending
    /// [`Movement::index`] order. The set includes `movement` itself.
    pub fn conflict_set(&self, movement: Movement) -> ArrayVec<Movement, { Movement::COUNT }> {
        Movement::ALL
            .iter()
            .copied()
            .filter(|other| self.conflicts(movement, *other))
            .collect()
    }

    /// Returns `true` if `movement` conflicts with none of `occupants`.
    pub fn compatible_with(&self, movement: Movement, occupants: &[Movement]) -> bool {
        occupants.iter().all(|other| !self.conflicts(movement, *other))
    }

    /// A row of the matrix.
    pub fn row(&self, movement: Movement) -> &[bool; Movement::COUNT] {
        &self.matrix[movement.index()]
    }
}

/// Shorthand for [`CONFLICTS`]`.conflicts(a, b)`.
pub fn conflicts(a: Movement, b: Movement) -> bool {
    CONFLICTS.conflicts(a, b)
}
