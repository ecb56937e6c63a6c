//! # Block Face Module
//!
//! The six faces of a voxel cube. Face order is fixed because it doubles as
//! the index into per-face lookup tables (neighbor slots, winding patterns,
//! UV origins).

use num_derive::FromPrimitive;

use super::block_pos::BlockPos;

/// One of the six faces of a voxel block.
///
/// The discriminant is the face's index in every per-face table.
/// The order is: [Top, Bottom, North, South, East, West].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, FromPrimitive)]
pub enum BlockFace {
    /// The top face (normal +Y).
    Top = 0,
    /// The bottom face (normal −Y).
    Bottom = 1,
    /// The north face (normal +Z).
    North = 2,
    /// The south face (normal −Z).
    South = 3,
    /// The east face (normal +X).
    East = 4,
    /// The west face (normal −X).
    West = 5,
}

impl BlockFace {
    /// Returns all six faces in table order.
    pub fn all() -> [BlockFace; 6] {
        [
            BlockFace::Top,
            BlockFace::Bottom,
            BlockFace::North,
            BlockFace::South,
            BlockFace::East,
            BlockFace::West,
        ]
    }

    /// Recovers a face from its table index.
    ///
    /// # Panics
    /// Panics if `index` is not in `0..6`.
    pub fn from_index(index: usize) -> BlockFace {
        num::FromPrimitive::from_usize(index).unwrap()
    }

    /// The unit step toward the cell this face looks at.
    pub fn normal(self) -> BlockPos {
        match self {
            BlockFace::Top => BlockPos::UP,
            BlockFace::Bottom => BlockPos::DOWN,
            BlockFace::North => BlockPos::NORTH,
            BlockFace::South => BlockPos::SOUTH,
            BlockFace::East => BlockPos::EAST,
            BlockFace::West => BlockPos::WEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for (i, face) in BlockFace::all().into_iter().enumerate() {
            assert_eq!(face as usize, i);
            assert_eq!(BlockFace::from_index(i), face);
        }
    }

    #[test]
    fn normals_are_unit_steps() {
        for face in BlockFace::all() {
            let n = face.normal();
            assert_eq!(n.x.abs() + n.y.abs() + n.z.abs(), 1);
        }
    }
}
