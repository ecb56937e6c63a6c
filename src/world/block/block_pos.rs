//! # Block Position Module
//!
//! Integer block coordinates in world or chunk-local space, with the affine
//! algebra the rest of the crate leans on: offsets along faces, scalar
//! arithmetic, per-axis indexing, and derivation of the owning chunk
//! coordinate.

use std::ops::{Add, Div, Index, Mul, Neg, Rem, Sub};

use cgmath::{Point3, Vector3};

use super::block_face::BlockFace;
use crate::world::chunk::CHUNK_EDGE;

/// An immutable integer triple identifying one voxel cell.
///
/// `BlockPos` is always passed and stored by value. Depending on context it
/// is either a world-space block coordinate or a chunk-local coordinate; the
/// chunk transforms convert between the two.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPos {
    /// X coordinate (east is positive).
    pub x: i32,
    /// Y coordinate (up is positive).
    pub y: i32,
    /// Z coordinate (north is positive).
    pub z: i32,
}

impl BlockPos {
    /// The origin position.
    pub const ZERO: BlockPos = BlockPos { x: 0, y: 0, z: 0 };
    /// One step along every axis.
    pub const ONE: BlockPos = BlockPos { x: 1, y: 1, z: 1 };
    /// One step up (+Y).
    pub const UP: BlockPos = BlockPos { x: 0, y: 1, z: 0 };
    /// One step down (−Y).
    pub const DOWN: BlockPos = BlockPos { x: 0, y: -1, z: 0 };
    /// One step north (+Z).
    pub const NORTH: BlockPos = BlockPos { x: 0, y: 0, z: 1 };
    /// One step south (−Z).
    pub const SOUTH: BlockPos = BlockPos { x: 0, y: 0, z: -1 };
    /// One step east (+X).
    pub const EAST: BlockPos = BlockPos { x: 1, y: 0, z: 0 };
    /// One step west (−X).
    pub const WEST: BlockPos = BlockPos { x: -1, y: 0, z: 0 };

    /// Creates a new position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPos { x, y, z }
    }

    /// Returns this position offset by the given deltas.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        BlockPos::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Returns this position moved `steps` cells along a face's normal.
    pub fn offset_face(self, face: BlockFace, steps: i32) -> Self {
        self + face.normal() * steps
    }

    /// The chunk coordinate owning this world-space position.
    ///
    /// Uses floor division independently per axis, so negative coordinates
    /// resolve to the correct chunk (e.g. world x = −1 lies in chunk x = −1).
    pub fn chunk_pos(self) -> Point3<i32> {
        Point3::new(
            self.x.div_euclid(CHUNK_EDGE),
            self.y.div_euclid(CHUNK_EDGE),
            self.z.div_euclid(CHUNK_EDGE),
        )
    }
}

impl Neg for BlockPos {
    type Output = BlockPos;

    fn neg(self) -> BlockPos {
        BlockPos::new(-self.x, -self.y, -self.z)
    }
}

impl Add for BlockPos {
    type Output = BlockPos;

    fn add(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for BlockPos {
    type Output = BlockPos;

    fn sub(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<i32> for BlockPos {
    type Output = BlockPos;

    fn mul(self, scalar: i32) -> BlockPos {
        BlockPos::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<i32> for BlockPos {
    type Output = BlockPos;

    fn div(self, scalar: i32) -> BlockPos {
        BlockPos::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Rem<i32> for BlockPos {
    type Output = BlockPos;

    fn rem(self, scalar: i32) -> BlockPos {
        BlockPos::new(self.x % scalar, self.y % scalar, self.z % scalar)
    }
}

impl Index<usize> for BlockPos {
    type Output = i32;

    /// Per-axis access: 0 = x, 1 = y, 2 = z.
    ///
    /// # Panics
    /// Panics for any other index.
    fn index(&self, axis: usize) -> &i32 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("block position axis out of range: {}", axis),
        }
    }
}

impl From<BlockPos> for Vector3<f32> {
    fn from(pos: BlockPos) -> Vector3<f32> {
        Vector3::new(pos.x as f32, pos.y as f32, pos.z as f32)
    }
}

impl From<Vector3<f32>> for BlockPos {
    /// Truncates toward zero, matching the reference conversion. Callers
    /// resolving a ray-cast hit should nudge the hit point half a unit along
    /// the hit normal before converting.
    fn from(v: Vector3<f32>) -> BlockPos {
        BlockPos::new(v.x as i32, v.y as i32, v.z as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_algebra() {
        let a = BlockPos::new(1, -2, 3);
        let b = BlockPos::new(4, 5, -6);
        assert_eq!(a + b, BlockPos::new(5, 3, -3));
        assert_eq!(a - b, BlockPos::new(-3, -7, 9));
        assert_eq!(-a, BlockPos::new(-1, 2, -3));
        assert_eq!(a * 3, BlockPos::new(3, -6, 9));
        assert_eq!(BlockPos::new(7, -7, 9) / 2, BlockPos::new(3, -3, 4));
        assert_eq!(BlockPos::new(7, -7, 9) % 2, BlockPos::new(1, -1, 1));
    }

    #[test]
    fn axis_indexing() {
        let p = BlockPos::new(10, 20, 30);
        assert_eq!(p[0], 10);
        assert_eq!(p[1], 20);
        assert_eq!(p[2], 30);
    }

    #[test]
    fn face_offsets() {
        let p = BlockPos::ZERO;
        assert_eq!(p.offset_face(BlockFace::Top, 1), BlockPos::UP);
        assert_eq!(p.offset_face(BlockFace::West, 2), BlockPos::new(-2, 0, 0));
    }

    #[test]
    fn chunk_pos_floors_per_axis() {
        assert_eq!(
            BlockPos::new(0, 0, 0).chunk_pos(),
            cgmath::Point3::new(0, 0, 0)
        );
        assert_eq!(
            BlockPos::new(CHUNK_EDGE - 1, CHUNK_EDGE, -1).chunk_pos(),
            cgmath::Point3::new(0, 1, -1)
        );
        assert_eq!(
            BlockPos::new(-CHUNK_EDGE, -CHUNK_EDGE - 1, CHUNK_EDGE * 2).chunk_pos(),
            cgmath::Point3::new(-1, -2, 2)
        );
    }

    #[test]
    fn float_conversion_round_trip() {
        let p = BlockPos::new(3, 4, 5);
        let v: cgmath::Vector3<f32> = p.into();
        assert_eq!(BlockPos::from(v), p);
    }
}
