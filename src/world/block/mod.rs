//! # Block Module
//!
//! Core block-related functionality: the compact block identifier stored in
//! chunk grids, integer block positions, the six cube faces, and the registry
//! of block type capabilities.

use bytemuck::{Pod, Zeroable};

pub mod block_face;
pub mod block_pos;
pub mod registry;

pub use block_face::BlockFace;
pub use block_pos::BlockPos;

/// The underlying integer type used to represent block types in memory.
/// Chunk grids store one of these per cell, which caps the registry at 256
/// distinct block types.
pub type BlockId = u8;

/// A single voxel's block type, as stored in a chunk grid.
///
/// This is a lightweight id wrapper; the actual block properties are looked
/// up from the [`registry::BlockRegistry`]. Ids originate only from the
/// registry (or from chunk storage the registry already validated), so a
/// `Block` is always resolvable.
///
/// # Memory Layout
/// `#[repr(transparent)]` over a single byte, so chunk grids can be viewed as
/// raw bytes where needed.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Block {
    id: BlockId,
}

impl Block {
    /// Wraps a raw block id. Only the registry assigns ids; everything else
    /// passes `Block` values around opaquely.
    pub(crate) fn from_id(id: BlockId) -> Self {
        Block { id }
    }

    /// The raw registry id of this block.
    pub fn id(self) -> BlockId {
        self.id
    }
}
