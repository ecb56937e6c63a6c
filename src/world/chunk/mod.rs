//! # Chunk Module
//!
//! The `Chunk` struct: one fixed-size cubic volume of block ids, the unit of
//! loading and meshing. A chunk owns a dense `CHUNK_EDGE`³ grid (one byte per
//! cell), its generated mesh buffers, and a lifecycle state.
//!
//! ## Lifecycle
//!
//! Chunks are pool slots, not allocations: `Pooled → Generating → Active →
//! Pooled`. A pooled chunk keeps its stale grid data; nothing is cleared on
//! unload; the next terrain fill simply overwrites every cell. Pooled and
//! generating chunks are excluded from world lookups, so stale data is never
//! observable.
//!
//! ## Concurrency
//!
//! A chunk is mutated only by a terrain fill (bulk, while `Generating`) or a
//! single-block edit (while `Active`, main thread). It is read concurrently
//! by the meshers of itself and of its six face-adjacent neighbors, which is
//! why chunks travel wrapped in [`MtResource`](crate::core::MtResource).

use cgmath::Point3;

use crate::meshing::{ChunkMeshBuffers, MeshBounds};
use crate::world::block::{Block, BlockPos};

/// The edge length of a chunk in blocks.
pub const CHUNK_EDGE: i32 = 16;
/// The number of blocks in a single horizontal plane of a chunk.
pub const CHUNK_PLANE: i32 = CHUNK_EDGE * CHUNK_EDGE;
/// The total number of blocks in a chunk.
pub const CHUNK_VOLUME: i32 = CHUNK_PLANE * CHUNK_EDGE;

/// Lifecycle state of a chunk pool slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Sitting in the pool; grid data is stale and the chunk is excluded
    /// from all lookups.
    Pooled,
    /// Assigned a coordinate; a background terrain fill is in flight (or
    /// about to be). Still excluded from lookups.
    Generating,
    /// Terrain fill committed; the chunk participates in lookups and
    /// meshing.
    Active,
}

/// One fixed-size cubic volume of voxels.
pub struct Chunk {
    /// Position in chunk coordinates (not block coordinates).
    position: Point3<i32>,
    /// Dense block-id grid, row-major: x, then y, then z.
    blocks: Vec<Block>,
    state: ChunkState,
    /// Epoch of the current slot assignment. Bumped by the streamer every
    /// time the slot is handed out or reclaimed, and checked when background
    /// completions arrive, so work dispatched for a previous assignment can
    /// never be applied to a reused slot.
    epoch: u64,
    mesh: ChunkMeshBuffers,
    bounds: Option<MeshBounds>,
    visible: bool,
}

/// Flat grid index for an in-range local position.
#[inline]
fn block_index(local: BlockPos) -> usize {
    (local.x + local.y * CHUNK_EDGE + local.z * CHUNK_PLANE) as usize
}

impl Chunk {
    /// Creates a pooled chunk slot with a zeroed grid.
    pub fn pooled() -> Self {
        Chunk {
            position: Point3::new(0, 0, 0),
            blocks: vec![Block::default(); CHUNK_VOLUME as usize],
            state: ChunkState::Pooled,
            epoch: 0,
            mesh: ChunkMeshBuffers::new(),
            bounds: None,
            visible: false,
        }
    }

    /// The chunk-space coordinate of this chunk.
    pub fn position(&self) -> Point3<i32> {
        self.position
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// The epoch of the current slot assignment.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the chunk's geometry has been uploaded and may be drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The chunk's current mesh buffers.
    pub fn mesh(&self) -> &ChunkMeshBuffers {
        &self.mesh
    }

    /// Axis-aligned bounds derived from the current mesh, if any geometry
    /// exists.
    pub fn bounds(&self) -> Option<MeshBounds> {
        self.bounds
    }

    /// Reassigns this slot to a new coordinate and marks it `Generating`.
    /// The grid keeps its stale contents; the terrain fill overwrites them.
    pub(crate) fn begin_generating(&mut self, position: Point3<i32>, epoch: u64) {
        self.position = position;
        self.state = ChunkState::Generating;
        self.epoch = epoch;
        self.visible = false;
    }

    /// Commits the terrain fill: the chunk now participates in lookups.
    pub(crate) fn activate(&mut self) {
        self.state = ChunkState::Active;
    }

    /// Returns the slot to the pool. Clears no data eagerly.
    pub(crate) fn release(&mut self, epoch: u64) {
        self.state = ChunkState::Pooled;
        self.epoch = epoch;
        self.visible = false;
    }

    /// Marks the chunk drawable. Called only after the upload handler has
    /// consumed the finished buffers.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether a local position lies inside the chunk grid.
    pub fn contains(local: BlockPos) -> bool {
        local.x >= 0
            && local.y >= 0
            && local.z >= 0
            && local.x < CHUNK_EDGE
            && local.y < CHUNK_EDGE
            && local.z < CHUNK_EDGE
    }

    /// Gets the block at a chunk-local position.
    ///
    /// Out-of-range positions return `None` (the "no block" sentinel) rather
    /// than erroring, so callers can probe across a chunk boundary without
    /// special-casing.
    pub fn get(&self, local: BlockPos) -> Option<Block> {
        if Self::contains(local) {
            Some(self.blocks[block_index(local)])
        } else {
            None
        }
    }

    /// Gets the block at a chunk-local position without a bounds check.
    ///
    /// The hot meshing path uses this for cells it already knows are in
    /// range.
    ///
    /// # Panics
    /// May panic (or return an arbitrary cell) if `local` is out of range;
    /// the caller must have validated the coordinate.
    pub fn get_unchecked(&self, local: BlockPos) -> Block {
        debug_assert!(Self::contains(local));
        self.blocks[block_index(local)]
    }

    /// Sets the block at a chunk-local position.
    ///
    /// Silently no-ops outside the grid, mirroring `get`'s permissiveness:
    /// the edit path must never crash on an invalid coordinate.
    pub fn set(&mut self, local: BlockPos, block: Block) {
        if Self::contains(local) {
            self.blocks[block_index(local)] = block;
        }
    }

    /// Converts a chunk-local position to a world-space block position.
    pub fn chunk_to_world(&self, local: BlockPos) -> BlockPos {
        local + BlockPos::new(self.position.x, self.position.y, self.position.z) * CHUNK_EDGE
    }

    /// Converts a world-space block position to a chunk-local position.
    pub fn world_to_chunk(&self, world: BlockPos) -> BlockPos {
        world - BlockPos::new(self.position.x, self.position.y, self.position.z) * CHUNK_EDGE
    }

    /// Replaces the chunk's renderable geometry.
    ///
    /// Derives vertex normals from the finished triangle set and recomputes
    /// the bounding box. Must only be called from the thread that owns
    /// rendering resources (the main thread).
    pub fn set_mesh_buffers(&mut self, mut mesh: ChunkMeshBuffers) {
        mesh.recalculate_normals();
        self.bounds = mesh.compute_bounds();
        self.mesh = mesh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block::registry::standard_blocks;

    fn active_chunk_at(position: Point3<i32>) -> Chunk {
        let mut chunk = Chunk::pooled();
        chunk.begin_generating(position, 1);
        chunk.activate();
        chunk
    }

    #[test]
    fn set_then_get_round_trips_every_cell_boundary() {
        let (_, blocks) = standard_blocks();
        let mut chunk = active_chunk_at(Point3::new(0, 0, 0));
        let corners = [
            BlockPos::new(0, 0, 0),
            BlockPos::new(CHUNK_EDGE - 1, 0, 0),
            BlockPos::new(0, CHUNK_EDGE - 1, CHUNK_EDGE - 1),
            BlockPos::new(CHUNK_EDGE - 1, CHUNK_EDGE - 1, CHUNK_EDGE - 1),
            BlockPos::new(7, 3, 11),
        ];
        for pos in corners {
            chunk.set(pos, blocks.stone);
            assert_eq!(chunk.get(pos), Some(blocks.stone));
            assert_eq!(chunk.get_unchecked(pos), blocks.stone);
        }
    }

    #[test]
    fn out_of_range_get_returns_sentinel() {
        let chunk = active_chunk_at(Point3::new(0, 0, 0));
        for probe in [
            BlockPos::new(-1, 0, 0),
            BlockPos::new(0, -1, 0),
            BlockPos::new(0, 0, -1),
            BlockPos::new(CHUNK_EDGE, 0, 0),
            BlockPos::new(0, CHUNK_EDGE, 0),
            BlockPos::new(0, 0, CHUNK_EDGE),
        ] {
            assert_eq!(chunk.get(probe), None);
        }
    }

    #[test]
    fn out_of_range_set_is_a_no_op() {
        let (_, blocks) = standard_blocks();
        let mut chunk = active_chunk_at(Point3::new(0, 0, 0));
        let before: Vec<Block> = (0..CHUNK_EDGE)
            .map(|x| chunk.get_unchecked(BlockPos::new(x, 0, 0)))
            .collect();

        chunk.set(BlockPos::new(-1, 0, 0), blocks.stone);
        chunk.set(BlockPos::new(CHUNK_EDGE, CHUNK_EDGE, CHUNK_EDGE), blocks.stone);

        let after: Vec<Block> = (0..CHUNK_EDGE)
            .map(|x| chunk.get_unchecked(BlockPos::new(x, 0, 0)))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn coordinate_transforms_round_trip() {
        let chunk = active_chunk_at(Point3::new(2, -1, 3));
        for local in [
            BlockPos::new(0, 0, 0),
            BlockPos::new(5, 9, 13),
            BlockPos::new(CHUNK_EDGE - 1, CHUNK_EDGE - 1, CHUNK_EDGE - 1),
        ] {
            let world = chunk.chunk_to_world(local);
            assert_eq!(chunk.world_to_chunk(world), local);
            // The world position resolves back to this chunk.
            assert_eq!(world.chunk_pos(), chunk.position());
        }
    }

    #[test]
    fn chunk_to_world_is_injective_across_chunks() {
        let a = active_chunk_at(Point3::new(0, 0, 0));
        let b = active_chunk_at(Point3::new(1, 0, 0));
        let local = BlockPos::new(4, 4, 4);
        assert_ne!(a.chunk_to_world(local), b.chunk_to_world(local));
    }

    #[test]
    fn release_keeps_grid_but_hides_chunk() {
        let (_, blocks) = standard_blocks();
        let mut chunk = active_chunk_at(Point3::new(0, 0, 0));
        chunk.set(BlockPos::new(1, 2, 3), blocks.dirt);
        chunk.release(2);
        assert_eq!(chunk.state(), ChunkState::Pooled);
        assert!(!chunk.is_visible());
        // Stale data is kept, not cleared.
        assert_eq!(chunk.get(BlockPos::new(1, 2, 3)), Some(blocks.dirt));
    }
}
