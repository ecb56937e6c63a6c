//! # Meshing Module
//!
//! Converts chunk block data into renderable surface geometry. For every
//! full-cube block the generator emits exactly one quad per visible face.
//! A face is visible only when the neighboring cell belongs to a loaded
//! chunk and holds a transparent block. Non-full-cube blocks contribute
//! whatever their custom emitter appends. The result is a fresh set of
//! [`ChunkMeshBuffers`]; nothing is patched incrementally.
//!
//! ## Neighbor access
//!
//! Meshing runs on background workers, so it never consults the live world.
//! The streamer captures a [`ChunkNeighborhood`] on the main thread at
//! dispatch time: the chunk itself plus whichever of its six face-adjacent
//! neighbors were active at that moment. Cells probed beyond a missing
//! neighbor resolve to "no block", which culls the face: boundary faces
//! against unloaded regions are deliberately not emitted, so the world edge
//! never grows a wall of seams.

use std::sync::RwLockReadGuard;

use crate::core::MtResource;
use crate::world::block::registry::BlockRegistry;
use crate::world::block::{Block, BlockFace, BlockPos};
use crate::world::chunk::{Chunk, CHUNK_EDGE, CHUNK_PLANE};

pub mod buffers;
pub mod face;
pub mod tasks;

pub use buffers::{ChunkMeshBuffers, MeshBounds};
pub use face::{emit_cross_mesh, emit_face, ATLAS_CELL};

/// Initial vertex capacity for a chunk mesh, sized for typical terrain
/// (a few visible layers of a chunk's surface).
const MESH_VERTEX_CAPACITY: usize = (CHUNK_PLANE * 24) as usize;

/// A read-only snapshot of the chunk references a mesher may consult: the
/// chunk being meshed plus its six face-adjacent neighbors, captured on the
/// main thread while they were active.
pub struct ChunkNeighborhood {
    /// The chunk being meshed.
    pub chunk: MtResource<Chunk>,
    /// Face-adjacent neighbors, indexed by [`BlockFace`]. `None` marks a
    /// neighbor that was not loaded at capture time.
    pub neighbors: [Option<MtResource<Chunk>>; 6],
}

impl ChunkNeighborhood {
    /// Creates a neighborhood from a chunk and its captured neighbors.
    pub fn new(chunk: MtResource<Chunk>, neighbors: [Option<MtResource<Chunk>>; 6]) -> Self {
        ChunkNeighborhood { chunk, neighbors }
    }
}

/// Resolves the block on the far side of `face` from `local`, crossing into
/// the captured neighbor when the probe leaves the chunk. `None` means the
/// cell belongs to no loaded chunk.
fn neighbor_block(
    chunk: &Chunk,
    neighbors: &[Option<RwLockReadGuard<'_, Chunk>>],
    local: BlockPos,
    face: BlockFace,
) -> Option<Block> {
    let probe = local + face.normal();
    if Chunk::contains(probe) {
        return Some(chunk.get_unchecked(probe));
    }
    let guard = neighbors[face as usize].as_ref()?;
    let wrapped = BlockPos::new(
        probe.x.rem_euclid(CHUNK_EDGE),
        probe.y.rem_euclid(CHUNK_EDGE),
        probe.z.rem_euclid(CHUNK_EDGE),
    );
    Some(guard.get_unchecked(wrapped))
}

/// Generates the surface geometry for one chunk.
///
/// Reads the chunk and its captured neighbors under shared locks for the
/// duration of the build; no chunk is ever mutated. Buffers come back
/// without normals; the owner derives them (and the bounds) when it
/// installs the mesh.
pub fn generate_chunk_mesh(
    neighborhood: &ChunkNeighborhood,
    registry: &BlockRegistry,
) -> ChunkMeshBuffers {
    let chunk = neighborhood.chunk.get();
    let neighbors: Vec<Option<RwLockReadGuard<'_, Chunk>>> = neighborhood
        .neighbors
        .iter()
        .map(|n| n.as_ref().map(|resource| resource.get()))
        .collect();

    let mut out = ChunkMeshBuffers::with_capacity(MESH_VERTEX_CAPACITY);

    for x in 0..CHUNK_EDGE {
        for y in 0..CHUNK_EDGE {
            for z in 0..CHUNK_EDGE {
                let local = BlockPos::new(x, y, z);
                let def = registry.lookup(chunk.get_unchecked(local));

                if def.is_full_cube() {
                    for block_face in BlockFace::all() {
                        let visible = neighbor_block(&chunk, &neighbors, local, block_face)
                            .is_some_and(|block| registry.lookup(block).is_transparent());
                        if visible {
                            emit_face(local, block_face, def.face_uv().origin(block_face), &mut out);
                        }
                    }
                } else if let Some(emitter) = def.custom_mesh_fn() {
                    emitter(local.into(), def.face_uv().base(), &mut out);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block::registry::standard_blocks;
    use cgmath::Point3;

    fn make_chunk(
        position: Point3<i32>,
        fill: impl Fn(BlockPos) -> Block,
    ) -> MtResource<Chunk> {
        let mut chunk = Chunk::pooled();
        chunk.begin_generating(position, 1);
        for x in 0..CHUNK_EDGE {
            for y in 0..CHUNK_EDGE {
                for z in 0..CHUNK_EDGE {
                    let local = BlockPos::new(x, y, z);
                    chunk.set(local, fill(local));
                }
            }
        }
        chunk.activate();
        MtResource::new(chunk)
    }

    fn uniform_neighbors(block: Block) -> [Option<MtResource<Chunk>>; 6] {
        BlockFace::all().map(|face| {
            let offset = face.normal();
            Some(make_chunk(
                Point3::new(offset.x, offset.y, offset.z),
                move |_| block,
            ))
        })
    }

    /// Counts emitted quads all of whose vertices lie on the given plane.
    fn quads_on_plane(mesh: &ChunkMeshBuffers, axis: usize, value: f32) -> usize {
        mesh.positions
            .chunks_exact(4)
            .filter(|quad| quad.iter().all(|p| p[axis] == value))
            .count()
    }

    #[test]
    fn lone_corner_cell_without_neighbors_emits_three_faces() {
        let (registry, blocks) = standard_blocks();
        let chunk = make_chunk(Point3::new(0, 0, 0), |p| {
            if p == BlockPos::ZERO {
                blocks.dirt
            } else {
                blocks.air
            }
        });
        let neighborhood = ChunkNeighborhood::new(chunk, [None, None, None, None, None, None]);

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        // Faces into the chunk interior (air) are emitted; faces toward
        // unloaded space are culled.
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(quads_on_plane(&mesh, 1, 1.0), 1); // top
        assert_eq!(quads_on_plane(&mesh, 2, 1.0), 1); // north
        assert_eq!(quads_on_plane(&mesh, 0, 1.0), 1); // east
        assert_eq!(quads_on_plane(&mesh, 1, 0.0), 0); // bottom culled
    }

    #[test]
    fn lone_cell_with_loaded_air_neighbors_emits_all_six_faces() {
        let (registry, blocks) = standard_blocks();
        let chunk = make_chunk(Point3::new(0, 0, 0), |p| {
            if p == BlockPos::ZERO {
                blocks.dirt
            } else {
                blocks.air
            }
        });
        let neighborhood =
            ChunkNeighborhood::new(chunk, uniform_neighbors(blocks.air));

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);

        // Explicit enumeration: exactly one quad on each of the six planes
        // bounding the cell.
        assert_eq!(quads_on_plane(&mesh, 1, 1.0), 1); // top
        assert_eq!(quads_on_plane(&mesh, 1, 0.0), 1); // bottom
        assert_eq!(quads_on_plane(&mesh, 2, 1.0), 1); // north
        assert_eq!(quads_on_plane(&mesh, 2, 0.0), 1); // south
        assert_eq!(quads_on_plane(&mesh, 0, 1.0), 1); // east
        assert_eq!(quads_on_plane(&mesh, 0, 0.0), 1); // west
    }

    #[test]
    fn adjacent_cells_cull_their_shared_faces() {
        let (registry, blocks) = standard_blocks();
        let a = BlockPos::new(7, 7, 7);
        let b = BlockPos::new(8, 7, 7);
        let chunk = make_chunk(Point3::new(0, 0, 0), |p| {
            if p == a || p == b {
                blocks.dirt
            } else {
                blocks.air
            }
        });
        let neighborhood = ChunkNeighborhood::new(chunk, [None, None, None, None, None, None]);

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        // 12 faces total minus the two facing each other.
        assert_eq!(mesh.triangle_count(), 20);
        assert_eq!(quads_on_plane(&mesh, 0, 8.0), 0);
    }

    #[test]
    fn full_chunk_matches_the_face_count_invariant() {
        let (registry, blocks) = standard_blocks();
        let chunk = make_chunk(Point3::new(0, 0, 0), |_| blocks.dirt);
        let neighborhood =
            ChunkNeighborhood::new(chunk, uniform_neighbors(blocks.air));

        let mesh = generate_chunk_mesh(&neighborhood, &registry);

        // 6 faces × solid cells × 2 triangles, minus both sides of every
        // internal adjacency between solid cells.
        let solid = (CHUNK_EDGE * CHUNK_EDGE * CHUNK_EDGE) as usize;
        let adjacencies = 3 * ((CHUNK_EDGE - 1) * CHUNK_EDGE * CHUNK_EDGE) as usize;
        let expected_triangles = 6 * solid * 2 - adjacencies * 2 * 2;
        assert_eq!(mesh.triangle_count(), expected_triangles);
        // Only the outer shell survives.
        assert_eq!(
            mesh.triangle_count(),
            6 * (CHUNK_EDGE * CHUNK_EDGE) as usize * 2
        );
    }

    #[test]
    fn opaque_neighbor_chunk_culls_the_boundary_face() {
        let (registry, blocks) = standard_blocks();
        let cell = BlockPos::new(0, 7, 7);
        let chunk = make_chunk(Point3::new(0, 0, 0), move |p| {
            if p == cell {
                blocks.dirt
            } else {
                blocks.air
            }
        });
        let mut neighbors: [Option<MtResource<Chunk>>; 6] = [None, None, None, None, None, None];
        neighbors[BlockFace::West as usize] =
            Some(make_chunk(Point3::new(-1, 0, 0), |_| blocks.dirt));
        let neighborhood = ChunkNeighborhood::new(chunk, neighbors);

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        // Five in-chunk faces; the west face meets opaque dirt next door.
        assert_eq!(mesh.triangle_count(), 10);
        assert_eq!(quads_on_plane(&mesh, 0, 0.0), 0);
    }

    #[test]
    fn transparent_neighbor_chunk_keeps_the_boundary_face() {
        let (registry, blocks) = standard_blocks();
        let cell = BlockPos::new(0, 7, 7);
        let chunk = make_chunk(Point3::new(0, 0, 0), move |p| {
            if p == cell {
                blocks.dirt
            } else {
                blocks.air
            }
        });
        let mut neighbors: [Option<MtResource<Chunk>>; 6] = [None, None, None, None, None, None];
        neighbors[BlockFace::West as usize] =
            Some(make_chunk(Point3::new(-1, 0, 0), |_| blocks.water));
        let neighborhood = ChunkNeighborhood::new(chunk, neighbors);

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(quads_on_plane(&mesh, 0, 0.0), 1);
    }

    #[test]
    fn custom_mesh_blocks_bypass_face_culling() {
        let (registry, blocks) = standard_blocks();
        let cell = BlockPos::new(5, 5, 5);
        let chunk = make_chunk(Point3::new(0, 0, 0), move |p| {
            if p == cell {
                blocks.tall_grass
            } else {
                blocks.air
            }
        });
        let neighborhood = ChunkNeighborhood::new(chunk, [None, None, None, None, None, None]);

        let mesh = generate_chunk_mesh(&neighborhood, &registry);
        // Two crossed double-sided quads, nothing else.
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 8);
    }
}
