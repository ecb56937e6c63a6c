//! # Face Emission Module
//!
//! Quad construction for visible cube faces and the crossed-quad emitter
//! used by plant-like blocks. All geometry is emitted in chunk-local space;
//! the renderer positions the whole chunk.

use cgmath::{Vector2, Vector3};

use super::buffers::ChunkMeshBuffers;
use crate::world::block::{BlockFace, BlockPos};

/// Width of one texture-atlas cell (the atlas is a 16×16 grid).
pub const ATLAS_CELL: f32 = 1.0 / 16.0;

/// UV offset to the right edge of an atlas cell.
const UV_RIGHT: Vector2<f32> = Vector2 { x: ATLAS_CELL, y: 0.0 };
/// UV offset to the top edge of an atlas cell.
const UV_UP: Vector2<f32> = Vector2 { x: 0.0, y: ATLAS_CELL };
/// UV offset to the far corner of an atlas cell.
const UV_CORNER: Vector2<f32> = Vector2 {
    x: ATLAS_CELL,
    y: ATLAS_CELL,
};

/// Corner offsets in the two free axes of a face, in emission order. The
/// vertex-to-UV correspondence below is fixed against this order.
const CORNER_OFFSETS: [[f32; 2]; 4] = [[-1.0, -1.0], [-1.0, 1.0], [1.0, 1.0], [1.0, -1.0]];

/// Appends one quad (two triangles) for a visible face of the cell at
/// `cell`, with UVs anchored at `uv_origin`.
///
/// The four corner vertices are produced by seeding the face normal and
/// filling its two zero axes from [`CORNER_OFFSETS`]. Two winding orders
/// keep every face front-facing outward: one for the +Y/−Z/−X faces, the
/// mirrored order for the other three, so no per-face normal computation is
/// needed during emission.
pub fn emit_face(cell: BlockPos, face: BlockFace, uv_origin: Vector2<f32>, out: &mut ChunkMeshBuffers) {
    let base = out.positions.len() as u32;
    let normal = face.normal();
    let normal = [normal.x as f32, normal.y as f32, normal.z as f32];

    for corner in CORNER_OFFSETS {
        let mut offset = normal;
        let mut c = 0;
        for axis in offset.iter_mut() {
            if *axis == 0.0 {
                *axis = corner[c];
                c += 1;
            }
        }
        out.positions.push([
            cell.x as f32 + (offset[0] + 1.0) * 0.5,
            cell.y as f32 + (offset[1] + 1.0) * 0.5,
            cell.z as f32 + (offset[2] + 1.0) * 0.5,
        ]);
    }

    for uv in [uv_origin + UV_RIGHT, uv_origin + UV_CORNER, uv_origin + UV_UP, uv_origin] {
        out.uvs.push([uv.x, uv.y]);
    }

    match face {
        BlockFace::Top | BlockFace::South | BlockFace::West => {
            out.indices
                .extend_from_slice(&[base, base + 1, base + 3, base + 1, base + 2, base + 3]);
        }
        _ => {
            out.indices
                .extend_from_slice(&[base + 3, base + 1, base, base + 3, base + 2, base + 1]);
        }
    }
}

/// Appends one double-sided quad of a crossed-plant mesh.
fn emit_cross_quad(corners: [Vector3<f32>; 4], uv_origin: Vector2<f32>, out: &mut ChunkMeshBuffers) {
    let base = out.positions.len() as u32;
    for corner in corners {
        out.positions.push([corner.x, corner.y, corner.z]);
    }
    for uv in [uv_origin, uv_origin + UV_UP, uv_origin + UV_CORNER, uv_origin + UV_RIGHT] {
        out.uvs.push([uv.x, uv.y]);
    }
    // Both windings, so the quad is visible from either side.
    out.indices.extend_from_slice(&[
        base,
        base + 1,
        base + 3,
        base + 3,
        base + 1,
        base + 2,
        base + 3,
        base + 1,
        base,
        base + 2,
        base + 1,
        base + 3,
    ]);
}

/// Custom emitter for plant-like blocks: two diagonal quads crossing inside
/// the cell, each double-sided. Used instead of face culling for non-full-cube
/// decorations (tall grass, flowers).
pub fn emit_cross_mesh(cell: Vector3<f32>, uv_origin: Vector2<f32>, out: &mut ChunkMeshBuffers) {
    emit_cross_quad(
        [
            cell,
            cell + Vector3::new(0.0, 1.0, 0.0),
            cell + Vector3::new(1.0, 1.0, 1.0),
            cell + Vector3::new(1.0, 0.0, 1.0),
        ],
        uv_origin,
        out,
    );
    emit_cross_quad(
        [
            cell + Vector3::new(0.0, 0.0, 1.0),
            cell + Vector3::new(0.0, 1.0, 1.0),
            cell + Vector3::new(1.0, 1.0, 0.0),
            cell + Vector3::new(1.0, 0.0, 0.0),
        ],
        uv_origin,
        out,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    /// Averaged geometric normal of every triangle in the buffer.
    fn triangle_normals(mesh: &ChunkMeshBuffers) -> Vec<Vector3<f32>> {
        mesh.indices
            .chunks_exact(3)
            .map(|tri| {
                let a = Vector3::from(mesh.positions[tri[0] as usize]);
                let b = Vector3::from(mesh.positions[tri[1] as usize]);
                let c = Vector3::from(mesh.positions[tri[2] as usize]);
                (b - a).cross(c - a).normalize()
            })
            .collect()
    }

    #[test]
    fn every_face_winds_outward() {
        for face in BlockFace::all() {
            let mut mesh = ChunkMeshBuffers::new();
            emit_face(BlockPos::new(0, 0, 0), face, Vector2::new(0.0, 0.0), &mut mesh);
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.triangle_count(), 2);

            let expected: Vector3<f32> = face.normal().into();
            for normal in triangle_normals(&mesh) {
                assert!(
                    (normal - expected).magnitude() < 1e-6,
                    "{:?}: triangle normal {:?} != face normal {:?}",
                    face,
                    normal,
                    expected
                );
            }
        }
    }

    #[test]
    fn face_vertices_lie_on_the_face_plane() {
        let mut mesh = ChunkMeshBuffers::new();
        emit_face(
            BlockPos::new(2, 3, 4),
            BlockFace::Top,
            Vector2::new(0.0, 0.0),
            &mut mesh,
        );
        for p in &mesh.positions {
            assert_eq!(p[1], 4.0);
            assert!(p[0] >= 2.0 && p[0] <= 3.0);
            assert!(p[2] >= 4.0 && p[2] <= 5.0);
        }
    }

    #[test]
    fn face_uvs_span_one_atlas_cell() {
        let origin = Vector2::new(2.0 * ATLAS_CELL, 0.0);
        let mut mesh = ChunkMeshBuffers::new();
        emit_face(BlockPos::new(0, 0, 0), BlockFace::North, origin, &mut mesh);
        let expected = [
            [origin.x + ATLAS_CELL, origin.y],
            [origin.x + ATLAS_CELL, origin.y + ATLAS_CELL],
            [origin.x, origin.y + ATLAS_CELL],
            [origin.x, origin.y],
        ];
        assert_eq!(mesh.uvs, expected);
    }

    #[test]
    fn cross_mesh_is_two_double_sided_quads() {
        let mut mesh = ChunkMeshBuffers::new();
        emit_cross_mesh(Vector3::new(0.0, 0.0, 0.0), Vector2::new(0.0, 0.0), &mut mesh);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 8);

        // Each quad contributes two opposing pairs of triangle normals.
        let normals = triangle_normals(&mesh);
        assert!((normals[0] + normals[2]).magnitude() < 1e-6);
        assert!((normals[1] + normals[3]).magnitude() < 1e-6);
    }
}
