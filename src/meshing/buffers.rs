//! # Mesh Buffer Module
//!
//! The geometry produced for one chunk: parallel vertex/index/uv sequences
//! plus derived normals, in the raw layouts a GPU-upload collaborator
//! consumes directly.

use cgmath::{InnerSpace, Point3, Vector3};

/// Axis-aligned bounding box derived from a finished mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshBounds {
    /// Minimum corner, chunk-local space.
    pub min: Point3<f32>,
    /// Maximum corner, chunk-local space.
    pub max: Point3<f32>,
}

/// Renderable geometry for one chunk.
///
/// Three parallel sequences (vertex positions, triangle indices, and UV
/// coordinates, one per vertex) plus normals derived afterward from the
/// finished triangle set. Buffers are rebuilt from scratch on every
/// regeneration; there is no incremental patching.
///
/// Indices are 32-bit: a large chunk edge can push vertex counts past
/// 65 535, so a 16-bit index buffer would silently corrupt geometry.
#[derive(Clone, Debug, Default)]
pub struct ChunkMeshBuffers {
    /// Vertex positions in chunk-local space.
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices, stride 3, winding fixed per face direction.
    pub indices: Vec<u32>,
    /// UV coordinates, one per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// Per-vertex normals; empty until [`recalculate_normals`] runs.
    ///
    /// [`recalculate_normals`]: ChunkMeshBuffers::recalculate_normals
    pub normals: Vec<[f32; 3]>,
}

impl ChunkMeshBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates empty buffers with room for `vertices` vertices.
    pub fn with_capacity(vertices: usize) -> Self {
        ChunkMeshBuffers {
            positions: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices + vertices / 2),
            uvs: Vec::with_capacity(vertices),
            normals: Vec::new(),
        }
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Removes all geometry, keeping the allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
        self.uvs.clear();
        self.normals.clear();
    }

    /// Derives per-vertex normals from the finished triangle set.
    ///
    /// Each triangle contributes its area-weighted face normal to its three
    /// vertices; the accumulated vectors are then normalized. Vertices shared
    /// by several faces (custom emitters may do this) receive the blended
    /// normal.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), [0.0; 3]);

        for triangle in self.indices.chunks_exact(3) {
            let a = Vector3::from(self.positions[triangle[0] as usize]);
            let b = Vector3::from(self.positions[triangle[1] as usize]);
            let c = Vector3::from(self.positions[triangle[2] as usize]);
            let face_normal = (b - a).cross(c - a);
            for &index in triangle {
                let n = &mut self.normals[index as usize];
                n[0] += face_normal.x;
                n[1] += face_normal.y;
                n[2] += face_normal.z;
            }
        }

        for n in &mut self.normals {
            let v = Vector3::from(*n);
            if v.magnitude2() > 0.0 {
                *n = v.normalize().into();
            }
        }
    }

    /// Computes the axis-aligned bounds of the mesh, or `None` for empty
    /// geometry.
    pub fn compute_bounds(&self) -> Option<MeshBounds> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions[1..] {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some(MeshBounds {
            min: Point3::new(min[0], min[1], min[2]),
            max: Point3::new(max[0], max[1], max[2]),
        })
    }

    /// Raw bytes of the position buffer, for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the index buffer, for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Raw bytes of the UV buffer, for GPU upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw bytes of the normal buffer, for GPU upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normals_for_an_upward_quad() {
        let mut mesh = ChunkMeshBuffers::new();
        mesh.positions.extend_from_slice(&[
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 0.0],
        ]);
        mesh.uvs.extend_from_slice(&[[0.0, 0.0]; 4]);
        mesh.indices.extend_from_slice(&[0, 1, 3, 1, 2, 3]);

        mesh.recalculate_normals();
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!((n[0]).abs() < 1e-6);
            assert!((n[1] - 1.0).abs() < 1e-6);
            assert!((n[2]).abs() < 1e-6);
        }
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mut mesh = ChunkMeshBuffers::new();
        assert_eq!(mesh.compute_bounds(), None);

        mesh.positions.extend_from_slice(&[
            [1.0, 2.0, 3.0],
            [-1.0, 5.0, 0.0],
            [0.5, 0.0, 7.0],
        ]);
        let bounds = mesh.compute_bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 5.0, 7.0));
    }

    #[test]
    fn byte_views_match_element_sizes() {
        let mut mesh = ChunkMeshBuffers::new();
        mesh.positions.push([0.0; 3]);
        mesh.indices.extend_from_slice(&[0, 0, 0]);
        mesh.uvs.push([0.0; 2]);
        assert_eq!(mesh.position_bytes().len(), 12);
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.uv_bytes().len(), 8);
    }
}
