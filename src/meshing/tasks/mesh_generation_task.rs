//! # Mesh Generation Task
//!
//! Asynchronous mesh build for one chunk over a neighborhood captured at
//! dispatch time. The completion installs the finished buffers, hands them
//! to the upload collaborator, and only then makes the chunk visible.

use std::sync::Arc;

use cgmath::Point3;

use crate::meshing::{generate_chunk_mesh, ChunkMeshBuffers, ChunkNeighborhood};
use crate::task_management::task::{Completion, Task};
use crate::world::block::registry::BlockRegistry;
use crate::world::streamer::WorldStreamer;

/// A task that builds one chunk's surface geometry on a worker thread.
pub struct MeshGenerationTask {
    neighborhood: ChunkNeighborhood,
    registry: Arc<BlockRegistry>,
    position: Point3<i32>,
    epoch: u64,
}

impl MeshGenerationTask {
    /// Creates a mesh build task over the captured neighborhood.
    pub fn new(
        neighborhood: ChunkNeighborhood,
        registry: Arc<BlockRegistry>,
        position: Point3<i32>,
        epoch: u64,
    ) -> Self {
        MeshGenerationTask {
            neighborhood,
            registry,
            position,
            epoch,
        }
    }
}

impl Task for MeshGenerationTask {
    fn process(&self) -> Box<dyn Completion + Send> {
        let buffers = generate_chunk_mesh(&self.neighborhood, &self.registry);
        Box::new(MeshBuildComplete {
            position: self.position,
            epoch: self.epoch,
            buffers,
        })
    }
}

/// Completion of a mesh build: uploads and reveals the chunk, unless the
/// slot was reassigned while the build was in flight.
pub struct MeshBuildComplete {
    position: Point3<i32>,
    epoch: u64,
    buffers: ChunkMeshBuffers,
}

impl Completion for MeshBuildComplete {
    fn apply(self: Box<Self>, streamer: &mut WorldStreamer) {
        streamer.finish_mesh(self.position, self.epoch, self.buffers);
    }
}
