//! # Terrain Generation Task
//!
//! Asynchronous terrain fill for a newly assigned chunk slot. Scheduled by
//! the streamer whenever a coordinate inside the streaming radius has no
//! resident chunk; the completion marks the chunk active and queues it for
//! meshing.

use std::sync::Arc;

use cgmath::Point3;
use log::debug;

use crate::core::MtResource;
use crate::task_management::task::{Completion, Task};
use crate::world::chunk::Chunk;
use crate::world::streamer::WorldStreamer;
use crate::world::terrain::TerrainGenerator;

/// A task that fills one chunk's grid from the terrain fields on a worker
/// thread.
pub struct TerrainGenerationTask {
    chunk: MtResource<Chunk>,
    generator: Arc<TerrainGenerator>,
    position: Point3<i32>,
    epoch: u64,
}

impl TerrainGenerationTask {
    /// Creates a terrain fill task for the given slot assignment.
    pub fn new(
        chunk: MtResource<Chunk>,
        generator: Arc<TerrainGenerator>,
        position: Point3<i32>,
        epoch: u64,
    ) -> Self {
        TerrainGenerationTask {
            chunk,
            generator,
            position,
            epoch,
        }
    }
}

impl Task for TerrainGenerationTask {
    /// Fills the chunk grid in bulk under the chunk's write lock.
    ///
    /// The fill is skipped when the slot's epoch no longer matches this
    /// task's: the slot was unloaded and reassigned while the task sat in
    /// a queue, and the reassignment dispatched its own fill.
    fn process(&self) -> Box<dyn Completion + Send> {
        {
            let mut chunk = self.chunk.get_mut();
            if chunk.epoch() == self.epoch {
                self.generator.fill_chunk(&mut chunk);
            } else {
                debug!(
                    "skipping stale terrain fill for reassigned slot (chunk {:?})",
                    self.position
                );
            }
        }

        Box::new(TerrainFillComplete {
            position: self.position,
            epoch: self.epoch,
        })
    }
}

/// Completion of a terrain fill: flips the chunk to active and queues its
/// first mesh build.
pub struct TerrainFillComplete {
    position: Point3<i32>,
    epoch: u64,
}

impl Completion for TerrainFillComplete {
    fn apply(self: Box<Self>, streamer: &mut WorldStreamer) {
        streamer.finish_terrain(self.position, self.epoch);
    }
}
