//! # World Streamer Module
//!
//! The central coordinator for chunk streaming. The streamer owns a fixed
//! pool of reusable chunk slots and the map from chunk coordinate to the
//! slots currently in use; each tick it decides what to load and unload,
//! dispatches terrain fills and mesh builds to the background workers, and
//! drains their completions exactly once.
//!
//! ## Tick pipeline
//!
//! 1. Process scheduled unloads: the slot returns to the pool and its epoch
//!    advances, orphaning any in-flight work for the old assignment.
//! 2. Process scheduled loads: pop a pooled slot (log and skip when the
//!    pool is exhausted; the coordinate is retried by the next
//!    `load_around` pass), assign it, and dispatch a terrain fill.
//! 3. Drain completions: terrain completions flip chunks to active and
//!    queue their first mesh build; mesh completions install buffers, fire
//!    the upload handler, then reveal the chunk.
//! 4. Dispatch mesh builds for everything queued for regeneration.
//!
//! ## Threading
//!
//! All streamer state (the pool, the coordinate map, the scheduling sets)
//! is touched only on the main thread. Workers see chunks exclusively
//! through the [`MtResource`] handles captured when their task was
//! dispatched.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cgmath::{Point3, Vector3};
use log::{debug, error, info, warn};

use crate::config::StreamerConfig;
use crate::core::MtResource;
use crate::meshing::tasks::mesh_generation_task::MeshGenerationTask;
use crate::meshing::{ChunkMeshBuffers, ChunkNeighborhood};
use crate::task_management::TaskManager;
use crate::world::block::registry::BlockRegistry;
use crate::world::block::{Block, BlockFace, BlockPos};
use crate::world::chunk::{Chunk, ChunkState, CHUNK_EDGE};
use crate::world::tasks::terrain_generation_task::TerrainGenerationTask;
use crate::world::terrain::TerrainGenerator;

/// Callback invoked on the main thread with a chunk's finished geometry,
/// before the chunk is made visible.
pub type UploadHandler = Box<dyn FnMut(Point3<i32>, &ChunkMeshBuffers)>;

/// Streams a bounded working set of chunks around the observer.
pub struct WorldStreamer {
    registry: Arc<BlockRegistry>,
    generator: Arc<TerrainGenerator>,
    task_manager: TaskManager,

    /// Every chunk slot, pooled or in use. Fixed size; never grows.
    slots: Vec<MtResource<Chunk>>,
    /// Indices of slots currently in the pool.
    free_slots: Vec<usize>,
    /// Chunk coordinate → slot index for every assigned slot (generating or
    /// active).
    assigned: HashMap<Point3<i32>, usize>,
    /// Monotonic source for slot-assignment epochs.
    epoch_counter: u64,

    positions_to_load: HashSet<Point3<i32>>,
    positions_to_unload: HashSet<Point3<i32>>,
    remesh_queue: VecDeque<Point3<i32>>,

    load_radius: i32,
    depth_below: i32,
    min_reload_distance_sq: i32,
    observer_chunk: Point3<i32>,
    last_reload_point: Point3<i32>,

    upload_handler: Option<UploadHandler>,
    last_tick_duration: Duration,
}

impl WorldStreamer {
    /// Creates a streamer with a pool of `config.max_chunks` slots and its
    /// own worker threads.
    pub fn new(
        config: &StreamerConfig,
        registry: Arc<BlockRegistry>,
        generator: TerrainGenerator,
    ) -> Self {
        let workers = if config.workers > 0 {
            config.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(2)
        };

        let slots: Vec<MtResource<Chunk>> = (0..config.max_chunks)
            .map(|_| MtResource::new(Chunk::pooled()))
            .collect();
        let free_slots: Vec<usize> = (0..config.max_chunks).rev().collect();

        WorldStreamer {
            registry,
            generator: Arc::new(generator),
            task_manager: TaskManager::new(workers),
            slots,
            free_slots,
            assigned: HashMap::new(),
            epoch_counter: 0,
            positions_to_load: HashSet::new(),
            positions_to_unload: HashSet::new(),
            remesh_queue: VecDeque::new(),
            load_radius: config.load_radius,
            depth_below: config.depth_below,
            min_reload_distance_sq: config.min_reload_distance_sq,
            observer_chunk: Point3::new(0, 0, 0),
            last_reload_point: Point3::new(0, 0, 0),
            upload_handler: None,
            last_tick_duration: Duration::ZERO,
        }
    }

    /// Registers the collaborator that uploads finished chunk geometry.
    /// Called with the buffers on the main thread; only after it returns is
    /// the chunk flagged visible.
    pub fn set_upload_handler(
        &mut self,
        handler: impl FnMut(Point3<i32>, &ChunkMeshBuffers) + 'static,
    ) {
        self.upload_handler = Some(Box::new(handler));
    }

    /// Schedules the initial chunk load around the origin.
    pub fn init(&mut self) {
        let start = Instant::now();
        self.observer_chunk = Point3::new(0, 0, 0);
        self.last_reload_point = Point3::new(0, 0, 0);
        self.load_around(self.last_reload_point, self.load_radius);
        info!(
            "scheduled {} initial chunk loads in {:?}",
            self.positions_to_load.len(),
            start.elapsed()
        );
    }

    /// Runs one main-thread tick of the streaming pipeline.
    pub fn tick(&mut self) {
        let start = Instant::now();

        self.process_unloads();
        self.process_loads();

        let completions = self.task_manager.drain_completions();
        for completion in completions {
            completion.apply(self);
        }

        self.process_remesh_queue();
        self.task_manager.process_queued_tasks();

        self.last_tick_duration = start.elapsed();
    }

    /// Schedules loads and unloads so that exactly the chunks within the L1
    /// ball of `radius` around `center` are resident.
    ///
    /// The vertical extent is asymmetric: only `depth_below` layers beneath
    /// the center are kept, since deep underground volume is unreachable.
    /// Already-resident coordinates inside the ball are left untouched.
    pub fn load_around(&mut self, center: Point3<i32>, radius: i32) {
        // Every resident coordinate starts on the unload list and earns its
        // stay by showing up inside the new ball.
        for position in self.assigned.keys() {
            self.positions_to_unload.insert(*position);
        }

        for dx in -radius..=radius {
            for dy in -self.depth_below..=radius {
                for dz in -radius..=radius {
                    if dx.abs() + dy.abs() + dz.abs() > radius {
                        continue;
                    }
                    let position = Point3::new(center.x + dx, center.y + dy, center.z + dz);
                    if self.assigned.contains_key(&position) {
                        self.positions_to_unload.remove(&position);
                    } else {
                        self.positions_to_load.insert(position);
                    }
                }
            }
        }
    }

    /// Feeds the observer's world-space position for this tick.
    ///
    /// Reloads the streaming ball only once the observer has both entered a
    /// new chunk and moved past the minimum squared distance from the last
    /// reload point, so small jitter around a chunk boundary never thrashes
    /// the loader.
    pub fn update_observer(&mut self, position: Point3<f32>) {
        let chunk_pos = Self::chunk_pos_at(position);
        if chunk_pos == self.observer_chunk {
            return;
        }
        self.observer_chunk = chunk_pos;

        let delta = chunk_pos - self.last_reload_point;
        let distance_sq = delta.x * delta.x + delta.y * delta.y + delta.z * delta.z;
        if distance_sq >= self.min_reload_distance_sq {
            info!("observer entered chunk {:?}; loading new chunks", chunk_pos);
            self.load_around(chunk_pos, self.load_radius);
            self.last_reload_point = chunk_pos;
        }
    }

    /// The chunk coordinate containing a world-space position.
    pub fn chunk_pos_at(position: Point3<f32>) -> Point3<i32> {
        Point3::new(
            (position.x / CHUNK_EDGE as f32).floor() as i32,
            (position.y / CHUNK_EDGE as f32).floor() as i32,
            (position.z / CHUNK_EDGE as f32).floor() as i32,
        )
    }

    /// The block at a world-space position, or `None` when the owning chunk
    /// is not resident and active. Callers treat `None` as transparent.
    pub fn block_at(&self, position: BlockPos) -> Option<Block> {
        let &slot = self.assigned.get(&position.chunk_pos())?;
        let chunk = self.slots[slot].get();
        if chunk.state() != ChunkState::Active {
            return None;
        }
        chunk.get(chunk.world_to_chunk(position))
    }

    /// Writes a block at a world-space position and schedules the affected
    /// chunks for mesh regeneration.
    ///
    /// Edits against unloaded regions are dropped silently. An edit on a
    /// chunk boundary also schedules the face-adjacent neighbor sharing that
    /// boundary, because the edit changes which of the neighbor's faces are
    /// visible.
    // TODO: queue edits against unloaded chunks and replay them once the
    // chunk's terrain fill lands.
    pub fn set_block(&mut self, position: BlockPos, block: Block) {
        let chunk_pos = position.chunk_pos();
        let Some(&slot) = self.assigned.get(&chunk_pos) else {
            debug!("dropping edit at {:?}: chunk not loaded", position);
            return;
        };

        let local;
        {
            let mut chunk = self.slots[slot].get_mut();
            if chunk.state() != ChunkState::Active {
                return;
            }
            local = chunk.world_to_chunk(position);
            chunk.set(local, block);
        }

        self.queue_remesh(chunk_pos);

        for axis in 0..3 {
            let mut delta = Vector3::new(0, 0, 0);
            if local[axis] == 0 {
                delta[axis] = -1;
            } else if local[axis] == CHUNK_EDGE - 1 {
                delta[axis] = 1;
            } else {
                continue;
            }
            self.queue_remesh(chunk_pos + delta);
        }
    }

    /// Number of chunk slots currently assigned a coordinate.
    pub fn loaded_chunk_count(&self) -> usize {
        self.assigned.len()
    }

    /// Number of chunk slots waiting in the pool.
    pub fn pooled_remaining(&self) -> usize {
        self.free_slots.len()
    }

    /// Wall-clock duration of the most recent [`tick`](Self::tick).
    pub fn last_tick_duration(&self) -> Duration {
        self.last_tick_duration
    }

    /// Whether the chunk at a coordinate has uploaded geometry and may be
    /// drawn.
    pub fn is_chunk_visible(&self, position: Point3<i32>) -> bool {
        self.assigned
            .get(&position)
            .is_some_and(|&slot| self.slots[slot].get().is_visible())
    }

    /// Applies a terrain-fill completion: the chunk becomes active and gets
    /// its first mesh build, unless the slot was reassigned in the meantime.
    pub(crate) fn finish_terrain(&mut self, position: Point3<i32>, epoch: u64) {
        let Some(&slot) = self.assigned.get(&position) else {
            debug!("dropping terrain completion for unloaded chunk {:?}", position);
            return;
        };
        {
            let mut chunk = self.slots[slot].get_mut();
            if chunk.epoch() != epoch {
                debug!("dropping stale terrain completion for {:?}", position);
                return;
            }
            chunk.activate();
        }
        self.queue_remesh(position);
    }

    /// Applies a mesh-build completion: installs the buffers, hands them to
    /// the upload collaborator, then reveals the chunk, unless the slot was
    /// reassigned in the meantime.
    pub(crate) fn finish_mesh(
        &mut self,
        position: Point3<i32>,
        epoch: u64,
        buffers: ChunkMeshBuffers,
    ) {
        let Some(&slot) = self.assigned.get(&position) else {
            debug!("dropping mesh completion for unloaded chunk {:?}", position);
            return;
        };
        {
            let mut chunk = self.slots[slot].get_mut();
            if chunk.epoch() != epoch {
                debug!("dropping stale mesh completion for {:?}", position);
                return;
            }
            chunk.set_mesh_buffers(buffers);
        }

        if let Some(handler) = self.upload_handler.as_mut() {
            let chunk = self.slots[slot].get();
            handler(position, chunk.mesh());
        }

        self.slots[slot].get_mut().set_visible(true);
    }

    /// Returns every scheduled-for-unload slot to the pool.
    fn process_unloads(&mut self) {
        if self.positions_to_unload.is_empty() {
            return;
        }
        let positions: Vec<Point3<i32>> = self.positions_to_unload.drain().collect();
        for position in positions {
            let Some(slot) = self.assigned.remove(&position) else {
                warn!("trying to unload nonexistent chunk at {:?}", position);
                continue;
            };
            self.epoch_counter += 1;
            self.slots[slot].get_mut().release(self.epoch_counter);
            self.free_slots.push(slot);
        }
    }

    /// Assigns a pooled slot to every scheduled-for-load coordinate and
    /// dispatches its terrain fill.
    fn process_loads(&mut self) {
        if self.positions_to_load.is_empty() {
            return;
        }
        let positions: Vec<Point3<i32>> = self.positions_to_load.drain().collect();
        for position in positions {
            if self.assigned.contains_key(&position) {
                warn!("trying to load existing chunk at {:?}", position);
                continue;
            }
            let Some(slot) = self.free_slots.pop() else {
                error!("chunk pool exhausted; skipping load of {:?}", position);
                continue;
            };

            self.epoch_counter += 1;
            let resource = self.slots[slot].clone();
            resource.get_mut().begin_generating(position, self.epoch_counter);
            self.assigned.insert(position, slot);

            self.task_manager.publish_task(Box::new(TerrainGenerationTask::new(
                resource,
                self.generator.clone(),
                position,
                self.epoch_counter,
            )));
        }
    }

    /// Queues a chunk coordinate for mesh regeneration, if it is resident
    /// and not already queued.
    fn queue_remesh(&mut self, position: Point3<i32>) {
        if self.assigned.contains_key(&position) && !self.remesh_queue.contains(&position) {
            self.remesh_queue.push_back(position);
        }
    }

    /// Dispatches a mesh build for every queued coordinate that is still
    /// active.
    fn process_remesh_queue(&mut self) {
        while let Some(position) = self.remesh_queue.pop_front() {
            let Some(neighborhood) = self.capture_neighborhood(position) else {
                continue;
            };
            let epoch = neighborhood.chunk.get().epoch();
            self.task_manager.publish_task(Box::new(MeshGenerationTask::new(
                neighborhood,
                self.registry.clone(),
                position,
                epoch,
            )));
        }
    }

    /// Captures the read-only neighborhood a mesh build may consult: the
    /// chunk plus every face-adjacent neighbor that is active right now.
    fn capture_neighborhood(&self, position: Point3<i32>) -> Option<ChunkNeighborhood> {
        let &slot = self.assigned.get(&position)?;
        let chunk = self.slots[slot].clone();
        if chunk.get().state() != ChunkState::Active {
            return None;
        }

        let mut neighbors: [Option<MtResource<Chunk>>; 6] = [None, None, None, None, None, None];
        for face in BlockFace::all() {
            let normal = face.normal();
            let neighbor_pos =
                Point3::new(position.x + normal.x, position.y + normal.y, position.z + normal.z);
            if let Some(&neighbor_slot) = self.assigned.get(&neighbor_pos) {
                let resource = self.slots[neighbor_slot].clone();
                if resource.get().state() == ChunkState::Active {
                    neighbors[face as usize] = Some(resource);
                }
            }
        }

        Some(ChunkNeighborhood::new(chunk, neighbors))
    }
}
