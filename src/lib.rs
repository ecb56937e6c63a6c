#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

//! # Voxel Streamer
//!
//! A streaming voxel world library: it keeps a bounded, pooled working set of
//! fixed-size chunks resident around a moving observer, fills their contents
//! from a deterministic procedural terrain field, and converts block data into
//! renderable surface geometry, with generation and meshing running on
//! background worker threads so the main tick loop never stalls.
//!
//! ## Key Modules
//!
//! * `world` - Block data, chunks, terrain generation and the world streamer
//! * `meshing` - Visible-face mesh generation and geometry buffers
//! * `task_management` - Worker threads and the main-thread completion drain
//! * `core` - Shared-resource primitives used across threads
//! * `config` - Runtime configuration for the streamer
//!
//! ## Architecture
//!
//! One main thread drives the tick loop: it decides chunk loads and unloads,
//! drains completed background work once per tick, and hands finished
//! geometry to the rendering collaborator. Terrain fills and mesh builds each
//! run as one unit of background work on a bounded worker pool. A chunk only
//! becomes visible to neighbor queries after its terrain fill is fully
//! committed, and per-chunk epochs guard against completions arriving for a
//! pool slot that has since been reassigned.
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_streamer::config::StreamerConfig;
//!
//! voxel_streamer::run(StreamerConfig::default());
//! ```

use std::sync::Arc;
use std::time::Duration;

use cgmath::Point3;
use log::info;

use config::StreamerConfig;
use world::block::registry::standard_blocks;
use world::block::BlockPos;
use world::streamer::WorldStreamer;
use world::terrain::TerrainGenerator;

pub mod config;
pub mod core;
pub mod meshing;
pub mod task_management;
pub mod world;

/// Number of ticks the demo driver runs before exiting.
const DEMO_TICKS: u32 = 600;

/// Units the demo observer moves along +X each tick.
const DEMO_OBSERVER_SPEED: f32 = 0.9;

/// Runs the headless demo driver: an owned scheduler loop that feeds a
/// scripted observer path to the streamer, ticks it, and logs the diagnostic
/// counters.
///
/// This is the explicit replacement for an engine-driven lifecycle: `init()`
/// is called once, then `tick()` once per loop iteration.
pub fn run(config: StreamerConfig) {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let (registry, blocks) = standard_blocks();
    let registry = Arc::new(registry);
    let generator = TerrainGenerator::new(config.seed, blocks);

    let mut streamer = WorldStreamer::new(&config, registry, generator);
    streamer.set_upload_handler(|position, mesh| {
        log::debug!(
            "uploading chunk {:?}: {} vertices, {} triangles",
            position,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    });

    streamer.init();

    let mut observer = Point3::new(0.0f32, 24.0, 0.0);
    let mut edited = false;

    for tick in 0..DEMO_TICKS {
        observer.x += DEMO_OBSERVER_SPEED;
        streamer.update_observer(observer);
        streamer.tick();

        // Once the starting area is resident, poke a block out of the ground
        // to exercise the interactive edit path.
        if !edited && tick > 120 {
            let target = BlockPos::new(observer.x as i32, 10, 0);
            if let Some(block) = streamer.block_at(target) {
                streamer.set_block(target, blocks.air);
                info!("removed block {:?} at {:?}", block, target);
                edited = true;
            }
        }

        if tick % 60 == 0 {
            info!(
                "tick {}: {} chunks loaded, {} pooled remaining, last tick {:?}",
                tick,
                streamer.loaded_chunk_count(),
                streamer.pooled_remaining(),
                streamer.last_tick_duration()
            );
        }

        std::thread::sleep(Duration::from_millis(5));
    }

    info!(
        "demo finished: {} chunks loaded, {} pooled remaining",
        streamer.loaded_chunk_count(),
        streamer.pooled_remaining()
    );
}
