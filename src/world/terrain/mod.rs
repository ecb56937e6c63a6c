//! # Terrain Generation Module
//!
//! Deterministic procedural terrain. Generation is a pure function of a
//! cell's world coordinate over two seeded Perlin fields (a surface height
//! field and a rock-floor field), so the same seed and chunk coordinate
//! always reproduce the same grid no matter which worker thread runs the
//! fill or in what order chunks are generated. The one exception is
//! decoration placement, which draws from a single shared random source
//! guarded by a mutex.

use std::sync::Mutex;

use noise::{NoiseFn, Perlin};

use crate::world::block::registry::StandardBlocks;
use crate::world::block::{Block, BlockPos};
use crate::world::chunk::{Chunk, CHUNK_EDGE};

/// Scale applied to world coordinates when sampling the height field.
pub const TERRAIN_SCALE: f64 = 0.05;
/// Peak-to-valley range of the surface height field, in blocks.
pub const HEIGHT_AMPLITUDE: f64 = 20.0;
/// World height at and below which open cells fill with water.
pub const SEA_LEVEL: i32 = 4;
/// Surface cells below this height are stone instead of grass, so shores
/// and the sea floor read as rock rather than lawn.
pub const SHORE_LEVEL: i32 = 6;

/// Scale applied when sampling the rock-floor field.
const ROCK_SCALE: f64 = 0.08;
/// Nominal depth of the stone layer under the surface cell.
const ROCK_DEPTH: i32 = 3;
/// Amplitude of the noise jitter applied to the rock floor, in blocks.
const ROCK_JITTER: f64 = 2.0;

/// Probability that the cell above a grass surface grows a flower.
const FLOWER_CHANCE: f32 = 0.02;
/// Probability that the cell above a grass surface grows tall grass,
/// checked after the flower roll.
const TALL_GRASS_CHANCE: f32 = 0.08;

/// Stateless-per-cell terrain classifier, run off the main thread to fill a
/// chunk's grid in bulk.
pub struct TerrainGenerator {
    height_noise: Perlin,
    rock_noise: Perlin,
    /// Shared source for decoration rolls. The only order-dependent input
    /// to generation; guarded because fills run concurrently.
    decoration_rng: Mutex<fastrand::Rng>,
    blocks: StandardBlocks,
}

impl TerrainGenerator {
    /// Creates a generator for the given world seed over the standard block
    /// set.
    pub fn new(seed: u32, blocks: StandardBlocks) -> Self {
        TerrainGenerator {
            height_noise: Perlin::new(seed),
            rock_noise: Perlin::new(seed.wrapping_add(1)),
            decoration_rng: Mutex::new(fastrand::Rng::with_seed(seed as u64)),
            blocks,
        }
    }

    /// Surface height of the column at world (x, z).
    fn surface_height(&self, x: i32, z: i32) -> i32 {
        let sample = self
            .height_noise
            .get([x as f64 * TERRAIN_SCALE, z as f64 * TERRAIN_SCALE]);
        ((sample + 1.0) * 0.5 * HEIGHT_AMPLITUDE) as i32
    }

    /// Height at and below which the column turns from stone to dirt.
    fn rock_floor(&self, x: i32, z: i32, surface: i32) -> i32 {
        let sample = self
            .rock_noise
            .get([x as f64 * ROCK_SCALE, z as f64 * ROCK_SCALE]);
        surface - ROCK_DEPTH + (sample * ROCK_JITTER) as i32
    }

    /// Rolls the shared decoration source for the cell above a grass
    /// surface.
    fn decoration(&self) -> Block {
        let roll = self.decoration_rng.lock().unwrap().f32();
        if roll < FLOWER_CHANCE {
            self.blocks.flower
        } else if roll < FLOWER_CHANCE + TALL_GRASS_CHANCE {
            self.blocks.tall_grass
        } else {
            self.blocks.air
        }
    }

    /// Fills every cell of the chunk's grid from the terrain fields.
    ///
    /// The chunk's coordinate decides the world-space volume sampled; stale
    /// grid contents from the slot's previous assignment are overwritten
    /// wholesale.
    pub fn fill_chunk(&self, chunk: &mut Chunk) {
        for x in 0..CHUNK_EDGE {
            for z in 0..CHUNK_EDGE {
                let column = chunk.chunk_to_world(BlockPos::new(x, 0, z));
                let surface = self.surface_height(column.x, column.z);
                let rock_floor = self.rock_floor(column.x, column.z, surface);

                for y in 0..CHUNK_EDGE {
                    let local = BlockPos::new(x, y, z);
                    let world_y = chunk.chunk_to_world(local).y;

                    let block = if world_y > surface {
                        if world_y <= SEA_LEVEL {
                            self.blocks.water
                        } else if world_y == surface + 1 && surface >= SHORE_LEVEL {
                            self.decoration()
                        } else {
                            self.blocks.air
                        }
                    } else if world_y == surface {
                        if surface < SHORE_LEVEL {
                            self.blocks.stone
                        } else {
                            self.blocks.grass
                        }
                    } else if world_y > rock_floor {
                        self.blocks.stone
                    } else {
                        self.blocks.dirt
                    };

                    chunk.set(local, block);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::block::registry::standard_blocks;
    use cgmath::Point3;

    fn filled_chunk(seed: u32, position: Point3<i32>) -> Chunk {
        let (_, blocks) = standard_blocks();
        let generator = TerrainGenerator::new(seed, blocks);
        let mut chunk = Chunk::pooled();
        chunk.begin_generating(position, 1);
        generator.fill_chunk(&mut chunk);
        chunk.activate();
        chunk
    }

    #[test]
    fn same_seed_and_coordinate_reproduce_the_grid() {
        let a = filled_chunk(12345, Point3::new(2, 0, -3));
        let b = filled_chunk(12345, Point3::new(2, 0, -3));
        for x in 0..CHUNK_EDGE {
            for y in 0..CHUNK_EDGE {
                for z in 0..CHUNK_EDGE {
                    let local = BlockPos::new(x, y, z);
                    assert_eq!(a.get_unchecked(local), b.get_unchecked(local));
                }
            }
        }
    }

    #[test]
    fn water_only_fills_open_cells_at_or_below_sea_level() {
        let (_, blocks) = standard_blocks();
        let chunk = filled_chunk(7, Point3::new(0, 0, 0));
        for x in 0..CHUNK_EDGE {
            for y in 0..CHUNK_EDGE {
                for z in 0..CHUNK_EDGE {
                    let local = BlockPos::new(x, y, z);
                    if chunk.get_unchecked(local) == blocks.water {
                        assert!(chunk.chunk_to_world(local).y <= SEA_LEVEL);
                    }
                }
            }
        }
    }

    #[test]
    fn columns_are_solid_below_their_surface() {
        let (_, blocks) = standard_blocks();
        let chunk = filled_chunk(99, Point3::new(0, 0, 0));
        for x in 0..CHUNK_EDGE {
            for z in 0..CHUNK_EDGE {
                // Walk down from the top; once a grass or stone surface cell
                // appears, everything beneath it must be stone or dirt.
                let mut below_surface = false;
                for y in (0..CHUNK_EDGE).rev() {
                    let block = chunk.get_unchecked(BlockPos::new(x, y, z));
                    if below_surface {
                        assert!(
                            block == blocks.stone || block == blocks.dirt,
                            "non-solid block below the surface at ({}, {}, {})",
                            x,
                            y,
                            z
                        );
                    } else if block == blocks.grass || block == blocks.stone {
                        below_surface = true;
                    }
                }
            }
        }
    }

    #[test]
    fn decorations_sit_directly_above_grass() {
        let (_, blocks) = standard_blocks();
        let chunk = filled_chunk(3, Point3::new(0, 0, 0));
        for x in 0..CHUNK_EDGE {
            for y in 1..CHUNK_EDGE {
                for z in 0..CHUNK_EDGE {
                    let block = chunk.get_unchecked(BlockPos::new(x, y, z));
                    if block == blocks.flower || block == blocks.tall_grass {
                        assert_eq!(
                            chunk.get_unchecked(BlockPos::new(x, y - 1, z)),
                            blocks.grass
                        );
                    }
                }
            }
        }
    }
}
