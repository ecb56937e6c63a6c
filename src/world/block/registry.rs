//! # Block Registry Module
//!
//! The static catalog of block types. Each entry is a small capability table
//! (transparency, full-cube flag, per-face UV origin, optional custom mesh
//! emitter) rather than a dispatch hierarchy; the meshing code branches on
//! the capabilities directly.

use cgmath::Vector2;

use super::{Block, BlockFace};
use crate::meshing::{emit_cross_mesh, ChunkMeshBuffers, ATLAS_CELL};

/// Maximum number of registrable block types. Chunk grids store one byte per
/// cell, so the id space is exactly this large.
pub const MAX_BLOCK_TYPES: usize = 256;

/// A custom geometry emitter for blocks that do not occupy the full unit
/// cube. Called with the cell's chunk-local origin and the block's UV origin;
/// the emitter appends its own vertices, indices and UVs and is responsible
/// for correct winding and seam-free behavior.
pub type CustomMeshFn = fn(cell: cgmath::Vector3<f32>, uv_origin: Vector2<f32>, out: &mut ChunkMeshBuffers);

/// Per-face texture-atlas origin lookup for a block type.
#[derive(Copy, Clone, Debug)]
pub enum FaceUv {
    /// Every face samples the same atlas cell.
    Uniform(Vector2<f32>),
    /// Anisotropic blocks: distinct cells for the top, the four sides, and
    /// the bottom (grass, logs).
    TopSideBottom {
        /// Atlas origin for the +Y face.
        top: Vector2<f32>,
        /// Atlas origin for the four lateral faces.
        side: Vector2<f32>,
        /// Atlas origin for the −Y face.
        bottom: Vector2<f32>,
    },
}

impl FaceUv {
    /// The atlas origin for one face of the block.
    pub fn origin(&self, face: BlockFace) -> Vector2<f32> {
        match *self {
            FaceUv::Uniform(origin) => origin,
            FaceUv::TopSideBottom { top, side, bottom } => match face {
                BlockFace::Top => top,
                BlockFace::Bottom => bottom,
                _ => side,
            },
        }
    }

    /// The atlas origin used by custom emitters, which are not face-directed.
    pub fn base(&self) -> Vector2<f32> {
        match *self {
            FaceUv::Uniform(origin) => origin,
            FaceUv::TopSideBottom { side, .. } => side,
        }
    }
}

/// Capability table for one registered block type.
#[derive(Clone, Debug)]
pub struct BlockDef {
    name: &'static str,
    transparent: bool,
    full_cube: bool,
    face_uv: FaceUv,
    custom_mesh: Option<CustomMeshFn>,
}

impl BlockDef {
    /// A plain opaque full-cube block.
    pub fn new(name: &'static str, face_uv: FaceUv) -> Self {
        BlockDef {
            name,
            transparent: false,
            full_cube: true,
            face_uv,
            custom_mesh: None,
        }
    }

    /// Marks the block transparent: neighboring blocks render a face against
    /// it.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    /// Replaces standard face culling with a custom geometry emitter. The
    /// block no longer occupies the full cube.
    pub fn custom_mesh(mut self, emitter: CustomMeshFn) -> Self {
        self.full_cube = false;
        self.custom_mesh = Some(emitter);
        self
    }

    /// Removes all geometry from the block (air).
    pub fn no_geometry(mut self) -> Self {
        self.full_cube = false;
        self.custom_mesh = None;
        self
    }

    /// Display name of the block type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Should adjacent blocks render a face against this one?
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Does this block occupy the full unit cube and participate in face
    /// culling?
    pub fn is_full_cube(&self) -> bool {
        self.full_cube
    }

    /// The per-face UV-origin lookup.
    pub fn face_uv(&self) -> &FaceUv {
        &self.face_uv
    }

    /// The custom mesh emitter, if this block is not a full cube.
    pub fn custom_mesh_fn(&self) -> Option<CustomMeshFn> {
        self.custom_mesh
    }
}

/// The catalog of registered block types.
///
/// Registration order determines id assignment and is stable across a run;
/// ids are never reused. The registry is built once at startup and then only
/// read, so it is shared freely between threads.
pub struct BlockRegistry {
    defs: Vec<BlockDef>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        BlockRegistry { defs: Vec::new() }
    }

    /// Registers a block type and returns its assigned block id.
    ///
    /// # Panics
    /// Registering more than [`MAX_BLOCK_TYPES`] entries is a fatal
    /// configuration error and panics.
    pub fn register(&mut self, def: BlockDef) -> Block {
        if self.defs.len() >= MAX_BLOCK_TYPES {
            panic!(
                "cannot register block type '{}': registry is full ({} types)",
                def.name, MAX_BLOCK_TYPES
            );
        }
        let id = self.defs.len() as u8;
        self.defs.push(def);
        Block::from_id(id)
    }

    /// Looks up the capability table for a block.
    ///
    /// Total over every id the registry handed out. Ids originate only from
    /// the registry or from validated chunk storage, so an out-of-range id is
    /// a caller bug.
    ///
    /// # Panics
    /// Panics for an id that was never registered.
    pub fn lookup(&self, block: Block) -> &BlockDef {
        &self.defs[block.id() as usize]
    }

    /// Number of registered block types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no block types have been registered yet.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles to the standard block set, in registration order.
#[derive(Copy, Clone, Debug)]
pub struct StandardBlocks {
    /// Air: transparent, no geometry.
    pub air: Block,
    /// Dirt.
    pub dirt: Block,
    /// Stone.
    pub stone: Block,
    /// Grass: green top, grass-on-dirt sides, dirt bottom.
    pub grass: Block,
    /// Log: ring texture on top and bottom, bark on the sides.
    pub log: Block,
    /// Water: transparent full cube.
    pub water: Block,
    /// Tall grass decoration: crossed-quad custom mesh.
    pub tall_grass: Block,
    /// Flower decoration: crossed-quad custom mesh.
    pub flower: Block,
}

/// Builds the standard registry and returns it together with the handles to
/// its entries.
pub fn standard_blocks() -> (BlockRegistry, StandardBlocks) {
    let mut registry = BlockRegistry::new();

    let air = registry.register(
        BlockDef::new("Air", FaceUv::Uniform(Vector2::new(0.0, 0.0)))
            .transparent()
            .no_geometry(),
    );
    let dirt = registry.register(BlockDef::new("Dirt", FaceUv::Uniform(Vector2::new(0.0, 0.0))));
    let stone = registry.register(BlockDef::new(
        "Stone",
        FaceUv::Uniform(Vector2::new(ATLAS_CELL, 0.0)),
    ));
    let grass = registry.register(BlockDef::new(
        "Grass",
        FaceUv::TopSideBottom {
            top: Vector2::new(3.0 * ATLAS_CELL, 0.0),
            side: Vector2::new(2.0 * ATLAS_CELL, 0.0),
            bottom: Vector2::new(0.0, 0.0),
        },
    ));
    let log = registry.register(BlockDef::new(
        "Log",
        FaceUv::TopSideBottom {
            top: Vector2::new(5.0 * ATLAS_CELL, 0.0),
            side: Vector2::new(4.0 * ATLAS_CELL, 0.0),
            bottom: Vector2::new(5.0 * ATLAS_CELL, 0.0),
        },
    ));
    let water = registry.register(
        BlockDef::new("Water", FaceUv::Uniform(Vector2::new(6.0 * ATLAS_CELL, 0.0))).transparent(),
    );
    let tall_grass = registry.register(
        BlockDef::new(
            "Tall Grass",
            FaceUv::Uniform(Vector2::new(7.0 * ATLAS_CELL, 0.0)),
        )
        .transparent()
        .custom_mesh(emit_cross_mesh),
    );
    let flower = registry.register(
        BlockDef::new(
            "Flower",
            FaceUv::Uniform(Vector2::new(8.0 * ATLAS_CELL, 0.0)),
        )
        .transparent()
        .custom_mesh(emit_cross_mesh),
    );

    (
        registry,
        StandardBlocks {
            air,
            dirt,
            stone,
            grass,
            log,
            water,
            tall_grass,
            flower,
        },
    )
}
