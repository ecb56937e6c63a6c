//! # Meshing Tasks Module
//!
//! Background work units owned by the mesher: the mesh build dispatched when
//! a chunk needs its geometry (re)generated.

pub mod mesh_generation_task;
