//! # World Tasks Module
//!
//! Background work units owned by the world: the terrain fill that runs
//! when a pooled chunk slot is assigned a new coordinate.

pub mod terrain_generation_task;
