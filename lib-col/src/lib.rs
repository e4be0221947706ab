//! Box collisions for actors living on a tile map.
//! The coordinate system is as follows:
//! * `X` points right
//! * `Y` points down
//!
//! Every body is an [Aabb] tagged with a [Group]. The [CollisionWorld]
//! hashes them into a uniform grid and resolves movement with swept boxes.

mod aabb;
mod group;
mod world;

pub use aabb::*;
pub use group::*;
pub use world::*;

/// Tolerance used by sweeps to tell grazing contacts from real ones.
pub const SWEEP_EPSILON: f32 = 1e-5;
