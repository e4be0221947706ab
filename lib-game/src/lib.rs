//! The tile map runtime: a [TileMap] with its tile registry and draw
//! cache, actors driven by [MoveControl], and the [GameLoop] that ticks
//! them through a [Scheduler].
//!
//! Rendering goes through the [TileRenderer] trait. The `macroquad`
//! feature adds a renderer backed by macroquad textures.

mod config;
mod movement;
mod process;
mod render;
mod scene;
mod tilemap;

pub use config::*;
pub use movement::*;
pub use process::*;
pub use render::*;
pub use scene::*;
pub use tilemap::*;

pub use lib_col;
pub use lib_field;
pub use lib_path;
