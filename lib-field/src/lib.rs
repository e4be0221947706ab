//! The crate for storing and querying tile grids.
//! The coordinate system is as follows:
//! * `X` points right
//! * `Y` points down
//! * tile `(0, 0)` covers the pixels `[0, tile_width) x [0, tile_height)`
//!
//! Every query in this crate is total. Out of bounds reads return
//! [NO_TILE], out of bounds writes are ignored and out of bounds
//! cells never block movement. Only constructors can fail.

mod direction;
mod error;
mod field;
pub mod source;
pub mod transform;

pub use direction::*;
pub use error::*;
pub use field::*;
pub use source::MapDef;
pub use transform::{Projection, ViewTransform};
