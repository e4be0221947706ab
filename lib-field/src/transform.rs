//! Conversions between view (screen) pixels, map pixels and tiles.
//! Everything here is a pure function of its arguments. The mutable
//! part of a view (scroll offset, placement, scale) travels in a
//! [ViewTransform] value.
//!
//! A map pixel `p` is shown at `p * scale + offset + location`. Scrolling
//! towards the right or bottom of the map makes the offset negative.

use glam::{Vec2, vec2};

use crate::Field2D;

/// Scroll offset, object placement and scale of a drawn map.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    pub offset: Vec2,
    pub location: Vec2,
    pub scale: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            offset: Vec2::ZERO,
            location: Vec2::ZERO,
            scale: Vec2::ONE,
        }
    }
}

impl ViewTransform {
    pub fn from_offset(offset: Vec2) -> Self {
        ViewTransform {
            offset,
            ..Default::default()
        }
    }

    /// View pixel X to map pixel X, rounded up.
    pub fn offset_x_pixel(&self, x: f32) -> i32 {
        ((x - self.offset.x - self.location.x) / self.scale.x).ceil() as i32
    }

    /// View pixel Y to map pixel Y, rounded up.
    pub fn offset_y_pixel(&self, y: f32) -> i32 {
        ((y - self.offset.y - self.location.y) / self.scale.y).ceil() as i32
    }

    /// Inverse of [ViewTransform::offset_x_pixel] and
    /// [ViewTransform::offset_y_pixel], without the rounding.
    pub fn map_to_view(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset + self.location
    }

    /// The pixel of tile column `tile_x` (possibly fractional) passed
    /// through [ViewTransform::offset_x_pixel].
    pub fn to_tile_scroll_pixel_x(&self, field: &Field2D, tile_x: f32) -> i32 {
        self.offset_x_pixel(tile_x * field.tile_width() as f32)
    }

    pub fn to_tile_scroll_pixel_y(&self, field: &Field2D, tile_y: f32) -> i32 {
        self.offset_y_pixel(tile_y * field.tile_height() as f32)
    }

    /// The tile column shown at view pixel `x`.
    pub fn to_pixel_scroll_tile_x(&self, field: &Field2D, x: f32) -> i32 {
        field.pixels_to_tiles_width(self.offset_x_pixel(x) as f32)
    }

    pub fn to_pixel_scroll_tile_y(&self, field: &Field2D, y: f32) -> i32 {
        field.pixels_to_tiles_height(self.offset_y_pixel(y) as f32)
    }
}

/// How tiles are laid out on screen.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Orthogonal,
    /// Diamond layout, tiles anchored by their top-left corner.
    Isometric,
    /// Diamond layout, tiles anchored by their center.
    Staggered,
}

impl Projection {
    /// Top-left pixel of tile `(tile_x, tile_y)` before scrolling.
    /// `map_size` is the grid size in tiles.
    pub fn tile_to_pixel(self, tile_x: f32, tile_y: f32, tile_size: Vec2, map_size: Vec2) -> Vec2 {
        match self {
            Projection::Orthogonal => vec2(tile_x, tile_y) * tile_size,
            Projection::Isometric | Projection::Staggered => {
                ortho_to_iso(tile_x, tile_y, tile_size, self.iso_origin(tile_size, map_size))
            }
        }
    }

    /// Inverse of [Projection::tile_to_pixel]. The result is fractional,
    /// so callers pick their own rounding.
    pub fn pixel_to_tile(self, p: Vec2, tile_size: Vec2, map_size: Vec2) -> Vec2 {
        match self {
            Projection::Orthogonal => p / tile_size,
            Projection::Isometric | Projection::Staggered => {
                iso_to_ortho(p, tile_size, self.iso_origin(tile_size, map_size))
            }
        }
    }

    /// Where tile `(0, 0)` lands. The diamond is re-centered by half of
    /// the map's pixel width. On maps taller than wide the left corner
    /// still ends up at a negative X.
    pub fn iso_origin(self, tile_size: Vec2, map_size: Vec2) -> Vec2 {
        let half_map = map_size.x * tile_size.x / 2.0;
        match self {
            Projection::Orthogonal => Vec2::ZERO,
            Projection::Isometric => vec2(half_map, 0.0),
            Projection::Staggered => vec2(half_map - tile_size.x / 2.0, -tile_size.y / 2.0),
        }
    }
}

/// 45 degree diamond projection of a tile coordinate.
pub fn ortho_to_iso(tile_x: f32, tile_y: f32, tile_size: Vec2, origin: Vec2) -> Vec2 {
    vec2(
        (tile_x - tile_y) * tile_size.x / 2.0 + origin.x,
        (tile_x + tile_y) * tile_size.y / 2.0 + origin.y,
    )
}

pub fn iso_to_ortho(p: Vec2, tile_size: Vec2, origin: Vec2) -> Vec2 {
    let diff = (p.x - origin.x) / (tile_size.x / 2.0);
    let sum = (p.y - origin.y) / (tile_size.y / 2.0);
    vec2((sum + diff) / 2.0, (sum - diff) / 2.0)
}
