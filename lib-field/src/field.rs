use glam::{IVec2, Vec2, ivec2};
use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::{Direction, FieldError};

/// The code reported for cells outside of the grid.
pub const NO_TILE: i32 = -1;

/// A rectangular grid of tile codes plus the rules deciding which
/// codes block movement.
///
/// A code blocks movement iff it is in the `limit` set and is not
/// in the `allow_move` set. The override always wins, so toggling
/// `allow_move` membership flips blocking without touching `limit`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2D {
    width: i32,
    height: i32,
    tile_width: i32,
    tile_height: i32,
    /// Row-major: `data[y * width + x]`
    data: Vec<i32>,
    limit: HashSet<i32>,
    allow_move: HashSet<i32>,
    offset: Vec2,
}

impl Field2D {
    /// Creates a grid filled with code `0`.
    pub fn new(
        width: i32,
        height: i32,
        tile_width: i32,
        tile_height: i32,
    ) -> Result<Self, FieldError> {
        let len = Self::check_dims(width, height, tile_width, tile_height)?;
        Self::from_data(width, height, tile_width, tile_height, vec![0; len])
    }

    pub fn from_data(
        width: i32,
        height: i32,
        tile_width: i32,
        tile_height: i32,
        data: Vec<i32>,
    ) -> Result<Self, FieldError> {
        let expected = Self::check_dims(width, height, tile_width, tile_height)?;
        if data.len() != expected {
            return Err(FieldError::DataLength {
                expected,
                found: data.len(),
            });
        }

        Ok(Field2D {
            width,
            height,
            tile_width,
            tile_height,
            data,
            limit: HashSet::new(),
            allow_move: HashSet::new(),
            offset: Vec2::ZERO,
        })
    }

    /// Builds a grid from rows, indexed as `rows[y][x]`.
    pub fn from_rows<R: AsRef<[i32]>>(
        rows: &[R],
        tile_width: i32,
        tile_height: i32,
    ) -> Result<Self, FieldError> {
        let data = Self::flatten_rows(rows)?;
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0) as i32;
        Self::from_data(width, height, tile_width, tile_height, data)
    }

    fn flatten_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Vec<i32>, FieldError> {
        let expected = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(expected * rows.len());
        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != expected {
                return Err(FieldError::RaggedRows {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
            data.extend_from_slice(cells);
        }
        Ok(data)
    }

    fn check_dims(
        width: i32,
        height: i32,
        tile_width: i32,
        tile_height: i32,
    ) -> Result<usize, FieldError> {
        // Cells are addressed as `y * width + x` in i32
        let cells = width.checked_mul(height).filter(|_| width > 0 && height > 0);
        let Some(cells) = cells else {
            return Err(FieldError::InvalidDimensions { width, height });
        };
        if tile_width <= 0 || tile_height <= 0 {
            return Err(FieldError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        Ok(cells as usize)
    }

    /// Swaps the whole map for new rows. The blocking rules and the
    /// offset are kept. On error the field stays untouched.
    pub fn set_map<R: AsRef<[i32]>>(&mut self, rows: &[R]) -> Result<(), FieldError> {
        let data = Self::flatten_rows(rows)?;
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0) as i32;
        Self::check_dims(width, height, self.tile_width, self.tile_height)?;
        if (width, height) != (self.width, self.height) {
            debug!(
                "Map resized from {}x{} to {width}x{height}",
                self.width, self.height
            );
        }
        self.width = width;
        self.height = height;
        self.data = data;
        Ok(())
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_width(&self) -> i32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> i32 {
        self.tile_height
    }

    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_width as f32
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_height as f32
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn inside(&self, x: i32, y: i32) -> bool {
        0 <= x && x < self.width && 0 <= y && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.inside(x, y) {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn tile_type(&self, x: i32, y: i32) -> i32 {
        match self.index(x, y) {
            Some(idx) => self.data[idx],
            None => NO_TILE,
        }
    }

    pub fn set_tile_type(&mut self, x: i32, y: i32, code: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.data[idx] = code;
    }

    pub fn tile_type_at_pixel(&self, px: f32, py: f32) -> i32 {
        self.tile_type(self.pixels_to_tiles_width(px), self.pixels_to_tiles_height(py))
    }

    /// Replaces every `old` code with `new`. Returns the amount of
    /// replaced cells.
    pub fn replace_type(&mut self, old: i32, new: i32) -> usize {
        let mut count = 0;
        for cell in self.data.iter_mut().filter(|cell| **cell == old) {
            *cell = new;
            count += 1;
        }
        count
    }

    pub fn fill(&mut self, code: i32) {
        self.data.fill(code);
    }

    /// Raw row-major cell data.
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    /// Iterates the rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> + '_ {
        self.data.chunks_exact(self.width as usize)
    }

    /// Returns the iterator over elements of form (x, y, code)
    pub fn iter_poses(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, code)| (idx as i32 % width, idx as i32 / width, *code))
    }

    /// Counts how many cells hold each code.
    pub fn codes(&self) -> HashMap<i32, usize> {
        let mut out = HashMap::new();
        for code in &self.data {
            *out.entry(*code).or_insert(0) += 1;
        }
        out
    }

    pub fn set_limit(&mut self, codes: impl IntoIterator<Item = i32>) {
        self.limit = codes.into_iter().collect();
    }

    pub fn limit(&self) -> &HashSet<i32> {
        &self.limit
    }

    pub fn set_allow_move(&mut self, codes: impl IntoIterator<Item = i32>) {
        self.allow_move = codes.into_iter().collect();
    }

    pub fn allow_move(&self) -> &HashSet<i32> {
        &self.allow_move
    }

    pub fn is_blocking_code(&self, code: i32) -> bool {
        self.limit.contains(&code) && !self.allow_move.contains(&code)
    }

    fn blocks(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(idx) => self.is_blocking_code(self.data[idx]),
            None => false,
        }
    }

    /// Returns `true` if the cell is inside the grid and can be entered.
    pub fn is_hit(&self, x: i32, y: i32) -> bool {
        self.inside(x, y) && !self.blocks(x, y)
    }

    pub fn is_pixel_hit(&self, px: f32, py: f32) -> bool {
        self.is_hit(self.pixels_to_tiles_width(px), self.pixels_to_tiles_height(py))
    }

    /// Checks an actor box moving from `(actor_x, actor_y)` to `(new_x, new_y)`.
    /// The whole swept rectangle is tested, so a fast actor can not skip
    /// over a blocking cell. Cells outside of the grid never block.
    pub fn check_tile_collision(
        &self,
        actor_x: f32,
        actor_y: f32,
        actor_w: f32,
        actor_h: f32,
        new_x: f32,
        new_y: f32,
    ) -> bool {
        self.first_blocking_tile(actor_x, actor_y, actor_w, actor_h, new_x, new_y)
            .is_some()
    }

    /// Same traversal as [Field2D::check_tile_collision], but reports the
    /// first blocking cell in row-major order.
    pub fn first_blocking_tile(
        &self,
        actor_x: f32,
        actor_y: f32,
        actor_w: f32,
        actor_h: f32,
        new_x: f32,
        new_y: f32,
    ) -> Option<IVec2> {
        if !(actor_x.is_finite()
            && actor_y.is_finite()
            && actor_w.is_finite()
            && actor_h.is_finite()
            && new_x.is_finite()
            && new_y.is_finite())
        {
            return None;
        }

        let from_x = actor_x.min(new_x);
        let from_y = actor_y.min(new_y);
        let to_x = actor_x.max(new_x);
        let to_y = actor_y.max(new_y);

        // The box covers whole pixels: the last one is `x + w - 1`
        let (min_tile, max_tile) = self.covered_tiles(
            from_x,
            from_y,
            (to_x + actor_w - 1.0).max(from_x),
            (to_y + actor_h - 1.0).max(from_y),
        )?;

        for y in min_tile.y..=max_tile.y {
            for x in min_tile.x..=max_tile.x {
                if self.blocks(x, y) {
                    return Some(ivec2(x, y));
                }
            }
        }

        None
    }

    /// Clamps the tile span of a pixel rectangle to the grid.
    /// Returns [None] if there is no overlap at all.
    fn covered_tiles(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<(IVec2, IVec2)> {
        let min = ivec2(
            self.pixels_to_tiles_width(x0).max(0),
            self.pixels_to_tiles_height(y0).max(0),
        );
        let max = ivec2(
            self.pixels_to_tiles_width(x1).min(self.width - 1),
            self.pixels_to_tiles_height(y1).min(self.height - 1),
        );
        if min.x > max.x || min.y > max.y {
            return None;
        }
        Some((min, max))
    }

    /// The passable neighbours of a cell. `diagonal` adds the
    /// two-axis steps after the single-axis ones.
    pub fn neighbours(&self, x: i32, y: i32, diagonal: bool) -> Vec<IVec2> {
        let dirs: &[Direction] = if diagonal {
            &[
                Direction::TrueUp,
                Direction::TrueRight,
                Direction::TrueDown,
                Direction::TrueLeft,
                Direction::Up,
                Direction::Right,
                Direction::Down,
                Direction::Left,
            ]
        } else {
            &Direction::TRUE
        };
        let origin = ivec2(x, y);
        dirs.iter()
            .map(|dir| origin + dir.delta())
            .filter(|pos| self.is_hit(pos.x, pos.y))
            .collect()
    }

    pub fn pixels_to_tiles_width(&self, px: f32) -> i32 {
        (px / self.tile_width as f32).floor() as i32
    }

    pub fn pixels_to_tiles_height(&self, py: f32) -> i32 {
        (py / self.tile_height as f32).floor() as i32
    }

    pub fn tiles_to_width_pixels(&self, tiles: i32) -> f32 {
        tiles as f32 * self.tile_width as f32
    }

    pub fn tiles_to_height_pixels(&self, tiles: i32) -> f32 {
        tiles as f32 * self.tile_height as f32
    }
}
