mod registry;

use glam::{IVec2, Vec2, ivec2, vec2};
use hashbrown::HashMap;
use hecs::Entity;
use lib_col::Aabb;
use lib_field::{Direction, Field2D, FieldError, Projection, ViewTransform};
use log::{debug, error, trace, warn};

pub use registry::*;

pub const DEFAULT_SCROLL_STEP: f32 = 8.0;

use crate::{ActionBind, DrawCall, ImageId, RenderContext, TileRenderer, Tint};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TileMapError {
    #[error("the tile map is completed, tile {code} can not be changed")]
    Completed { code: i32 },
    #[error("an animation needs at least one frame")]
    EmptyAnimation,
    #[error("animation frame {index} has zero duration")]
    ZeroFrame { index: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Counters of the render cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Draws that walked the grid and the registry
    pub rebuilds: u64,
    /// Draws that reused the previous batch
    pub replays: u64,
    pub draw_calls: u64,
    pub failed_calls: u64,
}

/// Inclusive range of tiles. Empty when `first` is past `last` on
/// either axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileWindow {
    pub first: IVec2,
    pub last: IVec2,
}

impl TileWindow {
    pub fn is_empty(&self) -> bool {
        self.first.x > self.last.x || self.first.y > self.last.y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.first.x..=self.last.x).contains(&x) && (self.first.y..=self.last.y).contains(&y)
    }

    /// Row-major walk over the window.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + use<> {
        let TileWindow { first, last } = *self;
        (first.y..=last.y).flat_map(move |y| (first.x..=last.x).map(move |x| ivec2(x, y)))
    }
}

#[derive(Clone, Copy, Debug)]
enum CachedSprite {
    Image(ImageId),
    /// Resolved on every draw, the frame changes over time
    Animated(i32),
}

#[derive(Clone, Copy, Debug)]
struct CachedTile {
    sprite: CachedSprite,
    pos: Vec2,
    size: Vec2,
}

/// A grid together with the images of its tile codes and a scrollable
/// view of it.
///
/// The visible tiles are batched on draw. The batch is only rebuilt when
/// the content changed (see [TileMap::is_dirty]) or the view scrolled
/// since the previous draw, otherwise it is replayed as is.
pub struct TileMap {
    field: Field2D,
    registry: HashMap<i32, TileEntry>,
    view: ViewTransform,
    view_size: Vec2,
    scroll_step: f32,
    projection: Projection,
    follow: Option<Entity>,
    tint: Tint,
    visible: bool,
    completed: bool,
    warned_empty: bool,

    dirty: bool,
    last_offset: Option<Vec2>,
    cache: Vec<CachedTile>,
    stats: CacheStats,
}

impl TileMap {
    /// A map showing `field` through a view of `view_size` pixels.
    pub fn new(field: Field2D, view_size: Vec2) -> TileMap {
        TileMap {
            field,
            registry: HashMap::new(),
            view: ViewTransform::default(),
            view_size: view_size.max(Vec2::ZERO),
            scroll_step: DEFAULT_SCROLL_STEP,
            projection: Projection::Orthogonal,
            follow: None,
            tint: Tint::WHITE,
            visible: true,
            completed: false,
            warned_empty: false,
            dirty: true,
            last_offset: None,
            cache: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn field(&self) -> &Field2D {
        &self.field
    }

    pub fn width(&self) -> i32 {
        self.field.width()
    }

    pub fn height(&self) -> i32 {
        self.field.height()
    }

    pub fn tile_type(&self, x: i32, y: i32) -> i32 {
        self.field.tile_type(x, y)
    }

    pub fn set_tile_type(&mut self, x: i32, y: i32, code: i32) {
        if self.field.inside(x, y) && self.field.tile_type(x, y) != code {
            self.field.set_tile_type(x, y, code);
            self.dirty = true;
        }
    }

    pub fn replace_type(&mut self, old: i32, new: i32) -> usize {
        let count = self.field.replace_type(old, new);
        if count > 0 {
            self.dirty = true;
        }
        count
    }

    pub fn set_map<R: AsRef<[i32]>>(&mut self, rows: &[R]) -> Result<(), TileMapError> {
        self.field.set_map(rows)?;
        self.dirty = true;
        Ok(())
    }

    /// Replaces the blocking codes. Drawing does not depend on them.
    pub fn set_limit(&mut self, codes: impl IntoIterator<Item = i32>) {
        self.field.set_limit(codes);
    }

    pub fn set_allow_move(&mut self, codes: impl IntoIterator<Item = i32>) {
        self.field.set_allow_move(codes);
    }

    /* Registry */

    pub fn put_tile(&mut self, code: i32, image: ImageId) -> Result<(), TileMapError> {
        self.put_entry(
            code,
            TileEntry {
                sprite: TileSprite::Image(image),
                attribute: None,
            },
        )
    }

    pub fn put_tile_with_attribute(
        &mut self,
        code: i32,
        image: ImageId,
        attribute: Attribute,
    ) -> Result<(), TileMapError> {
        self.put_entry(
            code,
            TileEntry {
                sprite: TileSprite::Image(image),
                attribute: Some(attribute),
            },
        )
    }

    pub fn put_animation_tile(
        &mut self,
        code: i32,
        animation: TileAnimation,
        attribute: Option<Attribute>,
    ) -> Result<(), TileMapError> {
        self.put_entry(
            code,
            TileEntry {
                sprite: TileSprite::Animation(animation),
                attribute,
            },
        )
    }

    /// Inserts an entry, replacing the previous one for `code`.
    pub fn put_entry(&mut self, code: i32, entry: TileEntry) -> Result<(), TileMapError> {
        if self.completed {
            return Err(TileMapError::Completed { code });
        }
        if self.registry.insert(code, entry).is_some() {
            debug!("Tile {code} replaced");
        }
        self.warned_empty = false;
        self.dirty = true;
        Ok(())
    }

    pub fn remove_tile(&mut self, code: i32) -> Result<Option<TileEntry>, TileMapError> {
        if self.completed {
            return Err(TileMapError::Completed { code });
        }
        let removed = self.registry.remove(&code);
        if removed.is_some() {
            self.dirty = true;
        }
        Ok(removed)
    }

    pub fn tile(&self, code: i32) -> Option<&TileEntry> {
        self.registry.get(&code)
    }

    pub fn tile_attribute(&self, code: i32) -> Option<&Attribute> {
        self.registry.get(&code)?.attribute.as_ref()
    }

    /// Attribute of the tile code stored in cell `(x, y)`.
    pub fn attribute_at(&self, x: i32, y: i32) -> Option<&Attribute> {
        self.tile_attribute(self.field.tile_type(x, y))
    }

    pub fn registry_len(&self) -> usize {
        self.registry.len()
    }

    /// Freezes the registry. Later insertions and removals fail.
    pub fn complete(&mut self) {
        if !self.completed {
            debug!("Tile map completed with {} tiles", self.registry.len());
        }
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /* View */

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn offset(&self) -> Vec2 {
        self.view.offset
    }

    /// Sets the offset as is, without clamping. A followed actor takes
    /// it back on the next camera update.
    pub fn set_offset(&mut self, offset: Vec2) {
        if offset.is_finite() {
            self.view.offset = offset;
        }
    }

    pub fn location(&self) -> Vec2 {
        self.view.location
    }

    pub fn set_location(&mut self, location: Vec2) {
        if location.is_finite() && location != self.view.location {
            self.view.location = location;
            self.dirty = true;
        }
    }

    pub fn scale(&self) -> Vec2 {
        self.view.scale
    }

    /// Non-positive or non-finite scales are ignored.
    pub fn set_scale(&mut self, scale: Vec2) {
        if scale.is_finite() && scale.cmpgt(Vec2::ZERO).all() && scale != self.view.scale {
            self.view.scale = scale;
            self.dirty = true;
        }
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_view_size(&mut self, size: Vec2) {
        if size.is_finite() && size != self.view_size {
            self.view_size = size.max(Vec2::ZERO);
            self.dirty = true;
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if projection != self.projection {
            self.projection = projection;
            self.dirty = true;
        }
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    /// Applied on every draw, the batch stays valid.
    pub fn set_tint(&mut self, tint: Tint) {
        self.tint = tint;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Unscaled pixel size of the laid out map.
    pub fn map_extent(&self) -> Vec2 {
        let tile = self.tile_size();
        let size = vec2(self.field.width() as f32, self.field.height() as f32);
        match self.projection {
            Projection::Orthogonal => size * tile,
            Projection::Isometric | Projection::Staggered => (size.x + size.y) * tile / 2.0,
        }
    }

    /// Unscaled map pixels covered by the tile images. Diamond layouts
    /// of maps taller than wide start left of zero.
    pub fn map_rect(&self) -> Aabb {
        let min = match self.projection {
            Projection::Orthogonal => Vec2::ZERO,
            projection => {
                let size = vec2(self.field.width() as f32, self.field.height() as f32);
                let tile = self.tile_size();
                let left = projection.tile_to_pixel(0.0, size.y - 1.0, tile, size);
                let top = projection.tile_to_pixel(0.0, 0.0, tile, size);
                vec2(left.x, top.y) + self.sprite_shift()
            }
        };
        Aabb::from_pos_size(min, self.map_extent())
    }

    /// The range the offset is kept in by scrolling. The upper bound
    /// shows the left or top edge of the map, the lower one the opposite
    /// edge. A map smaller than the view can not scroll.
    pub fn offset_bounds(&self) -> (Vec2, Vec2) {
        let rect = self.map_rect();
        let hi = -rect.min * self.view.scale;
        let lo = (self.view_size - rect.max * self.view.scale).min(hi);
        (lo, hi)
    }

    pub fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        let (lo, hi) = self.offset_bounds();
        offset.clamp(lo, hi)
    }

    /// The offset that puts the map in the middle of the view.
    pub fn center_offset(&self) -> Vec2 {
        self.view_size / 2.0 - self.map_rect().center() * self.view.scale
    }

    pub fn center(&mut self) {
        self.set_offset(self.center_offset());
    }

    pub fn scroll_left(&mut self, distance: f32) {
        self.scroll_by(vec2(distance, 0.0));
    }

    pub fn scroll_right(&mut self, distance: f32) {
        self.scroll_by(vec2(-distance, 0.0));
    }

    pub fn scroll_up(&mut self, distance: f32) {
        self.scroll_by(vec2(0.0, distance));
    }

    pub fn scroll_down(&mut self, distance: f32) {
        self.scroll_by(vec2(0.0, -distance));
    }

    /// Pixels moved by [TileMap::scroll_toward].
    pub fn scroll_step(&self) -> f32 {
        self.scroll_step
    }

    pub fn set_scroll_step(&mut self, step: f32) {
        if step.is_finite() && step >= 0.0 {
            self.scroll_step = step;
        }
    }

    /// One scroll step towards `dir`. Diagonal directions move on both
    /// axes.
    pub fn scroll_toward(&mut self, dir: Direction) {
        let delta = dir.delta_f32() * self.scroll_step;
        self.scroll(delta.x, delta.y);
    }

    /// Moves the view by `(dx, dy)` pixels over the map. Positive values
    /// go right and down.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_by(vec2(-dx, -dy));
    }

    fn scroll_by(&mut self, delta: Vec2) {
        if let Some(target) = self.follow {
            trace!("Ignoring scroll by {delta}, following {target:?}");
            return;
        }
        if !delta.is_finite() {
            return;
        }
        self.view.offset = self.clamp_offset(self.view.offset + delta);
    }

    pub fn follow(&self) -> Option<Entity> {
        self.follow
    }

    /// While a target is set, manual scrolling does nothing.
    pub fn set_follow(&mut self, target: Option<Entity>) {
        self.follow = target;
    }

    /// Centers the view on `actor` as far as the map edges allow.
    pub fn follow_action_object(&mut self, actor: &dyn ActionBind) {
        let center = (actor.location() + actor.size() / 2.0) * self.view.scale;
        let offset = self.view_size / 2.0 - center;
        if offset.is_finite() {
            self.view.offset = self.clamp_offset(offset);
        }
    }

    /// The tiles the current view can show. Non-orthogonal layouts do
    /// not map a screen rectangle onto a tile rectangle, so the whole
    /// grid is returned for them.
    pub fn visible_window(&self) -> TileWindow {
        let max = ivec2(self.field.width() - 1, self.field.height() - 1);
        if self.projection != Projection::Orthogonal {
            return TileWindow {
                first: IVec2::ZERO,
                last: max,
            };
        }

        let origin = -self.view.offset / self.view.scale;
        let span = self.view_size / self.view.scale;
        let first = ivec2(
            self.field.pixels_to_tiles_width(origin.x),
            self.field.pixels_to_tiles_height(origin.y),
        );
        let span = ivec2(
            self.field.pixels_to_tiles_width(span.x),
            self.field.pixels_to_tiles_height(span.y),
        );
        let last = ivec2(
            first.x.saturating_add(span.x).saturating_add(1),
            first.y.saturating_add(span.y).saturating_add(1),
        );

        TileWindow {
            first: first.max(IVec2::ZERO),
            last: last.min(max),
        }
    }

    /// The cell under a view pixel, if any.
    pub fn tile_at_view(&self, p: Vec2) -> Option<IVec2> {
        let tile = match self.projection {
            Projection::Orthogonal => ivec2(
                self.view.to_pixel_scroll_tile_x(&self.field, p.x),
                self.view.to_pixel_scroll_tile_y(&self.field, p.y),
            ),
            projection => {
                let map_px = (p - self.view.offset - self.view.location) / self.view.scale;
                let size = vec2(self.field.width() as f32, self.field.height() as f32);
                projection
                    .pixel_to_tile(map_px, self.tile_size(), size)
                    .floor()
                    .as_ivec2()
            }
        };
        self.field.inside(tile.x, tile.y).then_some(tile)
    }

    /// View position of a tile anchor. That is the top-left corner of an
    /// orthogonal tile and the top vertex of an isometric diamond.
    pub fn tile_to_view(&self, x: i32, y: i32) -> Vec2 {
        let size = vec2(self.field.width() as f32, self.field.height() as f32);
        let map_px = self
            .projection
            .tile_to_pixel(x as f32, y as f32, self.tile_size(), size);
        self.view.map_to_view(map_px)
    }

    /// Where the image of a tile starts.
    fn sprite_pos(&self, x: i32, y: i32) -> Vec2 {
        self.tile_to_view(x, y) + self.sprite_shift() * self.view.scale
    }

    /// Unscaled distance from a tile anchor to its image corner.
    fn sprite_shift(&self) -> Vec2 {
        match self.projection {
            Projection::Isometric => vec2(-self.field.tile_width() as f32 / 2.0, 0.0),
            Projection::Orthogonal | Projection::Staggered => Vec2::ZERO,
        }
    }

    fn tile_size(&self) -> Vec2 {
        vec2(
            self.field.tile_width() as f32,
            self.field.tile_height() as f32,
        )
    }

    /* Frame */

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Advances tile animations.
    pub fn update(&mut self, dt: f32) {
        for entry in self.registry.values_mut() {
            if let TileSprite::Animation(anim) = &mut entry.sprite {
                anim.update(dt);
            }
        }
    }

    /// Draws the visible tiles and returns how many calls succeeded.
    /// Renderer failures are logged and skipped.
    pub fn draw(&mut self, renderer: &mut dyn TileRenderer) -> usize {
        if !self.visible {
            return 0;
        }
        if self.registry.is_empty() {
            if !self.warned_empty {
                error!("Tile map has no registered tiles, nothing to draw");
                self.warned_empty = true;
            }
            return 0;
        }

        if self.dirty || self.last_offset != Some(self.view.offset) {
            self.rebuild();
        } else {
            self.stats.replays += 1;
        }

        let mut ctx = RenderContext::new(self.view_rect(), self.tint);
        for tile in &self.cache {
            let sprite = match tile.sprite {
                CachedSprite::Image(id) => id,
                CachedSprite::Animated(code) => match self.registry.get(&code) {
                    Some(entry) => entry.image(),
                    None => continue,
                },
            };
            let call = DrawCall {
                sprite,
                x: tile.pos.x,
                y: tile.pos.y,
                width: tile.size.x,
                height: tile.size.y,
                tint: ctx.tint,
            };

            let res = renderer.draw(&mut ctx, call);
            if let Err(e) = &res {
                if ctx.failed() == 0 {
                    error!("Failed to draw {sprite:?} at {}: {e:#}", tile.pos);
                }
            }
            ctx.record(res.is_ok());
        }

        if ctx.failed() > 1 {
            warn!("{} more tiles failed to draw this frame", ctx.failed() - 1);
        }
        self.stats.draw_calls += ctx.drawn() as u64;
        self.stats.failed_calls += ctx.failed() as u64;
        ctx.drawn()
    }

    fn view_rect(&self) -> Aabb {
        Aabb::from_pos_size(self.view.location, self.view_size)
    }

    fn rebuild(&mut self) {
        self.cache.clear();
        let view_rect = self.view_rect();
        let size = self.tile_size() * self.view.scale;

        for cell in self.visible_window().iter() {
            let code = self.field.tile_type(cell.x, cell.y);
            let Some(entry) = self.registry.get(&code) else {
                continue;
            };
            let pos = self.sprite_pos(cell.x, cell.y);
            if !Aabb::from_pos_size(pos, size).intersects(view_rect) {
                continue;
            }

            let sprite = match &entry.sprite {
                TileSprite::Image(id) => CachedSprite::Image(*id),
                TileSprite::Animation(_) => CachedSprite::Animated(code),
            };
            self.cache.push(CachedTile { sprite, pos, size });
        }

        trace!("Tile batch rebuilt: {} tiles", self.cache.len());
        self.dirty = false;
        self.last_offset = Some(self.view.offset);
        self.stats.rebuilds += 1;
    }
}
