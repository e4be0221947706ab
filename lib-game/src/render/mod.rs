#[cfg(feature = "macroquad")]
mod mq;

use lib_col::Aabb;

#[cfg(feature = "macroquad")]
pub use mq::*;

/// Identifies an image known to the renderer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct ImageId(pub u32);

/// Color multiplier applied to a drawn image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    pub const WHITE: Tint = Tint::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Tint {
        Tint { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Tint {
        Tint { a, ..self }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Tint::WHITE
    }
}

/// One image to put on screen. Coordinates are view pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub sprite: ImageId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tint: Tint,
}

/// Scratch state of a single draw pass. A fresh one is made for every
/// pass, so nothing leaks between frames.
#[derive(Clone, Debug)]
pub struct RenderContext {
    pub view: Aabb,
    pub tint: Tint,
    drawn: usize,
    failed: usize,
}

impl RenderContext {
    pub fn new(view: Aabb, tint: Tint) -> RenderContext {
        RenderContext {
            view,
            tint,
            drawn: 0,
            failed: 0,
        }
    }

    pub fn drawn(&self) -> usize {
        self.drawn
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub(crate) fn record(&mut self, ok: bool) {
        if ok {
            self.drawn += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// The drawing backend of a tile map.
pub trait TileRenderer {
    fn draw(&mut self, ctx: &mut RenderContext, call: DrawCall) -> anyhow::Result<()>;
}

impl<R: TileRenderer + ?Sized> TileRenderer for &mut R {
    fn draw(&mut self, ctx: &mut RenderContext, call: DrawCall) -> anyhow::Result<()> {
        (**self).draw(ctx, call)
    }
}

/// Keeps every call instead of drawing it. Used by tools and tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl TileRenderer for RecordingRenderer {
    fn draw(&mut self, _ctx: &mut RenderContext, call: DrawCall) -> anyhow::Result<()> {
        self.calls.push(call);
        Ok(())
    }
}
