use anyhow::Context;
use hashbrown::HashMap;
use macroquad::prelude::*;

use super::{DrawCall, ImageId, RenderContext, TileRenderer};

struct TextureVal {
    texture: Texture2D,
    texture_rect: Rect,
}

/// Draws tiles with macroquad. Textures have to be registered
/// up front, drawing an unknown [ImageId] is an error.
#[derive(Default)]
pub struct MacroquadRenderer {
    textures: HashMap<ImageId, TextureVal>,
}

impl MacroquadRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture. `texture_rect` picks a region of an atlas,
    /// the whole texture is used by default.
    pub fn add_texture(&mut self, key: ImageId, texture: &Texture2D, texture_rect: Option<Rect>) {
        let texture_rect = texture_rect.unwrap_or(Rect {
            x: 0.0,
            y: 0.0,
            w: texture.width(),
            h: texture.height(),
        });

        self.textures.insert(
            key,
            TextureVal {
                texture_rect,
                texture: texture.clone(),
            },
        );
    }

    pub fn remove_texture(&mut self, key: ImageId) -> bool {
        self.textures.remove(&key).is_some()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl TileRenderer for MacroquadRenderer {
    fn draw(&mut self, _ctx: &mut RenderContext, call: DrawCall) -> anyhow::Result<()> {
        let val = self
            .textures
            .get(&call.sprite)
            .with_context(|| format!("no texture registered for {:?}", call.sprite))?;
        let tint = call.tint;

        draw_texture_ex(
            &val.texture,
            call.x,
            call.y,
            Color::new(tint.r, tint.g, tint.b, tint.a),
            DrawTextureParams {
                dest_size: Some(vec2(call.width, call.height)),
                source: Some(val.texture_rect),
                ..Default::default()
            },
        );

        Ok(())
    }
}
