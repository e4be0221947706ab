use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{ImageId, TileMapError};

/// Animation cursors advance in milliseconds.
pub const ANIMATION_TIME_UNIT: f32 = 1.0 / 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimFrame {
    pub image: ImageId,
    /// Duration in milliseconds
    pub duration: u32,
}

/// A frame sequence shared by every cell of one tile code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileAnimation {
    frames: Vec<AnimFrame>,
    pub is_looping: bool,
    #[serde(skip)]
    pub pause: bool,
    #[serde(skip)]
    cursor: u32,
    #[serde(skip)]
    total_dt: f32,
}

impl TileAnimation {
    pub fn new(frames: Vec<AnimFrame>, is_looping: bool) -> Result<Self, TileMapError> {
        if frames.is_empty() {
            return Err(TileMapError::EmptyAnimation);
        }
        if let Some(index) = frames.iter().position(|frame| frame.duration == 0) {
            return Err(TileMapError::ZeroFrame { index });
        }

        Ok(TileAnimation {
            frames,
            is_looping,
            pause: false,
            cursor: 0,
            total_dt: 0.0,
        })
    }

    /// Every image shown for the same `duration` milliseconds.
    pub fn uniform(
        images: impl IntoIterator<Item = ImageId>,
        duration: u32,
        is_looping: bool,
    ) -> Result<Self, TileMapError> {
        let frames = images
            .into_iter()
            .map(|image| AnimFrame { image, duration })
            .collect();
        TileAnimation::new(frames, is_looping)
    }

    pub fn frames(&self) -> &[AnimFrame] {
        &self.frames
    }

    /// Total length in milliseconds.
    pub fn max_pos(&self) -> u32 {
        self.frames.iter().map(|frame| frame.duration).sum()
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.total_dt = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        let max_pos = self.max_pos();
        if max_pos == 0 || self.pause || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.total_dt += dt;
        if self.total_dt < ANIMATION_TIME_UNIT {
            return;
        }

        let cursor_delta = self.total_dt.div_euclid(ANIMATION_TIME_UNIT);
        self.total_dt -= cursor_delta * ANIMATION_TIME_UNIT;
        let cursor = self.cursor as u64 + cursor_delta as u64;
        self.cursor = if self.is_looping {
            (cursor % max_pos as u64) as u32
        } else {
            cursor.min(max_pos as u64) as u32
        };
    }

    /// The image under the cursor. A finished one-shot animation keeps
    /// showing its last frame.
    pub fn current_frame(&self) -> ImageId {
        let mut end = 0;
        for frame in &self.frames {
            end += frame.duration;
            if self.cursor < end {
                return frame.image;
            }
        }
        self.frames
            .last()
            .map(|frame| frame.image)
            .unwrap_or(ImageId(0))
    }

    pub fn is_finished(&self) -> bool {
        !self.is_looping && self.cursor >= self.max_pos()
    }
}

/// Game specific data attached to a tile code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub props: HashMap<String, String>,
}

impl Attribute {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.props.insert(key.into(), val.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|it| it == tag)
    }

    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TileSprite {
    Image(ImageId),
    Animation(TileAnimation),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub sprite: TileSprite,
    #[serde(default)]
    pub attribute: Option<Attribute>,
}

impl TileEntry {
    /// The image to draw right now.
    pub fn image(&self) -> ImageId {
        match &self.sprite {
            TileSprite::Image(id) => *id,
            TileSprite::Animation(anim) => anim.current_frame(),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.sprite, TileSprite::Animation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimFrame, Attribute, TileAnimation};
    use crate::{ImageId, TileMapError};

    fn frames() -> Vec<AnimFrame> {
        vec![
            AnimFrame {
                image: ImageId(1),
                duration: 100,
            },
            AnimFrame {
                image: ImageId(2),
                duration: 50,
            },
        ]
    }

    #[test]
    fn looping_wraps() {
        let mut anim = TileAnimation::new(frames(), true).unwrap();
        assert_eq!(anim.max_pos(), 150);
        assert_eq!(anim.current_frame(), ImageId(1));

        anim.update(0.1205);
        assert_eq!(anim.cursor(), 120);
        assert_eq!(anim.current_frame(), ImageId(2));

        anim.update(0.05);
        assert_eq!(anim.cursor(), 20);
        assert_eq!(anim.current_frame(), ImageId(1));
    }

    #[test]
    fn one_shot_holds_last_frame() {
        let mut anim = TileAnimation::new(frames(), false).unwrap();
        anim.update(10.0);
        assert_eq!(anim.cursor(), 150);
        assert!(anim.is_finished());
        assert_eq!(anim.current_frame(), ImageId(2));

        anim.reset();
        assert_eq!(anim.current_frame(), ImageId(1));
    }

    #[test]
    fn paused_and_tiny_steps() {
        let mut anim = TileAnimation::uniform([ImageId(4), ImageId(5)], 10, true).unwrap();
        anim.update(0.0004);
        assert_eq!(anim.cursor(), 0);
        anim.update(0.0004);
        anim.update(0.0004);
        assert_eq!(anim.cursor(), 1);

        anim.pause = true;
        anim.update(1.0);
        assert_eq!(anim.cursor(), 1);
    }

    #[test]
    fn bad_frames() {
        assert_eq!(
            TileAnimation::new(Vec::new(), true),
            Err(TileMapError::EmptyAnimation)
        );
        assert_eq!(
            TileAnimation::uniform([ImageId(1), ImageId(2)], 0, true),
            Err(TileMapError::ZeroFrame { index: 0 })
        );
    }

    #[test]
    fn attributes() {
        let attr = Attribute::default()
            .with_tag("water")
            .with_prop("cost", "3");
        assert!(attr.has_tag("water"));
        assert!(!attr.has_tag("lava"));
        assert_eq!(attr.prop("cost"), Some("3"));
        assert_eq!(attr.prop("speed"), None);
    }
}
