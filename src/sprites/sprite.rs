use std::rc::Rc;

use super::SpriteSheet;
use crate::error::{Result, RuntimeError};
use crate::texture::Texture;
use crate::types::{AtlasRegion, TimeCursor, Transform};

/// A renderable playing one sprite of a spritesheet.
#[derive(Debug, Clone)]
pub struct Sprite {
    sheet: Rc<SpriteSheet>,
    current_sprite: String,
    current_frame: TimeCursor,
    /// Region applied to the texture; `None` until the texture is ready.
    frame: Option<AtlasRegion>,
    pub transform: Transform,
}

impl Sprite {
    /// Start on the sheet's first registered sprite.
    pub fn new(sheet: Rc<SpriteSheet>) -> Result<Self> {
        let current_sprite = sheet
            .first_sprite()
            .ok_or_else(|| RuntimeError::config("spritesheet has no sprites"))?
            .to_string();

        let mut sprite = Sprite {
            sheet,
            current_sprite,
            current_frame: TimeCursor::default(),
            frame: None,
            transform: Transform::default(),
        };
        sprite.refresh_framing()?;
        Ok(sprite)
    }

    pub fn texture(&self) -> &Texture {
        self.sheet.texture()
    }

    pub fn current_sprite(&self) -> &str {
        &self.current_sprite
    }

    pub fn time(&self) -> f64 {
        self.current_frame.get()
    }

    /// The region currently shown, if the texture is ready.
    pub fn frame(&self) -> Option<AtlasRegion> {
        self.frame
    }

    /// Switch to `name` and restart its animation.
    pub fn set_sprite(&mut self, name: &str) -> Result<()> {
        if !self.sheet.contains(name) {
            return Err(RuntimeError::UnknownSprite(name.to_string()));
        }
        self.current_sprite = name.to_string();
        self.current_frame.reset();
        self.refresh_framing()
    }

    /// Advance the animation by `frames` ticks.
    pub fn step(&mut self, frames: f64) -> Result<()> {
        self.current_frame.advance(frames);
        self.refresh_framing()
    }

    /// Re-derive the shown region from the time cursor.
    ///
    /// Skipped while the texture is pending; call again once it has loaded.
    pub fn refresh_framing(&mut self) -> Result<()> {
        if !self.texture().is_loaded() {
            return Ok(());
        }
        self.frame = Some(
            self.sheet
                .get_frame_from_time(&self.current_sprite, self.current_frame.get())?,
        );
        Ok(())
    }
}
