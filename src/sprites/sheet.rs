use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::atlas::{self, FrameLayout};
use crate::error::{Result, RuntimeError};
use crate::loaders::{Loader, ManifestSource};
use crate::path;
use crate::texture::Texture;
use crate::types::AtlasRegion;

/// The on-disk spritesheet description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteSheetManifest {
    pub texture: String,
    /// Sprite name to `FrameLayout`, in manifest order.
    #[serde(default)]
    pub sprites: Map<String, Value>,
}

/// Frames of one sprite and how fast to play them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrames {
    pub frames: Vec<AtlasRegion>,
    /// Frames advanced per tick.
    pub speed: f64,
}

impl SpriteFrames {
    pub fn from_layout(layout: &FrameLayout) -> Result<Self> {
        Ok(SpriteFrames {
            frames: atlas::frames(layout)?,
            speed: layout.speed.unwrap_or(1.0),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SpriteSheet {
    texture: Texture,
    sprites: HashMap<String, SpriteFrames>,
    /// Names in first-registration order.
    order: Vec<String>,
}

impl SpriteSheet {
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            sprites: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Store `frames` under `name`, replacing any earlier entry.
    pub fn add_sprite(&mut self, name: &str, frames: SpriteFrames) -> Result<()> {
        if frames.frames.is_empty() {
            return Err(RuntimeError::config(format!("sprite '{name}' has no frames")));
        }
        if !frames.speed.is_finite() || frames.speed <= 0.0 {
            return Err(RuntimeError::config(format!(
                "sprite '{name}': speed must be positive, got {}",
                frames.speed
            )));
        }

        if self.sprites.insert(name.to_string(), frames).is_none() {
            self.order.push(name.to_string());
        }
        Ok(())
    }

    fn sprite(&self, name: &str) -> Result<&SpriteFrames> {
        self.sprites
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownSprite(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sprites.contains_key(name)
    }

    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The first sprite that was registered.
    pub fn first_sprite(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    pub fn speed(&self, name: &str) -> Result<f64> {
        Ok(self.sprite(name)?.speed)
    }

    pub fn frame_count(&self, name: &str) -> Result<usize> {
        Ok(self.sprite(name)?.frames.len())
    }

    /// Frame `floor(frame_index mod frame_count)` of `name`.
    ///
    /// Any real index is accepted; negative indices wrap from the end.
    pub fn get_frame(&self, name: &str, frame_index: f64) -> Result<AtlasRegion> {
        let frames = &self.sprite(name)?.frames;
        let count = frames.len();
        let index = (frame_index.rem_euclid(count as f64).floor() as usize).min(count - 1);
        Ok(frames[index])
    }

    /// The frame showing `tick` ticks into the animation, at the sprite's own
    /// speed.
    pub fn get_frame_from_time(&self, name: &str, tick: f64) -> Result<AtlasRegion> {
        let speed = self.speed(name)?;
        self.get_frame(name, tick * speed)
    }

    /// Build a spritesheet from a manifest, precomputing every sprite's
    /// frames.
    pub fn load(source: ManifestSource<SpriteSheetManifest>, loader: &dyn Loader) -> Result<SpriteSheet> {
        let (manifest, base) = source.resolve(loader)?;

        let texture_url = if path::is_relative(&manifest.texture) {
            path::join(&base, &manifest.texture)
        } else {
            manifest.texture.clone()
        };
        let texture = Texture::from_url(texture_url);
        if let Err(e) = texture.resolve(loader) {
            log::warn!("spritesheet texture stays pending: {e}");
        }

        let mut sheet = SpriteSheet::new(texture);
        for (name, value) in manifest.sprites {
            let layout: FrameLayout = serde_json::from_value(value)
                .map_err(|e| RuntimeError::config(format!("sprite '{name}': {e}")))?;
            sheet.add_sprite(&name, SpriteFrames::from_layout(&layout)?)?;
        }

        log::debug!("loaded spritesheet with {} sprites", sheet.order.len());
        Ok(sheet)
    }
}
