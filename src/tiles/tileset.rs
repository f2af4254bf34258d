use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::TileCoord;
use crate::error::{Result, RuntimeError};
use crate::loaders::{Loader, ManifestSource};
use crate::path;
use crate::texture::Texture;
use crate::types::{AtlasRegion, Size};

/// The on-disk tileset description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetManifest {
    pub texture: String,
    pub tile_size: Size,
    pub grid_size: Size,
    /// Keyed by `"col,row"`, in manifest order.
    #[serde(default)]
    pub animated_tiles: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameAxis {
    X,
    Y,
}

/// How an animated tile is described in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatedTileSettings {
    /// Frames per tick of the display's time cursor, not per second.
    pub fps: f64,
    /// First frame, in tiles.
    pub frames_position: [u32; 2],
    pub axis: FrameAxis,
    pub num_frames: u32,
    /// Pixels between consecutive frames.
    #[serde(default)]
    pub gap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticTile {
    pub tile_width: u32,
    pub tile_height: u32,
    pub u: u32,
    pub v: u32,
}

/// Precomputed animation of one tile. Exactly one axis animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedTile {
    /// Ticks per frame (`1 / fps`).
    pub anim_divisor: f64,
    pub tile_width: u32,
    pub tile_height: u32,
    pub u: u32,
    pub v: u32,
    pub axis: FrameAxis,
    pub anim_count: u32,
    /// Pixels between the starts of consecutive frames.
    pub anim_stride: u32,
}

impl AnimatedTile {
    /// Index of the frame showing at `time`, in ticker ticks.
    pub fn frame_at(&self, time: f64) -> u32 {
        let step = (time / self.anim_divisor).floor().max(0.0) as u64;
        (step % u64::from(self.anim_count)) as u32
    }

    pub fn region_at(&self, time: f64) -> AtlasRegion {
        let offset = self.frame_at(time).saturating_mul(self.anim_stride);
        let (u, v) = match self.axis {
            FrameAxis::X => (self.u.saturating_add(offset), self.v),
            FrameAxis::Y => (self.u, self.v.saturating_add(offset)),
        };
        AtlasRegion::new(u, v, self.tile_width, self.tile_height)
    }
}

/// What the tilemap needs to draw one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileDrawParams {
    Static(StaticTile),
    Animated(AnimatedTile),
}

impl TileDrawParams {
    pub fn region_at(&self, time: f64) -> AtlasRegion {
        match self {
            TileDrawParams::Static(t) => AtlasRegion::new(t.u, t.v, t.tile_width, t.tile_height),
            TileDrawParams::Animated(t) => t.region_at(time),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, TileDrawParams::Animated(_))
    }
}

#[derive(Debug, Clone)]
pub struct Tileset {
    texture: Texture,
    tile_size: Size,
    grid_size: Size,
    animated_tiles: HashMap<TileCoord, AnimatedTile>,
}

impl Tileset {
    pub fn new(texture: Texture, tile_size: Size, grid_size: Size) -> Self {
        Self {
            texture,
            tile_size,
            grid_size,
            animated_tiles: HashMap::new(),
        }
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    pub fn grid_size(&self) -> Size {
        self.grid_size
    }

    pub fn animated_tile_count(&self) -> usize {
        self.animated_tiles.len()
    }

    /// Draw parameters for the tile at (`col`, `row`).
    ///
    /// Unregistered coordinates resolve to the static tile at that grid cell.
    pub fn get_tile(&self, col: u32, row: u32) -> TileDrawParams {
        if let Some(animated) = self.animated_tiles.get(&TileCoord::new(col, row)) {
            return TileDrawParams::Animated(*animated);
        }

        TileDrawParams::Static(StaticTile {
            tile_width: self.tile_size.x,
            tile_height: self.tile_size.y,
            u: col.saturating_mul(self.tile_size.x),
            v: row.saturating_mul(self.tile_size.y),
        })
    }

    /// The animated override at `coord`, if one is registered.
    pub fn animated_tile(&self, coord: TileCoord) -> Result<&AnimatedTile> {
        self.animated_tiles
            .get(&coord)
            .ok_or(RuntimeError::UnknownTileOverride(coord))
    }

    /// Register (or replace) the animation of the tile at `coord`.
    pub fn add_animated_tile(&mut self, coord: TileCoord, settings: &AnimatedTileSettings) -> Result<()> {
        if !settings.fps.is_finite() || settings.fps <= 0.0 {
            return Err(RuntimeError::config(format!(
                "animated tile {coord}: fps must be positive, got {}",
                settings.fps
            )));
        }
        if settings.num_frames == 0 {
            return Err(RuntimeError::config(format!(
                "animated tile {coord}: numFrames must be at least 1"
            )));
        }

        let Size { x: tw, y: th } = self.tile_size;
        let out_of_range =
            || RuntimeError::config(format!("animated tile {coord}: frames lie outside the addressable atlas"));
        let anim_stride = match settings.axis {
            FrameAxis::X => tw.checked_add(settings.gap),
            FrameAxis::Y => th.checked_add(settings.gap),
        }
        .ok_or_else(out_of_range)?;
        let u = settings.frames_position[0].checked_mul(tw).ok_or_else(out_of_range)?;
        let v = settings.frames_position[1].checked_mul(th).ok_or_else(out_of_range)?;
        // the last frame must start inside u32 range too
        let last = anim_stride
            .checked_mul(settings.num_frames - 1)
            .and_then(|span| match settings.axis {
                FrameAxis::X => u.checked_add(span),
                FrameAxis::Y => v.checked_add(span),
            });
        if last.is_none() {
            return Err(out_of_range());
        }

        let tile = AnimatedTile {
            anim_divisor: 1.0 / settings.fps,
            tile_width: tw,
            tile_height: th,
            u,
            v,
            axis: settings.axis,
            anim_count: settings.num_frames,
            anim_stride,
        };

        if self.animated_tiles.insert(coord, tile).is_some() {
            log::debug!("animated tile {coord} replaced");
        }
        Ok(())
    }

    /// Build a tileset from a manifest, registering every animated tile in
    /// manifest order.
    pub fn load(source: ManifestSource<TilesetManifest>, loader: &dyn Loader) -> Result<Tileset> {
        let (manifest, base) = source.resolve(loader)?;

        let texture_url = if path::is_relative(&manifest.texture) {
            path::join(&base, &manifest.texture)
        } else {
            manifest.texture.clone()
        };
        let texture = Texture::from_url(texture_url);
        if let Err(e) = texture.resolve(loader) {
            log::warn!("tileset texture stays pending: {e}");
        }

        let mut tileset = Tileset::new(texture, manifest.tile_size, manifest.grid_size);
        for (key, value) in manifest.animated_tiles {
            let coord: TileCoord = key.parse()?;
            let settings: AnimatedTileSettings = serde_json::from_value(value)
                .map_err(|e| RuntimeError::config(format!("animated tile {key}: {e}")))?;
            tileset.add_animated_tile(coord, &settings)?;
        }

        log::debug!(
            "loaded tileset {}x{} with {} animated tiles",
            tileset.grid_size.x,
            tileset.grid_size.y,
            tileset.animated_tiles.len()
        );
        Ok(tileset)
    }
}
