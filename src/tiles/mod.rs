//! Tile grids.
//!
//! A `Tileset` describes the atlas (tile size, grid size, animated
//! overrides); a `TilesetDisplay` is a renderable that places those tiles on
//! the stage and animates them.

mod display;
mod tileset;

use std::fmt;
use std::str::FromStr;

pub use display::{PlacedTile, TilesetDisplay};
pub use tileset::{
    AnimatedTile, AnimatedTileSettings, FrameAxis, StaticTile, TileDrawParams, Tileset,
    TilesetManifest,
};

use crate::error::RuntimeError;

/// A cell of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// Parses the `"col,row"` keys used by tileset manifests.
impl FromStr for TileCoord {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RuntimeError::config(format!("'{s}' is not a \"col,row\" tile coordinate"));
        let (col, row) = s.split_once(',').ok_or_else(invalid)?;
        let col = col.trim().parse().map_err(|_| invalid())?;
        let row = row.trim().parse().map_err(|_| invalid())?;
        Ok(TileCoord { col, row })
    }
}
