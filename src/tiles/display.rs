use super::{TileDrawParams, Tileset};
use crate::texture::Texture;
use crate::types::{AtlasRegion, Point, TimeCursor, Transform};

/// One tile placed on the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    /// Destination of the tile's top-left corner, in display pixels.
    pub position: Point,
    pub params: TileDrawParams,
}

/// Renders every tile of a tileset at its own grid cell.
#[derive(Debug, Clone)]
pub struct TilesetDisplay {
    texture: Texture,
    tiles: Vec<PlacedTile>,
    tile_anim: TimeCursor,
    pub transform: Transform,
}

impl TilesetDisplay {
    /// An empty display drawing from `texture`.
    pub fn empty(texture: Texture) -> Self {
        Self {
            texture,
            tiles: Vec::new(),
            tile_anim: TimeCursor::default(),
            transform: Transform::default(),
        }
    }

    /// Lay out the whole grid, row by row.
    pub fn new(tileset: &Tileset) -> Self {
        let mut display = Self::empty(tileset.texture().clone());
        let grid = tileset.grid_size();
        for row in 0..grid.y {
            for col in 0..grid.x {
                display.add_tile(tileset, col, row, col, row);
            }
        }
        display
    }

    /// Place tile (`tile_col`, `tile_row`) of `tileset` at grid cell
    /// (`grid_col`, `grid_row`).
    pub fn add_tile(&mut self, tileset: &Tileset, tile_col: u32, tile_row: u32, grid_col: u32, grid_row: u32) {
        let size = tileset.tile_size();
        self.tiles.push(PlacedTile {
            position: Point {
                x: size.x.saturating_mul(grid_col),
                y: size.y.saturating_mul(grid_row),
            },
            params: tileset.get_tile(tile_col, tile_row),
        });
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn time(&self) -> f64 {
        self.tile_anim.get()
    }

    /// Advance the tile animation by `frames` ticks.
    pub fn step(&mut self, frames: f64) {
        self.tile_anim.advance(frames);
    }

    /// Every placed tile with the atlas region it shows right now.
    pub fn regions(&self) -> impl Iterator<Item = (Point, AtlasRegion)> + '_ {
        let time = self.tile_anim.get();
        self.tiles
            .iter()
            .map(move |tile| (tile.position, tile.params.region_at(time)))
    }
}
