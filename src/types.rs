//! Shared value types for the runtime.
//!
//! Two groups live here:
//! - atlas geometry (`AtlasRegion`, `Point`, `Size`) shared by tiles, sprites
//!   and the renderer
//! - terminal presentation primitives (`Color`, `Style`, `Cell`) shared by the
//!   renderer and the player

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Atlas geometry
// ---------------------------------------------------------------------------

/// A rectangle inside a source texture, in texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// An integer pair read from a `[x, y]` manifest array.
///
/// Used both for tile sizes (pixels) and grid sizes (cells).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Size {
    pub x: u32,
    pub y: u32,
}

impl Size {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<[u32; 2]> for Size {
    fn from([x, y]: [u32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Size> for [u32; 2] {
    fn from(size: Size) -> Self {
        [size.x, size.y]
    }
}

/// Position and scale of a display object on the stage, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Animation time owned by one display, in (fractional) ticks.
///
/// Only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct TimeCursor(f64);

impl TimeCursor {
    pub fn get(self) -> f64 {
        self.0
    }

    pub fn advance(&mut self, frames: f64) {
        if frames.is_finite() && frames >= 0.0 {
            self.0 += frames;
        } else {
            log::debug!("ignoring time step of {frames}");
        }
    }

    pub fn reset(&mut self) {
        self.0 = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Terminal style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// The colour as an RGB triple, for compositing into a pixel buffer.
    pub fn to_rgb(&self) -> [u8; 3] {
        match self {
            Color::Rgb { r, g, b } => [*r, *g, *b],
            Color::Named(n) => match n {
                NamedColor::Black => [0, 0, 0],
                NamedColor::Red => [205, 49, 49],
                NamedColor::Green => [13, 188, 121],
                NamedColor::Yellow => [229, 229, 16],
                NamedColor::Blue => [36, 114, 200],
                NamedColor::Magenta => [188, 63, 188],
                NamedColor::Cyan => [17, 168, 205],
                NamedColor::White => [229, 229, 229],
            },
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && !self.bold && !self.dim
    }
}

/// Size of the terminal view the renderer composes into, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Style::is_default")]
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}
