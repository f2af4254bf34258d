//! Renderer: the application object project scripts draw through.
//!
//! An `Application` owns a flat stage of display objects, a ticker of
//! per-frame callbacks and the renderer defaults. Rendering composes the stage
//! into a pixel buffer and converts it to terminal cells; presenting those
//! cells is the surface's job.

mod compose;
pub mod defaults;

use std::cell::RefCell;
use std::rc::Rc;

use rhai::FnPtr;
use serde::{Deserialize, Serialize};

pub use compose::PixelBuffer;
use defaults::{DefaultOverrides, RendererDefaults};

use crate::error::Result;
use crate::sprites::Sprite;
use crate::tiles::TilesetDisplay;
use crate::types::{Cell, CellChange, Color, TerminalContract};

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeTo {
    /// Fill the host surface.
    Window,
    /// Use the configured width and height.
    None,
}

/// Application options; the project's `rendering.application` block.
///
/// Every field is optional so project options can be merged over the host's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_to: Option<ResizeTo>,
    /// View width in cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    /// View height in cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u16>,
}

impl ApplicationOptions {
    /// `self` with any unset field taken from `base`.
    pub fn merged_over(self, base: &ApplicationOptions) -> ApplicationOptions {
        ApplicationOptions {
            background: self.background.or_else(|| base.background.clone()),
            resize_to: self.resize_to.or(base.resize_to),
            width: self.width.or(base.width),
            height: self.height.or(base.height),
        }
    }
}

const FALLBACK_VIEW: TerminalContract = TerminalContract {
    width: 80,
    height: 24,
};

// ---------------------------------------------------------------------------
// Host display surface
// ---------------------------------------------------------------------------

/// Where an application's view gets mounted.
pub trait Surface {
    /// Available area in cells.
    fn size(&self) -> Result<(u16, u16)>;

    fn mount(&mut self, view: TerminalContract) -> Result<()>;
}

/// A surface with a fixed size that displays nothing.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub width: u16,
    pub height: u16,
    pub mounts: usize,
}

impl HeadlessSurface {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            mounts: 0,
        }
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.width, self.height))
    }

    fn mount(&mut self, _view: TerminalContract) -> Result<()> {
        self.mounts += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stage and ticker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum DisplayObject {
    Tilemap(Shared<TilesetDisplay>),
    Sprite(Shared<Sprite>),
}

/// Root of the scene; children draw in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Stage(Shared<Vec<DisplayObject>>);

impl Stage {
    pub fn add_child(&self, child: DisplayObject) {
        if let DisplayObject::Sprite(sprite) = &child {
            if let Err(e) = sprite.borrow_mut().refresh_framing() {
                log::warn!("sprite framing failed: {e}");
            }
        }
        self.0.borrow_mut().push(child);
    }

    pub fn children(&self) -> Vec<DisplayObject> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Callbacks run once per frame with the elapsed frame delta.
#[derive(Debug, Clone, Default)]
pub struct Ticker(Shared<Vec<FnPtr>>);

impl Ticker {
    pub fn add(&self, callback: FnPtr) {
        self.0.borrow_mut().push(callback);
    }

    /// A snapshot, so callbacks may register further callbacks while running.
    pub fn callbacks(&self) -> Vec<FnPtr> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Application {
    options: ApplicationOptions,
    view: TerminalContract,
    pub defaults: RendererDefaults,
    stage: Stage,
    ticker: Ticker,
}

impl Application {
    /// Create an application sized for `surface`.
    pub fn new(options: ApplicationOptions, surface: &dyn Surface) -> Result<Self> {
        let view = match options.resize_to {
            Some(ResizeTo::Window) => {
                let (width, height) = surface.size()?;
                TerminalContract { width, height }
            }
            _ => TerminalContract {
                width: options.width.unwrap_or(FALLBACK_VIEW.width),
                height: options.height.unwrap_or(FALLBACK_VIEW.height),
            },
        };
        log::debug!("renderer view {}x{} cells", view.width, view.height);

        Ok(Self {
            options,
            view,
            defaults: RendererDefaults::default(),
            stage: Stage::default(),
            ticker: Ticker::default(),
        })
    }

    pub fn view(&self) -> TerminalContract {
        self.view
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn apply_defaults(&mut self, overrides: &DefaultOverrides) -> Result<()> {
        self.defaults.apply(overrides)
    }

    /// Compose the stage into view pixels.
    pub fn compose(&self) -> PixelBuffer {
        let resolution = u32::from(self.defaults.bitmap_font.resolution);
        let background = self
            .options
            .background
            .as_ref()
            .map(Color::to_rgb)
            .unwrap_or([0, 0, 0]);
        let mut buffer = PixelBuffer::new(
            u32::from(self.view.width),
            u32::from(self.view.height) * resolution,
            background,
        );

        let mode = self.defaults.base_texture.scale_mode;
        for child in self.stage.children() {
            match child {
                DisplayObject::Tilemap(display) => {
                    let display = display.borrow();
                    if !display.texture().is_loaded() {
                        continue;
                    }
                    let t = display.transform;
                    for (position, region) in display.regions() {
                        let x = t.x + f64::from(position.x) * t.scale_x;
                        let y = t.y + f64::from(position.y) * t.scale_y;
                        buffer.draw(display.texture(), &region, x, y, t.scale_x, t.scale_y, mode);
                    }
                }
                DisplayObject::Sprite(sprite) => {
                    let sprite = sprite.borrow();
                    if let Some(region) = sprite.frame() {
                        let t = sprite.transform;
                        buffer.draw(sprite.texture(), &region, t.x, t.y, t.scale_x, t.scale_y, mode);
                    }
                }
            }
        }
        buffer
    }

    /// The current frame as terminal cells.
    pub fn render(&self) -> Vec<Vec<Cell>> {
        self.compose().to_cells(self.defaults.bitmap_font.resolution)
    }
}

/// Cells that differ between two grids of the same size.
pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: next_cell.clone(),
                });
            }
        }
    }
    changes
}
