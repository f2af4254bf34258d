//! Animated sprites.
//!
//! A `SpriteSheet` maps sprite names to precomputed frame sequences inside one
//! atlas; a `Sprite` is a renderable that plays one of those sequences.

mod sheet;
mod sprite;

pub use sheet::{SpriteFrames, SpriteSheet, SpriteSheetManifest};
pub use sprite::Sprite;
