//! Renderer-wide defaults.
//!
//! Three fixed categories, named after the project manifest's
//! `rendering.defaults` keys. A manifest only lists the properties it wants to
//! change; unknown properties are rejected when the manifest is decoded.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};
use crate::types::{Color, NamedColor, Style};

/// How texture pixels are sampled when scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScaleModeRepr", rename_all = "lowercase")]
pub enum ScaleMode {
    /// Blocky, pixel-art friendly.
    Nearest,
    #[default]
    Linear,
}

/// Accepts both names and the numeric codes (`0` nearest, `1` linear).
#[derive(Deserialize)]
#[serde(untagged)]
enum ScaleModeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<ScaleModeRepr> for ScaleMode {
    type Error = String;

    fn try_from(repr: ScaleModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ScaleModeRepr::Code(0) => Ok(ScaleMode::Nearest),
            ScaleModeRepr::Code(1) => Ok(ScaleMode::Linear),
            ScaleModeRepr::Name(name) => name.parse(),
            ScaleModeRepr::Code(code) => Err(format!("unknown scale mode {code}")),
        }
    }
}

impl std::str::FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(ScaleMode::Nearest),
            "linear" => Ok(ScaleMode::Linear),
            other => Err(format!("unknown scale mode '{other}'")),
        }
    }
}

impl ScaleMode {
    pub fn name(self) -> &'static str {
        match self {
            ScaleMode::Nearest => "nearest",
            ScaleMode::Linear => "linear",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseTextureDefaults {
    pub scale_mode: ScaleMode,
}

/// Glyph settings for drawing pixels as terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapFontDefaults {
    /// Texture pixels stacked in one cell: 1 (full cells) or 2 (half blocks).
    pub resolution: u8,
}

/// Style of text the renderer writes itself (status line).
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlTextStyleDefaults {
    pub fill: Color,
    pub font_weight: FontWeight,
    pub dim: bool,
}

impl HtmlTextStyleDefaults {
    pub fn to_style(&self) -> Style {
        Style {
            fg: Some(self.fill.clone()),
            bg: None,
            bold: self.font_weight == FontWeight::Bold,
            dim: self.dim,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererDefaults {
    pub base_texture: BaseTextureDefaults,
    pub bitmap_font: BitmapFontDefaults,
    pub html_text_style: HtmlTextStyleDefaults,
}

impl Default for RendererDefaults {
    fn default() -> Self {
        Self {
            base_texture: BaseTextureDefaults {
                scale_mode: ScaleMode::Linear,
            },
            bitmap_font: BitmapFontDefaults { resolution: 2 },
            html_text_style: HtmlTextStyleDefaults {
                fill: Color::Named(NamedColor::White),
                font_weight: FontWeight::Normal,
                dim: true,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest overrides
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BaseTextureOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<ScaleMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BitmapFontOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HtmlTextStyleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<bool>,
}

/// The `rendering.defaults` block of a project manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DefaultOverrides {
    #[serde(default)]
    pub base_texture: BaseTextureOverrides,
    #[serde(default)]
    pub bitmap_font: BitmapFontOverrides,
    #[serde(default)]
    pub html_text_style: HtmlTextStyleOverrides,
}

impl RendererDefaults {
    /// Assign every property `overrides` sets, category by category.
    pub fn apply(&mut self, overrides: &DefaultOverrides) -> Result<()> {
        if let Some(resolution) = overrides.bitmap_font.resolution {
            if !(1..=2).contains(&resolution) {
                return Err(RuntimeError::config(format!(
                    "bitmapFont.resolution must be 1 or 2, got {resolution}"
                )));
            }
            self.bitmap_font.resolution = resolution;
        }

        if let Some(scale_mode) = overrides.base_texture.scale_mode {
            self.base_texture.scale_mode = scale_mode;
        }

        let text = &overrides.html_text_style;
        if let Some(fill) = &text.fill {
            self.html_text_style.fill = fill.clone();
        }
        if let Some(weight) = text.font_weight {
            self.html_text_style.font_weight = weight;
        }
        if let Some(dim) = text.dim {
            self.html_text_style.dim = dim;
        }
        Ok(())
    }
}
