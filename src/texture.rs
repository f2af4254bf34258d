//! Shared atlas textures.
//!
//! A `Texture` is a cheap handle: tilesets, spritesheets and every display
//! built from them share one decoded image. A texture starts out pending and
//! becomes loaded once its image has been decoded; displays must not apply
//! frame geometry to a pending texture.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use image::RgbaImage;

use crate::error::{Result, RuntimeError};
use crate::loaders::Loader;
use crate::renderer::defaults::ScaleMode;
use crate::types::AtlasRegion;

#[derive(Clone)]
pub struct Texture(Rc<TextureInner>);

struct TextureInner {
    url: String,
    image: RefCell<Option<RgbaImage>>,
}

impl Texture {
    /// A pending texture that will be decoded from `url`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Texture(Rc::new(TextureInner {
            url: url.into(),
            image: RefCell::new(None),
        }))
    }

    /// An already decoded texture.
    pub fn from_image(url: impl Into<String>, image: RgbaImage) -> Self {
        Texture(Rc::new(TextureInner {
            url: url.into(),
            image: RefCell::new(Some(image)),
        }))
    }

    pub fn url(&self) -> &str {
        &self.0.url
    }

    pub fn is_loaded(&self) -> bool {
        self.0.image.borrow().is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.0.image.borrow().as_ref().map(|img| img.dimensions())
    }

    /// Fetch and decode the image. Does nothing once loaded.
    pub fn resolve(&self, loader: &dyn Loader) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }

        let bytes = loader.load_bytes(&self.0.url)?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| RuntimeError::Texture {
                url: self.0.url.clone(),
                source,
            })?
            .to_rgba8();
        log::debug!("decoded texture {} ({}x{})", self.0.url, image.width(), image.height());
        *self.0.image.borrow_mut() = Some(image);
        Ok(())
    }

    /// Sample the texture at (`x`, `y`) pixels inside `region`.
    ///
    /// Samples never bleed outside the region. Returns `None` while the
    /// texture is pending.
    pub fn sample(&self, region: &AtlasRegion, x: f64, y: f64, mode: ScaleMode) -> Option<[u8; 4]> {
        let guard = self.0.image.borrow();
        let image = guard.as_ref()?;
        if region.width == 0 || region.height == 0 {
            return None;
        }

        let max_x = region.x.saturating_add(region.width - 1).min(image.width().saturating_sub(1));
        let max_y = region.y.saturating_add(region.height - 1).min(image.height().saturating_sub(1));
        let texel = |tx: f64, ty: f64| -> [u8; 4] {
            let px = (region.x as f64 + tx).max(region.x as f64) as u32;
            let py = (region.y as f64 + ty).max(region.y as f64) as u32;
            image.get_pixel(px.min(max_x), py.min(max_y)).0
        };

        match mode {
            ScaleMode::Nearest => Some(texel(x.floor(), y.floor())),
            ScaleMode::Linear => {
                let sx = (x - 0.5).max(0.0);
                let sy = (y - 0.5).max(0.0);
                let (x0, y0) = (sx.floor(), sy.floor());
                let (fx, fy) = (sx - x0, sy - y0);
                let a = texel(x0, y0);
                let b = texel(x0 + 1.0, y0);
                let c = texel(x0, y0 + 1.0);
                let d = texel(x0 + 1.0, y0 + 1.0);
                let mut out = [0u8; 4];
                for i in 0..4 {
                    let top = a[i] as f64 * (1.0 - fx) + b[i] as f64 * fx;
                    let bottom = c[i] as f64 * (1.0 - fx) + d[i] as f64 * fx;
                    out[i] = (top * (1.0 - fy) + bottom * fy).round() as u8;
                }
                Some(out)
            }
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("url", &self.0.url)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
