use super::defaults::ScaleMode;
use crate::texture::Texture;
use crate::types::{AtlasRegion, Cell, Color, Style};

/// Opaque RGB pixels the stage is composed into.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; (width * height) as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        (x < self.width && y < self.height).then(|| self.pixels[(y * self.width + x) as usize])
    }

    /// Draw `region` of `texture` with its top-left corner at (`x`, `y`),
    /// scaled, alpha-blended over what is already there.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        texture: &Texture,
        region: &AtlasRegion,
        x: f64,
        y: f64,
        scale_x: f64,
        scale_y: f64,
        mode: ScaleMode,
    ) {
        if scale_x <= 0.0 || scale_y <= 0.0 || !scale_x.is_finite() || !scale_y.is_finite() {
            return;
        }

        let dest_w = (f64::from(region.width) * scale_x).ceil() as i64;
        let dest_h = (f64::from(region.height) * scale_y).ceil() as i64;
        let origin_x = x.round() as i64;
        let origin_y = y.round() as i64;

        for dy in 0..dest_h {
            let py = origin_y + dy;
            if py < 0 || py >= i64::from(self.height) {
                continue;
            }
            for dx in 0..dest_w {
                let px = origin_x + dx;
                if px < 0 || px >= i64::from(self.width) {
                    continue;
                }
                let sx = (dx as f64 + 0.5) / scale_x;
                let sy = (dy as f64 + 0.5) / scale_y;
                let Some([r, g, b, a]) = texture.sample(region, sx, sy, mode) else {
                    return;
                };
                if a == 0 {
                    continue;
                }
                let index = (py as u32 * self.width + px as u32) as usize;
                let dst = &mut self.pixels[index];
                let alpha = f64::from(a) / 255.0;
                for (channel, src) in dst.iter_mut().zip([r, g, b]) {
                    *channel = (f64::from(src) * alpha + f64::from(*channel) * (1.0 - alpha)).round() as u8;
                }
            }
        }
    }

    /// Convert to terminal cells, `resolution` pixel rows per cell.
    ///
    /// Resolution 2 uses upper half blocks (top pixel as foreground, bottom
    /// pixel as background); anything else paints one pixel per cell.
    pub fn to_cells(&self, resolution: u8) -> Vec<Vec<Cell>> {
        let rgb = |[r, g, b]: [u8; 3]| Color::Rgb { r, g, b };
        let rows_per_cell = if resolution == 2 { 2 } else { 1 };

        (0..self.height / rows_per_cell)
            .map(|row| {
                (0..self.width)
                    .map(|x| {
                        let top = self.pixels[(row * rows_per_cell * self.width + x) as usize];
                        if rows_per_cell == 2 {
                            let bottom = self.pixels[((row * 2 + 1) * self.width + x) as usize];
                            Cell {
                                ch: '▀',
                                style: Style {
                                    fg: Some(rgb(top)),
                                    bg: Some(rgb(bottom)),
                                    ..Default::default()
                                },
                            }
                        } else {
                            Cell {
                                ch: ' ',
                                style: Style {
                                    bg: Some(rgb(top)),
                                    ..Default::default()
                                },
                            }
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
