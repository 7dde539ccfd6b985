//! 8x8 bitmap glyphs and the RGBA texture built from a character grid

use std::path::Path;

use anyhow::{anyhow, Context};
use image::{ImageBuffer, Rgba};
use rayon::prelude::*;

use crate::cube::CharGrid;

pub const GLYPH_W: usize = 8;
pub const GLYPH_H: usize = 8;

/// One byte per row, most significant bit is the leftmost pixel
pub type Glyph = [u8; GLYPH_H];

static GLYPHS: [(u8, Glyph); 8] = [
    (b'@', [0x3C, 0x42, 0x9D, 0x9D, 0x9B, 0x40, 0x3C, 0x00]),
    (b'$', [0x08, 0x3E, 0x28, 0x3C, 0x0A, 0x3E, 0x08, 0x00]),
    (b'~', [0x00, 0x00, 0x18, 0x24, 0x12, 0x00, 0x00, 0x00]),
    (b'#', [0x00, 0x24, 0x7E, 0x24, 0x7E, 0x24, 0x00, 0x00]),
    (b';', [0x00, 0x00, 0x18, 0x18, 0x18, 0x10, 0x10, 0x08]),
    (b'+', [0x00, 0x08, 0x08, 0x3E, 0x08, 0x08, 0x00, 0x00]),
    (b'.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00]),
    (b' ', [0x00; GLYPH_H]),
];

static BLANK: Glyph = [0x00; GLYPH_H];

const ON: [u8; 4] = [255, 255, 255, 255];
const OFF: [u8; 4] = [0, 0, 0, 255];

/// Glyph for `ch`; characters without one render as a space
pub fn glyph(ch: u8) -> &'static Glyph {
    GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, g)| g)
        .unwrap_or(&BLANK)
}

/// RGBA8 image with one glyph cell per grid character, rows top-down
#[derive(Debug, Clone)]
pub struct GlyphTexture {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GlyphTexture {
    pub fn new(cols: usize, rows: usize) -> Self {
        let width = cols * GLYPH_W;
        let height = rows * GLYPH_H;
        GlyphTexture {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn from_grid(grid: &CharGrid) -> Self {
        let mut texture = GlyphTexture::new(grid.width(), grid.height());
        texture.fill(grid);
        texture
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Redraw every cell from `grid`, resizing first if the grid changed
    pub fn fill(&mut self, grid: &CharGrid) {
        if self.width != grid.width() * GLYPH_W || self.height != grid.height() * GLYPH_H {
            *self = GlyphTexture::new(grid.width(), grid.height());
        }
        if self.pixels.is_empty() {
            return;
        }

        let stride = self.width * 4;
        // one band of GLYPH_H pixel rows per character row
        self.pixels
            .par_chunks_mut(stride * GLYPH_H)
            .enumerate()
            .for_each(|(cy, band)| {
                for (cx, &ch) in grid.row(cy).iter().enumerate() {
                    let g = glyph(ch);
                    for (gy, bits) in g.iter().enumerate() {
                        for gx in 0..GLYPH_W {
                            let px = if (bits >> (7 - gx)) & 1 == 1 { ON } else { OFF };
                            let i = gy * stride + (cx * GLYPH_W + gx) * 4;
                            band[i..i + 4].copy_from_slice(&px);
                        }
                    }
                }
            });
    }

    pub fn save_png(&self, path: &Path) -> anyhow::Result<()> {
        let img = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(
            self.width as u32,
            self.height as u32,
            &self.pixels[..],
        )
        .ok_or_else(|| anyhow!("texture does not match {}x{}", self.width, self.height))?;
        img.save(path)
            .with_context(|| format!("failed to save {}", path.display()))
    }
}
