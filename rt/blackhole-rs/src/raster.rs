//! CPU rasterization primitives: a colour + depth framebuffer with GL-style
//! point sprites, lines and full-screen shading.
//!
//! Conventions follow the fixed-function GL pipeline: clip-space input,
//! `[-1, 1]` NDC depth mapped to `[0, 1]`, LESS depth test, and colour
//! clamped to `[0, 1]` on every write as for an RGBA8 target. Rows are
//! stored top-down.

use glam::{Vec2, Vec4};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * src.a + dst * (1 - src.a)`
    Alpha,
    /// `src * src.a + dst`
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// LESS test with depth writes
    Test,
    /// LEQUAL test with depth writes; coplanar redraws pass
    TestEqual,
    /// Neither tested nor written
    Ignore,
}

/// A fragment in window space, ready for the depth test
#[derive(Debug, Clone, Copy)]
struct WindowPoint {
    x: f32,
    y: f32,
    depth: f32,
}

pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize);
        Framebuffer {
            width,
            height,
            color: vec![Vec4::ZERO; len],
            depth: vec![1.0; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// Reallocate for a new size. Contents are reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Framebuffer::new(width, height);
    }

    pub fn clear(&mut self, color: Vec4) {
        let color = color.clamp(Vec4::ZERO, Vec4::ONE);
        self.color.fill(color);
        self.depth.fill(1.0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.color[self.index(x, y)]
    }

    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn to_window(&self, clip: Vec4) -> Option<WindowPoint> {
        let w = clip.w;
        if w <= 0.0 || clip.x.abs() > w || clip.y.abs() > w || clip.z.abs() > w {
            return None;
        }
        let ndc = clip.truncate() / w;
        Some(WindowPoint {
            x: (ndc.x * 0.5 + 0.5) * self.width as f32,
            y: (1.0 - (ndc.y * 0.5 + 0.5)) * self.height as f32,
            depth: ndc.z * 0.5 + 0.5,
        })
    }

    fn write(&mut self, idx: usize, depth: f32, src: Vec4, depth_mode: DepthMode, blend: BlendMode) {
        match depth_mode {
            DepthMode::Test if depth >= self.depth[idx] => return,
            DepthMode::TestEqual if depth > self.depth[idx] => return,
            DepthMode::Test | DepthMode::TestEqual => self.depth[idx] = depth,
            DepthMode::Ignore => {}
        }
        self.color[idx] = blend_pixel(self.color[idx], src, blend);
    }

    /// Square sprite of `size` pixels centred on the projected point. The
    /// fragment program receives the sprite coordinate (origin top-left)
    /// and may discard by returning `None`.
    pub fn draw_point<F>(
        &mut self,
        clip: Vec4,
        size: f32,
        depth_mode: DepthMode,
        blend: BlendMode,
        fragment: F,
    ) where
        F: Fn(Vec2) -> Option<Vec4>,
    {
        if self.is_empty() || size <= 0.0 {
            return;
        }
        let Some(p) = self.to_window(clip) else {
            return;
        };
        let x0 = p.x - size * 0.5;
        let y0 = p.y - size * 0.5;

        // pixel centres inside [x0, x0 + size)
        let first_x = (x0 - 0.5).ceil().max(0.0) as i64;
        let last_x = ((x0 + size - 0.5).ceil() as i64 - 1).min(self.width as i64 - 1);
        let first_y = (y0 - 0.5).ceil().max(0.0) as i64;
        let last_y = ((y0 + size - 0.5).ceil() as i64 - 1).min(self.height as i64 - 1);

        for py in first_y..=last_y {
            for px in first_x..=last_x {
                let coord = Vec2::new(
                    (px as f32 + 0.5 - x0) / size,
                    (py as f32 + 0.5 - y0) / size,
                );
                if let Some(color) = fragment(coord) {
                    let idx = self.index(px as u32, py as u32);
                    self.write(idx, p.depth, color, depth_mode, blend);
                }
            }
        }
    }

    /// One-pixel line between two clip-space points
    pub fn draw_line(
        &mut self,
        a: Vec4,
        b: Vec4,
        color: Vec4,
        depth_mode: DepthMode,
        blend: BlendMode,
    ) {
        if self.is_empty() {
            return;
        }
        let Some((a, b)) = clip_near(a, b) else {
            return;
        };
        let project = |c: Vec4| -> (Vec2, f32) {
            let ndc = c.truncate() / c.w;
            (
                Vec2::new(
                    (ndc.x * 0.5 + 0.5) * self.width as f32,
                    (1.0 - (ndc.y * 0.5 + 0.5)) * self.height as f32,
                ),
                ndc.z * 0.5 + 0.5,
            )
        };
        let (pa, da) = project(a);
        let (pb, db) = project(b);

        let max = Vec2::new(self.width as f32, self.height as f32);
        let Some((t0, t1)) = liang_barsky(pa, pb, Vec2::ZERO, max) else {
            return;
        };
        let start = pa.lerp(pb, t0);
        let end = pa.lerp(pb, t1);
        let depth_start = da + (db - da) * t0;
        let depth_end = da + (db - da) * t1;

        let (mut x, mut y) = (start.x.floor() as i64, start.y.floor() as i64);
        let (x1, y1) = (end.x.floor() as i64, end.y.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let mut step = 0.0f32;

        loop {
            if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
                let depth = depth_start + (depth_end - depth_start) * (step / steps);
                if (0.0..=1.0).contains(&depth) {
                    let idx = self.index(x as u32, y as u32);
                    self.write(idx, depth, color, depth_mode, blend);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    /// Run `fragment` for every pixel with its texture coordinate
    /// (origin bottom-left, pixel centres), rows in parallel. Depth is
    /// neither tested nor written.
    pub fn shade_fullscreen<F>(&mut self, blend: BlendMode, fragment: F)
    where
        F: Fn(Vec2) -> Option<Vec4> + Sync,
    {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        self.color
            .par_chunks_mut(self.width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let v = 1.0 - (y as f32 + 0.5) / h;
                for (x, dst) in row.iter_mut().enumerate() {
                    let uv = Vec2::new((x as f32 + 0.5) / w, v);
                    if let Some(src) = fragment(uv) {
                        *dst = blend_pixel(*dst, src, blend);
                    }
                }
            });
    }

    /// Bilinear filtered read with clamp-to-edge addressing.
    /// `uv` has its origin at the bottom-left corner.
    pub fn sample_bilinear(&self, uv: Vec2) -> Vec4 {
        if self.is_empty() {
            return Vec4::ZERO;
        }
        let tx = uv.x * self.width as f32 - 0.5;
        let ty = (1.0 - uv.y) * self.height as f32 - 0.5;
        let x0 = tx.floor();
        let y0 = ty.floor();
        let fx = tx - x0;
        let fy = ty - y0;

        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let at = |x: f32, y: f32| -> Vec4 {
            let xi = (x as i64).clamp(0, max_x) as u32;
            let yi = (y as i64).clamp(0, max_y) as u32;
            self.pixel(xi, yi)
        };

        let top = at(x0, y0).lerp(at(x0 + 1.0, y0), fx);
        let bottom = at(x0, y0 + 1.0).lerp(at(x0 + 1.0, y0 + 1.0), fx);
        top.lerp(bottom, fy)
    }

    /// Pack into `out` as RGBA8, top row first
    pub fn write_rgba8(&self, out: &mut [u8]) {
        let texels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(out);
        for (dst, src) in texels.iter_mut().zip(&self.color) {
            *dst = to_rgba8(*src);
        }
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.color.len() * 4];
        self.write_rgba8(&mut out);
        out
    }
}

fn to_rgba8(c: Vec4) -> [u8; 4] {
    let c = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

pub fn blend_pixel(dst: Vec4, src: Vec4, mode: BlendMode) -> Vec4 {
    let src = src.clamp(Vec4::ZERO, Vec4::ONE);
    let out = match mode {
        BlendMode::Alpha => src * src.w + dst * (1.0 - src.w),
        BlendMode::Additive => src * src.w + dst,
    };
    out.clamp(Vec4::ZERO, Vec4::ONE)
}

/// Clip a segment against the near plane (`z >= -w`)
fn clip_near(a: Vec4, b: Vec4) -> Option<(Vec4, Vec4)> {
    let da = a.z + a.w;
    let db = b.z + b.w;
    match (da >= 0.0, db >= 0.0) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, a.lerp(b, da / (da - db)))),
        (false, true) => Some((a.lerp(b, da / (da - db)), b)),
    }
}

/// Parametric range of the segment `p0 -> p1` inside the box, or `None`
fn liang_barsky(p0: Vec2, p1: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    let d = p1 - p0;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let edges = [
        (-d.x, p0.x - min.x),
        (d.x, max.x - p0.x),
        (-d.y, p0.y - min.y),
        (d.y, max.y - p0.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}
