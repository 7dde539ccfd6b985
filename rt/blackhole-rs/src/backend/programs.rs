//! Fragment programs of the software backend. Each takes the sprite
//! coordinate (or texture coordinate for full-screen passes) and returns
//! the colour to blend, `None` to discard.

use glam::{Vec2, Vec3, Vec4};

use crate::geometry::smoothstep;
use crate::raster::Framebuffer;
use crate::warp::{self, WarpUniforms};

pub const STAR_SIGMA: f32 = 0.18;
const TEXT_DOT_EDGE: f32 = 0.25;

pub fn flat(color: Vec4) -> Option<Vec4> {
    Some(color)
}

/// Hard-edged square pixel in the vertex colour
pub fn square_point(color: [f32; 4]) -> Option<Vec4> {
    Some(Vec4::from_array(color))
}

/// Round Gaussian sprite; brighter than the base colour at the core
pub fn gaussian_star(point_coord: Vec2, color: Vec3) -> Option<Vec4> {
    let uv = point_coord - Vec2::splat(0.5);
    let r2 = uv.length_squared();
    let intensity = (-r2 / (2.0 * STAR_SIGMA * STAR_SIGMA)).exp().clamp(0.0, 1.0);
    Some((color * (0.5 + 1.1 * intensity)).extend(intensity))
}

pub fn star_warp(source: &Framebuffer, uv: Vec2, uniforms: &WarpUniforms) -> Option<Vec4> {
    Some(warp::shade(uv, uniforms, |p| source.sample_bilinear(p)))
}

/// Soft circular dot for bitmap text
pub fn text_dot(point_coord: Vec2, color: [f32; 4]) -> Option<Vec4> {
    let d = (point_coord - Vec2::splat(0.5)).length();
    let alpha = 1.0 - smoothstep(0.0, TEXT_DOT_EDGE, d);
    let [r, g, b, a] = color;
    Some(Vec4::new(r, g, b, a * alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_star_profile() {
        let color = Vec3::new(1.0, 0.66, 0.32);
        let centre = gaussian_star(Vec2::splat(0.5), color).unwrap();
        assert_eq!(centre.w, 1.0);
        assert!((centre.x - 1.6).abs() < 1e-6);

        let edge = gaussian_star(Vec2::new(0.0, 0.5), color).unwrap();
        assert!(edge.w < 0.05);
        assert!(edge.x > 0.5);

        let corner = gaussian_star(Vec2::ZERO, color).unwrap();
        assert!(corner.w < edge.w);
    }

    #[test]
    fn test_text_dot_falloff() {
        let c = [1.0, 0.8, 0.6, 1.0];
        assert_eq!(text_dot(Vec2::splat(0.5), c).unwrap().w, 1.0);
        assert_eq!(text_dot(Vec2::new(0.5, 0.8), c).unwrap().w, 0.0);
        let mid = text_dot(Vec2::new(0.5, 0.625), c).unwrap().w;
        assert!((mid - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_star_warp_passthrough_samples_source() {
        let mut source = Framebuffer::new(4, 4);
        source.clear(Vec4::new(0.2, 0.4, 0.6, 1.0));
        let uniforms = WarpUniforms::new(Vec2::splat(0.5), &crate::config::WarpConfig::default());
        let c = star_warp(&source, Vec2::new(0.01, 0.01), &uniforms).unwrap();
        assert!((c - Vec4::new(0.2, 0.4, 0.6, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_square_point_keeps_vertex_colour() {
        assert_eq!(square_point([0.0, 0.0, 0.0, 1.0]), Some(Vec4::W));
        assert_eq!(flat(Vec4::ONE), Some(Vec4::ONE));
    }
}
