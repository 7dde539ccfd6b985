//! Screen-space lensing of the star layer.
//!
//! Fragments within `1.8 * effect_radius` of the hole (in texture space)
//! sample the star layer at an offset that mixes a radial pull with a
//! tangential swirl, both concentrated on a ring at `0.9 * effect_radius`.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::config::WarpConfig;
use crate::geometry::smoothstep;

const CUTOFF_SCALE: f32 = 1.8;
const RING_SCALE: f32 = 0.9;
const DIR_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpUniforms {
    /// Hole centre in texture coordinates (origin bottom-left)
    pub hole_uv: Vec2,
    pub strength: f32,
    pub falloff: f32,
    pub effect_radius: f32,
    pub ring_sharpness: f32,
}

impl WarpUniforms {
    pub fn new(hole_uv: Vec2, config: &WarpConfig) -> Self {
        WarpUniforms {
            hole_uv,
            strength: config.strength,
            falloff: config.falloff,
            effect_radius: config.effect_radius,
            ring_sharpness: config.ring_sharpness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpSample {
    /// Added to the fragment's uv before sampling
    pub offset: Vec2,
    /// Multiplier applied to the sampled rgb
    pub boost: f32,
}

/// Offset and brightness boost at `uv`, or `None` outside the warp region
pub fn warp_at(uv: Vec2, u: &WarpUniforms) -> Option<WarpSample> {
    let r = u.effect_radius;
    let to_hole = uv - u.hole_uv;
    let d = to_hole.length();
    if d > r * CUTOFF_SCALE {
        return None;
    }

    let dir = (to_hole + Vec2::splat(DIR_EPS)).normalize_or_zero();
    let tangent = Vec2::new(-dir.y, dir.x);
    let ring_radius = r * RING_SCALE;

    let base = u.strength * (r / (d + 0.001)).max(0.001).powf(u.falloff);
    let peak = (-(d - ring_radius) * (d - ring_radius) * u.ring_sharpness).exp();

    let radial = -dir * base * 0.25 * peak;
    // arcs bend the other way when the hole sits in the lower half of the screen
    let sign: f32 = if u.hole_uv.y < 0.5 { -1.0 } else { 1.0 };
    let tangential = tangent * base * 0.6 * peak * sign;

    Some(WarpSample {
        offset: (radial + tangential) * 0.5,
        boost: 1.0 + 0.8 * peak * smoothstep(r * 0.02, ring_radius, d),
    })
}

/// Apply the warp to one fragment, sampling through `sample`
pub fn shade<S>(uv: Vec2, u: &WarpUniforms, sample: S) -> Vec4
where
    S: Fn(Vec2) -> Vec4,
{
    match warp_at(uv, u) {
        None => sample(uv),
        Some(w) => {
            let c = sample(uv + w.offset);
            (c.truncate() * w.boost).extend(c.w)
        }
    }
}

/// World position to texture coordinates, no clipping
pub fn project_to_uv(view_proj: Mat4, world: Vec3) -> Vec2 {
    let clip = view_proj * world.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    Vec2::new(ndc.x * 0.5 + 0.5, ndc.y * 0.5 + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(hole_uv: Vec2) -> WarpUniforms {
        WarpUniforms::new(hole_uv, &WarpConfig::default())
    }

    #[test]
    fn test_passthrough_outside_region() {
        let u = uniforms(Vec2::splat(0.5));
        assert!(warp_at(Vec2::new(0.5 + 0.22 * 1.8 + 0.01, 0.5), &u).is_none());
        assert!(warp_at(Vec2::new(0.0, 0.0), &u).is_none());
        assert!(warp_at(Vec2::new(0.5 + 0.22 * 1.7, 0.5), &u).is_some());

        let sample = |p: Vec2| Vec4::new(p.x, p.y, 0.0, 1.0);
        assert_eq!(shade(Vec2::new(0.05, 0.05), &u, sample), Vec4::new(0.05, 0.05, 0.0, 1.0));
    }

    #[test]
    fn test_boost_peaks_on_ring() {
        let u = uniforms(Vec2::splat(0.5));
        let ring = 0.22 * 0.9;
        let on_ring = warp_at(Vec2::new(0.5 + ring, 0.5), &u).unwrap();
        let inside = warp_at(Vec2::new(0.5 + 0.01, 0.5), &u).unwrap();
        assert!(on_ring.boost > inside.boost);
        assert!((on_ring.boost - 1.8).abs() < 1e-3);
        assert!(on_ring.boost <= 1.8 + 1e-6);
    }

    #[test]
    fn test_tangential_sign_flips_with_hole_half() {
        let ring = 0.22 * 0.9;
        let upper = uniforms(Vec2::new(0.5, 0.6));
        let lower = uniforms(Vec2::new(0.5, 0.4));
        let a = warp_at(upper.hole_uv + Vec2::new(ring, 0.0), &upper).unwrap();
        let b = warp_at(lower.hole_uv + Vec2::new(ring, 0.0), &lower).unwrap();
        // to the right of the hole the tangent is +y
        assert!(a.offset.y > 0.0);
        assert!(b.offset.y < 0.0);
        // the radial part pulls toward the hole either way
        assert!(a.offset.x < 0.0 && b.offset.x < 0.0);
        assert!((a.offset.x - b.offset.x).abs() < 1e-3);
    }

    #[test]
    fn test_warp_at_hole_centre_is_finite() {
        let u = uniforms(Vec2::splat(0.5));
        let w = warp_at(Vec2::splat(0.5), &u).unwrap();
        assert!(w.offset.is_finite());
        assert!(w.boost.is_finite());
        assert!((w.boost - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shade_scales_rgb_only() {
        let u = uniforms(Vec2::splat(0.5));
        let ring = 0.22 * 0.9;
        let c = shade(Vec2::new(0.5 + ring, 0.5), &u, |_| Vec4::new(0.5, 0.25, 0.1, 0.4));
        assert!(c.x > 0.5);
        assert_eq!(c.w, 0.4);
    }

    #[test]
    fn test_project_to_uv_centre() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let uv = project_to_uv(proj * view, Vec3::ZERO);
        assert!((uv - Vec2::splat(0.5)).length() < 1e-6);

        let above = project_to_uv(proj * view, Vec3::new(0.0, 1.0, 0.0));
        assert!(above.y > 0.5);
    }
}
