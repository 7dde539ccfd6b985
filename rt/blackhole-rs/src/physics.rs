//! Display-only approximations of gravitational effects near the hole.
//! These feed the on-screen overlay; nothing in the scene depends on them.

use glam::Vec3;

const DILATION_EPS: f32 = 1e-4;
const MIN_DISTANCE: f32 = 1e-4;

/// `sqrt(1 - rs/r)`, pinned to 0 at or inside the horizon.
pub fn time_dilation_factor(rs: f32, r: f32) -> f32 {
    if r <= rs {
        return 0.0;
    }
    let r = r.max(rs + DILATION_EPS);
    let inside = 1.0 - rs / r;
    if inside <= 0.0 {
        return 0.0;
    }
    inside.sqrt()
}

/// Deflection-like measure `4rs/r` squashed into `[0, 1)`.
pub fn spatial_distortion(rs: f32, r: f32) -> f32 {
    let r = r.max(MIN_DISTANCE);
    let v = 4.0 * rs / r;
    v / (v + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnostics {
    pub camera_distance: f32,
    pub dilation_factor: f32,
    pub dilation_inverse: f32,
    pub spatial_distortion: f32,
}

impl Diagnostics {
    pub fn measure(camera_pos: Vec3, hole_pos: Vec3, rs: f32) -> Self {
        let camera_distance = camera_pos.distance(hole_pos);
        let dilation_factor = time_dilation_factor(rs, camera_distance);
        let dilation_inverse = if dilation_factor > 1e-6 {
            1.0 / dilation_factor
        } else {
            0.0
        };
        Diagnostics {
            camera_distance,
            dilation_factor,
            dilation_inverse,
            spatial_distortion: spatial_distortion(rs, camera_distance),
        }
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("CamDist: {:.4}", self.camera_distance),
            format!("TimeDilFactor: {:.5}", self.dilation_factor),
            format!(
                "DilInverse: {:.5}  SpatialDist: {:.5}",
                self.dilation_inverse, self.spatial_distortion
            ),
        ]
    }
}
