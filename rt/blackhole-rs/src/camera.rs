//! Orbit camera, projection and the camera-facing billboard matrix

use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::config::CameraConfig;
use crate::input::PointerEvent;

pub const ELEVATION_EPS: f32 = 0.01;
pub const RADIUS_MIN: f32 = 0.5;
pub const RADIUS_MAX: f32 = 100.0;
/// Azimuth advance per frame while auto-rotating
pub const AUTO_ROTATE_STEP: f32 = 0.0009;

const BILLBOARD_EPS: f32 = 1e-4;

/// Spherical-coordinate camera orbiting `target`
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub orbit_speed: f32,
    pub zoom_speed: f32,
    pub dragging: bool,
    pub last_cursor: (f64, f64),
    pub auto_rotate: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        OrbitCamera {
            radius: config.radius.clamp(RADIUS_MIN, RADIUS_MAX),
            azimuth: 0.0,
            elevation: FRAC_PI_2,
            target: Vec3::ZERO,
            orbit_speed: config.orbit_speed,
            zoom_speed: config.zoom_speed,
            dragging: false,
            last_cursor: (0.0, 0.0),
            auto_rotate: false,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target
            + Vec3::new(
                self.radius * sin_el * cos_az,
                self.radius * cos_el,
                self.radius * sin_el * sin_az,
            )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Pressed { x, y } => self.begin_drag(x, y),
            PointerEvent::Released => self.end_drag(),
            PointerEvent::Moved { x, y } => self.drag_to(x, y),
            PointerEvent::Scrolled { lines } => self.scroll(lines),
        }
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last_cursor = (x, y);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Cursor motion; ignored unless a drag is in progress
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        let dx = (x - self.last_cursor.0) as f32;
        let dy = (y - self.last_cursor.1) as f32;
        self.azimuth += dx * self.orbit_speed;
        self.elevation = (self.elevation - dy * self.orbit_speed)
            .clamp(ELEVATION_EPS, PI - ELEVATION_EPS);
        self.last_cursor = (x, y);
    }

    /// Positive `lines` zooms in
    pub fn scroll(&mut self, lines: f32) {
        self.radius = (self.radius - lines * self.zoom_speed).clamp(RADIUS_MIN, RADIUS_MAX);
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        log::info!(
            "auto-rotate {}",
            if self.auto_rotate { "on" } else { "off" }
        );
        self.auto_rotate
    }

    /// Once per frame, before the view is built
    pub fn tick(&mut self) {
        if self.auto_rotate && !self.dragging {
            self.azimuth += AUTO_ROTATE_STEP;
        }
    }
}

/// Right-handed GL-style projection (depth mapped to [-1, 1])
pub fn projection_matrix(config: &CameraConfig, aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(config.fov_y_degrees.to_radians(), aspect, config.near, config.far)
}

/// Model matrix turning billboard-local XY into a plane at `pos` facing
/// `camera_pos`. Columns are `right * scale`, `up * scale`, `look * scale`, `pos`.
pub fn billboard_model(pos: Vec3, camera_pos: Vec3, scale: f32) -> Mat4 {
    let look = (camera_pos - pos).try_normalize().unwrap_or(Vec3::Z);
    let mut right = Vec3::Y.cross(look);
    if right.length() < BILLBOARD_EPS {
        right = Vec3::X.cross(look);
    }
    let right = right.normalize();
    let up = look.cross(right);

    Mat4::from_cols(
        (right * scale).extend(0.0),
        (up * scale).extend(0.0),
        (look * scale).extend(0.0),
        Vec4::new(pos.x, pos.y, pos.z, 1.0),
    )
}
