mod loader;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use loader::load_config;

pub const RESOLUTION_MIN: u32 = 16;
pub const RESOLUTION_MAX: u32 = 1024;
pub const RESOLUTION_STEP: i32 = 16;
pub const POINT_SIZE_MIN: f32 = 1.0;
pub const POINT_SIZE_MAX: f32 = 64.0;
pub const POINT_SIZE_STEP: f32 = 1.0;
pub const GRID_HALF_EXTENT_MAX: u32 = 1024;
/// Upper bound for disk radial/angular steps and ring samples
pub const STEPS_MAX: u32 = 4096;

/// All scene tunables. Geometry parameters are read once at startup; only
/// `black_hole.resolution` and `black_hole.point_size` change at runtime,
/// and only through [`SceneConfig::apply`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub black_hole: BlackHoleConfig,
    pub disk: DiskConfig,
    pub ring: RingConfig,
    pub warp: WarpConfig,
    pub grid: GridConfig,
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlackHoleConfig {
    /// Visual radius of the hole in billboard units
    pub radius: f32,
    pub position: [f32; 3],
    /// Samples per side of the disc fill grid
    pub resolution: u32,
    /// Base sprite size in pixels for every point cloud
    pub point_size: f32,
    /// Schwarzschild radius as a fraction of the visual radius
    pub schwarzschild_scale: f32,
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self {
            radius: 0.65,
            position: [0.0, -0.28, 0.0],
            resolution: 192,
            point_size: 6.0,
            schwarzschild_scale: 0.9,
        }
    }
}

/// Horizontal accretion disk, world space
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiskConfig {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub thickness: f32,
    pub radial_steps: u32,
    pub angular_steps: u32,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            inner_radius: 0.50,
            outer_radius: 0.95,
            thickness: 0.04,
            radial_steps: 36,
            angular_steps: 360,
        }
    }
}

/// Photon ring radii are fractions of the black hole radius
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RingConfig {
    pub inner_scale: f32,
    pub outer_scale: f32,
    pub samples: u32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            inner_scale: 0.8,
            outer_scale: 0.95,
            samples: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WarpConfig {
    pub strength: f32,
    pub falloff: f32,
    /// Normalized screen radius where the warp is strongest
    pub effect_radius: f32,
    pub ring_sharpness: f32,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            strength: 0.15,
            falloff: 2.0,
            effect_radius: 0.22,
            ring_sharpness: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub half_extent: u32,
    pub spacing: f32,
    pub mass_scale: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_extent: 28,
            spacing: 0.12,
            mass_scale: 3.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    pub radius: f32,
    pub orbit_speed: f32,
    pub zoom_speed: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            radius: 3.5,
            orbit_speed: 0.005,
            zoom_speed: 0.3,
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 300.0,
        }
    }
}

/// A runtime change requested by an input handler
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigDelta {
    Resolution(i32),
    PointSize(f32),
}

impl SceneConfig {
    /// Apply a delta, clamping into the documented bounds.
    /// Returns true when the value actually changed.
    pub fn apply(&mut self, delta: ConfigDelta) -> bool {
        match delta {
            ConfigDelta::Resolution(step) => {
                let old = self.black_hole.resolution;
                let new = (old as i64 + step as i64)
                    .clamp(RESOLUTION_MIN as i64, RESOLUTION_MAX as i64) as u32;
                self.black_hole.resolution = new;
                if new != old {
                    log::info!("black hole resolution = {}", new);
                }
                new != old
            }
            ConfigDelta::PointSize(step) => {
                let old = self.black_hole.point_size;
                let new = (old + step).clamp(POINT_SIZE_MIN, POINT_SIZE_MAX);
                self.black_hole.point_size = new;
                if new != old {
                    log::info!("point size = {}", new);
                }
                new != old
            }
        }
    }

    pub fn black_hole_position(&self) -> Vec3 {
        Vec3::from_array(self.black_hole.position)
    }

    pub fn ring_inner_radius(&self) -> f32 {
        self.black_hole.radius * self.ring.inner_scale
    }

    pub fn ring_outer_radius(&self) -> f32 {
        self.black_hole.radius * self.ring.outer_scale
    }

    pub fn schwarzschild_radius(&self) -> f32 {
        self.black_hole.radius * self.black_hole.schwarzschild_scale
    }

    /// Reject values the generators and the camera cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bh = &self.black_hole;
        if !(RESOLUTION_MIN..=RESOLUTION_MAX).contains(&bh.resolution) {
            return Err(ConfigError::Validation(format!(
                "black_hole.resolution must be in [{}, {}], got {}",
                RESOLUTION_MIN, RESOLUTION_MAX, bh.resolution
            )));
        }
        if !(POINT_SIZE_MIN..=POINT_SIZE_MAX).contains(&bh.point_size) {
            return Err(ConfigError::Validation(format!(
                "black_hole.point_size must be in [{}, {}], got {}",
                POINT_SIZE_MIN, POINT_SIZE_MAX, bh.point_size
            )));
        }
        if bh.radius <= 0.0 {
            return Err(ConfigError::Validation(
                "black_hole.radius must be positive".to_string(),
            ));
        }
        let counts = [
            ("disk.radial_steps", self.disk.radial_steps),
            ("disk.angular_steps", self.disk.angular_steps),
            ("ring.samples", self.ring.samples),
        ];
        for (name, value) in counts {
            if value > STEPS_MAX {
                return Err(ConfigError::Validation(format!(
                    "{} must be at most {}, got {}",
                    name, STEPS_MAX, value
                )));
            }
        }
        if self.grid.half_extent > GRID_HALF_EXTENT_MAX {
            return Err(ConfigError::Validation(format!(
                "grid.half_extent must be at most {}, got {}",
                GRID_HALF_EXTENT_MAX, self.grid.half_extent
            )));
        }
        if self.disk.inner_radius >= self.disk.outer_radius {
            return Err(ConfigError::Validation(
                "disk.inner_radius must be smaller than disk.outer_radius".to_string(),
            ));
        }
        if self.ring.inner_scale >= self.ring.outer_scale {
            return Err(ConfigError::Validation(
                "ring.inner_scale must be smaller than ring.outer_scale".to_string(),
            ));
        }
        if self.warp.effect_radius <= 0.0 {
            return Err(ConfigError::Validation(
                "warp.effect_radius must be positive".to_string(),
            ));
        }
        let cam = &self.camera;
        if !(cam.fov_y_degrees > 0.0 && cam.fov_y_degrees < 180.0) {
            return Err(ConfigError::Validation(format!(
                "camera.fov_y_degrees must be in (0, 180), got {}",
                cam.fov_y_degrees
            )));
        }
        if cam.near <= 0.0 || cam.near >= cam.far {
            return Err(ConfigError::Validation(
                "camera.near must be positive and smaller than camera.far".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
