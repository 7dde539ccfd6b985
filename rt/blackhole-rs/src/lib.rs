//! blackhole-rs: a stylized black hole rendered as point clouds
//!
//! The scene is a pixelated event-horizon disc, a photon ring and a
//! horizontal accretion disk over a grid sagging into a gravity well. Two
//! background stars are drawn to an offscreen layer and bent around the
//! hole by a screen-space warp. A bitmap-font overlay shows approximate
//! time dilation and light deflection at the camera.

pub mod backend;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod input;
pub mod physics;
pub mod pipeline;
pub mod raster;
pub mod text;
pub mod warp;

pub use backend::{RenderBackend, SoftwareBackend};
pub use camera::OrbitCamera;
pub use config::{load_config, SceneConfig};
pub use pipeline::SceneRenderer;
