//! Per-frame pass list for the black hole scene.
//!
//! Each frame is planned as an explicit, ordered `Vec<Pass>`; every pass
//! declares where it draws, how it blends and whether it uses depth. The
//! backend executes the passes one by one. A pass that fails is logged and
//! skipped so the rest of the frame still lands on screen.

use glam::{Mat4, Vec4};
use rand::Rng;

use crate::backend::{MeshData, MeshId, RenderBackend};
use crate::camera::{billboard_model, projection_matrix, OrbitCamera};
use crate::config::{ConfigDelta, SceneConfig};
use crate::geometry::{
    default_stars, generate_disc_fill, generate_disk_annulus, generate_lensed_grid,
    generate_ring_annulus,
};
use crate::physics::Diagnostics;
use crate::raster::{BlendMode, DepthMode};
use crate::text::{overlay_points, TextPoint};
use crate::warp::{project_to_uv, WarpUniforms};

pub const SCREEN_CLEAR: Vec4 = Vec4::new(0.02, 0.01, 0.01, 1.0);
pub const GRID_COLOR: Vec4 = Vec4::new(0.95, 0.7, 0.45, 1.0);
pub const DISC_BILLBOARD_SCALE: f32 = 0.7;
pub const RING_BILLBOARD_SCALE: f32 = 1.0;
pub const DISK_POINT_SCALE: f32 = 1.25;
pub const RING_POINT_SCALE: f32 = 0.95;
pub const GLOW_POINT_SCALE: f32 = 1.05;
pub const TEXT_POINT_SIZE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Screen,
    /// Offscreen layer holding only the stars, sampled by the warp
    StarLayer,
}

#[derive(Debug, Clone)]
pub enum Draw {
    Stars { mesh: MeshId, view_proj: Mat4 },
    Lines { mesh: MeshId, mvp: Mat4, color: Vec4 },
    Points { mesh: MeshId, mvp: Mat4, point_size: f32 },
    /// Full-screen warp of the star layer
    Warp(WarpUniforms),
    /// Points in normalized screen space, origin bottom-left
    Text { points: Vec<TextPoint>, point_size: f32 },
}

#[derive(Debug, Clone)]
pub struct Pass {
    pub name: &'static str,
    pub target: RenderTarget,
    /// Clears colour and depth of the target before drawing
    pub clear: Option<Vec4>,
    pub blend: BlendMode,
    pub depth: DepthMode,
    pub draw: Draw,
}

impl Pass {
    /// Alpha blended, depth tested, no clear
    pub fn new(name: &'static str, target: RenderTarget, draw: Draw) -> Self {
        Pass {
            name,
            target,
            clear: None,
            blend: BlendMode::Alpha,
            depth: DepthMode::Test,
            draw,
        }
    }

    pub fn clear(mut self, color: Vec4) -> Self {
        self.clear = Some(color);
        self
    }

    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }
}

pub struct FramePlan {
    pub passes: Vec<Pass>,
    pub diagnostics: Diagnostics,
}

/// Backend handles of the scene's static meshes
#[derive(Debug, Clone, Copy)]
pub struct SceneMeshes {
    pub stars: MeshId,
    pub grid: MeshId,
    pub disk: MeshId,
    pub ring: MeshId,
    pub disc: MeshId,
}

pub struct SceneRenderer<B: RenderBackend> {
    backend: B,
    config: SceneConfig,
    meshes: SceneMeshes,
}

fn upload_or_log<B: RenderBackend>(backend: &mut B, label: &'static str, mesh: MeshData) -> MeshId {
    match backend.upload(label, mesh) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to upload '{}': {}", label, e);
            MeshId::INVALID
        }
    }
}

impl<B: RenderBackend> SceneRenderer<B> {
    /// Generate every mesh and hand it to the backend. Upload failures are
    /// logged; the affected passes are skipped each frame.
    pub fn new<R: Rng + ?Sized>(mut backend: B, config: SceneConfig, rng: &mut R) -> Self {
        if let Err(e) = backend.create_star_layer() {
            log::error!("Failed to create star layer: {}", e);
        }

        let bh = &config.black_hole;
        let disk_cfg = &config.disk;
        let grid_cfg = &config.grid;

        let disc = generate_disc_fill(bh.resolution, bh.radius);
        let ring = generate_ring_annulus(
            config.ring_inner_radius(),
            config.ring_outer_radius(),
            config.ring.samples,
            rng,
        );
        let disk = generate_disk_annulus(
            disk_cfg.inner_radius,
            disk_cfg.outer_radius,
            disk_cfg.thickness,
            disk_cfg.radial_steps,
            disk_cfg.angular_steps,
            bh.position[1],
            rng,
        );
        let grid = generate_lensed_grid(grid_cfg.half_extent, grid_cfg.spacing, grid_cfg.mass_scale);

        log::info!(
            "Scene: disc {} pts, ring {} pts, disk {} pts, grid {} vertices / {} lines",
            disc.len(),
            ring.len(),
            disk.len(),
            grid.vertices.len(),
            grid.indices.len() / 2
        );

        let meshes = SceneMeshes {
            stars: upload_or_log(&mut backend, "stars", MeshData::Stars(default_stars())),
            grid: upload_or_log(
                &mut backend,
                "grid",
                MeshData::Lines {
                    vertices: grid.vertices,
                    indices: grid.indices,
                },
            ),
            disk: upload_or_log(&mut backend, disk.name, MeshData::Points(disk.points)),
            ring: upload_or_log(&mut backend, ring.name, MeshData::Points(ring.points)),
            disc: upload_or_log(&mut backend, disc.name, MeshData::Points(disc.points)),
        };

        SceneRenderer {
            backend,
            config,
            meshes,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn meshes(&self) -> SceneMeshes {
        self.meshes
    }

    /// Apply a runtime tunable change; a new resolution rebuilds the disc
    pub fn apply(&mut self, delta: ConfigDelta) {
        if self.config.apply(delta) {
            if let ConfigDelta::Resolution(_) = delta {
                self.regenerate_disc();
            }
        }
    }

    pub fn regenerate_disc(&mut self) {
        let bh = &self.config.black_hole;
        let disc = generate_disc_fill(bh.resolution, bh.radius);
        log::debug!("Regenerated disc: {} pts at resolution {}", disc.len(), bh.resolution);
        if let Err(e) = self
            .backend
            .replace(self.meshes.disc, MeshData::Points(disc.points))
        {
            log::error!("Failed to replace '{}': {}", disc.name, e);
        }
    }

    /// Build the ordered pass list for the current camera
    pub fn plan_frame(&self, camera: &OrbitCamera) -> FramePlan {
        let config = &self.config;
        let (width, height) = self.backend.size();
        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };

        let view_proj = projection_matrix(&config.camera, aspect) * camera.view_matrix();
        let camera_pos = camera.position();
        let hole = config.black_hole_position();
        let ring_mvp = view_proj * billboard_model(hole, camera_pos, RING_BILLBOARD_SCALE);
        let disc_mvp = view_proj * billboard_model(hole, camera_pos, DISC_BILLBOARD_SCALE);
        let ps = config.black_hole.point_size;

        let diagnostics = Diagnostics::measure(camera_pos, hole, config.schwarzschild_radius());
        let warp = WarpUniforms::new(project_to_uv(view_proj, hole), &config.warp);
        let m = self.meshes;

        let passes = vec![
            Pass::new(
                "stars",
                RenderTarget::StarLayer,
                Draw::Stars {
                    mesh: m.stars,
                    view_proj,
                },
            )
            .clear(Vec4::ZERO)
            .depth(DepthMode::Ignore),
            Pass::new(
                "grid",
                RenderTarget::Screen,
                Draw::Lines {
                    mesh: m.grid,
                    mvp: view_proj,
                    color: GRID_COLOR,
                },
            )
            .clear(SCREEN_CLEAR),
            Pass::new(
                "accretion_disk",
                RenderTarget::Screen,
                Draw::Points {
                    mesh: m.disk,
                    mvp: view_proj,
                    point_size: ps * DISK_POINT_SCALE,
                },
            ),
            Pass::new(
                "photon_ring",
                RenderTarget::Screen,
                Draw::Points {
                    mesh: m.ring,
                    mvp: ring_mvp,
                    point_size: ps * RING_POINT_SCALE,
                },
            ),
            Pass::new(
                "black_hole_disc",
                RenderTarget::Screen,
                Draw::Points {
                    mesh: m.disc,
                    mvp: disc_mvp,
                    point_size: ps,
                },
            ),
            Pass::new("star_warp", RenderTarget::Screen, Draw::Warp(warp)).depth(DepthMode::Ignore),
            Pass::new(
                "black_hole_occluder",
                RenderTarget::Screen,
                Draw::Points {
                    mesh: m.disc,
                    mvp: disc_mvp,
                    point_size: ps,
                },
            )
            .depth(DepthMode::Ignore),
            Pass::new(
                "photon_ring_glow",
                RenderTarget::Screen,
                Draw::Points {
                    mesh: m.ring,
                    mvp: ring_mvp,
                    point_size: ps * GLOW_POINT_SCALE,
                },
            )
            .blend(BlendMode::Additive)
            .depth(DepthMode::TestEqual),
            Pass::new(
                "diagnostics",
                RenderTarget::Screen,
                Draw::Text {
                    points: overlay_points(&diagnostics),
                    point_size: TEXT_POINT_SIZE,
                },
            )
            .depth(DepthMode::Ignore),
        ];

        FramePlan {
            passes,
            diagnostics,
        }
    }

    /// Plan and execute one frame. Failed passes are logged and skipped.
    pub fn render_frame(&mut self, camera: &OrbitCamera) -> Diagnostics {
        let plan = self.plan_frame(camera);
        for pass in &plan.passes {
            if let Err(e) = self.backend.execute(pass) {
                log::warn!("Pass '{}' skipped: {}", pass.name, e);
            }
        }
        plan.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareBackend;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.black_hole.resolution = 32;
        config.ring.samples = 90;
        config.disk.radial_steps = 6;
        config.disk.angular_steps = 60;
        config.grid.half_extent = 6;
        config
    }

    fn renderer(width: u32, height: u32) -> SceneRenderer<SoftwareBackend> {
        let mut rng = StdRng::seed_from_u64(42);
        SceneRenderer::new(SoftwareBackend::new(width, height), small_config(), &mut rng)
    }

    #[test]
    fn test_pass_order_and_modes() {
        let r = renderer(64, 48);
        let plan = r.plan_frame(&OrbitCamera::default());
        let names: Vec<_> = plan.passes.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            [
                "stars",
                "grid",
                "accretion_disk",
                "photon_ring",
                "black_hole_disc",
                "star_warp",
                "black_hole_occluder",
                "photon_ring_glow",
                "diagnostics",
            ]
        );

        let by_name = |name: &str| plan.passes.iter().find(|p| p.name == name).unwrap();
        assert_eq!(by_name("stars").target, RenderTarget::StarLayer);
        assert_eq!(by_name("stars").clear, Some(Vec4::ZERO));
        assert_eq!(by_name("grid").clear, Some(SCREEN_CLEAR));
        assert_eq!(by_name("grid").depth, DepthMode::Test);
        assert_eq!(by_name("star_warp").depth, DepthMode::Ignore);
        assert_eq!(by_name("black_hole_occluder").depth, DepthMode::Ignore);
        assert_eq!(by_name("photon_ring_glow").blend, BlendMode::Additive);
        assert_eq!(by_name("photon_ring_glow").depth, DepthMode::TestEqual);
        assert!(plan.passes.iter().filter(|p| p.clear.is_some()).count() == 2);
    }

    #[test]
    fn test_point_sizes_follow_config() {
        let mut r = renderer(64, 48);
        r.apply(ConfigDelta::PointSize(2.0));
        let plan = r.plan_frame(&OrbitCamera::default());
        let size = |name: &str| match plan.passes.iter().find(|p| p.name == name).map(|p| &p.draw) {
            Some(Draw::Points { point_size, .. }) => *point_size,
            Some(Draw::Text { point_size, .. }) => *point_size,
            _ => panic!("no sized pass {}", name),
        };
        assert_eq!(size("accretion_disk"), 10.0);
        assert_eq!(size("photon_ring"), 8.0 * 0.95);
        assert_eq!(size("black_hole_disc"), 8.0);
        assert_eq!(size("photon_ring_glow"), 8.0 * 1.05);
        assert_eq!(size("diagnostics"), TEXT_POINT_SIZE);
    }

    #[test]
    fn test_resolution_change_regenerates_disc() {
        let mut r = renderer(64, 48);
        let disc = r.meshes().disc;
        assert_eq!(
            r.backend().vertex_count(disc),
            Some(generate_disc_fill(32, 0.65).len())
        );

        r.apply(ConfigDelta::Resolution(16));
        assert_eq!(r.config().black_hole.resolution, 48);
        assert_eq!(
            r.backend().vertex_count(disc),
            Some(generate_disc_fill(48, 0.65).len())
        );
    }

    #[test]
    fn test_diagnostics_follow_camera() {
        let r = renderer(64, 48);
        let mut camera = OrbitCamera::default();
        let near = r.plan_frame(&camera).diagnostics;
        camera.scroll(-10.0);
        let far = r.plan_frame(&camera).diagnostics;
        assert!(far.camera_distance > near.camera_distance);
        assert!(far.dilation_factor > near.dilation_factor);
        assert!(far.spatial_distortion < near.spatial_distortion);
    }

    #[test]
    fn test_zero_height_frame_does_not_panic() {
        let mut r = renderer(0, 0);
        let diag = r.render_frame(&OrbitCamera::default());
        assert!(diag.camera_distance.is_finite());
        assert!(r.backend().star_layer().is_none());
    }
}
