//! Procedural point clouds and the lensed background grid
//!
//! Everything here runs once at scene setup. The disc fill and the grid are
//! deterministic; the ring and the accretion disk take an RNG for their
//! radial jitter.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Number of equal radial steps across the photon ring (7 radial stops)
pub const RING_RADIAL_STEPS: u32 = 6;
/// Z offset of the disc fill in billboard space, keeps it in front of the ring
pub const DISC_DEPTH_OFFSET: f32 = 0.01;
/// Vertical offset of the grid plane below the origin
pub const GRID_Y_OFFSET: f32 = 0.28;

const RING_JITTER: f32 = 0.004;
const DISK_JITTER: f32 = 0.003;
const GRID_SOFTENING: f32 = 0.08;
const GRID_DECAY: f32 = 0.6;

const RING_INNER_COLOR: Vec3 = Vec3::new(1.0, 0.55, 0.08);
const RING_OUTER_COLOR: Vec3 = Vec3::new(1.0, 0.12, 0.02);
const DISK_INNER_COLOR: Vec3 = Vec3::new(0.96, 0.12, 0.03);
const DISK_OUTER_COLOR: Vec3 = Vec3::new(1.0, 0.78, 0.18);

/// One coloured point ("pixel") of a point cloud
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Point {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Point {
    pub fn new(position: Vec3, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            color: [color.x, color.y, color.z, alpha],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// A named, immutable point buffer
#[derive(Debug, Clone)]
pub struct PointSet {
    pub name: &'static str,
    pub points: Vec<Point>,
}

impl PointSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Background wireframe sagging into a gravity well
#[derive(Debug, Clone)]
pub struct LensedGrid {
    pub vertices: Vec<Vec3>,
    /// Pairs of vertex indices, one pair per line segment
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color: Vec3,
    /// Sprite size in pixels
    pub size: f32,
}

pub fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Hermite smoothstep, matching the GLSL builtin
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fill a disc of `radius` with opaque black points sampled on a
/// `resolution x resolution` grid of cell centres.
pub fn generate_disc_fill(resolution: u32, radius: f32) -> PointSet {
    let res = resolution as f32;
    let mut points = Vec::with_capacity((std::f32::consts::FRAC_PI_4 * res * res) as usize + 1);

    for j in 0..resolution {
        for i in 0..resolution {
            let u = (i as f32 + 0.5) / res * 2.0 - 1.0;
            let v = (j as f32 + 0.5) / res * 2.0 - 1.0;
            let x = u * radius;
            let y = v * radius;
            if (x * x + y * y).sqrt() <= radius {
                points.push(Point::new(
                    Vec3::new(x, y, DISC_DEPTH_OFFSET),
                    Vec3::ZERO,
                    1.0,
                ));
            }
        }
    }

    PointSet {
        name: "black_hole_disc",
        points,
    }
}

/// Billboard-local photon ring between `inner` and `outer`
pub fn generate_ring_annulus<R: Rng + ?Sized>(
    inner: f32,
    outer: f32,
    samples: u32,
    rng: &mut R,
) -> PointSet {
    let span = (outer - inner).max(f32::EPSILON);
    let radial_step = (outer - inner) / RING_RADIAL_STEPS as f32;
    let capacity = (samples as usize).checked_mul(RING_RADIAL_STEPS as usize + 1);
    let mut points = Vec::with_capacity(capacity.unwrap_or(0));

    for s in 0..samples {
        let angle = (s as f32 + 0.5) / samples as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        for step in 0..=RING_RADIAL_STEPS {
            let r = inner + step as f32 * radial_step;
            let rr = r + rng.gen_range(-0.5f32..0.5) * RING_JITTER;
            let t = (rr - inner) / span;
            let color = mix(RING_INNER_COLOR, RING_OUTER_COLOR, t);
            let alpha = 0.95 * (0.6 + 0.6 * (1.0 - (t - 0.5).abs()));
            points.push(Point::new(Vec3::new(cos * rr, sin * rr, 0.0), color, alpha));
        }
    }

    PointSet {
        name: "photon_ring",
        points,
    }
}

/// World-space horizontal accretion disk, three layers thick, centred on `plane_y`
pub fn generate_disk_annulus<R: Rng + ?Sized>(
    inner: f32,
    outer: f32,
    thickness: f32,
    radial_steps: u32,
    angular_steps: u32,
    plane_y: f32,
    rng: &mut R,
) -> PointSet {
    let layer = thickness * 0.35;
    let capacity = (radial_steps as usize)
        .checked_mul(angular_steps as usize)
        .and_then(|n| n.checked_mul(3));
    let mut points = Vec::with_capacity(capacity.unwrap_or(0));

    for ri in 0..radial_steps {
        let t = (ri as f32 + 0.5) / radial_steps as f32;
        let r = inner + (outer - inner) * t;
        for ai in 0..angular_steps {
            let angle = (ai as f32 + 0.5) / angular_steps as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            let rr = r + rng.gen_range(-0.5f32..0.5) * DISK_JITTER;
            let radial_norm = smoothstep(inner, outer, rr);
            let color = mix(DISK_INNER_COLOR, DISK_OUTER_COLOR, radial_norm);
            let alpha = 0.92 * (0.6 + 0.6 * radial_norm);
            for yi in 0..3 {
                let y = plane_y - layer + yi as f32 * layer;
                points.push(Point::new(Vec3::new(cos * rr, y, sin * rr), color, alpha));
            }
        }
    }

    PointSet {
        name: "accretion_disk",
        points,
    }
}

/// Height of the grid surface at planar distance `r` from the well
pub fn grid_sag(r: f32, mass_scale: f32) -> f32 {
    let a = 0.45 * mass_scale;
    -a / (r + GRID_SOFTENING) * (-r * GRID_DECAY).exp() - GRID_Y_OFFSET
}

/// Square lattice of `(2 * half_extent + 1)^2` vertices, wired to its
/// right and lower neighbours only.
pub fn generate_lensed_grid(half_extent: u32, spacing: f32, mass_scale: f32) -> LensedGrid {
    let h = half_extent as i64;
    let n = 2 * half_extent as usize + 1;
    let mut vertices = Vec::with_capacity(n.checked_mul(n).unwrap_or(0));

    for z in -h..=h {
        for x in -h..=h {
            let fx = x as f32 * spacing;
            let fz = z as f32 * spacing;
            let r = (fx * fx + fz * fz).sqrt();
            vertices.push(Vec3::new(fx, grid_sag(r, mass_scale), fz));
        }
    }

    let edges = n.checked_mul(n - 1).and_then(|e| e.checked_mul(4));
    let mut indices: Vec<u32> = Vec::with_capacity(edges.unwrap_or(0));
    for z in 0..n {
        for x in 0..n {
            let i = z * n + x;
            if x < n - 1 {
                indices.extend_from_slice(&[i as u32, (i + 1) as u32]);
            }
            if z < n - 1 {
                indices.extend_from_slice(&[i as u32, (i + n) as u32]);
            }
        }
    }

    LensedGrid { vertices, indices }
}

/// The two background stars of the fixed scene
pub fn default_stars() -> Vec<Star> {
    vec![
        Star {
            position: Vec3::new(-3.8, 0.9, -7.8),
            color: Vec3::new(1.0, 0.66, 0.32),
            size: 72.0,
        },
        Star {
            position: Vec3::new(4.2, 0.7, -8.3),
            color: Vec3::new(1.0, 0.18, 0.08),
            size: 84.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_disc_fill_stays_inside_radius() {
        for res in [1, 2, 7, 16, 64, 128] {
            let set = generate_disc_fill(res, 0.65);
            for p in &set.points {
                let [x, y, _] = p.position;
                assert!(x * x + y * y <= 0.65 * 0.65 + 1e-6);
            }
        }
    }

    #[test]
    fn test_disc_fill_count_converges() {
        let res = 256;
        let set = generate_disc_fill(res, 1.0);
        let expected = std::f32::consts::FRAC_PI_4 * (res * res) as f32;
        let rel = (set.len() as f32 - expected).abs() / expected;
        assert!(rel < 0.01, "count {} vs expected {}", set.len(), expected);
    }

    #[test]
    fn test_disc_fill_is_deterministic_and_opaque_black() {
        let a = generate_disc_fill(48, 0.5);
        let b = generate_disc_fill(48, 0.5);
        assert_eq!(a.points, b.points);
        assert!(a
            .points
            .iter()
            .all(|p| p.color == [0.0, 0.0, 0.0, 1.0] && p.position[2] == DISC_DEPTH_OFFSET));
    }

    #[test]
    fn test_ring_annulus_statistics() {
        let mut rng = StdRng::seed_from_u64(7);
        let (inner, outer) = (0.52, 0.6175);
        let set = generate_ring_annulus(inner, outer, 720, &mut rng);
        assert_eq!(set.len(), 720 * 7);

        let mut sum = 0.0;
        for p in &set.points {
            let r = p.position().truncate().length();
            assert!(r >= inner - 0.0021 && r <= outer + 0.0021);
            assert!(p.color[3] > 0.0 && p.color[3] <= 0.95 * 1.2 + 1e-4);
            assert_eq!(p.position[2], 0.0);
            sum += r;
        }
        let mean = sum / set.len() as f32;
        assert!((mean - (inner + outer) * 0.5).abs() < 0.002);
    }

    #[test]
    fn test_ring_alpha_peaks_at_midpoint() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = generate_ring_annulus(1.0, 2.0, 4, &mut rng);
        // per angle: stops 0..=6, stop 3 is the midpoint
        let mid = set.points[3].color[3];
        let edge = set.points[0].color[3];
        assert!(mid > edge);
        assert!(set.points[0].color[1] > set.points[6].color[1]);
    }

    #[test]
    fn test_disk_annulus_layers_and_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = generate_disk_annulus(0.5, 0.95, 0.04, 36, 360, -0.28, &mut rng);
        assert_eq!(set.len(), 36 * 360 * 3);

        let layer = 0.04 * 0.35;
        for cell in set.points.chunks(3) {
            assert!((cell[0].position[1] - (-0.28 - layer)).abs() < 1e-6);
            assert!((cell[1].position[1] - -0.28).abs() < 1e-6);
            assert!((cell[2].position[1] - (-0.28 + layer)).abs() < 1e-6);
            let r0 = Vec3::new(cell[0].position[0], 0.0, cell[0].position[2]).length();
            let r2 = Vec3::new(cell[2].position[0], 0.0, cell[2].position[2]).length();
            assert!((r0 - r2).abs() < 1e-6);
            assert!(r0 >= 0.5 - 0.0016 && r0 <= 0.95 + 0.0016);
        }
    }

    #[test]
    fn test_disk_alpha_grows_outward() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = generate_disk_annulus(0.5, 0.95, 0.04, 10, 8, 0.0, &mut rng);
        let first = set.points.first().unwrap();
        let last = set.points.last().unwrap();
        assert!(last.color[3] > first.color[3]);
        assert!(last.color[1] > first.color[1]);
    }

    #[test]
    fn test_grid_topology() {
        let grid = generate_lensed_grid(28, 0.12, 3.2);
        let n = 57u32;
        assert_eq!(grid.vertices.len(), (n * n) as usize);
        assert_eq!(grid.indices.len(), (2 * 2 * n * (n - 1)) as usize);

        for pair in grid.indices.chunks(2) {
            let (a, b) = (pair[0], pair[1]);
            let (ax, az) = (a % n, a / n);
            let (bx, bz) = (b % n, b / n);
            let horizontal = az == bz && bx == ax + 1;
            let vertical = ax == bx && bz == az + 1;
            assert!(horizontal ^ vertical, "diagonal or invalid edge {}-{}", a, b);
        }
    }

    #[test]
    fn test_grid_well_deepens_toward_center() {
        let grid = generate_lensed_grid(10, 0.12, 3.2);
        let n = 21usize;
        let center = grid.vertices[10 * n + 10];
        let edge = grid.vertices[10 * n + 20];
        assert!(center.y < edge.y);
        assert!((center.y - grid_sag(0.0, 3.2)).abs() < 1e-6);

        let mut last = f32::NEG_INFINITY;
        for x in 10..n {
            let y = grid.vertices[10 * n + x].y;
            assert!(y > last);
            last = y;
        }
    }

    #[test]
    fn test_default_stars() {
        let stars = default_stars();
        assert_eq!(stars.len(), 2);
        assert!(stars.iter().all(|s| s.position.z < 0.0 && s.size > 0.0));
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
