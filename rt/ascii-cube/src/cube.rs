//! Character-cell rasterizer for spinning cubes
//!
//! Each cube face is sampled on a regular grid, rotated, perspective
//! projected into a fixed character grid and resolved with a 1/z buffer.

use nalgebra::{Rotation3, Vector3};

pub const GRID_WIDTH: usize = 160;
pub const GRID_HEIGHT: usize = 44;
pub const BACKGROUND: u8 = b'.';

/// Distance from the viewer to every cube centre
pub const CAMERA_DISTANCE: f32 = 100.0;
/// Projection scale
pub const K1: f32 = 40.0;
pub const SAMPLE_STEP: f32 = 0.6;

/// Face characters: front, right, left, back, bottom, top
pub const FACE_CHARS: [u8; 6] = [b'@', b'$', b'~', b'#', b';', b'+'];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub half_width: f32,
    /// Horizontal offset in character columns from the grid centre
    pub offset: f32,
}

pub const DEFAULT_CUBES: [Cube; 3] = [
    Cube {
        half_width: 20.0,
        offset: -40.0,
    },
    Cube {
        half_width: 10.0,
        offset: 10.0,
    },
    Cube {
        half_width: 5.0,
        offset: 40.0,
    },
];

/// Rotation angles shared by all cubes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Spin {
    pub fn advance(&mut self) {
        self.a += 0.05;
        self.b += 0.05;
        self.c += 0.01;
    }

    /// `Rz(-c) * Ry(-b) * Rx(-a)`
    pub fn rotation(&self) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), -self.c)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), -self.b)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), -self.a)
    }
}

/// Character buffer plus a depth buffer holding 1/z per cell
#[derive(Debug, Clone)]
pub struct CharGrid {
    width: usize,
    height: usize,
    chars: Vec<u8>,
    depth: Vec<f32>,
}

impl CharGrid {
    pub fn new(width: usize, height: usize) -> Self {
        CharGrid {
            width,
            height,
            chars: vec![BACKGROUND; width * height],
            depth: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.chars.fill(BACKGROUND);
        self.depth.fill(0.0);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.chars[y * self.width + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.chars[y * self.width..(y + 1) * self.width]
    }

    /// Write `ch` if the cell is inside the grid and nearer than what is
    /// there. Columns and rows are checked separately so an out-of-range
    /// column never wraps onto the neighbouring row.
    pub fn plot(&mut self, x: i32, y: i32, ooz: f32, ch: u8) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let idx = y as usize * self.width + x as usize;
        if ooz > self.depth[idx] {
            self.depth[idx] = ooz;
            self.chars[idx] = ch;
            true
        } else {
            false
        }
    }

    /// Rows joined with newlines, no trailing newline
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            out.extend(self.row(y).iter().map(|&c| c as char));
        }
        out
    }
}

impl Default for CharGrid {
    fn default() -> Self {
        CharGrid::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

/// Clear `grid` and draw every cube at the given spin
pub fn render_cubes(grid: &mut CharGrid, spin: &Spin, cubes: &[Cube]) {
    grid.clear();
    let rotation = spin.rotation();
    for cube in cubes {
        draw_cube(grid, &rotation, cube);
    }
}

fn draw_cube(grid: &mut CharGrid, rotation: &Rotation3<f32>, cube: &Cube) {
    let w = cube.half_width;
    let mut u = -w;
    while u < w {
        let mut v = -w;
        while v < w {
            let faces = [
                Vector3::new(u, v, -w),
                Vector3::new(w, v, u),
                Vector3::new(-w, v, -u),
                Vector3::new(-u, v, w),
                Vector3::new(u, -w, -v),
                Vector3::new(u, w, v),
            ];
            for (sample, &ch) in faces.iter().zip(FACE_CHARS.iter()) {
                project_sample(grid, rotation, cube.offset, sample, ch);
            }
            v += SAMPLE_STEP;
        }
        u += SAMPLE_STEP;
    }
}

fn project_sample(
    grid: &mut CharGrid,
    rotation: &Rotation3<f32>,
    offset: f32,
    sample: &Vector3<f32>,
    ch: u8,
) {
    // samples snap to integer lattice points before rotating
    let p = rotation * sample.map(f32::trunc);
    let ooz = 1.0 / (p.z + CAMERA_DISTANCE);
    let xp = (grid.width() / 2) as f32 + offset + K1 * ooz * p.x * 2.0;
    let yp = (grid.height() / 2) as f32 + K1 * ooz * p.y;
    grid.plot(xp as i32, yp as i32, ooz, ch);
}
