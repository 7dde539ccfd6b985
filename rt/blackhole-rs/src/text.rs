//! 5x7 bitmap text rendered as one point per lit pixel.
//!
//! Positions are normalized screen coordinates with a bottom-left origin;
//! `origin_y` is the top row of the glyph and rows grow downward.

use glam::Vec3;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::physics::Diagnostics;

pub type Glyph = [u8; 7];

pub const GLYPH_COLUMNS: u32 = 5;
pub const CELL_WIDTH: f32 = 0.04;
pub const CELL_HEIGHT: f32 = 0.06;
/// Horizontal advance as a multiple of the cell width
pub const ADVANCE: f32 = 1.08;

pub const OVERLAY_ORIGIN_X: f32 = 0.02;
pub const OVERLAY_LINE_Y: [f32; 3] = [0.95, 0.86, 0.77];
pub const OVERLAY_SCALE: f32 = 0.9;
pub const OVERLAY_COLOR: Vec3 = Vec3::new(1.0, 0.8, 0.6);

/// Rows top to bottom, 5 significant bits each, MSB is the leftmost column
const FONT_5X7: [(char, Glyph); 95] = [
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('!', [0x04, 0x04, 0x04, 0x04, 0x00, 0x00, 0x04]),
    ('"', [0x0a, 0x0a, 0x0a, 0x00, 0x00, 0x00, 0x00]),
    ('#', [0x0a, 0x0a, 0x1f, 0x0a, 0x1f, 0x0a, 0x0a]),
    ('$', [0x04, 0x0f, 0x14, 0x0e, 0x05, 0x1e, 0x04]),
    ('%', [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03]),
    ('&', [0x0c, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0d]),
    ('\'', [0x06, 0x06, 0x02, 0x00, 0x00, 0x00, 0x00]),
    ('(', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    (')', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    ('*', [0x00, 0x04, 0x15, 0x0e, 0x15, 0x04, 0x00]),
    ('+', [0x00, 0x04, 0x04, 0x1f, 0x04, 0x04, 0x00]),
    (',', [0x00, 0x00, 0x00, 0x00, 0x06, 0x06, 0x02]),
    ('-', [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x06, 0x06, 0x00]),
    ('/', [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00]),
    ('0', [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e]),
    ('1', [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('2', [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f]),
    ('3', [0x0e, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0e]),
    ('4', [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02]),
    ('5', [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e]),
    ('6', [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e]),
    ('7', [0x1f, 0x11, 0x02, 0x04, 0x04, 0x04, 0x04]),
    ('8', [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e]),
    ('9', [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x1c]),
    (':', [0x00, 0x00, 0x06, 0x06, 0x00, 0x06, 0x06]),
    (';', [0x00, 0x00, 0x06, 0x06, 0x00, 0x06, 0x02]),
    ('<', [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02]),
    ('=', [0x00, 0x00, 0x1f, 0x00, 0x1f, 0x00, 0x00]),
    ('>', [0x10, 0x08, 0x04, 0x02, 0x04, 0x08, 0x10]),
    ('?', [0x0e, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04]),
    ('@', [0x0e, 0x11, 0x15, 0x15, 0x1d, 0x10, 0x0e]),
    ('A', [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('B', [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e]),
    ('C', [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e]),
    ('D', [0x1c, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1c]),
    ('E', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f]),
    ('F', [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10]),
    ('G', [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0f]),
    ('H', [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('I', [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0c]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f]),
    ('M', [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11]),
    ('O', [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('P', [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10]),
    ('Q', [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d]),
    ('R', [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11]),
    ('S', [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e]),
    ('T', [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0a, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x1b, 0x11]),
    ('X', [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x11, 0x0a, 0x04, 0x04, 0x04]),
    ('Z', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f]),
    ('[', [0x0e, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0e]),
    ('\\', [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00]),
    (']', [0x0e, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0e]),
    ('^', [0x04, 0x0a, 0x11, 0x00, 0x00, 0x00, 0x00]),
    ('_', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1f]),
    ('`', [0x06, 0x06, 0x02, 0x00, 0x00, 0x00, 0x00]),
    ('a', [0x00, 0x00, 0x0e, 0x01, 0x0f, 0x11, 0x0f]),
    ('b', [0x10, 0x10, 0x1e, 0x11, 0x11, 0x11, 0x1e]),
    ('c', [0x00, 0x00, 0x0e, 0x11, 0x10, 0x11, 0x0e]),
    ('d', [0x01, 0x01, 0x0f, 0x11, 0x11, 0x11, 0x0f]),
    ('e', [0x00, 0x00, 0x0e, 0x11, 0x1f, 0x10, 0x0e]),
    ('f', [0x06, 0x08, 0x1e, 0x08, 0x08, 0x08, 0x08]),
    ('g', [0x00, 0x00, 0x0f, 0x11, 0x11, 0x0f, 0x01]),
    ('h', [0x10, 0x10, 0x1e, 0x11, 0x11, 0x11, 0x11]),
    ('i', [0x04, 0x00, 0x0c, 0x04, 0x04, 0x04, 0x0e]),
    ('j', [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0c]),
    ('k', [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12]),
    ('l', [0x0c, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('m', [0x00, 0x00, 0x1a, 0x15, 0x15, 0x11, 0x11]),
    ('n', [0x00, 0x00, 0x1e, 0x11, 0x11, 0x11, 0x11]),
    ('o', [0x00, 0x00, 0x0e, 0x11, 0x11, 0x11, 0x0e]),
    ('p', [0x00, 0x00, 0x1e, 0x11, 0x11, 0x1e, 0x10]),
    ('q', [0x00, 0x00, 0x0f, 0x11, 0x11, 0x0f, 0x01]),
    ('r', [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10]),
    ('s', [0x00, 0x00, 0x0f, 0x10, 0x0e, 0x01, 0x1e]),
    ('t', [0x08, 0x08, 0x1e, 0x08, 0x08, 0x08, 0x06]),
    ('u', [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0d]),
    ('v', [0x00, 0x00, 0x11, 0x11, 0x11, 0x0a, 0x04]),
    ('w', [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0a]),
    ('x', [0x00, 0x00, 0x11, 0x0a, 0x04, 0x0a, 0x11]),
    ('y', [0x00, 0x00, 0x11, 0x11, 0x0f, 0x01, 0x0e]),
    ('z', [0x00, 0x00, 0x1f, 0x02, 0x04, 0x08, 0x1f]),
    ('{', [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02]),
    ('|', [0x04, 0x04, 0x04, 0x00, 0x04, 0x04, 0x04]),
    ('}', [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08]),
    ('~', [0x08, 0x15, 0x02, 0x00, 0x00, 0x00, 0x00]),
];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextPoint {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

fn glyphs() -> &'static HashMap<char, Glyph> {
    static GLYPHS: OnceLock<HashMap<char, Glyph>> = OnceLock::new();
    GLYPHS.get_or_init(|| FONT_5X7.iter().copied().collect())
}

/// Bitmap for `c`, or `None` for characters outside printable ASCII
pub fn glyph(c: char) -> Option<&'static Glyph> {
    glyphs().get(&c)
}

pub fn layout_text(
    text: &str,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    color: Vec3,
) -> Vec<TextPoint> {
    let cw = CELL_WIDTH * scale;
    let ch = CELL_HEIGHT * scale;
    let px = cw / 6.0;
    let py = ch / 8.0;
    let color = [color.x, color.y, color.z, 1.0];

    let mut points = Vec::new();
    for (ci, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let cell_x = origin_x + ci as f32 * ADVANCE * cw;
        for (row, &bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_COLUMNS {
                if (bits >> (GLYPH_COLUMNS - 1 - col)) & 1 == 0 {
                    continue;
                }
                points.push(TextPoint {
                    position: [cell_x + col as f32 * px, origin_y - row as f32 * py],
                    color,
                });
            }
        }
    }
    points
}

/// Dots for the three diagnostic lines in the top-left corner
pub fn overlay_points(diagnostics: &Diagnostics) -> Vec<TextPoint> {
    diagnostics
        .lines()
        .iter()
        .zip(OVERLAY_LINE_Y)
        .flat_map(|(line, y)| layout_text(line, OVERLAY_ORIGIN_X, y, OVERLAY_SCALE, OVERLAY_COLOR))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> usize {
        glyph(c)
            .map(|g| g.iter().map(|row| row.count_ones() as usize).sum())
            .unwrap_or(0)
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(layout_text("", 0.0, 0.0, 1.0, Vec3::ONE).is_empty());
        assert!(layout_text("   ", 0.0, 0.0, 1.0, Vec3::ONE).is_empty());
    }

    #[test]
    fn test_glyph_table_covers_printable_ascii() {
        for c in ' '..='~' {
            let g = glyph(c).unwrap_or_else(|| panic!("missing glyph {:?}", c));
            assert!(g.iter().all(|row| *row < 0x20), "glyph {:?} wider than 5", c);
        }
        assert!(glyph('\u{e9}').is_none());
        assert!(glyph('\n').is_none());
    }

    #[test]
    fn test_unknown_characters_render_blank() {
        let known = layout_text("A", 0.0, 0.0, 1.0, Vec3::ONE);
        let mixed = layout_text("\u{3bb}A", 0.0, 0.0, 1.0, Vec3::ONE);
        assert_eq!(known.len(), mixed.len());
        // the unknown character still occupies its cell
        let shift = ADVANCE * CELL_WIDTH;
        assert!((mixed[0].position[0] - known[0].position[0] - shift).abs() < 1e-6);
    }

    #[test]
    fn test_layout_point_positions() {
        // '-' is a single full row at row 3
        let pts = layout_text("-", 0.5, 0.5, 1.0, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(pts.len(), 5);
        let px = CELL_WIDTH / 6.0;
        let py = CELL_HEIGHT / 8.0;
        for (col, p) in pts.iter().enumerate() {
            assert!((p.position[0] - (0.5 + col as f32 * px)).abs() < 1e-6);
            assert!((p.position[1] - (0.5 - 3.0 * py)).abs() < 1e-6);
            assert_eq!(p.color, [1.0, 0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_msb_is_leftmost_column() {
        // row 0 of 'L' only has the leftmost bit set
        let pts = layout_text("L", 0.0, 1.0, 1.0, Vec3::ONE);
        let top: Vec<_> = pts.iter().filter(|p| (p.position[1] - 1.0).abs() < 1e-6).collect();
        assert_eq!(top.len(), 1);
        assert!(top[0].position[0].abs() < 1e-6);
    }

    #[test]
    fn test_layout_counts_and_determinism() {
        let text = "CamDist: 3.5112";
        let a = layout_text(text, 0.02, 0.95, 0.9, OVERLAY_COLOR);
        let b = layout_text(text, 0.02, 0.95, 0.9, OVERLAY_COLOR);
        assert_eq!(a, b);
        assert_eq!(a.len(), text.chars().map(lit).sum::<usize>());
    }

    #[test]
    fn test_overlay_lines_are_stacked() {
        let diag = Diagnostics::measure(Vec3::new(3.5, 0.0, 0.0), Vec3::new(0.0, -0.28, 0.0), 0.585);
        let pts = overlay_points(&diag);
        let expected: usize = diag
            .lines()
            .iter()
            .map(|line| line.chars().map(lit).sum::<usize>())
            .sum();
        assert_eq!(pts.len(), expected);
        assert!(pts.iter().all(|p| p.position[1] <= 0.95 + 1e-6 && p.position[1] > 0.7));
    }
}
