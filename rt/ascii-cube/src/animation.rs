//! Frame state shared by the window, terminal and debug front ends

use crate::cube::{render_cubes, CharGrid, Spin, DEFAULT_CUBES};
use crate::glyph::GlyphTexture;
use crate::terminal::Action;

pub struct CubeAnimation {
    grid: CharGrid,
    texture: GlyphTexture,
    spin: Spin,
    paused: bool,
}

impl CubeAnimation {
    pub fn new() -> Self {
        let grid = CharGrid::default();
        let texture = GlyphTexture::from_grid(&grid);
        CubeAnimation {
            grid,
            texture,
            spin: Spin::default(),
            paused: false,
        }
    }

    pub fn grid(&self) -> &CharGrid {
        &self.grid
    }

    pub fn texture(&self) -> &GlyphTexture {
        &self.texture
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Apply a key action; returns false when the viewer should quit
    pub fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => self.paused = !self.paused,
            Action::Reset => self.spin = Spin::default(),
            Action::None => {}
        }
        true
    }

    /// Rasterize the cubes at the current angles, then advance unless paused
    pub fn step(&mut self) {
        render_cubes(&mut self.grid, &self.spin, &DEFAULT_CUBES);
        if !self.paused {
            self.spin.advance();
        }
    }

    /// `step` plus a refresh of the glyph texture
    pub fn step_textured(&mut self) -> &GlyphTexture {
        self.step();
        self.texture.fill(&self.grid);
        &self.texture
    }

    pub fn status_line(&self, fps: f32) -> String {
        format!(
            "A: {:.2} B: {:.2} C: {:.2} | {:.0} FPS{} | [SPACE] Pause  [R]eset  [Q]uit",
            self.spin.a,
            self.spin.b,
            self.spin.c,
            fps,
            if self.paused { " (paused)" } else { "" }
        )
    }
}

impl Default for CubeAnimation {
    fn default() -> Self {
        CubeAnimation::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{GLYPH_H, GLYPH_W};

    #[test]
    fn test_step_advances_and_pause_freezes() {
        let mut anim = CubeAnimation::new();
        anim.step();
        assert!((anim.spin().a - 0.05).abs() < 1e-6);

        assert!(anim.handle(Action::Pause));
        assert!(anim.paused());
        anim.step();
        assert!((anim.spin().a - 0.05).abs() < 1e-6);
        assert!(anim.status_line(60.0).contains("(paused)"));
    }

    #[test]
    fn test_reset_and_quit() {
        let mut anim = CubeAnimation::new();
        anim.step();
        assert!(anim.handle(Action::Reset));
        assert_eq!(anim.spin(), Spin::default());
        assert!(!anim.handle(Action::Quit));
        assert!(anim.handle(Action::None));
    }

    #[test]
    fn test_step_textured_draws_front_face() {
        let mut anim = CubeAnimation::new();
        let texture = anim.step_textured();
        assert_eq!(texture.width(), 160 * GLYPH_W);
        assert_eq!(texture.height(), 44 * GLYPH_H);
        // '@' row 2 is 0x9D: leftmost pixel of the glyph at cell (40, 22) is lit
        let x = 40 * GLYPH_W;
        let y = 22 * GLYPH_H + 2;
        assert_eq!(texture.pixel(x, y), [255, 255, 255, 255]);
        assert_eq!(anim.grid().get(40, 22), Some(b'@'));
    }
}
