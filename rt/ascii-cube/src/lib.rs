//! Spinning ASCII cubes
//!
//! Three cubes are rasterized into a 160x44 character grid with a 1/z
//! buffer and expanded into an RGBA texture of 8x8 glyphs shown in a
//! window. The grid can also be drawn straight to the terminal.

pub mod animation;
pub mod cube;
pub mod glyph;
pub mod terminal;
pub mod window;

pub use animation::CubeAnimation;
pub use cube::{render_cubes, CharGrid, Cube, Spin, DEFAULT_CUBES};
pub use glyph::GlyphTexture;
pub use terminal::TerminalDisplay;

/// Frames per second the interactive loop aims for
pub const TARGET_FPS: u32 = 60;
