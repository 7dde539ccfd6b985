//! Keyboard mapping for the windowed viewer

use winit::keyboard::KeyCode;

use crate::glyph::GlyphTexture;
use crate::terminal::Action;

pub fn parse_key(key: KeyCode) -> Action {
    match key {
        KeyCode::Escape | KeyCode::KeyQ => Action::Quit,
        KeyCode::Space => Action::Pause,
        KeyCode::KeyR => Action::Reset,
        _ => Action::None,
    }
}

/// Copy the texture into an RGBA8 frame of the same size. Returns false,
/// leaving the frame untouched, when the sizes differ.
pub fn blit(texture: &GlyphTexture, frame: &mut [u8]) -> bool {
    let src = texture.as_bytes();
    if src.len() != frame.len() {
        return false;
    }
    frame.copy_from_slice(src);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::CharGrid;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key(KeyCode::Escape), Action::Quit);
        assert_eq!(parse_key(KeyCode::KeyQ), Action::Quit);
        assert_eq!(parse_key(KeyCode::Space), Action::Pause);
        assert_eq!(parse_key(KeyCode::KeyR), Action::Reset);
        assert_eq!(parse_key(KeyCode::ArrowUp), Action::None);
    }

    #[test]
    fn test_blit_checks_size() {
        let texture = GlyphTexture::from_grid(&CharGrid::new(2, 1));
        let mut frame = vec![7u8; 16 * 8 * 4];
        assert!(blit(&texture, &mut frame));
        assert_eq!(&frame[..], texture.as_bytes());

        let mut small = vec![7u8; 4];
        assert!(!blit(&texture, &mut small));
        assert_eq!(small, [7, 7, 7, 7]);
    }
}
