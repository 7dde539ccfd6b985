use winit::keyboard::KeyCode;

use crate::config::{ConfigDelta, POINT_SIZE_STEP, RESOLUTION_STEP};

/// Keyboard actions understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    ToggleAutoRotate,
    ResolutionUp,
    ResolutionDown,
    PointSizeUp,
    PointSizeDown,
}

impl Action {
    /// The scene tunable change this action requests, if any
    pub fn config_delta(self) -> Option<ConfigDelta> {
        match self {
            Action::ResolutionUp => Some(ConfigDelta::Resolution(RESOLUTION_STEP)),
            Action::ResolutionDown => Some(ConfigDelta::Resolution(-RESOLUTION_STEP)),
            Action::PointSizeUp => Some(ConfigDelta::PointSize(POINT_SIZE_STEP)),
            Action::PointSizeDown => Some(ConfigDelta::PointSize(-POINT_SIZE_STEP)),
            _ => None,
        }
    }

    /// Resolution and point size follow key repeat; toggles and quit fire once
    pub fn repeats(self) -> bool {
        self.config_delta().is_some()
    }
}

pub fn parse_key(key: KeyCode) -> Action {
    match key {
        KeyCode::Escape => Action::Quit,
        KeyCode::KeyR => Action::ToggleAutoRotate,
        KeyCode::ArrowUp => Action::ResolutionUp,
        KeyCode::ArrowDown => Action::ResolutionDown,
        KeyCode::NumpadAdd | KeyCode::Equal => Action::PointSizeUp,
        KeyCode::NumpadSubtract | KeyCode::Minus => Action::PointSizeDown,
        _ => Action::None,
    }
}

/// Mouse input in window pixels, decoupled from the windowing backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { x: f64, y: f64 },
    Released,
    Moved { x: f64, y: f64 },
    /// Scroll wheel, positive away from the user
    Scrolled { lines: f32 },
}
