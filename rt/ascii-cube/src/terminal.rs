//! Terminal presentation and keyboard input

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::time::Duration;

use crate::cube::CharGrid;

/// Alternate-screen display; the grid is cropped to the terminal and a
/// status line is drawn under it
pub struct TerminalDisplay {
    width: u16,
    height: u16,
    buffer: BufWriter<Stdout>,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;
        Ok(Self {
            width,
            height: height.saturating_sub(1),
            buffer: BufWriter::new(stdout),
        })
    }

    /// Re-read the terminal size; true if it changed
    pub fn check_resize(&mut self) -> bool {
        if let Ok((width, height)) = terminal::size() {
            let height = height.saturating_sub(1);
            if width != self.width || height != self.height {
                self.width = width;
                self.height = height;
                return true;
            }
        }
        false
    }

    pub fn render(&mut self, grid: &CharGrid, status: &str) -> io::Result<()> {
        // hide cursor, disable line wrap
        write!(self.buffer, "\x1b[?25l\x1b[?7l")?;

        let lines = visible_lines(grid, self.width as usize, self.height as usize);
        for (i, line) in lines.iter().enumerate() {
            write!(self.buffer, "\x1b[{};1H{}", i + 1, line)?;
        }
        write!(self.buffer, "\x1b[J")?;
        write!(self.buffer, "\x1b[{};1H\x1b[K{}", lines.len() + 1, status)?;

        write!(self.buffer, "\x1b[?25h\x1b[?7h")?;
        self.buffer.flush()
    }

    /// Wait up to `timeout` for a key press
    pub fn poll_input(&self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    return Ok(Some(key_event));
                }
            }
        }
        Ok(None)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = self.buffer.flush();
        let _ = execute!(stdout(), LeaveAlternateScreen);
    }
}

/// Grid rows cropped to `width` columns and `height` rows
pub fn visible_lines(grid: &CharGrid, width: usize, height: usize) -> Vec<String> {
    (0..grid.height().min(height))
        .map(|y| {
            grid.row(y)
                .iter()
                .take(width)
                .map(|&c| c as char)
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    None,
    Quit,
    Pause,
    Reset,
}

pub fn parse_key_event(event: KeyEvent) -> Action {
    match event.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char(' ') => Action::Pause,
        KeyCode::Char('r') => Action::Reset,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_parse_key_event_quit() {
        let event = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Quit);
    }

    #[test]
    fn test_parse_key_event_escape() {
        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Quit);
    }

    #[test]
    fn test_parse_key_event_pause() {
        let event = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Pause);
    }

    #[test]
    fn test_parse_key_event_reset() {
        let event = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::Reset);
    }

    #[test]
    fn test_parse_key_event_none() {
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        assert_eq!(parse_key_event(event), Action::None);
    }

    #[test]
    fn test_visible_lines_crop() {
        let grid = CharGrid::new(10, 5);
        let lines = visible_lines(&grid, 4, 3);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l == "...."));

        let wide = visible_lines(&grid, 200, 200);
        assert_eq!(wide.len(), 5);
        assert_eq!(wide[0].len(), 10);
    }
}
