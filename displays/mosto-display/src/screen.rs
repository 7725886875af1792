//! Screen buffer
//!
//! Character-based buffer for the text-mode OLED.

use heapless::String;

/// Number of character rows (64 px / 8 px font)
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns (128 px / 6 px cell)
pub const SCREEN_COLS: usize = 21;

/// Row holding the state banner
pub const BANNER_ROW: usize = 0;

/// Row holding the keypad echo
pub const ECHO_ROW: usize = SCREEN_ROWS - 1;

/// One screen line
pub type Line = String<SCREEN_COLS>;

/// Screen buffer for the text-mode display
#[derive(Clone)]
pub struct Screen {
    lines: [Line; SCREEN_ROWS],
    /// Whether the screen needs to be redrawn
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            dirty: true,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.dirty = true;
    }

    /// Clear everything below the banner
    pub fn clear_body(&mut self) {
        for line in self.lines.iter_mut().skip(BANNER_ROW + 1) {
            line.clear();
        }
        self.dirty = true;
    }

    /// Set the content of a row, truncating at [`SCREEN_COLS`]
    pub fn set_line(&mut self, row: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            for ch in text.chars() {
                if line.push(ch).is_err() {
                    break;
                }
            }
            self.dirty = true;
        }
    }

    /// Get the content of a row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_line_truncates() {
        let mut screen = Screen::new();
        screen.set_line(2, "0123456789012345678901234");
        assert_eq!(screen.get_line(2), Some("012345678901234567890"));
        screen.set_line(SCREEN_ROWS, "off screen");
        assert_eq!(screen.get_line(SCREEN_ROWS), None);
    }

    #[test]
    fn test_clear_body_keeps_banner() {
        let mut screen = Screen::new();
        screen.set_line(BANNER_ROW, "IDLE");
        screen.set_line(3, "body");
        screen.set_line(ECHO_ROW, "Typed: 9");
        screen.mark_clean();

        screen.clear_body();
        assert!(screen.is_dirty());
        assert_eq!(screen.get_line(BANNER_ROW), Some("IDLE"));
        assert_eq!(screen.get_line(3), Some(""));
        assert_eq!(screen.get_line(ECHO_ROW), Some(""));

        screen.clear();
        assert!(screen.lines().all(|l| l.is_empty()));
    }
}
