//! 4x4 matrix keypad
//!
//! Rows are driven low one at a time; columns are inputs with pull-ups, so a
//! pressed key reads low on its column while its row is selected.

use embedded_hal::digital::{InputPin, OutputPin};
use mosto_core::messages::Key;
use mosto_core::traits::KeyScanner;

/// Matrix rows
pub const ROWS: usize = 4;
/// Matrix columns
pub const COLS: usize = 4;

/// Legend of the standard 4x4 membrane keypad
pub const KEYMAP: [[char; COLS]; ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Matrix keypad scanner
pub struct MatrixKeypad<R, C> {
    rows: [R; ROWS],
    cols: [C; COLS],
    /// Key seen on the previous scan
    held: Option<Key>,
}

impl<R: OutputPin, C: InputPin> MatrixKeypad<R, C> {
    /// Create a scanner with every row released
    pub fn new(rows: [R; ROWS], cols: [C; COLS]) -> Self {
        let mut keypad = Self {
            rows,
            cols,
            held: None,
        };
        for row in keypad.rows.iter_mut() {
            let _ = row.set_high();
        }
        keypad
    }

    /// Return the key currently held down, if any
    ///
    /// Pin errors read as "not pressed".
    pub fn pressed(&mut self) -> Option<Key> {
        let mut found = None;
        for r in 0..ROWS {
            let _ = self.rows[r].set_low();
            for c in 0..COLS {
                if found.is_none() && self.cols[c].is_low().unwrap_or(false) {
                    found = Some(Key(KEYMAP[r][c]));
                }
            }
            let _ = self.rows[r].set_high();
        }
        found
    }
}

impl<R: OutputPin, C: InputPin> KeyScanner for MatrixKeypad<R, C> {
    fn scan(&mut self) -> Option<Key> {
        let current = self.pressed();
        let edge = if current != self.held { current } else { None };
        self.held = current;
        edge
    }
}
