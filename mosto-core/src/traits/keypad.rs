//! Keypad trait

use crate::messages::Key;

/// Trait for key matrices polled at a fixed period
pub trait KeyScanner {
    /// Scan once and return a newly pressed key
    ///
    /// A key held down across scans is reported only once.
    fn scan(&mut self) -> Option<Key>;
}
