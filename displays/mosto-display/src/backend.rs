//! Display backend trait
//!
//! Defines the interface for panel drivers.

use core::future::Future;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus error talking to the panel
    Communication,
    /// Panel was not initialized
    NotInitialized,
}

/// Display backend trait
///
/// Drawing goes to a local frame buffer; [`DisplayBackend::flush`] sends it
/// to the panel.
pub trait DisplayBackend {
    /// Run the panel power-up sequence
    fn init(&mut self) -> impl Future<Output = Result<(), DisplayError>>;

    /// Blank the frame buffer
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at a character position
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number in characters (0-based)
    /// - `text`: ASCII text, clipped at the right edge
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Send the frame buffer to the panel
    fn flush(&mut self) -> impl Future<Output = Result<(), DisplayError>>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);
}
