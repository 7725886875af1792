//! Input device implementations

pub mod matrix;

pub use matrix::{MatrixKeypad, KEYMAP};
