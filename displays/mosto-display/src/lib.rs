//! Display abstraction and screen layouts for Mosto
//!
//! This crate provides:
//! - [`Screen`]: an 8x21 character buffer matching a 128x64 OLED with a
//!   6x8 font
//! - [`DisplayBackend`]: the interface a panel driver implements
//! - [`render`]: turns a [`DisplayCommand`](mosto_core::messages::DisplayCommand)
//!   into screen lines, and [`present`] pushes the buffer to a backend
//!
//! Row 0 is reserved for the state banner and row 7 doubles as the keypad
//! echo line.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod render;
pub mod screen;

pub use backend::{DisplayBackend, DisplayError};
pub use render::{present, render};
pub use screen::{Screen, BANNER_ROW, ECHO_ROW, SCREEN_COLS, SCREEN_ROWS};
