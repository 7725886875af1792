//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in mosto-core and mosto-display:
//!
//! - Temperature probe (remote MCU over I2C)
//! - Heater output (PWM into an SSR)
//! - Keypad (4x4 matrix)
//! - Display (SSD1306 128x64 OLED)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod heater;
pub mod input;
pub mod sensor;
