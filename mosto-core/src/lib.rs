//! Board-agnostic core logic for the brewing controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Recipe catalog and message payloads
//! - Inter-task channel context
//! - Process control (PID, ramp/soak step timing)
//! - Navigation statechart and keypad routing
//! - Telemetry log rows
//! - Configuration type definitions
//! - Hardware abstraction traits

#![no_std]
#![deny(unsafe_code)]

pub mod channels;
pub mod config;
pub mod control;
pub mod messages;
pub mod nav;
pub mod recipe;
pub mod statechart;
pub mod telemetry;
pub mod traits;
