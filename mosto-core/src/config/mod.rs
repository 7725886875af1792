//! Configuration types
//!
//! Controller tunables (PID gains, PWM resolution, task periods, bus
//! addresses). The firmware loads them from flash, from the embedded TOML
//! file, or falls back to [`ControllerConfig::default`].

pub mod timing;
pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;
