//! Embassy async tasks
//!
//! Each task runs independently and communicates via the shared channel set.

pub mod control;
pub mod display;
pub mod keypad;
pub mod logger;
pub mod navigation;
pub mod sensor;

pub use control::{control_task, Heater};
pub use display::{display_task, Panel};
pub use keypad::{keypad_task, Keypad};
pub use logger::logger_task;
pub use navigation::{navigation_task, StatusLights};
pub use sensor::{sensor_task, Probe};
