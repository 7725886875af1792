//! Temperature process control
//!
//! - [`pid`]: PID loop producing the heater duty
//! - [`process`]: ramp/soak execution of one recipe rest

pub mod pid;
pub mod process;

pub use pid::{Pid, PidMode};
pub use process::{CommandOutcome, ControlError, Phase, ProcessController, TickOutput};
