//! Default task periods and timeouts (milliseconds)

/// Control loop period
pub const CONTROL_TICK_MS: u32 = 100;

/// Status screen and log row cadence while a rest is active
pub const TELEMETRY_PERIOD_MS: u32 = 1000;

/// Keypad scan period
pub const KEYPAD_POLL_MS: u32 = 50;

/// Probe read period
pub const SENSOR_POLL_MS: u32 = 1000;

/// Idle time after which a partially typed input is discarded
pub const INPUT_TIMEOUT_MS: u32 = 3000;

/// How long the completion banner stays up before returning to idle
pub const FINISHED_MESSAGE_MS: u32 = 5000;
