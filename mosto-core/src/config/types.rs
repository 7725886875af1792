//! Configuration type definitions
//!
//! These types represent the controller configuration. Configuration is
//! stored in flash as postcard-serialized binary data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::timing;

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Default probe address on the two-wire bus
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x08;

/// PID gains
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain (per second)
    pub ki: f32,
    /// Derivative gain (seconds)
    pub kd: f32,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 30.0,
            ki: 5.0,
            kd: 0.5,
        }
    }
}

/// Heater output configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaterConfig {
    /// PWM resolution; output range is `0..=2^bits - 1`
    pub pwm_resolution_bits: u8,
    /// Half-width of the band around the target that starts the hold timer (°C)
    pub tolerance_band_c: f32,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            pwm_resolution_bits: 10,
            tolerance_band_c: 1.0,
        }
    }
}

impl HeaterConfig {
    /// Largest PWM count for the configured resolution
    pub fn max_duty(&self) -> u16 {
        let bits = self.pwm_resolution_bits.clamp(1, 16) as u32;
        ((1u32 << bits) - 1) as u16
    }
}

/// Task periods and UI timeouts (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Control loop period
    pub control_tick_ms: u32,
    /// Status/log cadence while a rest is active
    pub telemetry_ms: u32,
    /// Keypad scan period
    pub keypad_poll_ms: u32,
    /// Probe read period
    pub sensor_poll_ms: u32,
    /// Typed input discard timeout
    pub input_timeout_ms: u32,
    /// Completion banner duration
    pub finished_message_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            control_tick_ms: timing::CONTROL_TICK_MS,
            telemetry_ms: timing::TELEMETRY_PERIOD_MS,
            keypad_poll_ms: timing::KEYPAD_POLL_MS,
            sensor_poll_ms: timing::SENSOR_POLL_MS,
            input_timeout_ms: timing::INPUT_TIMEOUT_MS,
            finished_message_ms: timing::FINISHED_MESSAGE_MS,
        }
    }
}

/// Probe configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// 7-bit bus address of the remote probe
    pub i2c_address: u8,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            i2c_address: DEFAULT_SENSOR_ADDRESS,
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Layout version, checked on load
    pub version: u8,
    /// PID gains
    pub pid: PidGains,
    /// Heater output
    pub heater: HeaterConfig,
    /// Task periods
    pub timing: TimingConfig,
    /// Probe
    pub sensor: SensorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            pid: PidGains::default(),
            heater: HeaterConfig::default(),
            timing: TimingConfig::default(),
            sensor: SensorConfig::default(),
        }
    }
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Negative or non-finite PID gain
    InvalidGain,
    /// PWM resolution outside 1..=16 bits
    InvalidResolution,
    /// Tolerance band not strictly positive
    InvalidBand,
    /// A period or timeout of zero
    InvalidPeriod,
    /// Address outside the 7-bit range
    InvalidAddress,
}

impl ControllerConfig {
    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ValidationError> {
        let gains = [self.pid.kp, self.pid.ki, self.pid.kd];
        if gains.iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(ValidationError::InvalidGain);
        }
        if !(1..=16).contains(&self.heater.pwm_resolution_bits) {
            return Err(ValidationError::InvalidResolution);
        }
        if !(self.heater.tolerance_band_c.is_finite() && self.heater.tolerance_band_c > 0.0) {
            return Err(ValidationError::InvalidBand);
        }
        let t = &self.timing;
        let periods = [
            t.control_tick_ms,
            t.telemetry_ms,
            t.keypad_poll_ms,
            t.sensor_poll_ms,
            t.input_timeout_ms,
            t.finished_message_ms,
        ];
        if periods.contains(&0) {
            return Err(ValidationError::InvalidPeriod);
        }
        if self.sensor.i2c_address > 0x7F {
            return Err(ValidationError::InvalidAddress);
        }
        Ok(())
    }

    /// Serialize for flash storage
    #[cfg(feature = "serde")]
    pub fn to_bytes<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }

    /// Deserialize from flash storage
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ControllerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.heater.max_duty(), 1023);
        assert_eq!(config.sensor.i2c_address, 0x08);
    }

    #[test]
    fn test_max_duty_resolutions() {
        let mut heater = HeaterConfig::default();
        heater.pwm_resolution_bits = 8;
        assert_eq!(heater.max_duty(), 255);
        heater.pwm_resolution_bits = 16;
        assert_eq!(heater.max_duty(), u16::MAX);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ControllerConfig::default();
        config.pid.ki = -1.0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidGain));

        let mut config = ControllerConfig::default();
        config.heater.pwm_resolution_bits = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidResolution));

        let mut config = ControllerConfig::default();
        config.heater.tolerance_band_c = 0.0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidBand));

        let mut config = ControllerConfig::default();
        config.timing.control_tick_ms = 0;
        assert_eq!(config.validate(), Err(ValidationError::InvalidPeriod));

        let mut config = ControllerConfig::default();
        config.sensor.i2c_address = 0x80;
        assert_eq!(config.validate(), Err(ValidationError::InvalidAddress));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = ControllerConfig::default();
        let mut buf = [0u8; 128];
        let used = config.to_bytes(&mut buf).unwrap();
        let back = ControllerConfig::from_bytes(used).unwrap();
        assert_eq!(back, config);
    }
}
