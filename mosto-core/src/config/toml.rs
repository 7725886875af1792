//! Minimal TOML reader for the controller configuration
//!
//! Handles only the subset used by `brewer.toml`. It does NOT support the
//! full TOML grammar.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs with integer (decimal or `0x` hex) and float values
//! - Comments (`# ...`), including trailing comments
//!
//! Keys that are not present keep their default values.

use super::types::ControllerConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not a `key = value` pair
    InvalidLine,
    /// Key not recognized in its section
    UnknownKey,
    /// Value could not be parsed as the expected type
    InvalidValue,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Pid,
    Heater,
    Timing,
    Sensor,
}

/// Parse TOML text into a configuration, starting from the defaults
pub fn parse_config(input: &str) -> Result<ControllerConfig, ParseError> {
    let mut config = ControllerConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "pid" => Ok(Section::Pid),
        "heater" => Ok(Section::Heater),
        "timing" => Ok(Section::Timing),
        "sensor" => Ok(Section::Sensor),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let digits = strip_underscores(value);
    let parsed = match digits.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse::<u32>(),
    };
    let parsed = parsed.map_err(|_| ParseError::InvalidValue)?;
    T::try_from(parsed).map_err(|_| ParseError::InvalidValue)
}

/// Drop `_` digit separators (`3_000`)
fn strip_underscores(value: &str) -> heapless::String<16> {
    let mut out = heapless::String::new();
    for ch in value.chars().filter(|c| *c != '_') {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

fn apply_value(
    config: &mut ControllerConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Pid, "kp") => config.pid.kp = parse_float(value)?,
        (Section::Pid, "ki") => config.pid.ki = parse_float(value)?,
        (Section::Pid, "kd") => config.pid.kd = parse_float(value)?,

        (Section::Heater, "pwm_resolution_bits") => {
            config.heater.pwm_resolution_bits = parse_int(value)?
        }
        (Section::Heater, "tolerance_band_c") => {
            config.heater.tolerance_band_c = parse_float(value)?
        }

        (Section::Timing, "control_tick_ms") => config.timing.control_tick_ms = parse_int(value)?,
        (Section::Timing, "telemetry_ms") => config.timing.telemetry_ms = parse_int(value)?,
        (Section::Timing, "keypad_poll_ms") => config.timing.keypad_poll_ms = parse_int(value)?,
        (Section::Timing, "sensor_poll_ms") => config.timing.sensor_poll_ms = parse_int(value)?,
        (Section::Timing, "input_timeout_ms") => {
            config.timing.input_timeout_ms = parse_int(value)?
        }
        (Section::Timing, "finished_message_ms") => {
            config.timing.finished_message_ms = parse_int(value)?
        }

        (Section::Sensor, "i2c_address") => config.sensor.i2c_address = parse_int(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
