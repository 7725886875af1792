//! Remote temperature probe
//!
//! The probe is a separate MCU on the I2C bus that answers every read with
//! the latest temperature as a 4-byte little-endian IEEE-754 float.

use embedded_hal_async::i2c::I2c;
use mosto_core::traits::{SensorError, TemperatureProbe};

/// Payload size of one reading
pub const PAYLOAD_LEN: usize = 4;

/// Lowest plausible reading (°C)
const MIN_C: f32 = -55.0;
/// Highest plausible reading (°C)
const MAX_C: f32 = 150.0;

/// Decode a probe payload
pub fn decode_celsius(bytes: [u8; PAYLOAD_LEN]) -> Result<f32, SensorError> {
    let temp = f32::from_le_bytes(bytes);
    if !temp.is_finite() {
        return Err(SensorError::NotANumber);
    }
    if !(MIN_C..=MAX_C).contains(&temp) {
        return Err(SensorError::OutOfRange);
    }
    Ok(temp)
}

/// Remote probe on an async I2C bus
pub struct RemoteProbe<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RemoteProbe<I2C> {
    /// Create a probe at the given 7-bit address
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Configured bus address
    pub fn address(&self) -> u8 {
        self.address
    }
}

impl<I2C: I2c> TemperatureProbe for RemoteProbe<I2C> {
    async fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let mut buf = [0u8; PAYLOAD_LEN];
        self.i2c
            .read(self.address, &mut buf)
            .await
            .map_err(|_| SensorError::Bus)?;
        decode_celsius(buf)
    }
}
