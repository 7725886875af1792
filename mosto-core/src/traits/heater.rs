//! Heater and temperature probe traits

use core::future::Future;

use crate::messages::SensorSample;

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed or was cut short
    Bus,
    /// Payload did not decode to a number
    NotANumber,
    /// Reading outside the physically plausible range
    OutOfRange,
}

/// Trait for temperature probes
pub trait TemperatureProbe {
    /// Read the current temperature in degrees Celsius
    fn read_celsius(&mut self) -> impl Future<Output = Result<f32, SensorError>>;

    /// Read a sample, mapping any failure to the fault sentinel
    fn sample(&mut self) -> impl Future<Output = SensorSample> {
        async {
            match self.read_celsius().await {
                Ok(t) => SensorSample::new(t),
                Err(_) => SensorSample::fault(),
            }
        }
    }
}

/// Trait for proportional heater drive
///
/// Implementations drive the element through PWM into an SSR or MOSFET.
pub trait HeaterOutput {
    /// Set the drive level in PWM counts, clamped to [`HeaterOutput::max_duty`]
    fn set_duty(&mut self, duty: u16);

    /// Current drive level
    fn duty(&self) -> u16;

    /// Full-scale drive level
    fn max_duty(&self) -> u16;

    /// Force the heater off
    fn off(&mut self) {
        self.set_duty(0);
    }
}
