//! PWM heater output
//!
//! Drives the element through an SSR from a hardware PWM channel. Duty is
//! given in controller counts (`2^bits - 1` full scale) and rescaled to the
//! channel's own top value.

use embedded_hal::pwm::SetDutyCycle;
use mosto_core::traits::HeaterOutput;

/// PWM heater output
pub struct PwmHeater<P> {
    pwm: P,
    /// Full scale in controller counts
    max_duty: u16,
    duty: u16,
}

impl<P: SetDutyCycle> PwmHeater<P> {
    /// Create a heater output with the given controller resolution
    ///
    /// The heater starts off.
    pub fn new(pwm: P, resolution_bits: u8) -> Self {
        let bits = resolution_bits.clamp(1, 16) as u32;
        let mut heater = Self {
            pwm,
            max_duty: ((1u32 << bits) - 1) as u16,
            duty: 0,
        };
        heater.off();
        heater
    }

    fn to_channel(&self, duty: u16) -> u16 {
        let top = self.pwm.max_duty_cycle() as u32;
        ((duty as u32 * top) / self.max_duty as u32) as u16
    }
}

impl<P: SetDutyCycle> HeaterOutput for PwmHeater<P> {
    fn set_duty(&mut self, duty: u16) {
        let duty = duty.min(self.max_duty);
        self.duty = duty;
        let counts = self.to_channel(duty);
        // A failed write leaves the previous level; the next tick retries
        let _ = self.pwm.set_duty_cycle(counts);
    }

    fn duty(&self) -> u16 {
        self.duty
    }

    fn max_duty(&self) -> u16 {
        self.max_duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    /// Mock PWM channel
    struct MockPwm {
        top: u16,
        level: u16,
    }

    impl MockPwm {
        fn new(top: u16) -> Self {
            Self { top, level: 0xFFFF }
        }
    }

    impl ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.top
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.level = duty;
            Ok(())
        }
    }

    #[test]
    fn test_starts_off() {
        let heater = PwmHeater::new(MockPwm::new(1023), 10);
        assert_eq!(heater.duty(), 0);
        assert_eq!(heater.pwm.level, 0);
        assert_eq!(heater.max_duty(), 1023);
    }

    #[test]
    fn test_clamps_to_resolution() {
        let mut heater = PwmHeater::new(MockPwm::new(1023), 10);
        heater.set_duty(5000);
        assert_eq!(heater.duty(), 1023);
        assert_eq!(heater.pwm.level, 1023);
    }

    #[test]
    fn test_rescales_to_channel_top() {
        let mut heater = PwmHeater::new(MockPwm::new(4095), 10);
        heater.set_duty(1023);
        assert_eq!(heater.pwm.level, 4095);
        heater.set_duty(0);
        assert_eq!(heater.pwm.level, 0);

        heater.set_duty(512);
        assert_eq!(heater.pwm.level, 2049);
    }

    #[test]
    fn test_off() {
        let mut heater = PwmHeater::new(MockPwm::new(1023), 10);
        heater.set_duty(700);
        heater.off();
        assert_eq!(heater.duty(), 0);
        assert_eq!(heater.pwm.level, 0);
    }
}
