//! PID controller
//!
//! Positional PID with a fixed sample period, integral clamping to the output
//! range and derivative on measurement so setpoint changes do not kick the
//! output. Switching from manual to automatic seeds the integral with the
//! current output for a bumpless transfer.

use crate::config::PidGains;

/// Controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidMode {
    /// Output is held at whatever was last set
    Manual,
    /// Output is computed from the error every sample
    Automatic,
}

/// PID controller
#[derive(Debug, Clone)]
pub struct Pid {
    kp: f32,
    /// Integral gain pre-multiplied by the sample period
    ki: f32,
    /// Derivative gain pre-divided by the sample period
    kd: f32,
    setpoint: f32,
    output_min: f32,
    output_max: f32,
    output: f32,
    integral: f32,
    last_input: f32,
    mode: PidMode,
}

impl Pid {
    /// Create a controller in manual mode with output zero
    ///
    /// Gains are given per second; `sample_ms` is the period between
    /// [`Pid::compute`] calls.
    pub fn new(gains: PidGains, sample_ms: u32, output_min: f32, output_max: f32) -> Self {
        let sample_s = sample_ms.max(1) as f32 / 1000.0;
        Self {
            kp: gains.kp,
            ki: gains.ki * sample_s,
            kd: gains.kd / sample_s,
            setpoint: 0.0,
            output_min,
            output_max,
            output: 0.0,
            integral: 0.0,
            last_input: 0.0,
            mode: PidMode::Manual,
        }
    }

    /// Set the target value
    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    /// Current target value
    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    /// Current mode
    pub fn mode(&self) -> PidMode {
        self.mode
    }

    /// Change mode
    ///
    /// Going from manual to automatic re-initializes the internal state from
    /// `input` and the current output.
    pub fn set_mode(&mut self, mode: PidMode, input: f32) {
        if mode == PidMode::Automatic && self.mode == PidMode::Manual {
            self.integral = self.output.clamp(self.output_min, self.output_max);
            self.last_input = input;
        }
        self.mode = mode;
    }

    /// Force the output (only meaningful in manual mode)
    pub fn set_output(&mut self, output: f32) {
        self.output = output.clamp(self.output_min, self.output_max);
    }

    /// Last computed or forced output
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Run one sample and return the new output
    ///
    /// In manual mode the output is left unchanged.
    pub fn compute(&mut self, input: f32) -> f32 {
        if self.mode == PidMode::Manual {
            return self.output;
        }

        let error = self.setpoint - input;
        let d_input = input - self.last_input;

        self.integral = (self.integral + self.ki * error).clamp(self.output_min, self.output_max);

        let output = self.kp * error + self.integral - self.kd * d_input;
        self.output = output.clamp(self.output_min, self.output_max);
        self.last_input = input;

        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pid(kp: f32, ki: f32, kd: f32) -> Pid {
        Pid::new(PidGains { kp, ki, kd }, 100, 0.0, 1023.0)
    }

    #[test]
    fn test_manual_holds_output() {
        let mut pid = make_pid(30.0, 5.0, 0.5);
        pid.set_setpoint(67.0);
        assert_eq!(pid.compute(25.0), 0.0);
        assert_eq!(pid.mode(), PidMode::Manual);
    }

    #[test]
    fn test_proportional_only() {
        let mut pid = make_pid(10.0, 0.0, 0.0);
        pid.set_setpoint(50.0);
        pid.set_mode(PidMode::Automatic, 40.0);
        assert_eq!(pid.compute(40.0), 100.0);
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = make_pid(30.0, 5.0, 0.5);
        pid.set_setpoint(67.0);
        pid.set_mode(PidMode::Automatic, 25.0);
        assert_eq!(pid.compute(25.0), 1023.0);

        pid.set_setpoint(20.0);
        for _ in 0..200 {
            pid.compute(80.0);
        }
        assert_eq!(pid.output(), 0.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = make_pid(0.0, 10.0, 0.0);
        pid.set_setpoint(10.0);
        pid.set_mode(PidMode::Automatic, 9.0);
        // 10/s * 0.1 s * 1 °C per sample
        let first = pid.compute(9.0);
        let second = pid.compute(9.0);
        assert!((first - 1.0).abs() < 1e-4);
        assert!((second - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_derivative_on_measurement() {
        let mut pid = make_pid(0.0, 0.0, 1.0);
        pid.set_mode(PidMode::Automatic, 20.0);
        pid.set_setpoint(60.0);
        // Setpoint jump alone does not move the derivative term
        assert_eq!(pid.compute(20.0), 0.0);
        pid.set_setpoint(10.0);
        // Falling input pushes output up: -(1.0 / 0.1) * (-1.0)
        assert!((pid.compute(19.0) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_bumpless_transfer() {
        let mut pid = make_pid(0.0, 1.0, 0.0);
        pid.set_output(400.0);
        pid.set_setpoint(50.0);
        pid.set_mode(PidMode::Automatic, 50.0);
        // Zero error, integral seeded from the forced output
        assert!((pid.compute(50.0) - 400.0).abs() < 1e-3);
    }
}
