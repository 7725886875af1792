//! Rest (step) execution
//!
//! Drives one mash rest at a time through its phases:
//!
//! ```text
//! Idle --StartStep--> Ramping --in band--> Soaking --hold elapsed--> Idle (+ StepFinished)
//!                        |                    |
//!                        +------- Abort ------+--> Idle
//! ```
//!
//! The hold timer only starts once the measured temperature enters the
//! tolerance band around the target, so a rest completes only when both the
//! band was reached and the full hold time has elapsed since.

use crate::config::ControllerConfig;
use crate::messages::{ControlCommand, ProcessStatus, SensorSample};
use crate::recipe::{self, RecipeError};
use crate::telemetry::LogRow;

use super::pid::{Pid, PidMode};

/// Rest execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No rest active; heater off
    Idle,
    /// Heating toward the target band; hold timer not started
    Ramping,
    /// Inside the band at least once; hold timer counting down
    Soaking,
}

/// Errors from command handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// `StartStep` referenced a recipe or rest outside the catalog
    InvalidIndex(RecipeError),
}

impl From<RecipeError> for ControlError {
    fn from(e: RecipeError) -> Self {
        ControlError::InvalidIndex(e)
    }
}

/// Result of a successfully handled command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// A rest is now ramping
    StepStarted {
        /// First rest of a recipe; a fresh log header is due
        new_run: bool,
        /// A rest was already active and has been replaced
        replaced: bool,
    },
    /// Heater forced off
    Aborted {
        /// A rest was active when the abort arrived
        was_active: bool,
    },
}

/// Output of one control tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Heater drive in PWM counts
    pub duty: u16,
    /// The active rest completed on this tick
    pub step_finished: bool,
    /// Status screen update, once per telemetry period while active
    pub status: Option<ProcessStatus>,
    /// Log row, same cadence as `status`
    pub log_row: Option<LogRow>,
}

impl TickOutput {
    fn off() -> Self {
        Self {
            duty: 0,
            step_finished: false,
            status: None,
            log_row: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveStep {
    recipe_index: u8,
    step_index: u8,
    target_c: i16,
    duration_min: u16,
    /// Time the band was first entered
    band_entered_ms: Option<u64>,
}

impl ActiveStep {
    fn hold_s(&self) -> u32 {
        self.duration_min as u32 * 60
    }

    fn remaining_s(&self, now_ms: u64) -> u32 {
        match self.band_entered_ms {
            Some(start) => {
                let elapsed_s = (now_ms.saturating_sub(start) / 1000) as u32;
                self.hold_s().saturating_sub(elapsed_s)
            }
            None => self.hold_s(),
        }
    }
}

/// Ramp/soak controller for a single heater
pub struct ProcessController {
    pid: Pid,
    band_c: f32,
    max_duty: u16,
    telemetry_ms: u64,
    active: Option<ActiveStep>,
    /// Last valid reading, used as the PID input
    input_c: Option<f32>,
    /// Probe currently reporting the fault sentinel
    sensor_fault: bool,
    last_telemetry_ms: Option<u64>,
    duty: u16,
}

impl ProcessController {
    /// Create an idle controller
    pub fn new(config: &ControllerConfig) -> Self {
        let max_duty = config.heater.max_duty();
        Self {
            pid: Pid::new(
                config.pid,
                config.timing.control_tick_ms,
                0.0,
                max_duty as f32,
            ),
            band_c: config.heater.tolerance_band_c,
            max_duty,
            telemetry_ms: config.timing.telemetry_ms as u64,
            active: None,
            input_c: None,
            sensor_fault: false,
            last_telemetry_ms: None,
            duty: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        match self.active {
            None => Phase::Idle,
            Some(ActiveStep {
                band_entered_ms: None,
                ..
            }) => Phase::Ramping,
            Some(_) => Phase::Soaking,
        }
    }

    /// Heater drive applied on the last tick
    pub fn duty(&self) -> u16 {
        self.duty
    }

    /// PID mode (automatic only while a rest is active)
    pub fn pid_mode(&self) -> PidMode {
        self.pid.mode()
    }

    /// Probe is currently faulted
    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    /// Remaining hold time of the active rest
    pub fn remaining_s(&self, now_ms: u64) -> Option<u32> {
        self.active.map(|s| s.remaining_s(now_ms))
    }

    /// `(recipe, step)` of the active rest
    pub fn active_indices(&self) -> Option<(u8, u8)> {
        self.active.map(|s| (s.recipe_index, s.step_index))
    }

    /// Apply a command from navigation
    ///
    /// A `StartStep` with indices outside the catalog is rejected and leaves
    /// the controller untouched. A valid `StartStep` replaces any active rest.
    pub fn handle_command(&mut self, cmd: ControlCommand) -> Result<CommandOutcome, ControlError> {
        match cmd {
            ControlCommand::StartStep {
                recipe_index,
                step_index,
                target_c,
                duration_min,
            } => {
                cmd.validate()?;

                let replaced = self.active.is_some();
                self.active = Some(ActiveStep {
                    recipe_index,
                    step_index,
                    target_c,
                    duration_min,
                    band_entered_ms: None,
                });
                self.last_telemetry_ms = None;

                self.pid.set_setpoint(target_c as f32);
                self.pid
                    .set_mode(PidMode::Automatic, self.input_c.unwrap_or(0.0));

                Ok(CommandOutcome::StepStarted {
                    new_run: step_index == 0,
                    replaced,
                })
            }
            ControlCommand::Abort => {
                let was_active = self.active.is_some();
                self.stop();
                Ok(CommandOutcome::Aborted { was_active })
            }
        }
    }

    /// Record the latest probe reading
    ///
    /// The fault sentinel freezes the PID input at the last valid value.
    pub fn update_sensor(&mut self, sample: SensorSample) {
        if sample.is_fault() {
            self.sensor_fault = true;
        } else {
            self.sensor_fault = false;
            self.input_c = Some(sample.temperature);
        }
    }

    /// Run one control period
    pub fn tick(&mut self, now_ms: u64) -> TickOutput {
        let Some(mut step) = self.active else {
            self.stop();
            return TickOutput::off();
        };

        let reading = if self.sensor_fault { None } else { self.input_c };

        if step.band_entered_ms.is_none() {
            if let Some(temp) = reading {
                if (temp - step.target_c as f32).abs() <= self.band_c {
                    step.band_entered_ms = Some(now_ms);
                }
            }
        }

        let remaining_s = step.remaining_s(now_ms);

        let mut duty = match reading {
            Some(temp) => {
                let output = self.pid.compute(temp);
                (output.clamp(0.0, self.max_duty as f32)) as u16
            }
            // No usable reading: hold the heater off
            None => 0,
        };

        let step_finished = step.band_entered_ms.is_some() && remaining_s == 0;
        if step_finished {
            self.stop();
            duty = 0;
        } else {
            self.active = Some(step);
        }
        self.duty = duty;

        let telemetry_due = step_finished
            || self
                .last_telemetry_ms
                .map_or(true, |last| now_ms.saturating_sub(last) >= self.telemetry_ms);

        let (status, log_row) = if telemetry_due {
            self.last_telemetry_ms = Some(now_ms);
            (
                Some(self.status(&step, remaining_s)),
                Some(self.log_row(&step, now_ms, duty)),
            )
        } else {
            (None, None)
        };

        TickOutput {
            duty,
            step_finished,
            status,
            log_row,
        }
    }

    fn stop(&mut self) {
        self.active = None;
        self.pid.set_mode(PidMode::Manual, self.input_c.unwrap_or(0.0));
        self.pid.set_output(0.0);
        self.duty = 0;
    }

    fn status(&self, step: &ActiveStep, remaining_s: u32) -> ProcessStatus {
        let (recipe_name, step_name, total_steps) =
            match recipe::lookup(step.recipe_index, step.step_index) {
                Ok((recipe, s)) => (recipe.name, s.name, recipe.num_steps() as u8),
                Err(_) => ("", "", 0),
            };

        ProcessStatus {
            recipe_name,
            step_name,
            step_number: step.step_index + 1,
            total_steps,
            current_c: self.input_c.map_or(0, |t| t as i16),
            target_c: step.target_c,
            minutes: (remaining_s / 60) as u16,
            seconds: (remaining_s % 60) as u8,
            ramping: step.band_entered_ms.is_none(),
            sensor_fault: self.sensor_fault,
        }
    }

    fn log_row(&self, step: &ActiveStep, now_ms: u64, duty: u16) -> LogRow {
        let temperature = match (self.sensor_fault, self.input_c) {
            (false, Some(t)) => t,
            _ => SensorSample::FAULT_C,
        };
        LogRow {
            elapsed_s: (now_ms / 1000) as u32,
            temperature,
            duty,
            step_number: step.step_index + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TICK_MS: u64 = 100;

    fn make_controller() -> ProcessController {
        ProcessController::new(&ControllerConfig::default())
    }

    fn start(ctrl: &mut ProcessController, recipe: u8, step: u8) -> CommandOutcome {
        let cmd = ControlCommand::start_step(recipe, step).unwrap();
        ctrl.handle_command(cmd).unwrap()
    }

    /// Feed a sample and tick, returning the tick output
    fn step_at(ctrl: &mut ProcessController, temp: f32, now_ms: u64) -> TickOutput {
        ctrl.update_sensor(SensorSample::new(temp));
        ctrl.tick(now_ms)
    }

    #[test]
    fn test_idle_forces_heater_off() {
        let mut ctrl = make_controller();
        let out = step_at(&mut ctrl, 20.0, 0);
        assert_eq!(out, TickOutput::off());
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert_eq!(ctrl.pid_mode(), PidMode::Manual);
    }

    #[test]
    fn test_start_enters_ramping() {
        let mut ctrl = make_controller();
        ctrl.update_sensor(SensorSample::new(25.0));
        let outcome = start(&mut ctrl, 0, 0);
        assert_eq!(
            outcome,
            CommandOutcome::StepStarted {
                new_run: true,
                replaced: false
            }
        );
        assert_eq!(ctrl.phase(), Phase::Ramping);
        assert_eq!(ctrl.pid_mode(), PidMode::Automatic);

        let out = ctrl.tick(TICK_MS);
        // Far below target: full output
        assert_eq!(out.duty, 1023);
        assert_eq!(ctrl.remaining_s(TICK_MS), Some(60));
    }

    #[test]
    fn test_second_step_is_not_new_run() {
        let mut ctrl = make_controller();
        let outcome = start(&mut ctrl, 1, 1);
        assert_eq!(
            outcome,
            CommandOutcome::StepStarted {
                new_run: false,
                replaced: false
            }
        );
    }

    #[test]
    fn test_invalid_start_is_ignored() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 1);

        let bad = ControlCommand::StartStep {
            recipe_index: 9,
            step_index: 0,
            target_c: 90,
            duration_min: 1,
        };
        let err = ctrl.handle_command(bad).unwrap_err();
        assert_eq!(err, ControlError::InvalidIndex(RecipeError::InvalidRecipe(9)));

        let bad_step = ControlCommand::StartStep {
            recipe_index: 0,
            step_index: 5,
            target_c: 90,
            duration_min: 1,
        };
        assert!(ctrl.handle_command(bad_step).is_err());

        // Previous rest untouched
        assert_eq!(ctrl.active_indices(), Some((0, 1)));
        assert_eq!(ctrl.phase(), Phase::Ramping);
    }

    #[test]
    fn test_invalid_start_from_idle_stays_idle() {
        let mut ctrl = make_controller();

        let bad = ControlCommand::StartStep {
            recipe_index: 4,
            step_index: 0,
            target_c: 67,
            duration_min: 1,
        };
        assert!(ctrl.handle_command(bad).is_err());
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert_eq!(ctrl.active_indices(), None);

        let out = step_at(&mut ctrl, 25.0, 100);
        assert_eq!(out.duty, 0);
        assert!(!out.step_finished);
        assert_eq!(out.status, None);
        assert_eq!(out.log_row, None);
    }

    #[test]
    fn test_abort_is_idempotent() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 0);
        step_at(&mut ctrl, 30.0, TICK_MS);

        let first = ctrl.handle_command(ControlCommand::Abort).unwrap();
        assert_eq!(first, CommandOutcome::Aborted { was_active: true });
        let second = ctrl.handle_command(ControlCommand::Abort).unwrap();
        assert_eq!(second, CommandOutcome::Aborted { was_active: false });

        let out = ctrl.tick(400);
        assert_eq!(out.duty, 0);
        assert!(!out.step_finished);
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert_eq!(ctrl.pid_mode(), PidMode::Manual);
    }

    #[test]
    fn test_ramp_and_soak_scenario() {
        // 67 °C for 1 minute, probe climbing 1 °C per tick from 25 °C
        let mut ctrl = make_controller();
        ctrl.update_sensor(SensorSample::new(25.0));
        start(&mut ctrl, 0, 0);

        let mut now = 0;
        let mut temp = 25.0;
        while temp < 66.0 {
            now += TICK_MS;
            let out = step_at(&mut ctrl, temp, now);
            assert!(!out.step_finished);
            assert_eq!(ctrl.phase(), Phase::Ramping);
            assert_eq!(ctrl.remaining_s(now), Some(60));
            temp += 1.0;
        }

        // First sample inside the band starts the hold
        now += TICK_MS;
        let band_entry = now;
        step_at(&mut ctrl, 66.0, now);
        assert_eq!(ctrl.phase(), Phase::Soaking);
        assert_eq!(ctrl.remaining_s(now), Some(60));

        let mut finished = 0;
        while now < band_entry + 60_000 + 10 * TICK_MS {
            now += TICK_MS;
            let out = step_at(&mut ctrl, 67.0, now);
            if out.step_finished {
                finished += 1;
                assert_eq!(now, band_entry + 60_000);
                assert_eq!(out.duty, 0);
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(ctrl.phase(), Phase::Idle);
        assert_eq!(ctrl.pid_mode(), PidMode::Manual);
    }

    #[test]
    fn test_abort_mid_soak() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 0);
        step_at(&mut ctrl, 67.0, TICK_MS);
        assert_eq!(ctrl.phase(), Phase::Soaking);
        step_at(&mut ctrl, 67.0, 30_000);

        ctrl.handle_command(ControlCommand::Abort).unwrap();

        let out = step_at(&mut ctrl, 67.0, 30_100);
        assert_eq!(out.duty, 0);
        assert_eq!(ctrl.phase(), Phase::Idle);

        // Nothing fires after the first deadline either
        for t in 1..=700u64 {
            let out = step_at(&mut ctrl, 67.0, 30_100 + t * TICK_MS);
            assert!(!out.step_finished);
        }
    }

    #[test]
    fn test_sensor_fault_holds_heater_off() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 0);
        assert!(step_at(&mut ctrl, 40.0, TICK_MS).duty > 0);

        ctrl.update_sensor(SensorSample::fault());
        let out = ctrl.tick(2 * TICK_MS);
        assert_eq!(out.duty, 0);
        assert!(ctrl.sensor_fault());
        // Fault does not count as reaching the band
        assert_eq!(ctrl.phase(), Phase::Ramping);

        // Status keeps showing the last valid reading
        let out = ctrl.tick(5_000);
        let status = out.status.unwrap();
        assert_eq!(status.current_c, 40);
        assert!(status.sensor_fault);
        assert_eq!(out.log_row.unwrap().temperature, SensorSample::FAULT_C);

        // Recovery resumes control
        assert!(step_at(&mut ctrl, 41.0, 5_100).duty > 0);
        assert!(!ctrl.sensor_fault());
    }

    #[test]
    fn test_no_reading_keeps_heater_off() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 0);
        let out = ctrl.tick(TICK_MS);
        assert_eq!(out.duty, 0);
        assert_eq!(ctrl.phase(), Phase::Ramping);
    }

    #[test]
    fn test_telemetry_once_per_second() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 2, 0);

        let mut rows = 0;
        let mut statuses = 0;
        for t in 1..=30u64 {
            let out = step_at(&mut ctrl, 30.0, t * TICK_MS);
            rows += out.log_row.is_some() as u32;
            statuses += out.status.is_some() as u32;
        }
        // First tick plus one per elapsed second
        assert_eq!(rows, 3);
        assert_eq!(statuses, 3);

        ctrl.handle_command(ControlCommand::Abort).unwrap();
        for t in 31..=60u64 {
            let out = step_at(&mut ctrl, 30.0, t * TICK_MS);
            assert!(out.log_row.is_none());
            assert!(out.status.is_none());
        }
    }

    #[test]
    fn test_status_contents() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 1, 1);
        let out = step_at(&mut ctrl, 42.7, 1_000);
        let status = out.status.unwrap();
        assert_eq!(status.recipe_name, "Witbier");
        assert_eq!(status.step_name, "Curva 2");
        assert_eq!(status.step_number, 2);
        assert_eq!(status.total_steps, 3);
        assert_eq!(status.current_c, 42);
        assert_eq!(status.target_c, 68);
        assert_eq!((status.minutes, status.seconds), (60, 0));
        assert!(status.ramping);

        let row = out.log_row.unwrap();
        assert_eq!(row.elapsed_s, 1);
        assert_eq!(row.step_number, 2);
        assert_eq!(row.duty, out.duty);
    }

    #[test]
    fn test_restart_replaces_active_step() {
        let mut ctrl = make_controller();
        start(&mut ctrl, 0, 0);
        step_at(&mut ctrl, 67.0, TICK_MS);
        assert_eq!(ctrl.phase(), Phase::Soaking);

        let outcome = start(&mut ctrl, 0, 1);
        assert_eq!(
            outcome,
            CommandOutcome::StepStarted {
                new_run: false,
                replaced: true
            }
        );
        assert_eq!(ctrl.phase(), Phase::Ramping);
        assert_eq!(ctrl.active_indices(), Some((0, 1)));
    }

    proptest! {
        /// Outside the band the hold never starts, however long we wait
        #[test]
        fn never_finishes_outside_band(
            offsets in proptest::collection::vec(1.01f32..40.0, 1..200),
            below in proptest::bool::ANY,
        ) {
            let mut ctrl = make_controller();
            start(&mut ctrl, 0, 0);
            for (i, off) in offsets.iter().enumerate() {
                let temp = if below { 67.0 - off } else { 67.0 + off };
                let now = (i as u64 + 1) * 10_000;
                let out = step_at(&mut ctrl, temp, now);
                prop_assert!(!out.step_finished);
                prop_assert_eq!(ctrl.phase(), Phase::Ramping);
                prop_assert_eq!(ctrl.remaining_s(now), Some(60));
            }
        }

        /// Once in band, completion happens exactly when the hold elapses
        #[test]
        fn finishes_exactly_after_hold(
            entry_ms in 0u64..100_000,
            drift in proptest::collection::vec(-5.0f32..5.0, 600..700),
        ) {
            let mut ctrl = make_controller();
            start(&mut ctrl, 0, 0);
            let entry_ms = entry_ms / TICK_MS * TICK_MS + TICK_MS;
            step_at(&mut ctrl, 67.0, entry_ms);
            prop_assert_eq!(ctrl.phase(), Phase::Soaking);

            let mut finished_at = None;
            for (i, d) in drift.iter().enumerate() {
                let now = entry_ms + (i as u64 + 1) * TICK_MS;
                // Leaving the band after entry does not pause the hold
                let out = step_at(&mut ctrl, 67.0 + d, now);
                if out.step_finished {
                    prop_assert!(finished_at.is_none());
                    finished_at = Some(now);
                }
            }
            prop_assert_eq!(finished_at, Some(entry_ms + 60_000));
        }
    }
}
