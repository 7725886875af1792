//! Operation adapter owned by navigation
//!
//! Implements [`Operations`] by queueing messages in an [`Outbox`]. The
//! navigation task drains the outbox into the channels after every event, so
//! the statechart never awaits.

use heapless::Vec;

use crate::messages::{ControlCommand, DisplayCommand, DisplayKind, ProcessStatus};
use crate::recipe;
use crate::statechart::{EventQueue, FsmEvent, Level, Operations, PinMode, StatusLight};
use crate::telemetry::LogRequest;

/// Display commands one event can produce
pub const OUTBOX_DISPLAY_SIZE: usize = 12;
/// Control commands one event can produce
pub const OUTBOX_CONTROL_SIZE: usize = 4;
/// Log requests one event can produce
pub const OUTBOX_LOG_SIZE: usize = 2;

/// Messages waiting to be sent to the other tasks
#[derive(Debug)]
pub struct Outbox {
    display: Vec<DisplayCommand, OUTBOX_DISPLAY_SIZE>,
    control: Vec<ControlCommand, OUTBOX_CONTROL_SIZE>,
    log: Vec<LogRequest, OUTBOX_LOG_SIZE>,
    lights: [Level; 3],
    lights_changed: bool,
    dropped: u32,
}

impl Outbox {
    /// Create an empty outbox, all lights off
    pub fn new() -> Self {
        Self {
            display: Vec::new(),
            control: Vec::new(),
            log: Vec::new(),
            lights: [Level::Low; 3],
            lights_changed: false,
            dropped: 0,
        }
    }

    /// Queue a display command
    pub fn display(&mut self, cmd: DisplayCommand) {
        if self.display.push(cmd).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Queue a control command
    pub fn control(&mut self, cmd: ControlCommand) {
        if self.control.push(cmd).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Queue a log request
    pub fn log(&mut self, req: LogRequest) {
        if self.log.push(req).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    fn set_light(&mut self, light: StatusLight, level: Level) {
        let slot = &mut self.lights[light_index(light)];
        if *slot != level {
            *slot = level;
            self.lights_changed = true;
        }
    }

    /// Take the queued display commands, oldest first
    pub fn take_display(&mut self) -> Vec<DisplayCommand, OUTBOX_DISPLAY_SIZE> {
        core::mem::take(&mut self.display)
    }

    /// Take the queued control commands, oldest first
    pub fn take_control(&mut self) -> Vec<ControlCommand, OUTBOX_CONTROL_SIZE> {
        core::mem::take(&mut self.control)
    }

    /// Take the queued log requests, oldest first
    pub fn take_log(&mut self) -> Vec<LogRequest, OUTBOX_LOG_SIZE> {
        core::mem::take(&mut self.log)
    }

    /// Light levels `[red, yellow, green]` if any changed since the last call
    pub fn take_lights(&mut self) -> Option<[Level; 3]> {
        if self.lights_changed {
            self.lights_changed = false;
            Some(self.lights)
        } else {
            None
        }
    }

    /// Current light level
    pub fn light(&self, light: StatusLight) -> Level {
        self.lights[light_index(light)]
    }

    /// Messages lost because the outbox was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for Outbox {
    fn default() -> Self {
        Self::new()
    }
}

fn light_index(light: StatusLight) -> usize {
    match light {
        StatusLight::Red => 0,
        StatusLight::Yellow => 1,
        StatusLight::Green => 2,
    }
}

/// Process indices plus the outbox
#[derive(Debug)]
pub struct NavContext {
    recipe: Option<u8>,
    step: Option<u8>,
    outbox: Outbox,
}

impl NavContext {
    /// Create a context with no recipe selected
    pub fn new() -> Self {
        Self {
            recipe: None,
            step: None,
            outbox: Outbox::new(),
        }
    }

    /// Select the recipe for the next run
    ///
    /// Clears the rest index so the run starts from the first rest.
    pub fn select_recipe(&mut self, recipe_index: u8) {
        self.recipe = Some(recipe_index);
        self.step = None;
    }

    /// Forget the running recipe
    pub fn reset(&mut self) {
        self.recipe = None;
        self.step = None;
    }

    /// Pending messages
    pub fn outbox(&mut self) -> &mut Outbox {
        &mut self.outbox
    }
}

impl Default for NavContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Operations for NavContext {
    fn begin_display(&mut self) {
        self.outbox.display(DisplayCommand::clear());
    }

    // The probe and the keypad are owned by their tasks, which bring them up
    // before the scheduler starts.
    fn begin_water_sensor(&mut self) {}

    fn begin_matrix(&mut self) {}

    // Light pins are created as outputs
    fn pin_mode(&mut self, _light: StatusLight, _mode: PinMode) {}

    fn digital_write(&mut self, light: StatusLight, level: Level) {
        self.outbox.set_light(light, level);
    }

    fn show_state(&mut self, name: &str) {
        self.outbox.display(DisplayCommand::state_banner(name));
    }

    fn show_startup(&mut self) {
        self.outbox.display(DisplayCommand::screen(DisplayKind::Startup));
    }

    fn show_idle_screen(&mut self) {
        self.outbox.display(DisplayCommand::screen(DisplayKind::IdleMenu));
    }

    fn show_recipes(&mut self) {
        self.outbox.display(DisplayCommand::screen(DisplayKind::RecipeList));
    }

    fn show_recipe(&mut self, recipe_id: u8) {
        self.outbox
            .display(DisplayCommand::screen(DisplayKind::RecipeDetail { recipe_id }));
    }

    fn show_finished(&mut self, events: &mut EventQueue) {
        self.reset();
        events.raise(FsmEvent::FinishedProcess);
    }

    fn show_finished_message(&mut self) {
        self.outbox.display(DisplayCommand::screen(DisplayKind::Finished));
    }

    fn initialize_process(&mut self) {
        self.step = None;
    }

    fn start_next_recipe_step(&mut self, recipe_index: u8) {
        let step_index = match (self.recipe, self.step) {
            (Some(r), Some(s)) if r == recipe_index => s.saturating_add(1),
            _ => 0,
        };

        let Ok(cmd) = ControlCommand::start_step(recipe_index, step_index) else {
            self.reset();
            return;
        };
        let Ok((recipe, step)) = recipe::lookup(recipe_index, step_index) else {
            self.reset();
            return;
        };

        self.recipe = Some(recipe_index);
        self.step = Some(step_index);
        self.outbox.control(cmd);
        self.outbox.display(DisplayCommand::process_status(ProcessStatus {
            recipe_name: recipe.name,
            step_name: step.name,
            step_number: step_index + 1,
            total_steps: recipe.num_steps() as u8,
            current_c: 0,
            target_c: step.target_c,
            minutes: step.duration_min,
            seconds: 0,
            ramping: true,
            sensor_fault: false,
        }));
    }

    fn has_more_steps(&self) -> bool {
        let (Some(r), Some(s)) = (self.recipe, self.step) else {
            return false;
        };
        recipe::recipe(r as usize).is_some_and(|recipe| (s as usize + 1) < recipe.num_steps())
    }

    fn current_recipe_index(&self) -> Option<u8> {
        self.recipe
    }

    fn current_step_index(&self) -> Option<u8> {
        self.step
    }

    fn shutdown_system(&mut self) {
        self.reset();
        self.outbox.control(ControlCommand::Abort);
        self.outbox.display(DisplayCommand::clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_progression() {
        let mut ctx = NavContext::new();
        ctx.select_recipe(1);
        ctx.start_next_recipe_step(1);
        assert_eq!(ctx.current_step_index(), Some(0));
        assert!(ctx.has_more_steps());

        ctx.start_next_recipe_step(1);
        ctx.start_next_recipe_step(1);
        assert_eq!(ctx.current_step_index(), Some(2));
        assert!(!ctx.has_more_steps());

        let cmds = ctx.outbox().take_control();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[2], ControlCommand::start_step(1, 2).unwrap());
    }

    #[test]
    fn test_start_shows_initial_status() {
        let mut ctx = NavContext::new();
        ctx.select_recipe(0);
        ctx.start_next_recipe_step(0);
        let display = ctx.outbox().take_display();
        match &display[0].kind {
            DisplayKind::ProcessStatus(status) => {
                assert_eq!(status.recipe_name, "American Pale Ale");
                assert_eq!(status.step_number, 1);
                assert_eq!(status.total_steps, 2);
                assert_eq!(status.target_c, 67);
                assert_eq!(status.minutes, 1);
                assert!(status.ramping);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_past_last_step_sends_nothing() {
        let mut ctx = NavContext::new();
        ctx.select_recipe(0);
        ctx.start_next_recipe_step(0);
        ctx.start_next_recipe_step(0);
        ctx.outbox().take_control();
        ctx.start_next_recipe_step(0);
        assert!(ctx.outbox().take_control().is_empty());
        assert_eq!(ctx.current_recipe_index(), None);
    }

    #[test]
    fn test_reselect_restarts_from_first_rest() {
        let mut ctx = NavContext::new();
        ctx.select_recipe(2);
        ctx.start_next_recipe_step(2);
        ctx.start_next_recipe_step(2);
        ctx.select_recipe(2);
        ctx.start_next_recipe_step(2);
        assert_eq!(ctx.current_step_index(), Some(0));
    }

    #[test]
    fn test_show_finished_raises_and_resets() {
        let mut ctx = NavContext::new();
        ctx.select_recipe(0);
        ctx.start_next_recipe_step(0);
        let mut events = EventQueue::new();
        ctx.show_finished(&mut events);
        assert_eq!(events.pop(), Some(FsmEvent::FinishedProcess));
        assert_eq!(ctx.current_recipe_index(), None);
        assert_eq!(ctx.current_step_index(), None);
    }

    #[test]
    fn test_lights_change_tracking() {
        let mut ctx = NavContext::new();
        assert_eq!(ctx.outbox().take_lights(), None);
        ctx.digital_write(StatusLight::Yellow, Level::High);
        assert_eq!(
            ctx.outbox().take_lights(),
            Some([Level::Low, Level::High, Level::Low])
        );
        ctx.digital_write(StatusLight::Yellow, Level::High);
        assert_eq!(ctx.outbox().take_lights(), None);
    }

    #[test]
    fn test_outbox_overflow_counts() {
        let mut outbox = Outbox::new();
        for _ in 0..OUTBOX_DISPLAY_SIZE + 3 {
            outbox.display(DisplayCommand::clear());
        }
        assert_eq!(outbox.dropped(), 3);
        assert_eq!(outbox.take_display().len(), OUTBOX_DISPLAY_SIZE);
        assert!(outbox.take_display().is_empty());
    }
}
