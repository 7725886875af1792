//! Keypad routing on top of the statechart

use crate::config::ControllerConfig;
use crate::messages::{ControlCommand, ControlEvent, DisplayCommand, Key};
use crate::recipe::{self, NUM_RECIPES};
use crate::statechart::{FsmEvent, Operations, Screen, Statechart};
use crate::telemetry::LogRequest;

use super::context::{NavContext, Outbox};
use super::input::InputBuffer;

/// What a key press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyOutcome {
    /// Raised a statechart transition
    Transition(Screen),
    /// Aborted the running process
    Abort,
    /// Requested a dump of the persistent log
    DumpLog,
    /// Not bound on this screen, echoed
    Buffered,
    /// Dropped; any typed keys are discarded
    Ignored,
}

/// Navigation state: statechart, process indices and typed keys
#[derive(Debug)]
pub struct Navigator {
    chart: Statechart,
    ctx: NavContext,
    input: InputBuffer,
}

impl Navigator {
    /// Create a navigator that has not been started yet
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            chart: Statechart::new(config.timing.finished_message_ms),
            ctx: NavContext::new(),
            input: InputBuffer::new(config.timing.input_timeout_ms),
        }
    }

    /// Enter the statechart (startup banner, then the welcome screen)
    pub fn start(&mut self, now_ms: u64) {
        self.chart.enter(&mut self.ctx, now_ms);
    }

    /// Active screen
    pub fn screen(&self) -> Screen {
        self.chart.screen()
    }

    /// `(recipe, step)` indices of the running process
    pub fn process_indices(&self) -> (Option<u8>, Option<u8>) {
        (self.ctx.current_recipe_index(), self.ctx.current_step_index())
    }

    /// Pending messages for the other tasks
    pub fn outbox(&mut self) -> &mut Outbox {
        self.ctx.outbox()
    }

    /// Earliest time [`Navigator::poll`] has work to do
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.chart.deadline(), self.input.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Route one key press according to the active screen
    pub fn handle_key(&mut self, key: Key, now_ms: u64) -> KeyOutcome {
        let screen = self.chart.screen();

        let outcome = if screen == Screen::FinishedMessage {
            self.input.clear();
            KeyOutcome::Ignored
        } else if screen.is_process() {
            self.process_key(key, now_ms)
        } else {
            self.navigation_key(screen, key, now_ms)
        };

        match outcome {
            KeyOutcome::Buffered => {
                self.input.push(key, now_ms);
                self.ctx
                    .outbox()
                    .display(DisplayCommand::keypad_echo(&self.input.echo()));
            }
            KeyOutcome::Ignored => {}
            _ => self.input.clear(),
        }

        outcome
    }

    /// Feed an event from the control loop
    ///
    /// Returns `false` when the active screen does not expect it.
    pub fn handle_event(&mut self, event: ControlEvent, now_ms: u64) -> bool {
        match event {
            ControlEvent::StepFinished => self.raise(FsmEvent::StepFinished, now_ms),
        }
    }

    /// Expire timers: the completion banner and the typed-key buffer
    pub fn poll(&mut self, now_ms: u64) {
        self.chart.poll(&mut self.ctx, now_ms);

        if self.input.expired(now_ms) {
            self.input.clear();
            self.redraw();
        }
    }

    fn raise(&mut self, event: FsmEvent, now_ms: u64) -> bool {
        self.chart.raise(event, &mut self.ctx, now_ms)
    }

    fn transition(&mut self, event: FsmEvent, now_ms: u64) -> KeyOutcome {
        if self.raise(event, now_ms) {
            KeyOutcome::Transition(self.chart.screen())
        } else {
            KeyOutcome::Buffered
        }
    }

    fn process_key(&mut self, key: Key, now_ms: u64) -> KeyOutcome {
        if key != Key::ABORT {
            // Leave the live status screen alone
            self.input.clear();
            return KeyOutcome::Ignored;
        }
        // Abort is queued before the menu event; both may be observed by
        // their consumers in either order.
        self.ctx.reset();
        self.ctx.outbox().control(ControlCommand::Abort);
        self.raise(FsmEvent::Menu, now_ms);
        KeyOutcome::Abort
    }

    fn navigation_key(&mut self, screen: Screen, key: Key, now_ms: u64) -> KeyOutcome {
        match (screen, key.as_char()) {
            (Screen::Idle, '1') | (Screen::Shutdown, '1') => {
                self.transition(FsmEvent::StartButton, now_ms)
            }
            (Screen::Idle, '2') => self.transition(FsmEvent::ExitProcess, now_ms),
            (Screen::Idle, '*') => {
                self.ctx.outbox().log(LogRequest::Dump);
                KeyOutcome::DumpLog
            }
            (Screen::Menu, _) => match key.digit() {
                Some(id) if (1..=NUM_RECIPES as u8).contains(&id) => {
                    self.transition(FsmEvent::ChooseRecipe(id), now_ms)
                }
                _ => KeyOutcome::Buffered,
            },
            (Screen::RecipeDetail(id), '1') => self.start_recipe(id, now_ms),
            (Screen::RecipeDetail(_), '2') => self.transition(FsmEvent::RecipeBackMenu, now_ms),
            _ => KeyOutcome::Buffered,
        }
    }

    fn start_recipe(&mut self, recipe_id: u8, now_ms: u64) -> KeyOutcome {
        let index = recipe_id.saturating_sub(1);
        match recipe::recipe(index as usize) {
            Some(r) if !r.is_empty() => {}
            // Nothing to brew
            _ => return KeyOutcome::Buffered,
        }

        self.ctx.select_recipe(index);
        self.raise(FsmEvent::RecipeProcess, now_ms);
        self.transition(FsmEvent::StartFirstStep, now_ms)
    }

    /// Repaint the active screen and blank the echo line
    fn redraw(&mut self) {
        let screen = self.chart.screen();
        match screen {
            Screen::Idle => self.ctx.show_idle_screen(),
            Screen::Menu => self.ctx.show_recipes(),
            Screen::RecipeDetail(id) => self.ctx.show_recipe(id),
            _ => self.ctx.outbox().display(DisplayCommand::keypad_echo("")),
        }
        self.ctx.show_state(screen.name());
    }
}
