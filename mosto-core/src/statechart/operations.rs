//! Callbacks invoked by the statechart on state entry
//!
//! The statechart itself only decides which screen is active. Everything it
//! does to the outside world goes through an [`Operations`] implementation,
//! which lets navigation queue messages for other tasks and lets tests record
//! the calls.

use heapless::Deque;

use super::events::{FsmEvent, Level, PinMode, StatusLight};

/// Capacity of the internal event queue
pub const EVENT_QUEUE_SIZE: usize = 4;

/// Events raised from inside an operation
///
/// They are processed after the current transition completes.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Deque<FsmEvent, EVENT_QUEUE_SIZE>,
}

impl EventQueue {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    /// Raise an internal event
    ///
    /// Returns `false` if the queue is full and the event was dropped.
    pub fn raise(&mut self, event: FsmEvent) -> bool {
        self.events.push_back(event).is_ok()
    }

    /// Take the oldest pending event
    pub fn pop(&mut self) -> Option<FsmEvent> {
        self.events.pop_front()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Side effects of the statechart
pub trait Operations {
    // Setup

    /// Bring up the display
    fn begin_display(&mut self);

    /// Bring up the temperature probe
    fn begin_water_sensor(&mut self);

    /// Bring up the keypad matrix
    fn begin_matrix(&mut self);

    /// Configure every status light as an output and switch it off
    fn begin_semaphore(&mut self) {
        for light in StatusLight::ALL {
            self.pin_mode(light, PinMode::Output);
            self.digital_write(light, Level::Low);
        }
    }

    // Status lights

    /// Set the direction of a light pin
    fn pin_mode(&mut self, light: StatusLight, mode: PinMode);

    /// Drive a light pin
    fn digital_write(&mut self, light: StatusLight, level: Level);

    // Screens

    /// Draw the active state name on the top line
    fn show_state(&mut self, name: &str);

    /// Startup banner
    fn show_startup(&mut self);

    /// Welcome screen
    fn show_idle_screen(&mut self);

    /// Recipe list
    fn show_recipes(&mut self);

    /// Rests of one recipe (1-based id)
    fn show_recipe(&mut self, recipe_id: u8);

    /// Recipe completed; must raise [`FsmEvent::FinishedProcess`]
    fn show_finished(&mut self, events: &mut EventQueue);

    /// Completion banner
    fn show_finished_message(&mut self);

    // Process

    /// A recipe run is about to begin
    fn initialize_process(&mut self);

    /// Send the next rest of `recipe_index` to the control loop
    fn start_next_recipe_step(&mut self, recipe_index: u8);

    /// Check if the current recipe has rests after the current one
    fn has_more_steps(&self) -> bool;

    /// Catalog index of the selected recipe
    fn current_recipe_index(&self) -> Option<u8>;

    /// Index of the rest being executed
    fn current_step_index(&self) -> Option<u8>;

    /// Stop everything, user chose to exit
    fn shutdown_system(&mut self);
}
