//! Statechart engine
//!
//! Runs transitions to completion: an external event is dispatched, the
//! entry actions of the new screen run, and any events raised by those
//! actions are dispatched in turn before [`Statechart::raise`] returns.

use super::events::{FsmEvent, Level, Screen, StatusLight};
use super::operations::{EventQueue, Operations};

/// Upper bound on internal events handled per external event
const MAX_CHAINED_EVENTS: usize = 8;

/// Navigation statechart
#[derive(Debug)]
pub struct Statechart {
    screen: Screen,
    queue: EventQueue,
    finished_message_ms: u64,
    /// Expiry of the completion banner
    deadline_ms: Option<u64>,
}

impl Statechart {
    /// Create a statechart that has not been entered yet
    pub const fn new(finished_message_ms: u32) -> Self {
        Self {
            screen: Screen::Init,
            queue: EventQueue::new(),
            finished_message_ms: finished_message_ms as u64,
            deadline_ms: None,
        }
    }

    /// Active screen
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Next timer expiry, if a timer is armed
    pub fn deadline(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Run the initial state and settle on the welcome screen
    pub fn enter<O: Operations>(&mut self, ops: &mut O, now_ms: u64) {
        self.screen = Screen::Init;
        self.queue.clear();
        self.on_entry(Screen::Init, ops, now_ms);
        self.queue.raise(FsmEvent::InitDone);
        self.drain(ops, now_ms);
    }

    /// Dispatch an external event
    ///
    /// Returns `true` if the active screen handled it.
    pub fn raise<O: Operations>(&mut self, event: FsmEvent, ops: &mut O, now_ms: u64) -> bool {
        let handled = self.dispatch(event, ops, now_ms);
        self.drain(ops, now_ms);
        handled
    }

    /// Fire expired timers
    pub fn poll<O: Operations>(&mut self, ops: &mut O, now_ms: u64) {
        if let Some(deadline) = self.deadline_ms {
            if now_ms >= deadline {
                self.deadline_ms = None;
                self.raise(FsmEvent::Timeout, ops, now_ms);
            }
        }
    }

    fn drain<O: Operations>(&mut self, ops: &mut O, now_ms: u64) {
        for _ in 0..MAX_CHAINED_EVENTS {
            let Some(event) = self.queue.pop() else {
                return;
            };
            self.dispatch(event, ops, now_ms);
        }
        // Runaway chain, drop the rest
        self.queue.clear();
    }

    fn dispatch<O: Operations>(&mut self, event: FsmEvent, ops: &mut O, now_ms: u64) -> bool {
        let more_steps = ops.has_more_steps();
        match self.screen.transition(event, more_steps) {
            Some(next) => {
                self.deadline_ms = None;
                self.screen = next;
                self.on_entry(next, ops, now_ms);
                true
            }
            None => false,
        }
    }

    fn on_entry<O: Operations>(&mut self, screen: Screen, ops: &mut O, now_ms: u64) {
        match screen {
            Screen::Init => {
                ops.begin_display();
                ops.begin_water_sensor();
                ops.begin_matrix();
                ops.show_startup();
            }
            Screen::Idle => {
                ops.begin_semaphore();
                ops.show_idle_screen();
            }
            Screen::Menu => {
                lights_off(ops);
                ops.show_recipes();
            }
            Screen::RecipeDetail(id) => ops.show_recipe(id),
            Screen::StartProcess => ops.initialize_process(),
            Screen::ControlLoop => {
                ops.digital_write(StatusLight::Yellow, Level::High);
                if let Some(index) = ops.current_recipe_index() {
                    ops.start_next_recipe_step(index);
                }
            }
            Screen::FinishProcess => ops.show_finished(&mut self.queue),
            Screen::FinishedMessage => {
                ops.digital_write(StatusLight::Yellow, Level::Low);
                ops.digital_write(StatusLight::Green, Level::High);
                ops.show_finished_message();
                self.deadline_ms = Some(now_ms + self.finished_message_ms);
            }
            Screen::Shutdown => {
                lights_off(ops);
                ops.digital_write(StatusLight::Red, Level::High);
                ops.shutdown_system();
            }
        }
        ops.show_state(screen.name());
    }
}

fn lights_off<O: Operations>(ops: &mut O) {
    for light in StatusLight::ALL {
        ops.digital_write(light, Level::Low);
    }
}

#[cfg(test)]
mod tests {
    use heapless::{String, Vec};

    use super::*;
    use crate::statechart::events::PinMode;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        BeginDisplay,
        BeginSensor,
        BeginMatrix,
        PinMode(StatusLight),
        Write(StatusLight, Level),
        State(String<24>),
        Startup,
        Idle,
        Recipes,
        Recipe(u8),
        Finished,
        FinishedMessage,
        Initialize,
        StartStep(u8, u8),
        Shutdown,
    }

    /// Records every callback and tracks rest progress like navigation does
    struct Recorder {
        calls: Vec<Call, 64>,
        recipe: Option<u8>,
        step: Option<u8>,
        num_steps: u8,
    }

    impl Recorder {
        fn new(num_steps: u8) -> Self {
            Self {
                calls: Vec::new(),
                recipe: None,
                step: None,
                num_steps,
            }
        }

        fn push(&mut self, call: Call) {
            self.calls.push(call).unwrap();
        }

        fn contains(&self, call: &Call) -> bool {
            self.calls.iter().any(|c| c == call)
        }

        fn last_state(&self) -> Option<&str> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::State(s) => Some(s.as_str()),
                _ => None,
            })
        }
    }

    impl Operations for Recorder {
        fn begin_display(&mut self) {
            self.push(Call::BeginDisplay);
        }
        fn begin_water_sensor(&mut self) {
            self.push(Call::BeginSensor);
        }
        fn begin_matrix(&mut self) {
            self.push(Call::BeginMatrix);
        }
        fn pin_mode(&mut self, light: StatusLight, mode: PinMode) {
            assert_eq!(mode, PinMode::Output);
            self.push(Call::PinMode(light));
        }
        fn digital_write(&mut self, light: StatusLight, level: Level) {
            self.push(Call::Write(light, level));
        }
        fn show_state(&mut self, name: &str) {
            self.push(Call::State(String::try_from(name).unwrap()));
        }
        fn show_startup(&mut self) {
            self.push(Call::Startup);
        }
        fn show_idle_screen(&mut self) {
            self.push(Call::Idle);
        }
        fn show_recipes(&mut self) {
            self.push(Call::Recipes);
        }
        fn show_recipe(&mut self, recipe_id: u8) {
            self.push(Call::Recipe(recipe_id));
        }
        fn show_finished(&mut self, events: &mut EventQueue) {
            self.push(Call::Finished);
            self.recipe = None;
            self.step = None;
            events.raise(FsmEvent::FinishedProcess);
        }
        fn show_finished_message(&mut self) {
            self.push(Call::FinishedMessage);
        }
        fn initialize_process(&mut self) {
            self.push(Call::Initialize);
        }
        fn start_next_recipe_step(&mut self, recipe_index: u8) {
            let step = self.step.map_or(0, |s| s + 1);
            self.step = Some(step);
            self.push(Call::StartStep(recipe_index, step));
        }
        fn has_more_steps(&self) -> bool {
            self.step.map_or(0, |s| s + 1) < self.num_steps
        }
        fn current_recipe_index(&self) -> Option<u8> {
            self.recipe
        }
        fn current_step_index(&self) -> Option<u8> {
            self.step
        }
        fn shutdown_system(&mut self) {
            self.push(Call::Shutdown);
        }
    }

    fn started(num_steps: u8) -> (Statechart, Recorder) {
        let mut sc = Statechart::new(5000);
        let mut ops = Recorder::new(num_steps);
        sc.enter(&mut ops, 0);
        (sc, ops)
    }

    fn run_to_control_loop(sc: &mut Statechart, ops: &mut Recorder) {
        assert!(sc.raise(FsmEvent::StartButton, ops, 0));
        assert!(sc.raise(FsmEvent::ChooseRecipe(1), ops, 0));
        ops.recipe = Some(0);
        assert!(sc.raise(FsmEvent::RecipeProcess, ops, 0));
        assert!(sc.raise(FsmEvent::StartFirstStep, ops, 0));
        assert_eq!(sc.screen(), Screen::ControlLoop);
    }

    #[test]
    fn test_enter_settles_on_idle() {
        let (sc, ops) = started(2);
        assert_eq!(sc.screen(), Screen::Idle);
        assert_eq!(ops.calls[0], Call::BeginDisplay);
        assert!(ops.contains(&Call::BeginSensor));
        assert!(ops.contains(&Call::BeginMatrix));
        assert!(ops.contains(&Call::Startup));
        assert!(ops.contains(&Call::Idle));
        for light in StatusLight::ALL {
            assert!(ops.contains(&Call::PinMode(light)));
        }
        assert_eq!(ops.last_state(), Some("IDLE"));
    }

    #[test]
    fn test_unhandled_event_reports_false() {
        let (mut sc, mut ops) = started(2);
        let before = ops.calls.len();
        assert!(!sc.raise(FsmEvent::StepFinished, &mut ops, 0));
        assert_eq!(sc.screen(), Screen::Idle);
        assert_eq!(ops.calls.len(), before);
    }

    #[test]
    fn test_full_recipe_run() {
        let (mut sc, mut ops) = started(2);
        run_to_control_loop(&mut sc, &mut ops);
        assert!(ops.contains(&Call::Initialize));
        assert!(ops.contains(&Call::StartStep(0, 0)));
        assert!(ops.contains(&Call::Write(StatusLight::Yellow, Level::High)));

        // First rest done, more to go: re-enter the loop
        assert!(sc.raise(FsmEvent::StepFinished, &mut ops, 1000));
        assert_eq!(sc.screen(), Screen::ControlLoop);
        assert!(ops.contains(&Call::StartStep(0, 1)));

        // Last rest done: finish runs and chains into the banner
        assert!(sc.raise(FsmEvent::StepFinished, &mut ops, 2000));
        assert_eq!(sc.screen(), Screen::FinishedMessage);
        assert!(ops.contains(&Call::Finished));
        assert!(ops.contains(&Call::FinishedMessage));
        assert!(ops.contains(&Call::Write(StatusLight::Green, Level::High)));
        assert_eq!(ops.current_recipe_index(), None);
        assert_eq!(sc.deadline(), Some(7000));
    }

    #[test]
    fn test_finished_message_timeout() {
        let (mut sc, mut ops) = started(1);
        run_to_control_loop(&mut sc, &mut ops);
        sc.raise(FsmEvent::StepFinished, &mut ops, 10_000);
        assert_eq!(sc.screen(), Screen::FinishedMessage);

        sc.poll(&mut ops, 14_999);
        assert_eq!(sc.screen(), Screen::FinishedMessage);

        sc.poll(&mut ops, 15_000);
        assert_eq!(sc.screen(), Screen::Idle);
        assert_eq!(sc.deadline(), None);
        assert_eq!(ops.last_state(), Some("IDLE"));
    }

    #[test]
    fn test_abort_returns_to_menu() {
        let (mut sc, mut ops) = started(3);
        run_to_control_loop(&mut sc, &mut ops);
        assert!(sc.raise(FsmEvent::Menu, &mut ops, 500));
        assert_eq!(sc.screen(), Screen::Menu);
        assert_eq!(ops.calls.last(), Some(&Call::State(String::try_from("MENU").unwrap())));
        assert!(ops.contains(&Call::Write(StatusLight::Yellow, Level::Low)));
    }

    #[test]
    fn test_exit_and_wake() {
        let (mut sc, mut ops) = started(1);
        assert!(sc.raise(FsmEvent::ExitProcess, &mut ops, 0));
        assert_eq!(sc.screen(), Screen::Shutdown);
        assert!(ops.contains(&Call::Shutdown));
        assert!(ops.contains(&Call::Write(StatusLight::Red, Level::High)));

        assert!(sc.raise(FsmEvent::StartButton, &mut ops, 0));
        assert_eq!(sc.screen(), Screen::Idle);
    }

    #[test]
    fn test_recipe_detail_and_back() {
        let (mut sc, mut ops) = started(1);
        sc.raise(FsmEvent::StartButton, &mut ops, 0);
        sc.raise(FsmEvent::ChooseRecipe(4), &mut ops, 0);
        assert_eq!(sc.screen(), Screen::RecipeDetail(4));
        assert!(ops.contains(&Call::Recipe(4)));
        assert_eq!(ops.last_state(), Some("RECIPE_4"));

        sc.raise(FsmEvent::RecipeBackMenu, &mut ops, 0);
        assert_eq!(sc.screen(), Screen::Menu);
    }
}
