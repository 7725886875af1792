//! Statechart screens and events

use crate::recipe::NUM_RECIPES;

/// Statechart states
///
/// Every state corresponds to one screen of the user interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Power-on, drivers being brought up
    Init,
    /// Welcome screen
    Idle,
    /// Recipe list
    Menu,
    /// Details of one recipe (1-based id)
    RecipeDetail(u8),
    /// Process being prepared
    StartProcess,
    /// A rest is being executed
    ControlLoop,
    /// Last rest done, shutting actuators down
    FinishProcess,
    /// Completion banner, returns to idle on its own
    FinishedMessage,
    /// User chose to exit
    Shutdown,
}

impl Screen {
    /// State name shown on the top line
    pub fn name(self) -> &'static str {
        match self {
            Screen::Init => "INIT_SYSTEM",
            Screen::Idle => "IDLE",
            Screen::Menu => "MENU",
            Screen::RecipeDetail(1) => "RECIPE_1",
            Screen::RecipeDetail(2) => "RECIPE_2",
            Screen::RecipeDetail(3) => "RECIPE_3",
            Screen::RecipeDetail(4) => "RECIPE_4",
            Screen::RecipeDetail(_) => "RECIPE_5",
            Screen::StartProcess => "START_PROCESS",
            Screen::ControlLoop => "CONTROL_PROCESS_LOOP",
            Screen::FinishProcess => "FINISH_PROCESS",
            Screen::FinishedMessage => "FINISHED_MESSAGE",
            Screen::Shutdown => "SHUTDOWN",
        }
    }

    /// Screens that belong to an active brewing run
    pub fn is_process(self) -> bool {
        matches!(
            self,
            Screen::StartProcess | Screen::ControlLoop | Screen::FinishProcess
        )
    }

    /// Process the event and return the next screen
    ///
    /// Returns `None` when the event is not handled in this state.
    /// `more_steps` is the `has_more_steps` guard, only consulted on
    /// [`FsmEvent::StepFinished`].
    pub fn transition(self, event: FsmEvent, more_steps: bool) -> Option<Self> {
        use FsmEvent::*;

        match (self, event) {
            // Init runs its entry and moves on
            (Screen::Init, InitDone) => Some(Screen::Idle),

            // Idle transitions
            (Screen::Idle, StartButton) => Some(Screen::Menu),
            (Screen::Idle, ExitProcess) => Some(Screen::Shutdown),

            // Menu transitions
            (Screen::Menu, ChooseRecipe(id)) if (1..=NUM_RECIPES as u8).contains(&id) => {
                Some(Screen::RecipeDetail(id))
            }

            // RecipeDetail transitions
            (Screen::RecipeDetail(_), RecipeProcess) => Some(Screen::StartProcess),
            (Screen::RecipeDetail(_), RecipeBackMenu) => Some(Screen::Menu),

            // Process transitions
            (Screen::StartProcess, StartFirstStep) => Some(Screen::ControlLoop),
            (Screen::ControlLoop, StepFinished) if more_steps => Some(Screen::ControlLoop),
            (Screen::ControlLoop, StepFinished) => Some(Screen::FinishProcess),
            (Screen::FinishProcess, FinishedProcess) => Some(Screen::FinishedMessage),
            (screen, FsmEvent::Menu) if screen.is_process() => Some(Screen::Menu),

            // Completion banner
            (Screen::FinishedMessage, Timeout) => Some(Screen::Idle),

            // Shutdown can be woken back up
            (Screen::Shutdown, StartButton) => Some(Screen::Idle),

            _ => None,
        }
    }
}

/// Events raised into the statechart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsmEvent {
    /// Initialization finished
    InitDone,
    /// Start from the welcome screen
    StartButton,
    /// Exit from the welcome screen
    ExitProcess,
    /// Recipe chosen from the list (1-based id)
    ChooseRecipe(u8),
    /// Begin brewing the shown recipe
    RecipeProcess,
    /// Start the first rest
    StartFirstStep,
    /// Back from recipe details to the list
    RecipeBackMenu,
    /// Control loop finished the active rest
    StepFinished,
    /// Actuators off after the last rest
    FinishedProcess,
    /// Return to the recipe list (abort)
    Menu,
    /// Internal timer expired
    Timeout,
}

/// Status lights on the front panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusLight {
    /// Fault / attention
    Red,
    /// Brewing in progress
    Yellow,
    /// Recipe completed
    Green,
}

impl StatusLight {
    /// All lights
    pub const ALL: [StatusLight; 3] = [StatusLight::Red, StatusLight::Yellow, StatusLight::Green];
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input
    Input,
    /// Push-pull output
    Output,
}

/// Output level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Off
    Low,
    /// On
    High,
}
