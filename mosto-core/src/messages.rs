//! Inter-task message payloads
//!
//! Every message is a small `Copy`/`Clone` value created at the send site,
//! moved into a channel and consumed exactly once by the receiving task.

use heapless::String;

use crate::recipe::{self, RecipeError};

/// Maximum length of a text payload carried by a display command
pub const TEXT_LEN: usize = 32;

/// Short text payload
pub type Text = String<TEXT_LEN>;

/// Build a text payload, truncating at [`TEXT_LEN`] bytes
pub fn text(s: &str) -> Text {
    let mut out = Text::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// A key reported by the keypad scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(pub char);

impl Key {
    /// The key used to abort a running process
    pub const ABORT: Key = Key('A');
    /// The key used to dump the persistent log from the idle screen
    pub const DUMP_LOG: Key = Key('*');

    /// Numeric value for digit keys
    pub fn digit(self) -> Option<u8> {
        self.0.to_digit(10).map(|d| d as u8)
    }

    /// The character printed on the key
    pub fn as_char(self) -> char {
        self.0
    }
}

/// Commands consumed by the process control task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlCommand {
    /// Begin heating toward a rest and hold it once reached
    StartStep {
        /// Catalog index of the recipe
        recipe_index: u8,
        /// Rest index within the recipe
        step_index: u8,
        /// Target temperature (°C)
        target_c: i16,
        /// Hold time (minutes)
        duration_min: u16,
    },
    /// Stop heating immediately
    Abort,
}

impl ControlCommand {
    /// Build a `StartStep` from the catalog
    ///
    /// Fails without producing a command if either index is out of range.
    pub fn start_step(recipe_index: u8, step_index: u8) -> Result<Self, RecipeError> {
        let (_, step) = recipe::lookup(recipe_index, step_index)?;
        Ok(ControlCommand::StartStep {
            recipe_index,
            step_index,
            target_c: step.target_c,
            duration_min: step.duration_min,
        })
    }

    /// Check the command against the catalog at the receiver
    pub fn validate(&self) -> Result<(), RecipeError> {
        match *self {
            ControlCommand::StartStep {
                recipe_index,
                step_index,
                ..
            } => recipe::lookup(recipe_index, step_index).map(|_| ()),
            ControlCommand::Abort => Ok(()),
        }
    }
}

/// Events raised by the control task back into the navigation statechart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// The active rest reached its target and held it for its full duration
    StepFinished,
}

/// Latest temperature reading from the probe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    /// Temperature (°C), or [`SensorSample::FAULT_C`] on read failure
    pub temperature: f32,
}

impl SensorSample {
    /// Sentinel published when the probe cannot be read
    pub const FAULT_C: f32 = -999.0;

    /// A valid reading
    pub const fn new(temperature: f32) -> Self {
        Self { temperature }
    }

    /// The read-failure sentinel
    pub const fn fault() -> Self {
        Self {
            temperature: Self::FAULT_C,
        }
    }

    /// Check if this sample is the read-failure sentinel
    pub fn is_fault(&self) -> bool {
        self.temperature <= Self::FAULT_C || self.temperature.is_nan()
    }
}

/// Snapshot of an active rest for the status screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcessStatus {
    /// Recipe name
    pub recipe_name: &'static str,
    /// Rest name
    pub step_name: &'static str,
    /// 1-based rest number
    pub step_number: u8,
    /// Rests in the recipe
    pub total_steps: u8,
    /// Measured temperature (whole °C)
    pub current_c: i16,
    /// Target temperature (°C)
    pub target_c: i16,
    /// Remaining hold minutes
    pub minutes: u16,
    /// Remaining hold seconds (0-59)
    pub seconds: u8,
    /// Still heating toward the target band
    pub ramping: bool,
    /// Probe is reporting the fault sentinel
    pub sensor_fault: bool,
}

/// What a display command draws
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayKind {
    /// Rewrite only the top line with the active state name
    StateBanner(Text),
    /// Welcome screen with start/exit options
    IdleMenu,
    /// Recipe selection list
    RecipeList,
    /// Rests of one recipe (1-based id) plus start/back options
    RecipeDetail {
        /// 1-based recipe id
        recipe_id: u8,
    },
    /// Startup banner
    Startup,
    /// Live status of the active rest
    ProcessStatus(ProcessStatus),
    /// Recipe completed banner
    Finished,
    /// Rewrite only the bottom line with the typed keys
    KeypadEcho(Text),
    /// Clear the whole screen
    Clear,
}

/// A request for the display task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayCommand {
    /// What to draw
    pub kind: DisplayKind,
    /// Clear the screen before drawing
    pub clear: bool,
}

impl DisplayCommand {
    /// Draw a full screen, clearing first
    pub fn screen(kind: DisplayKind) -> Self {
        Self { kind, clear: true }
    }

    /// Draw over the current screen without clearing
    pub fn overlay(kind: DisplayKind) -> Self {
        Self { kind, clear: false }
    }

    /// Top-line state banner
    pub fn state_banner(name: &str) -> Self {
        Self::overlay(DisplayKind::StateBanner(text(name)))
    }

    /// Bottom-line keypad echo
    pub fn keypad_echo(buffer: &str) -> Self {
        Self::overlay(DisplayKind::KeypadEcho(text(buffer)))
    }

    /// Clear-only command
    pub fn clear() -> Self {
        Self::screen(DisplayKind::Clear)
    }

    /// Status update for the active rest
    pub fn process_status(status: ProcessStatus) -> Self {
        Self::screen(DisplayKind::ProcessStatus(status))
    }
}
