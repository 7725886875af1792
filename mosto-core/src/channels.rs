//! Inter-task communication context
//!
//! All queues between tasks live in one [`Channels`] value that is created
//! once at startup and handed to every task entry point by reference.
//! Generic over the raw mutex so the same context runs on the target
//! (`CriticalSectionRawMutex`) and in host tests (`NoopRawMutex`).

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::messages::{ControlCommand, ControlEvent, DisplayCommand, Key, SensorSample};
use crate::telemetry::LogRequest;

/// Keypad events awaiting navigation
pub const KEY_CHANNEL_SIZE: usize = 5;

/// Display commands awaiting the display task
pub const DISPLAY_CHANNEL_SIZE: usize = 10;

/// Commands awaiting the control task
pub const CONTROL_CHANNEL_SIZE: usize = 5;

/// Control events awaiting navigation
pub const EVENT_CHANNEL_SIZE: usize = 4;

/// Log work awaiting the logger task
pub const LOG_CHANNEL_SIZE: usize = 8;

/// Keypad → navigation
pub type KeyChannel<M> = Channel<M, Key, KEY_CHANNEL_SIZE>;
/// Navigation/control → display
pub type DisplayChannel<M> = Channel<M, DisplayCommand, DISPLAY_CHANNEL_SIZE>;
/// Navigation → control
pub type ControlChannel<M> = Channel<M, ControlCommand, CONTROL_CHANNEL_SIZE>;
/// Control → navigation
pub type EventChannel<M> = Channel<M, ControlEvent, EVENT_CHANNEL_SIZE>;
/// Control/navigation → logger
pub type LogChannel<M> = Channel<M, LogRequest, LOG_CHANNEL_SIZE>;
/// Sensor → control, single slot, newest value wins
pub type SensorSlot<M> = Signal<M, SensorSample>;

/// Every queue connecting the firmware tasks
pub struct Channels<M: RawMutex> {
    /// Keys pressed on the keypad
    pub keys: KeyChannel<M>,
    /// Screens to draw
    pub display: DisplayChannel<M>,
    /// Start/abort requests for the control loop
    pub control: ControlChannel<M>,
    /// Step completion notifications
    pub events: EventChannel<M>,
    /// Telemetry rows and dump requests
    pub log: LogChannel<M>,
    /// Most recent probe reading
    pub sensor: SensorSlot<M>,
}

impl<M: RawMutex> Channels<M> {
    /// Create an empty channel set
    pub const fn new() -> Self {
        Self {
            keys: Channel::new(),
            display: Channel::new(),
            control: Channel::new(),
            events: Channel::new(),
            log: Channel::new(),
            sensor: Signal::new(),
        }
    }
}

impl<M: RawMutex> Default for Channels<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{DisplayKind, text};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use proptest::prelude::*;

    fn banner(i: u8) -> DisplayCommand {
        let mut s = text("state ");
        let _ = s.push((b'0' + (i % 10)) as char);
        DisplayCommand::overlay(DisplayKind::StateBanner(s))
    }

    #[test]
    fn test_display_capacity() {
        let channels: Channels<NoopRawMutex> = Channels::new();
        for i in 0..DISPLAY_CHANNEL_SIZE as u8 {
            assert!(channels.display.try_send(banner(i)).is_ok());
        }
        assert!(channels.display.try_send(banner(0)).is_err());
    }

    #[test]
    fn test_sensor_slot_overwrites() {
        let channels: Channels<NoopRawMutex> = Channels::new();
        channels.sensor.signal(SensorSample::new(20.0));
        channels.sensor.signal(SensorSample::new(21.5));
        assert_eq!(channels.sensor.try_take(), Some(SensorSample::new(21.5)));
        assert_eq!(channels.sensor.try_take(), None);
    }

    #[test]
    fn test_control_fifo_abort_after_start() {
        let channels: Channels<NoopRawMutex> = Channels::new();
        let start = ControlCommand::start_step(0, 0).unwrap();
        channels.control.try_send(start).unwrap();
        channels.control.try_send(ControlCommand::Abort).unwrap();
        assert_eq!(channels.control.try_receive().ok(), Some(start));
        assert_eq!(
            channels.control.try_receive().ok(),
            Some(ControlCommand::Abort)
        );
    }

    proptest! {
        #[test]
        fn display_commands_drain_in_send_order(ids in proptest::collection::vec(0u8..10, 1..DISPLAY_CHANNEL_SIZE)) {
            let channels: Channels<NoopRawMutex> = Channels::new();
            for &i in &ids {
                prop_assert!(channels.display.try_send(banner(i)).is_ok());
            }
            for &i in &ids {
                prop_assert_eq!(channels.display.try_receive().ok(), Some(banner(i)));
            }
            prop_assert!(channels.display.try_receive().is_err());
        }
    }
}
