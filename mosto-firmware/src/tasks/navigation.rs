//! Navigation task
//!
//! Owns the statechart. Wakes on a key, a control event or the next UI
//! deadline, then drains the navigator's outbox into the channels and onto
//! the status lights.

use core::future::pending;

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_rp::gpio::{Level as PinLevel, Output};
use embassy_time::{Instant, Timer};

use mosto_core::config::ControllerConfig;
use mosto_core::nav::Navigator;
use mosto_core::statechart::Level;

use crate::channels::FwChannels;

/// Red, yellow and green status LEDs
pub struct StatusLights {
    pins: [Output<'static>; 3],
}

impl StatusLights {
    /// Take the light pins, in red, yellow, green order
    pub fn new(red: Output<'static>, yellow: Output<'static>, green: Output<'static>) -> Self {
        Self {
            pins: [red, yellow, green],
        }
    }

    fn apply(&mut self, levels: [Level; 3]) {
        for (pin, level) in self.pins.iter_mut().zip(levels) {
            pin.set_level(match level {
                Level::High => PinLevel::High,
                Level::Low => PinLevel::Low,
            });
        }
    }
}

#[embassy_executor::task]
pub async fn navigation_task(
    channels: &'static FwChannels,
    config: ControllerConfig,
    mut lights: StatusLights,
) {
    info!("Navigation task started");

    let mut nav = Navigator::new(&config);
    let mut dropped = 0;

    nav.start(Instant::now().as_millis());
    info!("Screen: {}", nav.screen().name());
    drain(&mut nav, channels, &mut lights, &mut dropped).await;

    loop {
        let deadline = nav.next_deadline();
        let wake = async {
            match deadline {
                Some(at) => Timer::at(Instant::from_millis(at)).await,
                None => pending::<()>().await,
            }
        };

        let before = nav.screen();
        match select3(channels.keys.receive(), channels.events.receive(), wake).await {
            Either3::First(key) => {
                let outcome = nav.handle_key(key, Instant::now().as_millis());
                debug!("Key {:?}: {:?}", key, outcome);
            }
            Either3::Second(event) => {
                if !nav.handle_event(event, Instant::now().as_millis()) {
                    warn!("{:?} ignored on {}", event, nav.screen().name());
                }
            }
            Either3::Third(()) => nav.poll(Instant::now().as_millis()),
        }

        if nav.screen() != before {
            info!("Screen: {}", nav.screen().name());
        }
        drain(&mut nav, channels, &mut lights, &mut dropped).await;
    }
}

/// Send everything the last event produced
///
/// Control commands go first so an abort is queued before the screens that
/// follow it.
async fn drain(
    nav: &mut Navigator,
    channels: &FwChannels,
    lights: &mut StatusLights,
    dropped: &mut u32,
) {
    let outbox = nav.outbox();
    let control = outbox.take_control();
    let display = outbox.take_display();
    let log = outbox.take_log();
    let levels = outbox.take_lights();

    if outbox.dropped() != *dropped {
        warn!("Navigation outbox overflowed ({} lost)", outbox.dropped());
        *dropped = outbox.dropped();
    }

    for cmd in control {
        channels.control.send(cmd).await;
    }
    for cmd in display {
        channels.display.send(cmd).await;
    }
    for req in log {
        channels.log.send(req).await;
    }
    if let Some(levels) = levels {
        lights.apply(levels);
    }
}
