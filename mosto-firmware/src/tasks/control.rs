//! Process control task
//!
//! Runs the ramp/soak controller on a fixed tick. Commands and the latest
//! sample are polled without waiting; status updates and log rows are
//! offered without blocking and counted when dropped, so a slow display or
//! flash never stretches the control period.

use defmt::*;
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Duration, Instant, Ticker};

use mosto_core::config::ControllerConfig;
use mosto_core::control::{CommandOutcome, ProcessController};
use mosto_core::messages::{ControlEvent, DisplayCommand};
use mosto_core::telemetry::LogRequest;
use mosto_core::traits::HeaterOutput;
use mosto_drivers::heater::PwmHeater;

use crate::channels::{count_drop, FwChannels, DISPLAY_DROPS, LOG_DROPS};

/// Heater on PWM slice 0, channel A
pub type Heater = PwmHeater<PwmOutput<'static>>;

#[embassy_executor::task]
pub async fn control_task(
    mut heater: Heater,
    channels: &'static FwChannels,
    config: ControllerConfig,
) {
    info!(
        "Control task started ({} ms tick, max duty {})",
        config.timing.control_tick_ms,
        heater.max_duty()
    );

    let mut controller = ProcessController::new(&config);
    let mut ticker = Ticker::every(Duration::from_millis(config.timing.control_tick_ms as u64));

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        while let Ok(cmd) = channels.control.try_receive() {
            match controller.handle_command(cmd) {
                Ok(CommandOutcome::StepStarted { new_run, replaced }) => {
                    info!("Rest started: {:?}", cmd);
                    if replaced {
                        warn!("Replaced the active rest");
                    }
                    if new_run {
                        offer_log(channels, LogRequest::Header);
                    }
                }
                Ok(CommandOutcome::Aborted { was_active }) => {
                    info!("Abort (rest active: {})", was_active);
                }
                Err(e) => warn!("Ignoring {:?}: {:?}", cmd, e),
            }
        }

        if let Some(sample) = channels.sensor.try_take() {
            controller.update_sensor(sample);
        }

        let out = controller.tick(now_ms);
        heater.set_duty(out.duty);

        if let Some(status) = out.status {
            trace!("Status {:?}", status);
            if channels
                .display
                .try_send(DisplayCommand::process_status(status))
                .is_err()
            {
                let total = count_drop(&DISPLAY_DROPS);
                debug!("Display queue full ({} dropped)", total);
            }
        }

        if let Some(row) = out.log_row {
            offer_log(channels, LogRequest::Row(row));
        }

        if out.step_finished {
            info!("Rest complete");
            channels.events.send(ControlEvent::StepFinished).await;
        }
    }
}

fn offer_log(channels: &FwChannels, req: LogRequest) {
    if channels.log.try_send(req).is_err() {
        let total = count_drop(&LOG_DROPS);
        debug!("Log queue full ({} dropped)", total);
    }
}
