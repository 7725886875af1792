//! Temperature probe task
//!
//! Polls the remote probe and overwrites the sensor slot. A failed read
//! publishes the fault sentinel; the next poll retries.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker};

use mosto_core::traits::TemperatureProbe;
use mosto_drivers::sensor::RemoteProbe;

use crate::channels::FwChannels;

/// Probe on the I2C0 bus
pub type Probe = RemoteProbe<I2c<'static, I2C0, Async>>;

#[embassy_executor::task]
pub async fn sensor_task(mut probe: Probe, channels: &'static FwChannels, period_ms: u32) {
    info!("Sensor task started, probe at {=u8:#x}", probe.address());

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut faulted = false;

    loop {
        ticker.next().await;

        let sample = probe.sample().await;
        if sample.is_fault() != faulted {
            faulted = sample.is_fault();
            if faulted {
                warn!("Probe read failed, publishing fault");
            } else {
                info!("Probe recovered: {} C", sample.temperature);
            }
        }
        trace!("Probe: {} C", sample.temperature);

        channels.sensor.signal(sample);
    }
}
