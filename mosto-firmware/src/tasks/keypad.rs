//! Keypad scan task

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_time::{Duration, Ticker};

use mosto_core::traits::KeyScanner;
use mosto_drivers::input::MatrixKeypad;

use crate::channels::FwChannels;

/// Keypad wired to the board pins
pub type Keypad = MatrixKeypad<Output<'static>, Input<'static>>;

/// Scan the matrix at a fixed period and forward new key presses
#[embassy_executor::task]
pub async fn keypad_task(mut keypad: Keypad, channels: &'static FwChannels, period_ms: u32) {
    info!("Keypad task started ({} ms)", period_ms);

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));

    loop {
        ticker.next().await;

        if let Some(key) = keypad.scan() {
            debug!("Key {:?}", key);
            channels.keys.send(key).await;
        }
    }
}
