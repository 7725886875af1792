//! Display task
//!
//! Applies display commands to the text buffer and pushes it to the panel.
//! Commands already queued are folded into the same flush.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;

use mosto_display::{present, render, Screen};
use mosto_drivers::display::Ssd1306;

use crate::channels::FwChannels;

/// SSD1306 panel on the I2C1 bus
pub type Panel = Ssd1306<I2c<'static, I2C1, Async>>;

/// Render display commands; the panel must already be initialized
#[embassy_executor::task]
pub async fn display_task(mut panel: Panel, channels: &'static FwChannels) {
    info!("Display task started");

    let mut screen = Screen::new();

    loop {
        let cmd = channels.display.receive().await;
        render(&mut screen, &cmd);
        while let Ok(cmd) = channels.display.try_receive() {
            render(&mut screen, &cmd);
        }

        if screen.is_dirty() {
            trace!("Redraw {}", screen);
            if let Err(e) = present(&mut screen, &mut panel).await {
                warn!("Display write failed: {:?}", e);
            }
        }
    }
}
