//! Mosto - Brewing Process Controller Firmware
//!
//! Main firmware binary for RP2040-based mash controllers. Walks a recipe's
//! rests (heat to a target, hold for a time) with a PID-driven heater, a
//! keypad and an OLED menu.
//!
//! Task layout:
//!
//! ```text
//! keypad --keys--> navigation --control--> control --events--> navigation
//!                      |                     ^  |
//!                      +--display--+  sensor-+  +--display/log
//!                                  v
//!                               display            logger (flash)
//! ```

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, I2C1};
use embassy_rp::pwm::{self, Pwm};
use embassy_time::Timer;
use portable_atomic::Ordering;
use {defmt_rtt as _, panic_probe as _};

use mosto_display::DisplayBackend;
use mosto_drivers::display::Ssd1306;
use mosto_drivers::heater::PwmHeater;
use mosto_drivers::input::MatrixKeypad;
use mosto_drivers::sensor::RemoteProbe;
use mosto_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::{DISPLAY_DROPS, LOG_DROPS};
use crate::config::{load_config, log_config_summary, ConfigPersistence};
use crate::tasks::StatusLights;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

/// PWM clock divider; 125 MHz / 255 / 1024 counts is roughly 480 Hz
const HEATER_PWM_DIVIDER: u8 = 255;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Mosto firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let Some(channels) = channels::init() else {
        error!("Channel allocation failed");
        halt();
    };

    // Load configuration, then hand the flash to the logger
    let mut persistence = ConfigPersistence::new(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0));
    let (config, source) = load_config(&mut persistence).await;
    info!("Configuration loaded from {:?}", source);
    log_config_summary(&config);
    let storage = persistence.into_storage();

    // Display: SSD1306 on I2C1 (GPIO6 SDA, GPIO7 SCL)
    let display_bus = I2c::new_async(p.I2C1, p.PIN_7, p.PIN_6, Irqs, i2c::Config::default());
    let mut panel = Ssd1306::new(display_bus);
    if let Err(e) = panel.init().await {
        error!("Display init failed: {:?}", e);
        halt();
    }
    info!("Display initialized");

    // Probe: remote sensor on I2C0 (GPIO4 SDA, GPIO5 SCL)
    let probe_bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let probe = RemoteProbe::new(probe_bus, config.sensor.i2c_address);

    // Heater: SSR on GPIO16 (PWM slice 0, channel A)
    let mut pwm_config = pwm::Config::default();
    pwm_config.top = config.heater.max_duty();
    pwm_config.divider = HEATER_PWM_DIVIDER.into();
    let (heater_pwm, _) = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config).split();
    let Some(heater_pwm) = heater_pwm else {
        error!("Heater PWM channel unavailable");
        halt();
    };
    let heater = PwmHeater::new(heater_pwm, config.heater.pwm_resolution_bits);

    // Keypad: rows GPIO10-13 driven, columns GPIO18-21 pulled up
    let keypad = MatrixKeypad::new(
        [
            Output::new(p.PIN_10, Level::High),
            Output::new(p.PIN_11, Level::High),
            Output::new(p.PIN_12, Level::High),
            Output::new(p.PIN_13, Level::High),
        ],
        [
            Input::new(p.PIN_18, Pull::Up),
            Input::new(p.PIN_19, Pull::Up),
            Input::new(p.PIN_20, Pull::Up),
            Input::new(p.PIN_21, Pull::Up),
        ],
    );

    // Status lights: red GPIO14, yellow GPIO15, green GPIO17
    let lights = StatusLights::new(
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
        Output::new(p.PIN_17, Level::Low),
    );

    let timing = config.timing;
    let spawned = [
        spawner.spawn(tasks::display_task(panel, channels)),
        spawner.spawn(tasks::logger_task(storage, channels)),
        spawner.spawn(tasks::sensor_task(probe, channels, timing.sensor_poll_ms)),
        spawner.spawn(tasks::control_task(heater, channels, config)),
        spawner.spawn(tasks::keypad_task(keypad, channels, timing.keypad_poll_ms)),
        spawner.spawn(tasks::navigation_task(channels, config, lights)),
    ];
    if spawned.iter().any(Result::is_err) {
        error!("Task spawn failed");
        halt();
    }

    info!("All tasks spawned, firmware running");

    loop {
        Timer::after_secs(60).await;
        trace!(
            "Heartbeat: {} status updates and {} log rows dropped",
            DISPLAY_DROPS.load(Ordering::Relaxed),
            LOG_DROPS.load(Ordering::Relaxed)
        );
    }
}

/// Stop on a failed startup precondition
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
