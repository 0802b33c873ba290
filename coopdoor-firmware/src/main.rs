//! Coopdoor - Automated Coop Door Firmware
//!
//! Main firmware binary for RP2040-based door controllers. Opens the
//! door at (adjusted) sunrise, closes it at (adjusted) sunset, and
//! offers a two-button menu on a 16x2 LCD.
//!
//! Everything runs in one cooperative loop: buttons are sampled every
//! poll, the controller ticks at a slower fixed rate, and a door move
//! blocks the loop until it finishes.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Duration, Instant, Ticker};
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use coopdoor_core::config::Settings;
use coopdoor_core::door::Door;
use coopdoor_core::sun::Clock;
use coopdoor_core::traits::CharDisplayExt;
use coopdoor_core::{Controller, Devices};
use coopdoor_drivers::display::{Hd44780, PCF8574_ADDRESS};
use coopdoor_drivers::input::{Buttons, GestureConfig};
use coopdoor_drivers::rtc::Ds3231;
use coopdoor_drivers::stepper::{Uln2003, Uln2003Config};
use coopdoor_hal_rp2040::flash::Rp2040SettingsStore;

use crate::board::{Board, I2cBus};
use crate::config::{DOOR_CONFIG, MENU_CONFIG};

mod board;
mod config;

/// Button sampling interval in milliseconds
const POLL_INTERVAL_MS: u64 = 10;

/// Controller tick interval in milliseconds
const TICK_INTERVAL_MS: u64 = 100;

// Shared I2C bus (must live forever for the device handles)
static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Coopdoor firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Stepper on a ULN2003 board behind the supply relay
    let coils = [
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_13, Level::Low),
    ];
    let relay = Output::new(p.PIN_14, Level::Low);
    let actuator = Uln2003::new(coils, relay, Delay, Uln2003Config::default());
    let limit_switch = Input::new(p.PIN_15, Pull::Down);

    // RTC and LCD share I2C0
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let bus = I2C_BUS.init(RefCell::new(i2c));

    let mut display = Hd44780::new(RefCellDevice::new(bus), Delay, PCF8574_ADDRESS);
    if let Err(e) = display.init() {
        warn!("LCD init failed: {}", e);
    }

    let mut rtc = Ds3231::new(RefCellDevice::new(bus));
    match rtc.lost_power() {
        Ok(true) => {
            warn!("RTC lost power, time and date need setting");
            if let Err(e) = display.show("Clock stopped.", "Set time & date") {
                warn!("Display update failed: {}", e);
            }
        }
        Ok(false) => {}
        Err(e) => warn!("RTC not responding: {}", e),
    }
    info!("I2C devices initialized");

    // Restore persisted settings
    let mut store = Rp2040SettingsStore::new(p.FLASH, p.DMA_CH0);
    let settings = Settings::load(&mut store);
    info!(
        "Settings: tz={} open_delay={} close_delay={} steps={} open={}",
        settings.timezone_offset_minutes,
        settings.open_delay_minutes,
        settings.close_delay_minutes,
        settings.steps_to_close,
        settings.door_open
    );

    let mut door = Door::new(actuator, limit_switch, DOOR_CONFIG);
    door.restore(settings.door_open, settings.steps_to_close);

    let clock = Clock::new(rtc, config::sun_table(), settings.clock_config());

    let buttons = Buttons::new(
        Input::new(p.PIN_16, Pull::Down),
        Input::new(p.PIN_17, Pull::Down),
        &GestureConfig::default(),
    );

    let devices: Devices<Board> = Devices {
        door,
        clock,
        store,
        display,
        buttons,
        delay: Delay,
    };
    let mut controller = unwrap!(Controller::new(devices, MENU_CONFIG));

    info!("Control loop running");

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut next_tick_ms = 0;

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        if let Some(input) = controller.devices_mut().buttons.poll(now_ms) {
            debug!("Button {}", input);
            controller.handle_input(input, now_ms);
        }

        if now_ms >= next_tick_ms {
            controller.tick(now_ms);
            next_tick_ms = now_ms + TICK_INTERVAL_MS;
        }
    }
}
