//! Raspberry Pi Pico wiring
//!
//! | GPIO  | Function                        |
//! |-------|---------------------------------|
//! | 4, 5  | I2C0 SDA/SCL (DS3231, LCD)      |
//! | 10-13 | ULN2003 IN1-IN4                 |
//! | 14    | Stepper supply relay            |
//! | 15    | Door-open limit switch (to 3V3) |
//! | 16    | Left button (to 3V3)            |
//! | 17    | Right button (to 3V3)           |

use core::cell::RefCell;

use coopdoor_core::sun::DailyTable;
use coopdoor_core::Platform;
use coopdoor_drivers::display::Hd44780;
use coopdoor_drivers::input::Buttons;
use coopdoor_drivers::rtc::Ds3231;
use coopdoor_drivers::stepper::Uln2003;
use coopdoor_hal_rp2040::flash::Rp2040SettingsStore;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Delay;
use embedded_hal_bus::i2c::RefCellDevice;

/// I2C0 in blocking mode, shared by the RTC and the LCD
pub type I2cBus = RefCell<I2c<'static, I2C0, Blocking>>;

/// One device's handle on the shared bus
pub type SharedI2c = RefCellDevice<'static, I2c<'static, I2C0, Blocking>>;

/// Pico board with the reference door hardware
pub struct Board;

impl Platform for Board {
    type Actuator = Uln2003<Output<'static>, Output<'static>, Delay>;
    type LimitSwitch = Input<'static>;
    type Time = Ds3231<SharedI2c>;
    type Sun = DailyTable;
    type Store = Rp2040SettingsStore<'static>;
    type Display = Hd44780<SharedI2c, Delay>;
    type Buttons = Buttons<Input<'static>, Input<'static>>;
    type Delay = Delay;
}
