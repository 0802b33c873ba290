//! HD44780 character LCD behind a PCF8574 I2C backpack
//!
//! The backpack exposes the LCD in 4-bit mode. Expander bit layout:
//!
//! | Bit | Signal    |
//! |-----|-----------|
//! | 0   | RS        |
//! | 1   | RW        |
//! | 2   | EN        |
//! | 3   | backlight |
//! | 4-7 | D4-D7     |
//!
//! Each byte goes out as two nibbles, high first, each latched by a
//! falling edge on EN.

use coopdoor_core::traits::{CharDisplay, DisplayError, LCD_COLS, LCD_ROWS};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Usual address of a PCF8574 backpack (A0-A2 open)
pub const PCF8574_ADDRESS: u8 = 0x27;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const ENTRY_MODE: u8 = 0x04;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const FUNCTION_SET: u8 = 0x20;
    pub const SET_DDRAM: u8 = 0x80;

    /// Entry mode: cursor moves right, no shift
    pub const ENTRY_LEFT: u8 = 0x02;
    /// Display control: display on (cursor and blink stay off)
    pub const DISPLAY_ON: u8 = 0x04;
    /// Function set: two lines, 5x8 font, 4-bit bus
    pub const TWO_LINES: u8 = 0x08;
}

/// DDRAM address of the first column of each row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// Typical command execution time (µs)
const COMMAND_US: u32 = 50;
/// Clear and home take much longer (µs)
const CLEAR_US: u32 = 2_000;

/// HD44780 driver
pub struct Hd44780<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<I: I2c, D: DelayNs> Hd44780<I, D> {
    /// Create a driver; call [`init`](Self::init) before drawing
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: true,
        }
    }

    /// Run the 4-bit initialisation sequence and clear the panel
    pub fn init(&mut self) -> Result<(), DisplayError> {
        // Power-on settling time
        self.delay.delay_ms(50);

        // Force 8-bit mode three times, then switch to 4-bit
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x30, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x20, 0)?;
        self.delay.delay_us(COMMAND_US);

        self.command(cmd::FUNCTION_SET | cmd::TWO_LINES)?;
        self.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON)?;
        self.clear()?;
        self.command(cmd::ENTRY_MODE | cmd::ENTRY_LEFT)
    }

    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn control_bits(&self) -> u8 {
        if self.backlight {
            BACKLIGHT
        } else {
            0
        }
    }

    /// Latch the high nibble of `value`
    fn write_nibble(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        let bits = (value & 0xF0) | mode | self.control_bits();
        self.i2c
            .write(self.address, &[bits | EN, bits])
            .map_err(|_| DisplayError::Bus)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        let control = mode | self.control_bits();
        let high = (value & 0xF0) | control;
        let low = (value << 4) | control;
        self.i2c
            .write(self.address, &[high | EN, high, low | EN, low])
            .map_err(|_| DisplayError::Bus)?;
        self.delay.delay_us(COMMAND_US);
        Ok(())
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0)
    }
}

impl<I: I2c, D: DelayNs> CharDisplay for Hd44780<I, D> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(cmd::CLEAR)?;
        self.delay.delay_us(CLEAR_US);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if col >= LCD_COLS || row >= LCD_ROWS {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(cmd::SET_DDRAM | (ROW_OFFSETS[row as usize] + col))
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        text.bytes().try_for_each(|b| self.write_byte(b))
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, RS)
    }

    fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        let control = if on {
            cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON
        } else {
            cmd::DISPLAY_CONTROL
        };
        self.command(control)
    }
}
