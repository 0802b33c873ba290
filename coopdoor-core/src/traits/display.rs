//! Character display trait for the 16x2 menu LCD

/// Display width in characters
pub const LCD_COLS: u8 = 16;

/// Display height in rows
pub const LCD_ROWS: u8 = 2;

/// HD44780 ROM code for the degree sign
pub const DEGREE_GLYPH: u8 = 0xDF;

/// Errors that can occur with display communication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer failed (I2C NACK, arbitration, ...)
    Bus,
    /// Cursor position outside the panel
    OutOfBounds,
}

/// Trait for a character LCD
///
/// The display is a dumb surface: the menu decides what to show and
/// the driver only places characters.
pub trait CharDisplay {
    /// Clear the screen and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor
    ///
    /// - `col`: Column number (0-15)
    /// - `row`: Row number (0-1)
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Write ASCII text at the cursor
    fn write_str(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Write a raw character code at the cursor (for ROM glyphs)
    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError>;

    /// Switch the panel and backlight on or off
    fn set_power(&mut self, on: bool) -> Result<(), DisplayError>;
}

/// Helper trait for drawing whole screens
pub trait CharDisplayExt: CharDisplay {
    /// Clear the screen and draw two lines
    fn show(&mut self, top: &str, bottom: &str) -> Result<(), DisplayError> {
        self.clear()?;
        self.write_str(top)?;
        self.set_cursor(0, 1)?;
        self.write_str(bottom)
    }
}

// Blanket implementation for all CharDisplay types
impl<T: CharDisplay> CharDisplayExt for T {}
