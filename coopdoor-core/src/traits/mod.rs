//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations. The limit switch and delays
//! use `embedded-hal` 1.0 directly.

pub mod actuator;
pub mod display;
pub mod input;
pub mod rtc;

pub use actuator::{Actuator, Direction};
pub use display::{CharDisplay, CharDisplayExt, DisplayError, DEGREE_GLYPH, LCD_COLS, LCD_ROWS};
pub use input::{Button, ButtonInput, ButtonPad, Gesture};
pub use rtc::{DateTime, TimeSource};
