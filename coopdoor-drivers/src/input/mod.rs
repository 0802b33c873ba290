//! Button input

pub mod buttons;

pub use buttons::{Buttons, GestureConfig, GestureDetector};
