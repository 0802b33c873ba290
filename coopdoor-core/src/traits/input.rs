//! Two-button input
//!
//! Press-pattern detection (debounce, double and long press) happens in
//! the driver; the core only sees finished gestures.

/// One of the two menu buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Right,
}

/// Press pattern recognised on a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    Short,
    Double,
    Long,
}

/// A finished gesture on a specific button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonInput {
    LeftShort,
    LeftDouble,
    LeftLong,
    RightShort,
    RightDouble,
    RightLong,
}

impl ButtonInput {
    /// Every input, left button first
    pub const ALL: [ButtonInput; 6] = [
        ButtonInput::LeftShort,
        ButtonInput::LeftDouble,
        ButtonInput::LeftLong,
        ButtonInput::RightShort,
        ButtonInput::RightDouble,
        ButtonInput::RightLong,
    ];

    pub const fn new(button: Button, gesture: Gesture) -> Self {
        match (button, gesture) {
            (Button::Left, Gesture::Short) => ButtonInput::LeftShort,
            (Button::Left, Gesture::Double) => ButtonInput::LeftDouble,
            (Button::Left, Gesture::Long) => ButtonInput::LeftLong,
            (Button::Right, Gesture::Short) => ButtonInput::RightShort,
            (Button::Right, Gesture::Double) => ButtonInput::RightDouble,
            (Button::Right, Gesture::Long) => ButtonInput::RightLong,
        }
    }

    pub const fn button(self) -> Button {
        match self {
            ButtonInput::LeftShort | ButtonInput::LeftDouble | ButtonInput::LeftLong => {
                Button::Left
            }
            _ => Button::Right,
        }
    }
}

/// Live button levels, used while a long press keeps the door moving
pub trait ButtonPad {
    /// Check if the button is currently held down
    fn is_pressed(&mut self, button: Button) -> bool;
}
