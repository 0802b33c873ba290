//! Button gesture detection
//!
//! Each button runs its own debounce and gesture state machine, polled
//! from the control loop with the current level and a millisecond clock.
//!
//! | Gesture | Condition                                            |
//! |---------|------------------------------------------------------|
//! | Short   | Released before `long_press_ms`, no second press     |
//! |         | within `double_press_ms`                             |
//! | Double  | Second press starts within `double_press_ms`         |
//! | Long    | Held for `long_press_ms`; reported while still held  |
//!
//! A long press is reported at the threshold rather than on release so
//! the menu can keep the motor running for as long as the button stays
//! down.

use coopdoor_core::traits::{Button, ButtonInput, ButtonPad, Gesture};
use embedded_hal::digital::InputPin;

/// Gesture timing
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Level must be stable this long to count (ms)
    pub debounce_ms: u64,
    /// Gap allowed between the two presses of a double press (ms)
    pub double_press_ms: u64,
    /// Hold time for a long press (ms)
    pub long_press_ms: u64,
    /// Button reads high when pressed
    pub active_high: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            double_press_ms: 300,
            long_press_ms: 1_000,
            active_high: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Debounce { since_ms: u64, second: bool },
    Pressed { since_ms: u64, second: bool },
    WaitSecondPress { released_ms: u64 },
    /// Long press reported, waiting for release
    Held,
}

/// Gesture state machine for one button
#[derive(Debug, Clone)]
pub struct GestureDetector {
    state: State,
    debounce_ms: u64,
    double_press_ms: u64,
    long_press_ms: u64,
}

impl GestureDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            state: State::Idle,
            debounce_ms: config.debounce_ms,
            double_press_ms: config.double_press_ms,
            long_press_ms: config.long_press_ms,
        }
    }

    /// True while no gesture is in progress
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Feed the current level; returns a gesture when one completes
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<Gesture> {
        match self.state {
            State::Idle => {
                if pressed {
                    self.state = State::Debounce {
                        since_ms: now_ms,
                        second: false,
                    };
                }
                None
            }

            State::Debounce { since_ms, second } => {
                if !pressed {
                    // Bounce: fall back to where the press started from
                    self.state = if second {
                        State::WaitSecondPress {
                            released_ms: since_ms,
                        }
                    } else {
                        State::Idle
                    };
                } else if now_ms.saturating_sub(since_ms) >= self.debounce_ms {
                    self.state = State::Pressed { since_ms, second };
                }
                None
            }

            State::Pressed { since_ms, second } => {
                if pressed {
                    if now_ms.saturating_sub(since_ms) >= self.long_press_ms {
                        self.state = State::Held;
                        return Some(Gesture::Long);
                    }
                    None
                } else if second {
                    self.state = State::Idle;
                    Some(Gesture::Double)
                } else {
                    self.state = State::WaitSecondPress {
                        released_ms: now_ms,
                    };
                    None
                }
            }

            State::WaitSecondPress { released_ms } => {
                if now_ms.saturating_sub(released_ms) > self.double_press_ms {
                    self.state = State::Idle;
                    return Some(Gesture::Short);
                }
                if pressed {
                    self.state = State::Debounce {
                        since_ms: now_ms,
                        second: true,
                    };
                }
                None
            }

            State::Held => {
                if !pressed {
                    self.state = State::Idle;
                }
                None
            }
        }
    }
}

/// The two menu buttons
pub struct Buttons<L, R> {
    left: L,
    right: R,
    active_high: bool,
    left_gesture: GestureDetector,
    right_gesture: GestureDetector,
    /// Right-button gesture finished on the same poll as a left one
    pending: Option<ButtonInput>,
}

impl<L: InputPin, R: InputPin> Buttons<L, R> {
    pub fn new(left: L, right: R, config: &GestureConfig) -> Self {
        Self {
            left,
            right,
            active_high: config.active_high,
            left_gesture: GestureDetector::new(config),
            right_gesture: GestureDetector::new(config),
            pending: None,
        }
    }

    /// Sample both buttons; returns at most one finished gesture
    pub fn poll(&mut self, now_ms: u64) -> Option<ButtonInput> {
        if let Some(input) = self.pending.take() {
            return Some(input);
        }

        let left = self.is_pressed(Button::Left);
        let right = self.is_pressed(Button::Right);
        let left = self
            .left_gesture
            .update(left, now_ms)
            .map(|g| ButtonInput::new(Button::Left, g));
        let right = self
            .right_gesture
            .update(right, now_ms)
            .map(|g| ButtonInput::new(Button::Right, g));

        match (left, right) {
            (Some(l), r) => {
                self.pending = r;
                Some(l)
            }
            (None, r) => r,
        }
    }
}

impl<L: InputPin, R: InputPin> ButtonPad for Buttons<L, R> {
    fn is_pressed(&mut self, button: Button) -> bool {
        let level = match button {
            Button::Left => self.left.is_high().map_err(drop),
            Button::Right => self.right.is_high().map_err(drop),
        };
        // A pin that cannot be read counts as released
        level.is_ok_and(|high| high == self.active_high)
    }
}
