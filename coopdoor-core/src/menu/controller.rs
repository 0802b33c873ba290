//! Menu controller
//!
//! Applies transitions from [`MenuState::transition`], performs their
//! side effects against the devices, and redraws after every input.

use coopdoor_hal::StorageKey;

use super::render::{self, Snapshot};
use super::state::{Action, Field, MenuState, Transition};
use crate::config::{settings, MenuConfig, TIMEZONE_STEP_MINUTES};
use crate::controller::{Devices, Platform};
use crate::door::Travel;
use crate::traits::{Button, ButtonInput, CharDisplay};

/// Step `value` by `delta` within `first..first + count`, wrapping
fn cycle(value: u8, delta: i8, first: u8, count: u8) -> u8 {
    let offset = (value as i16 - first as i16 + delta as i16).rem_euclid(count as i16);
    (offset + first as i16) as u8
}

/// Menu state plus the inactivity timer
pub struct Menu {
    state: MenuState,
    last_activity_ms: u64,
    config: MenuConfig,
}

impl Menu {
    /// Create a menu in the off state
    pub fn new(config: MenuConfig) -> Self {
        Self {
            state: MenuState::Off,
            last_activity_ms: 0,
            config,
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Handle one button gesture
    ///
    /// Every input resets the inactivity timer and redraws, even when the
    /// state does not change.
    pub fn handle_input<P: Platform>(
        &mut self,
        input: ButtonInput,
        devices: &mut Devices<P>,
        now_ms: u64,
    ) {
        self.last_activity_ms = now_ms;

        let Transition { next, action } = self.state.transition(input);
        if next != self.state {
            debug!("Menu {} -> {} on {}", self.state, next, input);
        }
        self.state = next;

        self.apply(action, devices);
        self.refresh(devices);
    }

    /// Blank the display once the inactivity timeout has passed
    ///
    /// Returns true if the menu timed out on this call.
    pub fn tick<P: Platform>(&mut self, devices: &mut Devices<P>, now_ms: u64) -> bool {
        if self.state == MenuState::Off {
            return false;
        }
        if now_ms.saturating_sub(self.last_activity_ms) <= self.config.inactivity_timeout_ms {
            return false;
        }

        info!("Menu inactive, turning display off");
        if self.state == MenuState::CalibrationWait {
            devices.door.unblock();
        }
        self.state = MenuState::Off;
        self.refresh(devices);
        true
    }

    /// Redraw the current state
    pub fn refresh<P: Platform>(&mut self, devices: &mut Devices<P>) {
        let result = if self.state == MenuState::Off {
            devices
                .display
                .clear()
                .and_then(|_| devices.display.set_power(false))
        } else {
            let view = snapshot(devices);
            render::render(&mut devices.display, self.state, &view)
        };

        if let Err(e) = result {
            warn!("Display update failed: {}", e);
        }
    }

    fn apply<P: Platform>(&mut self, action: Action, devices: &mut Devices<P>) {
        match action {
            Action::None => {}
            Action::Wake => {
                if let Err(e) = devices.display.set_power(true) {
                    warn!("Display power-on failed: {}", e);
                }
            }
            Action::ToggleDoor => {
                let result = if devices.door.is_open() {
                    devices.close_door()
                } else {
                    devices.open_door(false)
                };
                if let Err(e) = result {
                    info!("Door toggle ignored: {}", e);
                }
            }
            Action::JogOpen => {
                devices.jog(Travel::Opening, Button::Right);
            }
            Action::JogClose => {
                devices.jog(Travel::Closing, Button::Left);
            }
            Action::BeginCalibration => devices.door.block(),
            Action::Calibrate => devices.calibrate_door(self.config.result_screen_ms),
            Action::CancelCalibration => devices.door.unblock(),
            Action::Adjust(field, delta) => adjust(devices, field, delta),
            Action::Commit(field) => commit(devices, field),
        }
    }
}

fn snapshot<P: Platform>(devices: &mut Devices<P>) -> Snapshot {
    Snapshot {
        door_open: devices.door.is_open(),
        now: devices.clock.now(),
        open_time: devices.clock.open_time(),
        close_time: devices.clock.close_time(),
        config: devices.clock.config(),
        temperature_x10: devices.clock.temperature_x10(),
    }
}

fn adjust<P: Platform>(devices: &mut Devices<P>, field: Field, delta: i8) {
    let clock = &mut devices.clock;
    let now = clock.now();

    match field {
        Field::OpenDelay => clock.set_open_delay(clock.open_delay().wrapping_add(delta as i16)),
        Field::CloseDelay => clock.set_close_delay(clock.close_delay().wrapping_add(delta as i16)),
        Field::Timezone => clock.set_timezone(
            clock
                .timezone()
                .wrapping_add((delta as i16).wrapping_mul(TIMEZONE_STEP_MINUTES)),
        ),
        Field::Hour => clock.set_time(cycle(now.hour, delta, 0, 24), now.minute),
        Field::Minute => clock.set_time(now.hour, cycle(now.minute, delta, 0, 60)),
        Field::Year => clock.set_date(now.year.wrapping_add_signed(delta as i16), now.month, now.day),
        Field::Month => clock.set_date(now.year, cycle(now.month, delta, 1, 12), now.day),
        Field::Day => clock.set_date(now.year, now.month, cycle(now.day, delta, 1, 31)),
    }
}

fn commit<P: Platform>(devices: &mut Devices<P>, field: Field) {
    let (key, value) = match field {
        Field::OpenDelay => (StorageKey::OpenDelay, devices.clock.open_delay()),
        Field::CloseDelay => (StorageKey::CloseDelay, devices.clock.close_delay()),
        Field::Timezone => (StorageKey::Timezone, devices.clock.timezone()),
        // Time and date go straight to the RTC
        _ => return,
    };

    match settings::save(&mut devices.store, key, &value) {
        Ok(()) => info!("Saved {} = {}", key, value),
        Err(e) => error!("Failed to save {}: {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_within_domain() {
        assert_eq!(cycle(23, 1, 0, 24), 0);
        assert_eq!(cycle(0, -1, 0, 24), 23);
        assert_eq!(cycle(59, 1, 0, 60), 0);
        assert_eq!(cycle(12, 1, 1, 12), 1);
        assert_eq!(cycle(1, -1, 1, 12), 12);
        assert_eq!(cycle(31, 1, 1, 31), 1);
        assert_eq!(cycle(5, 1, 1, 31), 6);
    }

    #[test]
    fn test_cycle_recovers_out_of_range_value() {
        // An RTC reporting month 0 still lands inside 1..=12
        assert_eq!(cycle(0, 1, 1, 12), 1);
        assert_eq!(cycle(0, -1, 1, 12), 11);
    }
}
