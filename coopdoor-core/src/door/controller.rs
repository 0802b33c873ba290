//! Door controller
//!
//! All motions block until complete. Every run that waits on the limit
//! switch is bounded by [`DoorConfig::max_steps`]; reaching the bound
//! counts as completion and is only reported through [`Motion::truncated`].

use coopdoor_hal::{KeyValueStore, StorageKey};
use embedded_hal::digital::InputPin;
use serde::Serialize;

use crate::config::{settings, DoorConfig};
use crate::traits::Actuator;

/// Errors for commands rejected in the current state
///
/// A rejected command does not move the actuator or change any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DoorError {
    /// Calibration is in progress
    Blocked,
    /// Door is already open and no override was given
    AlreadyOpen,
    /// Door is not open
    NotOpen,
    /// No calibrated close distance yet
    NotCalibrated,
}

/// Result of a completed motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion {
    /// Steps actually driven
    pub steps: u32,
    /// The run stopped at its step bound instead of at the limit switch
    pub truncated: bool,
}

/// Manual jog direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Travel {
    Opening,
    Closing,
}

/// Door position and guard state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoorState {
    /// Persisted
    pub is_open: bool,
    /// Persisted; zero means not calibrated
    pub steps_to_close: u32,
    /// Transient calibration guard, never persisted
    pub blocked: bool,
}

/// Door controller over an actuator and an opening limit switch
///
/// The switch reads high once the door reaches the fully open position.
pub struct Door<M, L> {
    actuator: M,
    limit: L,
    config: DoorConfig,
    state: DoorState,
}

impl<M: Actuator, L: InputPin> Door<M, L> {
    /// Create a closed, uncalibrated door
    pub fn new(actuator: M, limit: L, config: DoorConfig) -> Self {
        Self {
            actuator,
            limit,
            config,
            state: DoorState::default(),
        }
    }

    /// Restore persisted position and calibration
    pub fn restore(&mut self, is_open: bool, steps_to_close: u32) {
        self.state.is_open = is_open;
        self.state.steps_to_close = steps_to_close;
        info!(
            "Door restored: open={}, steps_to_close={}",
            is_open, steps_to_close
        );
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn is_blocked(&self) -> bool {
        self.state.blocked
    }

    pub fn steps_to_close(&self) -> u32 {
        self.state.steps_to_close
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    pub fn actuator(&self) -> &M {
        &self.actuator
    }

    /// Suspend automatic open/close while calibrating
    pub fn block(&mut self) {
        debug!("Door blocked");
        self.state.blocked = true;
    }

    pub fn unblock(&mut self) {
        debug!("Door unblocked");
        self.state.blocked = false;
    }

    /// Check whether [`Door::open`] would be accepted
    pub fn check_open(&self, override_open: bool) -> Result<(), DoorError> {
        if self.state.blocked {
            return Err(DoorError::Blocked);
        }
        if self.state.is_open && !override_open {
            return Err(DoorError::AlreadyOpen);
        }
        Ok(())
    }

    /// Check whether [`Door::close`] would be accepted
    pub fn check_close(&self) -> Result<(), DoorError> {
        if self.state.blocked {
            return Err(DoorError::Blocked);
        }
        if !self.state.is_open {
            return Err(DoorError::NotOpen);
        }
        if self.state.steps_to_close == 0 {
            return Err(DoorError::NotCalibrated);
        }
        Ok(())
    }

    /// Raise the door until the limit switch trips
    ///
    /// Rejected while blocked, or when already open unless
    /// `override_open` is set.
    pub fn open<K: KeyValueStore + ?Sized>(
        &mut self,
        override_open: bool,
        store: &mut K,
    ) -> Result<Motion, DoorError> {
        self.check_open(override_open)?;

        info!("Opening door");
        self.actuator.enable(true);
        let motion = self.run_to_limit();
        self.state.is_open = true;
        persist(store, StorageKey::DoorOpen, &true);
        self.actuator.enable(false);

        Ok(motion)
    }

    /// Lower the door by the calibrated step count
    ///
    /// Runs open-loop; the limit switch is not consulted.
    pub fn close<K: KeyValueStore + ?Sized>(&mut self, store: &mut K) -> Result<Motion, DoorError> {
        self.check_close()?;

        let steps = self.state.steps_to_close;
        info!("Closing door ({} steps)", steps);
        let signed = self.signed_steps(Travel::Closing, steps);
        self.actuator.enable(true);
        self.actuator.step(signed);
        self.state.is_open = false;
        persist(store, StorageKey::DoorOpen, &false);
        self.actuator.enable(false);

        Ok(Motion {
            steps,
            truncated: false,
        })
    }

    /// Measure the close distance by raising a closed door to the limit
    ///
    /// The caller must have blocked the door and the operator must have
    /// closed it by hand first. Calibration is allowed while blocked.
    pub fn calibrate<K: KeyValueStore + ?Sized>(&mut self, store: &mut K) -> Motion {
        info!("Calibrating door");
        self.actuator.enable(true);
        let motion = self.run_to_limit();
        if motion.steps == 0 {
            warn!("Limit switch already tripped, door left uncalibrated");
        }

        self.state.steps_to_close = motion.steps;
        self.state.is_open = true;
        persist(store, StorageKey::StepsToClose, &motion.steps);
        persist(store, StorageKey::DoorOpen, &true);
        self.actuator.enable(false);

        info!("Calibrated: {} steps to close", motion.steps);
        motion
    }

    /// Raise by a fixed count without touching the tracked state
    pub fn open_steps(&mut self, steps: u32) -> Motion {
        self.drive(Travel::Opening, steps)
    }

    /// Lower by a fixed count without touching the tracked state
    pub fn close_steps(&mut self, steps: u32) -> Motion {
        self.drive(Travel::Closing, steps)
    }

    /// Step one at a time while `held` returns true
    ///
    /// Bounded by [`DoorConfig::max_jog_steps`]. Like the fixed-count
    /// primitives this bypasses state tracking and works while blocked.
    pub fn jog<F: FnMut() -> bool>(&mut self, travel: Travel, mut held: F) -> Motion {
        let unit = self.signed_steps(travel, 1);
        let mut motion = Motion::default();

        self.actuator.enable(true);
        while held() {
            if motion.steps >= self.config.max_jog_steps {
                motion.truncated = true;
                warn!("Jog stopped at {} steps", motion.steps);
                break;
            }
            self.actuator.step(unit);
            motion.steps += 1;
        }
        self.actuator.enable(false);

        trace!("Jogged {} steps", motion.steps);
        motion
    }

    fn drive(&mut self, travel: Travel, steps: u32) -> Motion {
        let signed = self.signed_steps(travel, steps);
        self.actuator.enable(true);
        self.actuator.step(signed);
        self.actuator.enable(false);
        Motion {
            steps,
            truncated: false,
        }
    }

    /// Step towards open until the switch trips or the bound is reached
    fn run_to_limit(&mut self) -> Motion {
        let unit = self.signed_steps(Travel::Opening, 1);
        let mut motion = Motion::default();

        while !self.at_limit() {
            if motion.steps >= self.config.max_steps {
                warn!("Limit switch not reached after {} steps", motion.steps);
                motion.truncated = true;
                break;
            }
            self.actuator.step(unit);
            motion.steps += 1;
        }
        motion
    }

    fn at_limit(&mut self) -> bool {
        // A faulty read counts as not there yet; the step bound still applies
        self.limit.is_high().unwrap_or_else(|_| {
            warn!("Limit switch read failed");
            false
        })
    }

    fn signed_steps(&self, travel: Travel, steps: u32) -> i32 {
        let direction = match travel {
            Travel::Opening => self.config.open_direction,
            Travel::Closing => self.config.open_direction.opposite(),
        };
        direction.signum() * i32::try_from(steps).unwrap_or(i32::MAX)
    }
}

fn persist<K: KeyValueStore + ?Sized, V: Serialize>(store: &mut K, key: StorageKey, value: &V) {
    if let Err(e) = settings::save(store, key, value) {
        error!("Failed to persist {}: {}", key, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::load_value;
    use crate::testing::{MemoryStore, SimActuator, SimLimitSwitch};
    use crate::traits::Direction;

    fn door(limit: SimLimitSwitch) -> Door<SimActuator, SimLimitSwitch> {
        Door::new(SimActuator::new(), limit, DoorConfig::default())
    }

    fn small_config() -> DoorConfig {
        DoorConfig {
            max_steps: 50,
            max_jog_steps: 10,
            open_direction: Direction::CounterClockwise,
        }
    }

    #[test]
    fn test_close_before_calibrate_is_rejected() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(100));
        door.restore(true, 0);

        assert_eq!(door.close(&mut store), Err(DoorError::NotCalibrated));
        assert!(door.is_open());
        assert_eq!(door.actuator().position(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_calibrate_counts_steps() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(120));
        door.block();

        let motion = door.calibrate(&mut store);
        assert_eq!(motion, Motion { steps: 120, truncated: false });
        assert!(door.is_open());
        assert_eq!(door.steps_to_close(), 120);
        // Opening runs counter-clockwise by default
        assert_eq!(door.actuator().position(), -120);
        assert!(!door.actuator().is_enabled());

        assert_eq!(load_value::<_, u32>(&mut store, StorageKey::StepsToClose), Ok(120));
        assert_eq!(load_value::<_, bool>(&mut store, StorageKey::DoorOpen), Ok(true));
    }

    #[test]
    fn test_open_while_blocked_is_rejected() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(10));
        door.block();

        assert_eq!(door.open(false, &mut store), Err(DoorError::Blocked));
        assert_eq!(door.open(true, &mut store), Err(DoorError::Blocked));
        assert!(!door.is_open());
        assert_eq!(door.actuator().position(), 0);
    }

    #[test]
    fn test_close_while_blocked_is_rejected() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(10));
        door.restore(true, 10);
        door.block();

        assert_eq!(door.close(&mut store), Err(DoorError::Blocked));
        assert!(door.is_open());
    }

    #[test]
    fn test_open_then_close() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(30));
        door.restore(false, 30);

        let opened = door.open(false, &mut store).unwrap();
        assert_eq!(opened.steps, 30);
        assert!(door.is_open());

        let closed = door.close(&mut store).unwrap();
        assert_eq!(closed.steps, 30);
        assert!(!door.is_open());
        assert_eq!(door.actuator().position(), 0);
        assert_eq!(door.actuator().enable_cycles(), 2);
        assert_eq!(load_value::<_, bool>(&mut store, StorageKey::DoorOpen), Ok(false));
    }

    #[test]
    fn test_open_when_open_needs_override() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(5));
        door.restore(true, 5);

        assert_eq!(door.open(false, &mut store), Err(DoorError::AlreadyOpen));
        assert_eq!(door.actuator().position(), 0);

        let motion = door.open(true, &mut store).unwrap();
        assert_eq!(motion.steps, 5);
        assert!(door.is_open());
    }

    #[test]
    fn test_close_when_closed_is_rejected() {
        let mut store = MemoryStore::new();
        let mut door = door(SimLimitSwitch::trips_after(5));
        door.restore(false, 5);

        assert_eq!(door.close(&mut store), Err(DoorError::NotOpen));
        assert_eq!(door.actuator().position(), 0);
    }

    #[test]
    fn test_stuck_switch_is_bounded() {
        let mut store = MemoryStore::new();
        let mut door = Door::new(SimActuator::new(), SimLimitSwitch::never(), small_config());

        let motion = door.open(false, &mut store).unwrap();
        assert_eq!(motion, Motion { steps: 50, truncated: true });
        assert!(door.is_open());
    }

    #[test]
    fn test_faulty_switch_counts_as_not_at_limit() {
        let mut store = MemoryStore::new();
        let mut door = Door::new(SimActuator::new(), SimLimitSwitch::faulty(), small_config());

        let motion = door.calibrate(&mut store);
        assert!(motion.truncated);
        assert_eq!(door.steps_to_close(), 50);
    }

    #[test]
    fn test_storage_failure_is_ignored() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let mut door = door(SimLimitSwitch::trips_after(8));

        assert!(door.open(false, &mut store).is_ok());
        assert!(door.is_open());
    }

    #[test]
    fn test_jog_primitives_leave_state_alone() {
        let mut door = door(SimLimitSwitch::never());
        door.restore(false, 40);

        door.open_steps(7);
        assert_eq!(door.actuator().position(), -7);
        door.close_steps(3);
        assert_eq!(door.actuator().position(), -4);
        assert_eq!(door.state(), DoorState { is_open: false, steps_to_close: 40, blocked: false });
    }

    #[test]
    fn test_jog_follows_button_and_is_bounded() {
        let mut door = Door::new(SimActuator::new(), SimLimitSwitch::never(), small_config());

        let mut reads = 0;
        let motion = door.jog(Travel::Closing, || {
            reads += 1;
            reads <= 4
        });
        assert_eq!(motion, Motion { steps: 4, truncated: false });
        assert_eq!(door.actuator().position(), 4);

        let motion = door.jog(Travel::Opening, || true);
        assert_eq!(motion, Motion { steps: 10, truncated: true });
        assert!(!door.actuator().is_enabled());
    }

    #[test]
    fn test_jog_works_while_blocked() {
        let mut door = Door::new(SimActuator::new(), SimLimitSwitch::never(), small_config());
        door.block();

        let mut reads = 0;
        let motion = door.jog(Travel::Closing, || {
            reads += 1;
            reads <= 2
        });
        assert_eq!(motion.steps, 2);
    }
}
