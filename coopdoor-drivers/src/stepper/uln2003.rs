//! ULN2003 unipolar stepper driver
//!
//! Drives a 28BYJ-48 style geared stepper through a ULN2003 darlington
//! array. The array's supply runs through a relay so the coils draw
//! nothing while the door is parked.
//!
//! # Coil sequences
//!
//! Full step energises two adjacent coils at a time (more torque). Half
//! step alternates between one and two coils, doubling the resolution.
//! Bits 0..=3 of each pattern map to IN1..=IN4.

use coopdoor_core::traits::Actuator;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

const FULL_STEP: [u8; 4] = [0b0011, 0b0110, 0b1100, 0b1001];
const HALF_STEP: [u8; 8] = [
    0b0001, 0b0011, 0b0010, 0b0110, 0b0100, 0b1100, 0b1000, 0b1001,
];

/// Coil sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepMode {
    #[default]
    Full,
    Half,
}

impl StepMode {
    fn sequence(self) -> &'static [u8] {
        match self {
            StepMode::Full => &FULL_STEP,
            StepMode::Half => &HALF_STEP,
        }
    }
}

/// ULN2003 driver configuration
#[derive(Debug, Clone)]
pub struct Uln2003Config {
    pub mode: StepMode,
    /// Time each coil pattern is held (µs)
    pub step_delay_us: u32,
    /// Relay is active-high (true) or active-low (false)
    pub relay_active_high: bool,
}

impl Default for Uln2003Config {
    fn default() -> Self {
        // ~15 RPM on a 2048 step/rev 28BYJ-48 in full-step mode
        Self {
            mode: StepMode::Full,
            step_delay_us: 2_000,
            relay_active_high: true,
        }
    }
}

/// ULN2003 stepper driver with a supply relay
pub struct Uln2003<P, R, D> {
    coils: [P; 4],
    relay: R,
    delay: D,
    config: Uln2003Config,
    /// Index into the coil sequence
    phase: usize,
    enabled: bool,
    /// Pin writes that failed since creation
    faults: u32,
}

impl<P, R, D> Uln2003<P, R, D>
where
    P: OutputPin,
    R: OutputPin,
    D: DelayNs,
{
    /// Create a driver with the relay released and all coils off
    pub fn new(coils: [P; 4], relay: R, delay: D, config: Uln2003Config) -> Self {
        let mut driver = Self {
            coils,
            relay,
            delay,
            config,
            phase: 0,
            enabled: false,
            faults: 0,
        };
        driver.release();
        driver
    }

    pub fn config(&self) -> &Uln2003Config {
        &self.config
    }

    /// Pin writes that failed; a non-zero count points at wiring trouble
    pub fn fault_count(&self) -> u32 {
        self.faults
    }

    fn relay_level(&self, on: bool) -> PinState {
        PinState::from(on == self.config.relay_active_high)
    }

    fn write_pattern(&mut self, pattern: u8) {
        for (bit, coil) in self.coils.iter_mut().enumerate() {
            let state = PinState::from(pattern & (1 << bit) != 0);
            if coil.set_state(state).is_err() {
                self.faults = self.faults.saturating_add(1);
            }
        }
    }

    fn release(&mut self) {
        self.write_pattern(0);
        let level = self.relay_level(false);
        if self.relay.set_state(level).is_err() {
            self.faults = self.faults.saturating_add(1);
        }
    }

    fn advance(&mut self, forward: bool) {
        let len = self.config.mode.sequence().len();
        self.phase = if forward {
            (self.phase + 1) % len
        } else {
            (self.phase + len - 1) % len
        };
        let pattern = self.config.mode.sequence()[self.phase];
        self.write_pattern(pattern);
        self.delay.delay_us(self.config.step_delay_us);
    }
}

impl<P, R, D> Actuator for Uln2003<P, R, D>
where
    P: OutputPin,
    R: OutputPin,
    D: DelayNs,
{
    fn enable(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            let level = self.relay_level(true);
            if self.relay.set_state(level).is_err() {
                self.faults = self.faults.saturating_add(1);
            }
            // Hold the last position so the first step moves by exactly one
            let pattern = self.config.mode.sequence()[self.phase];
            self.write_pattern(pattern);
        } else {
            self.release();
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn step(&mut self, steps: i32) {
        let forward = steps > 0;
        for _ in 0..steps.unsigned_abs() {
            self.advance(forward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coopdoor_core::testing::NoDelay;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Debug, Default)]
    struct MockPin {
        high: bool,
        writes: u32,
        fail: bool,
    }

    impl ErrorType for MockPin {
        type Error = ErrorKind;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set_state(PinState::Low)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set_state(PinState::High)
        }

        fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            self.high = state == PinState::High;
            self.writes += 1;
            Ok(())
        }
    }

    /// Relay that cannot fail
    #[derive(Debug, Default)]
    struct Relay(bool);

    impl ErrorType for Relay {
        type Error = Infallible;
    }

    impl OutputPin for Relay {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0 = true;
            Ok(())
        }
    }

    type Driver = Uln2003<MockPin, Relay, NoDelay>;

    fn driver(mode: StepMode) -> Driver {
        let config = Uln2003Config {
            mode,
            ..Default::default()
        };
        Uln2003::new(Default::default(), Relay::default(), NoDelay::new(), config)
    }

    fn pattern(d: &Driver) -> u8 {
        d.coils
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, c)| acc | ((c.high as u8) << bit))
    }

    #[test]
    fn test_starts_released() {
        let d = driver(StepMode::Full);
        assert!(!d.is_enabled());
        assert!(!d.relay.0);
        assert_eq!(pattern(&d), 0);
    }

    #[test]
    fn test_enable_closes_relay_and_holds_phase() {
        let mut d = driver(StepMode::Full);
        d.enable(true);
        assert!(d.relay.0);
        assert_eq!(pattern(&d), FULL_STEP[0]);

        d.enable(false);
        assert!(!d.relay.0);
        assert_eq!(pattern(&d), 0);
    }

    #[test]
    fn test_active_low_relay() {
        let config = Uln2003Config {
            relay_active_high: false,
            ..Default::default()
        };
        let mut d: Driver =
            Uln2003::new(Default::default(), Relay::default(), NoDelay::new(), config);
        assert!(d.relay.0);
        d.enable(true);
        assert!(!d.relay.0);
    }

    #[test]
    fn test_full_step_sequence() {
        let mut d = driver(StepMode::Full);
        d.enable(true);
        d.step(1);
        assert_eq!(pattern(&d), 0b0110);
        d.step(2);
        assert_eq!(pattern(&d), 0b1001);
        // Wraps back to the first pattern
        d.step(1);
        assert_eq!(pattern(&d), 0b0011);
    }

    #[test]
    fn test_reverse_retraces_sequence() {
        let mut d = driver(StepMode::Half);
        d.enable(true);
        d.step(-1);
        assert_eq!(pattern(&d), 0b1001);
        d.step(-1);
        assert_eq!(pattern(&d), 0b1000);
        d.step(2);
        assert_eq!(pattern(&d), HALF_STEP[0]);
    }

    #[test]
    fn test_phase_survives_disable() {
        let mut d = driver(StepMode::Full);
        d.enable(true);
        d.step(3);
        d.enable(false);
        d.enable(true);
        assert_eq!(pattern(&d), FULL_STEP[3]);
    }

    #[test]
    fn test_step_delay_per_step() {
        let mut d = driver(StepMode::Full);
        d.enable(true);
        d.step(500);
        assert_eq!(d.delay.total_ms(), 1_000);
        d.step(0);
        assert_eq!(d.delay.total_ms(), 1_000);
    }

    #[test]
    fn test_pin_faults_counted() {
        let mut d = driver(StepMode::Full);
        d.coils[2].fail = true;
        d.enable(true);
        d.step(2);
        assert_eq!(d.fault_count(), 3);
    }
}
