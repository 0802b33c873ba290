//! Configuration type definitions

use crate::traits::Direction;

/// Upper bound on actuator steps for a single open or calibration run
pub const DEFAULT_MAX_STEPS: u32 = 65_534;

/// Upper bound on steps for one held-button jog
pub const DEFAULT_MAX_JOG_STEPS: u32 = 4_096;

/// Menu inactivity timeout before the display blanks (ms)
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 30_000;

/// How long calibration result screens stay up (ms)
pub const DEFAULT_RESULT_SCREEN_MS: u32 = 2_000;

/// Timezone counter increment in minutes
pub const TIMEZONE_STEP_MINUTES: i16 = 60;

/// Door actuation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoorConfig {
    /// Step bound for runs that wait on the limit switch
    ///
    /// Hitting the bound is treated as having reached the limit.
    pub max_steps: u32,
    /// Step bound for one manual jog
    pub max_jog_steps: u32,
    /// Actuator direction that raises the door
    pub open_direction: Direction,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_jog_steps: DEFAULT_MAX_JOG_STEPS,
            open_direction: Direction::CounterClockwise,
        }
    }
}

/// Menu behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuConfig {
    /// Time without input before returning to the off state
    pub inactivity_timeout_ms: u64,
    /// Dwell time for each calibration result screen
    pub result_screen_ms: u32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            result_screen_ms: DEFAULT_RESULT_SCREEN_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_defaults() {
        let config = DoorConfig::default();
        assert_eq!(config.max_steps, 65_534);
        assert!(config.max_jog_steps > 0);
        assert!(config.max_jog_steps < config.max_steps);
    }

    #[test]
    fn test_menu_defaults() {
        let config = MenuConfig::default();
        assert_eq!(config.inactivity_timeout_ms, 30_000);
        assert_eq!(config.result_screen_ms, 2_000);
    }
}
