//! Menu and control-loop behaviour against simulated hardware

use coopdoor_core::config::settings::load_value;
use coopdoor_core::config::MenuConfig;
use coopdoor_core::menu::MenuState;
use coopdoor_core::testing::{sim_devices, SimLimitSwitch, SimPlatform};
use coopdoor_core::traits::{Button, ButtonInput, DateTime, TimeSource};
use coopdoor_core::Controller;
use coopdoor_hal::StorageKey;

use ButtonInput::*;

fn controller(limit: SimLimitSwitch) -> Controller<SimPlatform> {
    let devices = sim_devices(DateTime::new(2024, 4, 10, 12, 0), limit);
    Controller::new(devices, MenuConfig::default()).unwrap()
}

fn press(c: &mut Controller<SimPlatform>, inputs: &[ButtonInput], now_ms: u64) {
    for input in inputs {
        c.handle_input(*input, now_ms);
    }
}

#[test]
fn test_wake_shows_status() {
    for input in ButtonInput::ALL {
        let mut c = controller(SimLimitSwitch::never());
        press(&mut c, &[input], 0);

        assert_eq!(c.menu().state(), MenuState::DoorStatus);
        let display = &c.devices().display;
        assert!(display.is_powered());
        assert_eq!(display.row(0).as_str(), "Door: Closed");
        assert_eq!(display.row(1).as_str(), "Opens at 06:00");
    }
}

#[test]
fn test_inactivity_turns_display_off() {
    let mut c = controller(SimLimitSwitch::never());
    press(&mut c, &[RightShort], 1_000);
    assert_eq!(c.menu().state(), MenuState::DoorStatus);

    press(&mut c, &[RightDouble, RightLong], 5_000);
    assert_eq!(c.menu().state(), MenuState::OpenDelayCounter);

    c.tick(35_000);
    assert_eq!(c.menu().state(), MenuState::OpenDelayCounter);

    c.tick(35_001);
    assert_eq!(c.menu().state(), MenuState::Off);
    assert!(!c.devices().display.is_powered());
    assert_eq!(c.devices().display.row(0).as_str(), "");
}

#[test]
fn test_every_input_redraws() {
    let mut c = controller(SimLimitSwitch::never());
    press(&mut c, &[RightShort], 0);
    let before = c.devices().display.clear_count();

    // TempAndDate ignores a long right press but still redraws
    press(&mut c, &[RightShort, RightLong], 10);
    assert_eq!(c.menu().state(), MenuState::TempAndDate);
    assert_eq!(c.devices().display.clear_count(), before + 2);
}

#[test]
fn test_open_delay_edit_and_commit() {
    let mut c = controller(SimLimitSwitch::never());
    press(&mut c, &[RightShort, RightDouble, RightLong], 0);
    assert_eq!(c.menu().state(), MenuState::OpenDelayCounter);

    press(&mut c, &[RightShort, RightShort, RightShort, LeftShort], 0);
    assert_eq!(c.devices().clock.open_delay(), 2);
    assert_eq!(c.devices().display.row(0).as_str(), "  <2>  06:02");

    // Leaving with double-left keeps the value but does not save it
    press(&mut c, &[LeftDouble], 0);
    assert_eq!(c.menu().state(), MenuState::OpenDelayModify);
    let store = &mut c.devices_mut().store;
    assert!(load_value::<_, i16>(store, StorageKey::OpenDelay).is_err());

    press(&mut c, &[RightLong, RightShort, RightLong], 0);
    assert_eq!(c.menu().state(), MenuState::OpenDelayModify);
    let store = &mut c.devices_mut().store;
    assert_eq!(load_value::<_, i16>(store, StorageKey::OpenDelay), Ok(3));
}

#[test]
fn test_timezone_steps_by_an_hour() {
    let mut c = controller(SimLimitSwitch::never());
    // OpenDelay -> CloseDelay -> Timezone
    press(&mut c, &[RightShort, RightDouble, RightShort, RightShort], 0);
    assert_eq!(c.menu().state(), MenuState::TimezoneModify);

    press(&mut c, &[RightLong, LeftShort, LeftShort, RightLong], 0);
    assert_eq!(c.devices().clock.timezone(), -120);
    let store = &mut c.devices_mut().store;
    assert_eq!(load_value::<_, i16>(store, StorageKey::Timezone), Ok(-120));
    assert_eq!(c.devices().display.row(1).as_str(), "timezone (-2)");
}

#[test]
fn test_hour_counter_wraps() {
    let mut c = controller(SimLimitSwitch::never());
    c.devices_mut().clock.set_time(23, 40);
    // OpenDelay -> CloseDelay -> Timezone -> Time -> Hours
    press(&mut c, &[RightShort, RightDouble, RightShort, RightShort, RightShort], 0);
    assert_eq!(c.menu().state(), MenuState::TimeModify);

    press(&mut c, &[RightLong, RightShort], 0);
    assert_eq!(c.devices_mut().clock.now().hour, 0);

    press(&mut c, &[RightLong, LeftShort], 0);
    assert_eq!(c.menu().state(), MenuState::MinutesCounter);
    assert_eq!(c.devices_mut().clock.now().minute, 39);

    // Double-left goes back to the time page, not to the hours counter
    press(&mut c, &[LeftDouble], 0);
    assert_eq!(c.menu().state(), MenuState::TimeModify);
    assert_eq!(c.devices().display.row(1).as_str(), "time (00:39)");
}

#[test]
fn test_date_counters_wrap() {
    let mut c = controller(SimLimitSwitch::never());
    c.devices_mut().clock.set_date(2024, 12, 31);
    // OpenDelay, left to DoorCalibrate, ManualModify, DoorModify, DateModify
    press(&mut c, &[RightShort, RightDouble, LeftShort, LeftShort, LeftShort, LeftShort], 0);
    assert_eq!(c.menu().state(), MenuState::DateModify);

    press(&mut c, &[RightLong, RightLong, RightShort, RightLong, RightShort], 0);
    assert_eq!(c.menu().state(), MenuState::DayCounter);
    let now = c.devices_mut().clock.now();
    assert_eq!((now.year, now.month, now.day), (2024, 1, 1));

    press(&mut c, &[RightLong], 0);
    assert_eq!(c.menu().state(), MenuState::DateModify);
    assert_eq!(c.devices().display.row(1).as_str(), "date(2024/01/01)");
}

#[test]
fn test_calibration_flow() {
    let mut c = controller(SimLimitSwitch::trips_after(300));
    // OpenDelay -> left to DoorCalibrate
    press(&mut c, &[RightShort, RightDouble, LeftShort], 0);
    assert_eq!(c.menu().state(), MenuState::DoorCalibrate);

    press(&mut c, &[RightLong], 0);
    assert_eq!(c.menu().state(), MenuState::CalibrationWait);
    assert!(c.devices().door.is_blocked());
    assert_eq!(c.devices().display.row(0).as_str(), "Close door. Hold");

    // Operator lowers the door a little first
    c.devices_mut().buttons.hold(Button::Left, 12);
    press(&mut c, &[LeftLong], 0);
    assert_eq!(c.devices().door.actuator().position(), 12);
    assert_eq!(c.menu().state(), MenuState::CalibrationWait);

    press(&mut c, &[RightLong], 0);
    let devices = c.devices();
    assert_eq!(c.menu().state(), MenuState::DoorStatus);
    assert!(!devices.door.is_blocked());
    assert!(devices.door.is_open());
    assert_eq!(devices.door.steps_to_close(), 300);
    assert_eq!(devices.delay.total_ms(), 4_000);
    assert_eq!(devices.display.row(0).as_str(), "Door: Open");
    assert_eq!(devices.display.row(1).as_str(), "Closes at 20:00");

    let store = &mut c.devices_mut().store;
    assert_eq!(load_value::<_, u32>(store, StorageKey::StepsToClose), Ok(300));
}

#[test]
fn test_leaving_calibration_wait_unblocks() {
    let mut c = controller(SimLimitSwitch::never());
    press(&mut c, &[RightShort, RightDouble, LeftShort, RightLong], 0);
    assert!(c.devices().door.is_blocked());

    press(&mut c, &[LeftDouble], 0);
    assert_eq!(c.menu().state(), MenuState::DoorCalibrate);
    assert!(!c.devices().door.is_blocked());

    press(&mut c, &[RightLong], 100);
    assert!(c.devices().door.is_blocked());
    c.tick(100 + 30_001);
    assert_eq!(c.menu().state(), MenuState::Off);
    assert!(!c.devices().door.is_blocked());
}

#[test]
fn test_manual_jog_follows_button() {
    let mut c = controller(SimLimitSwitch::never());
    press(&mut c, &[RightShort, RightDouble, LeftShort, LeftShort], 0);
    assert_eq!(c.menu().state(), MenuState::DoorManualModify);

    c.devices_mut().buttons.hold(Button::Right, 7);
    press(&mut c, &[RightLong], 0);
    assert_eq!(c.devices().door.actuator().position(), -7);

    c.devices_mut().buttons.hold(Button::Left, 3);
    press(&mut c, &[LeftLong], 0);
    assert_eq!(c.devices().door.actuator().position(), -4);
    assert!(!c.devices().door.is_open());
}

#[test]
fn test_status_long_press_toggles_door() {
    let mut c = controller(SimLimitSwitch::trips_after(50));
    c.devices_mut().door.restore(false, 50);
    press(&mut c, &[RightShort], 0);

    press(&mut c, &[RightLong], 0);
    assert!(c.devices().door.is_open());
    assert_eq!(c.devices().display.row(0).as_str(), "Door: Open");

    press(&mut c, &[RightLong], 0);
    assert!(!c.devices().door.is_open());
    assert_eq!(c.devices().door.actuator().position(), 0);
    assert_eq!(c.devices().display.row(0).as_str(), "Door: Closed");
}

#[test]
fn test_automation_runs_while_menu_open() {
    let mut c = controller(SimLimitSwitch::never());
    c.devices_mut().door.restore(true, 20);
    c.devices_mut().clock.set_time(19, 59);
    c.tick(0);
    press(&mut c, &[RightShort], 0);

    c.devices_mut().clock.time_source_mut().set_time(20, 0);
    c.tick(1_000);
    assert!(!c.devices().door.is_open());
    // The busy message is replaced by the status screen
    assert_eq!(c.devices().display.row(0).as_str(), "Door: Closed");
    assert_eq!(c.devices().display.row(1).as_str(), "Opens at 06:00");
}
