//! Controller scenarios against mock adapters.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use growbox::app::events::{ActuatorCommand, AppEvent, Check};
use growbox::config::Settings;
use growbox::drivers::pump::WaterPump;
use growbox::drivers::relay::Relay;
use growbox::error::{ActuatorError, Error, ReportError, SensorError};
use growbox::pins;
use growbox::policy::{DoorAction, LightAction, WaterAction};

use crate::mock_hw::{
    valid, ActuatorCall, BusWatch, Post, RigBuilder, Step, TimelineDelay, TimelinePin,
    WatchedSensors, FAULT,
};

// ── Light ─────────────────────────────────────────────────────

#[test]
fn dark_morning_turns_light_on() {
    let rig = RigBuilder::new().hour(Some(10)).readings([valid(500, 200, 20.0)]).build();

    assert_eq!(rig.controller.check_light(), LightAction::On);
    assert_eq!(rig.calls(), vec![ActuatorCall::Light(true)]);
    assert!(rig.events().contains(&AppEvent::Light {
        action: LightAction::On,
        light: Some(200),
        hour: Some(10),
    }));
}

#[test]
fn night_turns_light_off_whatever_the_reading() {
    for reading in [valid(500, 0, 20.0), valid(500, 900, 20.0), FAULT] {
        let rig = RigBuilder::new().hour(Some(22)).readings([reading]).build();
        assert_eq!(rig.controller.check_light(), LightAction::Off);
        assert_eq!(rig.calls(), vec![ActuatorCall::Light(false)]);
    }
}

#[test]
fn unsynced_clock_counts_as_night() {
    let rig = RigBuilder::new().hour(None).readings([valid(500, 100, 20.0)]).build();
    assert_eq!(rig.controller.check_light(), LightAction::Off);
    assert_eq!(rig.calls(), vec![ActuatorCall::Light(false)]);
}

#[test]
fn sensor_fault_in_window_leaves_light_alone() {
    let rig = RigBuilder::new().hour(Some(12)).readings([FAULT]).build();

    assert_eq!(rig.controller.check_light(), LightAction::NoChange);
    assert!(rig.calls().is_empty());
    assert!(rig.events().contains(&AppEvent::SensorFault {
        check: Check::Light,
        error: SensorError::NotANumber,
    }));
}

#[test]
fn light_write_failure_is_reported_not_raised() {
    let rig = RigBuilder::new()
        .hour(Some(10))
        .readings([valid(500, 100, 20.0)])
        .light_fails()
        .build();

    assert_eq!(rig.controller.check_light(), LightAction::On);
    assert!(rig.events().contains(&AppEvent::ActuatorFault {
        check: Some(Check::Light),
        command: ActuatorCommand::Light(true),
        error: ActuatorError::GpioWriteFailed,
    }));
}

#[test]
fn light_check_waits_for_photo_to_finish() {
    let rig = RigBuilder::new()
        .hour(Some(22))
        .readings([valid(500, 900, 20.0)])
        .photo_settle(Duration::from_millis(200))
        .build();
    let controller = &rig.controller;

    thread::scope(|s| {
        let photo = s.spawn(|| controller.post_photo());
        // The photo holds the relay from its first write until the restore.
        while !rig.calls().contains(&ActuatorCall::Light(true)) {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(controller.check_light(), LightAction::Off);
        photo.join().unwrap().unwrap();
    });

    assert_eq!(
        rig.calls(),
        vec![
            ActuatorCall::Light(true),
            ActuatorCall::Photo,
            ActuatorCall::Light(false),
            ActuatorCall::Light(false),
        ]
    );
}

#[test]
fn concurrent_checks_never_share_the_sensor_bus() {
    let watch = Arc::new(BusWatch::default());
    let rig = RigBuilder::new()
        .sensors(Box::new(WatchedSensors(Arc::clone(&watch))))
        .build();
    let controller = &rig.controller;

    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                for _ in 0..5 {
                    controller.check_temperature();
                    controller.check_water();
                }
            });
        }
    });

    assert_eq!(watch.reads.load(Ordering::SeqCst), 30);
    assert!(!watch.overlapped.load(Ordering::SeqCst));
}

// ── Door ──────────────────────────────────────────────────────

#[test]
fn warm_box_opens_door_to_90() {
    let rig = RigBuilder::new().readings([valid(500, 500, 19.5)]).build();

    assert_eq!(rig.controller.check_temperature(), DoorAction::Open);
    assert_eq!(rig.calls(), vec![ActuatorCall::Door(90)]);
    assert!(rig.events().contains(&AppEvent::Door {
        action: DoorAction::Open,
        temperature_c: Some(19.5),
        angle: Some(90),
    }));
}

#[test]
fn threshold_temperature_closes_door() {
    let settings = Settings {
        temp_threshold_c: 18.0,
        ..Settings::default()
    };
    let rig = RigBuilder::new().settings(settings).readings([valid(500, 500, 18.0)]).build();

    assert_eq!(rig.controller.check_temperature(), DoorAction::Close);
    assert_eq!(rig.calls(), vec![ActuatorCall::Door(0)]);
}

#[test]
fn door_write_failure_names_check_and_angle() {
    let rig = RigBuilder::new().readings([valid(500, 500, 25.0)]).door_fails().build();

    assert_eq!(rig.controller.check_temperature(), DoorAction::Open);
    assert!(rig.events().contains(&AppEvent::ActuatorFault {
        check: Some(Check::Temperature),
        command: ActuatorCommand::Door(90),
        error: ActuatorError::PwmWriteFailed,
    }));
    assert!(rig.events().contains(&AppEvent::Door {
        action: DoorAction::Open,
        temperature_c: Some(25.0),
        angle: None,
    }));
}

#[test]
fn door_fault_moves_nothing() {
    let rig = RigBuilder::new().readings([FAULT]).build();
    assert_eq!(rig.controller.check_temperature(), DoorAction::NoChange);
    assert!(rig.calls().is_empty());
}

// ── Water ─────────────────────────────────────────────────────

#[test]
fn dry_soil_pulses_for_watering_time() {
    let rig = RigBuilder::new().readings([valid(350, 500, 20.0)]).build();

    assert_eq!(
        rig.controller.check_water(),
        WaterAction::Pulse(Duration::from_millis(1500))
    );
    assert_eq!(rig.calls(), vec![ActuatorCall::Pump(Duration::from_millis(1500))]);
}

#[test]
fn dry_soil_drives_relay_for_exactly_one_and_a_half_seconds() {
    let timeline = Arc::new(Mutex::new(Vec::new()));
    let relay = Relay::new(TimelinePin(Arc::clone(&timeline)), pins::PUMP_RELAY_ACTIVE_LOW).unwrap();
    let pump = WaterPump::new(relay, TimelineDelay(Arc::clone(&timeline)));
    timeline.lock().unwrap().clear();

    let settings = Settings {
        moisture_threshold: 400,
        watering_time_secs: 1.5,
        ..Settings::default()
    };
    let rig = RigBuilder::new()
        .settings(settings)
        .readings([valid(350, 500, 20.0)])
        .pump(Box::new(pump))
        .build();
    rig.controller.check_water();

    assert_eq!(
        *timeline.lock().unwrap(),
        vec![Step::Level(true), Step::WaitNs(1_500_000_000), Step::Level(false)]
    );
}

#[test]
fn wet_soil_skips() {
    let rig = RigBuilder::new().readings([valid(400, 500, 20.0)]).build();
    assert_eq!(rig.controller.check_water(), WaterAction::Skip);
    assert!(rig.calls().is_empty());
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn status_report_carries_summary() {
    let rig = RigBuilder::new().hour(Some(14)).readings([valid(512, 230, 21.4)]).build();

    rig.controller.post_status().unwrap();

    assert_eq!(
        rig.posts(),
        vec![Post::Status(
            "07.03.2026 - 14:30:\nWater: 512\nLight: 230\nTemperature: 21.4\nHumidity: 55.0".into()
        )]
    );
    assert!(rig.events().contains(&AppEvent::ReportPublished { check: Check::Status }));
}

#[test]
fn status_failure_is_returned_and_emitted() {
    let rig = RigBuilder::new().readings([valid(512, 230, 21.4)]).reporter_fails().build();

    let err = rig.controller.post_status().unwrap_err();

    assert!(matches!(err, Error::Report(ReportError::Service(_))));
    assert!(rig.events().iter().any(|e| matches!(
        e,
        AppEvent::ReportFailed { check: Check::Status, .. }
    )));
}

#[test]
fn photo_lights_box_then_restores_by_policy() {
    // Bright daytime: light goes on for the photo, then back off.
    let rig = RigBuilder::new().hour(Some(10)).readings([valid(500, 800, 20.0)]).build();

    rig.controller.post_photo().unwrap();

    assert_eq!(
        rig.calls(),
        vec![
            ActuatorCall::Light(true),
            ActuatorCall::Photo,
            ActuatorCall::Light(false),
        ]
    );
    assert_eq!(rig.posts(), vec![Post::Photo("07-03-2026_10-30".into())]);
}

#[test]
fn photo_leaves_light_on_when_dark_in_window() {
    let rig = RigBuilder::new().hour(Some(10)).readings([valid(500, 100, 20.0)]).build();

    rig.controller.post_photo().unwrap();

    assert_eq!(
        rig.calls(),
        vec![
            ActuatorCall::Light(true),
            ActuatorCall::Photo,
            ActuatorCall::Light(true),
        ]
    );
}

#[test]
fn photo_at_night_switches_light_off_even_if_upload_fails() {
    let rig = RigBuilder::new().hour(Some(23)).readings([FAULT]).reporter_fails().build();

    assert!(rig.controller.post_photo().is_err());
    assert_eq!(rig.calls().last(), Some(&ActuatorCall::Light(false)));
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn safe_state_stops_pump_darkens_and_releases_door() {
    let rig = RigBuilder::new().build();

    rig.controller.safe_state();

    assert_eq!(
        rig.calls(),
        vec![
            ActuatorCall::PumpStop,
            ActuatorCall::Light(false),
            ActuatorCall::DoorRelease,
        ]
    );
    assert_eq!(rig.events().last(), Some(&AppEvent::SafeState));
}

#[test]
fn safe_state_faults_carry_no_check() {
    let rig = RigBuilder::new().light_fails().build();

    rig.controller.safe_state();

    assert!(rig.events().contains(&AppEvent::ActuatorFault {
        check: None,
        command: ActuatorCommand::Light(false),
        error: ActuatorError::GpioWriteFailed,
    }));
    assert_eq!(rig.events().last(), Some(&AppEvent::SafeState));
}
