//! Threshold policy: pure decision functions.
//!
//! Each function maps one [`SensorReading`] plus [`Settings`] onto an
//! actuator action.  No I/O, no state.  An invalid reading always yields
//! the fault-safe "leave it as it is" action, except that the light is
//! switched off outside active hours whatever the reading says.
//!
//! The comparisons are single thresholds with no hysteresis band: a value
//! sitting exactly on a threshold can flip the actuator every cycle.

use core::time::Duration;

use crate::config::Settings;
use crate::drivers::servo::{DOOR_CLOSED_DEG, DOOR_OPEN_DEG};
use crate::sensors::SensorReading;

// ═══════════════════════════════════════════════════════════════
//  Actions
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAction {
    On,
    Off,
    /// Fault-safe: keep the relay where it is.
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    /// Fault-safe: keep the door where it is.
    NoChange,
}

impl DoorAction {
    /// Servo angle for this action, `None` for `NoChange`.
    pub fn angle(self) -> Option<u16> {
        match self {
            Self::Open => Some(DOOR_OPEN_DEG),
            Self::Close => Some(DOOR_CLOSED_DEG),
            Self::NoChange => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterAction {
    /// Run the pump for the given time.
    Pulse(Duration),
    Skip,
}

// ═══════════════════════════════════════════════════════════════
//  Active-light window
// ═══════════════════════════════════════════════════════════════

/// Hours during which the grow light may run, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHours {
    /// First lit hour (0-23).
    pub from_hour: u8,
    /// Last lit hour (0-23).
    pub until_hour: u8,
}

impl ActiveHours {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            from_hour: settings.light_from_hour,
            until_hour: settings.light_until_hour,
        }
    }

    /// `from_hour <= hour <= until_hour`.  Settings validation rules out
    /// windows that wrap past midnight.
    pub fn contains(&self, hour: u8) -> bool {
        self.from_hour <= hour && hour <= self.until_hour
    }
}

// ═══════════════════════════════════════════════════════════════
//  Decisions
// ═══════════════════════════════════════════════════════════════

/// Grow light.  Night turns it off unconditionally; in the active window it
/// turns on when `light <= light_threshold`.
pub fn decide_light(reading: &SensorReading, settings: &Settings, current_hour: u8) -> LightAction {
    if !ActiveHours::from_settings(settings).contains(current_hour) {
        return LightAction::Off;
    }
    match reading {
        SensorReading::Invalid(_) => LightAction::NoChange,
        SensorReading::Valid(m) if m.light <= settings.light_threshold => LightAction::On,
        SensorReading::Valid(_) => LightAction::Off,
    }
}

/// Vent door.  Opens when `temperature > temp_threshold_c`, otherwise closes.
pub fn decide_temperature(reading: &SensorReading, settings: &Settings) -> DoorAction {
    match reading {
        SensorReading::Invalid(_) => DoorAction::NoChange,
        SensorReading::Valid(m) if m.temperature_c > settings.temp_threshold_c => DoorAction::Open,
        SensorReading::Valid(_) => DoorAction::Close,
    }
}

/// Pump.  Pulses for `watering_time` when `moisture < moisture_threshold`.
pub fn decide_water(reading: &SensorReading, settings: &Settings) -> WaterAction {
    match reading {
        SensorReading::Valid(m) if m.moisture < settings.moisture_threshold => {
            WaterAction::Pulse(settings.watering_time())
        }
        _ => WaterAction::Skip,
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
