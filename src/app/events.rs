//! Outbound application events.
//!
//! The [`Controller`](super::controller::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Every fault variant names
//! the check it happened in and the value involved, so a log line alone is
//! enough to diagnose it.

use core::fmt;
use core::time::Duration;

use crate::error::{ActuatorError, ReportError, SensorError};
use crate::policy::{DoorAction, LightAction, WaterAction};

/// The periodic behaviors of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    Light,
    Temperature,
    Water,
    Status,
    Photo,
}

impl Check {
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Temperature => "temperature",
            Self::Water => "water",
            Self::Status => "status",
            Self::Photo => "photo",
        }
    }
}

/// What an actuator was told to do when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Light(bool),
    /// Clamped target angle in degrees.
    Door(u16),
    DoorRelease,
    Pump(Duration),
    PumpStop,
}

impl ActuatorCommand {
    pub fn actuator(self) -> &'static str {
        match self {
            Self::Light(_) => "light",
            Self::Door(_) | Self::DoorRelease => "door",
            Self::Pump(_) | Self::PumpStop => "pump",
        }
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light(on) => write!(f, "light={}", if *on { "on" } else { "off" }),
            Self::Door(angle) => write!(f, "door={angle}\u{00b0}"),
            Self::DoorRelease => f.write_str("door=release"),
            Self::Pump(d) => write!(f, "pump={:.1}s", d.as_secs_f32()),
            Self::PumpStop => f.write_str("pump=stop"),
        }
    }
}

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A light decision was taken.  `light` is `None` when the reading was
    /// not needed (night) or not usable (fault); `hour` is `None` while the
    /// wall clock is unsynced.
    Light {
        action: LightAction,
        light: Option<u16>,
        hour: Option<u8>,
    },

    /// A door decision was taken.  `angle` is the commanded angle.
    Door {
        action: DoorAction,
        temperature_c: Option<f32>,
        angle: Option<u16>,
    },

    /// A watering decision was taken.
    Water {
        action: WaterAction,
        moisture: Option<u16>,
    },

    /// A sensor read during `check` produced no usable values.
    SensorFault { check: Check, error: SensorError },

    /// An actuator write failed.  `check` is `None` for the shutdown
    /// sequence, which runs outside any check.
    ActuatorFault {
        check: Option<Check>,
        command: ActuatorCommand,
        error: ActuatorError,
    },

    /// A report was handed to the reporting bridge successfully.
    ReportPublished { check: Check },

    /// The reporting bridge failed.
    ReportFailed { check: Check, error: ReportError },

    /// Actuators were driven to their resting state.
    SafeState,
}
