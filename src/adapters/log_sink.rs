//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one tagged
//! line to the `log` facade (ESP-IDF logger on the device, `env_logger` on
//! the host).  Faults go out at `warn`, everything else at `info`.

use log::{info, warn};

use crate::app::events::{AppEvent, Check};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// `Some(v)` → `v`, `None` → `-`.
struct Opt<T>(Option<T>);

impl<T: core::fmt::Display> core::fmt::Display for Opt<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.0 {
            Some(v) => v.fmt(f),
            None => f.write_str("-"),
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Light { action, light, hour } => {
                info!(
                    "LIGHT | {:?} | light={} | hour={}",
                    action,
                    Opt(*light),
                    Opt(*hour)
                );
            }
            AppEvent::Door {
                action,
                temperature_c,
                angle,
            } => {
                info!(
                    "DOOR  | {:?} | T={}\u{00b0}C | angle={}",
                    action,
                    Opt(temperature_c.map(|t| format!("{t:.1}"))),
                    Opt(*angle)
                );
            }
            AppEvent::Water { action, moisture } => {
                info!("WATER | {:?} | moisture={}", action, Opt(*moisture));
            }
            AppEvent::SensorFault { check, error } => {
                warn!("FAULT | sensor | check={} | {}", check.name(), error);
            }
            AppEvent::ActuatorFault {
                check,
                command,
                error,
            } => {
                warn!(
                    "FAULT | actuator | check={} | {} | {}",
                    Opt(check.map(Check::name)),
                    command,
                    error
                );
            }
            AppEvent::ReportPublished { check } => {
                info!("REPORT | {} published", check.name());
            }
            AppEvent::ReportFailed { check, error } => {
                warn!("REPORT | {} failed: {}", check.name(), error);
            }
            AppEvent::SafeState => {
                info!("TASK | actuators in safe state");
            }
        }
    }
}
