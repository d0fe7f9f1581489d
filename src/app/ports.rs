//! Port traits: the hexagonal boundary between control logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensor gateway, actuator drivers, reporting bridge,
//! clock, event sink) implement these traits.  The
//! [`Controller`](super::controller::Controller) holds them as boxed trait
//! objects, so the domain core never touches hardware directly and tests
//! can swap in recording fakes.
//!
//! Every port that is shared between task threads is `Send`; the controller
//! supplies the locking.

use core::time::Duration;

use crate::config::{ConfigError, Settings};
use crate::error::{ActuatorError, ReportError};
use crate::sensors::SensorReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain one fresh reading.
pub trait SensorPort {
    /// Sample every sensor.  Faults come back as
    /// [`SensorReading::Invalid`], never as an error.
    fn read(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Grow light relay.
pub trait LightPort {
    /// `true` = lamp lit, regardless of relay wiring polarity.
    fn set_light(&mut self, on: bool) -> Result<(), ActuatorError>;
}

/// Vent door servo.
pub trait DoorPort {
    /// Drive to `angle` (clamped to 0..=180), settle, release drive.
    /// Returns the angle actually commanded.
    fn set_door(&mut self, angle: i32) -> Result<u16, ActuatorError>;

    /// Stop driving the servo without moving it.
    fn release(&mut self) -> Result<(), ActuatorError>;
}

/// Irrigation pump.
pub trait PumpPort {
    /// Run the pump for `duration`, blocking the caller, then stop it.
    fn pulse_water(&mut self, duration: Duration) -> Result<(), ActuatorError>;

    /// Immediately stop the pump.
    fn stop(&mut self) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Reporting port (external collaborator)
// ───────────────────────────────────────────────────────────────

/// Status and photo publishing.  Implemented outside the control core
/// (social media, chat bots, a log file).  Failures are returned to the
/// owning task, which logs them; they never reach the scheduler.
pub trait ReportingBridge {
    /// Publish a plain-text status summary.
    fn publish_status(&mut self, summary: &str) -> Result<(), ReportError>;

    /// Capture a picture and publish it with `caption`.  Called while the
    /// grow light is held on for illumination.
    fn publish_photo(&mut self, caption: &str) -> Result<(), ReportError>;
}

// ───────────────────────────────────────────────────────────────
// Wall clock
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time for the light window and report timestamps.
pub trait WallClock {
    /// Current local hour (0-23), or `None` while the clock is unsynced.
    fn current_hour(&self) -> Option<u8>;

    /// Local time, `None` while the clock is unsynced.
    fn now(&self) -> Option<chrono::NaiveDateTime>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the controller settings once at startup.
///
/// Implementations MUST return validated settings; invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<Settings, ConfigError>;
}
