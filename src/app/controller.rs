//! Controller: the domain core of the grow box.
//!
//! One method per periodic behavior.  Each method samples the sensors,
//! asks the [threshold policy](crate::policy) for a decision, applies it
//! through the [`ActuatorController`] and emits an [`AppEvent`] describing
//! what happened.
//!
//! ```text
//!  task thread ──▶ check_*() ──▶ SensorPort::read()
//!                      │
//!                      ├──▶ policy::decide_*()
//!                      ├──▶ ActuatorController::apply_*()
//!                      └──▶ EventSink::emit()
//! ```
//!
//! The controller is `Sync`: all five task threads share one instance
//! through an `Arc`.  Lock order is light, then sensors; no path takes
//! them the other way round.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::actuators::{ActuatorController, LightGuard};
use super::events::{AppEvent, Check};
use super::ports::{EventSink, ReportingBridge, SensorPort, WallClock};
use crate::config::Settings;
use crate::error::Result;
use crate::policy::{self, DoorAction, LightAction, WaterAction};
use crate::report;
use crate::sensors::SensorReading;

/// Time the grow light burns before a photo is captured.
pub const PHOTO_LIGHT_SETTLE: Duration = Duration::from_secs(2);

pub struct Controller {
    settings: Settings,
    sensors: Mutex<Box<dyn SensorPort + Send>>,
    actuators: ActuatorController,
    reporter: Mutex<Box<dyn ReportingBridge + Send>>,
    clock: Box<dyn WallClock + Send + Sync>,
    sink: Arc<dyn EventSink + Send + Sync>,
    photo_settle: Duration,
}

fn lock<T: ?Sized>(m: &Mutex<Box<T>>) -> MutexGuard<'_, Box<T>> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Controller {
    pub fn new(
        settings: Settings,
        sensors: Box<dyn SensorPort + Send>,
        actuators: ActuatorController,
        reporter: Box<dyn ReportingBridge + Send>,
        clock: Box<dyn WallClock + Send + Sync>,
        sink: Arc<dyn EventSink + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            sensors: Mutex::new(sensors),
            actuators,
            reporter: Mutex::new(reporter),
            clock,
            sink,
            photo_settle: PHOTO_LIGHT_SETTLE,
        }
    }

    /// Override the photo illumination wait.
    pub fn with_photo_settle(mut self, settle: Duration) -> Self {
        self.photo_settle = settle;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn actuators(&self) -> &ActuatorController {
        &self.actuators
    }

    // ── Helpers ───────────────────────────────────────────────

    /// One reading from the shared sensor bus.  A fault is reported against
    /// `check` before being returned.
    fn read(&self, check: Check) -> SensorReading {
        let reading = lock(&self.sensors).read();
        if let SensorReading::Invalid(error) = reading {
            self.sink.emit(&AppEvent::SensorFault { check, error });
        }
        reading
    }

    /// Read and decide the light while the caller holds the relay.  An
    /// unsynced clock counts as night.
    fn apply_light(&self, light: &mut LightGuard<'_>, check: Check) -> LightAction {
        let hour = self.clock.current_hour();
        let reading = self.read(check);
        let action = match hour {
            Some(h) => policy::decide_light(&reading, &self.settings, h),
            None => LightAction::Off,
        };
        light.apply(action);
        self.sink.emit(&AppEvent::Light {
            action,
            light: reading.measurement().map(|m| m.light),
            hour,
        });
        action
    }

    // ── Checks ────────────────────────────────────────────────

    pub fn check_light(&self) -> LightAction {
        let mut light = self.actuators.lock_light(Check::Light);
        self.apply_light(&mut light, Check::Light)
    }

    /// Blocks for the door settle time when the door moves.
    pub fn check_temperature(&self) -> DoorAction {
        let reading = self.read(Check::Temperature);
        let action = policy::decide_temperature(&reading, &self.settings);
        let angle = self.actuators.apply_door(Check::Temperature, action);
        self.sink.emit(&AppEvent::Door {
            action,
            temperature_c: reading.measurement().map(|m| m.temperature_c),
            angle,
        });
        action
    }

    /// Blocks for the watering time when the pump runs.
    pub fn check_water(&self) -> WaterAction {
        let reading = self.read(Check::Water);
        let action = policy::decide_water(&reading, &self.settings);
        // Logged before the pulse so the record precedes the blocking wait.
        self.sink.emit(&AppEvent::Water {
            action,
            moisture: reading.measurement().map(|m| m.moisture),
        });
        self.actuators.apply_water(Check::Water, action);
        action
    }

    // ── Reports ───────────────────────────────────────────────

    fn report_outcome(
        &self,
        check: Check,
        outcome: core::result::Result<(), crate::error::ReportError>,
    ) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.sink.emit(&AppEvent::ReportPublished { check });
                Ok(())
            }
            Err(error) => {
                self.sink.emit(&AppEvent::ReportFailed {
                    check,
                    error: error.clone(),
                });
                Err(error.into())
            }
        }
    }

    /// Publish a text summary of a fresh reading.
    pub fn post_status(&self) -> Result<()> {
        let reading = self.read(Check::Status);
        let summary = report::status_summary(&reading, self.clock.now());
        let outcome = lock(&self.reporter).publish_status(&summary);
        self.report_outcome(Check::Status, outcome)
    }

    /// Light on, wait, capture and publish, then put the light back where
    /// the light policy wants it.  The relay stays locked for the whole
    /// sequence so a light check cannot switch it off mid-capture.
    pub fn post_photo(&self) -> Result<()> {
        let caption = report::photo_caption(self.clock.now());
        let mut light = self.actuators.lock_light(Check::Photo);
        light.set(true);
        std::thread::sleep(self.photo_settle);
        let outcome = lock(&self.reporter).publish_photo(&caption);
        self.apply_light(&mut light, Check::Photo);
        drop(light);
        self.report_outcome(Check::Photo, outcome)
    }

    // ── Shutdown ──────────────────────────────────────────────

    pub fn safe_state(&self) {
        self.actuators.safe_state();
    }
}
