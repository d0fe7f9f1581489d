//! Actuator controller: serialized, best-effort access to the three actuators.
//!
//! Each actuator sits behind its own lock.  The grow light is written by
//! two tasks (light check and photo), so its lock is what keeps their
//! updates from interleaving; the pump and the door each have a single
//! writing task and their locks are never contended.
//!
//! Writes are open loop: nothing is read back, and every operation is safe
//! to repeat.  A failed write is emitted as
//! [`AppEvent::ActuatorFault`] and otherwise ignored.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::events::{ActuatorCommand, AppEvent, Check};
use super::ports::{DoorPort, EventSink, LightPort, PumpPort};
use crate::drivers::servo::clamp_angle;
use crate::error::ActuatorError;
use crate::policy::{DoorAction, LightAction, WaterAction};

type SharedSink = Arc<dyn EventSink + Send + Sync>;

pub struct ActuatorController {
    light: Mutex<Box<dyn LightPort + Send>>,
    door: Mutex<Box<dyn DoorPort + Send>>,
    pump: Mutex<Box<dyn PumpPort + Send>>,
    sink: SharedSink,
}

/// Exclusive hold on the grow light.  Other writers block until it drops.
pub struct LightGuard<'a> {
    port: MutexGuard<'a, Box<dyn LightPort + Send>>,
    sink: &'a dyn EventSink,
    check: Option<Check>,
}

impl LightGuard<'_> {
    pub fn set(&mut self, on: bool) {
        let outcome = self.port.set_light(on);
        report(self.sink, self.check, ActuatorCommand::Light(on), outcome);
    }

    pub fn apply(&mut self, action: LightAction) {
        match action {
            LightAction::On => self.set(true),
            LightAction::Off => self.set(false),
            LightAction::NoChange => {}
        }
    }
}

/// A task that panicked while holding an actuator lock leaves no broken
/// invariant behind (the hardware is open loop), so poisoning is ignored.
fn lock<T: ?Sized>(m: &Mutex<Box<T>>) -> MutexGuard<'_, Box<T>> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn report<T>(
    sink: &dyn EventSink,
    check: Option<Check>,
    command: ActuatorCommand,
    outcome: Result<T, ActuatorError>,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            sink.emit(&AppEvent::ActuatorFault {
                check,
                command,
                error,
            });
            None
        }
    }
}

impl ActuatorController {
    pub fn new(
        light: Box<dyn LightPort + Send>,
        door: Box<dyn DoorPort + Send>,
        pump: Box<dyn PumpPort + Send>,
        sink: SharedSink,
    ) -> Self {
        Self {
            light: Mutex::new(light),
            door: Mutex::new(door),
            pump: Mutex::new(pump),
            sink,
        }
    }

    // ── Light ─────────────────────────────────────────────────

    fn light_guard(&self, check: Option<Check>) -> LightGuard<'_> {
        LightGuard {
            port: lock(&self.light),
            sink: self.sink.as_ref(),
            check,
        }
    }

    /// Take the grow light for a multi-step sequence run by `check`.
    pub fn lock_light(&self, check: Check) -> LightGuard<'_> {
        self.light_guard(Some(check))
    }

    // ── Door ──────────────────────────────────────────────────

    /// Move the door.  Returns the commanded angle, `None` if the write failed.
    pub fn set_door(&self, check: Check, angle: i32) -> Option<u16> {
        let outcome = lock(&self.door).set_door(angle);
        report(
            self.sink.as_ref(),
            Some(check),
            ActuatorCommand::Door(clamp_angle(angle)),
            outcome,
        )
    }

    pub fn apply_door(&self, check: Check, action: DoorAction) -> Option<u16> {
        action.angle().and_then(|a| self.set_door(check, i32::from(a)))
    }

    // ── Pump ──────────────────────────────────────────────────

    /// Blocks for `duration`.
    pub fn pulse_water(&self, check: Check, duration: Duration) {
        let outcome = lock(&self.pump).pulse_water(duration);
        report(
            self.sink.as_ref(),
            Some(check),
            ActuatorCommand::Pump(duration),
            outcome,
        );
    }

    pub fn apply_water(&self, check: Check, action: WaterAction) {
        if let WaterAction::Pulse(duration) = action {
            self.pulse_water(check, duration);
        }
    }

    // ── Shutdown ──────────────────────────────────────────────

    /// Pump off, light off, door drive released.  Waits for any in-flight
    /// actuation to finish first (each lock is held for the whole move).
    pub fn safe_state(&self) {
        let sink = self.sink.as_ref();
        let outcome = lock(&self.pump).stop();
        report(sink, None, ActuatorCommand::PumpStop, outcome);
        self.light_guard(None).set(false);
        let outcome = lock(&self.door).release();
        report(sink, None, ActuatorCommand::DoorRelease, outcome);
        sink.emit(&AppEvent::SafeState);
    }
}
