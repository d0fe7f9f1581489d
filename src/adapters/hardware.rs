//! Hardware adapter: bridges the drivers to the domain port traits.
//!
//! The drivers stay generic over `embedded-hal`; this module is where they
//! meet the object-safe ports the controller holds.  [`Board`] bundles one
//! complete set so the simulated and the ESP-IDF board are interchangeable
//! in `main`.

use core::time::Duration;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::actuators::ActuatorController;
use crate::app::controller::Controller;
use crate::app::ports::{
    DoorPort, EventSink, LightPort, PumpPort, ReportingBridge, SensorPort, WallClock,
};
use crate::config::Settings;
use crate::drivers::pump::WaterPump;
use crate::drivers::relay::Relay;
use crate::drivers::servo::DoorServo;
use crate::error::ActuatorError;

// ── LightPort implementation ──────────────────────────────────

impl<P: OutputPin> LightPort for Relay<P> {
    fn set_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.set(on)
    }
}

// ── DoorPort implementation ───────────────────────────────────

impl<S: SetDutyCycle, D: DelayNs> DoorPort for DoorServo<S, D> {
    fn set_door(&mut self, angle: i32) -> Result<u16, ActuatorError> {
        self.move_to(angle)
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        DoorServo::release(self)
    }
}

// ── PumpPort implementation ───────────────────────────────────

impl<P: OutputPin, D: DelayNs> PumpPort for WaterPump<P, D> {
    fn pulse_water(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        self.pulse(duration)
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        WaterPump::stop(self)
    }
}

// ── Board ─────────────────────────────────────────────────────

/// One sensor gateway and the three actuators, ready to hand to a
/// [`Controller`].
pub struct Board {
    pub sensors: Box<dyn SensorPort + Send>,
    pub light: Box<dyn LightPort + Send>,
    pub door: Box<dyn DoorPort + Send>,
    pub pump: Box<dyn PumpPort + Send>,
}

impl Board {
    pub fn into_controller(
        self,
        settings: Settings,
        reporter: Box<dyn ReportingBridge + Send>,
        clock: Box<dyn WallClock + Send + Sync>,
        sink: Arc<dyn EventSink + Send + Sync>,
    ) -> Controller {
        let actuators = ActuatorController::new(self.light, self.door, self.pump, Arc::clone(&sink));
        Controller::new(settings, self.sensors, actuators, reporter, clock, sink)
    }
}
