//! Single-channel relay on a digital output.
//!
//! The logical contract is fixed (`set(true)` energises the load); the
//! electrical sense is a constructor parameter because the boards in the
//! field are wired both ways (see [`pins`](crate::pins)).

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Relay<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Take ownership of `pin` and drive it to the de-energised level.
    pub fn new(pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let mut relay = Self { pin, active_low };
        relay.set(false)?;
        Ok(relay)
    }

    /// Energise (`true`) or release (`false`) the relay.  Repeating the same
    /// command rewrites the same level.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}
