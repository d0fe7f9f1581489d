//! Water pump behind a relay.
//!
//! The only operation is a timed pulse.  The pulse blocks the calling task
//! for its full length; the relay is always commanded off afterwards, even
//! if switching it on failed, so the pump can never be left running.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::relay::Relay;
use crate::error::ActuatorError;

pub struct WaterPump<P, D> {
    relay: Relay<P>,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> WaterPump<P, D> {
    pub fn new(relay: Relay<P>, delay: D) -> Self {
        Self { relay, delay }
    }

    /// Run the pump for `duration`, then switch it off.  Pulses longer than
    /// one `delay_us` call can express are waited out in chunks.
    pub fn pulse(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        let on = self.relay.set(true);
        if on.is_ok() {
            let mut left = duration.as_micros();
            while left > 0 {
                let chunk = left.min(u128::from(u32::MAX)) as u32;
                self.delay.delay_us(chunk);
                left -= u128::from(chunk);
            }
        }
        let off = self.relay.set(false);
        on.and(off)
    }

    /// Force the relay off.
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.relay.set(false)
    }
}
