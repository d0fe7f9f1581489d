//! Vent door hobby servo on a 50 Hz PWM channel.
//!
//! Angle 0..=180 maps linearly onto a 2.5 %–11.5 % duty cycle
//! (0.5 ms–2.3 ms pulses).  After each move the driver holds the pulse for
//! [`DOOR_SETTLE_MS`], then stops the duty cycle entirely so the motor
//! does not hunt and heat up while the door sits still.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the raw LEDC channel set up in `adapters::esp_board`.
//! On host/test: any `SetDutyCycle` fake.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

/// Door angle used by the policy for "closed".
pub const DOOR_CLOSED_DEG: u16 = 0;
/// Door angle used by the policy for "open".
pub const DOOR_OPEN_DEG: u16 = 90;
/// Mechanical end stop.
pub const DOOR_MAX_DEG: u16 = 180;
/// Hold time before drive is released.
pub const DOOR_SETTLE_MS: u32 = 2_000;

/// Duty fraction denominator: duty% = angle/20 + 2.5 ⇔ (angle + 50) / 2000.
const DUTY_DENOM: u16 = 2_000;
const DUTY_OFFSET: u16 = 50;

/// Clamp any requested angle onto the servo's travel.
pub fn clamp_angle(angle: i32) -> u16 {
    angle.clamp(0, i32::from(DOOR_MAX_DEG)) as u16
}

/// Duty numerator over [`DUTY_DENOM`] for an already clamped angle.
pub fn duty_numerator(angle: u16) -> u16 {
    angle.min(DOOR_MAX_DEG) + DUTY_OFFSET
}

pub struct DoorServo<S, D> {
    pwm: S,
    delay: D,
}

impl<S: SetDutyCycle, D: DelayNs> DoorServo<S, D> {
    /// Take ownership of the channel with the drive released.
    pub fn new(pwm: S, delay: D) -> Result<Self, ActuatorError> {
        let mut servo = Self { pwm, delay };
        servo.release()?;
        Ok(servo)
    }

    /// Drive to `angle` (clamped), wait for the door to get there, release.
    /// Returns the angle actually commanded.
    pub fn move_to(&mut self, angle: i32) -> Result<u16, ActuatorError> {
        let target = clamp_angle(angle);
        let moved = self
            .pwm
            .set_duty_cycle_fraction(duty_numerator(target), DUTY_DENOM)
            .map_err(|_| ActuatorError::PwmWriteFailed);
        if moved.is_ok() {
            self.delay.delay_ms(DOOR_SETTLE_MS);
        }
        // Release even when the move itself failed.
        let released = self.release();
        moved.and(released).map(|()| target)
    }

    /// Stop sending pulses; the servo stays where it is, unpowered.
    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }
}
