//! Actuator drivers.
//!
//! Every driver is generic over the `embedded-hal` 1.0 traits, so the same
//! code drives ESP-IDF peripherals, the simulated board and test fakes.

pub mod delay;
pub mod pump;
pub mod relay;
pub mod servo;
