//! Application core: control logic behind port traits.
//!
//! This module wires sensor reads, threshold decisions and actuator commands
//! together.  All interaction with hardware and the outside world happens
//! through the **port traits** defined in [`ports`], keeping this layer
//! testable without real peripherals.

pub mod actuators;
pub mod controller;
pub mod events;
pub mod ports;
pub mod tasks;
