//! Unified error types for the growbox controller.
//!
//! A single `Error` enum for everything that propagates: board bring-up,
//! configuration loading and reporting.  Sensor faults never propagate; they
//! travel inside [`SensorReading`](crate::sensors::SensorReading).  Sensor
//! and actuator errors are `Copy` so drivers can return them without
//! allocation; reporting errors carry the collaborator's message.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Error {
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// The reporting collaborator failed.
    Report(ReportError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC conversion returned an error or timed out.
    AdcReadFailed,
    /// The temperature/humidity sensor did not answer or failed its checksum.
    BusReadFailed,
    /// The temperature/humidity sensor reported not-a-number.
    NotANumber,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::BusReadFailed => write!(f, "sensor bus read failed"),
            Self::NotANumber => write!(f, "reading is not a number"),
        }
    }
}

impl std::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Reporting errors
// ---------------------------------------------------------------------------

/// Failures surfaced by a [`ReportingBridge`](crate::app::ports::ReportingBridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Network or remote service failure.
    Service(String),
    /// The camera could not capture a picture.
    Camera(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(msg) => write!(f, "service failure: {msg}"),
            Self::Camera(msg) => write!(f, "camera failure: {msg}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
