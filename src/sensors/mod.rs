//! Sensor subsystem: channel traits, the DHT22 frame decoder, and the
//! aggregating [`SensorGateway`].
//!
//! The gateway owns every sensor channel and produces a fresh
//! [`SensorReading`] per call.  Channel faults and NaN climate values are
//! folded into [`SensorReading::Invalid`]; nothing here returns an error to
//! the caller, and nothing retries.

pub mod dht;

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::pins;

/// Bus settle time between consecutive sensor accesses.
pub const SENSOR_SETTLE_MS: u32 = 300;

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// One complete, trustworthy set of sensor values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Raw soil moisture (ADC counts, higher = wetter).
    pub moisture: u16,
    /// Raw light level (ADC counts, higher = brighter).
    pub light: u16,
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Relative humidity (%).
    pub humidity_pct: f32,
}

/// Result of one gateway read.  Numeric values are only reachable through
/// the `Valid` arm, so callers cannot act on a faulted sample by accident.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Valid(Measurement),
    Invalid(SensorError),
}

impl SensorReading {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            Self::Valid(m) => Some(m),
            Self::Invalid(_) => None,
        }
    }
}

/// Temperature and humidity pair from the digital climate sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

// ---------------------------------------------------------------------------
// Channel traits
// ---------------------------------------------------------------------------

/// A single analog input channel.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// The combined temperature/humidity sensor.
pub trait ClimateInput {
    fn read_climate(&mut self) -> Result<Climate, SensorError>;
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

pub struct SensorGateway<M, L, C, D> {
    moisture: M,
    light: L,
    climate: C,
    delay: D,
}

impl<M, L, C, D> SensorGateway<M, L, C, D>
where
    M: AnalogInput,
    L: AnalogInput,
    C: ClimateInput,
    D: DelayNs,
{
    /// Construct a new gateway from already initialised channels.
    pub fn new(moisture: M, light: L, climate: C, delay: D) -> Self {
        Self {
            moisture,
            light,
            climate,
            delay,
        }
    }

    /// Sample moisture, then light, then climate, settling between each.
    pub fn read(&mut self) -> SensorReading {
        match self.sample() {
            Ok(m) => {
                debug!(
                    "Sensors: moisture={} light={} T={:.1}°C RH={:.1}%",
                    m.moisture, m.light, m.temperature_c, m.humidity_pct
                );
                SensorReading::Valid(m)
            }
            Err(e) => SensorReading::Invalid(e),
        }
    }

    fn sample(&mut self) -> Result<Measurement, SensorError> {
        let moisture = self
            .moisture
            .read_raw()
            .inspect_err(|e| warn!("Sensor fault: moisture ({}): {}", pins::MOISTURE_PORT, e))?;
        self.delay.delay_ms(SENSOR_SETTLE_MS);

        let light = self
            .light
            .read_raw()
            .inspect_err(|e| warn!("Sensor fault: light ({}): {}", pins::LIGHT_PORT, e))?;
        self.delay.delay_ms(SENSOR_SETTLE_MS);

        let climate = self
            .climate
            .read_climate()
            .inspect_err(|e| warn!("Sensor fault: climate ({}): {}", pins::CLIMATE_PORT, e))?;
        if climate.temperature_c.is_nan() || climate.humidity_pct.is_nan() {
            warn!(
                "Sensor fault: climate ({}) returned T={} RH={}",
                pins::CLIMATE_PORT,
                climate.temperature_c,
                climate.humidity_pct
            );
            return Err(SensorError::NotANumber);
        }

        Ok(Measurement {
            moisture,
            light,
            temperature_c: climate.temperature_c,
            humidity_pct: climate.humidity_pct,
        })
    }
}

impl<M, L, C, D> SensorPort for SensorGateway<M, L, C, D>
where
    M: AnalogInput,
    L: AnalogInput,
    C: ClimateInput,
    D: DelayNs,
{
    fn read(&mut self) -> SensorReading {
        SensorGateway::read(self)
    }
}
