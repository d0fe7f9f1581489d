//! Simulated board for host runs.
//!
//! Every channel of the real board gets an `embedded-hal` or sensor-trait
//! stand-in backed by one shared [`Plant`] model, so the unmodified drivers
//! and the [`SensorGateway`] run end-to-end without hardware:
//!
//! - soil dries slowly, the pump wets it quickly
//! - the grow light adds to the ambient light level
//! - the box warms towards 24 °C with the door shut and cools towards 16 °C
//!   with it open
//!
//! The model integrates over real elapsed time, stepped whenever a channel
//! is touched.

use core::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

use super::hardware::Board;
use crate::drivers::delay::StdDelay;
use crate::drivers::pump::WaterPump;
use crate::drivers::relay::Relay;
use crate::drivers::servo::{DoorServo, DOOR_MAX_DEG, DOOR_OPEN_DEG};
use crate::error::SensorError;
use crate::pins;
use crate::sensors::{AnalogInput, Climate, ClimateInput, SensorGateway};

const MOISTURE_MAX: f32 = 950.0;
/// Evaporation, counts per second (about 70 per hour).
const DRY_PER_SEC: f32 = 0.02;
/// Pump inflow, counts per second.
const WET_PER_SEC: f32 = 40.0;
/// Extra light-sensor counts with the lamp lit.
const LAMP_LIGHT: f32 = 300.0;
/// Time constant of the box air temperature.
const THERMAL_TAU_SECS: f32 = 600.0;
/// Servo max duty the simulated PWM channel advertises.
const SIM_MAX_DUTY: u16 = 2_000;
/// Pulse offset of the door servo at 0° in [`SIM_MAX_DUTY`] units.
const SERVO_ZERO_DUTY: u16 = 50;

// ═══════════════════════════════════════════════════════════════
//  Plant model
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Plant {
    /// Soil moisture in ADC counts.
    pub moisture: f32,
    /// Light reaching the sensor from outside the box, ADC counts.
    pub ambient_light: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Electrical level of the pump relay pin.
    pub pump_level: bool,
    /// Electrical level of the light relay pin.
    pub lamp_level: bool,
    /// Last commanded door angle.  Survives drive release.
    pub door_angle: u16,
    /// Every n-th climate read fails its checksum; `None` never fails.
    pub climate_fault_every: Option<u32>,
    climate_reads: u32,
    last_step: Instant,
}

impl Default for Plant {
    fn default() -> Self {
        Self {
            moisture: 420.0,
            ambient_light: 220.0,
            temperature_c: 20.0,
            humidity_pct: 55.0,
            pump_level: pins::PUMP_RELAY_ACTIVE_LOW,
            lamp_level: pins::LIGHT_RELAY_ACTIVE_LOW,
            door_angle: 0,
            climate_fault_every: Some(25),
            climate_reads: 0,
            last_step: Instant::now(),
        }
    }
}

impl Plant {
    pub fn pump_on(&self) -> bool {
        self.pump_level != pins::PUMP_RELAY_ACTIVE_LOW
    }

    pub fn lamp_on(&self) -> bool {
        self.lamp_level != pins::LIGHT_RELAY_ACTIVE_LOW
    }

    pub fn door_open(&self) -> bool {
        self.door_angle >= DOOR_OPEN_DEG / 2
    }

    pub fn light_level(&self) -> f32 {
        self.ambient_light + if self.lamp_on() { LAMP_LIGHT } else { 0.0 }
    }

    /// Advance the model by `dt` seconds with the current actuator state.
    pub fn step(&mut self, dt: f32) {
        if self.pump_on() {
            self.moisture += WET_PER_SEC * dt;
        }
        self.moisture = (self.moisture - DRY_PER_SEC * dt).clamp(0.0, MOISTURE_MAX);

        let mut target = if self.door_open() { 16.0 } else { 24.0 };
        if self.lamp_on() {
            target += 1.5;
        }
        let k = (dt / THERMAL_TAU_SECS).min(1.0);
        self.temperature_c += (target - self.temperature_c) * k;

        let humidity_target = (40.0 + self.moisture / 20.0).min(95.0);
        self.humidity_pct += (humidity_target - self.humidity_pct) * k;
    }

    fn advance(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_step).as_secs_f32();
        self.last_step = now;
        self.step(dt);
    }
}

pub type SharedPlant = Arc<Mutex<Plant>>;

fn lock(plant: &SharedPlant) -> MutexGuard<'_, Plant> {
    let mut guard = plant.lock().unwrap_or_else(PoisonError::into_inner);
    guard.advance();
    guard
}

// ═══════════════════════════════════════════════════════════════
//  Channels
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum AnalogChannel {
    Moisture,
    Light,
}

pub struct SimAnalog {
    plant: SharedPlant,
    channel: AnalogChannel,
}

impl AnalogInput for SimAnalog {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let plant = lock(&self.plant);
        let value = match self.channel {
            AnalogChannel::Moisture => plant.moisture,
            AnalogChannel::Light => plant.light_level(),
        };
        Ok(value.round().clamp(0.0, f32::from(u16::MAX)) as u16)
    }
}

pub struct SimClimate {
    plant: SharedPlant,
}

impl ClimateInput for SimClimate {
    fn read_climate(&mut self) -> Result<Climate, SensorError> {
        let mut plant = lock(&self.plant);
        plant.climate_reads = plant.climate_reads.wrapping_add(1);
        if let Some(n) = plant.climate_fault_every {
            if n > 0 && plant.climate_reads % n == 0 {
                return Err(SensorError::BusReadFailed);
            }
        }
        Ok(Climate {
            temperature_c: (plant.temperature_c * 10.0).round() / 10.0,
            humidity_pct: (plant.humidity_pct * 10.0).round() / 10.0,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum RelayOutput {
    Pump,
    Lamp,
}

pub struct SimRelayPin {
    plant: SharedPlant,
    output: RelayOutput,
}

impl digital::ErrorType for SimRelayPin {
    type Error = Infallible;
}

impl SimRelayPin {
    fn write(&mut self, high: bool) {
        let mut plant = lock(&self.plant);
        match self.output {
            RelayOutput::Pump => plant.pump_level = high,
            RelayOutput::Lamp => plant.lamp_level = high,
        }
    }
}

impl OutputPin for SimRelayPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

pub struct SimServo {
    plant: SharedPlant,
}

impl pwm::ErrorType for SimServo {
    type Error = Infallible;
}

impl SetDutyCycle for SimServo {
    fn max_duty_cycle(&self) -> u16 {
        SIM_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        // Zero duty is a released drive: the door stays put.
        if duty > 0 {
            let angle = duty.saturating_sub(SERVO_ZERO_DUTY).min(DOOR_MAX_DEG);
            lock(&self.plant).door_angle = angle;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Board
// ═══════════════════════════════════════════════════════════════

pub struct SimBoard {
    plant: SharedPlant,
}

impl SimBoard {
    pub fn new(plant: Plant) -> Self {
        Self {
            plant: Arc::new(Mutex::new(plant)),
        }
    }

    /// Shared handle on the model, for inspection.
    pub fn plant(&self) -> SharedPlant {
        Arc::clone(&self.plant)
    }

    /// Wire the standard drivers onto simulated channels.
    pub fn build(&self) -> crate::error::Result<Board> {
        let analog = |channel| SimAnalog {
            plant: self.plant(),
            channel,
        };
        let relay_pin = |output| SimRelayPin {
            plant: self.plant(),
            output,
        };

        let sensors = SensorGateway::new(
            analog(AnalogChannel::Moisture),
            analog(AnalogChannel::Light),
            SimClimate { plant: self.plant() },
            StdDelay,
        );
        let light = Relay::new(relay_pin(RelayOutput::Lamp), pins::LIGHT_RELAY_ACTIVE_LOW)?;
        let door = DoorServo::new(SimServo { plant: self.plant() }, StdDelay)?;
        let pump = WaterPump::new(
            Relay::new(relay_pin(RelayOutput::Pump), pins::PUMP_RELAY_ACTIVE_LOW)?,
            StdDelay,
        );

        Ok(Board {
            sensors: Box::new(sensors),
            light: Box::new(light),
            door: Box::new(door),
            pump: Box::new(pump),
        })
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new(Plant::default())
    }
}
