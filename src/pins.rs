//! Port and pin assignments for the growbox controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Logical ports follow the Grove connector labels
//! printed on the shield; the GPIO numbers are the ESP32 pins they route to.

// ---------------------------------------------------------------------------
// Sensors: Analog
// ---------------------------------------------------------------------------

/// Capacitive soil moisture probe, Grove port A2.
pub const MOISTURE_PORT: &str = "A2";
/// ADC1 channel for the moisture probe (GPIO 36).
pub const MOISTURE_ADC_CHANNEL: u32 = 0;

/// Light-dependent resistor module, Grove port A1.
pub const LIGHT_PORT: &str = "A1";
/// ADC1 channel for the light sensor (GPIO 39).
pub const LIGHT_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Sensors: Digital
// ---------------------------------------------------------------------------

/// DHT22 temperature/humidity sensor, Grove port D2.
pub const CLIMATE_PORT: &str = "D2";
/// Single-wire data line of the DHT22.
pub const CLIMATE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Actuators: Relays
// ---------------------------------------------------------------------------

/// Water pump relay, Grove port D7.
pub const PUMP_RELAY_PORT: &str = "D7";
pub const PUMP_RELAY_GPIO: i32 = 26;
/// Pump relay energises on a HIGH output.
pub const PUMP_RELAY_ACTIVE_LOW: bool = false;

/// Grow light relay, Grove port D4.
pub const LIGHT_RELAY_PORT: &str = "D4";
pub const LIGHT_RELAY_GPIO: i32 = 27;
/// The light relay board is wired inverted: driving the pin LOW lights the lamp.
pub const LIGHT_RELAY_ACTIVE_LOW: bool = true;

// ---------------------------------------------------------------------------
// Actuators: Servo
// ---------------------------------------------------------------------------

/// Vent door hobby servo signal line.
pub const DOOR_SERVO_GPIO: i32 = 17;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC resolution used for the servo channel.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
