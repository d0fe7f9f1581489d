//! ESP32 board bring-up.
//!
//! Configures ADC1, the relay GPIOs, the DHT22 data line and the LEDC servo
//! channel with raw ESP-IDF sys calls, then wraps each peripheral in the
//! `embedded-hal` / sensor trait the drivers expect.  Called once from
//! `main()` before any task is armed.

use core::fmt;
use std::sync::Arc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::sys::*;
use log::info;

use super::hardware::Board;
use crate::drivers::pump::WaterPump;
use crate::drivers::relay::Relay;
use crate::drivers::servo::DoorServo;
use crate::error::{ActuatorError, SensorError};
use crate::pins;
use crate::sensors::dht::{decode_frame, FRAME_LEN};
use crate::sensors::{AnalogInput, Climate, ClimateInput, SensorGateway};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    Actuator(ActuatorError),
}

impl fmt::Display for BoardInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::Actuator(e) => write!(f, "actuator init failed: {}", e),
        }
    }
}

impl std::error::Error for BoardInitError {}

impl From<ActuatorError> for BoardInitError {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

fn check(ret: esp_err_t, err: fn(i32) -> BoardInitError) -> Result<(), BoardInitError> {
    if ret == ESP_OK as i32 { Ok(()) } else { Err(err(ret)) }
}

// ── ADC (oneshot) ─────────────────────────────────────────────

struct AdcUnit(adc_oneshot_unit_handle_t);

// SAFETY: the oneshot driver serialises access to a unit internally, and
// the handle is never freed while the board is alive.
unsafe impl Send for AdcUnit {}
unsafe impl Sync for AdcUnit {}

pub struct EspAdcChannel {
    unit: Arc<AdcUnit>,
    channel: adc_channel_t,
}

impl AnalogInput for EspAdcChannel {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let mut raw: i32 = 0;
        // SAFETY: unit handle and channel were configured in init_adc().
        let ret = unsafe { adc_oneshot_read(self.unit.0, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(raw.max(0) as u16)
    }
}

fn init_adc() -> Result<(EspAdcChannel, EspAdcChannel), BoardInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
    // SAFETY: init_cfg and handle live on this stack frame for the call.
    check(unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) }, BoardInitError::AdcInitFailed)?;

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in [pins::MOISTURE_ADC_CHANNEL, pins::LIGHT_ADC_CHANNEL] {
        // SAFETY: handle was just created by adc_oneshot_new_unit.
        check(
            unsafe { adc_oneshot_config_channel(handle, channel, &chan_cfg) },
            BoardInitError::AdcInitFailed,
        )?;
    }

    let unit = Arc::new(AdcUnit(handle));
    info!(
        "Board: ADC1 configured (CH{}=moisture {}, CH{}=light {})",
        pins::MOISTURE_ADC_CHANNEL,
        pins::MOISTURE_PORT,
        pins::LIGHT_ADC_CHANNEL,
        pins::LIGHT_PORT
    );
    Ok((
        EspAdcChannel {
            unit: Arc::clone(&unit),
            channel: pins::MOISTURE_ADC_CHANNEL,
        },
        EspAdcChannel {
            unit,
            channel: pins::LIGHT_ADC_CHANNEL,
        },
    ))
}

// ── GPIO ──────────────────────────────────────────────────────

fn config_gpio(pin: i32, mode: gpio_mode_t, pull_up: bool) -> Result<(), BoardInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a plain struct on this stack frame.
    check(unsafe { gpio_config(&cfg) }, BoardInitError::GpioConfigFailed)
}

/// Push-pull output driving a relay module.
pub struct EspOutput {
    gpio: i32,
}

impl EspOutput {
    fn new(gpio: i32) -> Result<Self, BoardInitError> {
        config_gpio(gpio, gpio_mode_t_GPIO_MODE_OUTPUT, false)?;
        Ok(Self { gpio })
    }

    fn write(&mut self, high: bool) -> Result<(), digital::ErrorKind> {
        // SAFETY: register write on a pin configured as output in new().
        let ret = unsafe { gpio_set_level(self.gpio, u32::from(high)) };
        if ret == ESP_OK as i32 { Ok(()) } else { Err(digital::ErrorKind::Other) }
    }
}

impl digital::ErrorType for EspOutput {
    type Error = digital::ErrorKind;
}

impl OutputPin for EspOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

// ── DHT22 (single-wire) ───────────────────────────────────────

/// Host start pulse, held low.
const DHT_START_LOW_US: u32 = 1_100;
/// Longest any single phase of the exchange may last.
const DHT_PHASE_TIMEOUT_US: i64 = 120;
/// High phases longer than this encode a `1` bit (26-28 µs = 0, 70 µs = 1).
const DHT_ONE_THRESHOLD_US: i64 = 48;

pub struct EspDht22 {
    gpio: i32,
}

impl EspDht22 {
    fn new(gpio: i32) -> Result<Self, BoardInitError> {
        config_gpio(gpio, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD, true)?;
        // SAFETY: pin configured as open-drain output above; high = released.
        unsafe { gpio_set_level(gpio, 1) };
        Ok(Self { gpio })
    }

    fn level(&self) -> bool {
        // SAFETY: read-only register access on a configured pin.
        (unsafe { gpio_get_level(self.gpio) }) != 0
    }

    /// Busy-wait while the line sits at `level`.  Returns the time spent.
    fn hold(&self, level: bool) -> Result<i64, SensorError> {
        // SAFETY: esp_timer_get_time is a free-running counter read.
        let start = unsafe { esp_timer_get_time() };
        while self.level() == level {
            let spent = unsafe { esp_timer_get_time() } - start;
            if spent > DHT_PHASE_TIMEOUT_US {
                return Err(SensorError::BusReadFailed);
            }
        }
        Ok(unsafe { esp_timer_get_time() } - start)
    }

    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        // SAFETY: open-drain pin owned by this driver; busy delays only.
        unsafe {
            gpio_set_level(self.gpio, 0);
            esp_rom_delay_us(DHT_START_LOW_US);
            gpio_set_level(self.gpio, 1);
        }
        // Release, then the sensor answers with 80 µs low and 80 µs high.
        self.hold(true)?;
        self.hold(false)?;
        self.hold(true)?;

        let mut frame = [0u8; FRAME_LEN];
        for bit in 0..FRAME_LEN * 8 {
            self.hold(false)?;
            let high = self.hold(true)?;
            if high > DHT_ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }
}

impl ClimateInput for EspDht22 {
    fn read_climate(&mut self) -> Result<Climate, SensorError> {
        decode_frame(self.read_frame()?)
    }
}

// ── LEDC servo channel ────────────────────────────────────────

const SERVO_LEDC_TIMER: ledc_timer_t = ledc_timer_t_LEDC_TIMER_0;
const SERVO_LEDC_CHANNEL: ledc_channel_t = ledc_channel_t_LEDC_CHANNEL_0;

pub struct EspServoChannel;

impl EspServoChannel {
    fn new() -> Result<Self, BoardInitError> {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: SERVO_LEDC_TIMER,
            duty_resolution: pins::SERVO_PWM_RESOLUTION_BITS,
            freq_hz: pins::SERVO_PWM_FREQ_HZ,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: config structs live on this stack frame for the call.
        check(unsafe { ledc_timer_config(&timer) }, BoardInitError::LedcInitFailed)?;
        let channel = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: SERVO_LEDC_CHANNEL,
            timer_sel: SERVO_LEDC_TIMER,
            gpio_num: pins::DOOR_SERVO_GPIO,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        check(unsafe { ledc_channel_config(&channel) }, BoardInitError::LedcInitFailed)?;
        Ok(Self)
    }
}

impl pwm::ErrorType for EspServoChannel {
    type Error = pwm::ErrorKind;
}

impl SetDutyCycle for EspServoChannel {
    fn max_duty_cycle(&self) -> u16 {
        ((1u32 << pins::SERVO_PWM_RESOLUTION_BITS) - 1) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        // SAFETY: channel configured in new(); the door task is the only writer.
        let ret = unsafe {
            let r = ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, SERVO_LEDC_CHANNEL, u32::from(duty));
            if r == ESP_OK as i32 {
                ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, SERVO_LEDC_CHANNEL)
            } else {
                r
            }
        };
        if ret == ESP_OK as i32 { Ok(()) } else { Err(pwm::ErrorKind::Other) }
    }
}

// ── Board ─────────────────────────────────────────────────────

/// Bring up every peripheral and wire the standard drivers onto them.
pub fn take() -> Result<Board, BoardInitError> {
    let (moisture, light) = init_adc()?;
    let climate = EspDht22::new(pins::CLIMATE_GPIO)?;
    info!("Board: DHT22 on GPIO{} ({})", pins::CLIMATE_GPIO, pins::CLIMATE_PORT);

    let light_relay = Relay::new(EspOutput::new(pins::LIGHT_RELAY_GPIO)?, pins::LIGHT_RELAY_ACTIVE_LOW)?;
    let pump_relay = Relay::new(EspOutput::new(pins::PUMP_RELAY_GPIO)?, pins::PUMP_RELAY_ACTIVE_LOW)?;
    info!(
        "Board: relays light=GPIO{} ({}) pump=GPIO{} ({})",
        pins::LIGHT_RELAY_GPIO,
        pins::LIGHT_RELAY_PORT,
        pins::PUMP_RELAY_GPIO,
        pins::PUMP_RELAY_PORT
    );

    let door = DoorServo::new(EspServoChannel::new()?, FreeRtos)?;
    info!("Board: door servo on GPIO{} (LEDC CH0)", pins::DOOR_SERVO_GPIO);

    Ok(Board {
        sensors: Box::new(SensorGateway::new(moisture, light, climate, FreeRtos)),
        light: Box::new(light_relay),
        door: Box::new(door),
        pump: Box::new(WaterPump::new(pump_relay, FreeRtos)),
    })
}
