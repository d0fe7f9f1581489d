//! Controller settings
//!
//! All tunable parameters for the growbox.  Loaded once at startup through a
//! [`ConfigPort`](crate::app::ports::ConfigPort) and read-only afterwards.

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Core controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // --- Check cadence ---
    /// Light check interval (seconds)
    pub light_check_interval_secs: u32,
    /// Temperature check interval (seconds)
    pub temp_check_interval_secs: u32,
    /// Water check interval (seconds)
    pub water_check_interval_secs: u32,

    // --- Reporting cadence ---
    /// Status post interval (seconds)
    pub status_interval_secs: u32,
    /// Photo post interval (seconds)
    pub photo_interval_secs: u32,

    // --- Light ---
    /// First hour (0-23) of the active-light window, inclusive
    pub light_from_hour: u8,
    /// Last hour (0-23) of the active-light window, inclusive
    pub light_until_hour: u8,
    /// Light level at or below which the grow light is switched on
    pub light_threshold: u16,

    // --- Climate ---
    /// Temperature (Celsius) above which the vent door opens
    pub temp_threshold_c: f32,

    // --- Water ---
    /// Moisture level below which the pump is pulsed
    pub moisture_threshold: u16,
    /// Pump pulse length (seconds)
    pub watering_time_secs: f32,

    // --- Startup ---
    /// Run every task once shortly after boot instead of waiting a full interval
    pub run_checks_at_startup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            light_check_interval_secs: 61,
            temp_check_interval_secs: 62,
            water_check_interval_secs: 63,

            status_interval_secs: 60 * 58,
            photo_interval_secs: 2 * 60 * 59,

            light_from_hour: 8,
            light_until_hour: 20,
            light_threshold: 350,

            temp_threshold_c: 18.0,

            moisture_threshold: 400,
            watering_time_secs: 1.5,

            run_checks_at_startup: true,
        }
    }
}

/// Longest pump pulse accepted from configuration.
pub const MAX_WATERING_SECS: f32 = 600.0;

impl Settings {
    /// Parse settings from a JSON document.  Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the controller cannot run with.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            (self.light_check_interval_secs, "light_check_interval_secs must be > 0"),
            (self.temp_check_interval_secs, "temp_check_interval_secs must be > 0"),
            (self.water_check_interval_secs, "water_check_interval_secs must be > 0"),
            (self.status_interval_secs, "status_interval_secs must be > 0"),
            (self.photo_interval_secs, "photo_interval_secs must be > 0"),
        ];
        for (value, msg) in intervals {
            if value == 0 {
                return Err(ConfigError::ValidationFailed(msg));
            }
        }
        if self.light_from_hour > 23 || self.light_until_hour > 23 {
            return Err(ConfigError::ValidationFailed("light hours must be within 0-23"));
        }
        if self.light_from_hour > self.light_until_hour {
            return Err(ConfigError::ValidationFailed(
                "light_from_hour must not be after light_until_hour",
            ));
        }
        if !self.temp_threshold_c.is_finite() {
            return Err(ConfigError::ValidationFailed("temp_threshold_c must be finite"));
        }
        if !self.watering_time_secs.is_finite() || self.watering_time_secs <= 0.0 {
            return Err(ConfigError::ValidationFailed("watering_time_secs must be > 0"));
        }
        if self.watering_time_secs > MAX_WATERING_SECS {
            return Err(ConfigError::ValidationFailed("watering_time_secs must be <= 600"));
        }
        Ok(())
    }

    pub fn light_check_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.light_check_interval_secs))
    }

    pub fn temp_check_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.temp_check_interval_secs))
    }

    pub fn water_check_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.water_check_interval_secs))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.status_interval_secs))
    }

    pub fn photo_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.photo_interval_secs))
    }

    /// Pump pulse length.  `validate()` guarantees the value is positive and finite.
    pub fn watering_time(&self) -> Duration {
        Duration::from_secs_f32(self.watering_time_secs)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No settings source found.
    NotFound,
    /// Settings source exists but could not be parsed.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the settings source.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "settings not found"),
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
