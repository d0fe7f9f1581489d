//! Text payloads handed to the reporting bridge.
//!
//! Both builders write into fixed-capacity [`heapless::String`]s so a
//! report never allocates.

use core::fmt::Write;

use chrono::NaiveDateTime;

use crate::sensors::SensorReading;

/// Capacity of a status summary.  The widest line set (five-digit ADC
/// values, `-40.0` °C, `100.0` %RH) fits with room to spare.
pub const SUMMARY_CAPACITY: usize = 160;

/// Capacity of a photo caption (`dd-mm-YYYY_HH-MM`).
pub const CAPTION_CAPACITY: usize = 24;

pub type Summary = heapless::String<SUMMARY_CAPACITY>;
pub type Caption = heapless::String<CAPTION_CAPACITY>;

/// Sent instead of the values when the reading is invalid.
pub const NO_READINGS: &str = "No sensor readings are available at the moment.";

/// Placeholder stamp while the wall clock is unsynced.
const NO_TIME: &str = "--.--.---- - --:--";

/// ```text
/// 17.10.2026 - 14:05:
/// Water: 512
/// Light: 230
/// Temperature: 21.4
/// Humidity: 48.0
/// ```
pub fn status_summary(reading: &SensorReading, now: Option<NaiveDateTime>) -> Summary {
    let mut out = Summary::new();
    // Overflow only truncates; the capacity covers every representable reading.
    let _ = match now {
        Some(t) => writeln!(out, "{}:", t.format("%d.%m.%Y - %H:%M")),
        None => writeln!(out, "{NO_TIME}:"),
    };
    let _ = match reading {
        SensorReading::Valid(m) => write!(
            out,
            "Water: {}\nLight: {}\nTemperature: {:.1}\nHumidity: {:.1}",
            m.moisture, m.light, m.temperature_c, m.humidity_pct
        ),
        SensorReading::Invalid(_) => out.write_str(NO_READINGS),
    };
    out
}

/// Single-word caption, `dd-mm-YYYY_HH-MM`.  `unsynced` without a clock.
pub fn photo_caption(now: Option<NaiveDateTime>) -> Caption {
    let mut out = Caption::new();
    let _ = match now {
        Some(t) => write!(out, "{}", t.format("%d-%m-%Y_%H-%M")),
        None => out.write_str("unsynced"),
    };
    out
}
