//! DHT22 / AM2302 frame decoding.
//!
//! The sensor answers a start pulse with 40 bits: humidity (16), temperature
//! (16, sign-magnitude) and an 8-bit checksum.  Timing-critical bit capture
//! lives in the board adapter; this module only turns the captured bytes
//! into a [`Climate`] so it can be tested on the host.

use super::Climate;
use crate::error::SensorError;

/// Bytes in one DHT22 frame.
pub const FRAME_LEN: usize = 5;

/// Decode a captured frame.  A checksum mismatch is a bus fault.
pub fn decode_frame(frame: [u8; FRAME_LEN]) -> Result<Climate, SensorError> {
    let sum = frame[..4]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::BusReadFailed);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature_c = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(Climate {
        temperature_c,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}
