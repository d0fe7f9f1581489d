//! Wall-clock adapter.
//!
//! Implements [`WallClock`] for the light window and report timestamps.
//!
//! - **`target_os = "espidf"`**: `gettimeofday` + `localtime_r` from
//!   newlib; the time zone comes from the `TZ` variable set at boot.
//! - **`not(target_os = "espidf")`**: `chrono::Local`.
//!
//! A clock reading earlier than 2020 is treated as "not synced yet"
//! (fresh boot before SNTP) and reported as `None`.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::app::ports::WallClock;

/// Anything before this year is an unset RTC.
pub const MIN_SYNCED_YEAR: i32 = 2020;

/// `None` for timestamps from an unsynced clock.
pub fn synced(now: NaiveDateTime) -> Option<NaiveDateTime> {
    (now.year() >= MIN_SYNCED_YEAR).then_some(now)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    #[cfg(target_os = "espidf")]
    fn local_now() -> Option<NaiveDateTime> {
        use core::ptr;
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: gettimeofday writes into the stack-owned timeval only.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        // SAFETY: tm is plain data; localtime_r is the re-entrant variant.
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        chrono::NaiveDate::from_ymd_opt(tm.tm_year + 1900, (tm.tm_mon + 1) as u32, tm.tm_mday as u32)?
            .and_hms_opt(tm.tm_hour as u32, tm.tm_min as u32, tm.tm_sec.min(59) as u32)
    }

    #[cfg(not(target_os = "espidf"))]
    fn local_now() -> Option<NaiveDateTime> {
        Some(chrono::Local::now().naive_local())
    }
}

impl WallClock for SystemClock {
    fn current_hour(&self) -> Option<u8> {
        self.now().map(|t| t.hour() as u8)
    }

    fn now(&self) -> Option<NaiveDateTime> {
        Self::local_now().and_then(synced)
    }
}
