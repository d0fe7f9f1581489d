//! Blocking delay backed by the OS scheduler.
//!
//! Settle waits and pump pulses run inside the owning task's thread, so a
//! plain thread sleep is all they need.  Works on the host and on ESP-IDF
//! (where `std::thread::sleep` maps onto a FreeRTOS delay).

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
