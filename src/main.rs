//! Growbox Controller: Main Entry Point
//!
//! Five independent periodic tasks over one shared controller.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Board (esp_board | sim)   LogEventSink   LogReporter          │
//! │  (Sensor+Light+Door+Pump)  (EventSink)    (ReportingBridge)    │
//! │  SystemClock               DefaultConfig | JsonFileConfig      │
//! │  (WallClock)               (ConfigPort)                        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        Controller (policy · actuator locking)          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler: light · temperature · water · status · photo       │
//! │  (one thread each, rearm after completion)                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use growbox::adapters::file_config::{DefaultConfig, JsonFileConfig};
use growbox::adapters::hardware::Board;
use growbox::adapters::log_reporter::LogReporter;
use growbox::adapters::log_sink::LogEventSink;
use growbox::adapters::time::SystemClock;
use growbox::app::ports::{ConfigPort, EventSink};
use growbox::app::tasks;
use growbox::config::Settings;
use growbox::scheduler::{Scheduler, Shutdown, SystemTimer};

// ── Platform glue ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_platform() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_platform() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(target_os = "espidf")]
fn take_board() -> Result<Board> {
    Ok(growbox::adapters::esp_board::take()?)
}

#[cfg(not(target_os = "espidf"))]
fn take_board() -> Result<Board> {
    info!("Board: simulated plant (no hardware)");
    Ok(growbox::adapters::sim::SimBoard::default().build()?)
}

/// The device has no interrupt source; it runs until power is cut.
#[cfg(target_os = "espidf")]
fn install_interrupt(_shutdown: Arc<Shutdown>) -> Result<()> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn install_interrupt(shutdown: Arc<Shutdown>) -> Result<()> {
    ctrlc::set_handler(move || {
        info!("Interrupt received");
        shutdown.trigger();
    })?;
    Ok(())
}

/// First CLI argument names a JSON settings file; otherwise built-in defaults.
fn load_settings() -> growbox::error::Result<Settings> {
    let loaded = match std::env::args().nth(1) {
        Some(path) => JsonFileConfig::new(path).load(),
        None => DefaultConfig.load(),
    };
    loaded.map_err(|e| {
        error!("Config: {}; refusing to start", e);
        growbox::error::Error::from(e)
    })
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    init_platform()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Growbox v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Settings ───────────────────────────────────────────
    let settings = load_settings()?;
    info!(
        "Config: light {}-{}h <= {} | door > {:.1}\u{00b0}C | water < {} for {:.1}s",
        settings.light_from_hour,
        settings.light_until_hour,
        settings.light_threshold,
        settings.temp_threshold_c,
        settings.moisture_threshold,
        settings.watering_time_secs
    );

    // ── 3. Hardware + controller ──────────────────────────────
    let board = take_board()?;
    let sink: Arc<dyn EventSink + Send + Sync> = Arc::new(LogEventSink::new());
    let controller = Arc::new(board.into_controller(
        settings,
        Box::new(LogReporter::new()),
        Box::new(SystemClock::new()),
        sink,
    ));

    // ── 4. Arm the periodic tasks ─────────────────────────────
    let mut scheduler = Scheduler::new(Arc::new(SystemTimer));
    install_interrupt(scheduler.shutdown_handle())?;
    for task in tasks::build(&controller) {
        scheduler.arm(task)?;
    }
    info!("Scheduler: {} tasks running", scheduler.task_count());

    // ── 5. Idle until interrupted ─────────────────────────────
    scheduler.wait();
    info!("Shutdown: waiting for in-flight actions");
    let stats = scheduler.join();

    // ── 6. Safe state ─────────────────────────────────────────
    controller.safe_state();
    for s in &stats {
        info!("TASK | {}", s);
    }
    info!("Shutdown complete");
    Ok(())
}
