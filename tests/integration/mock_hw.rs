//! Mock adapters for integration tests.
//!
//! Records every actuator call, report and event so tests can assert on the
//! full history without touching real GPIO/PWM registers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use growbox::app::actuators::ActuatorController;
use growbox::app::controller::Controller;
use growbox::app::events::AppEvent;
use growbox::app::ports::{
    DoorPort, EventSink, LightPort, PumpPort, ReportingBridge, SensorPort, WallClock,
};
use growbox::config::Settings;
use growbox::drivers::servo::clamp_angle;
use growbox::error::{ActuatorError, ReportError, SensorError};
use growbox::sensors::{Measurement, SensorReading};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Light(bool),
    Door(i32),
    DoorRelease,
    Pump(Duration),
    PumpStop,
    /// A report was handed to the bridge (recorded in the same timeline so
    /// the photo sequence can be checked against the light).
    Photo,
    Status,
}

pub type CallLog = Arc<Mutex<Vec<ActuatorCall>>>;

fn record(log: &CallLog, call: ActuatorCall) {
    log.lock().unwrap().push(call);
}

// ── Actuators ─────────────────────────────────────────────────

pub struct MockLight {
    pub log: CallLog,
    pub fail: bool,
}

impl LightPort for MockLight {
    fn set_light(&mut self, on: bool) -> Result<(), ActuatorError> {
        record(&self.log, ActuatorCall::Light(on));
        if self.fail {
            Err(ActuatorError::GpioWriteFailed)
        } else {
            Ok(())
        }
    }
}

pub struct MockDoor {
    pub log: CallLog,
    pub fail: bool,
}

impl DoorPort for MockDoor {
    fn set_door(&mut self, angle: i32) -> Result<u16, ActuatorError> {
        record(&self.log, ActuatorCall::Door(angle));
        if self.fail {
            return Err(ActuatorError::PwmWriteFailed);
        }
        Ok(clamp_angle(angle))
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        record(&self.log, ActuatorCall::DoorRelease);
        Ok(())
    }
}

pub struct MockPump {
    pub log: CallLog,
}

impl PumpPort for MockPump {
    fn pulse_water(&mut self, duration: Duration) -> Result<(), ActuatorError> {
        record(&self.log, ActuatorCall::Pump(duration));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ActuatorError> {
        record(&self.log, ActuatorCall::PumpStop);
        Ok(())
    }
}

// ── Sensors ───────────────────────────────────────────────────

/// Hands out queued readings in order; repeats the last one when empty.
pub struct ScriptedSensors {
    queue: VecDeque<SensorReading>,
    last: SensorReading,
}

impl ScriptedSensors {
    pub fn new(readings: impl IntoIterator<Item = SensorReading>) -> Self {
        let queue: VecDeque<_> = readings.into_iter().collect();
        let last = queue
            .back()
            .copied()
            .unwrap_or(SensorReading::Invalid(SensorError::BusReadFailed));
        Self { queue, last }
    }
}

impl SensorPort for ScriptedSensors {
    fn read(&mut self) -> SensorReading {
        self.queue.pop_front().unwrap_or(self.last)
    }
}

pub fn valid(moisture: u16, light: u16, temperature_c: f32) -> SensorReading {
    SensorReading::Valid(Measurement {
        moisture,
        light,
        temperature_c,
        humidity_pct: 55.0,
    })
}

pub const FAULT: SensorReading = SensorReading::Invalid(SensorError::NotANumber);

/// Counts reads and notes whether two ever overlapped on the bus.
#[derive(Default)]
pub struct BusWatch {
    active: AtomicU32,
    pub overlapped: AtomicBool,
    pub reads: AtomicU32,
}

/// Sensors that take a few milliseconds per read and report to a
/// [`BusWatch`].
pub struct WatchedSensors(pub Arc<BusWatch>);

impl SensorPort for WatchedSensors {
    fn read(&mut self) -> SensorReading {
        let watch = &self.0;
        if watch.active.fetch_add(1, Ordering::SeqCst) > 0 {
            watch.overlapped.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(5));
        watch.reads.fetch_add(1, Ordering::SeqCst);
        watch.active.fetch_sub(1, Ordering::SeqCst);
        valid(500, 500, 20.0)
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Always 7 March 2026 at `hour`:30, or unsynced.
pub struct FixedClock {
    pub hour: Option<u8>,
}

impl WallClock for FixedClock {
    fn current_hour(&self) -> Option<u8> {
        self.hour
    }

    fn now(&self) -> Option<NaiveDateTime> {
        let h = self.hour?;
        NaiveDate::from_ymd_opt(2026, 3, 7)?.and_hms_opt(u32::from(h), 30, 0)
    }
}

// ── Reporting ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    Status(String),
    Photo(String),
}

pub struct RecordingReporter {
    pub posts: Arc<Mutex<Vec<Post>>>,
    pub log: CallLog,
    pub fail: bool,
}

impl RecordingReporter {
    fn outcome(&self) -> Result<(), ReportError> {
        if self.fail {
            Err(ReportError::Service("503 from upstream".into()))
        } else {
            Ok(())
        }
    }
}

impl ReportingBridge for RecordingReporter {
    fn publish_status(&mut self, summary: &str) -> Result<(), ReportError> {
        record(&self.log, ActuatorCall::Status);
        self.posts.lock().unwrap().push(Post::Status(summary.to_owned()));
        self.outcome()
    }

    fn publish_photo(&mut self, caption: &str) -> Result<(), ReportError> {
        record(&self.log, ActuatorCall::Photo);
        self.posts.lock().unwrap().push(Post::Photo(caption.to_owned()));
        self.outcome()
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Mutex<Vec<AppEvent>>,
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Pin + delay sharing one timeline ──────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Level(bool),
    WaitNs(u64),
}

pub type Timeline = Arc<Mutex<Vec<Step>>>;

pub struct TimelinePin(pub Timeline);

impl ErrorType for TimelinePin {
    type Error = core::convert::Infallible;
}

impl OutputPin for TimelinePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.lock().unwrap().push(Step::Level(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.lock().unwrap().push(Step::Level(true));
        Ok(())
    }
}

/// Records waits instead of sleeping.
pub struct TimelineDelay(pub Timeline);

impl DelayNs for TimelineDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.lock().unwrap().push(Step::WaitNs(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.lock().unwrap().push(Step::WaitNs(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.lock().unwrap().push(Step::WaitNs(u64::from(ms) * 1_000_000));
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A controller over mocks, plus handles on everything it records.
pub struct Rig {
    pub controller: Controller,
    pub calls: CallLog,
    pub posts: Arc<Mutex<Vec<Post>>>,
    pub sink: Arc<CollectingSink>,
}

pub struct RigBuilder {
    settings: Settings,
    hour: Option<u8>,
    readings: Vec<SensorReading>,
    light_fails: bool,
    door_fails: bool,
    reporter_fails: bool,
    pump: Option<Box<dyn PumpPort + Send>>,
    sensors: Option<Box<dyn SensorPort + Send>>,
    photo_settle: Duration,
}

#[allow(dead_code)]
impl RigBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            hour: Some(12),
            readings: Vec::new(),
            light_fails: false,
            door_fails: false,
            reporter_fails: false,
            pump: None,
            sensors: None,
            photo_settle: Duration::ZERO,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn hour(mut self, hour: Option<u8>) -> Self {
        self.hour = hour;
        self
    }

    pub fn readings(mut self, readings: impl IntoIterator<Item = SensorReading>) -> Self {
        self.readings = readings.into_iter().collect();
        self
    }

    pub fn light_fails(mut self) -> Self {
        self.light_fails = true;
        self
    }

    pub fn door_fails(mut self) -> Self {
        self.door_fails = true;
        self
    }

    pub fn reporter_fails(mut self) -> Self {
        self.reporter_fails = true;
        self
    }

    pub fn pump(mut self, pump: Box<dyn PumpPort + Send>) -> Self {
        self.pump = Some(pump);
        self
    }

    /// Replaces the scripted readings.
    pub fn sensors(mut self, sensors: Box<dyn SensorPort + Send>) -> Self {
        self.sensors = Some(sensors);
        self
    }

    pub fn photo_settle(mut self, settle: Duration) -> Self {
        self.photo_settle = settle;
        self
    }

    pub fn build(self) -> Rig {
        let calls: CallLog = Arc::default();
        let posts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(CollectingSink::default());

        let pump = self.pump.unwrap_or_else(|| Box::new(MockPump { log: Arc::clone(&calls) }));
        let actuators = ActuatorController::new(
            Box::new(MockLight {
                log: Arc::clone(&calls),
                fail: self.light_fails,
            }),
            Box::new(MockDoor {
                log: Arc::clone(&calls),
                fail: self.door_fails,
            }),
            pump,
            sink.clone(),
        );
        let sensors = self
            .sensors
            .unwrap_or_else(|| Box::new(ScriptedSensors::new(self.readings)));
        let controller = Controller::new(
            self.settings,
            sensors,
            actuators,
            Box::new(RecordingReporter {
                posts: Arc::clone(&posts),
                log: Arc::clone(&calls),
                fail: self.reporter_fails,
            }),
            Box::new(FixedClock { hour: self.hour }),
            sink.clone(),
        )
        .with_photo_settle(self.photo_settle);

        Rig {
            controller,
            calls,
            posts,
            sink,
        }
    }
}

#[allow(dead_code)]
impl Rig {
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.sink.events.lock().unwrap().clone()
    }
}
