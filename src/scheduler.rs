//! Timer/scheduler engine.
//!
//! Every periodic behavior is a [`ScheduledTask`] running on its own
//! thread.  A task sleeps for its interval, fires its action, and only then
//! re-arms for the next interval.  There is no shared tick.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  per task thread                                             │
//! │                                                              │
//! │   arm ──▶ Idle ──(interval elapses)──▶ Running ──▶ re-arm    │
//! │            │                               │                 │
//! │            │                     Err / panic: logged,        │
//! │            │                     counted, still re-armed     │
//! │            ▼                                                 │
//! │       Shutdown::trigger() wakes the sleep ──▶ thread exits   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rearm-after-completion means the action's own run time (a 2 s door
//! settle, a watering pulse, a slow upload) pushes every later firing back
//! by that much.  Firings drift; they are not aligned to wall-clock ticks.

use core::time::Duration;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};

/// Stack for each task thread on the device (sensor reads, log formatting
/// and report building all happen on it).
#[cfg(target_os = "espidf")]
const TASK_STACK_BYTES: usize = 12 * 1024;

// ═══════════════════════════════════════════════════════════════
//  Shutdown signal
// ═══════════════════════════════════════════════════════════════

/// One-way latch shared by every task.  Triggering it wakes all sleeping
/// timers at once.
#[derive(Default)]
pub struct Shutdown {
    triggered: Mutex<bool>,
    cv: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        *self.triggered.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.cv.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.triggered.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`.  Returns `true` if shutdown was triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.triggered.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .cv
            .wait_timeout_while(guard, timeout, |t| !*t)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    /// Block until shutdown is triggered.
    pub fn wait(&self) {
        let guard = self.triggered.lock().unwrap_or_else(PoisonError::into_inner);
        let _guard = self
            .cv
            .wait_while(guard, |t| !*t)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Timer
// ═══════════════════════════════════════════════════════════════

/// Interval timer used by the task loop.  Swapped for a counting fake in
/// tests so intervals elapse instantly.
pub trait Timer: Send + Sync {
    /// Wait for `interval`.  Returns `false` if the wait was cancelled by
    /// `shutdown`, `true` if the interval elapsed.
    fn sleep(&self, interval: Duration, shutdown: &Shutdown) -> bool;
}

/// Real time, cancellable through the [`Shutdown`] condvar.
pub struct SystemTimer;

impl Timer for SystemTimer {
    fn sleep(&self, interval: Duration, shutdown: &Shutdown) -> bool {
        !shutdown.wait_timeout(interval)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tasks
// ═══════════════════════════════════════════════════════════════

pub type TaskAction = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// A named periodic behavior.
pub struct ScheduledTask {
    /// Human-readable label, also the thread name.
    pub name: &'static str,
    /// Time from one completion to the next firing.
    pub interval: Duration,
    /// Time to the first firing; `None` means one full `interval`.
    pub initial_delay: Option<Duration>,
    action: TaskAction,
}

impl ScheduledTask {
    pub fn new<F>(name: &'static str, interval: Duration, action: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            name,
            interval,
            initial_delay: None,
            action: Box::new(action),
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("initial_delay", &self.initial_delay)
            .finish_non_exhaustive()
    }
}

/// Per-task state machine: `Idle → Running → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Armed, waiting for the interval to elapse.
    Idle,
    /// Executing its action.
    Running,
}

/// Counters reported by a task when its thread exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub name: &'static str,
    /// Times the action was started.
    pub fired: u32,
    /// Firings that returned an error or panicked.
    pub failed: u32,
    /// Times the timer was armed (initial arm included).
    pub armed: u32,
}

impl TaskStats {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            fired: 0,
            failed: 0,
            armed: 0,
        }
    }
}

impl fmt::Display for TaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: fired={} failed={} armed={}",
            self.name, self.fired, self.failed, self.armed
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Run one task until `shutdown` fires.  Executes on the calling thread.
///
/// Each completion, whether the action succeeded, returned an error or
/// panicked, re-arms the timer exactly once.  A shutdown raised during the
/// action lets it finish and then stops without re-arming.
pub fn run_task(mut task: ScheduledTask, timer: &dyn Timer, shutdown: &Shutdown) -> TaskStats {
    let name = task.name;
    let mut stats = TaskStats::new(name);
    let mut state = TaskState::Idle;
    let mut wait = task.initial_delay.unwrap_or(task.interval);
    stats.armed += 1;
    debug!("TASK | {name}: armed for {wait:?}");

    while timer.sleep(wait, shutdown) {
        state = TaskState::Running;
        stats.fired += 1;
        debug!("TASK | {name}: {state:?}");
        match panic::catch_unwind(AssertUnwindSafe(|| (task.action)())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                stats.failed += 1;
                warn!("TASK | {name}: action failed: {e:#}");
            }
            Err(payload) => {
                stats.failed += 1;
                error!("TASK | {name}: action panicked: {}", panic_message(payload.as_ref()));
            }
        }
        state = TaskState::Idle;
        if shutdown.is_triggered() {
            break;
        }
        wait = task.interval;
        stats.armed += 1;
    }

    debug!("TASK | {name}: stopped ({state:?})");
    stats
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Owns the task threads and the shared [`Shutdown`] latch.
pub struct Scheduler {
    timer: Arc<dyn Timer>,
    shutdown: Arc<Shutdown>,
    handles: Vec<(&'static str, JoinHandle<TaskStats>)>,
}

impl Scheduler {
    pub fn new(timer: Arc<dyn Timer>) -> Self {
        Self {
            timer,
            shutdown: Arc::new(Shutdown::new()),
            handles: Vec::new(),
        }
    }

    /// Handle for whoever ends the run (signal handler, tests).
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        Arc::clone(&self.shutdown)
    }

    /// Start `task` on its own thread.
    pub fn arm(&mut self, task: ScheduledTask) -> std::io::Result<()> {
        let name = task.name;
        let timer = Arc::clone(&self.timer);
        let shutdown = Arc::clone(&self.shutdown);
        let builder = thread::Builder::new().name(name.into());
        #[cfg(target_os = "espidf")]
        let builder = builder.stack_size(TASK_STACK_BYTES);
        let handle = builder.spawn(move || run_task(task, timer.as_ref(), &shutdown))?;
        info!("Scheduler: armed '{name}'");
        self.handles.push((name, handle));
        Ok(())
    }

    pub fn task_count(&self) -> usize {
        self.handles.len()
    }

    /// Block the caller until shutdown is triggered.
    pub fn wait(&self) {
        self.shutdown.wait();
    }

    /// Trigger shutdown and wait for every task to finish its in-flight
    /// action.
    pub fn join(self) -> Vec<TaskStats> {
        self.shutdown.trigger();
        self.handles
            .into_iter()
            .map(|(name, handle)| {
                handle.join().unwrap_or_else(|_| {
                    error!("Scheduler: task '{name}' thread died");
                    TaskStats::new(name)
                })
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
