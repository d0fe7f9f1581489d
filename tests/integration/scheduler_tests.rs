//! The five periodic tasks driven by the scheduler.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use growbox::app::tasks;
use growbox::config::Settings;
use growbox::scheduler::{run_task, Scheduler, Shutdown, Timer};

use crate::mock_hw::{valid, ActuatorCall, Post, RigBuilder};

/// Ignores the requested interval and ticks every millisecond.
struct FastTimer;

impl Timer for FastTimer {
    fn sleep(&self, _interval: Duration, shutdown: &Shutdown) -> bool {
        !shutdown.wait_timeout(Duration::from_millis(1))
    }
}

/// Elapses instantly `budget` times, then cancels.
struct CountingTimer {
    waits: Mutex<Vec<Duration>>,
    budget: usize,
}

impl Timer for CountingTimer {
    fn sleep(&self, interval: Duration, shutdown: &Shutdown) -> bool {
        let mut waits = self.waits.lock().unwrap();
        waits.push(interval);
        if waits.len() > self.budget {
            shutdown.trigger();
            return false;
        }
        true
    }
}

#[test]
fn builds_five_tasks_with_staggered_startup() {
    let rig = RigBuilder::new().build();
    let controller = Arc::new(rig.controller);

    let tasks = tasks::build(&controller);

    let names: Vec<_> = tasks.iter().map(|t| t.name).collect();
    assert_eq!(names, ["light", "temperature", "water", "status", "photo"]);
    let intervals: Vec<_> = tasks.iter().map(|t| t.interval.as_secs()).collect();
    assert_eq!(intervals, [61, 62, 63, 3480, 7080]);
    let delays: Vec<_> = tasks
        .iter()
        .map(|t| t.initial_delay.map(|d| d.as_secs()))
        .collect();
    assert_eq!(delays, [Some(5), Some(7), Some(9), Some(11), Some(13)]);
}

#[test]
fn startup_sweep_can_be_disabled() {
    let settings = Settings {
        run_checks_at_startup: false,
        ..Settings::default()
    };
    let rig = RigBuilder::new().settings(settings).build();
    let controller = Arc::new(rig.controller);

    assert!(tasks::build(&controller).iter().all(|t| t.initial_delay.is_none()));
}

#[test]
fn report_failures_count_against_the_task() {
    let rig = RigBuilder::new().readings([valid(500, 500, 20.0)]).reporter_fails().build();
    let posts = Arc::clone(&rig.posts);
    let controller = Arc::new(rig.controller);
    let status = tasks::build(&controller).remove(3);
    let timer = CountingTimer {
        waits: Mutex::new(Vec::new()),
        budget: 3,
    };

    let stats = run_task(status, &timer, &Shutdown::new());

    assert_eq!(stats.fired, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.armed, 4);
    assert_eq!(posts.lock().unwrap().len(), 3);
    assert_eq!(
        *timer.waits.lock().unwrap(),
        [
            Duration::from_secs(11),
            Duration::from_secs(3480),
            Duration::from_secs(3480),
            Duration::from_secs(3480),
        ]
    );
}

#[test]
fn all_tasks_run_concurrently_until_shutdown() {
    let rig = RigBuilder::new().hour(Some(10)).readings([valid(300, 100, 25.0)]).build();
    let calls = Arc::clone(&rig.calls);
    let posts = Arc::clone(&rig.posts);
    let controller = Arc::new(rig.controller);

    let mut scheduler = Scheduler::new(Arc::new(FastTimer));
    for task in tasks::build(&controller) {
        scheduler.arm(task).unwrap();
    }
    std::thread::sleep(Duration::from_millis(100));
    let stats = scheduler.join();
    controller.safe_state();

    assert_eq!(stats.len(), 5);
    for s in &stats {
        assert!(s.fired >= 1, "{s}");
        assert_eq!(s.failed, 0, "{s}");
    }

    let calls = calls.lock().unwrap();
    assert!(calls.contains(&ActuatorCall::Light(true)));
    assert!(calls.contains(&ActuatorCall::Door(90)));
    assert!(calls.contains(&ActuatorCall::Pump(Duration::from_millis(1500))));
    assert_eq!(
        calls[calls.len() - 3..],
        [ActuatorCall::PumpStop, ActuatorCall::Light(false), ActuatorCall::DoorRelease]
    );

    let posts = posts.lock().unwrap();
    assert!(posts.iter().any(|p| matches!(p, Post::Status(_))));
    assert!(posts.iter().any(|p| matches!(p, Post::Photo(_))));
}
