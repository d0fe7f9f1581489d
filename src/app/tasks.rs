//! The five periodic behaviors, bound to a shared [`Controller`].

use core::time::Duration;
use std::sync::Arc;

use super::controller::Controller;
use super::events::Check;
use crate::scheduler::ScheduledTask;

/// First startup firing, counted from boot.
pub const STARTUP_DELAY: Duration = Duration::from_secs(5);

/// Gap between consecutive startup firings.
pub const STARTUP_STAGGER: Duration = Duration::from_secs(2);

/// Build one task per [`Check`], in firing order: light, temperature,
/// water, status, photo.
///
/// With `run_checks_at_startup` the tasks fire once shortly after boot
/// (5 s, 7 s, 9 s, ...) instead of waiting a full interval first.
///
/// The three checks absorb their own faults.  A failed report is emitted by
/// the controller and also returned, so it shows in the task's
/// [`TaskStats::failed`](crate::scheduler::TaskStats) count.
pub fn build(controller: &Arc<Controller>) -> Vec<ScheduledTask> {
    let settings = controller.settings().clone();

    let c = Arc::clone(controller);
    let light = ScheduledTask::new(Check::Light.name(), settings.light_check_interval(), move || {
        c.check_light();
        Ok(())
    });

    let c = Arc::clone(controller);
    let temperature = ScheduledTask::new(
        Check::Temperature.name(),
        settings.temp_check_interval(),
        move || {
            c.check_temperature();
            Ok(())
        },
    );

    let c = Arc::clone(controller);
    let water = ScheduledTask::new(Check::Water.name(), settings.water_check_interval(), move || {
        c.check_water();
        Ok(())
    });

    let c = Arc::clone(controller);
    let status = ScheduledTask::new(Check::Status.name(), settings.status_interval(), move || {
        c.post_status()?;
        Ok(())
    });

    let c = Arc::clone(controller);
    let photo = ScheduledTask::new(Check::Photo.name(), settings.photo_interval(), move || {
        c.post_photo()?;
        Ok(())
    });

    let mut tasks = vec![light, temperature, water, status, photo];
    if settings.run_checks_at_startup {
        for (i, task) in tasks.iter_mut().enumerate() {
            task.initial_delay = Some(STARTUP_DELAY + STARTUP_STAGGER * i as u32);
        }
    }
    tasks
}
