use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::error::RxError;

/// Runs work on the calling thread, right away.
///
/// Delays and periods block the calling thread with `std::thread::sleep`, so
/// a repeating task only returns once it stops ticking (e.g. because a
/// downstream `take` finished).
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
    if let Some(delay) = delay {
      std::thread::sleep(delay);
    }
    task.run();
    Ok(TaskHandle::finished())
  }

  fn schedule_repeating(
    &self, mut task: RepeatTask, period: Duration, delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError> {
    if let Some(delay) = delay {
      std::thread::sleep(delay);
    }
    while task.tick() {
      std::thread::sleep(period);
    }
    Ok(TaskHandle::finished())
  }
}
