use tokio::runtime::Handle;

use super::{Disposed, Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::error::RxError;

/// Runs work as tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
  runtime: Handle,
  disposed: Disposed,
}

impl TokioScheduler {
  pub fn new(runtime: Handle) -> Self { TokioScheduler { runtime, disposed: Disposed::default() } }

  /// Binds to the runtime the caller is running on.
  pub fn current() -> Result<Self, RxError> {
    Handle::try_current()
      .map(Self::new)
      .map_err(|e| RxError::scheduling(format!("no tokio runtime: {e}")))
  }

  pub fn dispose(&self) { self.disposed.dispose("tokio") }
}

impl Scheduler for TokioScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
    self.disposed.check("tokio")?;
    let handle = TaskHandle::default();
    let c_handle = handle.clone();
    let join = self.runtime.spawn(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      if !c_handle.is_cancelled() {
        task.run();
      }
      c_handle.finish();
    });
    handle.on_cancel(move || join.abort());
    Ok(handle)
  }

  fn schedule_repeating(
    &self, mut task: RepeatTask, period: Duration, delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError> {
    self.disposed.check("tokio")?;
    let handle = TaskHandle::default();
    let c_handle = handle.clone();
    let join = self.runtime.spawn(async move {
      let mut deadline = tokio::time::Instant::now() + delay.unwrap_or_default();
      loop {
        tokio::time::sleep_until(deadline).await;
        if c_handle.is_cancelled() || !task.tick() {
          break;
        }
        deadline += period;
      }
      c_handle.finish();
    });
    handle.on_cancel(move || join.abort());
    Ok(handle)
  }
}
