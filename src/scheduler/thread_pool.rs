use futures::{
  executor::ThreadPool,
  future::{AbortHandle, Abortable},
};
use futures_time::task::sleep;
use once_cell::sync::Lazy;

use super::{Disposed, Duration, Instant, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::error::RxError;

static SHARED_SINGLE: Lazy<Result<ThreadPool, RxError>> = Lazy::new(|| build_pool(1, "single"));
static SHARED_POOL: Lazy<Result<ThreadPool, RxError>> =
  Lazy::new(|| build_pool(default_workers(), "parallel"));

fn default_workers() -> usize { std::thread::available_parallelism().map_or(4, |n| n.get()) }

fn build_pool(workers: usize, name: &str) -> Result<ThreadPool, RxError> {
  ThreadPool::builder()
    .pool_size(workers.max(1))
    .name_prefix(format!("rxflux-{name}-"))
    .create()
    .map_err(|e| RxError::scheduling(format!("cannot start {name} workers: {e}")))
}

/// Schedules futures on a `futures` thread pool, with `futures-time` timers.
#[derive(Clone)]
struct Executor {
  pool: Result<ThreadPool, RxError>,
  disposed: Disposed,
  name: &'static str,
}

impl Executor {
  fn pool(&self) -> Result<&ThreadPool, RxError> {
    self.disposed.check(self.name)?;
    self.pool.as_ref().map_err(Clone::clone)
  }

  fn spawn(
    &self, handle: &TaskHandle, work: impl std::future::Future<Output = ()> + Send + 'static,
  ) -> Result<(), RxError> {
    let pool = self.pool()?;
    let (abort, registration) = AbortHandle::new_pair();
    handle.on_cancel(move || abort.abort());
    pool.spawn_ok(async move {
      let _ = Abortable::new(work, registration).await;
    });
    Ok(())
  }

  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
    let handle = TaskHandle::default();
    let c_handle = handle.clone();
    self.spawn(&handle, async move {
      if let Some(delay) = delay {
        sleep(delay.into()).await;
      }
      if !c_handle.is_cancelled() {
        task.run();
      }
      c_handle.finish();
    })?;
    Ok(handle)
  }

  fn schedule_repeating(
    &self, mut task: RepeatTask, period: Duration, delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError> {
    let handle = TaskHandle::default();
    let c_handle = handle.clone();
    self.spawn(&handle, async move {
      let mut deadline = Instant::now() + delay.unwrap_or_default();
      loop {
        let now = Instant::now();
        if deadline > now {
          sleep((deadline - now).into()).await;
        }
        if c_handle.is_cancelled() || !task.tick() {
          break;
        }
        deadline += period;
      }
      c_handle.finish();
    })?;
    Ok(handle)
  }
}

/// A scheduler backed by one dedicated worker thread.
///
/// Work submitted with equal deadlines runs in submission order, which makes
/// it the tool of choice for serializing inner sequences of `flat_map`.
#[derive(Clone)]
pub struct SingleScheduler(Executor);

impl SingleScheduler {
  /// Starts a new dedicated worker.
  pub fn new() -> Result<Self, RxError> {
    let pool = build_pool(1, "single")?;
    Ok(SingleScheduler(Executor { pool: Ok(pool), disposed: Disposed::default(), name: "single" }))
  }

  /// Rejects all further work submitted through this scheduler or its
  /// clones.
  pub fn dispose(&self) { self.0.disposed.dispose(self.0.name) }
}

impl Default for SingleScheduler {
  /// The process-wide single worker.
  fn default() -> Self {
    SingleScheduler(Executor {
      pool: SHARED_SINGLE.clone(),
      disposed: Disposed::default(),
      name: "single",
    })
  }
}

/// A scheduler backed by a fixed pool of worker threads.
#[derive(Clone)]
pub struct PoolScheduler(Executor);

impl PoolScheduler {
  pub fn with_workers(workers: usize) -> Result<Self, RxError> {
    let pool = build_pool(workers, "parallel")?;
    Ok(PoolScheduler(Executor { pool: Ok(pool), disposed: Disposed::default(), name: "parallel" }))
  }

  pub fn dispose(&self) { self.0.disposed.dispose(self.0.name) }
}

impl Default for PoolScheduler {
  /// The process-wide pool, sized to the available parallelism.
  fn default() -> Self {
    PoolScheduler(Executor {
      pool: SHARED_POOL.clone(),
      disposed: Disposed::default(),
      name: "parallel",
    })
  }
}

macro_rules! impl_executor_scheduler {
  ($ty: ty) => {
    impl Scheduler for $ty {
      #[inline]
      fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
        self.0.schedule(task, delay)
      }

      #[inline]
      fn schedule_repeating(
        &self, task: RepeatTask, period: Duration, delay: Option<Duration>,
      ) -> Result<TaskHandle, RxError> {
        self.0.schedule_repeating(task, period, delay)
      }
    }
  };
}

impl_executor_scheduler!(SingleScheduler);
impl_executor_scheduler!(PoolScheduler);
