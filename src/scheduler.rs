//! Schedulers decide where and when deferred work runs.
//!
//! A scheduler accepts two kinds of work: a [`OnceTask`] that runs once after
//! an optional delay, and a [`RepeatTask`] that ticks periodically until it
//! asks to stop or its [`TaskHandle`] is unsubscribed.
//!
//! | Scheduler | Runs on |
//! |-----------|---------|
//! | [`ImmediateScheduler`] | the calling thread, delays block |
//! | [`SingleScheduler`] | one dedicated worker thread |
//! | [`PoolScheduler`] | a fixed pool of worker threads |
//! | [`TokioScheduler`] | a tokio runtime (feature `tokio-scheduler`) |
//! | [`TestScheduler`] | a virtual clock advanced by the test |
use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;
pub use std::time::{Duration, Instant};

use crate::{error::RxError, subscription::Subscription};

mod immediate;
pub use immediate::ImmediateScheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool::{PoolScheduler, SingleScheduler};
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;
pub mod test_scheduler;
pub use test_scheduler::TestScheduler;

pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Runs `task` once, after `delay` if given.
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError>;

  /// Ticks `task` every `period`. The first tick happens after `delay`, or
  /// right away when `delay` is `None`.
  fn schedule_repeating(
    &self, task: RepeatTask, period: Duration, delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError>;
}

/// Work that runs at most once.
pub struct OnceTask(Box<dyn FnOnce() + Send>);

impl OnceTask {
  pub fn new(task: impl FnOnce() + Send + 'static) -> Self { OnceTask(Box::new(task)) }

  #[inline]
  pub fn run(self) { (self.0)() }
}

/// Periodic work. Each tick receives a zero-based sequence number and returns
/// whether it wants another tick.
pub struct RepeatTask {
  task: Box<dyn FnMut(usize) -> bool + Send>,
  seq: usize,
}

impl RepeatTask {
  pub fn new(task: impl FnMut(usize) -> bool + Send + 'static) -> Self {
    RepeatTask { task: Box::new(task), seq: 0 }
  }

  pub fn tick(&mut self) -> bool {
    let seq = self.seq;
    self.seq += 1;
    (self.task)(seq)
  }
}

#[derive(Default)]
struct HandleState {
  cancelled: AtomicBool,
  finished: AtomicBool,
  on_cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// Cancellation handle of one scheduled task.
///
/// Unsubscribing marks the task cancelled, so it will not start, and aborts
/// whatever timer the executor holds for it.
#[derive(Clone, Default)]
pub struct TaskHandle(Arc<HandleState>);

impl TaskHandle {
  /// A handle for work that already ran.
  pub fn finished() -> Self {
    let handle = TaskHandle::default();
    handle.finish();
    handle
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool { self.0.cancelled.load(Ordering::Acquire) }

  #[inline]
  pub fn is_finished(&self) -> bool { self.0.finished.load(Ordering::Acquire) }

  pub(crate) fn finish(&self) {
    self.0.finished.store(true, Ordering::Release);
    self.0.on_cancel.lock().take();
  }

  /// Registers executor cleanup to run on cancellation. Runs it right away
  /// if the handle is already cancelled.
  pub(crate) fn on_cancel(&self, f: impl FnOnce() + Send + 'static) {
    if self.is_cancelled() {
      f();
    } else {
      *self.0.on_cancel.lock() = Some(Box::new(f));
      if self.is_cancelled() {
        let f = self.0.on_cancel.lock().take();
        if let Some(f) = f {
          f();
        }
      }
    }
  }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) {
    if !self.0.cancelled.swap(true, Ordering::AcqRel) {
      let f = self.0.on_cancel.lock().take();
      if let Some(f) = f {
        f();
      }
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_cancelled() || self.is_finished() }
}

/// Shared disposal flag of a scheduler and its clones.
#[derive(Clone, Default)]
pub(crate) struct Disposed(Arc<AtomicBool>);

impl Disposed {
  pub(crate) fn dispose(&self, name: &str) {
    if !self.0.swap(true, Ordering::AcqRel) {
      tracing::debug!(scheduler = name, "scheduler disposed");
    }
  }

  pub(crate) fn check(&self, name: &str) -> Result<(), RxError> {
    if self.0.load(Ordering::Acquire) {
      tracing::debug!(scheduler = name, "rejected work submitted to a disposed scheduler");
      Err(RxError::scheduler_disposed(name))
    } else {
      Ok(())
    }
  }
}
