//! Virtual time scheduler for deterministic testing of time-based operators.
//!
//! Time only moves when the test says so. Advancing runs every task whose
//! deadline falls inside the advanced window, in deadline order; tasks with
//! the same deadline run in submission order.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use rxflux::prelude::*;
//!
//! let scheduler = TestScheduler::default();
//! let received = Arc::new(Mutex::new(vec![]));
//! let c_received = received.clone();
//!
//! observable::of(42)
//!   .delay_elements(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(move |v| c_received.lock().unwrap().push(v));
//!
//! assert!(received.lock().unwrap().is_empty());
//! scheduler.advance_by(Duration::from_millis(100));
//! assert_eq!(*received.lock().unwrap(), vec![42]);
//! ```

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc};

use parking_lot::Mutex;

use super::{Duration, OnceTask, RepeatTask, Scheduler, TaskHandle};
use crate::error::RxError;

enum Job {
  Once(OnceTask),
  Repeat { task: RepeatTask, period: Duration },
}

struct ScheduledTask {
  at: Duration,
  id: usize,
  job: Job,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.at == other.at && self.id == other.id }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by id
    other.at.cmp(&self.at).then_with(|| other.id.cmp(&self.id))
  }
}

#[derive(Default)]
struct State {
  now: Duration,
  queue: BinaryHeap<ScheduledTask>,
  next_id: usize,
  disposed: bool,
}

impl State {
  fn push(&mut self, at: Duration, job: Job, handle: TaskHandle) {
    let id = self.next_id;
    self.next_id += 1;
    self.queue.push(ScheduledTask { at, id, job, handle });
  }

  /// Pops the earliest live task due at or before `limit`, moving the clock
  /// to its deadline.
  fn pop_due(&mut self, limit: Option<Duration>) -> Option<ScheduledTask> {
    loop {
      let head = self.queue.peek()?;
      if head.handle.is_cancelled() {
        self.queue.pop();
        continue;
      }
      if limit.is_some_and(|limit| head.at > limit) {
        return None;
      }
      let task = self.queue.pop()?;
      self.now = self.now.max(task.at);
      return Some(task);
    }
  }
}

/// A virtual clock. Clones share the same clock and task queue.
#[derive(Clone, Default)]
pub struct TestScheduler(Arc<Mutex<State>>);

impl TestScheduler {
  /// Virtual time elapsed since the scheduler was created.
  pub fn now(&self) -> Duration { self.0.lock().now }

  /// Number of tasks waiting to run.
  pub fn pending(&self) -> usize {
    self.0.lock().queue.iter().filter(|t| !t.handle.is_cancelled()).count()
  }

  /// Advances the clock by `duration`, running every task that becomes due.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.now() + duration;
    self.advance_to(target);
  }

  /// Advances the clock to `target`, running every task that becomes due.
  /// Moving backwards is a no-op.
  pub fn advance_to(&self, target: Duration) {
    while let Some(task) = self.pop(Some(target)) {
      self.run(task);
    }
    let mut state = self.0.lock();
    state.now = state.now.max(target);
  }

  /// Jumps to the deadline of the next pending task and runs it. Returns
  /// `false` if nothing is pending.
  pub fn advance_to_next(&self) -> bool {
    match self.pop(None) {
      Some(task) => {
        self.run(task);
        true
      }
      None => false,
    }
  }

  /// Runs every task due at the current instant without moving the clock.
  pub fn flush(&self) { self.advance_by(Duration::ZERO) }

  /// Rejects all further work.
  pub fn dispose(&self) { self.0.lock().disposed = true; }

  fn pop(&self, limit: Option<Duration>) -> Option<ScheduledTask> { self.0.lock().pop_due(limit) }

  fn run(&self, task: ScheduledTask) {
    let ScheduledTask { at, job, handle, .. } = task;
    match job {
      Job::Once(task) => {
        task.run();
        handle.finish();
      }
      Job::Repeat { mut task, period } => {
        if task.tick() && !handle.is_cancelled() {
          self.0.lock().push(at + period, Job::Repeat { task, period }, handle);
        } else {
          handle.finish();
        }
      }
    }
  }

  fn submit(&self, job: Job, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
    let mut state = self.0.lock();
    if state.disposed {
      return Err(RxError::scheduler_disposed("test scheduler"));
    }
    let handle = TaskHandle::default();
    let at = state.now + delay.unwrap_or_default();
    state.push(at, job, handle.clone());
    Ok(handle)
  }
}

impl Scheduler for TestScheduler {
  fn schedule(&self, task: OnceTask, delay: Option<Duration>) -> Result<TaskHandle, RxError> {
    self.submit(Job::Once(task), delay)
  }

  fn schedule_repeating(
    &self, task: RepeatTask, period: Duration, delay: Option<Duration>,
  ) -> Result<TaskHandle, RxError> {
    self.submit(Job::Repeat { task, period }, delay)
  }
}
