use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{Duration, Instant, RepeatTask, Scheduler, TaskHandle},
};

/// Creates a sequence that emits `0, 1, 2, ...`, one value every `period`.
/// The first value arrives after one `period`. It never completes on its
/// own; bound it with `take` or `take_for`.
pub fn interval<SD>(period: Duration, scheduler: SD) -> IntervalObservable<SD> {
  IntervalObservable { scheduler, period, delay: period }
}

/// Like [`interval`], but the first value arrives at `at`, or right away if
/// `at` already passed.
pub fn interval_at<SD>(at: Instant, period: Duration, scheduler: SD) -> IntervalObservable<SD> {
  let delay = at.saturating_duration_since(Instant::now());
  IntervalObservable { scheduler, period, delay }
}

#[derive(Clone)]
pub struct IntervalObservable<SD> {
  scheduler: SD,
  period: Duration,
  delay: Duration,
}

impl<SD, O> Observable<usize, RxError, O> for IntervalObservable<SD>
where
  O: Observer<usize, RxError> + Send + 'static,
  SD: Scheduler,
{
  type Unsub = Option<TaskHandle>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { scheduler, period, delay } = self;
    let observer = MutArc::own(Some(observer));
    let mut c_observer = observer.clone();
    let task = RepeatTask::new(move |seq| interval_task(&mut c_observer, seq));
    match scheduler.schedule_repeating(task, period, Some(delay)) {
      Ok(handle) => Some(handle),
      Err(err) => {
        observer.error(err);
        None
      }
    }
  }
}

impl<SD> ObservableExt<usize, RxError> for IntervalObservable<SD> {}

fn interval_task<O>(observer: &mut O, seq: usize) -> bool
where
  O: Observer<usize, RxError>,
{
  if observer.is_finished() {
    return false;
  }
  observer.next(seq);
  !observer.is_finished()
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn ticks_on_virtual_time() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let handle = observable::interval(Duration::from_secs(1), scheduler.clone())
      .subscribe(move |v| c_seen.lock().push(v));

    scheduler.advance_by(Duration::from_millis(999));
    assert!(seen.lock().is_empty());
    scheduler.advance_by(Duration::from_millis(2001));
    assert_eq!(*seen.lock(), [0, 1, 2]);

    handle.unsubscribe();
    scheduler.advance_by(Duration::from_secs(5));
    assert_eq!(*seen.lock(), [0, 1, 2]);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn take_stops_the_timer() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::interval(Duration::from_millis(10), scheduler.clone())
      .take(5)
      .subscribe(move |v| c_seen.lock().push(v));
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*seen.lock(), [0, 1, 2, 3, 4]);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn interval_at_past_instant_starts_now() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::interval_at(Instant::now(), Duration::from_millis(5), scheduler.clone())
      .take(2)
      .subscribe(move |v| c_seen.lock().push(v));
    scheduler.flush();
    assert_eq!(*seen.lock(), [0]);
    scheduler.advance_by(Duration::from_millis(5));
    assert_eq!(*seen.lock(), [0, 1]);
  }

  #[test]
  fn disposed_scheduler_errors() {
    let scheduler = TestScheduler::default();
    scheduler.dispose();
    let err = Arc::new(Mutex::new(None));
    let c_err = err.clone();
    observable::interval(Duration::from_millis(5), scheduler)
      .subscribe_err(|_| {}, move |e| *c_err.lock() = Some(e));
    assert!(matches!(*err.lock(), Some(RxError::Scheduling(_))));
  }

  #[cfg(feature = "futures-scheduler")]
  #[test]
  fn ticks_on_a_thread_pool() {
    let (tx, rx) = std::sync::mpsc::channel();
    let c_tx = tx.clone();
    let stamp = Instant::now();
    observable::interval(Duration::from_millis(2), PoolScheduler::default())
      .take(5)
      .subscribe_all(
        move |v| {
          let _ = tx.send(Some(v));
        },
        |_| {},
        move || {
          let _ = c_tx.send(None);
        },
      );
    let mut seen = vec![];
    while let Some(v) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      seen.push(v);
    }
    assert_eq!(seen, [0, 1, 2, 3, 4]);
    assert!(stamp.elapsed() >= Duration::from_millis(10));
  }
}
