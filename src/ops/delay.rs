use std::collections::VecDeque;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  ops::subscribe_on::{subscribe_later, DeferredSubscription},
  rc::{MutArc, RcDerefMut},
  scheduler::{Duration, OnceTask, Scheduler},
  subscription::{MultiSubscription, Subscription, ZipSubscription},
};

/// Shifts values in time: each value is emitted `delay` after the previous
/// value was emitted (the first one `delay` after it arrived). Values wait in
/// a queue, so their order is preserved and a fast source is spread out to
/// one value per `delay`. Completion is emitted right after the last value;
/// an error is passed on at once and drops queued values.
#[derive(Clone)]
pub struct DelayElementsOp<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DelayElementsOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, DelayObserver<O, SD, Item>>,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  type Unsub = ZipSubscription<S::Unsub, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { source, delay, scheduler } = self;
    let timers = MultiSubscription::default();
    let ctx = DelayCtx {
      observer: MutArc::own(Some(observer)),
      queue: MutArc::own(DelayQueue { values: VecDeque::new(), running: false, completed: false }),
      scheduler,
      delay,
      timers: timers.clone(),
    };
    let unsub = source.actual_subscribe(DelayObserver(ctx));
    ZipSubscription::new(unsub, timers)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DelayElementsOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

struct DelayQueue<Item> {
  values: VecDeque<Item>,
  // a timer for the queue head is pending
  running: bool,
  completed: bool,
}

struct DelayCtx<O, SD, Item> {
  observer: MutArc<Option<O>>,
  queue: MutArc<DelayQueue<Item>>,
  scheduler: SD,
  delay: Duration,
  timers: MultiSubscription,
}

impl<O, SD: Clone, Item> Clone for DelayCtx<O, SD, Item> {
  fn clone(&self) -> Self {
    DelayCtx {
      observer: self.observer.clone(),
      queue: self.queue.clone(),
      scheduler: self.scheduler.clone(),
      delay: self.delay,
      timers: self.timers.clone(),
    }
  }
}

impl<O, SD, Item> DelayCtx<O, SD, Item>
where
  SD: Scheduler,
  O: Send + 'static,
  Item: Send + 'static,
{
  /// Arms a timer that emits the queue head.
  fn schedule_head<Err>(&self)
  where
    O: Observer<Item, Err>,
    Err: From<RxError>,
  {
    let ctx = self.clone();
    match self.scheduler.schedule(OnceTask::new(move || ctx.emit_head::<Err>()), Some(self.delay)) {
      Ok(handle) => self.timers.append(handle),
      Err(err) => {
        self.queue.rc_deref_mut().values.clear();
        self.observer.clone().error(err.into());
      }
    }
  }

  fn emit_head<Err>(&self)
  where
    O: Observer<Item, Err>,
    Err: From<RxError>,
  {
    let head = self.queue.rc_deref_mut().values.pop_front();
    if let Some(value) = head {
      self.observer.clone().next(value);
    }
    let mut queue = self.queue.rc_deref_mut();
    if !queue.values.is_empty() {
      drop(queue);
      self.schedule_head::<Err>();
    } else {
      queue.running = false;
      let completed = queue.completed;
      drop(queue);
      if completed {
        self.observer.clone().complete();
      }
    }
  }
}

pub struct DelayObserver<O, SD, Item>(DelayCtx<O, SD, Item>);

impl<Item, Err, O, SD> Observer<Item, Err> for DelayObserver<O, SD, Item>
where
  O: Observer<Item, Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: From<RxError>,
{
  fn next(&mut self, value: Item) {
    let start = {
      let mut queue = self.0.queue.rc_deref_mut();
      queue.values.push_back(value);
      !std::mem::replace(&mut queue.running, true)
    };
    if start {
      self.0.schedule_head::<Err>();
    }
  }

  fn error(self, err: Err) {
    self.0.queue.rc_deref_mut().values.clear();
    self.0.timers.clone().unsubscribe();
    self.0.observer.error(err);
  }

  fn complete(self) {
    let idle = {
      let mut queue = self.0.queue.rc_deref_mut();
      queue.completed = true;
      !queue.running
    };
    if idle {
      self.0.observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { self.0.observer.is_finished() }
}

/// Subscribes to the source only once `delay` elapsed.
#[derive(Clone)]
pub struct DelaySubscriptionOp<S, SD> {
  pub(crate) source: S,
  pub(crate) delay: Duration,
  pub(crate) scheduler: SD,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for DelaySubscriptionOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, O> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError>,
{
  type Unsub = DeferredSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_later(self.source, observer, &self.scheduler, Some(self.delay))
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for DelaySubscriptionOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  fn timeline<T: Send + 'static>(
    scheduler: &TestScheduler,
  ) -> (Arc<Mutex<Vec<(T, Duration)>>>, impl FnMut(T) + Send + 'static) {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    let clock = scheduler.clone();
    (log, move |v| c_log.lock().push((v, clock.now())))
  }

  #[test]
  fn elements_are_spaced_by_the_delay() {
    let scheduler = TestScheduler::default();
    let (log, record) = timeline(&scheduler);
    let completed = Arc::new(Mutex::new(None));
    let (c_completed, clock) = (completed.clone(), scheduler.clone());
    observable::from_iter(["a", "b", "c"])
      .delay_elements(Duration::from_millis(100), scheduler.clone())
      .subscribe_all(record, |_| {}, move || *c_completed.lock() = Some(clock.now()));

    scheduler.advance_by(Duration::from_millis(150));
    assert_eq!(*log.lock(), [("a", Duration::from_millis(100))]);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(
      *log.lock(),
      [
        ("a", Duration::from_millis(100)),
        ("b", Duration::from_millis(200)),
        ("c", Duration::from_millis(300)),
      ]
    );
    assert_eq!(*completed.lock(), Some(Duration::from_millis(300)));
  }

  #[test]
  fn slow_source_is_delayed_from_arrival() {
    let scheduler = TestScheduler::default();
    let (log, record) = timeline(&scheduler);
    observable::interval(Duration::from_secs(1), scheduler.clone())
      .take(2)
      .delay_elements(Duration::from_millis(200), scheduler.clone())
      .subscribe(record);
    scheduler.advance_by(Duration::from_secs(5));
    assert_eq!(
      *log.lock(),
      [(0, Duration::from_millis(1200)), (1, Duration::from_millis(2200))]
    );
  }

  #[test]
  fn empty_source_completes_at_once() {
    let scheduler = TestScheduler::default();
    let completed = Arc::new(Mutex::new(false));
    let c_completed = completed.clone();
    observable::empty::<i32>()
      .delay_elements(Duration::from_secs(1), scheduler.clone())
      .subscribe_all(|_| {}, |_| {}, move || *c_completed.lock() = true);
    assert!(*completed.lock());
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn unsubscribe_drops_pending_values() {
    let scheduler = TestScheduler::default();
    let (log, record) = timeline::<i32>(&scheduler);
    let handle = observable::from_iter(1..4)
      .delay_elements(Duration::from_millis(10), scheduler.clone())
      .subscribe(record);
    scheduler.advance_by(Duration::from_millis(10));
    handle.unsubscribe();
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(log.lock().len(), 1);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn error_is_not_delayed() {
    let scheduler = TestScheduler::default();
    let err = Arc::new(Mutex::new(None));
    let c_err = err.clone();
    observable::create(|emitter| {
      emitter.next(1);
      emitter.error(RxError::source("x"));
    })
    .delay_elements(Duration::from_secs(1), scheduler.clone())
    .subscribe_err(|_: i32| panic!("queued value must be dropped"), move |e| *c_err.lock() = Some(e));
    assert_eq!(*err.lock(), Some(RxError::source("x")));
    scheduler.advance_by(Duration::from_secs(2));
  }

  #[test]
  fn subscription_waits_for_the_delay() {
    let scheduler = TestScheduler::default();
    let (log, record) = timeline(&scheduler);
    observable::from_iter([1, 2])
      .delay_subscription(Duration::from_millis(500), scheduler.clone())
      .subscribe(record);
    scheduler.advance_by(Duration::from_millis(499));
    assert!(log.lock().is_empty());
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(
      *log.lock(),
      [(1, Duration::from_millis(500)), (2, Duration::from_millis(500))]
    );
  }
}
