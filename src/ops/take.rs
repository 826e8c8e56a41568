use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{Duration, OnceTask, Scheduler, TaskHandle},
  subscription::{ProxySubscription, Subscription, ZipSubscription},
};

/// Emits only the first `count` values of the source, then completes and
/// cancels the source.
///
/// ```
/// use rxflux::prelude::*;
///
/// let mut seen = vec![];
/// observable::from_iter(0..10).take(5).subscribe(|v| seen.push(v));
/// assert_eq!(seen, [0, 1, 2, 3, 4]);
/// ```
#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for TakeOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, TakeObserver<O>>,
  S::Unsub: Send + 'static,
{
  type Unsub = ProxySubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let upstream = ProxySubscription::default();
    if self.count == 0 {
      upstream.clone().unsubscribe();
      observer.complete();
      return upstream;
    }
    let unsub = self.source.actual_subscribe(TakeObserver {
      observer: Some(observer),
      remaining: self.count,
      upstream: upstream.clone(),
    });
    upstream.bind(unsub);
    upstream
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for TakeOp<S> where S: ObservableExt<Item, Err> {}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
  upstream: ProxySubscription,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    observer.next(value);
    self.remaining -= 1;
    if self.remaining == 0 {
      self.upstream.clone().unsubscribe();
      if let Some(observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool { self.observer.as_ref().map_or(true, |o| o.is_finished()) }
}

#[derive(Clone)]
pub struct TakeForOp<S, SD> {
  pub(crate) source: S,
  pub(crate) duration: Duration,
  pub(crate) scheduler: SD,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for TakeForOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, TakeForObserver<O>>,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError>,
{
  type Unsub = ZipSubscription<ProxySubscription, Option<TaskHandle>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MutArc::own(Some(observer));
    let upstream = ProxySubscription::default();
    let c_observer = observer.clone();
    let c_upstream = upstream.clone();
    let timer = self.scheduler.schedule(
      OnceTask::new(move || {
        c_upstream.unsubscribe();
        c_observer.complete();
      }),
      Some(self.duration),
    );
    match timer {
      Ok(timer) => {
        let unsub = self.source.actual_subscribe(TakeForObserver { observer, timer: timer.clone() });
        upstream.bind(unsub);
        ZipSubscription::new(upstream, Some(timer))
      }
      Err(err) => {
        observer.error(err.into());
        upstream.clone().unsubscribe();
        ZipSubscription::new(upstream, None)
      }
    }
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for TakeForOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct TakeForObserver<O> {
  observer: MutArc<Option<O>>,
  timer: TaskHandle,
}

impl<Item, Err, O> Observer<Item, Err> for TakeForObserver<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    self.timer.unsubscribe();
    self.observer.error(err);
  }

  fn complete(self) {
    self.timer.unsubscribe();
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let mut completed = false;
    let mut next_count = 0;
    observable::from_iter(0..100).take(5).subscribe_all(
      |_| next_count += 1,
      |_| {},
      || completed = true,
    );
    assert_eq!(next_count, 5);
    assert!(completed);
  }

  #[test]
  fn take_zero_never_subscribes() {
    let subscribed = AtomicUsize::new(0);
    let mut completed = false;
    observable::create(|emitter| {
      subscribed.fetch_add(1, Ordering::SeqCst);
      emitter.next(1);
    })
    .take(0)
    .subscribe_all(|_: i32| panic!("no values expected"), |_| {}, || completed = true);
    assert!(completed);
    assert_eq!(subscribed.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn take_cancels_async_upstream() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let handle = observable::interval(Duration::from_millis(10), scheduler.clone())
      .take(2)
      .subscribe(move |v| c_seen.lock().push(v));
    scheduler.advance_by(Duration::from_millis(100));
    assert_eq!(*seen.lock(), [0, 1]);
    assert!(handle.is_closed());
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn take_for_completes_at_the_deadline() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(None));
    let (c_seen, c_completed, clock) = (seen.clone(), completed.clone(), scheduler.clone());
    observable::interval(Duration::from_secs(1), scheduler.clone())
      .take_for(Duration::from_millis(3500), scheduler.clone())
      .subscribe_all(move |v| c_seen.lock().push(v), |_| {}, move || *c_completed.lock() = Some(clock.now()));
    scheduler.advance_by(Duration::from_secs(10));
    assert_eq!(*seen.lock(), [0, 1, 2]);
    assert_eq!(*completed.lock(), Some(Duration::from_millis(3500)));
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn take_for_finishing_source_cancels_timer() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::from_iter(0..3)
      .take_for(Duration::from_secs(1), scheduler.clone())
      .subscribe(move |v| c_seen.lock().push(v));
    assert_eq!(*seen.lock(), [0, 1, 2]);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn take_for_on_immediate_scheduler_closes_before_upstream() {
    let values = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (c_values, c_completed) = (values.clone(), completed.clone());
    observable::from_iter(0..3).take_for(Duration::from_millis(5), ImmediateScheduler).subscribe_all(
      move |v| c_values.lock().push(v),
      |_| {},
      move || *c_completed.lock() = true,
    );
    assert!(values.lock().is_empty());
    assert!(*completed.lock());
  }
}
