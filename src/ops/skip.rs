use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Duration, OnceTask, Scheduler, TaskHandle},
  subscription::{Subscription, ZipSubscription},
};

#[derive(Clone)]
pub struct SkipOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for SkipOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(SkipObserver { observer, remaining: self.count })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for SkipOp<S> where S: ObservableExt<Item, Err> {}

pub struct SkipObserver<O> {
  observer: O,
  remaining: usize,
}

impl<Item, Err, O> Observer<Item, Err> for SkipObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.observer.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  forward_terminal!(observer);
}

#[derive(Clone)]
pub struct SkipForOp<S, SD> {
  pub(crate) source: S,
  pub(crate) duration: Duration,
  pub(crate) scheduler: SD,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for SkipForOp<S, SD>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, SkipForObserver<O>>,
  SD: Scheduler,
  Err: From<RxError>,
{
  type Unsub = ZipSubscription<Option<S::Unsub>, Option<TaskHandle>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let open = Arc::new(AtomicBool::new(false));
    let c_open = open.clone();
    // The window timer is queued before upstream is subscribed, so a value
    // due at the same instant as the timer is let through.
    let timer = self
      .scheduler
      .schedule(OnceTask::new(move || c_open.store(true, Ordering::Release)), Some(self.duration));
    match timer {
      Ok(timer) => {
        let unsub = self.source.actual_subscribe(SkipForObserver { observer, open, timer: timer.clone() });
        ZipSubscription::new(Some(unsub), Some(timer))
      }
      Err(err) => {
        observer.error(err.into());
        ZipSubscription::new(None, None)
      }
    }
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for SkipForOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

pub struct SkipForObserver<O> {
  observer: O,
  open: Arc<AtomicBool>,
  timer: TaskHandle,
}

impl<Item, Err, O> Observer<Item, Err> for SkipForObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.open.load(Ordering::Acquire) {
      self.observer.next(value);
    }
  }

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
