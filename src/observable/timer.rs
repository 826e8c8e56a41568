use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::MutArc,
  scheduler::{Duration, OnceTask, Scheduler, TaskHandle},
};

/// Emits `item` once after `delay`, then completes.
pub fn timer<Item, SD>(item: Item, delay: Duration, scheduler: SD) -> TimerObservable<Item, SD> {
  TimerObservable { item, delay, scheduler }
}

#[derive(Clone)]
pub struct TimerObservable<Item, SD> {
  item: Item,
  delay: Duration,
  scheduler: SD,
}

impl<Item, SD, O> Observable<Item, RxError, O> for TimerObservable<Item, SD>
where
  Item: Send + 'static,
  O: Observer<Item, RxError> + Send + 'static,
  SD: Scheduler,
{
  type Unsub = Option<TaskHandle>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let Self { item, delay, scheduler } = self;
    let observer = MutArc::own(Some(observer));
    let mut c_observer = observer.clone();
    let task = OnceTask::new(move || {
      c_observer.next(item);
      c_observer.complete();
    });
    match scheduler.schedule(task, Some(delay)) {
      Ok(handle) => Some(handle),
      Err(err) => {
        observer.error(err);
        None
      }
    }
  }
}

impl<Item, SD> ObservableExt<Item, RxError> for TimerObservable<Item, SD> {}
