use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDerefMut},
  scheduler::{Duration, OnceTask, Scheduler, TaskHandle},
  subscription::{ProxySubscription, ZipSubscription},
};

/// Subscribes to the source on a scheduler. A synchronous source then emits
/// on that scheduler's thread instead of the caller's.
#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for SubscribeOnOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, O> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError>,
{
  type Unsub = DeferredSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    subscribe_later(self.source, observer, &self.scheduler, None)
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for SubscribeOnOp<S, SD>
where
  S: ObservableExt<Item, Err>,
  SD: Scheduler,
{
}

/// Cancels a subscription that is performed by a scheduled task: the task
/// itself if it has not run yet, the upstream subscription otherwise.
pub type DeferredSubscription = ZipSubscription<Option<TaskHandle>, ProxySubscription>;

/// Schedules `source.actual_subscribe(observer)` on `scheduler`. If the
/// scheduler rejects the task the observer receives the scheduling error.
pub(crate) fn subscribe_later<Item, Err, O, S, SD>(
  source: S, observer: O, scheduler: &SD, delay: Option<Duration>,
) -> DeferredSubscription
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, O> + Send + 'static,
  S::Unsub: Send + 'static,
  SD: Scheduler,
  Err: From<RxError>,
{
  let upstream = ProxySubscription::default();
  let observer = MutArc::own(Some(observer));
  let c_upstream = upstream.clone();
  let c_observer = observer.clone();
  let task = OnceTask::new(move || {
    let observer = c_observer.rc_deref_mut().take();
    if let Some(observer) = observer {
      c_upstream.bind(source.actual_subscribe(observer));
    }
  });
  match scheduler.schedule(task, delay) {
    Ok(handle) => ZipSubscription::new(Some(handle), upstream),
    Err(err) => {
      let observer = observer.rc_deref_mut().take();
      if let Some(observer) = observer {
        observer.error(err.into());
      }
      ZipSubscription::new(None, upstream)
    }
  }
}
