use std::fmt::{Debug, Display};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Subscription,
};

/// Traces every signal passing through, plus cancellation, at info level.
/// Values are recorded with their `Debug` form and errors with `Display`.
#[derive(Clone)]
pub struct LogOp<S> {
  pub(crate) source: S,
  pub(crate) category: &'static str,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for LogOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, LogObserver<O>>,
  Item: Debug,
  Err: Display,
{
  type Unsub = LogSubscription<S::Unsub>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let category = self.category;
    tracing::info!(category, "onSubscribe");
    let inner = self.source.actual_subscribe(LogObserver { observer, category });
    LogSubscription { inner, category }
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for LogOp<S>
where
  S: ObservableExt<Item, Err>,
  Item: Debug,
  Err: Display,
{
}

pub struct LogObserver<O> {
  observer: O,
  category: &'static str,
}

impl<Item, Err, O> Observer<Item, Err> for LogObserver<O>
where
  O: Observer<Item, Err>,
  Item: Debug,
  Err: Display,
{
  fn next(&mut self, value: Item) {
    tracing::info!(category = self.category, "onNext({value:?})");
    self.observer.next(value)
  }

  fn error(self, err: Err) {
    tracing::info!(category = self.category, error = %err, "onError");
    self.observer.error(err)
  }

  fn complete(self) {
    tracing::info!(category = self.category, "onComplete");
    self.observer.complete()
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

pub struct LogSubscription<U> {
  inner: U,
  category: &'static str,
}

impl<U: Subscription> Subscription for LogSubscription<U> {
  fn unsubscribe(self) {
    if !self.inner.is_closed() {
      tracing::info!(category = self.category, "cancel");
    }
    self.inner.unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.inner.is_closed() }
}
