//! Type-erased sequences.
//!
//! [`BoxOp`] hides the concrete operator chain behind a trait object, so
//! sequences built differently can share one type, e.g. to be stored in a
//! `Vec` and raced with `first_with_signal`.

use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxObserver, Observer},
  subscription::BoxSubscription,
};

/// Object-safe subscribe side of an observable.
trait DynObservable<Item, Err>: Send {
  fn dyn_subscribe(self: Box<Self>, observer: BoxObserver<Item, Err>) -> BoxSubscription;

  fn clone_box(&self) -> Box<dyn DynObservable<Item, Err>>;
}

impl<T, Item, Err> DynObservable<Item, Err> for T
where
  T: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + Send + 'static,
  T::Unsub: Send + 'static,
{
  fn dyn_subscribe(self: Box<Self>, observer: BoxObserver<Item, Err>) -> BoxSubscription {
    BoxSubscription::new((*self).actual_subscribe(observer))
  }

  fn clone_box(&self) -> Box<dyn DynObservable<Item, Err>> { Box::new(self.clone()) }
}

/// A cloneable, sendable sequence of unknown concrete type.
pub struct BoxOp<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item: 'static, Err: 'static> BoxOp<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + Send + 'static,
    S::Unsub: Send + 'static,
  {
    BoxOp(Box::new(source))
  }
}

impl<Item, Err> Clone for BoxOp<Item, Err> {
  fn clone(&self) -> Self { BoxOp(self.0.clone_box()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for BoxOp<Item, Err>
where
  O: Observer<Item, Err> + Send + 'static,
{
  type Unsub = BoxSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.dyn_subscribe(Box::new(observer)) }
}

impl<Item, Err> ObservableExt<Item, Err> for BoxOp<Item, Err> {}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn heterogeneous_sources_share_a_type() {
    let sources: Vec<BoxOp<i64, RxError>> = vec![
      observable::of(1).box_it(),
      observable::range(2, 2).box_it(),
      observable::from_iter(vec![10, 20]).map(|v| v / 10 + 3).box_it(),
    ];
    let seen = Arc::new(Mutex::new(vec![]));
    for source in sources {
      let c_seen = seen.clone();
      source.subscribe(move |v| c_seen.lock().push(v));
    }
    assert_eq!(*seen.lock(), [1, 2, 3, 4, 5]);
  }

  #[test]
  fn boxed_clone_subscribes_again() {
    let boxed = observable::from_iter(["a", "b"]).box_it();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    boxed.clone().subscribe(move |v| c_seen.lock().push(v));
    let c_seen = seen.clone();
    boxed.subscribe(move |v| c_seen.lock().push(v));
    assert_eq!(*seen.lock(), ["a", "b", "a", "b"]);
  }
}
