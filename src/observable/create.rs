use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::{Emitter, Observer},
  type_hint::TypeHint,
};

/// Creates a sequence from a closure that pushes signals into an
/// [`Emitter`].
///
/// The closure runs once per subscription. Calls after the first terminal
/// signal are ignored, and `is_finished` tells a long running producer
/// that nobody is listening anymore.
///
/// ```
/// use rxflux::prelude::*;
///
/// let mut seen = vec![];
/// observable::create(|emitter| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
///   emitter.next(3);
/// })
/// .subscribe(|v| seen.push(v));
/// assert_eq!(seen, [1, 2]);
/// ```
pub fn create<F, Item>(subscribe: F) -> CreateObservable<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item, RxError>),
{
  CreateObservable { subscribe, _hint: TypeHint::new() }
}

pub struct CreateObservable<F, Item> {
  subscribe: F,
  _hint: TypeHint<Item>,
}

impl<F: Clone, Item> Clone for CreateObservable<F, Item> {
  fn clone(&self) -> Self { CreateObservable { subscribe: self.subscribe.clone(), _hint: TypeHint::new() } }
}

impl<F, Item, O> Observable<Item, RxError, O> for CreateObservable<F, Item>
where
  F: FnOnce(&mut dyn Emitter<Item, RxError>),
  O: Observer<Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut emitter = Some(observer);
    (self.subscribe)(&mut emitter);
  }
}

impl<F, Item> ObservableExt<Item, RxError> for CreateObservable<F, Item> where
  F: FnOnce(&mut dyn Emitter<Item, RxError>)
{
}
