use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Creates a sequence that completes right away without values.
pub fn empty<Item>() -> EmptyObservable<Item> { EmptyObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct EmptyObservable<Item>(TypeHint<Item>);

impl<Item, O> Observable<Item, RxError, O> for EmptyObservable<Item>
where
  O: Observer<Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.complete() }
}

impl<Item> ObservableExt<Item, RxError> for EmptyObservable<Item> {}

/// Creates a sequence that terminates right away with `err`.
pub fn throw_err<Item>(err: RxError) -> ThrowObservable<Item> {
  ThrowObservable { err, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ThrowObservable<Item> {
  err: RxError,
  _hint: TypeHint<Item>,
}

impl<Item, O> Observable<Item, RxError, O> for ThrowObservable<Item>
where
  O: Observer<Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { observer.error(self.err) }
}

impl<Item> ObservableExt<Item, RxError> for ThrowObservable<Item> {}

/// Creates a sequence that never signals anything.
pub fn never<Item>() -> NeverObservable<Item> { NeverObservable(TypeHint::new()) }

#[derive(Clone)]
pub struct NeverObservable<Item>(TypeHint<Item>);

impl<Item, O> Observable<Item, RxError, O> for NeverObservable<Item>
where
  O: Observer<Item, RxError>,
{
  type Unsub = ();

  #[inline]
  fn actual_subscribe(self, _: O) -> Self::Unsub {}
}

impl<Item> ObservableExt<Item, RxError> for NeverObservable<Item> {}
