use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{ProxySubscription, Subscription},
  type_hint::TypeHint,
};

pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { MapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for MapOp<S, F, Item> {
  fn clone(&self) -> Self { MapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for MapOp<S, F, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, MapObserver<O, F>>,
  F: FnMut(Item) -> B,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MapObserver { observer, func: self.func })
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for MapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> B,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  forward_terminal!(observer);
}

pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { TryMapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for TryMapOp<S, F, Item> {
  fn clone(&self) -> Self { TryMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Err, O, S, F> Observable<B, Err, O> for TryMapOp<S, F, Item>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, TryMapObserver<O, F>>,
  S::Unsub: Send + 'static,
  F: FnMut(Item) -> Result<B, Err>,
{
  type Unsub = ProxySubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let upstream = ProxySubscription::default();
    let unsub = self.source.actual_subscribe(TryMapObserver {
      observer: Some(observer),
      func: self.func,
      upstream: upstream.clone(),
    });
    upstream.bind(unsub);
    upstream
  }
}

impl<Item, B, Err, S, F> ObservableExt<B, Err> for TryMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
}

pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
  upstream: ProxySubscription,
}

impl<Item, B, Err, O, F> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(value) {
      Ok(v) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(v);
        }
      }
      Err(err) => {
        self.upstream.clone().unsubscribe();
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
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
