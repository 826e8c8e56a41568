use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{MultiSubscription, ProxySubscription, Subscription, ZipSubscription},
  type_hint::TypeHint,
};

/// Maps every outer value to an inner sequence and subscribes to it right
/// away, relaying inner values as they arrive.
///
/// Inner sequences run concurrently, so their values interleave by arrival
/// and the output order need not follow the outer order. The output
/// completes once the outer sequence and every inner sequence completed. An
/// error anywhere is passed on and cancels everything else.
pub struct FlatMapOp<S, F, Item, B> {
  source: S,
  func: F,
  _hint: TypeHint<(Item, B)>,
}

impl<S, F, Item, B> FlatMapOp<S, F, Item, B> {
  #[inline]
  pub(crate) fn new(source: S, func: F) -> Self { FlatMapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item, B> Clone for FlatMapOp<S, F, Item, B> {
  fn clone(&self) -> Self { FlatMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, B, Err, O, S, F, Inner> Observable<B, Err, O> for FlatMapOp<S, F, Item, B>
where
  O: Observer<B, Err>,
  S: Observable<Item, Err, FlatMapOuterObserver<O, F, B>>,
  S::Unsub: Send + 'static,
  F: FnMut(Item) -> Inner,
  Inner: Observable<B, Err, FlatMapInnerObserver<O>>,
  Inner::Unsub: Send + 'static,
{
  type Unsub = ZipSubscription<ProxySubscription, MultiSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let outer = ProxySubscription::default();
    let inners = MultiSubscription::default();
    let outer_observer = FlatMapOuterObserver {
      state: MutArc::own(FlatMapState { observer: Some(observer), active: 0, outer_done: false }),
      func: self.func,
      outer: outer.clone(),
      inners: inners.clone(),
      _hint: TypeHint::new(),
    };
    outer.bind(self.source.actual_subscribe(outer_observer));
    ZipSubscription::new(outer, inners)
  }
}

impl<Item, B, Err, S, F, Inner> ObservableExt<B, Err> for FlatMapOp<S, F, Item, B>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Inner,
  Inner: ObservableExt<B, Err>,
{
}

pub struct FlatMapState<O> {
  observer: Option<O>,
  // inner sequences subscribed and not yet completed
  active: usize,
  outer_done: bool,
}

impl<O> FlatMapState<O> {
  fn take_if_done(&mut self) -> Option<O> {
    if self.outer_done && self.active == 0 { self.observer.take() } else { None }
  }
}

fn is_finished<Item, Err, O: Observer<Item, Err>>(state: &MutArc<FlatMapState<O>>) -> bool {
  state.rc_deref().observer.as_ref().map_or(true, |o| o.is_finished())
}

fn fail<Item, Err, O: Observer<Item, Err>>(
  state: &MutArc<FlatMapState<O>>, outer: &ProxySubscription, inners: &MultiSubscription, err: Err,
) {
  let observer = state.rc_deref_mut().observer.take();
  if let Some(observer) = observer {
    outer.clone().unsubscribe();
    inners.clone().unsubscribe();
    observer.error(err);
  }
}

pub struct FlatMapOuterObserver<O, F, B> {
  state: MutArc<FlatMapState<O>>,
  func: F,
  outer: ProxySubscription,
  inners: MultiSubscription,
  _hint: TypeHint<B>,
}

impl<Item, B, Err, O, F, Inner> Observer<Item, Err> for FlatMapOuterObserver<O, F, B>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Inner,
  Inner: Observable<B, Err, FlatMapInnerObserver<O>>,
  Inner::Unsub: Send + 'static,
{
  fn next(&mut self, value: Item) {
    if is_finished::<B, Err, O>(&self.state) {
      return;
    }
    self.state.rc_deref_mut().active += 1;
    let inner = (self.func)(value);
    let inner_observer = FlatMapInnerObserver {
      state: self.state.clone(),
      outer: self.outer.clone(),
      inners: self.inners.clone(),
    };
    self.inners.append(inner.actual_subscribe(inner_observer));
  }

  fn error(self, err: Err) { fail::<B, Err, O>(&self.state, &self.outer, &self.inners, err) }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.outer_done = true;
      state.take_if_done()
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { is_finished::<B, Err, O>(&self.state) }
}

pub struct FlatMapInnerObserver<O> {
  state: MutArc<FlatMapState<O>>,
  outer: ProxySubscription,
  inners: MultiSubscription,
}

impl<B, Err, O> Observer<B, Err> for FlatMapInnerObserver<O>
where
  O: Observer<B, Err>,
{
  fn next(&mut self, value: B) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: Err) { fail::<B, Err, O>(&self.state, &self.outer, &self.inners, err) }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.active -= 1;
      state.take_if_done()
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  #[inline]
  fn is_finished(&self) -> bool { is_finished::<B, Err, O>(&self.state) }
}
