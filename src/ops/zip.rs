//! Zip combines values from two sequences pairwise by index.

use std::collections::VecDeque;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{MultiSubscription, Subscription},
  type_hint::TypeHint,
};

/// Pairs the n-th value of `a` with the n-th value of `b` through
/// `combiner`.
///
/// Values wait in a per-side queue until their partner arrives. The output
/// completes as soon as one side completed with an empty queue, because no
/// further pair can form, and the other side is then cancelled.
///
/// ```
/// use rxflux::prelude::*;
///
/// let mut seen = vec![];
/// observable::zip(
///   of_sequence!["Apple", "Banana"],
///   of_sequence!["red", "yellow", "green"],
///   |fruit, color| format!("{color} {fruit}"),
/// )
/// .subscribe(|v| seen.push(v));
/// assert_eq!(seen, ["red Apple", "yellow Banana"]);
/// ```
pub fn zip<SA, SB, F, A, B, Err, Out>(a: SA, b: SB, combiner: F) -> ZipOp<SA, SB, F, A, B>
where
  SA: ObservableExt<A, Err>,
  SB: ObservableExt<B, Err>,
  F: FnMut(A, B) -> Out,
{
  ZipOp::new(a, b, combiner)
}

pub struct ZipOp<SA, SB, F, A, B> {
  a: SA,
  b: SB,
  combiner: F,
  _hint: TypeHint<(A, B)>,
}

impl<SA, SB, F, A, B> ZipOp<SA, SB, F, A, B> {
  #[inline]
  pub(crate) fn new(a: SA, b: SB, combiner: F) -> Self { ZipOp { a, b, combiner, _hint: TypeHint::new() } }
}

impl<SA: Clone, SB: Clone, F: Clone, A, B> Clone for ZipOp<SA, SB, F, A, B> {
  fn clone(&self) -> Self { ZipOp::new(self.a.clone(), self.b.clone(), self.combiner.clone()) }
}

impl<A, B, Out, Err, O, SA, SB, F> Observable<Out, Err, O> for ZipOp<SA, SB, F, A, B>
where
  O: Observer<Out, Err>,
  SA: Observable<A, Err, ZipLeftObserver<O, A, B, F>>,
  SB: Observable<B, Err, ZipRightObserver<O, A, B, F>>,
  SA::Unsub: Send + 'static,
  SB::Unsub: Send + 'static,
  F: FnMut(A, B) -> Out,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let sources = MultiSubscription::default();
    let state = MutArc::own(ZipState {
      observer: Some(observer),
      left: VecDeque::new(),
      right: VecDeque::new(),
      left_done: false,
      right_done: false,
      combiner: self.combiner,
    });
    let left = ZipLeftObserver { state: state.clone(), sources: sources.clone() };
    sources.append(self.a.actual_subscribe(left));
    if state.rc_deref().observer.is_some() {
      let right = ZipRightObserver { state, sources: sources.clone() };
      sources.append(self.b.actual_subscribe(right));
    }
    sources
  }
}

impl<A, B, Out, Err, SA, SB, F> ObservableExt<Out, Err> for ZipOp<SA, SB, F, A, B>
where
  SA: ObservableExt<A, Err>,
  SB: ObservableExt<B, Err>,
  F: FnMut(A, B) -> Out,
{
}

pub struct ZipState<O, A, B, F> {
  observer: Option<O>,
  left: VecDeque<A>,
  right: VecDeque<B>,
  left_done: bool,
  right_done: bool,
  combiner: F,
}

impl<O, A, B, F> ZipState<O, A, B, F> {
  fn emit_pairs<Out, Err>(&mut self)
  where
    O: Observer<Out, Err>,
    F: FnMut(A, B) -> Out,
  {
    while !self.left.is_empty() && !self.right.is_empty() {
      let (Some(a), Some(b)) = (self.left.pop_front(), self.right.pop_front()) else { break };
      let pair = (self.combiner)(a, b);
      if let Some(observer) = self.observer.as_mut() {
        observer.next(pair);
      }
    }
  }

  /// Takes the observer out once no further pair can form.
  fn take_if_exhausted(&mut self) -> Option<O> {
    let exhausted = (self.left_done && self.left.is_empty()) || (self.right_done && self.right.is_empty());
    if exhausted { self.observer.take() } else { None }
  }
}

fn finish<O, A, B, F>(state: &MutArc<ZipState<O, A, B, F>>, sources: &MultiSubscription) -> Option<O> {
  let observer = state.rc_deref_mut().take_if_exhausted();
  if observer.is_some() {
    sources.clone().unsubscribe();
  }
  observer
}

macro_rules! zip_side_observer {
  ($name:ident, $item:ident, $queue:ident, $done:ident) => {
    pub struct $name<O, A, B, F> {
      state: MutArc<ZipState<O, A, B, F>>,
      sources: MultiSubscription,
    }

    impl<A, B, Out, Err, O, F> Observer<$item, Err> for $name<O, A, B, F>
    where
      O: Observer<Out, Err>,
      F: FnMut(A, B) -> Out,
    {
      fn next(&mut self, value: $item) {
        {
          let mut state = self.state.rc_deref_mut();
          if state.observer.is_none() {
            return;
          }
          state.$queue.push_back(value);
          state.emit_pairs::<Out, Err>();
        }
        if let Some(observer) = finish(&self.state, &self.sources) {
          observer.complete();
        }
      }

      fn error(self, err: Err) {
        let observer = self.state.rc_deref_mut().observer.take();
        if let Some(observer) = observer {
          self.sources.unsubscribe();
          observer.error(err);
        }
      }

      fn complete(self) {
        self.state.rc_deref_mut().$done = true;
        if let Some(observer) = finish(&self.state, &self.sources) {
          observer.complete();
        }
      }

      fn is_finished(&self) -> bool {
        self.state.rc_deref().observer.as_ref().map_or(true, |o| o.is_finished())
      }
    }
  };
}

zip_side_observer!(ZipLeftObserver, A, left, left_done);
zip_side_observer!(ZipRightObserver, B, right, right_done);
