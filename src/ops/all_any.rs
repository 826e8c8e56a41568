use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{ProxySubscription, Subscription},
  type_hint::TypeHint,
};

macro_rules! quantifier_op {
  ($(#[$doc:meta])* $name:ident, $decisive:literal) => {
    $(#[$doc])*
    pub struct $name<S, F, Item> {
      source: S,
      predicate: F,
      _hint: TypeHint<Item>,
    }

    impl<S, F, Item> $name<S, F, Item> {
      #[inline]
      pub(crate) fn new(source: S, predicate: F) -> Self {
        $name { source, predicate, _hint: TypeHint::new() }
      }
    }

    impl<S: Clone, F: Clone, Item> Clone for $name<S, F, Item> {
      fn clone(&self) -> Self { $name::new(self.source.clone(), self.predicate.clone()) }
    }

    impl<Item, Err, O, S, F> Observable<bool, Err, O> for $name<S, F, Item>
    where
      O: Observer<bool, Err>,
      S: Observable<Item, Err, QuantifierObserver<O, F>>,
      S::Unsub: Send + 'static,
      F: FnMut(&Item) -> bool,
    {
      type Unsub = ProxySubscription;

      fn actual_subscribe(self, observer: O) -> Self::Unsub {
        let upstream = ProxySubscription::default();
        let unsub = self.source.actual_subscribe(QuantifierObserver {
          observer: Some(observer),
          predicate: self.predicate,
          decisive: $decisive,
          upstream: upstream.clone(),
        });
        upstream.bind(unsub);
        upstream
      }
    }

    impl<Item, Err, S, F> ObservableExt<bool, Err> for $name<S, F, Item>
    where
      S: ObservableExt<Item, Err>,
      F: FnMut(&Item) -> bool,
    {
    }
  };
}

quantifier_op!(
  /// Emits `true` if every value satisfies the predicate. The first value
  /// that does not decides the result as `false` and cancels the source. An
  /// empty source yields `true`.
  AllOp,
  false
);

quantifier_op!(
  /// Emits `true` as soon as a value satisfies the predicate, cancelling the
  /// source. A source that completes without a match yields `false`.
  AnyOp,
  true
);

/// Shared observer of `all` and `any`.
///
/// `decisive` is the predicate outcome that settles the answer early: for
/// `any` a match, for `all` a miss. The emitted answer is `decisive` when
/// settled early and `!decisive` when the source completes.
pub struct QuantifierObserver<O, F> {
  observer: Option<O>,
  predicate: F,
  decisive: bool,
  upstream: ProxySubscription,
}

impl<Item, Err, O, F> Observer<Item, Err> for QuantifierObserver<O, F>
where
  O: Observer<bool, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() || (self.predicate)(&value) != self.decisive {
      return;
    }
    self.upstream.clone().unsubscribe();
    if let Some(mut observer) = self.observer.take() {
      observer.next(self.decisive);
      observer.complete();
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(mut observer) = self.observer {
      observer.next(!self.decisive);
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool { self.observer.as_ref().map_or(true, |o| o.is_finished()) }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn all_true() {
    let mut result = None;
    of_sequence!["Apple", "Avocado"].all(|v| v.starts_with('A')).subscribe(|v| result = Some(v));
    assert_eq!(result, Some(true));
  }

  #[test]
  fn all_stops_at_first_miss() {
    let mut pulled = 0;
    let mut result = vec![];
    let mut completed = false;
    observable::from_iter((0..100).inspect(|_| pulled += 1))
      .all(|v| *v < 3)
      .subscribe_all(|v| result.push(v), |_| {}, || completed = true);
    assert_eq!(result, [false]);
    assert!(completed);
    assert!(pulled <= 5);
  }

  #[test]
  fn all_of_empty_is_true() {
    assert_eq!(observable::empty::<i32>().all(|_| false).block(), Ok(Some(true)));
  }

  #[test]
  fn any_matches() {
    let mut result = vec![];
    of_sequence!["Apple", "Orange", "Grape"].any(|v| v.contains('r')).subscribe(|v| result.push(v));
    assert_eq!(result, [true]);
  }

  #[test]
  fn any_without_match_is_false() {
    assert_eq!(observable::from_iter(1..4).any(|v| *v > 10).block(), Ok(Some(false)));
    assert_eq!(observable::empty::<i32>().any(|_| true).block(), Ok(Some(false)));
  }

  #[test]
  fn errors_pass_through() {
    let result = observable::throw_err::<i32>(RxError::source("x")).any(|_| true).block();
    assert_eq!(result, Err(RxError::source("x")));
  }
}
