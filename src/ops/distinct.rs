use std::{collections::HashSet, hash::Hash};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

#[derive(Clone)]
pub struct DistinctOp<S> {
  pub(crate) source: S,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for DistinctOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, DistinctObserver<O, Item>>,
  Item: Eq + Hash + Clone,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(DistinctObserver { observer, seen: HashSet::new() })
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for DistinctOp<S>
where
  S: ObservableExt<Item, Err>,
  Item: Eq + Hash + Clone,
{
}

pub struct DistinctObserver<O, Item> {
  observer: O,
  seen: HashSet<Item>,
}

impl<Item, Err, O> Observer<Item, Err> for DistinctObserver<O, Item>
where
  O: Observer<Item, Err>,
  Item: Eq + Hash + Clone,
{
  fn next(&mut self, value: Item) {
    if !self.seen.contains(&value) {
      self.seen.insert(value.clone());
      self.observer.next(value);
    }
  }

  forward_terminal!(observer);
}

pub struct DistinctKeyOp<S, F, K> {
  source: S,
  key: F,
  _hint: TypeHint<K>,
}

impl<S, F, K> DistinctKeyOp<S, F, K> {
  #[inline]
  pub(crate) fn new(source: S, key: F) -> Self { DistinctKeyOp { source, key, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, K> Clone for DistinctKeyOp<S, F, K> {
  fn clone(&self) -> Self { DistinctKeyOp::new(self.source.clone(), self.key.clone()) }
}

impl<Item, Err, K, O, S, F> Observable<Item, Err, O> for DistinctKeyOp<S, F, K>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, DistinctKeyObserver<O, F, K>>,
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(DistinctKeyObserver { observer, key: self.key, seen: HashSet::new() })
  }
}

impl<Item, Err, K, S, F> ObservableExt<Item, Err> for DistinctKeyOp<S, F, K>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
}

pub struct DistinctKeyObserver<O, F, K> {
  observer: O,
  key: F,
  seen: HashSet<K>,
}

impl<Item, Err, K, O, F> Observer<Item, Err> for DistinctKeyObserver<O, F, K>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
  fn next(&mut self, value: Item) {
    if self.seen.insert((self.key)(&value)) {
      self.observer.next(value);
    }
  }

  forward_terminal!(observer);
}
