use std::{collections::HashMap, hash::Hash};

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  type_hint::TypeHint,
};

/// Accumulates every value into a `Vec`, emitted once the source completes.
pub struct CollectListOp<S, Item> {
  source: S,
  _hint: TypeHint<Item>,
}

impl<S, Item> CollectListOp<S, Item> {
  #[inline]
  pub(crate) fn new(source: S) -> Self { CollectListOp { source, _hint: TypeHint::new() } }
}

impl<S: Clone, Item> Clone for CollectListOp<S, Item> {
  fn clone(&self) -> Self { CollectListOp::new(self.source.clone()) }
}

impl<Item, Err, O, S> Observable<Vec<Item>, Err, O> for CollectListOp<S, Item>
where
  O: Observer<Vec<Item>, Err>,
  S: Observable<Item, Err, CollectObserver<O, Vec<Item>>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(CollectObserver { observer, collection: Vec::new() })
  }
}

impl<Item, Err, S> ObservableExt<Vec<Item>, Err> for CollectListOp<S, Item> where
  S: ObservableExt<Item, Err>
{
}

/// Accumulates every value into a map keyed by a key function, emitted once
/// the source completes. Values with a repeated key replace earlier ones.
pub struct CollectMapOp<S, F, Item> {
  source: S,
  key: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> CollectMapOp<S, F, Item> {
  #[inline]
  pub(crate) fn new(source: S, key: F) -> Self { CollectMapOp { source, key, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for CollectMapOp<S, F, Item> {
  fn clone(&self) -> Self { CollectMapOp::new(self.source.clone(), self.key.clone()) }
}

impl<Item, Err, K, O, S, F> Observable<HashMap<K, Item>, Err, O> for CollectMapOp<S, F, Item>
where
  O: Observer<HashMap<K, Item>, Err>,
  S: Observable<Item, Err, CollectObserver<O, KeyedMap<F, K, Item>>>,
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(CollectObserver {
      observer,
      collection: KeyedMap { key: self.key, map: HashMap::new() },
    })
  }
}

impl<Item, Err, K, S, F> ObservableExt<HashMap<K, Item>, Err> for CollectMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
}

/// A growing collection that is handed downstream in one piece.
pub trait Collection<Item> {
  type Output;

  fn push(&mut self, value: Item);

  fn finish(self) -> Self::Output;
}

impl<Item> Collection<Item> for Vec<Item> {
  type Output = Vec<Item>;

  #[inline]
  fn push(&mut self, value: Item) { Vec::push(self, value) }

  #[inline]
  fn finish(self) -> Self::Output { self }
}

pub struct KeyedMap<F, K, Item> {
  key: F,
  map: HashMap<K, Item>,
}

impl<F, K, Item> Collection<Item> for KeyedMap<F, K, Item>
where
  F: FnMut(&Item) -> K,
  K: Eq + Hash,
{
  type Output = HashMap<K, Item>;

  fn push(&mut self, value: Item) {
    let key = (self.key)(&value);
    self.map.insert(key, value);
  }

  #[inline]
  fn finish(self) -> Self::Output { self.map }
}

pub struct CollectObserver<O, C> {
  observer: O,
  collection: C,
}

impl<Item, Err, O, C> Observer<Item, Err> for CollectObserver<O, C>
where
  C: Collection<Item>,
  O: Observer<C::Output, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.collection.push(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    self.observer.next(self.collection.finish());
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}
