//! Sequences and the operator surface.
//!
//! An [`Observable`] knows how to push its signals into one observer type;
//! [`ObservableExt`] carries the chainable operators and the `subscribe`
//! entry points. Every operator is a plain struct that wraps its source, so
//! an operator chain is one nested value that does nothing until it is
//! subscribed.
use std::{
  fmt::{Debug, Display},
  hash::Hash,
};

use crate::{
  observer::{BoxObserver, NextObserver, Observer, ObserverAll, Subscriber},
  ops::{
    all_any::{AllOp, AnyOp},
    buffer::BufferOp,
    collect::{CollectListOp, CollectMapOp},
    delay::{DelayElementsOp, DelaySubscriptionOp},
    distinct::{DistinctKeyOp, DistinctOp},
    filter::FilterOp,
    first_with_signal::FirstWithSignalOp,
    flat_map::FlatMapOp,
    log::LogOp,
    map::{MapOp, TryMapOp},
    merge::MergeOp,
    skip::{SkipForOp, SkipOp},
    subscribe_on::SubscribeOnOp,
    take::{TakeForOp, TakeOp},
    tap::{OnCompleteOp, OnErrorOp, TapOp},
    zip::ZipOp,
  },
  scheduler::{Duration, Scheduler},
  subscription::Subscription,
};

mod boxed;
pub use boxed::BoxOp;
mod create;
pub use create::{create, CreateObservable};
mod from_iter;
pub use from_iter::{from_generator, from_iter, range, GeneratorObservable, ObservableIter};
mod interval;
pub use interval::{interval, interval_at, IntervalObservable};
mod of;
pub use of::{of, OfObservable};
mod timer;
pub use timer::{timer, TimerObservable};
mod single;
pub use single::{BlockObserver, Single};
mod trivial;
pub use trivial::{empty, never, throw_err, EmptyObservable, NeverObservable, ThrowObservable};

pub use crate::ops::{first_with_signal::first_with_signal, zip::zip};

/// A sequence that can push its signals into an observer of type `O`.
pub trait Observable<Item, Err, O: Observer<Item, Err>> {
  type Unsub: Subscription;

  /// Starts the sequence. Synchronous sources emit everything before
  /// returning; scheduled ones return right away.
  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// The handle returned by the `subscribe` family.
///
/// Unsubscribing first cuts the observer off, so no signal reaches user code
/// afterwards, then cancels the upstream work.
pub struct SubscribeHandle<U, O> {
  upstream: U,
  subscriber: Subscriber<O>,
}

impl<U: Subscription, O> Subscription for SubscribeHandle<U, O> {
  fn unsubscribe(self) {
    self.subscriber.unsubscribe();
    self.upstream.unsubscribe();
  }

  /// `true` once the sequence terminated or was cancelled.
  #[inline]
  fn is_closed(&self) -> bool { self.subscriber.is_closed() }
}

pub trait ObservableExt<Item, Err>: Sized {
  /// Subscribes with a `next` closure. An error signal is logged at error
  /// level since there is nobody to hand it to.
  fn subscribe<N>(
    self, next: N,
  ) -> SubscribeHandle<<Self as Observable<Item, Err, Subscriber<NextObserver<N>>>>::Unsub, NextObserver<N>>
  where
    N: FnMut(Item),
    Err: Display,
    Self: Observable<Item, Err, Subscriber<NextObserver<N>>>,
  {
    self.subscribe_with(NextObserver(next))
  }

  /// Subscribes with `next` and `error` closures.
  fn subscribe_err<N, E>(
    self, next: N, error: E,
  ) -> SubscribeHandle<
    <Self as Observable<Item, Err, Subscriber<ObserverAll<N, E, fn()>>>>::Unsub,
    ObserverAll<N, E, fn()>,
  >
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, fn()>>>,
  {
    self.subscribe_with(ObserverAll::new(next, error, noop as fn()))
  }

  /// Subscribes with `next`, `error` and `complete` closures.
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> SubscribeHandle<<Self as Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>>::Unsub, ObserverAll<N, E, C>>
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }

  /// Subscribes an arbitrary observer.
  fn subscribe_with<O>(
    self, observer: O,
  ) -> SubscribeHandle<<Self as Observable<Item, Err, Subscriber<O>>>::Unsub, O>
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, Subscriber<O>>,
  {
    let subscriber = Subscriber::new(observer);
    let upstream = self.actual_subscribe(subscriber.clone());
    SubscribeHandle { upstream, subscriber }
  }

  /// Transforms every value with `f`.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Transforms every value with a fallible `f`. The first `Err` terminates
  /// the sequence with that error and cancels upstream.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp::new(self, f)
  }

  /// Passes on only the values that satisfy `filter`.
  #[inline]
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp { source: self, filter }
  }

  /// Suppresses values equal to one already emitted.
  #[inline]
  fn distinct(self) -> DistinctOp<Self>
  where
    Item: Eq + Hash + Clone,
  {
    DistinctOp { source: self }
  }

  /// Suppresses values whose key was already seen.
  #[inline]
  fn distinct_key<K, F>(self, key: F) -> DistinctKeyOp<Self, F, K>
  where
    F: FnMut(&Item) -> K,
    K: Eq + Hash,
  {
    DistinctKeyOp::new(self, key)
  }

  /// Drops the first `count` values.
  #[inline]
  fn skip(self, count: usize) -> SkipOp<Self> { SkipOp { source: self, count } }

  /// Drops every value that arrives before `duration` elapsed on
  /// `scheduler`.
  ///
  /// The window timer is armed before upstream is subscribed. On
  /// [`ImmediateScheduler`](crate::scheduler::ImmediateScheduler) that
  /// blocks the calling thread for `duration`, after which the window is
  /// already open and nothing is skipped. Use a threaded or virtual-time
  /// scheduler for a real window.
  #[inline]
  fn skip_for<SD>(self, duration: Duration, scheduler: SD) -> SkipForOp<Self, SD>
  where
    SD: Scheduler,
  {
    SkipForOp { source: self, duration, scheduler }
  }

  /// Emits at most `count` values, then completes and cancels upstream.
  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Relays values until `duration` elapsed on `scheduler`, then completes
  /// and cancels upstream.
  ///
  /// The window timer is armed before upstream is subscribed. On
  /// [`ImmediateScheduler`](crate::scheduler::ImmediateScheduler) that
  /// blocks the calling thread for `duration` and then completes before
  /// upstream ever runs, so the output is empty. Use a threaded or
  /// virtual-time scheduler for a real window.
  #[inline]
  fn take_for<SD>(self, duration: Duration, scheduler: SD) -> TakeForOp<Self, SD>
  where
    SD: Scheduler,
  {
    TakeForOp { source: self, duration, scheduler }
  }

  /// Groups values into `Vec`s of `count`. A trailing partial group is
  /// emitted on completion.
  ///
  /// # Panics
  ///
  /// If `count` is zero.
  #[inline]
  fn buffer(self, count: usize) -> BufferOp<Self> { BufferOp::new(self, count) }

  /// Maps each value to an inner sequence and merges all inner sequences
  /// into the output, in arrival order.
  #[inline]
  fn flat_map<B, Inner, F>(self, f: F) -> FlatMapOp<Self, F, Item, B>
  where
    F: FnMut(Item) -> Inner,
    Inner: ObservableExt<B, Err>,
  {
    FlatMapOp::new(self, f)
  }

  /// Interleaves the values of `self` and `other` as they arrive. Completes
  /// once both completed.
  #[inline]
  fn merge_with<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: ObservableExt<Item, Err>,
  {
    MergeOp { source1: self, source2: other }
  }

  /// Pairs values of `self` and `other` by index.
  #[inline]
  fn zip_with<S, B>(self, other: S) -> ZipOp<Self, S, fn(Item, B) -> (Item, B), Item, B>
  where
    S: ObservableExt<B, Err>,
  {
    ZipOp::new(self, other, pair as fn(Item, B) -> (Item, B))
  }

  /// Mirrors whichever of `self` and `other` signals first.
  fn or<S>(self, other: S) -> FirstWithSignalOp<BoxOp<Item, Err>>
  where
    S: ObservableExt<Item, Err> + Observable<Item, Err, BoxObserver<Item, Err>>,
    S: Clone + Send + 'static,
    S::Unsub: Send + 'static,
    Self: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + Send + 'static,
    <Self as Observable<Item, Err, BoxObserver<Item, Err>>>::Unsub: Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    first_with_signal([self.box_it(), other.box_it()])
  }

  /// Shifts every value by `delay`: each value is emitted `delay` after the
  /// previous one was emitted. Completion follows the last value.
  #[inline]
  fn delay_elements<SD>(self, delay: Duration, scheduler: SD) -> DelayElementsOp<Self, SD>
  where
    SD: Scheduler,
  {
    DelayElementsOp { source: self, delay, scheduler }
  }

  /// Subscribes to the source only after `delay` elapsed on `scheduler`.
  #[inline]
  fn delay_subscription<SD>(self, delay: Duration, scheduler: SD) -> DelaySubscriptionOp<Self, SD>
  where
    SD: Scheduler,
  {
    DelaySubscriptionOp { source: self, delay, scheduler }
  }

  /// Performs the subscription, and therefore a synchronous source's
  /// emission, on `scheduler`.
  #[inline]
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD>
  where
    SD: Scheduler,
  {
    SubscribeOnOp { source: self, scheduler }
  }

  /// Traces every signal, and cancellation, under `category` at info level.
  #[inline]
  fn log(self, category: &'static str) -> LogOp<Self>
  where
    Item: Debug,
    Err: Display,
  {
    LogOp { source: self, category }
  }

  /// Calls `f` with every value before passing it on.
  #[inline]
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Item),
  {
    TapOp { source: self, func: f }
  }

  /// Calls `f` right before the completion signal is passed on.
  #[inline]
  fn on_complete<F>(self, f: F) -> OnCompleteOp<Self, F>
  where
    F: FnOnce(),
  {
    OnCompleteOp { source: self, func: f }
  }

  /// Calls `f` with the error right before it is passed on.
  #[inline]
  fn on_error<F>(self, f: F) -> OnErrorOp<Self, F>
  where
    F: FnOnce(&Err),
  {
    OnErrorOp { source: self, func: f }
  }

  /// Gathers every value into a `Vec`, emitted once on completion.
  #[inline]
  fn collect_list(self) -> Single<CollectListOp<Self, Item>> { Single(CollectListOp::new(self)) }

  /// Gathers every value into a map under `key(&value)`, emitted once on
  /// completion. A later value replaces an earlier one with the same key.
  #[inline]
  fn collect_map<K, F>(self, key: F) -> Single<CollectMapOp<Self, F, Item>>
  where
    F: FnMut(&Item) -> K,
    K: Eq + Hash,
  {
    Single(CollectMapOp::new(self, key))
  }

  /// Emits whether every value satisfies `predicate`, stopping at the first
  /// one that does not.
  #[inline]
  fn all<F>(self, predicate: F) -> Single<AllOp<Self, F, Item>>
  where
    F: FnMut(&Item) -> bool,
  {
    Single(AllOp::new(self, predicate))
  }

  /// Emits whether any value satisfies `predicate`, stopping at the first
  /// one that does.
  #[inline]
  fn any<F>(self, predicate: F) -> Single<AnyOp<Self, F, Item>>
  where
    F: FnMut(&Item) -> bool,
  {
    Single(AnyOp::new(self, predicate))
  }

  /// Erases the concrete type of the chain.
  #[inline]
  fn box_it(self) -> BoxOp<Item, Err>
  where
    Self: Observable<Item, Err, BoxObserver<Item, Err>> + Clone + Send + 'static,
    <Self as Observable<Item, Err, BoxObserver<Item, Err>>>::Unsub: Send + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxOp::new(self)
  }
}

fn noop() {}

fn pair<A, B>(a: A, b: B) -> (A, B) { (a, b) }

/// Builds a sequence from a fixed list of values.
///
/// ```rust
/// use rxflux::prelude::*;
///
/// let mut fruits = vec![];
/// of_sequence!["Apple", "Orange", "Grape"].subscribe(|v| fruits.push(v));
/// assert_eq!(fruits, ["Apple", "Orange", "Grape"]);
/// ```
#[macro_export]
macro_rules! of_sequence {
  ($($item:expr),* $(,)?) => {
    $crate::observable::from_iter([$($item),*])
  };
}
