use std::sync::mpsc::{channel, Sender};

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt, OfObservable},
  observer::{Observer, Signal},
  subscription::Subscription,
};

/// A sequence that emits at most one value.
///
/// It supports every operator a multi-value sequence does; the wrapper only
/// documents the cardinality and adds [`block`](Single::block).
#[derive(Clone)]
pub struct Single<S>(pub(crate) S);

impl<Item> Single<OfObservable<Item>> {
  /// A single-value sequence of `value`.
  pub fn just(value: Item) -> Self { Single(OfObservable(value)) }
}

impl<S> Single<S> {
  /// Unwraps the underlying sequence.
  #[inline]
  pub fn into_inner(self) -> S { self.0 }

  /// Subscribes and parks the calling thread until the sequence terminates.
  ///
  /// Returns the value, `None` if the sequence completed empty, or the
  /// error it terminated with. A sequence that never terminates blocks
  /// forever.
  pub fn block<Item, Err>(self) -> Result<Option<Item>, Err>
  where
    S: Observable<Item, Err, BlockObserver<Item, Err>>,
  {
    let (tx, rx) = channel();
    let upstream = self.0.actual_subscribe(BlockObserver(tx));
    let mut value = None;
    // A closed channel means the observer was dropped without a terminal
    // signal; report what was seen so far.
    let result = loop {
      match rx.recv() {
        Ok(Signal::Next(v)) => value = Some(v),
        Ok(Signal::Error(e)) => break Err(e),
        Ok(Signal::Complete) | Err(_) => break Ok(value),
      }
    };
    upstream.unsubscribe();
    result
  }
}

impl<Item, Err, O, S> Observable<Item, Err, O> for Single<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, O>,
{
  type Unsub = S::Unsub;

  #[inline]
  fn actual_subscribe(self, observer: O) -> Self::Unsub { self.0.actual_subscribe(observer) }
}

impl<Item, Err, S> ObservableExt<Item, Err> for Single<S> where S: ObservableExt<Item, Err> {}

/// Forwards signals over a channel to a thread parked in
/// [`Single::block`].
pub struct BlockObserver<Item, Err>(Sender<Signal<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for BlockObserver<Item, Err> {
  fn next(&mut self, value: Item) { let _ = self.0.send(Signal::Next(value)); }

  fn error(self, err: Err) { let _ = self.0.send(Signal::Error(err)); }

  fn complete(self) { let _ = self.0.send(Signal::Complete); }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

impl<Item> Single<crate::observable::EmptyObservable<Item>> {
  /// A single-value sequence that completes without a value.
  pub fn empty() -> Self { Single(crate::observable::empty()) }
}

impl<Item> Single<crate::observable::ThrowObservable<Item>> {
  /// A single-value sequence that fails with `err`.
  pub fn error(err: RxError) -> Self { Single(crate::observable::throw_err(err)) }
}
