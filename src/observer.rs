//! Observer trait and implementations
//!
//! The Observer is the consumer side of the signal channel. It receives any
//! number of `next` calls followed by at most one terminal call, `error` or
//! `complete`. Terminal methods take `self` by value, so a terminated
//! observer can no longer be reached through the value that terminated it.

use std::{
  fmt::Display,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use crate::{
  rc::{MutArc, RcDerefMut},
  subscription::Subscription,
};

// ============================================================================
// Observer Trait
// ============================================================================

pub trait Observer<Item, Err> {
  /// Receive the next value.
  fn next(&mut self, value: Item);

  /// Terminate with an error.
  fn error(self, err: Err);

  /// Terminate normally.
  fn complete(self);

  /// Returns `true` once the observer will not accept more values.
  ///
  /// Synchronous sources poll this between emissions so that operators like
  /// `take` stop production without an explicit unsubscribe.
  fn is_finished(&self) -> bool;
}

// ============================================================================
// Signal
// ============================================================================

/// One notification travelling from a sequence to its observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Signal<Item, Err> {
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Signal::Next(_)) }

  /// Replays this signal into an observer. Returns the observer back if it
  /// can still receive signals.
  pub fn dispatch<O: Observer<Item, Err>>(self, mut observer: O) -> Option<O> {
    match self {
      Signal::Next(v) => {
        observer.next(v);
        Some(observer)
      }
      Signal::Error(e) => {
        observer.error(e);
        None
      }
      Signal::Complete => {
        observer.complete();
        None
      }
    }
  }
}

// ============================================================================
// Emitter Trait
// ============================================================================

/// Object-safe emitting facade handed to [`create`](crate::observable::create)
/// closures.
///
/// Unlike `Observer`, terminal methods take `&mut self`; calls after the
/// first terminal signal are ignored.
pub trait Emitter<Item, Err> {
  fn next(&mut self, value: Item);
  fn error(&mut self, err: Err);
  fn complete(&mut self);
  fn is_finished(&self) -> bool;
}

impl<Item, Err, O> Emitter<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(o) = self.as_mut() {
      o.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(o) = self.take() {
      o.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(o) = self.take() {
      o.complete();
    }
  }

  fn is_finished(&self) -> bool { self.as_ref().map_or(true, |o| o.is_finished()) }
}

// ============================================================================
// DynObserver - object-safe Observer
// ============================================================================

/// Mirrors [`Observer`] with boxed receivers so it can live in a vtable.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_finished(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_finished(&self) -> bool { self.is_finished() }
}

/// Type-erased observer that can cross threads.
pub type BoxObserver<Item, Err> = Box<dyn DynObserver<Item, Err> + Send>;

impl<Item, Err> Observer<Item, Err> for BoxObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_finished(&self) -> bool { (**self).box_is_finished() }
}

// ============================================================================
// Subscriber
// ============================================================================

/// The downstream end of one subscription.
///
/// `Subscriber` is both the observer handed to the source and the handle
/// that can cut it off: after a terminal signal or `unsubscribe` the inner
/// observer is dropped and any late signal is discarded.
///
/// The closed flag lives outside the observer cell, so the observer may
/// cancel its own subscription from inside `next`. The cell is locked while
/// a value is delivered; an `unsubscribe` that finds it busy only raises the
/// flag and the delivering side drops the observer once it returns.
pub struct Subscriber<O> {
  observer: MutArc<Option<O>>,
  closed: Arc<AtomicBool>,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O) -> Self {
    Subscriber { observer: MutArc::own(Some(observer)), closed: Arc::new(AtomicBool::new(false)) }
  }

  #[inline]
  fn is_closed_flag(&self) -> bool { self.closed.load(Ordering::Acquire) }

  /// Raises the flag and takes the observer out. Returns `None` if the
  /// subscription was already closed.
  fn close(&self) -> Option<O> {
    if self.closed.swap(true, Ordering::AcqRel) {
      return None;
    }
    self.observer.rc_deref_mut().take()
  }
}

impl<O> Clone for Subscriber<O> {
  fn clone(&self) -> Self { Subscriber { observer: self.observer.clone(), closed: self.closed.clone() } }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.is_closed_flag() {
      return;
    }
    let mut slot = self.observer.rc_deref_mut();
    if let Some(observer) = slot.as_mut() {
      observer.next(value);
    }
    if self.is_closed_flag() {
      let cancelled = slot.take();
      drop(slot);
      drop(cancelled);
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.close() {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(observer) = self.close() {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool {
    if self.is_closed_flag() {
      return true;
    }
    // A busy cell means a value is being delivered right now.
    match self.observer.try_rc_deref_mut() {
      Some(slot) => slot.as_ref().map_or(true, |o| o.is_finished()),
      None => false,
    }
  }
}

impl<O> Subscription for Subscriber<O> {
  fn unsubscribe(self) {
    if self.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let cancelled = self.observer.try_rc_deref_mut().and_then(|mut slot| slot.take());
    drop(cancelled);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.is_closed_flag() }
}

// ============================================================================
// Closure observers
// ============================================================================

/// Observer built from a `next` closure alone.
///
/// Errors that reach it have nowhere to go, so they are reported through
/// `tracing` at error level instead of being swallowed.
#[derive(Clone)]
pub struct NextObserver<N>(pub N);

impl<Item, Err, N> Observer<Item, Err> for NextObserver<N>
where
  N: FnMut(Item),
  Err: Display,
{
  #[inline]
  fn next(&mut self, value: Item) { (self.0)(value) }

  fn error(self, err: Err) {
    tracing::error!(error = %err, "unhandled error signal reached a subscriber without an error handler");
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_finished(&self) -> bool { false }
}

/// Observer built from `next`, `error` and `complete` closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  #[inline]
  pub fn new(next: N, error: E, complete: C) -> Self { ObserverAll { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value) }

  #[inline]
  fn error(self, err: Err) { (self.error)(err) }

  #[inline]
  fn complete(self) { (self.complete)() }

  #[inline]
  fn is_finished(&self) -> bool { false }
}

#[cfg(test)]
mod test {
  use super::*;

  struct Recorder<'a> {
    values: &'a mut Vec<i32>,
  }

  impl<'a> Observer<i32, ()> for Recorder<'a> {
    fn next(&mut self, value: i32) { self.values.push(value); }
    fn error(self, _: ()) {}
    fn complete(self) { self.values.push(-1); }
    fn is_finished(&self) -> bool { false }
  }

  #[test]
  fn subscriber_drops_signals_after_unsubscribe() {
    let mut values = vec![];
    {
      let mut subscriber = Subscriber::new(Recorder { values: &mut values });
      subscriber.next(1);
      subscriber.clone().unsubscribe();
      assert!(subscriber.is_finished());
      subscriber.next(2);
      subscriber.complete();
    }
    assert_eq!(values, vec![1]);
  }

  #[test]
  fn subscriber_delivers_one_terminal() {
    let mut values = vec![];
    {
      let subscriber = Subscriber::new(Recorder { values: &mut values });
      let handle = subscriber.clone();
      subscriber.clone().complete();
      assert!(handle.is_closed());
      subscriber.complete();
    }
    assert_eq!(values, vec![-1]);
  }

  #[test]
  fn signal_dispatch() {
    let mut hits = 0;
    let mut completed = false;
    {
      let observer = ObserverAll::new(|v: i32| hits += v, |_: ()| {}, || completed = true);
      let observer = Signal::Next(2).dispatch(observer).unwrap();
      assert!(Signal::<i32, ()>::Complete.dispatch(observer).is_none());
    }
    assert_eq!(hits, 2);
    assert!(completed);
    assert!(Signal::<i32, ()>::Complete.is_terminal());
    assert!(!Signal::<i32, ()>::Next(1).is_terminal());
  }

  #[test]
  fn emitter_ignores_calls_after_terminal() {
    let mut values = vec![];
    {
      let mut emitter = Some(Recorder { values: &mut values });
      Emitter::next(&mut emitter, 1);
      Emitter::complete(&mut emitter);
      Emitter::next(&mut emitter, 2);
      assert!(Emitter::is_finished(&emitter));
    }
    assert_eq!(values, vec![1, -1]);
  }
}
