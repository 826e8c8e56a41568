//! Cancellation handles.
//!
//! Every `actual_subscribe` returns a [`Subscription`]. Unsubscribing stops
//! further delivery and releases timers owned by that subscription.
//! Unsubscribing twice, or after the sequence terminated, is a no-op.
use smallvec::SmallVec;

use crate::rc::{MutArc, RcDeref, RcDerefMut};

pub trait Subscription {
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;

  /// Activates "RAII" behavior for this subscription: `unsubscribe()` is
  /// called as soon as the returned guard goes out of scope.
  ///
  /// **Attention:** if the guard is not bound to a variable it is dropped,
  /// and the subscription cancelled, immediately.
  #[inline]
  fn unsubscribe_when_dropped(self) -> SubscriptionGuard<Self>
  where
    Self: Sized,
  {
    SubscriptionGuard(Some(self))
  }
}

impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<T: Subscription> Subscription for Option<T> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

// ==================== BoxSubscription ====================

trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription that can be stored and cancelled from any
/// thread.
pub struct BoxSubscription(Box<dyn BoxedSubscriptionInner + Send>);

impl BoxSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    Self(Box::new(subscription))
  }
}

impl Subscription for BoxSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

// ==================== ZipSubscription ====================

/// Two subscriptions cancelled together.
pub struct ZipSubscription<A, B> {
  a: A,
  b: B,
}

impl<A, B> ZipSubscription<A, B> {
  #[inline]
  pub fn new(a: A, b: B) -> Self { ZipSubscription { a, b } }
}

impl<A: Subscription, B: Subscription> Subscription for ZipSubscription<A, B> {
  fn unsubscribe(self) {
    self.a.unsubscribe();
    self.b.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.a.is_closed() && self.b.is_closed() }
}

// ==================== MultiSubscription ====================

struct MultiInner {
  closed: bool,
  teardown: SmallVec<[BoxSubscription; 2]>,
}

/// A growable set of subscriptions sharing one lifetime.
///
/// Adding to a closed set cancels the added subscription right away.
#[derive(Clone)]
pub struct MultiSubscription(MutArc<MultiInner>);

impl Default for MultiSubscription {
  fn default() -> Self {
    MultiSubscription(MutArc::own(MultiInner { closed: false, teardown: SmallVec::new() }))
  }
}

impl MultiSubscription {
  pub fn append(&self, subscription: impl Subscription + Send + 'static) {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.teardown.retain(|s| !s.is_closed());
      inner.teardown.push(BoxSubscription::new(subscription));
    }
  }

  /// Number of subscriptions still alive.
  pub fn teardown_size(&self) -> usize { self.0.rc_deref().teardown.len() }
}

impl Subscription for MultiSubscription {
  fn unsubscribe(self) {
    let teardown = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    for s in teardown {
      s.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

// ==================== ProxySubscription ====================

#[derive(Default)]
struct ProxyInner {
  closed: bool,
  target: Option<BoxSubscription>,
}

/// A late-bound slot for an upstream subscription.
///
/// Operators that must cancel their own upstream from inside an observer
/// callback (e.g. `take`) hand a clone of the proxy to the observer and bind
/// the real subscription once `actual_subscribe` returns. If the observer
/// closed the proxy in the meantime the bound subscription is cancelled on
/// arrival.
#[derive(Clone, Default)]
pub struct ProxySubscription(MutArc<ProxyInner>);

impl ProxySubscription {
  pub fn bind(&self, subscription: impl Subscription + Send + 'static) {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.target = Some(BoxSubscription::new(subscription));
    }
  }
}

impl Subscription for ProxySubscription {
  fn unsubscribe(self) {
    let target = {
      let mut inner = self.0.rc_deref_mut();
      inner.closed = true;
      inner.target.take()
    };
    target.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

// ==================== SubscriptionGuard ====================

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Disarms the guard and returns the subscription.
  pub fn into_inner(mut self) -> Option<T> { self.0.take() }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe()
    }
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;

  #[derive(Clone, Default)]
  struct Counted(Arc<AtomicUsize>);

  impl Subscription for Counted {
    fn unsubscribe(self) { self.0.fetch_add(1, Ordering::SeqCst); }
    fn is_closed(&self) -> bool { self.0.load(Ordering::SeqCst) > 0 }
  }

  #[test]
  fn multi_subscription_unsubscribes_all_once() {
    let multi = MultiSubscription::default();
    let a = Counted::default();
    let b = Counted::default();
    multi.append(a.clone());
    multi.append(b.clone());
    assert_eq!(multi.teardown_size(), 2);
    multi.clone().unsubscribe();
    multi.clone().unsubscribe();
    assert_eq!(a.0.load(Ordering::SeqCst), 1);
    assert_eq!(b.0.load(Ordering::SeqCst), 1);

    let late = Counted::default();
    multi.append(late.clone());
    assert!(late.is_closed());
  }

  #[test]
  fn proxy_cancels_late_binding() {
    let proxy = ProxySubscription::default();
    proxy.clone().unsubscribe();
    let upstream = Counted::default();
    proxy.bind(upstream.clone());
    assert!(upstream.is_closed());
  }

  #[test]
  fn proxy_forwards_unsubscribe() {
    let proxy = ProxySubscription::default();
    let upstream = Counted::default();
    proxy.bind(upstream.clone());
    assert!(!upstream.is_closed());
    proxy.unsubscribe();
    assert!(upstream.is_closed());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let upstream = Counted::default();
    {
      let _guard = upstream.clone().unsubscribe_when_dropped();
    }
    assert!(upstream.is_closed());

    let kept = Counted::default();
    let guard = SubscriptionGuard::new(kept.clone());
    let _ = guard.into_inner();
    assert!(!kept.is_closed());
  }
}
