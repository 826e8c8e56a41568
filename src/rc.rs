//! Shared mutable cells used to hand state across scheduler boundaries.
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{observer::Observer, subscription::Subscription};

pub trait RcDeref {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a>;
}

pub trait RcDerefMut {
  type Target<'a>
  where
    Self: 'a;
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a>;
}

/// `Arc<Mutex<T>>` with the accessors operators use.
///
/// The lock is never held across a call into user code that may lock the
/// same cell again; operators copy what they need out of the guard first.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  /// Locks the cell unless it is already locked, including by the calling
  /// thread.
  #[inline]
  pub fn try_rc_deref_mut(&self) -> Option<MutexGuard<'_, T>> { self.0.try_lock() }

  /// Whether both handles point at the same cell.
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> RcDeref for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref<'a>(&'a self) -> Self::Target<'a> { self.0.lock() }
}

impl<T> RcDerefMut for MutArc<T> {
  type Target<'a>
    = MutexGuard<'a, T>
  where
    Self: 'a;

  #[inline]
  #[allow(clippy::needless_lifetimes)]
  fn rc_deref_mut<'a>(&'a self) -> Self::Target<'a> { self.0.lock() }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// A shared optional observer: `None` once the observer terminated.
impl<Item, Err, O> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self.rc_deref_mut().as_mut() {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_finished(&self) -> bool { self.rc_deref().as_ref().map_or(true, |o| o.is_finished()) }
}

impl<T: Subscription> Subscription for MutArc<Option<T>> {
  fn unsubscribe(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref().as_ref().map_or(true, |s| s.is_closed()) }
}
