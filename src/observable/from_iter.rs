use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates a sequence that emits every value of `iter`, then completes.
///
/// Each subscription iterates a fresh clone of `iter`, so the sequence can be
/// subscribed any number of times. Emission stops early once the observer
/// is finished.
///
/// ```
/// use rxflux::prelude::*;
///
/// let mut sum = 0;
/// observable::from_iter(0..10).subscribe(|v| sum += v);
/// assert_eq!(sum, 45);
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<Iter, O> Observable<Iter::Item, RxError, O> for ObservableIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub { drain(self.0.into_iter(), observer) }
}

impl<Iter> ObservableExt<Iter::Item, RxError> for ObservableIter<Iter> where Iter: IntoIterator {}

fn drain<I, O>(iter: I, mut observer: O)
where
  I: Iterator,
  O: Observer<I::Item, RxError>,
{
  for v in iter {
    if observer.is_finished() {
      return;
    }
    observer.next(v);
  }
  observer.complete();
}

/// Creates a sequence of `count` consecutive integers starting at `start`.
///
/// # Panics
///
/// If the last value would overflow `i64`.
pub fn range(start: i64, count: usize) -> ObservableIter<std::ops::Range<i64>> {
  let end = i64::try_from(count).ok().and_then(|count| start.checked_add(count));
  match end {
    Some(end) => from_iter(start..end),
    None => panic!("range({start}, {count}) overflows i64"),
  }
}

/// Creates a sequence over a single-pass iterator.
///
/// The first subscription drains `iter`. Clones share it, so any later
/// subscription terminates with [`RxError::Source`] instead of silently
/// completing empty.
pub fn from_generator<I>(iter: I) -> GeneratorObservable<I::IntoIter>
where
  I: IntoIterator,
{
  GeneratorObservable(Arc::new(Mutex::new(Some(iter.into_iter()))))
}

pub struct GeneratorObservable<I>(Arc<Mutex<Option<I>>>);

impl<I> Clone for GeneratorObservable<I> {
  fn clone(&self) -> Self { GeneratorObservable(self.0.clone()) }
}

impl<I, O> Observable<I::Item, RxError, O> for GeneratorObservable<I>
where
  I: Iterator,
  O: Observer<I::Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let iter = self.0.lock().take();
    match iter {
      Some(iter) => drain(iter, observer),
      None => observer.error(RxError::source("generator was already consumed by an earlier subscription")),
    }
  }
}

impl<I: Iterator> ObservableExt<I::Item, RxError> for GeneratorObservable<I> {}
