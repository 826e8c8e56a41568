use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Collects values into `Vec`s of `count`. When the source completes, a
/// non-empty partial buffer is emitted before completion. On error the
/// partial buffer is dropped.
#[derive(Clone)]
pub struct BufferOp<S> {
  source: S,
  count: usize,
}

impl<S> BufferOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self {
    assert!(count > 0, "buffer size must be greater than zero");
    BufferOp { source, count }
  }
}

impl<Item, Err, O, S> Observable<Vec<Item>, Err, O> for BufferOp<S>
where
  O: Observer<Vec<Item>, Err>,
  S: Observable<Item, Err, BufferObserver<O, Item>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(BufferObserver {
      observer,
      buffer: Vec::with_capacity(self.count),
      count: self.count,
    })
  }
}

impl<Item, Err, S> ObservableExt<Vec<Item>, Err> for BufferOp<S> where S: ObservableExt<Item, Err> {}

pub struct BufferObserver<O, Item> {
  observer: O,
  buffer: Vec<Item>,
  count: usize,
}

impl<Item, Err, O> Observer<Item, Err> for BufferObserver<O, Item>
where
  O: Observer<Vec<Item>, Err>,
{
  fn next(&mut self, value: Item) {
    self.buffer.push(value);
    if self.buffer.len() >= self.count {
      let full = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.count));
      self.observer.next(full);
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    if !self.buffer.is_empty() {
      self.observer.next(self.buffer);
    }
    self.observer.complete();
  }

  #[inline]
  fn is_finished(&self) -> bool { self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn emits_full_and_trailing_buffers() {
    let mut seen = vec![];
    observable::from_iter([1, 2, 3, 4, 5]).buffer(2).subscribe(|v| seen.push(v));
    assert_eq!(seen, vec![vec![1, 2], vec![3, 4], vec![5]]);
  }

  #[test]
  fn exact_multiple() {
    let mut seen = vec![];
    observable::from_iter([1, 2, 3, 4]).buffer(2).subscribe(|v| seen.push(v));
    assert_eq!(seen, vec![vec![1, 2], vec![3, 4]]);
  }

  #[test]
  fn empty_source_emits_nothing() {
    let mut seen = vec![];
    let mut completed = false;
    observable::empty::<i32>().buffer(3).subscribe_all(|v| seen.push(v), |_| {}, || completed = true);
    assert!(seen.is_empty());
    assert!(completed);
  }

  #[test]
  fn error_drops_partial_buffer() {
    let mut seen = vec![];
    let mut err = None;
    observable::create(|emitter| {
      emitter.next(1);
      emitter.next(2);
      emitter.next(3);
      emitter.error(RxError::source("boom"));
    })
    .buffer(2)
    .subscribe_err(|v| seen.push(v), |e| err = Some(e));
    assert_eq!(seen, vec![vec![1, 2]]);
    assert_eq!(err, Some(RxError::source("boom")));
  }

  #[test]
  #[should_panic(expected = "buffer size must be greater than zero")]
  fn zero_size_panics() { let _ = observable::of(1).buffer(0); }
}
