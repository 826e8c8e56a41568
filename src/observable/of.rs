use crate::{
  error::RxError,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Creates a sequence of one value followed by completion.
///
/// ```
/// use rxflux::prelude::*;
///
/// let mut seen = None;
/// observable::of(123).subscribe(|v| seen = Some(v));
/// assert_eq!(seen, Some(123));
/// ```
pub fn of<Item>(v: Item) -> OfObservable<Item> { OfObservable(v) }

#[derive(Clone)]
pub struct OfObservable<Item>(pub(crate) Item);

impl<Item, O> Observable<Item, RxError, O> for OfObservable<Item>
where
  O: Observer<Item, RxError>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) -> Self::Unsub {
    observer.next(self.0);
    observer.complete();
  }
}

impl<Item> ObservableExt<Item, RxError> for OfObservable<Item> {}
