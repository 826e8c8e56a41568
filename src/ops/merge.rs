use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{MultiSubscription, Subscription},
};

/// Combines two sequences into one by relaying values from both as they
/// arrive.
///
/// Completes once both sources completed. An error from either side is
/// passed on at once and cancels the other side.
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  pub(crate) source1: S1,
  pub(crate) source2: S2,
}

impl<Item, Err, O, S1, S2> Observable<Item, Err, O> for MergeOp<S1, S2>
where
  O: Observer<Item, Err>,
  S1: Observable<Item, Err, MergeObserver<O>>,
  S2: Observable<Item, Err, MergeObserver<O>>,
  S1::Unsub: Send + 'static,
  S2::Unsub: Send + 'static,
{
  type Unsub = MultiSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let sources = MultiSubscription::default();
    let state = MutArc::own(MergeState { observer: Some(observer), completed: 0 });
    let merge_observer = MergeObserver { state: state.clone(), sources: sources.clone() };
    sources.append(self.source1.actual_subscribe(merge_observer));
    // A synchronous first source may already have ended everything.
    let live = state.rc_deref().observer.as_ref().is_some_and(|o| !o.is_finished());
    if live {
      let merge_observer = MergeObserver { state, sources: sources.clone() };
      sources.append(self.source2.actual_subscribe(merge_observer));
    }
    sources
  }
}

impl<Item, Err, S1, S2> ObservableExt<Item, Err> for MergeOp<S1, S2>
where
  S1: ObservableExt<Item, Err>,
  S2: ObservableExt<Item, Err>,
{
}

pub struct MergeState<O> {
  observer: Option<O>,
  completed: usize,
}

pub struct MergeObserver<O> {
  state: MutArc<MergeState<O>>,
  sources: MultiSubscription,
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.state.rc_deref_mut().observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(self, err: Err) {
    let observer = self.state.rc_deref_mut().observer.take();
    if let Some(observer) = observer {
      self.sources.unsubscribe();
      observer.error(err);
    }
  }

  fn complete(self) {
    let observer = {
      let mut state = self.state.rc_deref_mut();
      state.completed += 1;
      if state.completed == 2 { state.observer.take() } else { None }
    };
    if let Some(observer) = observer {
      observer.complete();
    }
  }

  fn is_finished(&self) -> bool {
    self.state.rc_deref().observer.as_ref().map_or(true, |o| o.is_finished())
  }
}
