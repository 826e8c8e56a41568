use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  rc::{MutArc, RcDeref, RcDerefMut},
  subscription::{BoxSubscription, Subscription},
};

/// Races `sources` against each other.
///
/// Every source is subscribed in order. The first one to emit any signal
/// wins: the others are cancelled, sources not yet subscribed are skipped,
/// and from then on only the winner is relayed. Racing nothing completes at
/// once.
///
/// ```
/// use rxflux::prelude::*;
///
/// let scheduler = TestScheduler::default();
/// let slow = observable::of("slow").delay_subscription(Duration::from_millis(100), scheduler.clone());
/// let fast = observable::of("fast").delay_subscription(Duration::from_millis(10), scheduler.clone());
///
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let c_seen = seen.clone();
/// observable::first_with_signal([slow.box_it(), fast.box_it()]).subscribe(move |v| c_seen.lock().push(v));
/// scheduler.flush();
/// assert_eq!(*seen.lock(), ["fast"]);
/// ```
pub fn first_with_signal<I, S>(sources: I) -> FirstWithSignalOp<S>
where
  I: IntoIterator<Item = S>,
{
  FirstWithSignalOp { sources: sources.into_iter().collect() }
}

#[derive(Clone)]
pub struct FirstWithSignalOp<S> {
  sources: Vec<S>,
}

impl<Item, Err, O, S> Observable<Item, Err, O> for FirstWithSignalOp<S>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FirstWithSignalObserver<O>>,
  S::Unsub: Send + 'static,
{
  type Unsub = FirstWithSignalSubscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let race = FirstWithSignalSubscription(MutArc::own(Race {
      winner: None,
      closed: false,
      slots: self.sources.iter().map(|_| None).collect(),
    }));
    if self.sources.is_empty() {
      observer.complete();
      return race;
    }
    let observer = MutArc::own(Some(observer));
    for (index, source) in self.sources.into_iter().enumerate() {
      if race.0.rc_deref().winner.is_some() || observer.is_finished() {
        break;
      }
      let racer = FirstWithSignalObserver { index, observer: observer.clone(), race: race.clone() };
      let subscription = source.actual_subscribe(racer);
      race.store(index, BoxSubscription::new(subscription));
    }
    race
  }
}

impl<Item, Err, S> ObservableExt<Item, Err> for FirstWithSignalOp<S> where S: ObservableExt<Item, Err> {}

struct Race {
  winner: Option<usize>,
  closed: bool,
  slots: Vec<Option<BoxSubscription>>,
}

enum Claim {
  Lost,
  Leading,
  Won(Vec<BoxSubscription>),
}

/// Cancels every raced source that is still running.
#[derive(Clone)]
pub struct FirstWithSignalSubscription(MutArc<Race>);

impl FirstWithSignalSubscription {
  fn store(&self, index: usize, subscription: BoxSubscription) {
    let mut race = self.0.rc_deref_mut();
    let lost = race.winner.is_some_and(|w| w != index);
    if race.closed || lost {
      drop(race);
      subscription.unsubscribe();
    } else {
      race.slots[index] = Some(subscription);
    }
  }

  fn claim(&self, index: usize) -> Claim {
    let mut race = self.0.rc_deref_mut();
    match race.winner {
      Some(w) if w == index => Claim::Leading,
      Some(_) => Claim::Lost,
      None => {
        race.winner = Some(index);
        let losers = race
          .slots
          .iter_mut()
          .enumerate()
          .filter(|(i, _)| *i != index)
          .filter_map(|(_, slot)| slot.take())
          .collect();
        Claim::Won(losers)
      }
    }
  }

  fn is_lost(&self, index: usize) -> bool { self.0.rc_deref().winner.is_some_and(|w| w != index) }
}

impl Subscription for FirstWithSignalSubscription {
  fn unsubscribe(self) {
    let slots = {
      let mut race = self.0.rc_deref_mut();
      race.closed = true;
      std::mem::take(&mut race.slots)
    };
    for subscription in slots.into_iter().flatten() {
      subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

pub struct FirstWithSignalObserver<O> {
  index: usize,
  observer: MutArc<Option<O>>,
  race: FirstWithSignalSubscription,
}

impl<O> FirstWithSignalObserver<O> {
  /// Returns `false` if another source already won.
  fn enter(&self) -> bool {
    match self.race.claim(self.index) {
      Claim::Lost => false,
      Claim::Leading => true,
      Claim::Won(losers) => {
        tracing::debug!(winner = self.index, cancelled = losers.len(), "first_with_signal race decided");
        for subscription in losers {
          subscription.unsubscribe();
        }
        true
      }
    }
  }
}

impl<Item, Err, O> Observer<Item, Err> for FirstWithSignalObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.enter() {
      self.observer.next(value);
    }
  }

  fn error(self, err: Err) {
    if self.enter() {
      self.observer.error(err);
    }
  }

  fn complete(self) {
    if self.enter() {
      self.observer.complete();
    }
  }

  fn is_finished(&self) -> bool { self.race.is_lost(self.index) || self.observer.is_finished() }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn fast_source_wins_and_slow_is_never_subscribed() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let slow = observable::from_iter(["a", "b", "c"]).delay_subscription(Duration::from_millis(100), scheduler.clone());
    let fast = observable::from_iter(["d", "e", "f"]).delay_subscription(Duration::from_millis(10), scheduler.clone());
    observable::first_with_signal([slow.box_it(), fast.box_it()]).subscribe(move |v| c_seen.lock().push(v));
    assert_eq!(scheduler.pending(), 2);

    scheduler.advance_by(Duration::from_millis(10));
    assert_eq!(*seen.lock(), ["d", "e", "f"]);
    assert_eq!(scheduler.pending(), 0);
  }

  fn counted(
    subscribed: Arc<AtomicUsize>, value: i32,
  ) -> observable::CreateObservable<impl FnOnce(&mut dyn Emitter<i32, RxError>) + Clone, i32> {
    observable::create(move |emitter| {
      subscribed.fetch_add(1, Ordering::SeqCst);
      emitter.next(value);
      emitter.complete();
    })
  }

  #[test]
  fn synchronous_winner_skips_later_sources() {
    let subscribed = Arc::new(AtomicUsize::new(0));
    let mut seen = vec![];
    observable::first_with_signal([counted(subscribed.clone(), 1), counted(subscribed.clone(), 2)])
      .subscribe(|v| seen.push(v));
    assert_eq!(seen, [1]);
    assert_eq!(subscribed.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn error_can_win() {
    let scheduler = TestScheduler::default();
    let err = Arc::new(Mutex::new(None));
    let c_err = err.clone();
    let slow = observable::of(1).delay_subscription(Duration::from_millis(50), scheduler.clone());
    let failing = observable::throw_err(RxError::source("down")).delay_subscription(Duration::from_millis(5), scheduler.clone());
    observable::first_with_signal([slow.box_it(), failing.box_it()])
      .subscribe_err(|_| panic!("no values expected"), move |e| *c_err.lock() = Some(e));
    scheduler.flush();
    assert_eq!(*err.lock(), Some(RxError::source("down")));
  }

  #[test]
  fn racing_nothing_completes() {
    let mut completed = false;
    observable::first_with_signal(Vec::<observable::OfObservable<i32>>::new())
      .subscribe_all(|_| {}, |_| {}, || completed = true);
    assert!(completed);
  }

  #[test]
  fn or_races_two_sequences() {
    let scheduler = TestScheduler::default();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    observable::interval(Duration::from_millis(30), scheduler.clone())
      .map(|v| v * 100)
      .or(observable::interval(Duration::from_millis(20), scheduler.clone()))
      .take(3)
      .subscribe(move |v| c_seen.lock().push(v));
    scheduler.flush();
    assert_eq!(*seen.lock(), [0, 1, 2]);
    assert_eq!(scheduler.pending(), 0);
  }

  #[test]
  fn cancelling_stops_every_racer() {
    let scheduler = TestScheduler::default();
    let a = observable::of(1).delay_subscription(Duration::from_millis(5), scheduler.clone());
    let b = observable::of(2).delay_subscription(Duration::from_millis(6), scheduler.clone());
    let handle = observable::first_with_signal([a, b]).subscribe(|_| panic!("cancelled"));
    assert_eq!(scheduler.pending(), 2);
    handle.unsubscribe();
    assert_eq!(scheduler.pending(), 0);
    scheduler.flush();
  }
}
