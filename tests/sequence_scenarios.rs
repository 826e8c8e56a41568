//! End-to-end scenarios: sources, operator chains and collectors verified
//! with `StepVerifier`, on virtual time wherever a timer is involved.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use rxflux::{prelude::*, subscription::BoxSubscription};

const FRUITS: [&str; 5] = ["Apple", "Orange", "Grape", "Banana", "Strawberry"];
const PARKS: [&str; 5] = ["Yellowstone", "Yosemite", "Grand Canyon", "Zion", "Grand Teton"];
const ANIMALS: [&str; 5] = ["aardvark", "elephant", "koala", "eagle", "kangaroo"];

#[derive(Debug, Clone, PartialEq)]
struct Player {
  first_name: String,
  last_name: String,
}

impl Player {
  fn parse(full_name: &str) -> Player {
    let mut parts = full_name.split_whitespace();
    Player {
      first_name: parts.next().unwrap_or_default().to_owned(),
      last_name: parts.next().unwrap_or_default().to_owned(),
    }
  }

  fn is(&self, first_name: &str, last_name: &str) -> bool {
    self.first_name == first_name && self.last_name == last_name
  }
}

#[test]
fn of_sequence_emits_in_order() {
  let mut printed = vec![];
  let fruits = of_sequence!["Apple", "Orange", "Grape", "Banana", "Strawberry"];
  fruits.clone().subscribe(|f| printed.push(format!("Here's some fruit: {f}")));
  assert_eq!(printed.len(), 5);

  StepVerifier::create(fruits)
    .expect_next("Apple")
    .expect_next("Orange")
    .expect_next("Grape")
    .expect_next("Banana")
    .expect_next("Strawberry")
    .verify_complete();
}

#[test]
fn from_array_and_vec() {
  StepVerifier::create(observable::from_iter(FRUITS)).expect_next_seq(FRUITS).verify_complete();

  let fruit_list: Vec<String> = FRUITS.iter().map(|f| f.to_string()).collect();
  StepVerifier::create(observable::from_iter(fruit_list.clone()))
    .expect_next_seq(fruit_list)
    .verify_complete();
}

#[test]
fn generator_is_consumed_once() {
  let fruits = observable::from_generator(FRUITS.into_iter());
  StepVerifier::create(fruits.clone()).expect_next_seq(FRUITS).verify_complete();
  StepVerifier::create(fruits).verify_error_matches(|e| matches!(e, RxError::Source(_)));
}

#[test]
fn range_counts_up() {
  StepVerifier::create(observable::range(1, 5)).expect_next_seq([1, 2, 3, 4, 5]).verify_complete();
}

#[test]
fn interval_ticks_from_zero() {
  let scheduler = TestScheduler::default();
  let ticks = observable::interval(Duration::from_secs(1), scheduler.clone()).take(5);
  let elapsed = StepVerifier::with_virtual_time(scheduler, ticks)
    .expect_next_seq([0, 1, 2, 3, 4])
    .verify_complete();
  assert_eq!(elapsed, Duration::from_secs(5));
}

#[test]
fn merge_interleaves_by_time() {
  let scheduler = TestScheduler::default();
  let characters = observable::from_iter(["Garfield", "Kojak", "Barbossa"])
    .delay_elements(Duration::from_millis(500), scheduler.clone());
  let foods = observable::from_iter(["Lasagna", "Lollipops", "Apples"])
    .delay_subscription(Duration::from_millis(250), scheduler.clone())
    .delay_elements(Duration::from_millis(500), scheduler.clone());

  let elapsed = StepVerifier::with_virtual_time(scheduler, characters.merge_with(foods))
    .expect_next("Garfield")
    .expect_next("Lasagna")
    .expect_next("Kojak")
    .expect_next("Lollipops")
    .expect_next("Barbossa")
    .expect_next("Apples")
    .verify_complete();
  assert_eq!(elapsed, Duration::from_millis(1750));
}

#[test]
fn zip_combines_by_index() {
  let characters = observable::from_iter(["Garfield", "Kojak", "Barbossa"]);
  let foods = observable::from_iter(["Lasagna", "Lollipops", "Apples"]);

  StepVerifier::create(characters.clone().zip_with(foods.clone()))
    .expect_next_matches(|(c, f)| *c == "Garfield" && *f == "Lasagna")
    .expect_next_matches(|(c, f)| *c == "Kojak" && *f == "Lollipops")
    .expect_next_matches(|(c, f)| *c == "Barbossa" && *f == "Apples")
    .verify_complete();

  StepVerifier::create(observable::zip(characters, foods, |c, f| format!("{c} eats {f}")))
    .expect_next("Garfield eats Lasagna".to_owned())
    .expect_next("Kojak eats Lollipops".to_owned())
    .expect_next("Barbossa eats Apples".to_owned())
    .verify_complete();
}

#[test]
fn first_with_signal_picks_the_fast_source() {
  let scheduler = TestScheduler::default();
  let slow = observable::from_iter(["tortoise", "snail", "sloth"])
    .delay_subscription(Duration::from_millis(100), scheduler.clone());
  let fast = observable::from_iter(["hare", "cheetah", "squirrel"]);

  let first = observable::first_with_signal([slow.box_it(), fast.box_it()]);
  let elapsed = StepVerifier::with_virtual_time(scheduler.clone(), first)
    .expect_next_seq(["hare", "cheetah", "squirrel"])
    .verify_complete();
  assert_eq!(elapsed, Duration::ZERO);
  assert_eq!(scheduler.pending(), 0);
}

#[test]
fn skip_by_count_and_by_time() {
  let rest = ["two", "skip a few", "ninety nine", "one hundred"];
  let words = observable::from_iter(["one", "two", "skip a few", "ninety nine", "one hundred"]);

  StepVerifier::create(words.clone().skip(1)).expect_next_seq(rest).verify_complete();

  let scheduler = TestScheduler::default();
  let timed = words
    .delay_elements(Duration::from_secs(1), scheduler.clone())
    .skip_for(Duration::from_secs(2), scheduler.clone());
  let elapsed = StepVerifier::with_virtual_time(scheduler, timed).expect_next_seq(rest).verify_complete();
  assert_eq!(elapsed, Duration::from_secs(5));
}

#[test]
fn take_by_count_and_by_time() {
  let first_four = &PARKS[..4];

  StepVerifier::create(observable::from_iter(PARKS).take(4))
    .expect_next_seq(first_four.iter().copied())
    .verify_complete();

  let scheduler = TestScheduler::default();
  let timed = observable::from_iter(PARKS)
    .delay_elements(Duration::from_secs(1), scheduler.clone())
    .take_for(Duration::from_millis(4500), scheduler.clone());
  let elapsed = StepVerifier::with_virtual_time(scheduler.clone(), timed)
    .expect_next_seq(first_four.iter().copied())
    .verify_complete();
  assert_eq!(elapsed, Duration::from_millis(4500));
  assert_eq!(scheduler.pending(), 0);
}

#[test]
fn filter_and_distinct() {
  StepVerifier::create(observable::from_iter(PARKS).filter(|p| !p.contains('t')))
    .expect_next_seq(["Grand Canyon", "Zion"])
    .verify_complete();

  StepVerifier::create(observable::from_iter(["dog", "cat", "pig", "dog", "pig", "bird"]).distinct())
    .expect_next_seq(["dog", "cat", "pig", "bird"])
    .verify_complete();
}

#[test]
fn map_to_players() {
  let players = observable::from_iter(["Michael Jordan", "Scottie Pippen", "Steve Kerr"]).map(Player::parse);
  StepVerifier::create(players)
    .expect_next_matches(|p: &Player| p.is("Michael", "Jordan"))
    .expect_next_matches(|p: &Player| p.is("Scottie", "Pippen"))
    .expect_next_matches(|p: &Player| p.is("Steve", "Kerr"))
    .verify_complete();
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn flat_map_on_a_single_worker() {
  let worker = SingleScheduler::new().unwrap();
  let players = observable::from_iter(["Michael Jordan", "Scottie Pippen", "Steve Kerr"])
    .flat_map(move |n| Single::just(n).map(Player::parse).subscribe_on(worker.clone()));
  StepVerifier::create(players)
    .timeout(Duration::from_secs(5))
    .expect_next_matches(|p: &Player| p.is("Michael", "Jordan"))
    .expect_next_matches(|p: &Player| p.is("Scottie", "Pippen"))
    .expect_next_matches(|p: &Player| p.is("Steve", "Kerr"))
    .verify_complete();
}

#[test]
fn buffer_groups_values() {
  let fruits = observable::from_iter(["apple", "orange", "banana", "kiwi", "strawberry"]);
  StepVerifier::create(fruits.buffer(2))
    .expect_next(vec!["apple", "orange"])
    .expect_next(vec!["banana", "kiwi"])
    .expect_next(vec!["strawberry"])
    .verify_complete();
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn buffer_then_flat_map_in_parallel() {
  let upper = observable::from_iter(["apple", "orange", "banana", "kiwi", "strawberry"])
    .buffer(3)
    .flat_map(|group| {
      observable::from_iter(group)
        .map(|f| f.to_uppercase())
        .subscribe_on(PoolScheduler::default())
        .log("buffer_then_flat_map")
    })
    .collect_list()
    .block();
  let mut upper = upper.unwrap().unwrap();
  upper.sort();
  assert_eq!(upper, ["APPLE", "BANANA", "KIWI", "ORANGE", "STRAWBERRY"]);
}

#[test]
fn collect_list_and_map() {
  let fruits = ["apple", "orange", "banana", "kiwi", "strawberry"];
  StepVerifier::create(observable::from_iter(fruits).collect_list())
    .expect_next(fruits.to_vec())
    .verify_complete();

  let by_initial = observable::from_iter(["aardvark", "elephant", "koala"])
    .collect_map(|a| a.chars().next().unwrap_or_default());
  StepVerifier::create(by_initial)
    .expect_next_matches(|map: &HashMap<char, &str>| {
      map.len() == 3 && map[&'a'] == "aardvark" && map[&'e'] == "elephant" && map[&'k'] == "koala"
    })
    .verify_complete();
}

#[test]
fn all_and_any() {
  let animals = observable::from_iter(ANIMALS);

  StepVerifier::create(animals.clone().all(|a| a.contains('a'))).expect_next(true).verify_complete();
  StepVerifier::create(animals.clone().all(|a| a.contains('k'))).expect_next(false).verify_complete();
  StepVerifier::create(animals.clone().any(|a| a.contains('t'))).expect_next(true).verify_complete();
  StepVerifier::create(animals.any(|a| a.contains('v'))).expect_next(false).verify_complete();
}

#[test]
fn errors_cancel_sibling_timers() {
  let scheduler = TestScheduler::default();
  let ticks = observable::interval(Duration::from_millis(10), scheduler.clone());
  let failing = observable::throw_err(RxError::source("boom"))
    .delay_subscription(Duration::from_millis(25), scheduler.clone());
  StepVerifier::with_virtual_time(scheduler.clone(), ticks.merge_with(failing))
    .expect_next_seq([0, 1])
    .verify_error_matches(|e| *e == RxError::source("boom"));
  assert_eq!(scheduler.pending(), 0);
}

type Slot = Arc<Mutex<Option<BoxSubscription>>>;

/// A `next` callback that records values and cancels its own subscription,
/// parked in `slot`, once `stop_at` arrives.
fn cancel_on<T>(stop_at: T, seen: Arc<Mutex<Vec<T>>>, slot: Slot) -> impl FnMut(T) + Send + 'static
where
  T: PartialEq + Send + 'static,
{
  move |v| {
    let stop = v == stop_at;
    seen.lock().push(v);
    if stop {
      let handle = slot.lock().take();
      if let Some(handle) = handle {
        assert!(!handle.is_closed());
        handle.unsubscribe();
      }
    }
  }
}

#[test]
fn cancel_from_inside_next_on_timed_sources() {
  let scheduler = TestScheduler::default();
  let (seen, slot) = (Arc::new(Mutex::new(vec![])), Slot::default());
  let ticks = observable::interval(Duration::from_secs(1), scheduler.clone())
    .subscribe(cancel_on(1, seen.clone(), slot.clone()));
  *slot.lock() = Some(BoxSubscription::new(ticks));
  scheduler.advance_by(Duration::from_secs(5));
  assert_eq!(*seen.lock(), [0, 1]);
  assert_eq!(scheduler.pending(), 0);

  let (seen, slot) = (Arc::new(Mutex::new(vec![])), Slot::default());
  let completed = Arc::new(Mutex::new(false));
  let c_completed = completed.clone();
  let once = observable::timer("ring", Duration::from_secs(1), scheduler.clone()).subscribe_all(
    cancel_on("ring", seen.clone(), slot.clone()),
    |_| {},
    move || *c_completed.lock() = true,
  );
  *slot.lock() = Some(BoxSubscription::new(once));
  scheduler.advance_by(Duration::from_secs(2));
  assert_eq!(*seen.lock(), ["ring"]);
  assert!(!*completed.lock());
  assert_eq!(scheduler.pending(), 0);
}

#[test]
fn cancel_from_inside_next_through_operators() {
  let scheduler = TestScheduler::default();
  let (seen, slot) = (Arc::new(Mutex::new(vec![])), Slot::default());
  let merged = observable::interval(Duration::from_millis(10), scheduler.clone())
    .merge_with(observable::interval(Duration::from_millis(15), scheduler.clone()).map(|v| v + 100))
    .subscribe(cancel_on(100, seen.clone(), slot.clone()));
  *slot.lock() = Some(BoxSubscription::new(merged));
  scheduler.advance_by(Duration::from_secs(1));
  assert_eq!(*seen.lock(), [0, 100]);
  assert_eq!(scheduler.pending(), 0);

  let (seen, slot) = (Arc::new(Mutex::new(vec![])), Slot::default());
  let clock = scheduler.clone();
  let flattened = observable::from_iter([1usize, 2])
    .flat_map(move |n| observable::interval(Duration::from_millis(10), clock.clone()).map(move |v| n * 10 + v))
    .subscribe(cancel_on(11, seen.clone(), slot.clone()));
  *slot.lock() = Some(BoxSubscription::new(flattened));
  scheduler.advance_by(Duration::from_secs(1));
  assert_eq!(*seen.lock(), [10, 20, 11]);
  assert_eq!(scheduler.pending(), 0);

  let (seen, slot) = (Arc::new(Mutex::new(vec![])), Slot::default());
  let delayed = observable::from_iter(0..5)
    .delay_elements(Duration::from_secs(1), scheduler.clone())
    .subscribe(cancel_on(2, seen.clone(), slot.clone()));
  *slot.lock() = Some(BoxSubscription::new(delayed));
  scheduler.advance_by(Duration::from_secs(10));
  assert_eq!(*seen.lock(), [0, 1, 2]);
  assert_eq!(scheduler.pending(), 0);
}
