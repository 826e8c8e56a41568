//! Step-by-step verification of a sequence.
//!
//! A [`StepVerifier`] subscribes to a sequence, checks the signals it
//! receives against a script of expectations, and reports the first one
//! that does not hold. Nothing happens until one of the `verify*` methods is
//! called.
//!
//! In virtual time the verifier drives a [`TestScheduler`] itself: whenever
//! it waits for a signal it jumps the clock to the next pending task, so
//! sequences spanning hours verify in microseconds.
//!
//! ```
//! use rxflux::prelude::*;
//!
//! let scheduler = TestScheduler::default();
//! let source = observable::interval(Duration::from_secs(1), scheduler.clone()).take(3);
//! let elapsed = StepVerifier::with_virtual_time(scheduler, source)
//!   .expect_next_seq([0, 1, 2])
//!   .verify_complete();
//! assert_eq!(elapsed, Duration::from_secs(3));
//! ```
use std::{
  fmt::Debug,
  sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError},
};

use crate::{
  error::VerifyError,
  observable::{Observable, ObservableExt},
  observer::{Observer, Signal, Subscriber},
  scheduler::{Duration, Instant, TestScheduler},
  subscription::Subscription,
  type_hint::TypeHint,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

enum Clock {
  Real,
  Virtual(TestScheduler),
}

enum Step<Item> {
  Next { expectation: String, check: Box<dyn FnMut(&Item) -> bool> },
  Await(Duration),
  Cancel,
}

enum Terminal<Err> {
  Complete,
  Error { expectation: String, check: Box<dyn FnOnce(&Err) -> bool> },
  None,
}

pub struct StepVerifier<S, Item, Err> {
  source: S,
  clock: Clock,
  timeout: Duration,
  steps: Vec<Step<Item>>,
  _hint: TypeHint<Err>,
}

impl<S, Item, Err> StepVerifier<S, Item, Err> {
  /// Verifies `source` in real time.
  pub fn create(source: S) -> Self { Self::with_clock(source, Clock::Real) }

  /// Verifies `source` on the virtual clock of `scheduler`. Every timed
  /// operator in `source` must use the same scheduler.
  pub fn with_virtual_time(scheduler: TestScheduler, source: S) -> Self {
    Self::with_clock(source, Clock::Virtual(scheduler))
  }

  fn with_clock(source: S, clock: Clock) -> Self {
    StepVerifier { source, clock, timeout: DEFAULT_TIMEOUT, steps: vec![], _hint: TypeHint::new() }
  }

  /// How long a real-time verification may wait in total. Ignored in
  /// virtual time.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Expects the next signal to be a value equal to `expected`.
  pub fn expect_next(self, expected: Item) -> Self
  where
    Item: PartialEq + Debug + 'static,
  {
    let expectation = format!("expect_next({expected:?})");
    self.push_next(expectation, move |v| *v == expected)
  }

  /// Expects the next values to be `expected`, in order.
  pub fn expect_next_seq(self, expected: impl IntoIterator<Item = Item>) -> Self
  where
    Item: PartialEq + Debug + 'static,
  {
    expected.into_iter().fold(self, Self::expect_next)
  }

  /// Expects the next signal to be a value satisfying `predicate`.
  pub fn expect_next_matches<F>(self, predicate: F) -> Self
  where
    F: FnMut(&Item) -> bool + 'static,
  {
    self.push_next("expect_next_matches".to_owned(), predicate)
  }

  /// Expects `count` more values, whatever they are.
  pub fn expect_next_count(mut self, count: usize) -> Self {
    for _ in 0..count {
      self = self.push_next(format!("expect_next_count({count})"), |_| true);
    }
    self
  }

  /// Lets `duration` pass: the virtual clock is advanced, a real-time
  /// verification sleeps.
  pub fn then_await(mut self, duration: Duration) -> Self {
    self.steps.push(Step::Await(duration));
    self
  }

  /// Cancels the subscription. Finish with [`verify`](Self::verify).
  pub fn then_cancel(mut self) -> Self {
    self.steps.push(Step::Cancel);
    self
  }

  fn push_next(mut self, expectation: String, check: impl FnMut(&Item) -> bool + 'static) -> Self {
    self.steps.push(Step::Next { expectation, check: Box::new(check) });
    self
  }
}

impl<S, Item, Err> StepVerifier<S, Item, Err>
where
  S: ObservableExt<Item, Err> + Observable<Item, Err, Subscriber<Recorder<Item, Err>>>,
  Item: Debug,
  Err: Debug,
{
  /// Runs the script and expects the sequence to complete afterwards.
  /// Returns the elapsed time.
  ///
  /// # Panics
  ///
  /// With the failure message if an expectation does not hold.
  pub fn verify_complete(self) -> Duration { self.try_verify_complete().unwrap_or_else(|e| panic!("{e}")) }

  /// Runs the script and expects the sequence to fail afterwards.
  ///
  /// # Panics
  ///
  /// With the failure message if an expectation does not hold.
  pub fn verify_error(self) -> Duration { self.try_verify_error().unwrap_or_else(|e| panic!("{e}")) }

  /// Runs the script and expects an error satisfying `predicate`.
  ///
  /// # Panics
  ///
  /// With the failure message if an expectation does not hold.
  pub fn verify_error_matches<F>(self, predicate: F) -> Duration
  where
    F: FnOnce(&Err) -> bool + 'static,
  {
    self.try_verify_error_matches(predicate).unwrap_or_else(|e| panic!("{e}"))
  }

  /// Runs the script without a terminal expectation, then cancels the
  /// subscription if the script did not.
  ///
  /// # Panics
  ///
  /// With the failure message if an expectation does not hold.
  pub fn verify(self) -> Duration { self.try_verify().unwrap_or_else(|e| panic!("{e}")) }

  pub fn try_verify_complete(self) -> Result<Duration, VerifyError> { self.run(Terminal::Complete) }

  pub fn try_verify_error(self) -> Result<Duration, VerifyError> {
    self.run(Terminal::Error { expectation: "verify_error".to_owned(), check: Box::new(|_| true) })
  }

  pub fn try_verify_error_matches<F>(self, predicate: F) -> Result<Duration, VerifyError>
  where
    F: FnOnce(&Err) -> bool + 'static,
  {
    self.run(Terminal::Error { expectation: "verify_error_matches".to_owned(), check: Box::new(predicate) })
  }

  pub fn try_verify(self) -> Result<Duration, VerifyError> { self.run(Terminal::None) }

  fn run(self, terminal: Terminal<Err>) -> Result<Duration, VerifyError> {
    let Self { source, clock, timeout, steps, .. } = self;
    let started = Started::now(&clock);
    let (tx, rx) = channel();
    // Every early return drops the guard and cancels the subscription.
    let mut guard = Some(source.subscribe_with(Recorder(tx)).unsubscribe_when_dropped());
    let mut inbox = Inbox { rx, clock, deadline: Instant::now() + timeout, timeout };

    let mut step_no = 0;
    for step in steps {
      step_no += 1;
      match step {
        Step::Next { expectation, mut check } => {
          let signal = inbox.next_signal(&expectation)?;
          if !matches!(&signal, Signal::Next(v) if check(v)) {
            return Err(mismatch(step_no, expectation, &signal));
          }
        }
        Step::Await(duration) => inbox.wait(duration),
        Step::Cancel => drop(guard.take()),
      }
    }

    step_no += 1;
    match terminal {
      Terminal::Complete => match inbox.next_signal("verify_complete")? {
        Signal::Complete => {}
        actual => return Err(mismatch(step_no, "verify_complete".to_owned(), &actual)),
      },
      Terminal::Error { expectation, check } => {
        let signal = inbox.next_signal(&expectation)?;
        let accepted = match &signal {
          Signal::Error(e) => check(e),
          _ => false,
        };
        if !accepted {
          return Err(mismatch(step_no, expectation, &signal));
        }
      }
      Terminal::None => drop(guard.take()),
    }
    Ok(started.elapsed(&inbox.clock))
  }
}

fn mismatch<Item: Debug, Err: Debug>(step: usize, expectation: String, actual: &Signal<Item, Err>) -> VerifyError {
  VerifyError::Mismatch { step, expectation, actual: format!("got {actual:?}") }
}

enum Started {
  Real(Instant),
  Virtual(Duration),
}

impl Started {
  fn now(clock: &Clock) -> Self {
    match clock {
      Clock::Real => Started::Real(Instant::now()),
      Clock::Virtual(scheduler) => Started::Virtual(scheduler.now()),
    }
  }

  fn elapsed(&self, clock: &Clock) -> Duration {
    match (self, clock) {
      (Started::Virtual(at), Clock::Virtual(scheduler)) => scheduler.now().saturating_sub(*at),
      (Started::Real(at), _) => at.elapsed(),
      (Started::Virtual(_), Clock::Real) => Duration::ZERO,
    }
  }
}

/// Waits for signals on behalf of the verifier.
struct Inbox<Item, Err> {
  rx: Receiver<Signal<Item, Err>>,
  clock: Clock,
  deadline: Instant,
  timeout: Duration,
}

impl<Item, Err> Inbox<Item, Err> {
  fn next_signal(&mut self, expectation: &str) -> Result<Signal<Item, Err>, VerifyError> {
    match &self.clock {
      Clock::Virtual(scheduler) => loop {
        match self.rx.try_recv() {
          Ok(signal) => return Ok(signal),
          Err(TryRecvError::Disconnected) => {
            return Err(VerifyError::Cancelled { expectation: expectation.to_owned() })
          }
          Err(TryRecvError::Empty) => {
            if !scheduler.advance_to_next() {
              return Err(VerifyError::Stalled { expectation: expectation.to_owned() });
            }
          }
        }
      },
      Clock::Real => {
        let left = self.deadline.saturating_duration_since(Instant::now());
        self.rx.recv_timeout(left).map_err(|e| match e {
          RecvTimeoutError::Timeout => {
            VerifyError::Timeout { expectation: expectation.to_owned(), timeout: self.timeout }
          }
          RecvTimeoutError::Disconnected => VerifyError::Cancelled { expectation: expectation.to_owned() },
        })
      }
    }
  }

  fn wait(&self, duration: Duration) {
    match &self.clock {
      Clock::Virtual(scheduler) => scheduler.advance_by(duration),
      Clock::Real => std::thread::sleep(duration),
    }
  }
}

/// Forwards every signal to the verifier's channel.
pub struct Recorder<Item, Err>(Sender<Signal<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for Recorder<Item, Err> {
  fn next(&mut self, value: Item) { let _ = self.0.send(Signal::Next(value)); }

  fn error(self, err: Err) { let _ = self.0.send(Signal::Error(err)); }

  fn complete(self) { let _ = self.0.send(Signal::Complete); }

  #[inline]
  fn is_finished(&self) -> bool { false }
}
