//! Prelude module for convenient imports

pub use crate::{
  error::{RxError, VerifyError},
  observable::{
    self, BoxOp, EmptyObservable, NeverObservable, Observable, ObservableExt, OfObservable, Single,
    SubscribeHandle, ThrowObservable,
  },
  observer::{Emitter, Observer, Signal},
  of_sequence,
  scheduler::{Duration, ImmediateScheduler, Instant, Scheduler, TaskHandle, TestScheduler},
  subscription::{Subscription, SubscriptionGuard},
  verifier::StepVerifier,
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{PoolScheduler, SingleScheduler};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
