//! # rxflux: push-based reactive sequences
//!
//! A sequence is a lazy value: nothing happens until it is subscribed, and
//! every subscription replays the whole pipeline independently. Signals flow
//! downstream as zero or more `next` values followed by at most one
//! terminal `error` or `complete`.
//!
//! ```rust
//! use rxflux::prelude::*;
//!
//! let mut seen = vec![];
//! observable::from_iter(["dog", "cat", "pig", "dog", "bird"])
//!   .distinct()
//!   .map(str::to_uppercase)
//!   .subscribe(|v| seen.push(v));
//! assert_eq!(seen, ["DOG", "CAT", "PIG", "BIRD"]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A sequence that can be subscribed by an observer |
//! | [`ObservableExt`] | The operator and subscribe surface of every sequence |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` signals |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Decides where and when timed work runs |
//! | [`StepVerifier`] | Scripted assertions over a sequence |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): thread-pool schedulers on `futures`
//! - **`tokio-scheduler`**: a scheduler spawning onto a tokio runtime
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`StepVerifier`]: verifier::StepVerifier

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subscription;
pub(crate) mod type_hint;
pub mod verifier;

pub use prelude::*;
