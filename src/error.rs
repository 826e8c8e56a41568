//! Error types carried by the `Error` signal of every built-in source.
//!
//! Operators are generic over the error type; only sources and the
//! scheduler-aware operators pin it to [`RxError`] (or require
//! `Err: From<RxError>`).
use std::time::Duration;

/// Errors produced by the engine itself.
///
/// A signal that arrives after its subscription was cancelled is not an
/// error: it is dropped by [`Subscriber`](crate::observer::Subscriber) and
/// never reaches user code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
  /// A source could not produce its values, e.g. a single-pass generator
  /// that was subscribed a second time.
  #[error("source error: {0}")]
  Source(String),

  /// A user supplied closure (mapper, predicate, combiner) failed.
  #[error("transform error: {0}")]
  Transform(String),

  /// A scheduler refused to run submitted work.
  #[error("scheduling error: {0}")]
  Scheduling(String),
}

impl RxError {
  pub fn source(context: impl Into<String>) -> Self { Self::Source(context.into()) }

  pub fn transform(context: impl Into<String>) -> Self { Self::Transform(context.into()) }

  pub fn scheduling(context: impl Into<String>) -> Self { Self::Scheduling(context.into()) }

  pub(crate) fn scheduler_disposed(name: &str) -> Self {
    Self::Scheduling(format!("{name} has been disposed"))
  }
}

/// Failures reported by [`StepVerifier`](crate::verifier::StepVerifier).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
  #[error("expectation \"{expectation}\" failed at step {step}: {actual}")]
  Mismatch { step: usize, expectation: String, actual: String },

  #[error("expectation \"{expectation}\" timed out after {timeout:?}")]
  Timeout { expectation: String, timeout: Duration },

  #[error("expectation \"{expectation}\" failed: no pending virtual time task can make progress")]
  Stalled { expectation: String },

  #[error("expectation \"{expectation}\" cannot be met after the subscription was cancelled")]
  Cancelled { expectation: String },
}
