// src/error.rs

use thiserror::Error;

/// Errors that can occur when building a [`ConditionWaiter`](crate::ConditionWaiter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// A polling delay was given as a negative number of milliseconds.
  #[error("polling delay cannot be negative: {0}ms")]
  NegativeDelay(i64),
  /// `yield_after_delay` was requested without configuring a polling delay.
  #[error("yield after delay requires a polling delay")]
  YieldWithoutDelay,
  /// A polling delay was configured, but no `Timer` was provided and the
  /// default `tokio` feature is not enabled.
  #[error("a polling delay requires a timer or the 'tokio' feature")]
  TimerRequired,
}

/// Error returned by the fallible `try_*` wait operations.
///
/// Identifies which callback failed and carries the caller's own error. Once
/// any variant is produced, no later callback of the same wait has run.
#[derive(Debug, Error)]
pub enum WaitError<E> {
  /// The `init` callback failed. The condition was never evaluated.
  #[error("init callback failed")]
  Init(#[source] E),
  /// The condition failed on its `evaluation`-th invocation (1-based).
  #[error("condition failed on evaluation {evaluation}")]
  Condition {
    evaluation: usize,
    #[source]
    source: E,
  },
  /// The terminal callback failed after the condition was met.
  #[error("exit callback failed")]
  Exit(#[source] E),
}

impl<E> WaitError<E> {
  /// Consumes the error, returning the callback's error.
  #[inline]
  pub fn into_inner(self) -> E {
    match self {
      WaitError::Init(e) | WaitError::Exit(e) => e,
      WaitError::Condition { source, .. } => source,
    }
  }

  /// Returns `true` if the condition callback failed.
  pub fn is_condition(&self) -> bool {
    matches!(self, WaitError::Condition { .. })
  }
}
