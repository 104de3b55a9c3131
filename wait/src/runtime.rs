use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::error::BuildError;

/// A trait for scheduling a timed suspension on an asynchronous runtime.
///
/// Delayed waiters call [`Timer::delay`] once per poll iteration and await the
/// returned future before re-checking their condition.
pub trait Timer: Send + Sync + 'static {
  /// Returns a future that completes once `duration` has elapsed.
  fn delay(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// A [`Timer`] backed by `tokio::time::sleep`.
///
/// The returned futures must be polled from inside a Tokio runtime with the
/// time driver enabled.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio")]
impl Timer for TokioTimer {
  fn delay(&self, duration: Duration) -> BoxFuture<'static, ()> {
    Box::pin(tokio::time::sleep(duration))
  }
}

/// The timer used when a delay is configured but no explicit timer was given.
#[cfg(feature = "tokio")]
pub(crate) fn default_timer() -> Result<Arc<dyn Timer>, BuildError> {
  Ok(Arc::new(TokioTimer))
}

#[cfg(not(feature = "tokio"))]
pub(crate) fn default_timer() -> Result<Arc<dyn Timer>, BuildError> {
  Err(BuildError::TimerRequired)
}
