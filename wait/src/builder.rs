use crate::error::BuildError;
use crate::policy::PollPolicy;
use crate::runtime::{self, Timer};
use crate::waiter::{ConditionWaiter, Suspend};

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A builder for creating [`ConditionWaiter`] instances.
///
/// Configuration is validated in [`build`](WaiterBuilder::build), so a bad
/// setting fails at construction rather than leaving a wait stuck polling.
#[derive(Default)]
pub struct WaiterBuilder {
  polling_delay: Option<Duration>,
  negative_delay: Option<i64>,
  yield_after_delay: bool,
  timer: Option<Arc<dyn Timer>>,
}

impl fmt::Debug for WaiterBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WaiterBuilder")
      .field("polling_delay", &self.polling_delay)
      .field("yield_after_delay", &self.yield_after_delay)
      .field("has_timer", &self.timer.is_some())
      .finish_non_exhaustive()
  }
}

impl WaiterBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sleeps for `delay` between condition checks instead of yielding.
  pub fn polling_delay(mut self, delay: Duration) -> Self {
    self.polling_delay = Some(delay);
    self.negative_delay = None;
    self
  }

  /// Sets the polling delay from a signed millisecond count.
  ///
  /// A negative value is rejected by [`build`](Self::build) with
  /// [`BuildError::NegativeDelay`].
  pub fn polling_delay_millis(mut self, millis: i64) -> Self {
    match u64::try_from(millis) {
      Ok(ms) => {
        self.polling_delay = Some(Duration::from_millis(ms));
        self.negative_delay = None;
      }
      Err(_) => {
        self.polling_delay = None;
        self.negative_delay = Some(millis);
      }
    }
    self
  }

  /// After each delay, also yield one executor tick before re-checking.
  ///
  /// Requires a polling delay.
  pub fn yield_after_delay(mut self, enabled: bool) -> Self {
    self.yield_after_delay = enabled;
    self
  }

  /// Applies every setting of `policy`, replacing any earlier delay settings.
  pub fn policy(mut self, policy: PollPolicy) -> Self {
    self.polling_delay = policy.polling_delay();
    self.negative_delay = None;
    self.yield_after_delay = matches!(policy, PollPolicy::DelayThenYield(_));
    self
  }

  /// Sets the timer used for polling delays.
  ///
  /// Without one, delays use `tokio::time::sleep` when the `tokio` feature
  /// is enabled.
  pub fn timer<T: Timer>(mut self, timer: T) -> Self {
    self.timer = Some(Arc::new(timer));
    self
  }

  /// Validates the configuration and creates the waiter.
  pub fn build(self) -> Result<ConditionWaiter, BuildError> {
    if let Some(millis) = self.negative_delay {
      return Err(BuildError::NegativeDelay(millis));
    }

    let suspend = match self.polling_delay {
      None if self.yield_after_delay => return Err(BuildError::YieldWithoutDelay),
      None => Suspend::Yield,
      Some(duration) => {
        let timer = match self.timer {
          Some(timer) => timer,
          None => runtime::default_timer()?,
        };
        Suspend::Delay {
          timer,
          duration,
          then_yield: self.yield_after_delay,
        }
      }
    };

    Ok(ConditionWaiter::from_suspend(suspend))
  }
}
