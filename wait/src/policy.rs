use std::time::Duration;

/// How a waiter suspends between two evaluations of its condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
  /// Yield to the executor for exactly one tick, then re-check.
  ///
  /// Use this for cheap, local conditions.
  #[default]
  Yield,

  /// Sleep for the given duration, then re-check.
  ///
  /// Use this for expensive or remote conditions so they are not
  /// busy-polled.
  Delay(Duration),

  /// Sleep for the given duration, then yield one more tick, then re-check.
  ///
  /// The extra yield guarantees the check runs on a fresh executor tick
  /// after the timer fires rather than inside the timer's wake-up.
  DelayThenYield(Duration),
}

impl PollPolicy {
  /// The timed part of the suspension, if any.
  pub fn polling_delay(&self) -> Option<Duration> {
    match *self {
      PollPolicy::Yield => None,
      PollPolicy::Delay(d) | PollPolicy::DelayThenYield(d) => Some(d),
    }
  }
}
