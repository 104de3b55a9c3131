use serde::{Deserialize, Serialize};

use crate::builder::WaiterBuilder;

/// Externally supplied waiter settings.
///
/// Deserializes from any serde format. Missing fields take their defaults,
/// so an empty document yields a tight-polling waiter. Values are checked
/// when the builder is built, not when they are parsed.
///
/// ```
/// # use fibre_wait::{config::WaitConfig, error::BuildError, ConditionWaiter};
/// let config: WaitConfig = serde_json::from_str(r#"{ "polling_delay_ms": -250 }"#).unwrap();
/// let err = ConditionWaiter::builder().from_config(&config).build().unwrap_err();
/// assert_eq!(err, BuildError::NegativeDelay(-250));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
  /// Milliseconds to sleep between checks. Absent means yield-only polling.
  pub polling_delay_ms: Option<i64>,
  /// Yield one extra executor tick after each delay.
  pub yield_after_delay: bool,
}

impl WaiterBuilder {
  /// Applies the settings in `config` on top of this builder.
  pub fn from_config(self, config: &WaitConfig) -> Self {
    let builder = match config.polling_delay_ms {
      Some(ms) => self.polling_delay_millis(ms),
      None => self,
    };
    builder.yield_after_delay(config.yield_after_delay)
  }
}
