//! Cooperative condition waiting for async Rust.
//!
//! Fibre Wait polls a caller-supplied predicate until it returns `true`, then
//! runs a terminal action exactly once. Between checks the waiting task
//! suspends cooperatively, either for a single executor tick or for a polling
//! delay, so no thread is ever blocked or spun.
//!
//! # Core Concepts
//!
//! - **Condition**: a zero-argument closure returning `bool`, re-evaluated
//!   after every suspension.
//! - **Init**: an optional action run once, synchronously, when the wait is
//!   created and before the condition is ever checked.
//! - **Terminal action** (`react` / `exit`): run once, right after the
//!   condition first holds.
//! - **Poll policy**: how the task suspends between checks. See [`PollPolicy`].
//!
//! The ordering `init` → condition checks → terminal action is strict. No two
//! steps of one wait overlap, and a failing step stops everything after it.
//!
//! # Quick Start
//!
//! ```
//! use fibre_wait::wait_for_condition;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ready = Arc::new(AtomicBool::new(false));
//!
//! let flag = Arc::clone(&ready);
//! tokio::spawn(async move { flag.store(true, Ordering::Release) });
//!
//! let check = Arc::clone(&ready);
//! wait_for_condition(
//!   || println!("ready!"),
//!   move || check.load(Ordering::Acquire),
//! )
//! .await;
//! # }
//! ```
//!
//! For anything beyond the four free functions (custom timers, configuration,
//! fallible callbacks with delays), build a [`ConditionWaiter`].

pub mod builder;
pub mod error;
pub mod policy;
pub mod runtime;
pub mod waiter;
pub mod yield_now;

#[cfg(feature = "serde")]
pub mod config;

pub use builder::WaiterBuilder;
pub use error::{BuildError, WaitError};
pub use policy::PollPolicy;
pub use runtime::Timer;
#[cfg(feature = "tokio")]
pub use runtime::TokioTimer;
pub use waiter::{ConditionWaiter, WaitSummary};
pub use yield_now::yield_now;

use futures_util::FutureExt;
use std::future::Future;
#[cfg(feature = "tokio")]
use std::{sync::Arc, time::Duration};

#[cfg(feature = "tokio")]
use waiter::Suspend;

/// Polls `condition`, yielding one executor tick after each `false`, and
/// invokes `react` once it returns `true`.
///
/// For a remote or expensive condition prefer
/// [`wait_for_condition_delayed`], which does not busy-poll.
pub fn wait_for_condition<R, C>(react: R, condition: C) -> impl Future<Output = ()>
where
  R: FnOnce(),
  C: FnMut() -> bool,
{
  ConditionWaiter::new().wait(react, condition).map(drop)
}

/// Polls `condition`, sleeping `polling_delay` after each `false`, and
/// invokes `react` once it returns `true`.
#[cfg(feature = "tokio")]
pub fn wait_for_condition_delayed<R, C>(
  react: R,
  condition: C,
  polling_delay: Duration,
) -> impl Future<Output = ()>
where
  R: FnOnce(),
  C: FnMut() -> bool,
{
  tokio_waiter(polling_delay, false).wait(react, condition).map(drop)
}

/// Runs `init` immediately, then polls `condition` with a one-tick yield
/// after each `false`, and invokes `exit` once it returns `true`.
///
/// `init` runs inside this call, before the returned future is polled.
pub fn wait_for_condition_with_init<I, X, C>(init: I, exit: X, condition: C) -> impl Future<Output = ()>
where
  I: FnOnce(),
  X: FnOnce(),
  C: FnMut() -> bool,
{
  ConditionWaiter::new().wait_with_init(init, exit, condition).map(drop)
}

/// Runs `init` immediately, then polls `condition` and invokes `exit` once
/// it returns `true`.
///
/// After each `false` the task sleeps for `polling_delay` and then yields
/// one more executor tick, so every re-check happens on a fresh tick after
/// the timer has fired.
#[cfg(feature = "tokio")]
pub fn wait_for_condition_with_init_delayed<I, X, C>(
  init: I,
  exit: X,
  condition: C,
  polling_delay: Duration,
) -> impl Future<Output = ()>
where
  I: FnOnce(),
  X: FnOnce(),
  C: FnMut() -> bool,
{
  tokio_waiter(polling_delay, true)
    .wait_with_init(init, exit, condition)
    .map(drop)
}

/// Fallible form of [`wait_for_condition`].
pub fn try_wait_for_condition<R, C, E>(
  react: R,
  condition: C,
) -> impl Future<Output = Result<(), WaitError<E>>>
where
  R: FnOnce() -> Result<(), E>,
  C: FnMut() -> Result<bool, E>,
{
  ConditionWaiter::new()
    .try_wait(react, condition)
    .map(|result| result.map(drop))
}

/// Fallible form of [`wait_for_condition_with_init`].
///
/// A failing `init` resolves the returned future to [`WaitError::Init`]
/// without evaluating `condition`.
pub fn try_wait_for_condition_with_init<I, X, C, E>(
  init: I,
  exit: X,
  condition: C,
) -> impl Future<Output = Result<(), WaitError<E>>>
where
  I: FnOnce() -> Result<(), E>,
  X: FnOnce() -> Result<(), E>,
  C: FnMut() -> Result<bool, E>,
{
  ConditionWaiter::new()
    .try_wait_with_init(init, exit, condition)
    .map(|result| result.map(drop))
}

#[cfg(feature = "tokio")]
fn tokio_waiter(duration: Duration, then_yield: bool) -> ConditionWaiter {
  ConditionWaiter::from_suspend(Suspend::Delay {
    timer: Arc::new(TokioTimer),
    duration,
    then_yield,
  })
}
