// src/waiter.rs

use crate::builder::WaiterBuilder;
use crate::error::WaitError;
use crate::policy::PollPolicy;
use crate::runtime::Timer;
use crate::yield_now::yield_now;

use core::fmt;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

/// What a completed wait observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSummary {
  /// Number of times the condition was invoked, including the final `true`.
  pub evaluations: usize,
}

impl WaitSummary {
  /// Number of suspensions the wait went through before the condition held.
  pub fn suspensions(&self) -> usize {
    self.evaluations.saturating_sub(1)
  }
}

#[derive(Debug, Clone, Copy)]
enum WaitState {
  Init,
  Polling,
  Done,
}

/// The resolved suspension strategy, with the timer bound in when a delay
/// is part of it.
#[derive(Clone)]
pub(crate) enum Suspend {
  Yield,
  Delay {
    timer: Arc<dyn Timer>,
    duration: Duration,
    then_yield: bool,
  },
}

impl Suspend {
  async fn suspend(&self) {
    match self {
      Suspend::Yield => yield_now().await,
      Suspend::Delay {
        timer,
        duration,
        then_yield,
      } => {
        timer.delay(*duration).await;
        if *then_yield {
          yield_now().await;
        }
      }
    }
  }

  fn policy(&self) -> PollPolicy {
    match *self {
      Suspend::Yield => PollPolicy::Yield,
      Suspend::Delay {
        duration,
        then_yield: false,
        ..
      } => PollPolicy::Delay(duration),
      Suspend::Delay {
        duration,
        then_yield: true,
        ..
      } => PollPolicy::DelayThenYield(duration),
    }
  }
}

/// Waits for a caller-supplied condition to hold, then runs a terminal action.
///
/// A `ConditionWaiter` holds no state about any particular wait; it only
/// carries the [`PollPolicy`] (and the timer that policy needs). It is cheap to
/// clone and may drive any number of independent waits.
///
/// Every wait follows the same sequence: the optional `init` runs once, then
/// the condition is evaluated, and each `false` result is followed by one
/// suspension according to the policy. The first `true` result runs the
/// terminal action once and completes the future. A condition that never
/// holds keeps the future pending forever; drop it to stop waiting.
///
/// # Examples
///
/// ```
/// use fibre_wait::ConditionWaiter;
/// use std::cell::Cell;
///
/// let ticks = Cell::new(0);
/// let done = Cell::new(false);
///
/// let waiter = ConditionWaiter::new();
/// let summary = futures_executor::block_on(waiter.wait(
///   || done.set(true),
///   || {
///     ticks.set(ticks.get() + 1);
///     ticks.get() >= 3
///   },
/// ));
///
/// assert!(done.get());
/// assert_eq!(summary.evaluations, 3);
/// ```
#[derive(Clone)]
pub struct ConditionWaiter {
  suspend: Suspend,
}

impl fmt::Debug for ConditionWaiter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConditionWaiter")
      .field("policy", &self.suspend.policy())
      .finish_non_exhaustive()
  }
}

impl Default for ConditionWaiter {
  fn default() -> Self {
    Self::new()
  }
}

impl ConditionWaiter {
  /// Creates a tight-polling waiter that yields one executor tick between checks.
  pub fn new() -> Self {
    Self {
      suspend: Suspend::Yield,
    }
  }

  /// Returns a builder for configuring polling delays and timers.
  pub fn builder() -> WaiterBuilder {
    WaiterBuilder::new()
  }

  pub(crate) fn from_suspend(suspend: Suspend) -> Self {
    Self { suspend }
  }

  /// The suspension strategy used between condition checks.
  pub fn policy(&self) -> PollPolicy {
    self.suspend.policy()
  }

  /// Polls `condition` until it returns `true`, then invokes `react` once.
  pub fn wait<R, C>(&self, react: R, mut condition: C) -> impl Future<Output = WaitSummary>
  where
    R: FnOnce(),
    C: FnMut() -> bool,
  {
    let fut = self.try_wait(
      move || {
        react();
        Ok::<_, Infallible>(())
      },
      move || Ok(condition()),
    );
    async move { into_ok(fut.await) }
  }

  /// Runs `init` immediately, then polls `condition` until it returns `true`
  /// and invokes `exit` once.
  ///
  /// `init` runs synchronously inside this call, before the returned future
  /// is first polled.
  pub fn wait_with_init<I, X, C>(
    &self,
    init: I,
    exit: X,
    mut condition: C,
  ) -> impl Future<Output = WaitSummary>
  where
    I: FnOnce(),
    X: FnOnce(),
    C: FnMut() -> bool,
  {
    let fut = self.try_wait_with_init(
      move || {
        init();
        Ok::<_, Infallible>(())
      },
      move || {
        exit();
        Ok(())
      },
      move || Ok(condition()),
    );
    async move { into_ok(fut.await) }
  }

  /// Polls `condition` until it returns `true`, without a terminal action.
  pub fn until<C>(&self, condition: C) -> impl Future<Output = WaitSummary>
  where
    C: FnMut() -> bool,
  {
    self.wait(|| {}, condition)
  }

  /// Fallible form of [`wait`](Self::wait).
  ///
  /// An error from `condition` ends the wait immediately and `react` never
  /// runs.
  pub fn try_wait<R, C, E>(
    &self,
    react: R,
    condition: C,
  ) -> impl Future<Output = Result<WaitSummary, WaitError<E>>>
  where
    R: FnOnce() -> Result<(), E>,
    C: FnMut() -> Result<bool, E>,
  {
    let suspend = self.suspend.clone();
    async move {
      let summary = poll_until(&suspend, condition).await?;
      finish(react, summary)
    }
  }

  /// Fallible form of [`wait_with_init`](Self::wait_with_init).
  ///
  /// `init` runs inside this call. If it fails, the returned future resolves
  /// to [`WaitError::Init`] on its first poll without ever evaluating
  /// `condition`.
  pub fn try_wait_with_init<I, X, C, E>(
    &self,
    init: I,
    exit: X,
    condition: C,
  ) -> impl Future<Output = Result<WaitSummary, WaitError<E>>>
  where
    I: FnOnce() -> Result<(), E>,
    X: FnOnce() -> Result<(), E>,
    C: FnMut() -> Result<bool, E>,
  {
    trace!(state = ?WaitState::Init, "running init");
    let started = init().map_err(WaitError::Init);
    let suspend = self.suspend.clone();
    async move {
      started?;
      let summary = poll_until(&suspend, condition).await?;
      finish(exit, summary)
    }
  }
}

async fn poll_until<C, E>(suspend: &Suspend, mut condition: C) -> Result<WaitSummary, WaitError<E>>
where
  C: FnMut() -> Result<bool, E>,
{
  let mut evaluations = 0;
  loop {
    evaluations += 1;
    match condition() {
      Ok(true) => return Ok(WaitSummary { evaluations }),
      Ok(false) => {}
      Err(source) => {
        debug!(evaluation = evaluations, "condition failed, aborting wait");
        return Err(WaitError::Condition {
          evaluation: evaluations,
          source,
        });
      }
    }
    trace!(state = ?WaitState::Polling, evaluations, "condition not met, suspending");
    suspend.suspend().await;
  }
}

fn finish<X, E>(exit: X, summary: WaitSummary) -> Result<WaitSummary, WaitError<E>>
where
  X: FnOnce() -> Result<(), E>,
{
  exit().map_err(WaitError::Exit)?;
  debug!(state = ?WaitState::Done, evaluations = summary.evaluations, "condition met");
  Ok(summary)
}

fn into_ok<T>(result: Result<T, WaitError<Infallible>>) -> T {
  match result {
    Ok(value) => value,
    Err(err) => match err.into_inner() {},
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures_util::future::{self, BoxFuture};
  use futures_util::task::noop_waker_ref;
  use parking_lot::Mutex;
  use std::cell::{Cell, RefCell};
  use std::pin::Pin;
  use std::task::{Context, Poll};

  fn tick<F: Future + Unpin>(fut: &mut F) -> Poll<F::Output> {
    let mut cx = Context::from_waker(noop_waker_ref());
    Pin::new(fut).poll(&mut cx)
  }

  // Resolves every delay on the spot and remembers what was asked for.
  #[derive(Default)]
  struct ImmediateTimer {
    requested: Mutex<Vec<Duration>>,
  }

  impl Timer for ImmediateTimer {
    fn delay(&self, duration: Duration) -> BoxFuture<'static, ()> {
      self.requested.lock().push(duration);
      Box::pin(future::ready(()))
    }
  }

  fn delayed(timer: Arc<ImmediateTimer>, duration: Duration, then_yield: bool) -> ConditionWaiter {
    ConditionWaiter::from_suspend(Suspend::Delay {
      timer,
      duration,
      then_yield,
    })
  }

  #[test]
  fn true_immediately_never_suspends() {
    let reacted = Cell::new(0);
    let mut fut = Box::pin(ConditionWaiter::new().wait(|| reacted.set(reacted.get() + 1), || true));
    assert_eq!(tick(&mut fut), Poll::Ready(WaitSummary { evaluations: 1 }));
    assert_eq!(reacted.get(), 1);
  }

  #[test]
  fn one_evaluation_per_tick_when_yielding() {
    let evaluations = Cell::new(0);
    let reacted = Cell::new(false);
    let mut fut = Box::pin(ConditionWaiter::new().wait(
      || reacted.set(true),
      || {
        evaluations.set(evaluations.get() + 1);
        evaluations.get() > 4
      },
    ));

    for expected in 1..=4 {
      assert!(tick(&mut fut).is_pending());
      assert_eq!(evaluations.get(), expected);
      assert!(!reacted.get());
    }
    match tick(&mut fut) {
      Poll::Ready(summary) => {
        assert_eq!(summary.evaluations, 5);
        assert_eq!(summary.suspensions(), 4);
      }
      Poll::Pending => panic!("condition held but wait is still pending"),
    }
    assert!(reacted.get());
  }

  #[test]
  fn never_true_never_reacts() {
    let reacted = Cell::new(false);
    let mut fut = Box::pin(ConditionWaiter::new().wait(|| reacted.set(true), || false));
    for _ in 0..1_000 {
      assert!(tick(&mut fut).is_pending());
    }
    assert!(!reacted.get());
  }

  #[test]
  fn delay_without_yield_suspends_only_through_timer() {
    let timer = Arc::new(ImmediateTimer::default());
    let waiter = delayed(Arc::clone(&timer), Duration::from_millis(25), false);
    let evaluations = Cell::new(0);
    let mut fut = Box::pin(waiter.until(|| {
      evaluations.set(evaluations.get() + 1);
      evaluations.get() == 4
    }));

    // The timer is always ready, so nothing else can make the loop pend.
    assert_eq!(tick(&mut fut), Poll::Ready(WaitSummary { evaluations: 4 }));
    assert_eq!(*timer.requested.lock(), vec![Duration::from_millis(25); 3]);
  }

  #[test]
  fn delay_then_yield_adds_a_tick_per_iteration() {
    let timer = Arc::new(ImmediateTimer::default());
    let waiter = delayed(Arc::clone(&timer), Duration::from_millis(10), true);
    assert_eq!(waiter.policy(), PollPolicy::DelayThenYield(Duration::from_millis(10)));

    let evaluations = Cell::new(0);
    let mut fut = Box::pin(waiter.until(|| {
      evaluations.set(evaluations.get() + 1);
      evaluations.get() == 4
    }));

    for _ in 0..3 {
      assert!(tick(&mut fut).is_pending());
    }
    assert_eq!(tick(&mut fut), Poll::Ready(WaitSummary { evaluations: 4 }));
    assert_eq!(timer.requested.lock().len(), 3);
  }

  #[test]
  fn init_runs_at_call_time_before_any_check() {
    let log = RefCell::new(Vec::new());
    let fut = ConditionWaiter::new().wait_with_init(
      || log.borrow_mut().push("init"),
      || log.borrow_mut().push("exit"),
      || {
        log.borrow_mut().push("check");
        true
      },
    );
    assert_eq!(*log.borrow(), vec!["init"]);

    let mut fut = Box::pin(fut);
    assert!(tick(&mut fut).is_ready());
    assert_eq!(*log.borrow(), vec!["init", "check", "exit"]);
  }

  #[test]
  fn failing_init_skips_condition_and_exit() {
    let checked = Cell::new(false);
    let exited = Cell::new(false);
    let mut fut = Box::pin(ConditionWaiter::new().try_wait_with_init(
      || Err("no session"),
      || {
        exited.set(true);
        Ok(())
      },
      || {
        checked.set(true);
        Ok(true)
      },
    ));

    match tick(&mut fut) {
      Poll::Ready(Err(WaitError::Init(e))) => assert_eq!(e, "no session"),
      _ => panic!("expected an init error"),
    }
    assert!(!checked.get());
    assert!(!exited.get());
  }

  #[test]
  fn failing_condition_reports_evaluation() {
    let reacted = Cell::new(false);
    let evaluations = Cell::new(0);
    let mut fut = Box::pin(ConditionWaiter::new().try_wait(
      || {
        reacted.set(true);
        Ok(())
      },
      || {
        evaluations.set(evaluations.get() + 1);
        if evaluations.get() == 3 {
          Err("lost connection")
        } else {
          Ok(false)
        }
      },
    ));

    assert!(tick(&mut fut).is_pending());
    assert!(tick(&mut fut).is_pending());
    match tick(&mut fut) {
      Poll::Ready(Err(WaitError::Condition { evaluation, source })) => {
        assert_eq!(evaluation, 3);
        assert_eq!(source, "lost connection");
      }
      _ => panic!("expected a condition error"),
    }
    assert!(!reacted.get());
  }

  #[test]
  fn failing_exit_is_reported() {
    let mut fut = Box::pin(ConditionWaiter::new().try_wait(|| Err(7u8), || Ok(true)));
    match tick(&mut fut) {
      Poll::Ready(Err(WaitError::Exit(code))) => assert_eq!(code, 7),
      _ => panic!("expected an exit error"),
    }
  }

  #[test]
  fn debug_shows_policy() {
    let waiter = ConditionWaiter::new();
    assert_eq!(format!("{:?}", waiter), "ConditionWaiter { policy: Yield, .. }");
  }
}
