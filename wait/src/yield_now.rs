// src/yield_now.rs

//! A single-tick cooperative yield that works on any executor.

use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

/// Yields control back to the executor exactly once.
///
/// The returned future wakes its own task and returns `Pending` on the first
/// poll, then completes on the next. No timer is involved, so the task is
/// rescheduled on the very next executor tick.
pub fn yield_now() -> YieldNow {
  YieldNow { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct YieldNow {
  yielded: bool,
}

impl Future for YieldNow {
  type Output = ();

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    if self.yielded {
      return Poll::Ready(());
    }
    self.yielded = true;
    cx.waker().wake_by_ref();
    Poll::Pending
  }
}
