#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::task::noop_waker_ref;

pub const SHORT_TIMEOUT: Duration = Duration::from_millis(500);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(3);

/// Installs a test subscriber once; `RUST_LOG=fibre_wait=trace` shows the poll loop.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

/// Polls `fut` once, standing in for a single executor tick.
pub fn tick<F: Future + Unpin>(fut: &mut F) -> Poll<F::Output> {
  let mut cx = Context::from_waker(noop_waker_ref());
  Pin::new(fut).poll(&mut cx)
}
