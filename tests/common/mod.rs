//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::time::Duration;

use cbfuture::{Error, Future};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Upper bound on how long a test waits for a handler to fire.
pub const PATIENCE: Duration = Duration::from_secs(5);

/// One handler invocation, in the order it happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<T> {
    Success(T),
    Failure(String),
    Complete(Result<T, String>),
}

/// Registers all three handlers on `future` and returns the stream of
/// invocations.
pub fn observe<T>(future: &mut Future<T>) -> UnboundedReceiver<Event<T>>
where
    T: Clone + Send + 'static,
{
    let (sender, receiver) = unbounded_channel();
    let on_success = sender.clone();
    let on_failure = sender.clone();
    future
        .on_success(move |value| {
            let _ = on_success.send(Event::Success(value.clone()));
        })
        .on_failure(move |error| {
            let _ = on_failure.send(Event::Failure(error.message()));
        })
        .on_complete(move |outcome| {
            let outcome = outcome.cloned().map_err(|error| error.message());
            let _ = sender.send(Event::Complete(outcome));
        });
    receiver
}

/// Waits for the next handler invocation.
pub async fn next<T>(receiver: &mut UnboundedReceiver<Event<T>>) -> Event<T> {
    tokio::time::timeout(PATIENCE, receiver.recv())
        .await
        .expect("handler did not fire in time")
        .expect("handler channel closed")
}

/// Asserts that no further handler invocation arrives within `window`.
pub async fn assert_quiet<T: std::fmt::Debug>(
    receiver: &mut UnboundedReceiver<Event<T>>,
    window: Duration,
) {
    if let Ok(Some(event)) = tokio::time::timeout(window, receiver.recv()).await {
        panic!("unexpected handler invocation: {event:?}");
    }
}

/// A future that succeeds with `value` after `delay`.
pub fn delayed<T>(value: T, delay: Duration) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
{
    Future::new(move |resolver| {
        let value = value.clone();
        cbfuture::runtime::handle().spawn(async move {
            tokio::time::sleep(delay).await;
            resolver.succeed(value);
        });
    })
}

/// A future that fails with `message` after `delay`.
pub fn delayed_failure<T>(message: &'static str, delay: Duration) -> Future<T>
where
    T: Send + 'static,
{
    Future::new(move |resolver| {
        cbfuture::runtime::handle().spawn(async move {
            tokio::time::sleep(delay).await;
            resolver.fail(Error::msg(message));
        });
    })
}
