//! The one-shot result handle handed to a starter.

use std::fmt;

use crate::error::{Error, FutureError};

type Deliver<T> = Box<dyn FnOnce(Result<T, Error>) + Send>;

/// Delivers the single outcome of one start of a [`Future`](crate::Future).
///
/// A starter receives a fresh `Resolver` every time the future is started and
/// must complete it exactly once. Every completing method consumes the
/// resolver, so reporting twice, or reporting both a value and an error, does
/// not compile:
///
/// ```rust,compile_fail
/// use cbfuture::Future;
///
/// let future: Future<i32> = Future::new(|resolver| {
///     resolver.succeed(1);
///     resolver.succeed(2);
/// });
/// ```
///
/// Dropping a resolver without completing it fails the future with
/// [`FutureError::Abandoned`].
pub struct Resolver<T> {
    deliver: Option<Deliver<T>>,
}

impl<T> Resolver<T> {
    pub(crate) fn new<F>(deliver: F) -> Self
    where
        F: FnOnce(Result<T, Error>) + Send + 'static,
    {
        Self {
            deliver: Some(Box::new(deliver)),
        }
    }

    /// Completes the future with a success value.
    pub fn succeed(self, value: T) {
        self.complete(Ok(value));
    }

    /// Completes the future with a failure.
    pub fn fail(self, error: impl Into<Error>) {
        self.complete(Err(error.into()));
    }

    /// Completes the future with an outcome.
    pub fn complete(mut self, outcome: Result<T, Error>) {
        if let Some(deliver) = self.deliver.take() {
            deliver(outcome);
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        let Some(deliver) = self.deliver.take() else {
            return;
        };
        if std::thread::panicking() {
            tracing::warn!("resolver dropped while panicking; outcome discarded");
            return;
        }
        tracing::debug!("resolver dropped without a result");
        deliver(Err(Error::new(FutureError::Abandoned)));
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Resolver")
            .field("pending", &self.deliver.is_some())
            .finish()
    }
}
