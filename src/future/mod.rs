//! Lazy, re-startable futures driven by callbacks.
//!
//! A [`Future<T>`] wraps a *starter*: a closure that begins an asynchronous
//! computation and reports its single outcome through a [`Resolver`]. Nothing
//! happens until the future is started with [`Future::end`]; every start runs
//! the starter again from scratch.
//!
//! Outcomes are observed through three single-slot handlers:
//!
//! - [`Future::on_success`] receives the value,
//! - [`Future::on_failure`] receives the [`Error`],
//! - [`Future::on_complete`] receives either, tagged as a `Result`.
//!
//! When a start completes, the success or failure handler runs first and the
//! completion handler second, synchronously inside the resolver call. The
//! handlers are read when the outcome arrives, so a handler registered after
//! [`Future::end`] still observes a deferred outcome.
//!
//! # Combinators
//!
//! - [`Future::map`] / [`Future::try_map`]: transform the value
//! - [`Future::flat_map`] / [`Future::and_then`]: chain a dependent future
//! - [`Future::sequence`] / [`Future::zip`]: run futures concurrently and
//!   collect their values in input order, failing fast
//!
//! # Examples
//!
//! ```rust
//! use cbfuture::Future;
//!
//! let future = Future::successful(10)
//!     .map(|x| x + 5)
//!     .flat_map(|x| Future::successful(x * 2));
//!
//! assert_eq!(future.wait().ok(), Some(30));
//! ```

mod bridge;
mod combinators;
mod resolver;
mod sequence;

pub use resolver::Resolver;
pub use sequence::Sequence;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Error;
use crate::runtime;

type Starter<T> = Arc<dyn Fn(Resolver<T>) + Send + Sync>;
type SuccessHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;
type FailureHandler = Arc<dyn Fn(&Error) + Send + Sync>;
type CompleteHandler<T> = Arc<dyn Fn(Result<&T, &Error>) + Send + Sync>;

/// A lazy handle over an asynchronous computation yielding `T` or an [`Error`].
///
/// Cloning a `Future` shares its starter and copies its registered handlers;
/// the two copies are then independent.
///
/// # Examples
///
/// ```rust
/// use cbfuture::Future;
/// use std::sync::mpsc;
///
/// let (sender, receiver) = mpsc::channel();
///
/// let mut future = Future::new(|resolver| resolver.succeed(10));
/// future.on_success(move |value: &i32| sender.send(*value).unwrap());
///
/// // Nothing runs until `end` is called.
/// assert!(receiver.try_recv().is_err());
///
/// future.end();
/// assert_eq!(receiver.recv().unwrap(), 10);
/// ```
#[must_use = "futures are lazy and do nothing unless started with `end`"]
pub struct Future<T> {
    starter: Starter<T>,
    handlers: Arc<Mutex<Handlers<T>>>,
}

impl<T: Send + 'static> Future<T> {
    /// Creates a future from a starter.
    ///
    /// The starter is not called here. It is called once per [`Future::end`]
    /// and must complete the [`Resolver`] it receives, either before returning
    /// or later from another task.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::{Error, Future};
    ///
    /// let failing: Future<i32> = Future::new(|resolver| {
    ///     resolver.fail(Error::msg("hello, error!"));
    /// });
    /// assert_eq!(failing.wait().unwrap_err().message(), "hello, error!");
    /// ```
    pub fn new<F>(starter: F) -> Self
    where
        F: Fn(Resolver<T>) + Send + Sync + 'static,
    {
        Self {
            starter: Arc::new(starter),
            handlers: Arc::new(Mutex::new(Handlers::default())),
        }
    }

    /// Creates a future that succeeds with a clone of `value`.
    ///
    /// The value is delivered on a later turn of the runtime, never inside the
    /// `end` call that started the future.
    pub fn successful(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |resolver| {
            let value = value.clone();
            runtime::defer(move || resolver.succeed(value));
        })
    }

    /// Creates a future that fails with `error`, delivered on a later turn.
    pub fn failed(error: impl Into<Error>) -> Self {
        let error = error.into();
        Self::new(move |resolver| {
            let error = error.clone();
            runtime::defer(move || resolver.fail(error));
        })
    }

    /// Creates a future that completes with a clone of `result` as soon as it
    /// is started.
    pub fn from_result(result: Result<T, Error>) -> Self
    where
        T: Clone + Sync,
    {
        Self::new(move |resolver| resolver.complete(result.clone()))
    }

    /// Sets the completion handler, replacing any previous one.
    ///
    /// The handler receives `Ok(&value)` or `Err(&error)` after the success or
    /// failure handler has run.
    pub fn on_complete<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Result<&T, &Error>) + Send + Sync + 'static,
    {
        self.handlers.lock().complete = Some(Arc::new(handler));
        self
    }

    /// Sets the success handler, replacing any previous one.
    ///
    /// ```rust
    /// use cbfuture::Future;
    /// use std::sync::mpsc;
    ///
    /// let (sender, receiver) = mpsc::channel();
    /// let first = sender.clone();
    ///
    /// let mut future = Future::new(|resolver| resolver.succeed(1));
    /// future
    ///     .on_success(move |_: &i32| first.send("first").unwrap())
    ///     .on_success(move |_: &i32| sender.send("second").unwrap())
    ///     .end();
    ///
    /// assert_eq!(receiver.recv().unwrap(), "second");
    /// assert!(receiver.try_recv().is_err());
    /// ```
    pub fn on_success<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.handlers.lock().success = Some(Arc::new(handler));
        self
    }

    /// Sets the failure handler, replacing any previous one.
    pub fn on_failure<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.handlers.lock().failure = Some(Arc::new(handler));
        self
    }

    /// Starts the computation.
    ///
    /// Calls the starter with a fresh [`Resolver`]. When it completes, the
    /// handlers registered at that moment are invoked: the success or failure
    /// handler, then the completion handler. Registering a handler after `end`
    /// but before the outcome arrives is therefore enough to observe it.
    /// Without handlers the outcome is discarded.
    ///
    /// Calling `end` again starts an independent run; results are not cached.
    pub fn end(&self) -> &Self {
        let slots = Arc::clone(&self.handlers);
        self.run(move |outcome| {
            if let Err(error) = outcome {
                if !slots.lock().observes_failure() {
                    tracing::debug!(error = %error, "future failed with no failure observer");
                }
            }
        });
        self
    }

    /// Starts the computation, firing this future's handlers and then passing
    /// the outcome to `sink`.
    pub(crate) fn run<K>(&self, sink: K)
    where
        K: FnOnce(Result<T, Error>) + Send + 'static,
    {
        let slots = Arc::clone(&self.handlers);
        tracing::trace!("future started");
        (self.starter)(Resolver::new(move |outcome: Result<T, Error>| {
            tracing::trace!(success = outcome.is_ok(), "future completed");
            let handlers = slots.lock().clone();
            handlers.dispatch(&outcome);
            sink(outcome);
        }));
    }

    pub(crate) fn starter(&self) -> Starter<T> {
        Arc::clone(&self.starter)
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            starter: Arc::clone(&self.starter),
            handlers: Arc::new(Mutex::new(self.handlers.lock().clone())),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock();
        formatter
            .debug_struct("Future")
            .field("on_success", &handlers.success.is_some())
            .field("on_failure", &handlers.failure.is_some())
            .field("on_complete", &handlers.complete.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Handler slots
// =============================================================================

struct Handlers<T> {
    success: Option<SuccessHandler<T>>,
    failure: Option<FailureHandler>,
    complete: Option<CompleteHandler<T>>,
}

impl<T> Handlers<T> {
    const fn observes_failure(&self) -> bool {
        self.failure.is_some() || self.complete.is_some()
    }

    fn dispatch(&self, outcome: &Result<T, Error>) {
        match outcome {
            Ok(value) => {
                if let Some(success) = &self.success {
                    success(value);
                }
            }
            Err(error) => {
                if let Some(failure) = &self.failure {
                    failure(error);
                }
            }
        }
        if let Some(complete) = &self.complete {
            complete(outcome.as_ref());
        }
    }
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self {
            success: None,
            failure: None,
            complete: None,
        }
    }
}

impl<T> Clone for Handlers<T> {
    fn clone(&self) -> Self {
        Self {
            success: self.success.clone(),
            failure: self.failure.clone(),
            complete: self.complete.clone(),
        }
    }
}
