//! Transformation and chaining combinators.
//!
//! Every combinator borrows its source and returns a new future whose starter
//! wraps the source's starter. The source's handlers are not involved: only
//! the derived future's handlers fire when the derived future is started.

use std::sync::Arc;

use super::{Future, Resolver};
use crate::error::Error;

impl<T: Send + 'static> Future<T> {
    /// Applies a function to the success value.
    ///
    /// A failure of the source is passed through unchanged and `transform` is
    /// not called. A panic inside `transform` propagates on the thread that
    /// completed the source, and the derived future never completes; use
    /// [`Future::try_map`] for transformations that can fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// let future = Future::successful(10).map(|x| format!("{x} times!"));
    /// assert_eq!(future.wait().unwrap(), "10 times!");
    /// ```
    pub fn map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.starter();
        let transform = Arc::new(transform);
        Future::new(move |resolver: Resolver<U>| {
            let transform = Arc::clone(&transform);
            source(Resolver::new(move |outcome: Result<T, Error>| {
                resolver.complete(outcome.map(|value| transform(value)));
            }));
        })
    }

    /// Applies a fallible function to the success value.
    ///
    /// An `Err` returned by `transform` becomes the failure of the derived
    /// future.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// let parsed = Future::successful("12").try_map(|text| text.parse::<i32>());
    /// assert_eq!(parsed.wait().unwrap(), 12);
    ///
    /// let invalid = Future::successful("twelve").try_map(|text| text.parse::<i32>());
    /// assert_eq!(invalid.wait().unwrap_err().message(), "invalid digit found in string");
    /// ```
    pub fn try_map<U, E, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        E: Into<Error>,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        let source = self.starter();
        let transform = Arc::new(transform);
        Future::new(move |resolver: Resolver<U>| {
            let transform = Arc::clone(&transform);
            source(Resolver::new(move |outcome: Result<T, Error>| {
                resolver.complete(outcome.and_then(|value| transform(value).map_err(Into::into)));
            }));
        })
    }

    /// Chains a dependent future built from the success value.
    ///
    /// When the derived future is started, the source is started; on success
    /// `transform` builds the dependent future, which is started in turn (its
    /// own handlers fire) and whose outcome becomes the derived outcome. A
    /// failure of the source is passed through and `transform` is not called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// let future = Future::successful(10)
    ///     .flat_map(|x| Future::successful(format!("{x} times!")));
    /// assert_eq!(future.wait().unwrap(), "10 times!");
    /// ```
    pub fn flat_map<U, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Future<U> + Send + Sync + 'static,
    {
        let source = self.starter();
        let transform = Arc::new(transform);
        Future::new(move |resolver: Resolver<U>| {
            let transform = Arc::clone(&transform);
            source(Resolver::new(move |outcome: Result<T, Error>| match outcome {
                Ok(value) => transform(value).run(move |dependent| resolver.complete(dependent)),
                Err(error) => resolver.fail(error),
            }));
        })
    }

    /// Alias for [`Future::flat_map`].
    #[inline]
    pub fn and_then<U, F>(&self, transform: F) -> Future<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Future<U> + Send + Sync + 'static,
    {
        self.flat_map(transform)
    }

    /// Runs this future and `other` concurrently and pairs their values.
    ///
    /// Fails with whichever error arrives first. Both futures' own handlers
    /// fire as they complete.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// let pair = Future::successful(1).zip(&Future::successful("a"));
    /// assert_eq!(pair.wait().unwrap(), (1, "a"));
    /// ```
    pub fn zip<U>(&self, other: &Future<U>) -> Future<(T, U)>
    where
        U: Send + 'static,
    {
        Future::sequence((self.clone(), other.clone()))
    }
}
