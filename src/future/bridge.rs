//! Interop between callback futures and Rust `async` code.
//!
//! - [`Future::from_async`] wraps an `async` computation as a callback future.
//! - [`Future::run_async`] and `IntoFuture` let `async` code `.await` one.
//! - [`Future::wait`] blocks synchronous callers until the outcome arrives.

use std::future::IntoFuture;

use futures::channel::oneshot;
use futures::future::BoxFuture;

use super::Future;
use crate::error::{Error, FutureError};
use crate::runtime;

impl<T: Send + 'static> Future<T> {
    /// Creates a future from an `async` computation factory.
    ///
    /// Each start calls `factory` and spawns the returned computation on the
    /// runtime from [`runtime::handle`]; its `Result` becomes the outcome.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// let future = Future::from_async(|| async {
    ///     tokio::task::yield_now().await;
    ///     Ok::<_, std::io::Error>(21)
    /// });
    /// assert_eq!(future.map(|x| x * 2).wait().unwrap(), 42);
    /// ```
    pub fn from_async<F, Fut, E>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<T, E>> + Send + 'static,
        E: Into<Error>,
    {
        Self::new(move |resolver| {
            let computation = factory();
            drop(runtime::handle().spawn(async move {
                let outcome = computation.await;
                resolver.complete(outcome.map_err(Into::into));
            }));
        })
    }

    /// Returns an `async` computation that starts this future when first
    /// polled and resolves with its outcome.
    ///
    /// The future's registered handlers fire before the outcome is yielded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Future;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let value = Future::successful(10).map(|x| x + 5).run_async().await;
    /// assert_eq!(value.unwrap(), 15);
    /// # });
    /// ```
    pub fn run_async(&self) -> BoxFuture<'static, Result<T, Error>> {
        let this = self.clone();
        Box::pin(async move {
            let (sender, receiver) = oneshot::channel();
            this.run(move |outcome| {
                drop(sender.send(outcome));
            });
            receiver
                .await
                .unwrap_or_else(|_| Err(Error::new(FutureError::Abandoned)))
        })
    }

    /// Starts this future and blocks the current thread until it completes.
    ///
    /// # Errors
    ///
    /// Returns the future's failure, or a [`FutureError::Blocking`] failure
    /// when called from inside a current-thread runtime.
    pub fn wait(&self) -> Result<T, Error> {
        runtime::try_run_blocking(self.run_async())
            .unwrap_or_else(|error| Err(Error::new(FutureError::from(error))))
    }
}

impl<T: Send + 'static> IntoFuture for Future<T> {
    type Output = Result<T, Error>;
    type IntoFuture = BoxFuture<'static, Result<T, Error>>;

    fn into_future(self) -> Self::IntoFuture {
        self.run_async()
    }
}
