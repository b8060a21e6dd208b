//! Error types carried on the failure channel of a [`Future`](crate::Future).
//!
//! Every failure travels as an [`Error`]: an opaque, cheaply clonable wrapper
//! around any `std::error::Error + Send + Sync + 'static`. Combinators never
//! inspect it; they pass it through unchanged.
//!
//! Failures that originate in this crate itself are described by
//! [`FutureError`] and are carried inside an [`Error`] like any other cause.
//!
//! # Examples
//!
//! ```rust
//! use cbfuture::Error;
//!
//! let error = Error::msg("boom");
//! assert_eq!(error.message(), "boom");
//!
//! let io: Error = std::io::Error::other("disk on fire").into();
//! assert!(io.downcast_ref::<std::io::Error>().is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::runtime::BlockingError;

/// The opaque failure value of a [`Future`](crate::Future).
///
/// Cloning is an `Arc` bump, so the same failure can be handed to the failure
/// handler, the completion handler and any derived future.
///
/// `Error` deliberately does not implement `std::error::Error` itself, which
/// keeps the blanket `From<E: std::error::Error>` conversion coherent. Use
/// [`Error::as_std`] or `Box::<dyn std::error::Error + Send + Sync>::from`
/// when a standard error trait object is required.
#[derive(Clone)]
pub struct Error {
    inner: Arc<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Wraps an existing error value.
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(error),
        }
    }

    /// Creates an error from a plain message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cbfuture::Error;
    ///
    /// let error = Error::msg(format!("request {} failed", 7));
    /// assert_eq!(error.to_string(), "request 7 failed");
    /// ```
    #[must_use]
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(Message(message))
    }

    /// Returns the `Display` rendering of the underlying cause.
    #[must_use]
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    /// Attempts to view the underlying cause as a concrete error type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Returns `true` when the cause is the given [`FutureError`].
    #[must_use]
    pub fn is_future_error(&self, kind: &FutureError) -> bool {
        self.downcast_ref::<FutureError>() == Some(kind)
    }

    /// Borrows the underlying cause as a standard error trait object.
    ///
    /// The cause's `source` chain stays reachable through the returned object.
    ///
    /// ```rust
    /// use cbfuture::{Error, FutureError};
    /// use cbfuture::runtime::BlockingError;
    ///
    /// let error = Error::new(FutureError::Blocking(BlockingError::CurrentThreadRuntime));
    /// let source = error.as_std().source().map(ToString::to_string);
    /// assert_eq!(source.as_deref(), Some("cannot block inside a current-thread runtime"));
    /// ```
    #[must_use]
    pub fn as_std(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.inner
    }

    /// Returns `true` when both handles share the same cause allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, formatter)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, formatter)
    }
}

impl<E> From<E> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl From<Error> for Box<dyn std::error::Error + Send + Sync + 'static> {
    fn from(error: Error) -> Self {
        Box::new(Shared(error.inner))
    }
}

/// A plain-message cause created by [`Error::msg`].
struct Message<M>(M);

impl<M: fmt::Debug> fmt::Debug for Message<M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, formatter)
    }
}

impl<M: fmt::Display> fmt::Display for Message<M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, formatter)
    }
}

impl<M: fmt::Display + fmt::Debug> std::error::Error for Message<M> {}

/// Shared cause re-boxed for callers that need an owned trait object.
struct Shared(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl fmt::Debug for Shared {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, formatter)
    }
}

impl fmt::Display for Shared {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, formatter)
    }
}

impl std::error::Error for Shared {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

// =============================================================================
// FutureError
// =============================================================================

/// Failures produced by this crate rather than by a caller's computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureError {
    /// A [`Resolver`](crate::Resolver) was dropped without being completed.
    ///
    /// The starter lost track of its result handle, so the computation can
    /// never report an outcome.
    Abandoned,

    /// A blocking wait could not run in the current context.
    Blocking(BlockingError),
}

impl fmt::Display for FutureError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abandoned => {
                write!(formatter, "future abandoned: resolver dropped without a result")
            }
            Self::Blocking(error) => write!(formatter, "future wait failed: {error}"),
        }
    }
}

impl std::error::Error for FutureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Abandoned => None,
            Self::Blocking(error) => Some(error),
        }
    }
}

impl From<BlockingError> for FutureError {
    fn from(error: BlockingError) -> Self {
        Self::Blocking(error)
    }
}
