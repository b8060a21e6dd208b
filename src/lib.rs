//! # cbfuture
//!
//! Lazy, callback-driven futures with composition combinators.
//!
//! ## Overview
//!
//! A [`Future<T>`] wraps a single asynchronous computation behind a *starter*
//! closure. Nothing runs until the future is started with [`Future::end`];
//! the outcome, a `T` or an [`Error`], is then delivered to the registered
//! handlers:
//!
//! - **Handlers**: [`Future::on_success`], [`Future::on_failure`] and
//!   [`Future::on_complete`], one slot each, last registration wins
//! - **Transformation**: [`Future::map`], [`Future::try_map`]
//! - **Chaining**: [`Future::flat_map`] (alias [`Future::and_then`])
//! - **Parallel aggregation**: [`Future::sequence`], [`Future::zip`]
//! - **Constructors**: [`Future::new`], [`Future::successful`],
//!   [`Future::failed`], [`Future::from_result`], [`Future::from_async`]
//!
//! Deferred delivery runs on a tokio runtime; see [`runtime`].
//!
//! ## Example
//!
//! ```rust
//! use cbfuture::Future;
//! use std::sync::mpsc;
//!
//! let (sender, receiver) = mpsc::channel();
//!
//! Future::successful(10)
//!     .map(|x| x + 5)
//!     .on_success(move |value| sender.send(*value).unwrap())
//!     .end();
//!
//! assert_eq!(receiver.recv().unwrap(), 15);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use cbfuture::prelude::*;
///
/// let joined = Future::sequence(vec![Future::successful(1), Future::successful(2)]);
/// assert_eq!(joined.wait().unwrap(), vec![1, 2]);
/// ```
pub mod prelude {
    pub use crate::error::{Error, FutureError};
    pub use crate::future::{Future, Resolver, Sequence};
}

pub mod error;
pub mod future;
pub mod runtime;

pub use error::{Error, FutureError};
pub use future::{Future, Resolver, Sequence};
