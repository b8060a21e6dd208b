//! The asynchronous substrate futures are delivered on.
//!
//! A [`Future`](crate::Future) owns no threads. Whenever it has to defer work
//! to a later scheduler turn (see [`Future::successful`](crate::Future::successful))
//! or bridge a Rust `async` computation, it spawns onto a tokio runtime
//! obtained from [`handle`]:
//!
//! 1. **Ambient runtime**: when called from inside a tokio runtime, that
//!    runtime's handle is used, so the caller's scheduler and tracing context
//!    are preserved.
//! 2. **Global runtime**: otherwise a lazily built multi-thread runtime is used.
//!    It is created once, shaped by [`RuntimeConfig`], and never dropped. When
//!    [`configure`] was not called first, the configuration is read from the
//!    `CBFUTURE_*` environment variables (see [`RuntimeConfig::from_env`]).
//!
//! [`try_run_blocking`] lets synchronous code wait for an async result without
//! nesting runtimes.
//!
//! # Examples
//!
//! ```rust
//! use cbfuture::runtime;
//!
//! let answer = runtime::try_run_blocking(async { 40 + 2 });
//! assert_eq!(answer, Ok(42));
//! ```

mod config;

pub use config::{ConfigError, RuntimeConfig, THREAD_NAME_ENV, WORKER_THREADS_ENV};

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::{LazyLock, OnceLock};

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

// =============================================================================
// Global Runtime
// =============================================================================

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Global tokio runtime initialized lazily on first access.
///
/// Built from the installed [`RuntimeConfig`], or from the environment when
/// [`configure`] was never called. The runtime has static lifetime.
static GLOBAL_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    let config = CONFIG.get_or_init(RuntimeConfig::from_env_or_default);
    tracing::debug!(
        worker_threads = config.worker_threads(),
        thread_name = config.thread_name(),
        "building global runtime"
    );
    Builder::new_multi_thread()
        .worker_threads(config.worker_threads().max(1))
        .thread_name(config.thread_name())
        .enable_all()
        .build()
        .expect("Failed to create global tokio runtime")
});

/// Installs the configuration of the global runtime.
///
/// Must be called before the global runtime is first used.
///
/// # Errors
///
/// - `ConfigError::InvalidValue` when the configuration does not validate.
/// - `ConfigError::AlreadyConfigured` when a configuration was already
///   installed or the global runtime was already built from the environment.
///
/// # Examples
///
/// ```rust
/// use cbfuture::runtime::{self, ConfigError, RuntimeConfig};
///
/// let first = runtime::configure(RuntimeConfig::default().with_worker_threads(2));
/// assert_eq!(first, Ok(()));
///
/// let second = runtime::configure(RuntimeConfig::default());
/// assert_eq!(second, Err(ConfigError::AlreadyConfigured));
/// ```
pub fn configure(config: RuntimeConfig) -> Result<(), ConfigError> {
    config.validate()?;
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyConfigured)
}

/// Returns a reference to the global runtime.
#[inline]
#[must_use]
pub fn global() -> &'static Runtime {
    &GLOBAL_RUNTIME
}

// =============================================================================
// Handle Caching
// =============================================================================

thread_local! {
    /// Per-thread cached handle to the global runtime.
    static CACHED_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Returns a handle to the current or global runtime.
///
/// # Handle Priority
///
/// 1. Inside a tokio runtime: `Handle::current()`
/// 2. Otherwise: the cached handle of the global runtime
#[must_use]
pub fn handle() -> Handle {
    if let Ok(current_handle) = Handle::try_current() {
        return current_handle;
    }

    CACHED_HANDLE.with(|cached| {
        cached
            .borrow_mut()
            .get_or_insert_with(|| global().handle().clone())
            .clone()
    })
}

/// Runs `task` on a later turn of the runtime returned by [`handle`].
///
/// The task never runs synchronously inside this call.
pub fn defer<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    tracing::trace!("deferring task to the runtime");
    drop(handle().spawn(async move { task() }));
}

// =============================================================================
// Blocking Execution
// =============================================================================

/// Error type for blocking execution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingError {
    /// Cannot block inside a current-thread runtime.
    ///
    /// `block_in_place` is only supported in multi-thread runtimes, and
    /// blocking the only worker would deadlock the computation being awaited.
    CurrentThreadRuntime,

    /// The runtime flavor is not supported for blocking execution.
    UnsupportedRuntimeFlavor,
}

impl fmt::Display for BlockingError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentThreadRuntime => {
                write!(formatter, "cannot block inside a current-thread runtime")
            }
            Self::UnsupportedRuntimeFlavor => {
                write!(formatter, "cannot block inside a runtime of unsupported flavor")
            }
        }
    }
}

impl Error for BlockingError {}

/// Attempts to execute a future synchronously, blocking the current thread.
///
/// - **Inside a multi-thread runtime**: uses `block_in_place` with the current
///   runtime's handle.
/// - **Inside a current-thread runtime**: returns
///   `Err(BlockingError::CurrentThreadRuntime)`.
/// - **Outside a runtime**: uses the global runtime's `block_on`.
///
/// # Errors
///
/// Returns `BlockingError::CurrentThreadRuntime` from inside a current-thread
/// runtime and `BlockingError::UnsupportedRuntimeFlavor` for any other flavor
/// that is not multi-thread.
pub fn try_run_blocking<F, T>(future: F) -> Result<T, BlockingError>
where
    F: Future<Output = T>,
{
    if let Ok(current_handle) = Handle::try_current() {
        match current_handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => Ok(tokio::task::block_in_place(|| {
                current_handle.block_on(future)
            })),
            RuntimeFlavor::CurrentThread => Err(BlockingError::CurrentThreadRuntime),
            _ => Err(BlockingError::UnsupportedRuntimeFlavor),
        }
    } else {
        Ok(global().block_on(future))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
