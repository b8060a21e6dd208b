//! Configuration of the fallback global runtime.
//!
//! The global runtime is only built when a future is started outside any
//! tokio runtime. Its shape can be set once, before first use, with
//! [`configure`](super::configure). Otherwise it is read from environment
//! variables when the runtime is built; an invalid value is logged and the
//! defaults are used instead.
//!
//! # Environment Variables
//!
//! - `CBFUTURE_WORKER_THREADS`: number of worker threads (default: CPU count)
//! - `CBFUTURE_THREAD_NAME`: worker thread name (default: `cbfuture-worker`)

use std::env;
use std::fmt;

/// Environment variable holding the worker thread count.
pub const WORKER_THREADS_ENV: &str = "CBFUTURE_WORKER_THREADS";

/// Environment variable holding the worker thread name.
pub const THREAD_NAME_ENV: &str = "CBFUTURE_THREAD_NAME";

const DEFAULT_THREAD_NAME: &str = "cbfuture-worker";

/// Errors raised while building or installing a [`RuntimeConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The global runtime was already configured or already built.
    AlreadyConfigured,
    /// A configuration value is out of range or cannot be parsed.
    InvalidValue {
        /// The name of the offending setting.
        key: String,
        /// Description of why the value is invalid.
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyConfigured => {
                write!(formatter, "global runtime is already configured")
            }
            Self::InvalidValue { key, message } => {
                write!(formatter, "Invalid value for {key}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Shape of the fallback global multi-thread runtime.
///
/// # Examples
///
/// ```rust
/// use cbfuture::runtime::RuntimeConfig;
///
/// let config = RuntimeConfig::default()
///     .with_worker_threads(2)
///     .with_thread_name("io-worker");
/// assert_eq!(config.worker_threads(), 2);
/// assert_eq!(config.thread_name(), "io-worker");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    worker_threads: usize,
    thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Loads the configuration from environment variables.
    ///
    /// Unset variables fall back to [`RuntimeConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `CBFUTURE_WORKER_THREADS` is
    /// not a positive integer or a variable is not valid Unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let worker_threads = match read_env(WORKER_THREADS_ENV)? {
            Some(value) => parse_worker_threads(WORKER_THREADS_ENV, &value)?,
            None => defaults.worker_threads,
        };
        let thread_name = read_env(THREAD_NAME_ENV)?.unwrap_or(defaults.thread_name);

        Ok(Self {
            worker_threads,
            thread_name,
        })
    }

    /// Loads the configuration from environment variables, falling back to
    /// [`RuntimeConfig::default`] with a warning when a value is invalid.
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::or_default(Self::from_env())
    }

    fn or_default(loaded: Result<Self, ConfigError>) -> Self {
        loaded.unwrap_or_else(|error| {
            tracing::warn!(error = %error, "ignoring runtime configuration from environment");
            Self::default()
        })
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub const fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// Sets the worker thread name.
    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Number of worker threads.
    #[must_use]
    pub const fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Worker thread name.
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Checks that the configuration can build a runtime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `worker_threads` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "worker_threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn read_env(key: &str) -> Result<Option<String>, ConfigError> {
    env_value(key, env::var(key))
}

fn env_value(
    key: &str,
    value: Result<String, env::VarError>,
) -> Result<Option<String>, ConfigError> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid Unicode".to_string(),
        }),
    }
}

fn parse_worker_threads(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than 0".to_string(),
        }),
        Ok(count) => Ok(count),
        Err(error) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ffi::OsString;

    #[rstest]
    fn default_uses_cpu_count() {
        let config = RuntimeConfig::default();
        assert_eq!(config.worker_threads(), num_cpus::get());
        assert_eq!(config.thread_name(), "cbfuture-worker");
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    fn zero_workers_is_rejected() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                key: "worker_threads".to_string(),
                message: "must be greater than 0".to_string(),
            })
        );
    }

    #[rstest]
    #[case("4", Ok(4))]
    #[case(" 2 ", Ok(2))]
    #[case("0", Err("must be greater than 0"))]
    #[case("many", Err("invalid digit found in string"))]
    fn parses_worker_threads(#[case] input: &str, #[case] expected: Result<usize, &str>) {
        let parsed = parse_worker_threads(WORKER_THREADS_ENV, input);
        match expected {
            Ok(count) => assert_eq!(parsed, Ok(count)),
            Err(message) => assert_eq!(
                parsed,
                Err(ConfigError::InvalidValue {
                    key: WORKER_THREADS_ENV.to_string(),
                    message: message.to_string(),
                })
            ),
        }
    }

    #[rstest]
    fn config_error_display() {
        assert_eq!(
            ConfigError::AlreadyConfigured.to_string(),
            "global runtime is already configured"
        );
        let error = ConfigError::InvalidValue {
            key: "KEY".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid value for KEY: bad");
    }

    #[rstest]
    #[case(Ok("8".to_string()), Ok(Some("8".to_string())))]
    #[case(Err(env::VarError::NotPresent), Ok(None))]
    #[case(
        Err(env::VarError::NotUnicode(OsString::from("\u{fffd}"))),
        Err(ConfigError::InvalidValue {
            key: THREAD_NAME_ENV.to_string(),
            message: "value is not valid Unicode".to_string(),
        })
    )]
    fn maps_environment_lookups(
        #[case] lookup: Result<String, env::VarError>,
        #[case] expected: Result<Option<String>, ConfigError>,
    ) {
        assert_eq!(env_value(THREAD_NAME_ENV, lookup), expected);
    }

    #[rstest]
    fn or_default_keeps_loaded_config() {
        let loaded = RuntimeConfig::default().with_worker_threads(3);
        assert_eq!(RuntimeConfig::or_default(Ok(loaded.clone())), loaded);
    }

    #[rstest]
    fn or_default_replaces_invalid_environment() {
        let invalid =
            parse_worker_threads(WORKER_THREADS_ENV, "many").map(|_| RuntimeConfig::default());
        assert!(invalid.is_err());
        assert_eq!(RuntimeConfig::or_default(invalid), RuntimeConfig::default());
    }

    // Setting variables needs unsafe env::set_var in the 2024 edition, so
    // from_env itself is only checked with the variables unset.
    #[rstest]
    fn from_env_without_variables_is_default() {
        if env::var_os(WORKER_THREADS_ENV).is_some() || env::var_os(THREAD_NAME_ENV).is_some() {
            return;
        }
        assert_eq!(RuntimeConfig::from_env(), Ok(RuntimeConfig::default()));
    }
}
