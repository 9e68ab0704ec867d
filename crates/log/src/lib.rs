//! # recovery-log
//!
//! Global `tracing` subscriber setup for the recovery engine and its CLI.
//!
//! ```rust,ignore
//! let _guard = recovery_log::init_with(recovery_log::Config::production())?;
//! tracing::info!(plan = "repair", "starting");
//! ```
//!
//! The engine crates only emit events and spans; installing a subscriber is
//! up to the binary.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, ENV_FORMAT, ENV_LEVEL, Format, WriterConfig};
pub use error::LogError;

/// Pick a configuration from the environment or the build profile and
/// install it.
///
/// `RECOVERY_LOG` or `RUST_LOG` selects [`Config::from_env`]; otherwise debug
/// builds get [`Config::development`] and release builds
/// [`Config::production`].
pub fn auto_init() -> Result<LoggerGuard, LogError> {
    if std::env::var_os(ENV_LEVEL).is_some() || std::env::var_os("RUST_LOG").is_some() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Install the default configuration.
pub fn init() -> Result<LoggerGuard, LogError> {
    init_with(Config::default())
}

/// Install `config` as the global subscriber.
pub fn init_with(config: Config) -> Result<LoggerGuard, LogError> {
    LoggerBuilder::from_config(config).build()
}

/// Install [`Config::test`] unless some subscriber is already in place.
///
/// Safe to call from every test in a binary.
pub fn init_test() -> Result<LoggerGuard, LogError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    match init_with(Config::test()) {
        // Lost a race with another test thread.
        Err(LogError::Init(_)) => Ok(LoggerGuard::noop()),
        other => other,
    }
}
