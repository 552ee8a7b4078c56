//! Structured logging for mcpdemo.
//!
//! Built on the standard [`log`] facade. Library code only emits records;
//! the two binaries install [`StderrLogger`] at startup.
//!
//! # Log Levels
//!
//! - **error**: Unrecoverable errors, transport failures
//! - **warn**: Recoverable issues (bad frames, backend failures)
//! - **info**: Lifecycle events (server start/stop, client connect)
//! - **debug**: Request/response flow, handler invocations
//! - **trace**: Wire-level message details
//!
//! # Log Targets
//!
//! - `mcpdemo::server`: Server lifecycle and request handling
//! - `mcpdemo::transport`: Transport layer messages
//! - `mcpdemo::router`: Request routing and dispatch
//! - `mcpdemo::handler`: Tool/resource/prompt handler execution
//! - `mcpdemo::session`: Handshake and session state
//! - `mcpdemo::codec`: JSON encoding/decoding
//! - `mcpdemo::bridge`: Generation backend calls
//!
//! Example filter: `MCPDEMO_LOG=debug`
//!
//! # Output
//!
//! Everything goes to stderr. The server's stdout carries JSON-RPC frames and
//! the CLI's stdout carries command output, so neither may be polluted.

use std::io::Write;

use log::{Log, Metadata, Record};
use time::OffsetDateTime;
use time::macros::format_description;

// Re-export log macros for ergonomic use
pub use log::{debug, error, info, trace, warn};

// Re-export log level types for programmatic use
pub use log::{Level, LevelFilter};

/// Log targets used by mcpdemo components.
pub mod targets {
    /// Root target for all mcpdemo logs.
    pub const MCPDEMO: &str = "mcpdemo";

    /// Server lifecycle and request handling.
    pub const SERVER: &str = "mcpdemo::server";

    /// Transport layer (stdio, child process pipes).
    pub const TRANSPORT: &str = "mcpdemo::transport";

    /// Request routing and method dispatch.
    pub const ROUTER: &str = "mcpdemo::router";

    /// Tool, resource, and prompt handler execution.
    pub const HANDLER: &str = "mcpdemo::handler";

    /// Handshake and session state.
    pub const SESSION: &str = "mcpdemo::session";

    /// Codec operations (JSON encoding/decoding).
    pub const CODEC: &str = "mcpdemo::codec";

    /// Generation backend (Ollama) calls.
    pub const BRIDGE: &str = "mcpdemo::bridge";
}

/// Returns whether logging is enabled at the given level for the given target.
#[inline]
#[must_use]
pub fn is_enabled(level: Level, target: &str) -> bool {
    log::log_enabled!(target: target, level)
}

/// Logs a server lifecycle event at INFO level.
#[macro_export]
macro_rules! log_server {
    ($($arg:tt)*) => {
        $crate::logging::info!(target: "mcpdemo::server", $($arg)*)
    };
}

/// Logs a transport event at DEBUG level.
#[macro_export]
macro_rules! log_transport {
    ($($arg:tt)*) => {
        $crate::logging::debug!(target: "mcpdemo::transport", $($arg)*)
    };
}

/// Logs a request routing event at DEBUG level.
#[macro_export]
macro_rules! log_router {
    ($($arg:tt)*) => {
        $crate::logging::debug!(target: "mcpdemo::router", $($arg)*)
    };
}

/// Logs a handler execution event at DEBUG level.
#[macro_export]
macro_rules! log_handler {
    ($($arg:tt)*) => {
        $crate::logging::debug!(target: "mcpdemo::handler", $($arg)*)
    };
}

/// Logging configuration shared by both binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum log level (default: WARN).
    pub level: Level,
    /// Show timestamps in logs (default: true).
    pub timestamps: bool,
    /// Show targets in logs (default: true).
    pub targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            timestamps: true,
            targets: true,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from environment variables.
    ///
    /// Respects:
    /// - `MCPDEMO_LOG`: Log level (error, warn, info, debug, trace)
    /// - `MCPDEMO_LOG_TIMESTAMPS`: Show timestamps (0/false to disable)
    /// - `MCPDEMO_LOG_TARGETS`: Show targets (0/false to disable)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let level = lookup("MCPDEMO_LOG")
            .and_then(|s| parse_level(&s))
            .unwrap_or(defaults.level);

        let timestamps = lookup("MCPDEMO_LOG_TIMESTAMPS")
            .map(|s| !is_falsy(&s))
            .unwrap_or(defaults.timestamps);

        let targets = lookup("MCPDEMO_LOG_TARGETS")
            .map(|s| !is_falsy(&s))
            .unwrap_or(defaults.targets);

        Self {
            level,
            timestamps,
            targets,
        }
    }

    /// Installs a [`StderrLogger`] built from this config.
    ///
    /// A logger that is already installed wins; that is not an error.
    pub fn init(&self) {
        StderrLogger::builder()
            .level(self.level)
            .with_timestamps(self.timestamps)
            .with_targets(self.targets)
            .try_init();
    }
}

fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_lowercase().as_str() {
        "error" => Some(Level::Error),
        "warn" | "warning" => Some(Level::Warn),
        "info" => Some(Level::Info),
        "debug" => Some(Level::Debug),
        "trace" => Some(Level::Trace),
        _ => None,
    }
}

fn is_falsy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "0" | "false" | "no")
}

/// Plain-text logger that writes one line per record to stderr.
#[derive(Debug)]
pub struct StderrLogger {
    min_level: Level,
    show_timestamps: bool,
    show_targets: bool,
}

impl StderrLogger {
    /// Create a logger using the builder pattern.
    #[must_use]
    pub fn builder() -> StderrLoggerBuilder {
        StderrLoggerBuilder::new()
    }

    /// Formats a record into a single output line (without newline).
    fn format_line(&self, level: Level, target: &str, message: &str) -> String {
        let mut line = String::new();
        if self.show_timestamps {
            let now = OffsetDateTime::now_utc();
            if let Ok(ts) = now.format(format_description!("[hour]:[minute]:[second]")) {
                line.push_str(&ts);
                line.push(' ');
            }
        }
        line.push_str(&format!("{:<5}", level.as_str()));
        if self.show_targets {
            let short = target.strip_prefix("mcpdemo::").unwrap_or(target);
            line.push_str(&format!(" [{short}]"));
        }
        line.push(' ');
        line.push_str(message);
        line
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_line(record.level(), record.target(), &record.args().to_string());
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Builder for configuring the stderr logger.
#[derive(Debug)]
pub struct StderrLoggerBuilder {
    min_level: Level,
    show_timestamps: bool,
    show_targets: bool,
}

impl Default for StderrLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StderrLoggerBuilder {
    /// Create a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: Level::Warn,
            show_timestamps: true,
            show_targets: true,
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set whether to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    /// Set whether to show targets.
    #[must_use]
    pub fn with_targets(mut self, show: bool) -> Self {
        self.show_targets = show;
        self
    }

    /// Build the logger without installing it.
    #[must_use]
    pub fn build(self) -> StderrLogger {
        StderrLogger {
            min_level: self.min_level,
            show_timestamps: self.show_timestamps,
            show_targets: self.show_targets,
        }
    }

    /// Build and install as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.min_level;
        log::set_boxed_logger(Box::new(self.build()))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Build and install, ignoring errors if already set.
    pub fn try_init(self) {
        let _ = self.init();
    }
}
