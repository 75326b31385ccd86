//! Structured logging for the CSRF prevention pipeline
//!
//! The crates emit events through `tracing`; nothing is printed until the
//! host application installs a subscriber. [`LogConfig`] installs one with
//! JSON output to STDOUT by default.
//!
//! ```no_run
//! use unified_csrf_core::logging::*;
//!
//! let _guard = LogConfig::new()
//!     .level(LogLevel::Debug)
//!     .format(LogFormat::Pretty)
//!     .init()
//!     .expect("subscriber already installed");
//!
//! info!("CSRF prevention ready");
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - overrides the configured level
//! - `UNIFIED_CSRF_LOG_LEVEL=trace|debug|info|warn|error`
//! - `UNIFIED_CSRF_LOG_FORMAT=json|plain|pretty|compact`

use crate::Error;
use std::env;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

pub use tracing::{debug, error, info, trace, warn};

const LEVEL_ENV_VAR: &str = "UNIFIED_CSRF_LOG_LEVEL";
const FORMAT_ENV_VAR: &str = "UNIFIED_CSRF_LOG_FORMAT";

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Convert to string for EnvFilter
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured, machine-readable (default)
    Json,
    Plain,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "plain" => Some(LogFormat::Plain),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Output destination for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

/// Subscriber settings, applied once by [`LogConfig::init`]
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Print the module path of each event
    pub targets: bool,
    /// ANSI colors, ignored for JSON
    pub colors: bool,
    /// Filter directive taking precedence over `level`, e.g. `unified_csrf_protection=debug`
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            targets: true,
            colors: false,
            env_filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `UNIFIED_CSRF_LOG_LEVEL` and `UNIFIED_CSRF_LOG_FORMAT`
    pub fn from_env() -> Self {
        let level = env::var(LEVEL_ENV_VAR).ok().and_then(|s| LogLevel::parse(&s));
        let format = env::var(FORMAT_ENV_VAR).ok().and_then(|s| LogFormat::parse(&s));

        let defaults = Self::default();
        Self {
            level: level.unwrap_or(defaults.level),
            format: format.unwrap_or(defaults.format),
            ..defaults
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// `env_filter`, then `RUST_LOG`, then `level`
    fn filter(&self) -> EnvFilter {
        let configured = match &self.env_filter {
            Some(directive) => EnvFilter::try_new(directive).ok(),
            None => EnvFilter::try_from_default_env().ok(),
        };
        configured.unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }

    /// Install the global subscriber
    ///
    /// Keep the returned guard alive for the life of the program; buffered
    /// events are flushed when it drops.
    pub fn init(self) -> Result<WorkerGuard, Error> {
        let (writer, guard) = match self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
        };

        let base = fmt::layer().with_writer(writer).with_target(self.targets);
        let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Plain => base.with_ansi(self.colors).boxed(),
            LogFormat::Pretty => base.pretty().with_ansi(self.colors).boxed(),
            LogFormat::Compact => base.compact().with_ansi(self.colors).boxed(),
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(self.filter())
            .try_init()
            .map_err(|e| Error::Internal(format!("failed to install logger: {}", e)))?;

        Ok(guard)
    }
}
