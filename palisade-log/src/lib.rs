//! Palisade Logging
//!
//! Installs a `tracing` subscriber configured from the environment. Library
//! crates in the workspace log through the plain `tracing` macros; this crate
//! only decides where those events go and how they are rendered.
//!
//! # Usage
//!
//! ```rust
//! // Eager initialization; safe to call more than once.
//! palisade_log::init();
//!
//! tracing::info!(port = 8080, "server started");
//! ```
//!
//! # Environment Variables
//!
//! - `PALISADE_DEBUG=1` - Enable debug logging
//! - `PALISADE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PALISADE_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `PALISADE_LOG_COLOR=1|0` - Enable/disable ANSI colors
//! - `PALISADE_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `PALISADE_LOG_TARGET=1|0` - Include the event target (module path)
//! - `PALISADE_LOG` - Full `EnvFilter` directive, overrides the level

use once_cell::sync::OnceCell;
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding a raw `EnvFilter` directive.
pub const FILTER_ENV: &str = "PALISADE_LOG";

// ============================================================================
// Log Levels
// ============================================================================

/// Minimum level of events that reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    /// No output at all
    Off,
}

impl Level {
    /// Directive understood by `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            other => Err(ParseError::new("level", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_filter().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line, human oriented
    Pretty,
    /// Single line per event
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            other => Err(ParseError::new("format", other)),
        }
    }
}

/// Unrecognized value for a logging setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    setting: &'static str,
    value: String,
}

impl ParseError {
    fn new(setting: &'static str, value: &str) -> Self {
        Self {
            setting,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log {} '{}'", self.setting, self.value)
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether ANSI colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the event target
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            target: true,
        }
    }
}

impl LogConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unknown or malformed values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key).map(|v| {
                let v = v.trim().to_lowercase();
                v == "1" || v == "true" || v == "yes"
            })
        };

        let debug = flag("PALISADE_DEBUG").unwrap_or(false);

        let level = lookup("PALISADE_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("PALISADE_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let color = flag("PALISADE_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && format != Format::Json);

        Self {
            debug,
            level,
            format,
            color,
            timestamps: flag("PALISADE_LOG_TIMESTAMPS").unwrap_or(true),
            target: flag("PALISADE_LOG_TARGET").unwrap_or(true),
        }
    }

    /// Set the minimum level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Level actually applied, taking debug mode into account.
    pub fn effective_level(&self) -> Level {
        if self.debug && self.level > Level::Debug {
            Level::Debug
        } else {
            self.level
        }
    }
}

// ============================================================================
// Subscriber
// ============================================================================

static INSTALLED: OnceCell<LogConfig> = OnceCell::new();

/// Install the global subscriber using [`LogConfig::from_env`].
///
/// Subsequent calls are no-ops. If another subscriber was already installed
/// by the host application, that one is kept.
pub fn init() {
    init_with(LogConfig::from_env());
}

/// Install the global subscriber with an explicit configuration.
pub fn init_with(config: LogConfig) {
    INSTALLED.get_or_init(|| {
        if subscriber(&config).try_init().is_err() {
            tracing::debug!("global subscriber already set; keeping the existing one");
        }
        config
    });
}

/// The configuration that was installed, if any.
pub fn installed() -> Option<&'static LogConfig> {
    INSTALLED.get()
}

/// Build a subscriber for the given configuration without installing it.
pub fn subscriber(config: &LogConfig) -> impl Subscriber + Send + Sync + use<> {
    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.effective_level().as_filter()));

    tracing_subscriber::registry()
        .with(fmt_layer(config))
        .with(filter)
}

fn fmt_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let base = tracing_subscriber::fmt::layer()
        .with_ansi(config.color)
        .with_target(config.target);

    match (config.format, config.timestamps) {
        (Format::Pretty, true) => base.pretty().boxed(),
        (Format::Pretty, false) => base.pretty().without_time().boxed(),
        (Format::Compact, true) => base.compact().boxed(),
        (Format::Compact, false) => base.compact().without_time().boxed(),
        (Format::Json, true) => base.json().boxed(),
        (Format::Json, false) => base.json().without_time().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("DEBUG".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pretty".parse::<Format>(), Ok(Format::Pretty));
        assert_eq!("Json".parse::<Format>(), Ok(Format::Json));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_defaults_without_env() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.format, Format::Json);
        assert!(!config.color);
        assert!(config.timestamps);
    }

    #[test]
    fn test_debug_flag_lowers_level() {
        let config = LogConfig::from_lookup(lookup(&[("PALISADE_DEBUG", "1")]));
        assert!(config.debug);
        assert_eq!(config.level, Level::Debug);

        let config = LogConfig::default().with_level(Level::Error);
        let config = LogConfig { debug: true, ..config };
        assert_eq!(config.effective_level(), Level::Debug);
    }

    #[test]
    fn test_explicit_settings() {
        let config = LogConfig::from_lookup(lookup(&[
            ("PALISADE_LOG_LEVEL", "warn"),
            ("PALISADE_LOG_FORMAT", "compact"),
            ("PALISADE_LOG_COLOR", "0"),
            ("PALISADE_LOG_TIMESTAMPS", "false"),
        ]));
        assert_eq!(config.level, Level::Warn);
        assert_eq!(config.format, Format::Compact);
        assert!(!config.color);
        assert!(!config.timestamps);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_with(LogConfig::default().with_format(Format::Compact));
        init();
        assert!(installed().is_some());
    }
}
