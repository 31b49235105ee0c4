//! Logging setup for apps embedding the navigation core
//!
//! ```no_run
//! use shopfront::logging::{LogFormat, LoggingConfig};
//!
//! LoggingConfig::new(LogFormat::Compact, "debug").init();
//! ```

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Full single-line output
    #[default]
    Text,
    /// Shorter single-line output
    Compact,
    /// Multi-line output for development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, compact, pretty",
                s
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output layout
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl LoggingConfig {
    /// Create a configuration
    pub fn new(format: LogFormat, level: impl Into<String>) -> Self {
        Self {
            format,
            level: level.into(),
        }
    }

    /// Filter from `RUST_LOG`, falling back to the configured level
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter())
            .with_writer(std::io::stderr)
            .with_target(true);

        let result = match self.format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
        };
        result.is_ok()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(LogFormat::Text, "info")
    }
}

/// Install the default subscriber (text, `info`, `RUST_LOG` respected)
pub fn init_default() -> bool {
    LoggingConfig::default().init()
}
