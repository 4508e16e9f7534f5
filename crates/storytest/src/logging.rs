//! Log verbosity and optional subscriber setup
//!
//! The engine itself only emits `tracing` events. With the `logging` feature,
//! building a [`Storytest`](crate::Storytest) calls [`init_logging`] with the
//! configured [`LogLevel`]; embedders may also call it earlier themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

use crate::error::ConfigError;

/// Verbosity of the engine's diagnostics (`logLevel` in the config file)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "silent")]
    Off,
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    /// Includes per-export synthesis steps
    Trace,
}

const LEVELS: [LogLevel; 6] = [
    LogLevel::Off,
    LogLevel::Error,
    LogLevel::Warn,
    LogLevel::Info,
    LogLevel::Debug,
    LogLevel::Trace,
];

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&LevelFilter::from(*self), f)
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        let alias = match wanted.as_str() {
            "silent" => Some(LogLevel::Off),
            "warning" => Some(LogLevel::Warn),
            _ => None,
        };
        alias
            .or_else(|| LEVELS.into_iter().find(|level| level.to_string() == wanted))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "logLevel".to_string(),
                value: format!("{value:?}"),
                hint: "Use one of off, error, warn, info, debug, trace".to_string(),
            })
    }
}

#[cfg(feature = "logging")]
mod init {
    use super::LogLevel;
    use std::sync::Once;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    static INSTALLED: Once = Once::new();

    fn install(filter: EnvFilter) {
        INSTALLED.call_once(|| {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(false).without_time())
                .init();
        });
    }

    /// Install a global subscriber at `level`, refined by any `RUST_LOG` directives.
    ///
    /// Only the first installation in a process has an effect.
    ///
    /// ```rust,no_run
    /// use storytest::{StorytestConfig, init_logging};
    ///
    /// let config = StorytestConfig::load(None).unwrap();
    /// init_logging(config.log_level);
    /// ```
    pub fn init_logging(level: LogLevel) {
        install(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(level).into())
                .from_env_lossy(),
        );
    }

    /// Install the subscriber with `RUST_LOG` directives over an `info` default
    pub fn init_logging_from_env() {
        init_logging(LogLevel::Info);
    }
}

#[cfg(feature = "logging")]
pub use init::{init_logging, init_logging_from_env};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(" TRACE ".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("silent".parse::<LogLevel>().unwrap(), LogLevel::Off);
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "logLevel"));
    }

    #[test]
    fn display_matches_filter_directives() {
        for level in LEVELS {
            assert_eq!(level.to_string().parse::<LogLevel>().unwrap(), level);
        }
        assert_eq!(LogLevel::Off.to_string(), "off");
        assert!(LogLevel::Debug > LogLevel::Info);
    }

    #[test]
    fn config_names_are_lowercase() {
        let level: LogLevel = serde_json::from_str("\"silent\"").unwrap();
        assert_eq!(level, LogLevel::Off);
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
    }
}
