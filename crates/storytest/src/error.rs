//! Error types for the storytest facade
//!
//! Failures are grouped by who has to act on them:
//!
//! - [`Error::Precondition`]: the request itself is malformed (no test-body
//!   constructor, unusable framework settings)
//! - [`Error::Resolution`]: the build service could not read, parse or compile
//!   the module; propagated unchanged
//! - [`Error::Synthesis`]: plan resolution or rendering failed
//! - [`Error::Execution`]: the sandboxed module threw, or the host failed
//! - [`Error::Config`]: configuration could not be loaded or is invalid

use miette::Diagnostic;
use std::path::PathBuf;
use storytest_build::BuildError;
use storytest_gen::GenError;
use storytest_runner::RunnerError;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Precondition(GenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Synthesis(GenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] RunnerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl From<GenError> for Error {
    fn from(err: GenError) -> Self {
        match err {
            GenError::Build(build) => Self::Resolution(build),
            err if err.is_precondition() => Self::Precondition(err),
            err => Self::Synthesis(err),
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// A provider failed or a value has the wrong type
    #[error("Failed to load configuration: {0}")]
    #[diagnostic(
        code(storytest::config::load_failed),
        help("check storytest.toml syntax and STORYTEST_* environment variables")
    )]
    Load(#[source] Box<figment::Error>),

    /// An explicitly named config file does not exist
    #[error("Config file not found: {}", .0.display())]
    #[diagnostic(code(storytest::config::not_found))]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    #[diagnostic(code(storytest::config::invalid_value))]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },

    /// The process working directory is unavailable
    #[error("Cannot determine the working directory: {0}")]
    #[diagnostic(code(storytest::config::cwd))]
    Cwd(#[source] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, Error>;
