//! Error types for test-suite synthesis

use miette::Diagnostic;
use std::path::PathBuf;
use storytest_build::BuildError;
use thiserror::Error;

/// Errors that can occur while synthesizing a test suite
#[derive(Error, Debug, Diagnostic)]
pub enum GenError {
    /// No test-body constructor was supplied
    #[error("createTest function must be defined.")]
    #[diagnostic(code(storytest::gen::missing_test_body))]
    MissingTestBody,

    /// Inline test-body source is not a function
    #[error("Invalid test body: {reason}")]
    #[diagnostic(
        code(storytest::gen::invalid_test_body),
        help("createTest must be a function or arrow function expression")
    )]
    InvalidTestBody { reason: String },

    /// The export filter selected an export the module does not have
    #[error("Export '{export}' selected for {} does not exist", module.display())]
    #[diagnostic(code(storytest::gen::unknown_export))]
    UnknownExport { export: String, module: PathBuf },

    /// A caller-supplied callback failed
    #[error("{what} failed: {source}")]
    #[diagnostic(code(storytest::gen::supplier_failed))]
    Supplier {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A framework setting key cannot be emitted as a property path
    #[error("Invalid framework setting key: '{key}'")]
    #[diagnostic(
        code(storytest::gen::invalid_setting),
        help("setting keys are dotted identifier paths such as `desiredCapabilities.browserName`")
    )]
    InvalidSetting { key: String },

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    #[diagnostic(code(storytest::gen::template_failed))]
    Template(#[from] minijinja::Error),

    /// The build service failed to analyze, compile or normalize the module
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),
}

impl GenError {
    /// Create an InvalidTestBody error
    pub fn invalid_test_body(reason: impl Into<String>) -> Self {
        Self::InvalidTestBody {
            reason: reason.into(),
        }
    }

    /// Wrap a callback failure
    pub fn supplier(what: &'static str, source: anyhow::Error) -> Self {
        Self::Supplier { what, source }
    }

    /// Whether this error describes the shape of the request rather than the module
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingTestBody | Self::InvalidTestBody { .. } | Self::InvalidSetting { .. }
        )
    }
}

/// Result type for synthesis operations
pub type Result<T> = std::result::Result<T, GenError>;
