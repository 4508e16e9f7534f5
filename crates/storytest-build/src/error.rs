//! Error types for the build service

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::RuntimeError;

/// Errors raised while analyzing, compiling or normalizing a module.
///
/// These are the resolution failures of the synthesis pipeline. They are never
/// recovered from; callers propagate them unchanged.
#[derive(Error, Debug, Diagnostic)]
pub enum BuildError {
    /// The module could not be read
    #[error("Failed to read module {}: {source}", path.display())]
    #[diagnostic(code(storytest::build::read_failed))]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// The file extension does not map to a known source dialect
    #[error("Unsupported source dialect for {}", path.display())]
    #[diagnostic(
        code(storytest::build::unsupported_dialect),
        help("story modules must be .js, .jsx, .mjs, .cjs, .ts, .tsx, .mts or .cts files")
    )]
    UnsupportedDialect { path: PathBuf },

    /// The source text failed to parse
    #[error("Failed to parse {}: {}", path.display(), messages.join(", "))]
    #[diagnostic(code(storytest::build::parse_failed))]
    Parse {
        path: PathBuf,
        messages: Vec<String>,
    },

    /// Syntax lowering reported errors
    #[error("Failed to transform {}: {}", path.display(), messages.join(", "))]
    #[diagnostic(code(storytest::build::transform_failed))]
    Transform {
        path: PathBuf,
        messages: Vec<String>,
    },

    /// Rolldown failed to produce the CommonJS output
    #[error("Failed to bundle {}: {message}", path.display())]
    #[diagnostic(code(storytest::build::bundle_failed))]
    Bundle { path: PathBuf, message: String },
}

impl BuildError {
    /// Create a Parse error from parser diagnostics
    pub fn parse(path: impl Into<PathBuf>, messages: Vec<String>) -> Self {
        Self::Parse {
            path: path.into(),
            messages,
        }
    }

    /// Create a Transform error from transformer diagnostics
    pub fn transform(path: impl Into<PathBuf>, messages: Vec<String>) -> Self {
        Self::Transform {
            path: path.into(),
            messages,
        }
    }

    /// Create a Bundle error from a rolldown diagnostic batch
    pub fn bundle(path: impl Into<PathBuf>, error: &dyn std::fmt::Debug) -> Self {
        Self::Bundle {
            path: path.into(),
            message: format!("{error:?}"),
        }
    }
}

/// Result type for build service operations
pub type Result<T> = std::result::Result<T, BuildError>;
