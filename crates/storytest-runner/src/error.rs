//! Error types for isolated execution

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running synthesized code in the sandbox
#[derive(Error, Debug, Diagnostic)]
pub enum RunnerError {
    /// The sandboxed program threw while compiling or executing
    #[error("Sandboxed module threw: {message}")]
    #[diagnostic(code(storytest::runner::execution_failed))]
    Execution {
        message: String,
        /// Stack reported by the host, when it had one
        stack: Option<String>,
    },

    /// The host exited without reporting a result
    #[error("Script host produced no result (exit status: {}){}", status.map_or_else(|| "signal".to_string(), |code| code.to_string()), stderr_suffix(stderr))]
    #[diagnostic(
        code(storytest::runner::host_failed),
        help("check that the configured Node.js binary runs and can read from stdin")
    )]
    HostFailed {
        status: Option<i32>,
        stderr: String,
    },

    /// The host process could not be started
    #[error("Failed to spawn script host '{}': {source}", binary.display())]
    #[diagnostic(
        code(storytest::runner::spawn_failed),
        help("set `nodeBinary` to a Node.js executable on this machine")
    )]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while talking to the script host: {0}")]
    #[diagnostic(code(storytest::runner::io))]
    Io(#[from] std::io::Error),

    #[error("Malformed host payload: {0}")]
    #[diagnostic(code(storytest::runner::json))]
    Json(#[from] serde_json::Error),

    /// The program text handed to the runner failed to parse
    #[error("Failed to parse {}: {}", path.display(), messages.join(", "))]
    #[diagnostic(code(storytest::runner::parse_failed))]
    Parse {
        path: PathBuf,
        messages: Vec<String>,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;
