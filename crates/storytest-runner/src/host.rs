//! The script host boundary
//!
//! A [`ScriptHost`] evaluates one [`SandboxScript`] in a fresh context and
//! reports what the module exported. The runner never evaluates JavaScript
//! itself.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, RunnerError};

/// Everything a host needs to run one sandboxed module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxScript {
    /// Name the script is compiled under, for stack traces
    pub filename: PathBuf,
    /// `__filename` seen by the module
    pub real_path: PathBuf,
    /// `__dirname` seen by the module
    pub dirname: PathBuf,
    /// Wrapper function source, see [`wrap_module_source`](crate::wrap_module_source)
    pub source: String,
    /// Where bare package specifiers resolve
    pub shared_dir: PathBuf,
    /// Loader requests for the literal `require` specifiers in `source`.
    ///
    /// Specifiers missing here, computed ones included, are resolved when
    /// `require` is called, by the same rules as
    /// [`DependencyResolver`](crate::DependencyResolver).
    pub requires: IndexMap<String, String>,
    /// Install no-op `describe`/`it`/hook globals before running
    pub suite_stubs: bool,
}

/// What a sandboxed module produced.
///
/// Values are JSON projections of the JavaScript values: functions become
/// `"[Function: name]"` strings, errors become `{ name, message }`, and a
/// repeated object reference becomes `"[Circular]"`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// The module had a `default` export; this is its value
    DefaultExport(Value),
    /// The module had no `default` export; this is the whole export object
    ExportMap(Value),
}

impl ExecutionResult {
    pub fn value(&self) -> &Value {
        match self {
            Self::DefaultExport(value) | Self::ExportMap(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::DefaultExport(value) | Self::ExportMap(value) => value,
        }
    }

    pub fn is_default_export(&self) -> bool {
        matches!(self, Self::DefaultExport(_))
    }
}

/// Reply line printed by a host
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HostReply {
    ok: bool,
    #[serde(default)]
    kind: Option<ExportKind>,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stack: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExportKind {
    Default,
    Exports,
}

impl HostReply {
    pub(crate) fn into_result(self) -> Result<ExecutionResult> {
        if !self.ok {
            return Err(RunnerError::Execution {
                message: self
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
                stack: self.stack,
            });
        }
        Ok(match self.kind {
            Some(ExportKind::Default) => ExecutionResult::DefaultExport(self.value),
            Some(ExportKind::Exports) | None => ExecutionResult::ExportMap(self.value),
        })
    }
}

/// Evaluates sandboxed scripts
#[async_trait]
pub trait ScriptHost: Send + Sync + fmt::Debug {
    /// Run `script` in a fresh context.
    ///
    /// Errors thrown by the script surface as [`RunnerError::Execution`];
    /// nothing is retried or recovered.
    async fn run(&self, script: &SandboxScript) -> Result<ExecutionResult>;
}
