//! Node.js script host
//!
//! Each run spawns the configured `node` binary with an embedded bootstrap and
//! writes the [`SandboxScript`] as JSON to its stdin. The bootstrap compiles the
//! wrapper with `vm.Script`, calls it, and prints one marked reply line on
//! stdout. Anything else the module prints is ignored.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, RunnerError};
use crate::host::{ExecutionResult, HostReply, SandboxScript, ScriptHost};

const BOOTSTRAP: &str = include_str!("../js/bootstrap.js");

/// Prefix of the reply line printed by the bootstrap
pub const RESULT_MARKER: &str = "__STORYTEST_RESULT__";

/// [`ScriptHost`] backed by a Node.js child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeScriptHost {
    binary: PathBuf,
    working_dir: Option<PathBuf>,
}

impl Default for NodeScriptHost {
    fn default() -> Self {
        Self::new("node")
    }
}

impl NodeScriptHost {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: None,
        }
    }

    /// Directory the child process starts in
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl ScriptHost for NodeScriptHost {
    async fn run(&self, script: &SandboxScript) -> Result<ExecutionResult> {
        let payload = serde_json::to_vec(script)?;

        let mut command = Command::new(&self.binary);
        command
            .arg("-e")
            .arg(BOOTSTRAP)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(
            binary = %self.binary.display(),
            module = %script.real_path.display(),
            requires = script.requires.len(),
            "Spawning script host"
        );

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            binary: self.binary.clone(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        parse_host_output(
            &String::from_utf8_lossy(&output.stdout),
            output.status,
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}

/// Extract the reply from the host's stdout.
///
/// The last marked line wins. Without one the host failed before replying.
pub(crate) fn parse_host_output(
    stdout: &str,
    status: ExitStatus,
    stderr: &str,
) -> Result<ExecutionResult> {
    let Some(line) = stdout
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(RESULT_MARKER))
    else {
        return Err(RunnerError::HostFailed {
            status: status.code(),
            stderr: stderr.to_string(),
        });
    };

    serde_json::from_str::<HostReply>(line)?.into_result()
}
