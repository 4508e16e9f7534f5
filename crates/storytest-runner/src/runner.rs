//! Isolated execution of synthesized modules

use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use storytest_build::ModuleReference;
use tracing::debug;

use crate::error::Result;
use crate::host::{ExecutionResult, SandboxScript, ScriptHost};
use crate::requires::collect_require_specifiers;
use crate::resolver::DependencyResolver;
use crate::wrap::wrap_module_source;

/// Runs program text as if it were the real module, in a fresh sandbox per call.
#[derive(Debug, Clone)]
pub struct IsolatedRunner {
    host: Arc<dyn ScriptHost>,
    shared_dir: PathBuf,
    suite_stubs: bool,
}

impl IsolatedRunner {
    /// `shared_dir` is where bare package specifiers resolve, usually
    /// `<cwd>/node_modules`.
    pub fn new(host: Arc<dyn ScriptHost>, shared_dir: impl Into<PathBuf>) -> Self {
        Self {
            host,
            shared_dir: shared_dir.into(),
            suite_stubs: true,
        }
    }

    /// Whether no-op suite globals are installed before running
    pub fn with_suite_stubs(mut self, enabled: bool) -> Self {
        self.suite_stubs = enabled;
        self
    }

    /// Prepare the script the host evaluates for `code`
    pub fn prepare(&self, module: &ModuleReference, code: &str) -> Result<SandboxScript> {
        let resolver = DependencyResolver::for_module(module, &self.shared_dir);
        let requires: IndexMap<String, String> =
            collect_require_specifiers(code, module.virtual_path())?
                .into_iter()
                .map(|specifier| {
                    let request = resolver.resolve(&specifier).to_request();
                    (specifier, request)
                })
                .collect();

        Ok(SandboxScript {
            filename: module.virtual_path().to_path_buf(),
            real_path: module.real_path().to_path_buf(),
            dirname: module.directory().to_path_buf(),
            shared_dir: self.shared_dir.clone(),
            source: wrap_module_source(code),
            requires,
            suite_stubs: self.suite_stubs,
        })
    }

    /// Run `code` for `module` and report its default export, or all exports
    /// when it has no default.
    pub async fn run(&self, module: &ModuleReference, code: &str) -> Result<ExecutionResult> {
        let script = self.prepare(module, code)?;
        debug!(
            module = %module.real_path().display(),
            requires = ?script.requires.keys().collect::<Vec<_>>(),
            "Running module in sandbox"
        );
        self.host.run(&script).await
    }
}
