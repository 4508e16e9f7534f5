//! # storytest
//!
//! Synthesizes executable test suites from UI story modules and runs story
//! modules in an isolated sandbox.
//!
//! - [`Storytest::synthesize`] turns a story module and a [`TestDescriptor`]
//!   into the text of a `describe`/`it` suite appended to the compiled module.
//! - [`Storytest::execute`] synthesizes and then runs the result in a fresh
//!   Node.js sandbox, returning the module's default export (or all exports).
//!
//! ```rust,no_run
//! use storytest::{ExecContext, Storytest, StorytestConfig, TestBody, TestDescriptor};
//!
//! # async fn run() -> storytest::Result<()> {
//! let engine = Storytest::new(StorytestConfig::load(None)?)?;
//! let descriptor = TestDescriptor::new().with_create_test(TestBody::inline(
//!     "({ publicUrl }) => (browser) => browser.url(publicUrl)",
//! )?);
//! let suite = engine
//!     .synthesize("src/Button.stories.jsx", &descriptor, Some(ExecContext::default()))
//!     .await?;
//! # let _ = suite;
//! # Ok(())
//! # }
//! ```
//!
//! The engine emits `tracing` events only. With the `logging` feature enabled,
//! constructing an engine installs a global subscriber at the configured
//! [`StorytestConfig::log_level`] (`RUST_LOG` directives refine it). Without the
//! feature, `log_level` is informational and the embedder's own subscriber
//! decides what is shown.

pub mod config;
pub mod error;
pub mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use storytest_build::{BuildService, NativeRuntime, OxcBuildService};
use storytest_gen::{GenError, SynthesisOptions, Synthesizer, TemplateRenderer};
use storytest_runner::{IsolatedRunner, NodeScriptHost, ScriptHost};

pub use config::StorytestConfig;
pub use error::{ConfigError, Error, Result};
pub use logging::LogLevel;
#[cfg(feature = "logging")]
pub use logging::{init_logging, init_logging_from_env};

pub use storytest_build::{ExportName, ModuleReference, SourceDialect};
pub use storytest_gen::{
    ActivationContext, ActivationPredicate, AuxDataSource, CodeTransform, DataMap, ExecContext,
    ExportFilter, SuspensionStyle, TestBody, TestDescriptor, TestName,
};
pub use storytest_runner::ExecutionResult;

/// Synthesis and execution engine
#[derive(Debug, Clone)]
pub struct Storytest {
    config: StorytestConfig,
    cwd: PathBuf,
    synthesizer: Synthesizer,
    runner: IsolatedRunner,
}

impl Storytest {
    /// Engine reading modules from disk and running them with Node.js
    pub fn new(config: StorytestConfig) -> Result<Self> {
        let cwd = config.resolved_cwd()?;
        let build = Arc::new(OxcBuildService::new(Arc::new(NativeRuntime::new())));
        let host = Arc::new(NodeScriptHost::new(&config.node_binary).with_working_dir(&cwd));
        Self::with_services(config, build, host)
    }

    /// Engine over caller-supplied collaborators
    pub fn with_services(
        config: StorytestConfig,
        build: Arc<dyn BuildService>,
        host: Arc<dyn ScriptHost>,
    ) -> Result<Self> {
        config.validate()?;
        let cwd = config.resolved_cwd()?;

        let options = SynthesisOptions {
            cwd: cwd.clone(),
            hook_namespaces: config.hook_namespaces.clone(),
            title_from_default: config.title_from_default,
        };
        let synthesizer = Synthesizer::new(build, Arc::new(TemplateRenderer::new()?), options);
        let runner = IsolatedRunner::new(host, config.resolved_dependency_dir(&cwd))
            .with_suite_stubs(config.suite_stubs);

        #[cfg(feature = "logging")]
        logging::init_logging(config.log_level);

        debug!(cwd = %cwd.display(), "Storytest engine ready");
        Ok(Self {
            config,
            cwd,
            synthesizer,
            runner,
        })
    }

    pub fn config(&self) -> &StorytestConfig {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Synthesize the test suite for the module at `path`.
    ///
    /// Without an `exec` context the current process arguments are used.
    pub async fn synthesize(
        &self,
        path: impl AsRef<Path>,
        descriptor: &TestDescriptor,
        exec: Option<ExecContext>,
    ) -> Result<String> {
        let exec = exec.unwrap_or_else(ExecContext::from_env);
        Ok(self
            .synthesizer
            .synthesize(path.as_ref(), descriptor, &exec)
            .await?)
    }

    /// Synthesize the module at `path` and run the result in a fresh sandbox.
    pub async fn execute(
        &self,
        path: impl AsRef<Path>,
        descriptor: &TestDescriptor,
    ) -> Result<ExecutionResult> {
        if descriptor.create_test.is_none() {
            return Err(GenError::MissingTestBody.into());
        }
        let module = self.synthesizer.module_reference(path.as_ref())?;
        let code = self
            .synthesizer
            .synthesize_module(&module, descriptor, &ExecContext::from_env())
            .await?;
        Ok(self.runner.run(&module, &code).await?)
    }
}
