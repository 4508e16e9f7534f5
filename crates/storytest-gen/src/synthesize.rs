//! The synthesis pipeline

use std::path::{Path, PathBuf};
use std::sync::Arc;
use storytest_build::{BuildService, CompileOptions, ExportName, ModuleReference};
use tracing::{debug, info, warn};

use crate::descriptor::{ExecContext, TestDescriptor};
use crate::error::{GenError, Result};
use crate::item::{ItemInputs, synthesize_item};
use crate::plan::resolve_plan;
use crate::recombine::recombine;
use crate::render::Render;
use crate::suite::{SuiteOptions, assemble_suite};

/// Default namespaces searched for lifecycle hooks, in precedence order
pub const DEFAULT_HOOK_NAMESPACES: [&str; 2] = ["parameters", "test"];

/// Knobs for a [`Synthesizer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Directory module paths and public URLs are relative to
    pub cwd: PathBuf,
    /// Namespaces on the default export searched for hooks, first match wins
    pub hook_namespaces: Vec<String>,
    /// Title the suite with `default.title` when the module provides one
    pub title_from_default: bool,
}

impl SynthesisOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            hook_namespaces: DEFAULT_HOOK_NAMESPACES.map(String::from).to_vec(),
            title_from_default: true,
        }
    }
}

/// Produces test-suite source for story modules.
///
/// Each call computes its module reference, export catalog and plan from
/// scratch; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    build: Arc<dyn BuildService>,
    renderer: Arc<dyn Render>,
    options: SynthesisOptions,
}

impl Synthesizer {
    pub fn new(
        build: Arc<dyn BuildService>,
        renderer: Arc<dyn Render>,
        options: SynthesisOptions,
    ) -> Self {
        Self {
            build,
            renderer,
            options,
        }
    }

    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Resolve `module_path` against the configured cwd
    pub fn module_reference(&self, module_path: &Path) -> Result<ModuleReference> {
        Ok(ModuleReference::new(module_path, &self.options.cwd)?)
    }

    /// Synthesize the final test-suite source for `module_path`.
    ///
    /// Fails with [`GenError::MissingTestBody`] before any other work when the
    /// descriptor has no test-body constructor.
    pub async fn synthesize(
        &self,
        module_path: &Path,
        descriptor: &TestDescriptor,
        exec: &ExecContext,
    ) -> Result<String> {
        if descriptor.create_test.is_none() {
            return Err(GenError::MissingTestBody);
        }
        let module = self.module_reference(module_path)?;
        self.synthesize_module(&module, descriptor, exec).await
    }

    /// Synthesize for an already resolved module reference
    pub async fn synthesize_module(
        &self,
        module: &ModuleReference,
        descriptor: &TestDescriptor,
        exec: &ExecContext,
    ) -> Result<String> {
        let body = descriptor
            .create_test
            .as_ref()
            .ok_or(GenError::MissingTestBody)?;
        let real_path = module.real_path();

        let exports = self.build.analyze_exports(real_path).await?;
        debug!(module = %real_path.display(), exports = exports.len(), "Resolved export catalog");

        let plan = resolve_plan(exports, module, descriptor).await?;

        let compiled = self
            .build
            .compile_module(
                real_path,
                &CompileOptions {
                    dialect: module.dialect(),
                },
            )
            .await?;

        let shape = match self
            .build
            .inspect_default_export(real_path, &self.options.hook_namespaces)
            .await
        {
            Ok(shape) => Some(shape),
            Err(err) => {
                warn!(
                    module = %real_path.display(),
                    error = %err,
                    "Default export inspection failed, suite hooks are not wired"
                );
                None
            }
        };

        let inputs = ItemInputs {
            module,
            body,
            only_condition: descriptor.only_condition.as_ref(),
            process_arguments: &exec.process_arguments,
            metadata: &exec.metadata,
        };
        let items = plan
            .iter()
            .map(|entry| synthesize_item(self.renderer.as_ref(), entry, &inputs))
            .collect::<Result<Vec<_>>>()?;

        let tested: Vec<ExportName> = plan.iter().map(|entry| entry.export_name.clone()).collect();
        let suite = assemble_suite(
            self.renderer.as_ref(),
            module,
            &tested,
            &items,
            shape,
            &SuiteOptions {
                hook_namespaces: &self.options.hook_namespaces,
                title_from_default: self.options.title_from_default,
                framework_settings: &exec.framework_settings,
            },
        )?;

        let code = recombine(
            self.build.as_ref(),
            module,
            &compiled.output_text,
            &suite,
            descriptor.transform_code.as_ref(),
        )
        .await?;

        info!(
            module = %real_path.display(),
            items = items.len(),
            style = body.style().as_str(),
            "Synthesized test suite"
        );
        Ok(code)
    }
}
