//! The build service boundary
//!
//! Synthesis treats the build service as an opaque collaborator: it reports a
//! module's exports, compiles the module into CommonJS text and normalizes a
//! finished source unit for a dialect. `OxcBuildService` is the in-tree
//! implementation; hosts can substitute their own.

use async_trait::async_trait;
use std::path::Path;

use crate::dialect::SourceDialect;
use crate::error::Result;
use crate::export::ExportName;

/// Options for [`BuildService::compile_module`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Dialect the module is written in
    pub dialect: SourceDialect,
}

/// Output of [`BuildService::compile_module`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledModule {
    /// Module body as CommonJS, assigning each export onto `exports`
    pub output_text: String,
    /// Exports of the module, in source order
    pub exports: Vec<ExportName>,
}

/// Output of [`BuildService::normalize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSource {
    pub code: String,
}

/// Lifecycle hook names found on a statically known default export.
///
/// A hook counts as present when it appears either directly on the default
/// export object or inside one of its namespace objects (`parameters`, `test`
/// by default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookSet {
    pub before: bool,
    pub before_each: bool,
    pub after_each: bool,
    pub after: bool,
    pub setup: bool,
    pub teardown: bool,
    pub pre_render: bool,
    pub post_render: bool,
}

impl HookSet {
    /// Mark a hook by its JavaScript property name. Unknown names are ignored.
    pub fn mark(&mut self, name: &str) {
        match name {
            "before" => self.before = true,
            "beforeEach" => self.before_each = true,
            "afterEach" => self.after_each = true,
            "after" => self.after = true,
            "setup" => self.setup = true,
            "teardown" => self.teardown = true,
            "preRender" => self.pre_render = true,
            "postRender" => self.post_render = true,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What static inspection could tell about a module's default export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultExportShape {
    /// The module has no default export
    Absent,
    /// A default export exists but its shape is only known at run time
    Opaque,
    /// An object literal whose hook properties are statically known
    Literal(HookSet),
}

/// Build service collaborator
#[async_trait]
pub trait BuildService: Send + Sync + std::fmt::Debug {
    /// Export names of the module at `module_path`, in source order
    async fn analyze_exports(&self, module_path: &Path) -> Result<Vec<ExportName>>;

    /// Compile the module into CommonJS text
    async fn compile_module(
        &self,
        module_path: &Path,
        options: &CompileOptions,
    ) -> Result<CompiledModule>;

    /// Normalize a complete source unit for `dialect`.
    ///
    /// `virtual_path` names the unit in diagnostics; nothing is read from it.
    async fn normalize(
        &self,
        source_text: &str,
        virtual_path: &Path,
        dialect: SourceDialect,
    ) -> Result<NormalizedSource>;

    /// Statically inspect the default export for lifecycle hooks.
    ///
    /// `namespaces` names the nested objects hooks may also live in. Services
    /// that cannot inspect modules report [`DefaultExportShape::Opaque`], which
    /// wires every hook slot defensively.
    async fn inspect_default_export(
        &self,
        _module_path: &Path,
        _namespaces: &[String],
    ) -> Result<DefaultExportShape> {
        Ok(DefaultExportShape::Opaque)
    }
}
