//! OXC-backed build service
//!
//! Every operation reads the module through the configured [`Runtime`] and
//! parses it with `oxc_parser`. Compilation hands the transpiled module to a
//! rolldown CommonJS build. Nothing is cached between calls.

mod bundle;
mod exports;
mod inspect;
mod normalize;

pub use bundle::bundle_commonjs;
pub use exports::collect_exports;
pub use normalize::transpile;

use async_trait::async_trait;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::dialect::SourceDialect;
use crate::error::{BuildError, Result};
use crate::export::ExportName;
use crate::runtime::{Runtime, RuntimeError};
use crate::service::{
    BuildService, CompileOptions, CompiledModule, DefaultExportShape, NormalizedSource,
};

/// Build service implemented on the OXC toolchain
#[derive(Debug, Clone)]
pub struct OxcBuildService {
    runtime: Arc<dyn Runtime>,
}

impl OxcBuildService {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    async fn read_source(&self, path: &Path) -> Result<(String, SourceDialect)> {
        let dialect = SourceDialect::from_path(path).ok_or_else(|| {
            BuildError::UnsupportedDialect {
                path: path.to_path_buf(),
            }
        })?;

        let read_error = |source| BuildError::Read {
            path: path.to_path_buf(),
            source,
        };
        let absolute = self.runtime.absolute(path).map_err(read_error)?;
        if !self.runtime.exists(&absolute) {
            return Err(read_error(RuntimeError::NotFound(absolute)));
        }
        let source = self
            .runtime
            .read_to_string(&absolute)
            .await
            .map_err(read_error)?;

        Ok((source, dialect))
    }
}

#[async_trait]
impl BuildService for OxcBuildService {
    async fn analyze_exports(&self, module_path: &Path) -> Result<Vec<ExportName>> {
        let (source, dialect) = self.read_source(module_path).await?;

        let allocator = Allocator::default();
        let program = parse(
            &allocator,
            &source,
            module_path,
            dialect.module_source_type(),
        )?;

        let exports = collect_exports(&program);
        debug!(
            module = %module_path.display(),
            count = exports.len(),
            "Analyzed module exports"
        );
        Ok(exports)
    }

    async fn compile_module(
        &self,
        module_path: &Path,
        options: &CompileOptions,
    ) -> Result<CompiledModule> {
        let (source, _) = self.read_source(module_path).await?;
        let source_type = options.dialect.module_source_type();

        let exports = {
            let allocator = Allocator::default();
            collect_exports(&parse(&allocator, &source, module_path, source_type)?)
        };

        // Types are stripped before bundling so imports that only feed type
        // positions never become requires.
        let esm = transpile(&source, module_path, source_type)?;
        let entry = self
            .runtime
            .absolute(module_path)
            .map_err(|source| BuildError::Read {
                path: module_path.to_path_buf(),
                source,
            })?;
        let output_text = bundle_commonjs(&entry, esm).await?;

        debug!(
            module = %module_path.display(),
            exports = exports.len(),
            "Compiled module to CommonJS"
        );
        Ok(CompiledModule {
            output_text,
            exports,
        })
    }

    async fn normalize(
        &self,
        source_text: &str,
        virtual_path: &Path,
        dialect: SourceDialect,
    ) -> Result<NormalizedSource> {
        let code = transpile(source_text, virtual_path, dialect.script_source_type())?;
        Ok(NormalizedSource { code })
    }

    async fn inspect_default_export(
        &self,
        module_path: &Path,
        namespaces: &[String],
    ) -> Result<DefaultExportShape> {
        let (source, dialect) = self.read_source(module_path).await?;

        let allocator = Allocator::default();
        let program = parse(
            &allocator,
            &source,
            module_path,
            dialect.module_source_type(),
        )?;

        Ok(inspect::default_export_shape(&program, namespaces))
    }
}

/// Parse `source`, failing on any parser diagnostic
pub(crate) fn parse<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    path: &Path,
    source_type: SourceType,
) -> Result<Program<'a>> {
    let ret = Parser::new(allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let messages = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(BuildError::parse(PathBuf::from(path), messages));
    }

    Ok(ret.program)
}
