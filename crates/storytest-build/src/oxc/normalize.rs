use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{JsxRuntime, TransformOptions, Transformer};
use std::path::Path;

use super::parse;
use crate::error::{BuildError, Result};

/// Strip TypeScript, lower JSX and print plain JavaScript.
///
/// JSX uses the classic runtime (`React.createElement`), so story modules
/// keep resolving React from their own imports. The parse goal comes from
/// `source_type`; callers pick module or script.
pub fn transpile(source: &str, path: &Path, source_type: SourceType) -> Result<String> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, source, path, source_type)?;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let mut options = TransformOptions::default();
    options.jsx.runtime = JsxRuntime::Classic;

    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        let messages = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(BuildError::transform(path, messages));
    }

    Ok(Codegen::new().build(&program).code)
}
