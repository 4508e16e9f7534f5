//! Source recombination

use storytest_build::{BuildService, ModuleReference};

use crate::descriptor::CodeTransform;
use crate::error::Result;

/// Join the compiled module with its suite and normalize the result.
///
/// The build service output is returned unchanged apart from the optional
/// caller transform, which runs last.
pub async fn recombine(
    build: &dyn BuildService,
    module: &ModuleReference,
    compiled: &str,
    suite: &str,
    transform: Option<&CodeTransform>,
) -> Result<String> {
    let source = format!("{compiled}\n{suite}\n");
    let normalized = build
        .normalize(&source, module.virtual_path(), module.dialect())
        .await?;

    Ok(match transform {
        Some(transform) => transform.apply(normalized.code),
        None => normalized.code,
    })
}
