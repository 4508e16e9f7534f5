//! Test plan resolution
//!
//! Turns the raw export catalog into the ordered list of tests to generate and
//! resolves each test's auxiliary data. Suppliers run strictly in sequence.

use serde_json::Value;
use storytest_build::{ExportName, ModuleReference};
use tracing::debug;

use crate::descriptor::{AuxDataSource, DataMap, TestDescriptor};
use crate::error::{GenError, Result};

/// One planned test case
#[derive(Debug, Clone, PartialEq)]
pub struct TestPlanEntry {
    pub export_name: ExportName,
    pub display_name: String,
    /// `{exportName, modulePath, ...supplied}`
    pub aux_data: DataMap,
}

/// Exports selected when the caller supplies no filter.
///
/// A module with at most one export keeps it, whatever its name. Otherwise the
/// default export is dropped: it holds story metadata, not a story.
pub fn default_selection(exports: &[ExportName]) -> Vec<ExportName> {
    if exports.len() <= 1 {
        return exports.to_vec();
    }
    exports
        .iter()
        .filter(|name| !name.is_default())
        .cloned()
        .collect()
}

/// Merge supplied data over the fixed `exportName` and `modulePath` keys.
///
/// Key order is `exportName`, `modulePath`, then supplied keys in their own
/// order. A supplied key that repeats a fixed one replaces its value in place.
pub fn merge_data(export: &ExportName, module_path: &str, supplied: &DataMap) -> DataMap {
    let mut merged = DataMap::new();
    merged.insert(
        "exportName".to_string(),
        Value::String(export.as_str().to_string()),
    );
    merged.insert(
        "modulePath".to_string(),
        Value::String(module_path.to_string()),
    );
    for (key, value) in supplied {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Resolve the ordered test plan for `module`
pub async fn resolve_plan(
    exports: Vec<ExportName>,
    module: &ModuleReference,
    descriptor: &TestDescriptor,
) -> Result<Vec<TestPlanEntry>> {
    let selected = select_exports(exports, module, descriptor).await?;
    debug!(
        module = %module.real_path().display(),
        selected = selected.len(),
        "Selected exports for test plan"
    );

    let module_path = module.real_path().to_string_lossy().into_owned();

    let global = match &descriptor.data {
        AuxDataSource::None => Some(DataMap::new()),
        AuxDataSource::Static(map) => Some(map.clone()),
        AuxDataSource::Global(supplier) => Some(
            supplier()
                .await
                .map_err(|e| GenError::supplier("test data supplier", e))?,
        ),
        AuxDataSource::PerExport(_) => None,
    };

    let mut plan = Vec::with_capacity(selected.len());
    for export in selected {
        let supplied = match (&global, &descriptor.data) {
            (Some(map), _) => map.clone(),
            (None, AuxDataSource::PerExport(supplier)) => supplier(export.clone())
                .await
                .map_err(|e| GenError::supplier("test data supplier", e))?,
            (None, _) => DataMap::new(),
        };

        plan.push(TestPlanEntry {
            display_name: descriptor.name.title_for(&export),
            aux_data: merge_data(&export, &module_path, &supplied),
            export_name: export,
        });
    }

    Ok(plan)
}

async fn select_exports(
    exports: Vec<ExportName>,
    module: &ModuleReference,
    descriptor: &TestDescriptor,
) -> Result<Vec<ExportName>> {
    let Some(filter) = &descriptor.exports else {
        return Ok(default_selection(&exports));
    };

    let selected = filter
        .apply(exports.clone(), module.real_path().to_path_buf())
        .await
        .map_err(|e| GenError::supplier("export filter", e))?;

    if let Some(unknown) = selected.iter().find(|name| !exports.contains(name)) {
        return Err(GenError::UnknownExport {
            export: unknown.to_string(),
            module: module.real_path().to_path_buf(),
        });
    }

    Ok(selected)
}
