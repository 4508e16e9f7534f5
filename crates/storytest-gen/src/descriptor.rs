//! Synthesis request descriptor
//!
//! A [`TestDescriptor`] carries everything a caller supplies for one synthesis
//! run: how tests are named, which exports become tests, what data each test
//! receives, the test-body constructor and optional post-processing.

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use storytest_build::ExportName;

use crate::error::Result;
use crate::function::{InlineFunction, SuspensionStyle};

/// JSON object passed to generated tests as auxiliary data
pub type DataMap = Map<String, Value>;

type NameFn = dyn Fn(&ExportName) -> String + Send + Sync;
type GlobalSupplierFn = dyn Fn() -> BoxFuture<'static, anyhow::Result<DataMap>> + Send + Sync;
type PerExportSupplierFn =
    dyn Fn(ExportName) -> BoxFuture<'static, anyhow::Result<DataMap>> + Send + Sync;
type FilterFn = dyn Fn(Vec<ExportName>, PathBuf) -> BoxFuture<'static, anyhow::Result<Vec<ExportName>>>
    + Send
    + Sync;
type PredicateFn = dyn Fn(&ActivationContext<'_>, &[String]) -> bool + Send + Sync;
type TransformFn = dyn Fn(String) -> String + Send + Sync;

/// How each generated test is titled
#[derive(Clone, Default)]
pub enum TestName {
    /// Title every test with the export name
    #[default]
    FromExport,
    /// The same literal title for every test
    Literal(String),
    /// Title computed from the export name
    Computed(Arc<NameFn>),
}

impl TestName {
    pub fn computed(f: impl Fn(&ExportName) -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    pub fn title_for(&self, export: &ExportName) -> String {
        match self {
            Self::FromExport => export.to_string(),
            Self::Literal(title) => title.clone(),
            Self::Computed(f) => f(export),
        }
    }
}

impl fmt::Debug for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromExport => f.write_str("FromExport"),
            Self::Literal(title) => f.debug_tuple("Literal").field(title).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for TestName {
    fn from(title: &str) -> Self {
        Self::Literal(title.to_string())
    }
}

impl From<String> for TestName {
    fn from(title: String) -> Self {
        Self::Literal(title)
    }
}

/// Where each test's auxiliary data comes from
#[derive(Clone, Default)]
pub enum AuxDataSource {
    /// No extra data beyond `exportName` and `modulePath`
    #[default]
    None,
    /// One fixed mapping shared by every test
    Static(DataMap),
    /// Resolved once for the whole module
    Global(Arc<GlobalSupplierFn>),
    /// Resolved once per planned export
    PerExport(Arc<PerExportSupplierFn>),
}

impl AuxDataSource {
    /// Synchronous supplier resolved once for the module
    pub fn global(f: impl Fn() -> anyhow::Result<DataMap> + Send + Sync + 'static) -> Self {
        Self::Global(Arc::new(move || future::ready(f()).boxed()))
    }

    /// Asynchronous supplier resolved once for the module
    pub fn global_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<DataMap>> + Send + 'static,
    {
        Self::Global(Arc::new(move || f().boxed()))
    }

    /// Synchronous supplier called with each export name
    pub fn per_export(
        f: impl Fn(&ExportName) -> anyhow::Result<DataMap> + Send + Sync + 'static,
    ) -> Self {
        Self::PerExport(Arc::new(move |name: ExportName| {
            future::ready(f(&name)).boxed()
        }))
    }

    /// Asynchronous supplier called with each export name
    pub fn per_export_async<F, Fut>(f: F) -> Self
    where
        F: Fn(ExportName) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<DataMap>> + Send + 'static,
    {
        Self::PerExport(Arc::new(move |name: ExportName| f(name).boxed()))
    }
}

impl fmt::Debug for AuxDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Self::Global(_) => f.write_str("Global(..)"),
            Self::PerExport(_) => f.write_str("PerExport(..)"),
        }
    }
}

impl From<DataMap> for AuxDataSource {
    fn from(map: DataMap) -> Self {
        Self::Static(map)
    }
}

/// Selects which exports become tests.
///
/// Receives every export of the module and the module's real path; returns the
/// selection in the order tests should be generated.
#[derive(Clone)]
pub struct ExportFilter(Arc<FilterFn>);

impl ExportFilter {
    pub fn new(f: impl Fn(&[ExportName]) -> Vec<ExportName> + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |exports: Vec<ExportName>, _path: PathBuf| {
            future::ready(anyhow::Ok(f(&exports))).boxed()
        }))
    }

    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<ExportName>, PathBuf) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<ExportName>>> + Send + 'static,
    {
        Self(Arc::new(move |exports: Vec<ExportName>, path: PathBuf| {
            f(exports, path).boxed()
        }))
    }

    pub(crate) fn apply(
        &self,
        exports: Vec<ExportName>,
        path: PathBuf,
    ) -> BoxFuture<'static, anyhow::Result<Vec<ExportName>>> {
        (self.0)(exports, path)
    }
}

impl fmt::Debug for ExportFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExportFilter(..)")
    }
}

/// The test-body constructor embedded into every generated test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestBody {
    /// Function source re-emitted verbatim
    Inline(InlineFunction),
    /// A function exported by another module, loaded with `require`
    Reference {
        module: String,
        export: String,
        style: SuspensionStyle,
    },
}

impl TestBody {
    /// Parse inline function source
    pub fn inline(source: impl Into<String>) -> Result<Self> {
        InlineFunction::parse(source).map(Self::Inline)
    }

    pub fn reference(
        module: impl Into<String>,
        export: impl Into<String>,
        style: SuspensionStyle,
    ) -> Self {
        Self::Reference {
            module: module.into(),
            export: export.into(),
            style,
        }
    }

    pub fn style(&self) -> SuspensionStyle {
        match self {
            Self::Inline(function) => function.style(),
            Self::Reference { style, .. } => *style,
        }
    }

    /// JavaScript expression evaluating to the constructor
    pub fn expression(&self) -> String {
        match self {
            Self::Inline(function) => format!("({})", function.source().trim()),
            Self::Reference { module, export, .. } => format!(
                "require({})[{}]",
                Value::String(module.clone()),
                Value::String(export.clone())
            ),
        }
    }
}

/// What the activation predicate sees for one planned test
#[derive(Debug, Clone, Copy)]
pub struct ActivationContext<'a> {
    pub name: &'a str,
    pub export_name: &'a ExportName,
    pub module_path: &'a std::path::Path,
    pub public_url: &'a str,
}

/// Marks tests for exclusive activation (`it.only`)
#[derive(Clone)]
pub struct ActivationPredicate(Arc<PredicateFn>);

impl ActivationPredicate {
    pub fn new(
        f: impl Fn(&ActivationContext<'_>, &[String]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self, context: &ActivationContext<'_>, process_arguments: &[String]) -> bool {
        (self.0)(context, process_arguments)
    }
}

impl fmt::Debug for ActivationPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationPredicate(..)")
    }
}

/// Post-processing applied to the final compiled text
#[derive(Clone)]
pub struct CodeTransform(Arc<TransformFn>);

impl CodeTransform {
    pub fn new(f: impl Fn(String) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn apply(&self, code: String) -> String {
        (self.0)(code)
    }
}

impl fmt::Debug for CodeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeTransform(..)")
    }
}

/// Everything a caller supplies for one synthesis run
#[derive(Debug, Clone, Default)]
pub struct TestDescriptor {
    pub name: TestName,
    pub data: AuxDataSource,
    pub exports: Option<ExportFilter>,
    pub create_test: Option<TestBody>,
    pub transform_code: Option<CodeTransform>,
    pub only_condition: Option<ActivationPredicate>,
}

impl TestDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<TestName>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_data(mut self, data: impl Into<AuxDataSource>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_exports(mut self, filter: ExportFilter) -> Self {
        self.exports = Some(filter);
        self
    }

    pub fn with_create_test(mut self, body: TestBody) -> Self {
        self.create_test = Some(body);
        self
    }

    pub fn with_transform_code(mut self, transform: CodeTransform) -> Self {
        self.transform_code = Some(transform);
        self
    }

    pub fn with_only_condition(mut self, predicate: ActivationPredicate) -> Self {
        self.only_condition = Some(predicate);
        self
    }
}

/// Ambient execution context for a synthesis run
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    /// Arguments handed to the activation predicate
    pub process_arguments: Vec<String>,
    /// Suite-level settings assigned onto the suite context (`this.<key>`)
    pub framework_settings: DataMap,
    /// Extra fields passed to pre/post-render hooks
    pub metadata: DataMap,
}

impl ExecContext {
    /// Capture the current process arguments
    pub fn from_env() -> Self {
        Self {
            process_arguments: std::env::args().collect(),
            ..Self::default()
        }
    }

    pub fn with_process_arguments(mut self, args: Vec<String>) -> Self {
        self.process_arguments = args;
        self
    }

    pub fn with_framework_settings(mut self, settings: DataMap) -> Self {
        self.framework_settings = settings;
        self
    }

    pub fn with_metadata(mut self, metadata: DataMap) -> Self {
        self.metadata = metadata;
        self
    }
}
