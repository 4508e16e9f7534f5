//! End-to-end tests for the synthesis pipeline

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use storytest_build::{
    BuildError, BuildService, CompileOptions, CompiledModule, DefaultExportShape, ExportName,
    HookSet, MemoryRuntime, NormalizedSource, OxcBuildService, SourceDialect,
};
use storytest_gen::{
    ActivationPredicate, CodeTransform, ExecContext, ExportFilter, GenError, SuspensionStyle,
    SynthesisOptions, Synthesizer, TemplateRenderer, TestBody, TestDescriptor,
};

const MODULE: &str = "/project/src/Button.stories.jsx";

#[derive(Debug, Clone, Copy)]
enum Inspection {
    Shape(DefaultExportShape),
    Fails,
}

/// Build service double with identity normalization
#[derive(Debug)]
struct FakeBuildService {
    exports: Vec<ExportName>,
    analyze_fails: bool,
    inspection: Inspection,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBuildService {
    fn new(exports: &[&str]) -> Self {
        Self {
            exports: exports.iter().copied().map(ExportName::from).collect(),
            analyze_fails: false,
            inspection: Inspection::Shape(DefaultExportShape::Opaque),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BuildService for FakeBuildService {
    async fn analyze_exports(&self, module_path: &Path) -> storytest_build::Result<Vec<ExportName>> {
        self.record("analyze");
        if self.analyze_fails {
            return Err(BuildError::parse(module_path, vec!["Unexpected token".into()]));
        }
        Ok(self.exports.clone())
    }

    async fn compile_module(
        &self,
        _module_path: &Path,
        options: &CompileOptions,
    ) -> storytest_build::Result<CompiledModule> {
        self.record("compile");
        Ok(CompiledModule {
            output_text: format!("/* compiled as {} */", options.dialect.as_str()),
            exports: self.exports.clone(),
        })
    }

    async fn normalize(
        &self,
        source_text: &str,
        _virtual_path: &Path,
        _dialect: SourceDialect,
    ) -> storytest_build::Result<NormalizedSource> {
        self.record("normalize");
        Ok(NormalizedSource {
            code: source_text.to_string(),
        })
    }

    async fn inspect_default_export(
        &self,
        module_path: &Path,
        _namespaces: &[String],
    ) -> storytest_build::Result<DefaultExportShape> {
        self.record("inspect");
        match self.inspection {
            Inspection::Shape(shape) => Ok(shape),
            Inspection::Fails => Err(BuildError::parse(module_path, vec!["bad default".into()])),
        }
    }
}

fn synthesizer(build: Arc<dyn BuildService>) -> Synthesizer {
    Synthesizer::new(
        build,
        Arc::new(TemplateRenderer::new().unwrap()),
        SynthesisOptions::new("/project"),
    )
}

fn sync_descriptor() -> TestDescriptor {
    TestDescriptor::new().with_create_test(
        TestBody::inline("({ publicUrl }) => (browser) => browser.url(publicUrl)").unwrap(),
    )
}

fn items(code: &str) -> Vec<&str> {
    code.lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("it(") || line.starts_with("it.only("))
        .collect()
}

#[tokio::test]
async fn default_export_is_excluded_when_stories_exist() {
    let build = Arc::new(FakeBuildService::new(&["default", "Primary", "Secondary"]));
    let code = synthesizer(build.clone())
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap();

    assert_eq!(
        items(&code),
        [
            "it(\"Primary\", function (browser) {",
            "it(\"Secondary\", function (browser) {"
        ]
    );
    assert!(code.starts_with("/* compiled as jsx */\ndescribe("));
    assert!(code.contains("const Secondary = module.exports[\"Secondary\"];"));
    assert!(!code.contains("const Button_stories_default ="));
    assert_eq!(build.calls(), ["analyze", "compile", "inspect", "normalize"]);
}

#[tokio::test]
async fn lone_default_export_is_tested() {
    let build = Arc::new(FakeBuildService::new(&["default"]));
    let code = synthesizer(build)
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap();

    assert_eq!(items(&code), ["it(\"default\", function (browser) {"]);
    assert!(code.contains("const Button_stories_default = module.exports[\"default\"];"));
    assert!(code.contains("const component = Button_stories_default;"));
}

#[tokio::test]
async fn missing_test_body_fails_before_any_build_work() {
    let build = Arc::new(FakeBuildService::new(&["Primary"]));
    let err = synthesizer(build.clone())
        .synthesize(Path::new(MODULE), &TestDescriptor::new(), &ExecContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenError::MissingTestBody));
    assert_eq!(err.to_string(), "createTest function must be defined.");
    assert!(build.calls().is_empty());
}

#[tokio::test]
async fn async_body_awaits_each_step() {
    let build = Arc::new(FakeBuildService::new(&["Primary"]));
    let descriptor = TestDescriptor::new().with_create_test(TestBody::reference(
        "./support/createTest.js",
        "default",
        SuspensionStyle::Async,
    ));
    let code = synthesizer(build)
        .synthesize(Path::new(MODULE), &descriptor, &ExecContext::default())
        .await
        .unwrap();

    assert_eq!(items(&code), ["it(\"Primary\", async function (browser) {"]);
    assert!(code.contains("const result = await Promise.resolve(test(browser));"));
}

#[tokio::test]
async fn only_condition_sees_process_arguments() {
    let build = Arc::new(FakeBuildService::new(&["Primary", "Secondary"]));
    let descriptor = sync_descriptor().with_only_condition(ActivationPredicate::new(|ctx, args| {
        args.iter().any(|arg| arg == "--story") && ctx.export_name == "Secondary"
    }));
    let exec = ExecContext::default().with_process_arguments(vec!["--story".into()]);

    let code = synthesizer(build)
        .synthesize(Path::new(MODULE), &descriptor, &exec)
        .await
        .unwrap();

    assert_eq!(
        items(&code),
        [
            "it(\"Primary\", function (browser) {",
            "it.only(\"Secondary\", function (browser) {"
        ]
    );
}

#[tokio::test]
async fn failed_inspection_leaves_hooks_unwired() {
    let mut fake = FakeBuildService::new(&["default", "Primary"]);
    fake.inspection = Inspection::Fails;
    let code = synthesizer(Arc::new(fake))
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap();

    assert!(!code.contains("resolveStoryHook"));
    assert_eq!(items(&code).len(), 1);
}

#[tokio::test]
async fn literal_default_wires_only_declared_hooks() {
    let mut fake = FakeBuildService::new(&["default", "Primary"]);
    fake.inspection = Inspection::Shape(DefaultExportShape::Literal(HookSet {
        before_each: true,
        ..HookSet::default()
    }));
    let code = synthesizer(Arc::new(fake))
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap();

    assert!(code.contains("beforeEach(function () {"));
    assert!(!code.contains("resolved.afterEach"));
}

#[tokio::test]
async fn transform_runs_on_normalized_output() {
    let build = Arc::new(FakeBuildService::new(&["Primary"]));
    let descriptor = sync_descriptor()
        .with_transform_code(CodeTransform::new(|code| format!("\"use strict\";\n{code}")));
    let code = synthesizer(build)
        .synthesize(Path::new(MODULE), &descriptor, &ExecContext::default())
        .await
        .unwrap();

    assert!(code.starts_with("\"use strict\";\n/* compiled as jsx */"));
}

#[tokio::test]
async fn build_errors_propagate_unchanged() {
    let mut fake = FakeBuildService::new(&["Primary"]);
    fake.analyze_fails = true;
    let err = synthesizer(Arc::new(fake))
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenError::Build(BuildError::Parse { .. })));
    assert!(!err.is_precondition());
}

#[tokio::test]
async fn filter_selecting_unknown_export_is_rejected() {
    let build = Arc::new(FakeBuildService::new(&["Primary"]));
    let descriptor = sync_descriptor()
        .with_exports(ExportFilter::new(|_| vec![ExportName::from("Missing")]));
    let err = synthesizer(build)
        .synthesize(Path::new(MODULE), &descriptor, &ExecContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GenError::UnknownExport { export, .. } if export == "Missing"));
}

#[tokio::test]
async fn unsupported_extension_is_a_build_error() {
    let build = Arc::new(FakeBuildService::new(&["Primary"]));
    let err = synthesizer(build.clone())
        .synthesize(
            Path::new("/project/src/Button.stories.vue"),
            &sync_descriptor(),
            &ExecContext::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenError::Build(BuildError::UnsupportedDialect { .. })
    ));
    assert!(build.calls().is_empty());
}

#[tokio::test]
async fn synthesizes_real_module_with_oxc() {
    let runtime = MemoryRuntime::new("/project").with_file(
        "src/Button.stories.jsx",
        r#"
import { Button } from "./Button";

export default {
  title: "Example/Button",
  parameters: { beforeEach() {} },
};

export const Primary = () => <Button primary label="Button" />;
export const Secondary = () => <Button label="Button" />;
"#,
    );
    let build = Arc::new(OxcBuildService::new(Arc::new(runtime)));

    let code = synthesizer(build)
        .synthesize(Path::new(MODULE), &sync_descriptor(), &ExecContext::default())
        .await
        .unwrap();

    assert_eq!(items(&code).len(), 2);
    assert!(code.contains("require("));
    assert!(code.contains("describe("));
    assert!(code.contains("beforeEach(function"));
    assert!(!code.contains("<Button"));
}
