//! Tests for the OXC build service over in-memory modules

use std::path::Path;
use std::sync::Arc;

use storytest_build::{
    BuildError, BuildService, CompileOptions, DefaultExportShape, ExportName, MemoryRuntime,
    ModuleReference, OxcBuildService, SourceDialect,
};

const BUTTON_STORIES: &str = r#"
import React from "react";
import { Button } from "./Button";

export default {
  title: "Example/Button",
  component: Button,
  parameters: {
    beforeEach() {},
  },
};

export const Primary = { args: { primary: true, label: "Button" } };
export const Secondary = { args: { label: "Button" } };
export const Large = () => <Button size="large" label="Button" />;
export const Small = () => <Button size="small" label="Button" />;
"#;

const CARD_STORIES: &str = r#"
import type { Meta, StoryObj } from "@storybook/react";
import { Card } from "./Card";

const meta: Meta<typeof Card> = { title: "Card", component: Card };
export default meta;

type Story = StoryObj<typeof Card>;

export const Basic: Story = { args: { title: "Hello" } };
"#;

fn service() -> OxcBuildService {
    let runtime = MemoryRuntime::new("/project")
        .with_file("stories/Button.stories.jsx", BUTTON_STORIES)
        .with_file("stories/Card.stories.tsx", CARD_STORIES)
        .with_file("stories/Broken.stories.js", "export const = ;");
    OxcBuildService::new(Arc::new(runtime))
}

fn names(exports: &[ExportName]) -> Vec<&str> {
    exports.iter().map(ExportName::as_str).collect()
}

#[tokio::test]
async fn analyzes_exports_in_source_order() {
    let exports = service()
        .analyze_exports(Path::new("/project/stories/Button.stories.jsx"))
        .await
        .unwrap();

    assert_eq!(
        names(&exports),
        ["default", "Primary", "Secondary", "Large", "Small"]
    );
}

#[tokio::test]
async fn typescript_type_exports_are_not_reported() {
    let exports = service()
        .analyze_exports(Path::new("/project/stories/Card.stories.tsx"))
        .await
        .unwrap();

    assert_eq!(names(&exports), ["default", "Basic"]);
}

#[tokio::test]
async fn compiles_jsx_module_to_commonjs() {
    let module = ModuleReference::new("stories/Button.stories.jsx", "/project").unwrap();
    let options = CompileOptions {
        dialect: module.dialect(),
    };

    let compiled = service()
        .compile_module(module.real_path(), &options)
        .await
        .unwrap();
    let text = &compiled.output_text;

    assert!(text.contains("require(\"react\")"));
    assert!(text.contains("require(\"./Button\")"));
    assert!(text.contains("createElement"));
    assert!(text.contains("Example/Button"));
    assert!(!text.contains("export default"));
    assert!(!text.contains("export const"));
    assert!(!text.contains("import React"));
    assert!(!text.contains("<Button"));
    assert_eq!(
        names(&compiled.exports),
        ["default", "Primary", "Secondary", "Large", "Small"]
    );
}

#[tokio::test]
async fn compile_elides_type_only_imports() {
    let module = ModuleReference::new("stories/Card.stories.tsx", "/project").unwrap();
    let options = CompileOptions {
        dialect: SourceDialect::Tsx,
    };

    let compiled = service()
        .compile_module(module.real_path(), &options)
        .await
        .unwrap();

    assert!(!compiled.output_text.contains("@storybook/react"));
    assert!(compiled.output_text.contains("require(\"./Card\")"));
    assert!(!compiled.output_text.contains("StoryObj"));
    assert_eq!(names(&compiled.exports), ["default", "Basic"]);
}

#[tokio::test]
async fn compile_reports_missing_module_before_bundling() {
    let options = CompileOptions {
        dialect: SourceDialect::Js,
    };

    let err = service()
        .compile_module(Path::new("/project/stories/Gone.stories.js"), &options)
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Read { .. }));
}

#[tokio::test]
async fn normalize_runs_on_text_not_files() {
    let normalized = service()
        .normalize(
            "const label: string = \"x\";\nmodule.exports.label = label;",
            Path::new("/project/stories/Virtual.storytest.ts"),
            SourceDialect::Ts,
        )
        .await
        .unwrap();

    assert!(normalized.code.contains("const label = \"x\";"));
}

#[tokio::test]
async fn inspects_default_export_hooks() {
    let namespaces = vec!["parameters".to_string(), "test".to_string()];
    let shape = service()
        .inspect_default_export(Path::new("/project/stories/Button.stories.jsx"), &namespaces)
        .await
        .unwrap();

    let DefaultExportShape::Literal(hooks) = shape else {
        panic!("expected a literal default export, got {shape:?}");
    };
    assert!(hooks.before_each);
    assert!(!hooks.after);
}

#[tokio::test]
async fn missing_module_is_read_error() {
    let err = service()
        .analyze_exports(Path::new("/project/stories/Missing.stories.js"))
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Read { .. }));
}

#[tokio::test]
async fn unparsable_module_is_parse_error() {
    let err = service()
        .analyze_exports(Path::new("/project/stories/Broken.stories.js"))
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::Parse { .. }));
}

#[tokio::test]
async fn unknown_extension_is_rejected() {
    let err = service()
        .analyze_exports(Path::new("/project/stories/Button.vue"))
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::UnsupportedDialect { .. }));
}
