//! Test item synthesis

use serde::Serialize;
use serde_json::{Value, json};
use storytest_build::{ExportName, ModuleReference, is_identifier};

use crate::descriptor::{ActivationContext, ActivationPredicate, DataMap, TestBody};
use crate::error::Result;
use crate::plan::TestPlanEntry;
use crate::render::{Render, Template, render_with};

/// Generated program text for one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFragment(String);

impl CodeFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Inputs shared by every item of one synthesis run
#[derive(Debug, Clone, Copy)]
pub struct ItemInputs<'a> {
    pub module: &'a ModuleReference,
    pub body: &'a TestBody,
    pub only_condition: Option<&'a ActivationPredicate>,
    pub process_arguments: &'a [String],
    pub metadata: &'a DataMap,
}

#[derive(Serialize)]
struct ItemBindings {
    suspension: &'static str,
    only: bool,
    title: String,
    create_test: String,
    context: String,
    component: String,
    hook_context: String,
    pre_render_message: String,
    post_render_message: String,
}

/// Render the test case for one plan entry.
///
/// The activation predicate is evaluated exactly once per call.
pub fn synthesize_item(
    renderer: &dyn Render,
    entry: &TestPlanEntry,
    inputs: &ItemInputs<'_>,
) -> Result<CodeFragment> {
    let module = inputs.module;
    let title = entry.display_name.as_str();

    let only = inputs.only_condition.is_some_and(|predicate| {
        let context = ActivationContext {
            name: title,
            export_name: &entry.export_name,
            module_path: module.real_path(),
            public_url: module.public_url(),
        };
        predicate.evaluate(&context, inputs.process_arguments)
    });

    let context = json!({
        "data": entry.aux_data,
        "publicUrl": module.public_url(),
        "modulePath": module.real_path().to_string_lossy(),
        "exportName": entry.export_name.as_str(),
    });

    let mut hook_context = inputs.metadata.clone();
    hook_context.insert("name".into(), json!(entry.export_name.as_str()));
    hook_context.insert("title".into(), json!(title));

    let bindings = ItemBindings {
        suspension: inputs.body.style().as_str(),
        only,
        title: js_string(title),
        create_test: inputs.body.expression(),
        context: context.to_string(),
        component: component_binding(module, &entry.export_name),
        hook_context: Value::Object(hook_context).to_string(),
        pre_render_message: js_string(&format!(
            "preRender test hook threw an error for \"{title}\" story:"
        )),
        post_render_message: js_string(&format!(
            "postRender test hook threw an error for \"{title}\" story:"
        )),
    };

    render_with(renderer, Template::TestItem, &bindings).map(CodeFragment)
}

/// Names the generated suite and test items declare or call themselves
const SUITE_NAMES: [&str; 24] = [
    "module",
    "exports",
    "require",
    "describe",
    "it",
    "before",
    "beforeEach",
    "afterEach",
    "after",
    "console",
    "Error",
    "String",
    "Promise",
    "undefined",
    "arguments",
    "storyHooks",
    "augmentHookError",
    "resolveStoryHook",
    "browser",
    "test",
    "result",
    "data",
    "component",
    "outcome",
];

/// Binding the suite declares for `export`, read from `module.exports`.
///
/// The default export is bound as the module's default binding, a named export
/// under its own name. `None` for names that cannot be a binding or would
/// shadow something the generated code refers to.
pub fn binding_name(module: &ModuleReference, export: &ExportName) -> Option<String> {
    let default_binding = module.default_binding();
    if export.is_default() {
        return Some(default_binding);
    }

    let name = export.as_str();
    let usable = is_identifier(name) && !SUITE_NAMES.contains(&name) && name != default_binding;
    usable.then(|| name.to_string())
}

/// Expression the generated test reads the component from
pub fn component_binding(module: &ModuleReference, export: &ExportName) -> String {
    binding_name(module, export)
        .unwrap_or_else(|| format!("module.exports[{}]", js_string(export.as_str())))
}

pub(crate) fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SuspensionStyle;
    use crate::plan::merge_data;
    use crate::render::TemplateRenderer;

    fn module() -> ModuleReference {
        ModuleReference::new("/project/src/Button.stories.jsx", "/project").unwrap()
    }

    fn entry(export: &str) -> TestPlanEntry {
        let export_name = ExportName::from(export);
        TestPlanEntry {
            display_name: export.to_string(),
            aux_data: merge_data(&export_name, "/project/src/Button.stories.jsx", &DataMap::new()),
            export_name,
        }
    }

    fn render(body: &TestBody, export: &str, only: Option<&ActivationPredicate>) -> String {
        let renderer = TemplateRenderer::new().unwrap();
        let module = module();
        let metadata = DataMap::new();
        let inputs = ItemInputs {
            module: &module,
            body,
            only_condition: only,
            process_arguments: &[],
            metadata: &metadata,
        };
        synthesize_item(&renderer, &entry(export), &inputs)
            .unwrap()
            .into_string()
    }

    #[test]
    fn sync_body_is_never_awaited() {
        let body = TestBody::inline("({ data }) => (browser) => data").unwrap();
        let code = render(&body, "Primary", None);

        assert!(code.starts_with("it(\"Primary\", function (browser) {"));
        assert!(code.contains("const test = (({ data }) => (browser) => data)({\"data\":{\"exportName\":\"Primary\",\"modulePath\":\"/project/src/Button.stories.jsx\"},\"publicUrl\":\"/src/Button.stories.jsx\",\"modulePath\":\"/project/src/Button.stories.jsx\",\"exportName\":\"Primary\"});"));
        assert!(code.contains("const result = test(browser);"));
        assert!(code.contains("outcome = component.test(browser, data);"));
        assert!(!code.contains("await"));
    }

    #[test]
    fn async_body_awaits_every_step_in_order() {
        let body = TestBody::reference("./createTest.js", "default", SuspensionStyle::Async);
        let code = render(&body, "Primary", None);

        assert!(code.starts_with("it(\"Primary\", async function (browser) {"));
        let construct = code
            .find("const test = await Promise.resolve(require(\"./createTest.js\")[\"default\"]({")
            .unwrap();
        let invoke = code
            .find("const result = await Promise.resolve(test(browser));")
            .unwrap();
        let normalize = code
            .find("const data = result === null || result === undefined ? {} : result;")
            .unwrap();
        let capability = code
            .find("outcome = await Promise.resolve(component.test(browser, data));")
            .unwrap();
        assert!(construct < invoke && invoke < normalize && normalize < capability);
    }

    #[test]
    fn default_export_uses_default_binding() {
        let body = TestBody::inline("() => () => {}").unwrap();
        let code = render(&body, "default", None);
        assert!(code.contains("const component = Button_stories_default;"));
    }

    #[test]
    fn non_identifier_export_reads_module_exports() {
        assert_eq!(
            component_binding(&module(), &ExportName::from("with-dash")),
            "module.exports[\"with-dash\"]"
        );
        assert_eq!(
            component_binding(&module(), &ExportName::from("Primary")),
            "Primary"
        );
    }

    #[test]
    fn exports_named_like_generated_locals_are_not_bound() {
        for name in ["component", "describe", "module", "Button_stories_default"] {
            let export = ExportName::from(name);
            assert_eq!(binding_name(&module(), &export), None, "{name}");
            assert_eq!(
                component_binding(&module(), &export),
                format!("module.exports[\"{name}\"]")
            );
        }
    }

    #[test]
    fn activation_predicate_marks_only() {
        let body = TestBody::inline("() => () => {}").unwrap();
        let predicate = ActivationPredicate::new(|ctx, _| ctx.export_name == "Primary");

        assert!(render(&body, "Primary", Some(&predicate)).starts_with("it.only(\"Primary\""));
        assert!(render(&body, "Secondary", Some(&predicate)).starts_with("it(\"Secondary\""));
    }

    #[test]
    fn hook_messages_name_the_story() {
        let body = TestBody::inline("() => () => {}").unwrap();
        let code = render(&body, "Primary", None);
        assert!(code.contains(
            "throw augmentHookError(err, \"preRender test hook threw an error for \\\"Primary\\\" story:\");"
        ));
        assert!(code.contains("storyHooks.preRender.call(this, {\"name\":\"Primary\",\"title\":\"Primary\"});"));
    }
}
