//! Template rendering boundary
//!
//! Synthesis never formats JavaScript by hand: it builds a bindings object and
//! asks a [`Render`] implementation for text. Every binding that lands in the
//! output as a literal is already JSON-encoded, so templates only place values.

use minijinja::{AutoEscape, Environment, State, UndefinedBehavior};
use serde::Serialize;
use std::fmt;

use crate::error::Result;

/// Templates known to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// One `it(...)` test case
    TestItem,
    /// The `describe(...)` wrapper around all test cases of a module
    Suite,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Self::TestItem => "test_item.js",
            Self::Suite => "suite.js",
        }
    }
}

/// Renders a template with serialized bindings
pub trait Render: Send + Sync + fmt::Debug {
    fn render(&self, template: Template, bindings: &serde_json::Value) -> Result<String>;
}

/// Serialize `bindings` and render them
pub fn render_with<B: Serialize>(
    renderer: &dyn Render,
    template: Template,
    bindings: &B,
) -> Result<String> {
    let value = serde_json::to_value(bindings).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::BadSerialization, e.to_string())
    })?;
    renderer.render(template, &value)
}

/// [`Render`] implementation over the built-in minijinja templates
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_function("awaited", awaited);

        env.add_template(
            Template::TestItem.name(),
            include_str!("../templates/test_item.js.j2"),
        )?;
        env.add_template(Template::Suite.name(), include_str!("../templates/suite.js.j2"))?;

        Ok(Self { env })
    }
}

impl fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl Render for TemplateRenderer {
    fn render(&self, template: Template, bindings: &serde_json::Value) -> Result<String> {
        let tmpl = self.env.get_template(template.name())?;
        Ok(tmpl.render(bindings)?)
    }
}

/// `awaited(expr)`: awaits `expr` when the bound `suspension` is `"async"`
fn awaited(state: &State, expr: String) -> String {
    let is_async = state
        .lookup("suspension")
        .is_some_and(|value| value.as_str() == Some("async"));

    if is_async {
        format!("await Promise.resolve({expr})")
    } else {
        expr
    }
}
