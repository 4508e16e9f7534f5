//! Suite assembly
//!
//! Wraps the test items of one module in a `describe` block. The title and the
//! lifecycle hooks are read off the default export at run time inside a
//! try/catch, so a malformed default export costs its title and hooks, never
//! the suite.
//!
//! The block opens by binding each planned component from `module.exports`,
//! the only place the compiled module is guaranteed to publish its exports.

use serde::Serialize;
use serde_json::Value;
use storytest_build::{DefaultExportShape, ExportName, HookSet, ModuleReference};

use crate::descriptor::DataMap;
use crate::error::{GenError, Result};
use crate::item::{CodeFragment, binding_name, js_string};
use crate::render::{Render, Template, render_with};

/// Options for [`assemble_suite`]
#[derive(Debug, Clone, Copy)]
pub struct SuiteOptions<'a> {
    /// Namespaces on the default export searched for hooks, in precedence order
    pub hook_namespaces: &'a [String],
    /// Prefer `default.title` over the file-name title when present
    pub title_from_default: bool,
    /// Assigned onto the suite context as `this.<key> = <value>`
    pub framework_settings: &'a DataMap,
}

/// A hook slot the suite resolves from the default export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HookSlot {
    slot: &'static str,
    /// Property names looked up for this slot, in order
    names: &'static [&'static str],
    /// Bound through the framework's lifecycle function of the same name
    lifecycle: bool,
}

const HOOK_SLOTS: [HookSlot; 6] = [
    HookSlot {
        slot: "before",
        names: &["before", "setup"],
        lifecycle: true,
    },
    HookSlot {
        slot: "beforeEach",
        names: &["beforeEach"],
        lifecycle: true,
    },
    HookSlot {
        slot: "afterEach",
        names: &["afterEach"],
        lifecycle: true,
    },
    HookSlot {
        slot: "after",
        names: &["after", "teardown"],
        lifecycle: true,
    },
    HookSlot {
        slot: "preRender",
        names: &["preRender"],
        lifecycle: false,
    },
    HookSlot {
        slot: "postRender",
        names: &["postRender"],
        lifecycle: false,
    },
];

impl HookSlot {
    fn present_in(&self, hooks: &HookSet) -> bool {
        match self.slot {
            "before" => hooks.before || hooks.setup,
            "beforeEach" => hooks.before_each,
            "afterEach" => hooks.after_each,
            "after" => hooks.after || hooks.teardown,
            "preRender" => hooks.pre_render,
            "postRender" => hooks.post_render,
            _ => false,
        }
    }
}

/// Hook slots worth wiring for a default export of the given shape.
///
/// `None` means inspection failed; no slot is wired in that case.
fn wired_slots(shape: Option<DefaultExportShape>) -> Vec<HookSlot> {
    match shape {
        None | Some(DefaultExportShape::Absent) => Vec::new(),
        Some(DefaultExportShape::Opaque) => HOOK_SLOTS.to_vec(),
        Some(DefaultExportShape::Literal(hooks)) => HOOK_SLOTS
            .iter()
            .filter(|slot| slot.present_in(&hooks))
            .copied()
            .collect(),
    }
}

#[derive(Serialize)]
struct SettingBinding {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct HookBinding {
    slot: &'static str,
    names: String,
    lifecycle: bool,
    message: String,
}

#[derive(Serialize)]
struct ComponentBinding {
    binding: String,
    export: String,
}

#[derive(Serialize)]
struct SuiteBindings<'a> {
    fallback_title: String,
    title_from_default: bool,
    components: Vec<ComponentBinding>,
    settings: Vec<SettingBinding>,
    namespaces: String,
    hooks: Vec<HookBinding>,
    items: Vec<&'a str>,
}

/// Wrap `items` in the suite for `module`.
///
/// `exports` are the exports the items test. `shape` is the statically
/// inspected default export, or `None` when inspection failed.
pub fn assemble_suite(
    renderer: &dyn Render,
    module: &ModuleReference,
    exports: &[ExportName],
    items: &[CodeFragment],
    shape: Option<DefaultExportShape>,
    options: &SuiteOptions<'_>,
) -> Result<String> {
    let hooks = wired_slots(shape)
        .into_iter()
        .map(|slot| HookBinding {
            slot: slot.slot,
            names: Value::from(slot.names.to_vec()).to_string(),
            lifecycle: slot.lifecycle,
            message: js_string(&format!("{} hook threw an error:", slot.slot)),
        })
        .collect();

    let bindings = SuiteBindings {
        fallback_title: js_string(&format!("{} component", module.base_name())),
        title_from_default: options.title_from_default,
        components: component_bindings(module, exports),
        settings: setting_bindings(options.framework_settings)?,
        namespaces: Value::from(options.hook_namespaces.to_vec()).to_string(),
        hooks,
        items: items.iter().map(CodeFragment::as_str).collect(),
    };

    render_with(renderer, Template::Suite, &bindings)
}

fn component_bindings(module: &ModuleReference, exports: &[ExportName]) -> Vec<ComponentBinding> {
    let mut components: Vec<ComponentBinding> = Vec::with_capacity(exports.len());
    for export in exports {
        let Some(binding) = binding_name(module, export) else {
            continue;
        };
        if components.iter().any(|component| component.binding == binding) {
            continue;
        }
        components.push(ComponentBinding {
            binding,
            export: js_string(export.as_str()),
        });
    }
    components
}

fn setting_bindings(settings: &DataMap) -> Result<Vec<SettingBinding>> {
    settings
        .iter()
        .map(|(key, value)| {
            let valid = !key.is_empty() && key.split('.').all(storytest_build::is_identifier);
            if !valid {
                return Err(GenError::InvalidSetting { key: key.clone() });
            }
            Ok(SettingBinding {
                key: key.clone(),
                value: value.to_string(),
            })
        })
        .collect()
}
