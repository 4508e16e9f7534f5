//! CommonJS function wrapper around sandboxed program text

/// Parameters of the wrapper function, in call order
pub const WRAPPER_PARAMS: [&str; 4] = ["module", "require", "__filename", "__dirname"];

/// Wrap `code` in a function expression taking the module-scope values.
///
/// Evaluating the result yields the function; the host calls it with a fresh
/// module object, the sandbox `require` and the real module's file identity.
/// `exports` aliases `module.exports` inside the body.
pub fn wrap_module_source(code: &str) -> String {
    format!(
        "(function ({}) {{\nvar exports = module.exports;\n{code}\n}})",
        WRAPPER_PARAMS.join(", ")
    )
}
