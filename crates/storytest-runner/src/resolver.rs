//! Dependency resolution for sandboxed modules
//!
//! The sandbox sees the synthesized text as if it were the real story module:
//! relative specifiers resolve next to the real file, bare package names
//! resolve in the shared dependency directory.

use path_clean::PathClean;
use std::path::{Path, PathBuf};
use storytest_build::ModuleReference;

/// Node.js core modules, loadable with or without the `node:` scheme
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether `specifier` names a Node.js core module (`fs`, `fs/promises`, `node:test`)
pub fn is_node_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&root)
}

/// What a specifier resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Handed to the host loader unchanged
    Builtin(String),
    /// An absolute path for the host loader
    Path(PathBuf),
}

impl Resolution {
    /// The string the host loader receives
    pub fn to_request(&self) -> String {
        match self {
            Self::Builtin(name) => name.clone(),
            Self::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

/// Resolves `require` specifiers on behalf of one sandboxed module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyResolver {
    module_dir: PathBuf,
    shared_dir: PathBuf,
}

impl DependencyResolver {
    pub fn new(module_dir: impl Into<PathBuf>, shared_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_dir: module_dir.into(),
            shared_dir: shared_dir.into(),
        }
    }

    /// Resolver for the real location of `module`
    pub fn for_module(module: &ModuleReference, shared_dir: impl Into<PathBuf>) -> Self {
        Self::new(module.directory(), shared_dir)
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    pub fn shared_dir(&self) -> &Path {
        &self.shared_dir
    }

    pub fn resolve(&self, specifier: &str) -> Resolution {
        let path = Path::new(specifier);
        if path.is_absolute() {
            Resolution::Path(path.to_path_buf())
        } else if specifier.starts_with('.') {
            Resolution::Path(self.module_dir.join(path).clean())
        } else if is_node_builtin(specifier) {
            Resolution::Builtin(specifier.to_string())
        } else {
            Resolution::Path(self.shared_dir.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DependencyResolver {
        DependencyResolver::new("/project/src/components", "/project/node_modules")
    }

    #[test]
    fn relative_specifiers_resolve_against_module_dir() {
        assert_eq!(
            resolver().resolve("./Button"),
            Resolution::Path(PathBuf::from("/project/src/components/Button"))
        );
        assert_eq!(
            resolver().resolve("../theme/colors.js"),
            Resolution::Path(PathBuf::from("/project/src/theme/colors.js"))
        );
    }

    #[test]
    fn bare_specifiers_resolve_against_shared_dir() {
        assert_eq!(
            resolver().resolve("react"),
            Resolution::Path(PathBuf::from("/project/node_modules/react"))
        );
        assert_eq!(
            resolver().resolve("@storybook/test"),
            Resolution::Path(PathBuf::from("/project/node_modules/@storybook/test"))
        );
    }

    #[test]
    fn absolute_specifiers_are_unchanged() {
        assert_eq!(
            resolver().resolve("/opt/shared/helpers.js"),
            Resolution::Path(PathBuf::from("/opt/shared/helpers.js"))
        );
    }

    #[test]
    fn builtins_pass_through() {
        for specifier in ["path", "fs/promises", "node:test"] {
            assert_eq!(
                resolver().resolve(specifier),
                Resolution::Builtin(specifier.to_string())
            );
        }
        assert!(!is_node_builtin("pathological"));
    }

    #[test]
    fn resolver_follows_module_location() {
        let module = ModuleReference::new("src/Button.stories.jsx", "/project").unwrap();
        let resolver = DependencyResolver::for_module(&module, "/project/node_modules");
        assert_eq!(resolver.module_dir(), Path::new("/project/src"));
        assert_eq!(
            resolver.resolve("./Button").to_request(),
            "/project/src/Button"
        );
    }
}
