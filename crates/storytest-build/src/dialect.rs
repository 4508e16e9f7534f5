//! Source dialects recognised by the build service

use oxc_span::SourceType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The declared source dialect of a module, inferred from its file extension.
///
/// The dialect decides which syntax the parser accepts and which lowering
/// passes normalization runs (TypeScript stripping, JSX lowering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDialect {
    Js,
    Jsx,
    Ts,
    Tsx,
}

impl SourceDialect {
    /// Infer the dialect from a file extension (`jsx`, `.tsx`, ...)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(Self::Js),
            "jsx" => Some(Self::Jsx),
            "ts" | "mts" | "cts" => Some(Self::Ts),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Infer the dialect from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }

    pub fn is_jsx(self) -> bool {
        matches!(self, Self::Jsx | Self::Tsx)
    }

    /// Source type for parsing the module as an ES module
    pub fn module_source_type(self) -> SourceType {
        SourceType::mjs()
            .with_module(true)
            .with_typescript(self.is_typescript())
            .with_jsx(self.is_jsx())
    }

    /// Source type for a complete script unit such as a generated suite
    pub fn script_source_type(self) -> SourceType {
        SourceType::mjs()
            .with_script(true)
            .with_typescript(self.is_typescript())
            .with_jsx(self.is_jsx())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Jsx => "jsx",
            Self::Ts => "ts",
            Self::Tsx => "tsx",
        }
    }
}

impl std::fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
