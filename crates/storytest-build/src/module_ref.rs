//! Three-way identity of a story module

use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};

use crate::dialect::SourceDialect;
use crate::error::{BuildError, Result};

/// Marker inserted before the extension of the virtual path
const VIRTUAL_MARKER: &str = "storytest";

/// Identifies a source module three ways.
///
/// - `real_path`: absolute filesystem identity used for dependency resolution
/// - `virtual_path`: sibling path the build service uses for the synthesized unit
/// - `public_url`: cwd-relative display path, always starting with `/`
///
/// Created once per synthesis request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    real_path: PathBuf,
    virtual_path: PathBuf,
    public_url: String,
    dialect: SourceDialect,
}

impl ModuleReference {
    /// Build the reference for `path`, resolving relative paths against `cwd`.
    ///
    /// Fails with [`BuildError::UnsupportedDialect`] when the extension names no
    /// known dialect.
    pub fn new(path: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let cwd = cwd.as_ref();

        let real_path = if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            cwd.join(path).clean()
        };

        let dialect =
            SourceDialect::from_path(&real_path).ok_or_else(|| BuildError::UnsupportedDialect {
                path: real_path.clone(),
            })?;

        let virtual_path = virtual_sibling(&real_path);
        let public_url = public_url(&real_path, &cwd.to_path_buf().clean());

        Ok(Self {
            real_path,
            virtual_path,
            public_url,
            dialect,
        })
    }

    pub fn real_path(&self) -> &Path {
        &self.real_path
    }

    pub fn virtual_path(&self) -> &Path {
        &self.virtual_path
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    pub fn dialect(&self) -> SourceDialect {
        self.dialect
    }

    /// File name with extension, e.g. `Button.stories.jsx`
    pub fn base_name(&self) -> &str {
        self.real_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Directory containing the real module
    pub fn directory(&self) -> &Path {
        self.real_path.parent().unwrap_or_else(|| Path::new("/"))
    }

    /// Binding the compiled module assigns its default export to
    pub fn default_binding(&self) -> String {
        default_binding_name(&self.real_path)
    }
}

/// Name of the binding holding a module's default export.
///
/// The file stem (name without its last extension) has every character that
/// cannot appear in an identifier, dots included, replaced with `_`, and
/// `_default` appended: `Button.stories.jsx` gives `Button_stories_default`.
pub fn default_binding_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");

    let mut binding: String = stem
        .chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect();

    if binding.is_empty() || binding.starts_with(|c: char| c.is_ascii_digit()) {
        binding.insert(0, '_');
    }

    binding.push_str("_default");
    binding
}

/// Words that cannot name a binding in strict-mode JavaScript
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be used as a plain JavaScript binding name
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) if is_identifier_char(first) && !first.is_ascii_digit() => {
            chars.all(is_identifier_char)
        }
        _ => false,
    };
    well_formed && !RESERVED_WORDS.contains(&name)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn virtual_sibling(real_path: &Path) -> PathBuf {
    let stem = real_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("module");

    let name = match real_path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{stem}.{VIRTUAL_MARKER}.{ext}"),
        None => format!("{stem}.{VIRTUAL_MARKER}"),
    };

    real_path.with_file_name(name)
}

fn public_url(real_path: &Path, cwd: &Path) -> String {
    let relative = real_path.strip_prefix(cwd).unwrap_or(real_path);

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    format!("/{}", parts.join("/"))
}
