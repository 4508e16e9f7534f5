use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier naming one export of a source module.
///
/// `"default"` denotes the module's default export, which is looked up and
/// named differently from named exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportName(String);

impl ExportName {
    /// Name of the default export.
    pub const DEFAULT: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The default export's name.
    pub fn default_export() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExportName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ExportName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ExportName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ExportName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ExportName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_export_is_recognised() {
        assert!(ExportName::default_export().is_default());
        assert!(ExportName::from("default").is_default());
        assert!(!ExportName::from("Primary").is_default());
    }

    #[test]
    fn compares_against_plain_strings() {
        let name = ExportName::from("Primary");
        assert_eq!(name, "Primary");
        assert_eq!(name.to_string(), "Primary");
    }
}
