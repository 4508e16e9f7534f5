//! Layered configuration
//!
//! Priority: environment variables (`STORYTEST_*`) > config file > defaults.
//! The config file is `storytest.toml` in the process working directory, or an
//! explicitly named `.toml`/`.json` file.

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// Default config file name
pub const CONFIG_FILE: &str = "storytest.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "STORYTEST_";

fn default_node_binary() -> PathBuf {
    PathBuf::from("node")
}

fn default_hook_namespaces() -> Vec<String> {
    storytest_gen::DEFAULT_HOOK_NAMESPACES
        .map(String::from)
        .to_vec()
}

fn default_true() -> bool {
    true
}

/// Storytest configuration
///
/// Environment variables use the upper snake case form of a field name:
/// `STORYTEST_NODE_BINARY` sets `nodeBinary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StorytestConfig {
    /// Directory story paths and public URLs are relative to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Where bare package specifiers resolve (default: `<cwd>/node_modules`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_dir: Option<PathBuf>,

    /// Node.js executable used by the sandbox
    #[serde(default = "default_node_binary")]
    pub node_binary: PathBuf,

    /// Default-export namespaces searched for lifecycle hooks, first match wins
    #[serde(default = "default_hook_namespaces")]
    pub hook_namespaces: Vec<String>,

    /// Title suites with `default.title` when the module provides one
    #[serde(default = "default_true")]
    pub title_from_default: bool,

    /// Install no-op suite globals in the sandbox
    #[serde(default = "default_true")]
    pub suite_stubs: bool,

    /// Level of the subscriber installed when the `logging` feature is on
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Keys settable through the environment
const ENV_KEYS: [&str; 7] = [
    "cwd",
    "dependencyDir",
    "nodeBinary",
    "hookNamespaces",
    "titleFromDefault",
    "suiteStubs",
    "logLevel",
];

/// `STORYTEST_*` variables mapped onto camelCase keys, unknown keys dropped
fn env() -> Env {
    Env::prefixed(ENV_PREFIX)
        .lowercase(false)
        .map(|key| camel_case(key.as_str()).into())
        .filter(|key| ENV_KEYS.contains(&key.as_str()))
}

/// `NODE_BINARY` -> `nodeBinary`
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, part) in key.split('_').filter(|part| !part.is_empty()).enumerate() {
        let lower = part.to_ascii_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

impl Default for StorytestConfig {
    fn default() -> Self {
        Self {
            cwd: None,
            dependency_dir: None,
            node_binary: default_node_binary(),
            hook_namespaces: default_hook_namespaces(),
            title_from_default: true,
            suite_stubs: true,
            log_level: LogLevel::default(),
        }
    }
}

impl StorytestConfig {
    /// Load configuration from defaults, the config file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(config_path)?.merge(env()).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults merged with the config file, without environment variables
    pub fn figment(config_path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            figment = if is_json {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        Ok(figment)
    }

    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_binary.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "nodeBinary".to_string(),
                value: String::new(),
                hint: "Provide a Node.js executable name or path".to_string(),
            });
        }

        for namespace in &self.hook_namespaces {
            if !storytest_build::is_identifier(namespace) {
                return Err(ConfigError::InvalidValue {
                    field: "hookNamespaces".to_string(),
                    value: format!("{namespace:?}"),
                    hint: "Namespaces are property names such as \"parameters\"".to_string(),
                });
            }
        }

        Ok(())
    }

    /// The configured cwd, or the process working directory
    pub fn resolved_cwd(&self) -> Result<PathBuf, ConfigError> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().map_err(ConfigError::Cwd),
        }
    }

    /// The shared dependency directory for `cwd`
    pub fn resolved_dependency_dir(&self, cwd: &Path) -> PathBuf {
        match &self.dependency_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.join("node_modules"),
        }
    }
}
