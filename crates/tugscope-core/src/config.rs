//! Project configuration.
//!
//! [`ProjectConfig`] is what a [`Project`](crate::project::Project) is built
//! with. [`ResolvedConfig`] produces one from layered sources.
//!
//! Precedence (highest to lowest):
//! 1. Explicit overrides (CLI flags, API callers)
//! 2. Environment variables (`TUGSCOPE_ROOT`, `TUGSCOPE_PATH_SEPARATOR`)
//! 3. Defaults (empty root, host path separator)

use std::path::{PathBuf, MAIN_SEPARATOR};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable naming the project root.
pub const ENV_ROOT: &str = "TUGSCOPE_ROOT";

/// Environment variable overriding the path separator (a single character).
pub const ENV_PATH_SEPARATOR: &str = "TUGSCOPE_PATH_SEPARATOR";

// ============================================================================
// Project Config
// ============================================================================

/// Settings a project is created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory that subpaths are relative to.
    #[serde(default)]
    pub root: PathBuf,
    /// Separator used in incoming subpaths. Normalized to `/` on entry.
    #[serde(default = "default_path_separator")]
    pub path_separator: char,
}

fn default_path_separator() -> char {
    MAIN_SEPARATOR
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            root: PathBuf::new(),
            path_separator: default_path_separator(),
        }
    }
}

impl ProjectConfig {
    /// Set the project root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the incoming path separator.
    pub fn with_path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }
}

// ============================================================================
// Layered Resolution
// ============================================================================

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From environment variable.
    EnvVar = 1,
    /// From an explicit override (highest precedence).
    Override = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Explicit configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Project root.
    pub root: Option<PathBuf>,
    /// Path separator.
    pub path_separator: Option<char>,
}

/// Configuration resolved from all sources, with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Project root.
    pub root: ConfigValue<PathBuf>,
    /// Path separator.
    pub path_separator: ConfigValue<char>,
}

impl ResolvedConfig {
    /// Resolve configuration from defaults, the process environment and
    /// `overrides`.
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        Self::resolve_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve configuration using `lookup` in place of the process
    /// environment.
    pub fn resolve_with<F>(lookup: F, overrides: &ConfigOverrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ProjectConfig::default();
        let mut config = ResolvedConfig {
            root: ConfigValue::new(defaults.root, ConfigSource::Default),
            path_separator: ConfigValue::new(defaults.path_separator, ConfigSource::Default),
        };
        config.apply_env_vars(&lookup);
        config.apply_overrides(overrides);
        config
    }

    fn apply_env_vars<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_ROOT) {
            self.root = self
                .root
                .clone()
                .merge(ConfigValue::new(PathBuf::from(root), ConfigSource::EnvVar));
        }

        if let Some(raw) = lookup(ENV_PATH_SEPARATOR) {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(separator), None) => {
                    self.path_separator = self
                        .path_separator
                        .clone()
                        .merge(ConfigValue::new(separator, ConfigSource::EnvVar));
                }
                _ => warn!(
                    value = %raw,
                    "{} must be a single character; ignoring", ENV_PATH_SEPARATOR
                ),
            }
        }
    }

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref root) = overrides.root {
            self.root = ConfigValue::new(root.clone(), ConfigSource::Override);
        }

        if let Some(separator) = overrides.path_separator {
            self.path_separator = ConfigValue::new(separator, ConfigSource::Override);
        }
    }

    /// The plain project config.
    pub fn into_project_config(self) -> ProjectConfig {
        ProjectConfig {
            root: self.root.value,
            path_separator: self.path_separator.value,
        }
    }
}
