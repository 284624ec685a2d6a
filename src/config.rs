//! Enhancer configuration.
//!
//! Precedence is built-in defaults, then an optional JSON file, then CLI
//! flags. The CLI layer applies its overrides on top of [`EnhanceConfig::load`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TEST_FILE_SUFFIX: &str = "_test.go";
pub const DEFAULT_RESERVED_ENTRY_POINT: &str = "TestMain";
pub const DEFAULT_ENTRY_POINT_PREFIXES: [&str; 4] = ["Test", "Benchmark", "Example", "Fuzz"];
pub const DEFAULT_EXCLUDE_DIRS: [&str; 2] = ["vendor", ".git"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhanceConfig {
    /// Directory names pruned from the source walk, matched against the bare name.
    pub exclude_dirs: Vec<String>,
    pub test_file_suffix: String,
    /// Function name prefixes that mark a declaration as a test entry point.
    pub entry_point_prefixes: Vec<String>,
    /// Runner-injected setup hook reported as a case with no classname.
    pub reserved_entry_point: String,
    /// Allow the best-effort substring tier when exact lookups miss.
    pub substring_fallback: bool,
    /// Also key entries by `<import path>.<func>` when a `go.mod` is found.
    pub qualified_keys: bool,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(ToString::to_string).collect(),
            test_file_suffix: DEFAULT_TEST_FILE_SUFFIX.to_string(),
            entry_point_prefixes: DEFAULT_ENTRY_POINT_PREFIXES
                .iter()
                .map(ToString::to_string)
                .collect(),
            reserved_entry_point: DEFAULT_RESERVED_ENTRY_POINT.to_string(),
            substring_fallback: true,
            qualified_keys: true,
        }
    }
}

impl EnhanceConfig {
    /// Load a JSON config file. Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config: Self = serde_json::from_str(&content).map_err(|err| {
            Error::config(format!("Invalid config file {}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.test_file_suffix.trim().is_empty() {
            return Err(Error::config("test_file_suffix must not be empty"));
        }
        if self.entry_point_prefixes.is_empty() {
            return Err(Error::config("entry_point_prefixes must not be empty"));
        }
        if self.entry_point_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::config("entry_point_prefixes must not contain empty prefixes"));
        }
        if let Some(bad) = self
            .exclude_dirs
            .iter()
            .find(|d| d.trim().is_empty() || d.contains('/') || d.contains('\\'))
        {
            return Err(Error::config(format!(
                "exclude_dirs entries must be bare directory names, got {bad:?}"
            )));
        }
        Ok(())
    }

    /// Add directory names to the exclusion set, skipping duplicates.
    pub fn extend_excludes<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dir in dirs {
            let dir = dir.into();
            if !self.exclude_dirs.contains(&dir) {
                self.exclude_dirs.push(dir);
            }
        }
    }

    #[must_use]
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Whether `name` is an exported function with a recognised entry-point prefix.
    #[must_use]
    pub fn is_entry_point(&self, name: &str) -> bool {
        is_exported(name)
            && self
                .entry_point_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }

    #[must_use]
    pub const fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            substring_fallback: self.substring_fallback,
            qualified_keys: self.qualified_keys,
        }
    }
}

/// Which optional resolution tiers the resolver may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub substring_fallback: bool,
    pub qualified_keys: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        EnhanceConfig::default().match_policy()
    }
}

impl MatchPolicy {
    /// Exact tiers only.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            substring_fallback: false,
            qualified_keys: true,
        }
    }
}

/// Go exports identifiers that start with an upper-case letter.
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
