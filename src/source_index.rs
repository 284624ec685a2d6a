//! Index from Go test identifiers to the files that declare them.
//!
//! Keys take the form `<package>.<func>` (for example `mathpkg.TestDivide`)
//! and map to the declaring file's path relative to the scanned root. When a
//! `go.mod` covers the file, the entry is also recorded under the import-path
//! form `<module>/<dir>.<func>`, which is what the runner puts in `classname`.
//!
//! The index is built once per run and is read-only afterwards.

use crate::config::EnhanceConfig;
use crate::error::{Error, Result};
use crate::go_source::parse_declarations;
use crate::walker::{self, relative_slash_path};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static MODULE_DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();

fn module_directive_regex() -> &'static Regex {
    MODULE_DIRECTIVE_REGEX.get_or_init(|| {
        Regex::new(r#"(?m)^\s*module\s+"?([^\s"/][^\s"]*)"?\s*(?://.*)?$"#)
            .expect("module directive regex")
    })
}

/// Two files declared the same key; the later file won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub replaced: String,
    pub winner: String,
}

/// A test file left out of the index because it did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    entries: BTreeMap<String, String>,
    qualified: BTreeMap<String, String>,
    collisions: Vec<KeyCollision>,
    skipped: Vec<SkippedFile>,
}

impl SourceIndex {
    /// Build an index directly from `(key, path)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut index = Self::default();
        for (key, path) in entries {
            index.insert(key.into(), path.into());
        }
        index
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Lookup by `<import path>.<func>`.
    #[must_use]
    pub fn get_qualified(&self, key: &str) -> Option<&str> {
        self.qualified.get(key).map(String::as_str)
    }

    /// `<package>.<func>` entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter_qualified(&self) -> impl Iterator<Item = (&str, &str)> {
        self.qualified.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    #[must_use]
    pub fn skipped_files(&self) -> &[SkippedFile] {
        &self.skipped
    }

    fn insert(&mut self, key: String, path: String) {
        if let Some(previous) = self.entries.insert(key.clone(), path.clone()) {
            if previous != path {
                tracing::warn!(
                    event = "index.key_collision",
                    key = %key,
                    replaced = %previous,
                    winner = %path,
                    "Test declared in more than one file; keeping the later one",
                );
                self.collisions.push(KeyCollision {
                    key,
                    replaced: previous,
                    winner: path,
                });
            }
        }
    }

    fn insert_qualified(&mut self, key: String, path: String) {
        self.qualified.insert(key, path);
    }
}

/// Walk `root` and index every entry point declared in its test files.
///
/// Unparseable files are logged and skipped. Walk and read failures abort.
pub fn build_index(root: &Path, config: &EnhanceConfig) -> Result<SourceIndex> {
    let tree = walker::walk(root, &config.exclude_dirs, &config.test_file_suffix)?;

    let modules = if config.qualified_keys {
        load_modules(&tree.module_roots)?
    } else {
        Vec::new()
    };

    let mut index = SourceIndex::default();
    for file in &tree.test_files {
        index_file(&mut index, root, file, &modules, config)?;
    }

    tracing::debug!(
        event = "index.built",
        entries = index.len(),
        qualified_entries = index.qualified.len(),
        skipped_files = index.skipped.len(),
        collisions = index.collisions.len(),
        "Built test index",
    );
    Ok(index)
}

fn index_file(
    index: &mut SourceIndex,
    root: &Path,
    file: &Path,
    modules: &[GoModule],
    config: &EnhanceConfig,
) -> Result<()> {
    let bytes = std::fs::read(file).map_err(|err| Error::io(file, err))?;
    let rel_path = relative_slash_path(root, file);

    let parsed = String::from_utf8(bytes)
        .map_err(|err| Error::parse(format!("invalid UTF-8: {}", err.utf8_error())))
        .and_then(|source| parse_declarations(&source));
    let decls = match parsed {
        Ok(decls) => decls,
        Err(err) => {
            tracing::warn!(
                event = "index.parse_failed",
                path = %rel_path,
                error = %err,
                "Failed to parse {rel_path}: {err}",
            );
            index.skipped.push(SkippedFile {
                path: rel_path,
                reason: err.to_string(),
            });
            return Ok(());
        }
    };

    let import_path = file
        .parent()
        .and_then(|dir| import_path_for_dir(modules, dir));

    for func in decls.functions.iter().filter(|f| config.is_entry_point(f)) {
        index.insert(format!("{}.{func}", decls.package), rel_path.clone());
        if let Some(import_path) = &import_path {
            index.insert_qualified(format!("{import_path}.{func}"), rel_path.clone());
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GoModule {
    dir: PathBuf,
    path: String,
}

fn load_modules(roots: &[PathBuf]) -> Result<Vec<GoModule>> {
    let mut modules = Vec::with_capacity(roots.len());
    for dir in roots {
        let go_mod = dir.join(walker::GO_MOD_FILE);
        let contents = std::fs::read_to_string(&go_mod).map_err(|err| Error::io(&go_mod, err))?;
        match parse_module_path(&contents) {
            Some(path) => modules.push(GoModule {
                dir: dir.clone(),
                path,
            }),
            None => tracing::warn!(
                event = "index.go_mod_without_module",
                path = %go_mod.display(),
                "go.mod has no module directive; import-path keys disabled below it",
            ),
        }
    }
    Ok(modules)
}

/// Extract the module path from `go.mod` contents.
#[must_use]
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    module_directive_regex()
        .captures(go_mod)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Import path of `dir` under the deepest module that contains it.
fn import_path_for_dir(modules: &[GoModule], dir: &Path) -> Option<String> {
    let module = modules
        .iter()
        .filter(|m| dir.starts_with(&m.dir))
        .max_by_key(|m| m.dir.components().count())?;
    let rel = relative_slash_path(&module.dir, dir);
    if rel.is_empty() {
        Some(module.path.clone())
    } else {
        Some(format!("{}/{rel}", module.path))
    }
}
