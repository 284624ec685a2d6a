//! Source tree enumeration.
//!
//! Excluded directories are pruned before descent, so nothing under a
//! `vendor/` tree is ever read. Entries are visited in file-name order to keep
//! last-write-wins collisions in the index reproducible.

use crate::error::{Error, Result};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const GO_MOD_FILE: &str = "go.mod";

/// Files of interest found under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// Files whose name ends with the test suffix, in walk order.
    pub test_files: Vec<PathBuf>,
    /// Directories containing a `go.mod`.
    pub module_roots: Vec<PathBuf>,
}

pub fn walk(root: &Path, exclude_dirs: &[String], test_suffix: &str) -> Result<SourceTree> {
    if !root.is_dir() {
        return Err(Error::config(format!(
            "Repository root is not a readable directory: {}",
            root.display()
        )));
    }

    let excluded: BTreeSet<String> = exclude_dirs.iter().cloned().collect();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir
                && entry.depth() > 0
                && excluded.contains(entry.file_name().to_string_lossy().as_ref()))
        })
        .build();

    let mut tree = SourceTree::default();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name == GO_MOD_FILE {
            if let Some(parent) = entry.path().parent() {
                tree.module_roots.push(parent.to_path_buf());
            }
        } else if name.ends_with(test_suffix) {
            tree.test_files.push(entry.into_path());
        }
    }

    tracing::debug!(
        event = "walk.done",
        root = %root.display(),
        test_files = tree.test_files.len(),
        module_roots = tree.module_roots.len(),
        "Walked source tree",
    );
    Ok(tree)
}

/// `path` relative to `root`, joined with `/` regardless of platform.
///
/// Falls back to the full path when `path` is not under `root`.
#[must_use]
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
