//! Module directory index.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// The module directories found directly under a modules root.
///
/// Names are kept in alphabetical order so every lookup that can match more
/// than one module resolves the same way on every filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIndex {
    root: PathBuf,
    names: Vec<String>,
}

impl ModuleIndex {
    /// Lists the immediate subdirectories of `root`.
    ///
    /// A missing or unreadable root gives an empty index.
    #[must_use]
    pub fn scan(root: &Path) -> Self {
        let mut names: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    debug!("Skipping entry under {}: {e}", root.display());
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_owned))
            .collect();
        names.sort();

        debug!("Found {} module(s) under {}", names.len(), root.display());

        Self {
            root: root.to_path_buf(),
            names,
        }
    }

    /// Module names in alphabetical order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns `true` when no module directories exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact (case-sensitive) membership.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// On-disk name of the module matching `segment` case-insensitively.
    #[must_use]
    pub fn find_ignore_case(&self, segment: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(segment))
            .map(String::as_str)
    }

    /// Path of a module directory.
    #[must_use]
    pub fn module_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
