//! Run-scoped memoization of resolved projects.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::locator::ModuleLocator;
use crate::manifest::{self, BoundaryConfig, MarkerPolicy};
use crate::modules::ModuleIndex;

/// A resolved module-organized project: its configuration and module listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Configuration read from the manifest.
    pub config: BoundaryConfig,
    /// Module directories under the configured root.
    pub index: ModuleIndex,
}

impl Project {
    /// Builds a project by scanning the configured modules root.
    #[must_use]
    pub fn new(config: BoundaryConfig) -> Self {
        let index = ModuleIndex::scan(&config.modules_root);
        Self { config, index }
    }

    /// A locator over this project.
    #[must_use]
    pub fn locator(&self) -> ModuleLocator<'_> {
        ModuleLocator::new(&self.config, &self.index)
    }
}

/// Caches project resolution per directory and per manifest.
///
/// Entries are never replaced once inserted, so concurrent readers always see
/// the same [`Project`] for a directory.
#[derive(Debug, Default)]
pub struct ProjectCache {
    policy: MarkerPolicy,
    by_dir: RwLock<HashMap<PathBuf, Option<Arc<Project>>>>,
    by_manifest: RwLock<HashMap<PathBuf, Arc<Project>>>,
}

impl ProjectCache {
    /// Creates an empty cache using `policy` to recognize manifests.
    #[must_use]
    pub fn new(policy: MarkerPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// The project governing `file`, if any.
    #[must_use]
    pub fn project_for(&self, file: &Path) -> Option<Arc<Project>> {
        let dir = file.parent()?;
        if let Some(hit) = self.by_dir.read().get(dir) {
            return hit.clone();
        }

        let project = manifest::find_config(dir, self.policy).map(|config| self.intern(config));
        self.by_dir
            .write()
            .entry(dir.to_path_buf())
            .or_insert(project)
            .clone()
    }

    /// Number of distinct projects resolved so far.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.by_manifest.read().len()
    }

    fn intern(&self, config: BoundaryConfig) -> Arc<Project> {
        if let Some(existing) = self.by_manifest.read().get(&config.manifest_path) {
            return Arc::clone(existing);
        }
        let key = config.manifest_path.clone();
        let project = Arc::new(Project::new(config));
        Arc::clone(self.by_manifest.write().entry(key).or_insert(project))
    }
}
