//! Project manifest resolution.
//!
//! Walks upward from a source file looking for a `composer.json` that declares
//! where the modules live:
//!
//! ```json
//! {
//!   "extra": {
//!     "modules": { "path": "app/Modules" },
//!     "phpstan-laravel-module-boundaries": { "shared": ["Shared", "Support"] }
//!   }
//! }
//! ```
//!
//! Every failure along the way (unreadable file, bad JSON, missing keys) rejects
//! that candidate only; the walk carries on. When nothing usable is found the
//! file is simply not checked.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file name looked up at each level.
pub const MANIFEST_FILE: &str = "composer.json";

/// Maximum number of parent directories visited.
pub const MAX_ASCENT: usize = 10;

/// Key holding the shared-module allowlist under `extra`.
pub const SHARED_KEY: &str = "phpstan-laravel-module-boundaries";

/// Which manifests are recognized as module-organized projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPolicy {
    /// `extra.modules.path` or `extra.laravel-module` present.
    #[default]
    Permissive,
    /// `extra.laravel-module` present.
    Strict,
}

/// Module taxonomy for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryConfig {
    /// Manifest this configuration was read from.
    pub manifest_path: PathBuf,
    /// Directory whose immediate subdirectories are modules.
    pub modules_root: PathBuf,
    /// Modules any other module may depend on.
    pub shared_modules: BTreeSet<String>,
}

impl BoundaryConfig {
    /// Whether `module` is in the shared allowlist.
    #[must_use]
    pub fn is_shared(&self, module: &str) -> bool {
        self.shared_modules.contains(module)
    }

    /// Shared modules joined for messages.
    #[must_use]
    pub fn shared_list(&self) -> String {
        self.shared_modules
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Why a manifest candidate was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Failed to read the manifest.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Manifest path.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Manifest is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// Manifest path.
        path: PathBuf,
        /// Parse error.
        source: serde_json::Error,
    },
    /// Manifest is valid JSON but not an object.
    #[error("{0} is not a JSON object")]
    NotAnObject(PathBuf),
    /// Manifest lacks the marker required by the policy.
    #[error("{0} does not declare a module layout")]
    NoMarker(PathBuf),
    /// Manifest has the marker but no modules path.
    #[error("{0} declares no modules path")]
    NoModulesPath(PathBuf),
    /// Modules path does not name an existing directory.
    #[error("modules root {0} is not a directory")]
    MissingRoot(PathBuf),
}

/// Finds the [`BoundaryConfig`] governing `start_file` with the default policy.
#[must_use]
pub fn resolve(start_file: &Path) -> Option<BoundaryConfig> {
    resolve_with(start_file, MarkerPolicy::default())
}

/// Finds the [`BoundaryConfig`] governing `start_file`.
#[must_use]
pub fn resolve_with(start_file: &Path, policy: MarkerPolicy) -> Option<BoundaryConfig> {
    find_config(start_file.parent()?, policy)
}

/// Returns the config from the first ancestor manifest of `start_dir` that is usable.
#[must_use]
pub fn find_config(start_dir: &Path, policy: MarkerPolicy) -> Option<BoundaryConfig> {
    let mut dir = start_dir;
    for _ in 0..MAX_ASCENT {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            match load(&candidate, policy) {
                Ok(config) => return Some(config),
                Err(e) => debug!("Skipping manifest: {e}"),
            }
        }
        dir = dir.parent()?;
    }
    debug!(
        "No module manifest within {MAX_ASCENT} levels of {}",
        start_dir.display()
    );
    None
}

/// Reads one manifest.
///
/// # Errors
///
/// Returns the reason the manifest cannot configure module boundaries.
pub fn load(path: &Path, policy: MarkerPolicy) -> Result<BoundaryConfig, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse(&content, path, policy)
}

/// Parses manifest text read from `path`.
///
/// # Errors
///
/// Returns the reason the manifest cannot configure module boundaries.
pub fn parse(
    content: &str,
    path: &Path,
    policy: MarkerPolicy,
) -> Result<BoundaryConfig, ManifestError> {
    let json: Value = serde_json::from_str(content).map_err(|e| ManifestError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !json.is_object() {
        return Err(ManifestError::NotAnObject(path.to_path_buf()));
    }

    let extra = &json["extra"];
    let has_marker = match policy {
        MarkerPolicy::Strict => !extra["laravel-module"].is_null(),
        MarkerPolicy::Permissive => {
            !extra["laravel-module"].is_null() || !extra["modules"]["path"].is_null()
        }
    };
    if !has_marker {
        return Err(ManifestError::NoMarker(path.to_path_buf()));
    }

    let raw_root = extra["modules"]["path"]
        .as_str()
        .or_else(|| extra["laravel-module"]["path"].as_str())
        .ok_or_else(|| ManifestError::NoModulesPath(path.to_path_buf()))?;

    let modules_root = absolutize(raw_root, path);
    if !modules_root.is_dir() {
        return Err(ManifestError::MissingRoot(modules_root));
    }

    let shared_modules = extra[SHARED_KEY]["shared"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    debug!(
        "Modules root {} from {}",
        modules_root.display(),
        path.display()
    );

    Ok(BoundaryConfig {
        manifest_path: path.to_path_buf(),
        modules_root,
        shared_modules,
    })
}

/// Joins a relative root to the manifest directory and canonicalizes it,
/// keeping the joined path when canonicalization fails.
fn absolutize(raw_root: &str, manifest: &Path) -> PathBuf {
    let root = Path::new(raw_root);
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        manifest
            .parent()
            .map_or_else(|| root.to_path_buf(), |dir| dir.join(root))
    };
    joined.canonicalize().unwrap_or(joined)
}
