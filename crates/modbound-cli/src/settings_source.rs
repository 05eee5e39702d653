//! Locating `modbound.toml`.
//!
//! Settings belong to the project whose `composer.json` declares the modules.
//! The lookup climbs from the checked path to that project root, so a module
//! directory may carry its own `modbound.toml` and nested package manifests do
//! not cut the climb short. Outside a project only the checked directory is
//! looked at. The `--config` flag wins over everything, the per-user file
//! (`$MODBOUND_CONFIG_DIR/config.toml`, else `~/.modbound/config.toml`) is the
//! last resort.

use anyhow::{Context, Result};
use modbound_core::{manifest, MarkerPolicy, Settings};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file names, in order of preference within one directory.
const SETTINGS_FILES: [&str; 2] = ["modbound.toml", ".modbound.toml"];

/// Where the settings for a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    /// `--config FILE`.
    Flag(PathBuf),
    /// A settings file inside the project.
    Project(PathBuf),
    /// The per-user settings file.
    User(PathBuf),
    /// Built-in defaults.
    Defaults,
}

impl SettingsSource {
    /// The settings file, unless defaults are used.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Defaults => None,
        }
    }

    /// Reads the settings.
    pub fn load(&self) -> Result<Settings> {
        let Some(file) = self.file() else {
            debug!("No modbound.toml found, using defaults");
            return Ok(Settings::default());
        };
        if matches!(self, Self::User(_)) {
            tracing::info!("Using user settings: {}", file.display());
        }
        Settings::from_file(file).with_context(|| format!("Failed to load {}", file.display()))
    }
}

/// Finds the settings for a run over `path`.
#[must_use]
pub fn locate(path: &Path, flag: Option<&Path>) -> SettingsSource {
    locate_with(path, flag, user_settings_file())
}

fn locate_with(path: &Path, flag: Option<&Path>, user_file: Option<PathBuf>) -> SettingsSource {
    if let Some(file) = flag {
        return SettingsSource::Flag(file.to_path_buf());
    }

    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let start = if path.is_file() {
        path.parent().unwrap_or(&path)
    } else {
        &path
    };

    if let Some(found) = project_settings(start) {
        debug!("Project settings: {}", found.display());
        return SettingsSource::Project(found);
    }
    match user_file {
        Some(file) if file.is_file() => SettingsSource::User(file),
        _ => SettingsSource::Defaults,
    }
}

/// The nearest settings file between `start` and its project root.
fn project_settings(start: &Path) -> Option<PathBuf> {
    let project_root = manifest::find_config(start, MarkerPolicy::Permissive)
        .and_then(|config| config.manifest_path.parent().map(Path::to_path_buf));

    let dirs: Vec<&Path> = match &project_root {
        Some(root) => start.ancestors().take_while(|d| d.starts_with(root)).collect(),
        None => vec![start],
    };
    dirs.into_iter().find_map(|dir| {
        SETTINGS_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

fn user_settings_file() -> Option<PathBuf> {
    std::env::var_os("MODBOUND_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".modbound")))
        .map(|dir| dir.join("config.toml"))
}
