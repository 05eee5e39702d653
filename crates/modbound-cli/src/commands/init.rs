//! Init command implementation.
//!
//! Writes the module boundary keys into `composer.json`:
//!
//! ```json
//! "extra": {
//!     "modules": { "path": "app/Modules" },
//!     "phpstan-laravel-module-boundaries": { "shared": ["Shared"] }
//! }
//! ```

use anyhow::{bail, Context, Result};
use modbound_core::{manifest::SHARED_KEY, MANIFEST_FILE};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Modules root written when `--modules-path` is not given.
pub const DEFAULT_MODULES_PATH: &str = "app/Modules";

/// Runs the init command.
pub fn run(project_dir: &Path, modules_path: &str, shared: &[String], force: bool) -> Result<()> {
    let manifest_path = project_dir.join(MANIFEST_FILE);

    let mut manifest = if manifest_path.exists() {
        let content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?
    } else {
        Value::Object(Map::new())
    };

    apply(&mut manifest, modules_path, shared, force)
        .with_context(|| format!("Cannot update {}", manifest_path.display()))?;

    let mut text = serde_json::to_string_pretty(&manifest)?;
    text.push('\n');
    std::fs::write(&manifest_path, text)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    println!("Updated {}", manifest_path.display());
    if !project_dir.join(modules_path).is_dir() {
        println!("Note: {modules_path} does not exist yet; create one directory per module there.");
    }
    println!("\nNext steps:");
    println!("  1. List modules any module may use under extra.{SHARED_KEY}.shared");
    println!("  2. Run: modbound check");

    Ok(())
}

/// Sets the module boundary keys on a parsed manifest.
fn apply(manifest: &mut Value, modules_path: &str, shared: &[String], force: bool) -> Result<()> {
    let Some(root) = manifest.as_object_mut() else {
        bail!("top-level value is not a JSON object");
    };
    let extra = root
        .entry("extra")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(extra) = extra.as_object_mut() else {
        bail!("\"extra\" is not a JSON object");
    };

    let declared = extra
        .get("modules")
        .and_then(|m| m.get("path"))
        .is_some()
        || extra.get(SHARED_KEY).and_then(|s| s.get("shared")).is_some();
    if declared && !force {
        bail!("module boundaries are already declared. Use --force to overwrite.");
    }
    for section in ["modules", SHARED_KEY] {
        if extra.get(section).is_some_and(|v| !v.is_object()) && !force {
            bail!("\"extra.{section}\" exists but is not a JSON object. Use --force to replace it.");
        }
    }

    set_nested(extra, "modules", "path", json!(modules_path))?;
    set_nested(extra, SHARED_KEY, "shared", json!(shared))?;
    Ok(())
}

fn set_nested(map: &mut Map<String, Value>, outer: &str, key: &str, value: Value) -> Result<()> {
    let section = map
        .entry(outer)
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
    }
    let Some(section) = section.as_object_mut() else {
        bail!("\"extra.{outer}\" is not a JSON object");
    };
    section.insert(key.to_owned(), value);
    Ok(())
}
