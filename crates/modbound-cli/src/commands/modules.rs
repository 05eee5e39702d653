//! Modules command implementation.

use anyhow::{Context, Result};
use modbound_core::{manifest, MarkerPolicy, Project};
use std::path::Path;

use crate::settings_source::SettingsSource;

/// Runs the modules command.
pub fn run(path: &Path, source: &SettingsSource) -> Result<()> {
    let settings = source.load()?;
    let project = find_project(path, settings.manifest.marker)?;
    print!("{}", render(&project));
    Ok(())
}

fn find_project(path: &Path, policy: MarkerPolicy) -> Result<Project> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to access {}", path.display()))?;
    let config = if path.is_dir() {
        manifest::find_config(&path, policy)
    } else {
        manifest::resolve_with(&path, policy)
    };
    let config = config.with_context(|| {
        format!(
            "No composer.json declaring a modules path found above {}. Run `modbound init` to add one.",
            path.display()
        )
    })?;
    Ok(Project::new(config))
}

fn render(project: &Project) -> String {
    use std::fmt::Write;

    let config = &project.config;
    let mut out = String::new();
    let _ = writeln!(out, "Manifest:     {}", config.manifest_path.display());
    let _ = writeln!(out, "Modules root: {}", config.modules_root.display());
    let _ = writeln!(out);

    if project.index.is_empty() {
        let _ = writeln!(out, "No modules found.");
        return out;
    }

    let locator = project.locator();
    let _ = writeln!(out, "{:<30} {:<8} Config", "Module", "Shared");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for name in project.index.names() {
        let shared = if config.is_shared(name) { "yes" } else { "" };
        let basenames = locator.config_basenames(name).join(", ");
        let _ = writeln!(out, "{name:<30} {shared:<8} {basenames}");
    }

    let unknown: Vec<&str> = config
        .shared_modules
        .iter()
        .map(String::as_str)
        .filter(|s| !project.index.contains(s))
        .collect();
    if !unknown.is_empty() {
        let _ = writeln!(
            out,
            "\nUnknown shared modules (no directory): {}",
            unknown.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        for d in [
            "app/Modules/Billing/config",
            "app/Modules/Catalog/config",
            "app/Modules/Shared/src",
        ] {
            fs::create_dir_all(tmp.path().join(d)).unwrap();
        }
        fs::write(tmp.path().join("app/Modules/Billing/config/billing.php"), "<?php").unwrap();
        fs::write(tmp.path().join("app/Modules/Billing/config/tax.php"), "<?php").unwrap();
        fs::write(tmp.path().join("app/Modules/Catalog/config/README.md"), "").unwrap();
        fs::write(
            tmp.path().join("composer.json"),
            r#"{"extra": {"modules": {"path": "app/Modules"},
                "phpstan-laravel-module-boundaries": {"shared": ["Shared", "Legacy"]}}}"#,
        )
        .unwrap();
        tmp
    }

    #[test]
    fn lists_modules_with_shared_flag_and_config() {
        let tmp = project();
        let p = find_project(tmp.path(), MarkerPolicy::Permissive).unwrap();
        let out = render(&p);
        let rows: Vec<Vec<&str>> = out
            .lines()
            .filter(|l| ["Billing", "Catalog", "Shared"].iter().any(|m| l.starts_with(m)))
            .map(|l| l.split_whitespace().collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec!["Billing", "billing,", "tax"],
                vec!["Catalog"],
                vec!["Shared", "yes"],
            ]
        );
        assert!(out.contains("Unknown shared modules (no directory): Legacy"));
    }

    #[test]
    fn resolves_from_a_file_inside_the_project() {
        let tmp = project();
        let file = tmp.path().join("app/Modules/Billing/config/billing.php");
        let p = find_project(&file, MarkerPolicy::Permissive).unwrap();
        assert_eq!(p.index.names(), ["Billing", "Catalog", "Shared"]);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = find_project(tmp.path(), MarkerPolicy::Permissive).unwrap_err();
        assert!(err.to_string().contains("modbound init"));
    }

    #[test]
    fn strict_policy_rejects_permissive_manifest() {
        let tmp = project();
        assert!(find_project(tmp.path(), MarkerPolicy::Strict).is_err());
    }
}
