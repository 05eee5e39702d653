//! Check command implementation.

use anyhow::{Context, Result};
use modbound_core::{BoundaryChecker, ExcludeMatcher, LintResult, Settings};
use modbound_php::{LanguageExtractor, PhpExtractor};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::settings_source::SettingsSource;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `true` when a violation reaches the configured `fail_on` severity.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules: Option<&str>,
    exclude: &[String],
    source: &SettingsSource,
) -> Result<bool> {
    let mut settings = source.load()?;
    apply_overrides(&mut settings, rules, exclude);

    let root = path
        .canonicalize()
        .with_context(|| format!("Failed to access {}", path.display()))?;
    let matcher = settings.exclude_matcher().context("Invalid exclude pattern")?;
    let extractor = PhpExtractor::new();
    let files = discover_files(&root, &matcher, settings.analyzer.respect_gitignore, &extractor)?;

    tracing::info!("Analyzing {} PHP files", files.len());

    let threshold = settings.fail_threshold();
    let checker = BoundaryChecker::new(settings);
    let mut result = check_files(&root, &files, &checker, &extractor);
    result.sort();

    super::output::print(&result, format, &root)?;

    Ok(result.has_violations_at(threshold))
}

fn apply_overrides(settings: &mut Settings, rules: Option<&str>, exclude: &[String]) {
    if let Some(rules) = rules {
        let names: Vec<&str> = rules
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        for unknown in settings.restrict_rules(&names) {
            tracing::warn!("Unknown rule: {unknown}");
        }
    }
    settings.analyzer.exclude.extend(exclude.iter().cloned());
}

/// Checks `files` in parallel, reporting locations relative to `root`.
pub fn check_files(
    root: &Path,
    files: &[PathBuf],
    checker: &BoundaryChecker,
    extractor: &dyn LanguageExtractor,
) -> LintResult {
    files
        .par_iter()
        .map(|file| check_file(root, file, checker, extractor))
        .reduce(LintResult::new, |mut acc, one| {
            acc.extend(one);
            acc
        })
}

fn check_file(
    root: &Path,
    file: &Path,
    checker: &BoundaryChecker,
    extractor: &dyn LanguageExtractor,
) -> LintResult {
    let mut result = LintResult::new();

    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Skipping {}: {e}", file.display());
            result.files_skipped = 1;
            return result;
        }
    };
    let analysis = match extractor.analyze(&source) {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!("Skipping {}: {e}", file.display());
            result.files_skipped = 1;
            return result;
        }
    };
    if analysis.has_syntax_errors {
        tracing::debug!("{} has syntax errors, checking what parsed", file.display());
    }

    let rel = file
        .strip_prefix(root)
        .ok()
        .filter(|r| !r.as_os_str().is_empty())
        .unwrap_or(file);
    result.violations = checker
        .check_nodes(file, &analysis.nodes)
        .into_iter()
        .map(|mut v| {
            v.location.file = rel.to_path_buf();
            v
        })
        .collect();
    result.files_checked = 1;
    result
}

/// Lists the files under `root` the extractor handles, minus exclusions.
pub fn discover_files(
    root: &Path,
    exclude: &ExcludeMatcher,
    respect_gitignore: bool,
    extractor: &dyn LanguageExtractor,
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(respect_gitignore)
        .git_global(respect_gitignore)
        .git_exclude(respect_gitignore)
        .require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || !extractor.handles(path) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_excluded(rel) {
            tracing::debug!("Excluded {}", rel.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const COMPOSER: &str = r#"{
    "name": "acme/shop",
    "extra": {
        "modules": { "path": "app/Modules" },
        "phpstan-laravel-module-boundaries": { "shared": ["Shared"] }
    }
}"#;

    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let p = tmp.path();
        for d in [
            "app/Modules/Billing/src",
            "app/Modules/Catalog/config",
            "app/Modules/Shared/src",
            "vendor/laravel",
        ] {
            fs::create_dir_all(p.join(d)).unwrap();
        }
        fs::write(p.join("composer.json"), COMPOSER).unwrap();
        fs::write(
            p.join("app/Modules/Catalog/config/catalog.php"),
            "<?php return ['currency' => 'EUR'];",
        )
        .unwrap();
        fs::write(
            p.join("app/Modules/Billing/src/Invoice.php"),
            "<?php\nnamespace App\\Modules\\Billing;\n\nuse App\\Modules\\Catalog\\Product;\nuse App\\Modules\\Shared\\Money;\n\nclass Invoice {\n    public function currency() { return config('catalog.currency'); }\n}\n",
        )
        .unwrap();
        fs::write(
            p.join("vendor/laravel/Thing.php"),
            "<?php\nuse App\\Modules\\Catalog\\Product;\n",
        )
        .unwrap();
        tmp
    }

    fn run_check(root: &Path, settings: Settings) -> LintResult {
        let extractor = PhpExtractor::new();
        let matcher = settings.exclude_matcher().unwrap();
        let files = discover_files(root, &matcher, true, &extractor).unwrap();
        let checker = BoundaryChecker::new(settings);
        let mut result = check_files(root, &files, &checker, &extractor);
        result.sort();
        result
    }

    #[test]
    fn discovers_php_files_and_skips_vendor() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let matcher = Settings::default().exclude_matcher().unwrap();
        let files = discover_files(&root, &matcher, true, &PhpExtractor::new()).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(&root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("app/Modules/Billing/src/Invoice.php"),
                PathBuf::from("app/Modules/Catalog/config/catalog.php"),
            ]
        );
    }

    #[test]
    fn reports_import_and_config_violations_in_order() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let result = run_check(&root, Settings::default());

        assert_eq!(result.files_checked, 2);
        let summary: Vec<(usize, &str)> = result
            .violations
            .iter()
            .map(|v| (v.location.line, v.code.as_str()))
            .collect();
        assert_eq!(summary, vec![(4, "MB001"), (8, "MB002")]);
        assert!(result
            .violations
            .iter()
            .all(|v| v.location.file == Path::new("app/Modules/Billing/src/Invoice.php")));
    }

    #[test]
    fn rules_flag_restricts_checks() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let mut settings = Settings::default();
        apply_overrides(&mut settings, Some("MB002"), &[]);
        let result = run_check(&root, settings);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule, "cross-module-config");
    }

    #[test]
    fn exclude_flag_adds_patterns() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let mut settings = Settings::default();
        apply_overrides(&mut settings, None, &["**/Billing/**".to_string()]);
        let result = run_check(&root, settings);
        assert!(result.violations.is_empty());
        assert_eq!(result.files_checked, 1);
    }

    #[test]
    fn warning_severity_respects_fail_on() {
        let tmp = project();
        let root = tmp.path().canonicalize().unwrap();
        let settings = Settings::parse(
            "[rules.cross-module-import]\nseverity = \"warning\"\n[rules.cross-module-config]\nseverity = \"warning\"\n",
        )
        .unwrap();
        let threshold = settings.fail_threshold();
        let result = run_check(&root, settings);
        assert_eq!(result.violations.len(), 2);
        assert!(!result.has_violations_at(threshold));
    }

    #[test]
    fn single_file_path_is_checked() {
        let tmp = project();
        let file = tmp
            .path()
            .join("app/Modules/Billing/src/Invoice.php")
            .canonicalize()
            .unwrap();
        let files =
            discover_files(&file, &ExcludeMatcher::default(), true, &PhpExtractor::new()).unwrap();
        assert_eq!(files, vec![file]);
    }
}
