//! Tool settings (`modbound.toml`).
//!
//! The module layout itself always comes from `composer.json`; these settings
//! only tune how the linter runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::boundary::ViolationKind;
use crate::manifest::MarkerPolicy;
use crate::types::Severity;

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Lowest severity that fails `check` (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// File discovery.
    #[serde(default)]
    pub analyzer: AnalyzerSettings,

    /// Manifest recognition.
    #[serde(default)]
    pub manifest: ManifestSettings,

    /// Per-rule settings keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleSettings>,
}

/// File discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSettings {
    /// Glob patterns, relative to the scan root, to skip.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
            respect_gitignore: true,
        }
    }
}

/// Manifest recognition settings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ManifestSettings {
    /// Which manifests count as module-organized projects.
    #[serde(default)]
    pub marker: MarkerPolicy,
}

/// Per-rule settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_excludes() -> Vec<String> {
    vec!["**/vendor/**".to_string(), "**/node_modules/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Settings errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error reading the settings file.
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in the settings file.
    #[error("Failed to parse settings: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Invalid exclude pattern.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern as written.
        pattern: String,
        /// Glob error.
        source: glob::PatternError,
    },
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| SettingsError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, kind: ViolationKind) -> bool {
        self.rules
            .get(kind.rule_name())
            .map_or(true, |r| r.enabled.unwrap_or(true))
    }

    /// Severity for violations of a rule.
    #[must_use]
    pub fn rule_severity(&self, kind: ViolationKind) -> Severity {
        self.rules
            .get(kind.rule_name())
            .and_then(|r| r.severity)
            .unwrap_or(Severity::Error)
    }

    /// Threshold at which `check` fails.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Disables every rule not named in `names` (rule names or codes).
    ///
    /// Returns the names that matched no rule.
    pub fn restrict_rules<'n>(&mut self, names: &[&'n str]) -> Vec<&'n str> {
        let selected: Vec<ViolationKind> =
            names.iter().filter_map(|n| ViolationKind::from_name(n)).collect();
        for kind in ViolationKind::ALL {
            if !selected.contains(&kind) {
                self.rules.entry(kind.rule_name().to_owned()).or_default().enabled = Some(false);
            }
        }
        names
            .iter()
            .copied()
            .filter(|n| ViolationKind::from_name(n).is_none())
            .collect()
    }

    /// Compiles the exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that is not a valid glob.
    pub fn exclude_matcher(&self) -> Result<ExcludeMatcher, SettingsError> {
        let patterns = self
            .analyzer
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| SettingsError::Pattern {
                    pattern: p.clone(),
                    source: e,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(ExcludeMatcher { patterns })
    }
}

/// Compiled exclude globs.
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    patterns: Vec<glob::Pattern>,
}

impl ExcludeMatcher {
    /// Whether `relative` (a path under the scan root) is excluded.
    #[must_use]
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let options = glob::MatchOptions {
            require_literal_separator: false,
            ..glob::MatchOptions::new()
        };
        // Patterns like `**/vendor/**` should also match `vendor/...` at the root.
        let anchored = Path::new("/").join(relative);
        self.patterns.iter().any(|p| {
            p.matches_path_with(relative, options) || p.matches_path_with(&anchored, options)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.analyzer.respect_gitignore);
        assert_eq!(settings.fail_threshold(), Severity::Error);
        assert_eq!(settings.manifest.marker, MarkerPolicy::Permissive);
        for kind in ViolationKind::ALL {
            assert!(settings.is_rule_enabled(kind));
            assert_eq!(settings.rule_severity(kind), Severity::Error);
        }
    }

    #[test]
    fn parse_full_settings() {
        let toml = r#"
fail_on = "warning"

[analyzer]
exclude = ["**/storage/**"]
respect_gitignore = false

[manifest]
marker = "strict"

[rules.cross-module-import]
enabled = false

[rules.cross-module-config]
severity = "warning"
"#;
        let settings = Settings::parse(toml).expect("parse");
        assert_eq!(settings.fail_threshold(), Severity::Warning);
        assert!(!settings.analyzer.respect_gitignore);
        assert_eq!(settings.analyzer.exclude, vec!["**/storage/**"]);
        assert_eq!(settings.manifest.marker, MarkerPolicy::Strict);
        assert!(!settings.is_rule_enabled(ViolationKind::CrossModuleImport));
        assert_eq!(
            settings.rule_severity(ViolationKind::CrossModuleConfig),
            Severity::Warning
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            Settings::parse("fail_on = ["),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn restrict_rules_disables_the_rest() {
        let mut settings = Settings::default();
        let unknown = settings.restrict_rules(&["MB002", "bogus"]);
        assert_eq!(unknown, vec!["bogus"]);
        assert!(!settings.is_rule_enabled(ViolationKind::CrossModuleImport));
        assert!(settings.is_rule_enabled(ViolationKind::CrossModuleConfig));
    }

    #[test]
    fn exclude_matcher_matches_nested_and_root_paths() {
        let settings = Settings::default();
        let matcher = settings.exclude_matcher().expect("valid globs");
        assert!(matcher.is_excluded(Path::new("vendor/laravel/framework/src/A.php")));
        assert!(matcher.is_excluded(Path::new("packages/x/vendor/B.php")));
        assert!(!matcher.is_excluded(Path::new("app/Modules/Billing/src/C.php")));
    }

    #[test]
    fn invalid_exclude_pattern_is_reported() {
        let mut settings = Settings::default();
        settings.analyzer.exclude = vec!["[".into()];
        assert!(matches!(
            settings.exclude_matcher(),
            Err(SettingsError::Pattern { .. })
        ));
    }
}
