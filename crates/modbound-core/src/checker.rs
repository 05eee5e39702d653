//! Per-file boundary checking.
//!
//! Ties the pieces together for one file: resolve the project, find the
//! file's module, extract references from each syntax node, locate the module
//! each reference points into and evaluate the pair. Anything that cannot be
//! resolved is skipped without a diagnostic.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::boundary::{self, BoundaryViolation, Verdict, ViolationKind};
use crate::cache::{Project, ProjectCache};
use crate::reference::{self, ExtractedReference, SyntaxNode};
use crate::settings::Settings;
use crate::types::{Location, Suggestion, Violation};

/// Checks files against the module boundaries of their project.
#[derive(Debug)]
pub struct BoundaryChecker {
    settings: Settings,
    cache: ProjectCache,
}

impl BoundaryChecker {
    /// Creates a checker with its own project cache.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let cache = ProjectCache::new(settings.manifest.marker);
        Self { settings, cache }
    }

    /// The settings in effect.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The project governing `file`, if any.
    #[must_use]
    pub fn project_for(&self, file: &Path) -> Option<Arc<Project>> {
        self.cache.project_for(file)
    }

    /// Checks the syntax nodes of one file.
    #[must_use]
    pub fn check_nodes(&self, file: &Path, nodes: &[SyntaxNode]) -> Vec<Violation> {
        let references: Vec<ExtractedReference> = nodes.iter().flat_map(reference::extract).collect();
        self.check_references(file, &references)
    }

    /// Checks already-extracted references of one file.
    #[must_use]
    pub fn check_references(&self, file: &Path, references: &[ExtractedReference]) -> Vec<Violation> {
        if references.is_empty() {
            return Vec::new();
        }
        let Some(project) = self.cache.project_for(file) else {
            debug!("No module layout governs {}", file.display());
            return Vec::new();
        };
        let locator = project.locator();
        let Some(current) = locator.module_of_file(file) else {
            debug!("{} is outside every module", file.display());
            return Vec::new();
        };

        references
            .iter()
            .filter(|r| {
                self.settings
                    .is_rule_enabled(ViolationKind::of(&r.reference))
            })
            .filter_map(|r| {
                let target = locator.module_of_reference(&r.reference);
                match boundary::evaluate(
                    &current,
                    target,
                    &project.config.shared_modules,
                    &r.reference,
                ) {
                    Verdict::Allowed(_) => None,
                    Verdict::Violation(v) => Some(self.diagnostic(file, r, &v, &project)),
                }
            })
            .collect()
    }

    fn diagnostic(
        &self,
        file: &Path,
        found: &ExtractedReference,
        violation: &BoundaryViolation,
        project: &Project,
    ) -> Violation {
        let kind = violation.kind;
        let help = format!(
            "add \"{}\" to extra.{}.shared in {} or route the dependency through a shared module",
            violation.referenced_module,
            crate::manifest::SHARED_KEY,
            project.config.manifest_path.display(),
        );
        Violation::new(
            kind.code(),
            kind.rule_name(),
            kind.identifier(),
            self.settings.rule_severity(kind),
            Location::from_span(file.to_path_buf(), found.span),
            violation.message(&project.config.shared_list()),
        )
        .with_suggestion(Suggestion::new(help))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Span;
    use crate::types::Severity;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn project(shared: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        for d in [
            "app/Modules/Billing/src",
            "app/Modules/Catalog/config",
            "app/Modules/Shared/src",
        ] {
            fs::create_dir_all(tmp.path().join(d)).unwrap();
        }
        fs::write(
            tmp.path().join("app/Modules/Catalog/config/catalog.php"),
            "<?php return [];",
        )
        .unwrap();
        fs::write(
            tmp.path().join("composer.json"),
            format!(
                r#"{{"extra": {{"modules": {{"path": "app/Modules"}}, "phpstan-laravel-module-boundaries": {{"shared": {shared}}}}}}}"#
            ),
        )
        .unwrap();
        let root = tmp.path().join("app/Modules").canonicalize().unwrap();
        (tmp, root)
    }

    fn import(name: &str, line: usize) -> SyntaxNode {
        SyntaxNode::ImportStatement {
            name: name.into(),
            span: Span {
                line,
                ..Span::default()
            },
        }
    }

    fn helper(key: &str) -> SyntaxNode {
        SyntaxNode::FreeFunctionCall {
            function: "config".into(),
            first_arg: Some(key.into()),
            span: Span::default(),
        }
    }

    #[test]
    fn reports_cross_module_import_with_location_and_help() {
        let (_tmp, root) = project("[]");
        let checker = BoundaryChecker::new(Settings::default());
        let file = root.join("Billing/src/Invoice.php");
        let v = checker.check_nodes(&file, &[import("App\\Modules\\Catalog\\Service", 5)]);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].code, "MB001");
        assert_eq!(v[0].identifier, "moduleBoundary.crossModuleImport");
        assert_eq!(v[0].location.line, 5);
        assert_eq!(v[0].severity, Severity::Error);
        let help = &v[0].suggestion.as_ref().expect("help").message;
        assert!(help.starts_with("add \"Catalog\" to extra.phpstan-laravel-module-boundaries.shared"));
    }

    #[test]
    fn shared_and_same_module_references_pass() {
        let (_tmp, root) = project(r#"["Shared"]"#);
        let checker = BoundaryChecker::new(Settings::default());
        let file = root.join("Billing/src/Invoice.php");
        let nodes = [
            import("App\\Modules\\Shared\\Money", 3),
            import("App\\Modules\\Billing\\Tax", 4),
            import("Illuminate\\Support\\Str", 5),
        ];
        assert!(checker.check_nodes(&file, &nodes).is_empty());
    }

    #[test]
    fn disabled_rule_is_skipped_and_severity_override_applies() {
        let (_tmp, root) = project("[]");
        let settings = Settings::parse(
            r#"
[rules.cross-module-import]
enabled = false

[rules.cross-module-config]
severity = "warning"
"#,
        )
        .unwrap();
        let checker = BoundaryChecker::new(settings);
        let file = root.join("Billing/src/Invoice.php");
        let v = checker.check_nodes(
            &file,
            &[import("App\\Modules\\Catalog\\Service", 1), helper("catalog.currency")],
        );
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].rule, "cross-module-config");
        assert_eq!(v[0].severity, Severity::Warning);
    }

    #[test]
    fn files_outside_modules_are_never_reported() {
        let (tmp, _root) = project("[]");
        let checker = BoundaryChecker::new(Settings::default());
        let file = tmp.path().join("app/Http/Kernel.php");
        let v = checker.check_nodes(
            &file,
            &[import("App\\Modules\\Catalog\\Service", 1), helper("catalog.currency")],
        );
        assert!(v.is_empty());
    }

    #[test]
    fn message_lists_shared_modules() {
        let (_tmp, root) = project(r#"["Shared"]"#);
        let checker = BoundaryChecker::new(Settings::default());
        let file = root.join("Billing/src/Invoice.php");
        let v = checker.check_nodes(&file, &[helper("catalog.currency")]);
        assert_eq!(v.len(), 1);
        assert!(v[0]
            .message
            .ends_with("only allowed from shared modules (Shared)."));
    }
}
