//! Module membership: which module owns a file, and which module a reference points into.

use std::path::{Component, Path};

use crate::manifest::BoundaryConfig;
use crate::modules::ModuleIndex;
use crate::reference::SymbolicReference;

/// Subdirectory of a module holding its config files.
pub const MODULE_CONFIG_DIR: &str = "config";

/// Extension of module config files.
pub const CONFIG_EXTENSION: &str = "php";

/// Resolves files and references to module names.
///
/// Borrowed views over a run's [`BoundaryConfig`] and [`ModuleIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ModuleLocator<'a> {
    config: &'a BoundaryConfig,
    index: &'a ModuleIndex,
}

impl<'a> ModuleLocator<'a> {
    /// Creates a locator.
    #[must_use]
    pub fn new(config: &'a BoundaryConfig, index: &'a ModuleIndex) -> Self {
        Self { config, index }
    }

    /// The module owning `file`, if it lives under `<modules_root>/<module>/`.
    #[must_use]
    pub fn module_of_file(&self, file: &Path) -> Option<String> {
        module_of_file(file, &self.config.modules_root).or_else(|| {
            let canonical = file.canonicalize().ok()?;
            module_of_file(&canonical, &self.config.modules_root)
        })
    }

    /// The module a reference points into, if any.
    ///
    /// Imports match the first namespace segment equal (ignoring ASCII case)
    /// to a module directory. Config keys match the first module that ships
    /// `config/<first key segment>.php`.
    #[must_use]
    pub fn module_of_reference(&self, reference: &SymbolicReference) -> Option<&'a str> {
        match reference {
            SymbolicReference::Import { .. } => reference
                .segments()
                .find_map(|segment| self.index.find_ignore_case(segment)),
            SymbolicReference::ConfigKey { .. } => {
                let basename = reference.config_basename()?;
                self.module_owning_config(basename)
            }
        }
    }

    /// The first module (alphabetically) shipping `config/<basename>.php`.
    #[must_use]
    pub fn module_owning_config(&self, basename: &str) -> Option<&'a str> {
        let file_name = format!("{basename}.{CONFIG_EXTENSION}");
        self.index
            .names()
            .iter()
            .find(|module| {
                self.index
                    .module_dir(module)
                    .join(MODULE_CONFIG_DIR)
                    .join(&file_name)
                    .is_file()
            })
            .map(String::as_str)
    }

    /// Config basenames a module ships, sorted.
    #[must_use]
    pub fn config_basenames(&self, module: &str) -> Vec<String> {
        let dir = self.index.module_dir(module).join(MODULE_CONFIG_DIR);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(CONFIG_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
            .collect();
        names.sort();
        names
    }
}

/// Path-only membership test: the component right after `root`, when more follow.
#[must_use]
pub fn module_of_file(file: &Path, root: &Path) -> Option<String> {
    let rest = file.strip_prefix(root).ok()?;
    let mut components = rest.components();
    let module = match components.next()? {
        Component::Normal(name) => name.to_str()?.to_owned(),
        _ => return None,
    };
    components.next()?;
    Some(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::reference::ConfigAccess;

    struct Fixture {
        _tmp: TempDir,
        config: BoundaryConfig,
        index: ModuleIndex,
    }

    fn fixture(modules: &[&str], config_files: &[&str]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("app/Modules");
        for m in modules {
            fs::create_dir_all(root.join(m).join("src")).unwrap();
        }
        for f in config_files {
            let path = root.join(f);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "<?php return [];").unwrap();
        }
        let root = root.canonicalize().unwrap();
        let index = ModuleIndex::scan(&root);
        Fixture {
            config: BoundaryConfig {
                manifest_path: tmp.path().join("composer.json"),
                modules_root: root,
                shared_modules: BTreeSet::new(),
            },
            index,
            _tmp: tmp,
        }
    }

    fn key(k: &str) -> SymbolicReference {
        SymbolicReference::ConfigKey {
            key: k.into(),
            access: ConfigAccess::Helper,
        }
    }

    #[test]
    fn file_in_deep_module_path() {
        let root = Path::new("/srv/app/Modules");
        assert_eq!(
            module_of_file(&root.join("Billing/Some/Deep/File.php"), root),
            Some("Billing".to_string())
        );
    }

    #[test]
    fn file_directly_in_root_has_no_module() {
        let root = Path::new("/srv/app/Modules");
        assert_eq!(module_of_file(&root.join("helpers.php"), root), None);
    }

    #[test]
    fn file_outside_root_has_no_module() {
        let root = Path::new("/srv/app/Modules");
        assert_eq!(
            module_of_file(Path::new("/srv/app/Http/Kernel.php"), root),
            None
        );
        // Textual prefix without a separator is not containment.
        assert_eq!(
            module_of_file(Path::new("/srv/app/ModulesExtra/Billing/A.php"), root),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn locator_falls_back_to_canonical_file_path() {
        let f = fixture(&["Billing"], &[]);
        let root = &f.config.modules_root;
        fs::write(root.join("Billing/src/Invoice.php"), "").unwrap();
        let alias = root.parent().unwrap().join("ModulesAlias");
        std::os::unix::fs::symlink(root, &alias).unwrap();

        let locator = ModuleLocator::new(&f.config, &f.index);
        let through_alias: PathBuf = alias.join("Billing/src/Invoice.php");
        assert_eq!(locator.module_of_file(&through_alias), Some("Billing".into()));
    }

    #[test]
    fn import_matches_first_module_segment_ignoring_case() {
        let f = fixture(&["Billing", "Catalog"], &[]);
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(
            locator.module_of_reference(&SymbolicReference::import("App\\Modules\\Catalog\\Service")),
            Some("Catalog")
        );
        assert_eq!(
            locator.module_of_reference(&SymbolicReference::import("App\\catalog\\Billing\\X")),
            Some("Catalog")
        );
    }

    #[test]
    fn import_without_module_segment_is_unowned() {
        let f = fixture(&["Billing"], &[]);
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(
            locator.module_of_reference(&SymbolicReference::import("Illuminate\\Support\\Str")),
            None
        );
    }

    #[test]
    fn config_key_resolves_through_module_config_file() {
        let f = fixture(&["Billing", "Catalog"], &["Catalog/config/catalog.php"]);
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(
            locator.module_of_reference(&key("catalog.currency")),
            Some("Catalog")
        );
        assert_eq!(locator.module_of_reference(&key("catalog")), Some("Catalog"));
        assert_eq!(locator.module_of_reference(&key("app.debug")), None);
        assert_eq!(locator.module_of_reference(&key(".x")), None);
    }

    #[test]
    fn config_tie_goes_to_first_module_alphabetically() {
        let f = fixture(
            &["Billing", "Catalog"],
            &["Catalog/config/money.php", "Billing/config/money.php"],
        );
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(locator.module_owning_config("money"), Some("Billing"));
    }

    #[test]
    fn config_directory_named_like_file_does_not_count() {
        let f = fixture(&["Billing"], &[]);
        fs::create_dir_all(f.config.modules_root.join("Billing/config/billing.php")).unwrap();
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(locator.module_owning_config("billing"), None);
    }

    #[test]
    fn lists_config_basenames() {
        let f = fixture(
            &["Billing"],
            &["Billing/config/tax.php", "Billing/config/billing.php", "Billing/config/notes.txt"],
        );
        let locator = ModuleLocator::new(&f.config, &f.index);
        assert_eq!(locator.config_basenames("Billing"), vec!["billing", "tax"]);
        assert!(locator.config_basenames("Nope").is_empty());
    }
}
