//! Boundary permission decisions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::reference::{ConfigAccess, SymbolicReference};

/// Kind of boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// A `use` of another module's namespace.
    CrossModuleImport,
    /// A read of another module's config file.
    CrossModuleConfig,
}

impl ViolationKind {
    /// All kinds, in code order.
    pub const ALL: [Self; 2] = [Self::CrossModuleImport, Self::CrossModuleConfig];

    /// Rule code (e.g. `MB001`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::CrossModuleImport => "MB001",
            Self::CrossModuleConfig => "MB002",
        }
    }

    /// Kebab-case rule name used in settings files.
    #[must_use]
    pub fn rule_name(self) -> &'static str {
        match self {
            Self::CrossModuleImport => "cross-module-import",
            Self::CrossModuleConfig => "cross-module-config",
        }
    }

    /// Machine-readable identifier for diagnostic sinks.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Self::CrossModuleImport => "moduleBoundary.crossModuleImport",
            Self::CrossModuleConfig => "moduleBoundary.crossModuleConfig",
        }
    }

    /// One-line description.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::CrossModuleImport => "Imports from another module that is not shared",
            Self::CrossModuleConfig => "Reads config owned by another module that is not shared",
        }
    }

    /// Looks a kind up by rule name or code.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.rule_name() == name || k.code().eq_ignore_ascii_case(name))
    }

    /// The kind a reference would violate.
    #[must_use]
    pub fn of(reference: &SymbolicReference) -> Self {
        match reference {
            SymbolicReference::Import { .. } => Self::CrossModuleImport,
            SymbolicReference::ConfigKey { .. } => Self::CrossModuleConfig,
        }
    }
}

/// Why a reference was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    /// The reference does not point into any module.
    NotModuleOwned,
    /// The reference stays within the current module.
    SameModule,
    /// The referenced module is shared.
    SharedModule,
}

/// A reference that crosses a module boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryViolation {
    /// Module containing the reference.
    pub current_module: String,
    /// Module the reference points into.
    pub referenced_module: String,
    /// The offending reference.
    pub reference: SymbolicReference,
    /// Kind of crossing.
    pub kind: ViolationKind,
}

impl BoundaryViolation {
    /// Human-readable message listing the shared modules that may be used instead.
    #[must_use]
    pub fn message(&self, shared: &str) -> String {
        let (current, target) = (&self.current_module, &self.referenced_module);
        match &self.reference {
            SymbolicReference::Import { path } => format!(
                "Module \"{current}\" cannot import \"{path}\" from module \"{target}\". \
                 Cross-module imports are only allowed from shared modules ({shared})."
            ),
            SymbolicReference::ConfigKey {
                key,
                access: ConfigAccess::Facade { method },
            } => format!(
                "Module \"{current}\" cannot access config \"{key}\" from module \"{target}\" \
                 using Config::{method}(). \
                 Cross-module config access is only allowed from shared modules ({shared})."
            ),
            SymbolicReference::ConfigKey {
                key,
                access: ConfigAccess::Helper,
            } => format!(
                "Module \"{current}\" cannot access config \"{key}\" from module \"{target}\". \
                 Cross-module config access is only allowed from shared modules ({shared})."
            ),
        }
    }
}

/// Outcome of evaluating one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The reference is permitted.
    Allowed(Allowance),
    /// The reference crosses a boundary.
    Violation(BoundaryViolation),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Allowed`].
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Decides whether `current` may reference `referenced`.
///
/// A shared module may be referenced from anywhere, which also covers shared
/// modules referencing each other. Names compare case-sensitively.
#[must_use]
pub fn evaluate(
    current: &str,
    referenced: Option<&str>,
    shared: &BTreeSet<String>,
    reference: &SymbolicReference,
) -> Verdict {
    let Some(referenced) = referenced else {
        return Verdict::Allowed(Allowance::NotModuleOwned);
    };
    if referenced == current {
        return Verdict::Allowed(Allowance::SameModule);
    }
    if shared.contains(referenced) {
        return Verdict::Allowed(Allowance::SharedModule);
    }
    Verdict::Violation(BoundaryViolation {
        current_module: current.to_owned(),
        referenced_module: referenced.to_owned(),
        reference: reference.clone(),
        kind: ViolationKind::of(reference),
    })
}
