//! # modbound-core
//!
//! Module resolution and boundary-permission engine.
//!
//! A project declares in its `composer.json` a directory whose immediate
//! subdirectories are modules, plus an allowlist of shared modules. This crate
//! decides, per file, whether the imports and configuration reads a syntax
//! source hands it cross into a module that is neither the file's own nor
//! shared:
//!
//! - [`manifest`] finds and reads the governing manifest ([`BoundaryConfig`])
//! - [`ModuleIndex`] lists module directories
//! - [`ModuleLocator`] maps files and references to modules
//! - [`boundary::evaluate`] makes the allow/deny decision
//! - [`reference::extract`] turns [`SyntaxNode`]s into [`SymbolicReference`]s
//! - [`BoundaryChecker`] runs all of the above for one file
//!
//! ## Example
//!
//! ```ignore
//! use modbound_core::{BoundaryChecker, Settings, SyntaxNode};
//!
//! let checker = BoundaryChecker::new(Settings::default());
//! let violations = checker.check_nodes(path, &nodes);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod boundary;
mod cache;
mod checker;
mod locator;
pub mod manifest;
mod modules;
pub mod reference;
mod settings;
mod types;

pub use boundary::{Allowance, BoundaryViolation, Verdict, ViolationKind};
pub use cache::{Project, ProjectCache};
pub use checker::BoundaryChecker;
pub use locator::{module_of_file, ModuleLocator, CONFIG_EXTENSION, MODULE_CONFIG_DIR};
pub use manifest::{BoundaryConfig, ManifestError, MarkerPolicy, MANIFEST_FILE};
pub use modules::ModuleIndex;
pub use reference::{
    ConfigAccess, ExtractedReference, GroupMember, Span, SymbolicReference, SyntaxNode,
};
pub use settings::{
    AnalyzerSettings, ExcludeMatcher, ManifestSettings, RuleSettings, Settings, SettingsError,
};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
