//! Symbolic references and their extraction from parsed syntax nodes.
//!
//! Parsing is the job of a syntax source (see `modbound-php`). It hands the
//! engine one [`SyntaxNode`] per node of interest; [`extract`] turns each node
//! into the [`SymbolicReference`]s it implies.

use serde::{Deserialize, Serialize};

/// Facade classes whose static calls read configuration.
const CONFIG_FACADES: &[&str] = &["Config", "Illuminate\\Support\\Facades\\Config"];

/// Facade methods that take a configuration key as first argument.
const CONFIG_FACADE_METHODS: &[&str] = &["get", "set", "has", "forget"];

/// Free function that reads configuration.
const CONFIG_HELPER: &str = "config";

/// Position of a node in its source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within line).
    pub column: usize,
    /// Byte offset from the start of the file.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
}

/// One member of a grouped `use` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// Name relative to the group prefix (e.g. `Service` or `Models\Order`).
    pub name: String,
    /// Where the member appears.
    pub span: Span,
}

/// The kinds of syntax node the engine inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// `use App\Modules\Catalog\Service;` (one clause of a non-grouped `use`).
    ImportStatement {
        /// Fully qualified imported name.
        name: String,
        /// Where the clause appears.
        span: Span,
    },
    /// `use App\Modules\Catalog\{Service, Repository};`
    GroupedImportStatement {
        /// Shared namespace prefix.
        prefix: String,
        /// Group members.
        members: Vec<GroupMember>,
        /// Where the statement appears.
        span: Span,
    },
    /// `Config::get('billing.tax_rate')`
    StaticFacadeCall {
        /// Class name as written (unqualified or fully qualified).
        class: String,
        /// Method name.
        method: String,
        /// First argument when it is a literal string, `None` when dynamic or absent.
        first_arg: Option<String>,
        /// Where the call appears.
        span: Span,
    },
    /// `config('billing.tax_rate')`
    FreeFunctionCall {
        /// Function name as written.
        function: String,
        /// First argument when it is a literal string, `None` when dynamic or absent.
        first_arg: Option<String>,
        /// Where the call appears.
        span: Span,
    },
}

/// How a configuration key was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigAccess {
    /// Through the `Config` facade, with the method used.
    Facade {
        /// `get`, `set`, `has` or `forget`.
        method: String,
    },
    /// Through the `config()` helper.
    Helper,
}

/// A reference from source code that may point into a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolicReference {
    /// An imported class or namespace.
    Import {
        /// Fully qualified `\`-separated path, without leading separator.
        path: String,
    },
    /// A dot-delimited configuration key.
    ConfigKey {
        /// The key as written.
        key: String,
        /// How the key was read.
        access: ConfigAccess,
    },
}

impl SymbolicReference {
    /// Creates an import reference, stripping any leading `\`.
    #[must_use]
    pub fn import(path: &str) -> Self {
        Self::Import {
            path: path.trim_start_matches('\\').to_owned(),
        }
    }

    /// Namespace segments of an import; empty for config keys.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let path = match self {
            Self::Import { path } => path.as_str(),
            Self::ConfigKey { .. } => "",
        };
        path.split('\\').filter(|s| !s.is_empty())
    }

    /// Config file basename a key addresses (`billing` for `billing.tax_rate`).
    #[must_use]
    pub fn config_basename(&self) -> Option<&str> {
        match self {
            Self::ConfigKey { key, .. } => key.split('.').next().filter(|s| !s.is_empty()),
            Self::Import { .. } => None,
        }
    }
}

impl std::fmt::Display for SymbolicReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import { path } => write!(f, "{path}"),
            Self::ConfigKey { key, .. } => write!(f, "{key}"),
        }
    }
}

/// A reference together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReference {
    /// The reference.
    pub reference: SymbolicReference,
    /// Where it was found.
    pub span: Span,
}

/// Extracts the symbolic references a syntax node implies.
///
/// Calls that are not configuration reads, and configuration reads whose key
/// is not a literal string, yield nothing.
#[must_use]
pub fn extract(node: &SyntaxNode) -> Vec<ExtractedReference> {
    match node {
        SyntaxNode::ImportStatement { name, span } => vec![ExtractedReference {
            reference: SymbolicReference::import(name),
            span: *span,
        }],
        SyntaxNode::GroupedImportStatement {
            prefix, members, ..
        } => {
            let prefix = prefix.trim_matches('\\');
            members
                .iter()
                .map(|m| ExtractedReference {
                    reference: SymbolicReference::import(&format!(
                        "{prefix}\\{}",
                        m.name.trim_start_matches('\\')
                    )),
                    span: m.span,
                })
                .collect()
        }
        SyntaxNode::StaticFacadeCall {
            class,
            method,
            first_arg,
            span,
        } => {
            if !is_config_facade(class) || !CONFIG_FACADE_METHODS.contains(&method.as_str()) {
                return Vec::new();
            }
            config_key(first_arg.as_deref(), *span, || ConfigAccess::Facade {
                method: method.clone(),
            })
        }
        SyntaxNode::FreeFunctionCall {
            function,
            first_arg,
            span,
        } => {
            if function.trim_start_matches('\\') != CONFIG_HELPER {
                return Vec::new();
            }
            config_key(first_arg.as_deref(), *span, || ConfigAccess::Helper)
        }
    }
}

fn is_config_facade(class: &str) -> bool {
    CONFIG_FACADES.contains(&class.trim_start_matches('\\'))
}

fn config_key(
    first_arg: Option<&str>,
    span: Span,
    access: impl FnOnce() -> ConfigAccess,
) -> Vec<ExtractedReference> {
    match first_arg {
        Some(key) => vec![ExtractedReference {
            reference: SymbolicReference::ConfigKey {
                key: key.to_owned(),
                access: access(),
            },
            span,
        }],
        None => Vec::new(),
    }
}
