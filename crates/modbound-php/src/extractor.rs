//! Language-agnostic extraction types and trait.
//!
//! `LanguageExtractor` is the extension point for syntax sources. Implement it
//! to turn the source text of a language into the [`SyntaxNode`]s the boundary
//! engine understands.

use modbound_core::SyntaxNode;

/// Result of analyzing a single source file.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    /// Imports and calls of interest, in source order.
    pub nodes: Vec<SyntaxNode>,
    /// Whether the parser had to recover from syntax errors.
    pub has_syntax_errors: bool,
}

/// Errors raised while extracting from a source file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {language} grammar: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Loader message.
        message: String,
    },
    /// The parser produced no tree.
    #[error("failed to parse {language} source")]
    Parse {
        /// Language identifier.
        language: &'static str,
    },
}

/// Trait for language-specific Tree-sitter extraction.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"php"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".php"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extracts the syntax nodes of interest from source code.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be parsed at all.
    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError>;

    /// Whether this extractor handles `path`, judged by extension.
    fn handles(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}
