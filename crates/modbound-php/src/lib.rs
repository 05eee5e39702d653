//! # modbound-php
//!
//! Tree-sitter powered PHP syntax source for modbound.
//!
//! Parses PHP files and reports the syntax `modbound-core` reasons about:
//! `use` imports (single and grouped), static `Config::` facade calls and
//! free `config()` calls, each with its literal first argument when there
//! is one.
//!
//! - [`LanguageExtractor`] trait for pluggable syntax sources
//! - [`PhpExtractor`] for PHP

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod extractor;
pub mod php;

pub use extractor::{ExtractError, FileAnalysis, LanguageExtractor};
pub use php::PhpExtractor;
