//! CLI command implementations.

pub mod check;
pub mod init;
pub mod list_rules;
pub mod modules;
pub mod output;
