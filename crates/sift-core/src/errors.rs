//! Error types shared across Sift crates.
//!
//! Recoverable analysis conditions (unresolved symbols, unknown APIs,
//! unsupported syntax shapes) are not errors; they flow through the engine
//! as `None`/`Unknown` values. The variants here cover unreadable input,
//! missing grammars, and malformed configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while parsing source files into syntax trees.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file extension: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("failed to load grammar for {language}")]
    GrammarNotFound { language: String },

    #[error("tree-sitter failed on {}: {message}", path.display())]
    TreeSitter { path: PathBuf, message: String },

    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building the method-behavior table or rule catalog.
///
/// These surface before any analysis begins; the engine never sees a
/// malformed behavior.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("behavior entry {key}: {message}")]
    InvalidBehavior { key: String, message: String },

    #[error("duplicate behavior key {key}")]
    DuplicateBehavior { key: String },

    #[error("unknown taint type {name}")]
    UnknownTaintType { name: String },

    #[error("too many custom taint types (limit {limit})")]
    TaintTypeLimit { limit: usize },
}

/// Errors raised while walking directory trees.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },
}
