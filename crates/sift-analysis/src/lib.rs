//! # sift-analysis
//!
//! Taint analysis engine for the Sift security analyzer.
//! Contains the taint lattice, behavior tables, execution state, the
//! tree-walking taint visitor with its extension protocol, dialect
//! adapters, the rule catalog, the directory scanner, and the file-level
//! driver.

pub mod analyzer;
pub mod rules;
pub mod scanner;
pub mod syntax;
pub mod taint;
