//! Finding and source-location types reported by the analysis engine.

use serde::{Deserialize, Serialize};

/// Severity of a reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Default severity for security findings.
    Warning,
    /// High-confidence, high-impact finding.
    Error,
}

/// Source span of a finding, zero-based rows and columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self { line, column, end_line, end_column }
    }

    /// A span covering a single point, used by synthetic trees in tests.
    pub fn point(line: u32, column: u32) -> Self {
        Self { line, column, end_line: line, end_column: column }
    }
}

/// A single diagnostic produced by the taint engine or one of its
/// extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule id, e.g. `SCS0002`.
    pub rule_id: String,
    /// File the finding was reported in.
    pub file: String,
    pub span: Span,
    /// Rendered message with positional arguments substituted.
    pub message: String,
    pub severity: Severity,
    /// CWE id when the rule maps to one.
    pub cwe: Option<u32>,
}
