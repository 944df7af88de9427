//! File-level analysis driver.
//!
//! Owns the behavior table, rule catalog, and analyzer config, all
//! read-only once analysis starts and shared by reference across rayon
//! workers. Analysis is per-method: each method gets a fresh execution
//! state, and a failing file is logged and skipped rather than aborting
//! the run.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use rayon::prelude::*;
use serde::Serialize;
use sift_core::config::{AnalyzerConfig, ScanConfig};
use sift_core::errors::{ConfigError, ParseError, ScanError};
use sift_core::types::findings::Finding;
use tracing::{debug, warn};

use crate::rules::RuleCatalog;
use crate::scanner::{walk_directory, Language};
use crate::syntax::{csharp, java, SyntaxApi};
use crate::taint::extensions::{default_extensions, TaintExtension};
use crate::taint::{BehaviorTable, ExecutionState, TaintVisitor};

/// The Sift analyzer.
pub struct Analyzer {
    behaviors: BehaviorTable,
    rules: RuleCatalog,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(behaviors: BehaviorTable, rules: RuleCatalog, config: AnalyzerConfig) -> Self {
        Self { behaviors, rules, config }
    }

    /// Analyzer with the built-in behavior table and rule catalog.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Ok(Self::new(
            BehaviorTable::with_defaults()?,
            RuleCatalog::with_defaults(),
            AnalyzerConfig::default(),
        ))
    }

    /// Mutable access to the behavior table, for loading additional
    /// definitions before analysis starts.
    pub fn behaviors_mut(&mut self) -> &mut BehaviorTable {
        &mut self.behaviors
    }

    pub fn rules_mut(&mut self) -> &mut RuleCatalog {
        &mut self.rules
    }

    /// Analyze every method of one parsed unit with the shipped
    /// extensions.
    pub fn analyze_unit<S: SyntaxApi>(&self, unit: &S) -> Vec<Finding> {
        let extensions = default_extensions::<S>();
        self.analyze_unit_with(unit, &extensions)
    }

    /// Analyze every method of one parsed unit with an explicit extension
    /// list.
    pub fn analyze_unit_with<S: SyntaxApi>(
        &self,
        unit: &S,
        extensions: &[Box<dyn TaintExtension<S>>],
    ) -> Vec<Finding> {
        let visitor = TaintVisitor::new(unit, extensions);
        let mut findings = Vec::new();
        for method in unit.methods() {
            debug!(method = %unit.method_signature(method), "analyzing method");
            let mut state = ExecutionState::new(unit, &self.behaviors, &self.rules, &self.config);
            visitor.analyze_method(method, &mut state);
            findings.extend(state.into_findings());
        }
        findings
    }

    /// Parse and analyze one source file, dispatching on its language.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Finding>, ParseError> {
        let extension = path.extension().and_then(|e| e.to_str());
        let language = Language::from_extension(extension).ok_or_else(|| {
            ParseError::UnsupportedLanguage {
                extension: extension.unwrap_or("<none>").to_string(),
            }
        })?;

        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source = String::from_utf8(bytes)
            .map_err(|_| ParseError::InvalidUtf8 { path: path.to_path_buf() })?;

        self.analyze_source(&source, path, language)
    }

    /// Analyze in-memory source text.
    pub fn analyze_source(
        &self,
        source: &str,
        path: &Path,
        language: Language,
    ) -> Result<Vec<Finding>, ParseError> {
        let file = path.display().to_string();
        match language {
            Language::CSharp => {
                let tree = csharp::parse(source, path)?;
                let unit = csharp::CSharpUnit::new(file, source, &tree);
                Ok(self.analyze_unit(&unit))
            }
            Language::Java => {
                let tree = java::parse(source, path)?;
                let unit = java::JavaUnit::new(file, source, &tree);
                Ok(self.analyze_unit(&unit))
            }
        }
    }

    /// Walk `root` and analyze every supported file in parallel.
    ///
    /// Per-file failures (unreadable, unparsable) are logged with the file
    /// path and skipped; they never abort the run.
    pub fn analyze_paths(&self, root: &Path, scan: &ScanConfig) -> Result<AnalysisReport, ScanError> {
        let cancelled = AtomicBool::new(false);
        let files = walk_directory(root, scan, &cancelled)?;

        let findings: Vec<Finding> = files
            .par_iter()
            .flat_map(|file| match self.analyze_file(&file.path) {
                Ok(findings) => findings,
                Err(error) => {
                    warn!(path = %file.path.display(), %error, "skipping file");
                    Vec::new()
                }
            })
            .collect();

        Ok(AnalysisReport { files_analyzed: files.len(), findings })
    }
}

/// Aggregated result of a directory analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub files_analyzed: usize,
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
