//! Per-method execution state.

use sift_core::config::AnalyzerConfig;
use sift_core::types::collections::FxHashMap;
use sift_core::types::findings::{Finding, Span};
use tracing::trace;

use crate::rules::RuleCatalog;
use crate::syntax::{Symbol, SyntaxApi};

use super::behavior::BehaviorTable;
use super::lattice::Taint;
use super::variable_state::VariableState;

/// Execution state for one analyzed method body.
///
/// Keeps the state of each variable, plus borrowed handles to everything
/// the walk needs: the syntax unit (shape queries and symbol resolution),
/// the behavior table, the rule catalog, and the analyzer config. Mutated
/// statement by statement; read by extensions at method exit. One instance
/// per method, never reused.
pub struct ExecutionState<'a, S: SyntaxApi> {
    pub syntax: &'a S,
    pub behaviors: &'a BehaviorTable,
    pub rules: &'a RuleCatalog,
    pub config: &'a AnalyzerConfig,
    variables: FxHashMap<String, VariableState<S::Node>>,
    findings: Vec<Finding>,
}

impl<'a, S: SyntaxApi> ExecutionState<'a, S> {
    pub fn new(
        syntax: &'a S,
        behaviors: &'a BehaviorTable,
        rules: &'a RuleCatalog,
        config: &'a AnalyzerConfig,
    ) -> Self {
        Self {
            syntax,
            behaviors,
            rules,
            config,
            variables: FxHashMap::default(),
            findings: Vec::new(),
        }
    }

    /// All tracked variables. Extensions enumerate this at method exit.
    pub fn variables(&self) -> &FxHashMap<String, VariableState<S::Node>> {
        &self.variables
    }

    /// Bind a freshly declared variable. An existing binding with the same
    /// name (a declaration in a different scope) is discarded, not merged:
    /// a redeclared local is a fresh variable.
    pub fn add_new_value(&mut self, identifier: &str, value: VariableState<S::Node>) {
        if self.variables.remove(identifier).is_some() {
            trace!(identifier, "removing existing state");
        }
        trace!(identifier, taint = ?value.taint, "adding state");
        self.variables.insert(identifier.to_string(), value);
    }

    /// Reassignment to an existing identifier: replace taint in place,
    /// accumulating tags. Inserts when the identifier is unbound.
    pub fn add_or_update_value(&mut self, identifier: &str, value: VariableState<S::Node>) {
        match self.variables.get_mut(identifier) {
            Some(existing) => {
                trace!(identifier, taint = ?value.taint, "updating state");
                existing.merge_and_replace_taint(&value);
            }
            None => {
                trace!(identifier, taint = ?value.taint, "adding state");
                self.variables.insert(identifier.to_string(), value);
            }
        }
    }

    /// Control-flow-safe merge into an existing binding, used when a
    /// nested member write must be reflected back on the root identifier.
    pub fn merge_value(&mut self, identifier: &str, value: VariableState<S::Node>) {
        match self.variables.get_mut(identifier) {
            Some(existing) => {
                existing.merge(&value);
                trace!(identifier, taint = ?existing.taint, "merging state");
            }
            None => {
                trace!(identifier, "merging state for unbound identifier");
                self.variables.insert(identifier.to_string(), value);
            }
        }
    }

    pub fn value_of(&self, identifier: &str) -> Option<&VariableState<S::Node>> {
        self.variables.get(identifier)
    }

    pub fn value_of_mut(&mut self, identifier: &str) -> Option<&mut VariableState<S::Node>> {
        self.variables.get_mut(identifier)
    }

    /// The bound state for `identifier`, or an `Unknown` placeholder
    /// anchored at `at` when the identifier was never seen (e.g. a field
    /// reference declared outside the method). Absence never implies
    /// safety.
    pub fn value_by_identifier(&self, identifier: &str, at: S::Node) -> VariableState<S::Node> {
        match self.variables.get(identifier) {
            Some(value) => value.clone(),
            None => VariableState::new(at, Taint::UNKNOWN),
        }
    }

    /// Resolve the declared symbol `node` refers to. `None` when the
    /// expression is unresolved; never an error.
    pub fn resolve(&self, node: S::Node) -> Option<Symbol> {
        self.syntax.resolve(node)
    }

    pub fn report(&mut self, rule_id: &str, span: Span) {
        self.report_with(rule_id, span, &[]);
    }

    pub fn report_with(&mut self, rule_id: &str, span: Span, args: &[&str]) {
        trace!(rule = rule_id, line = span.line, "reporting finding");
        let finding = self.rules.finding(rule_id, self.syntax.file(), span, args);
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
