//! Password-validator completeness check.
//!
//! Inspects the property states accumulated on every `PasswordValidator`
//! instance at method exit: `RequiredLength` must be set and large enough,
//! required boolean properties must be enabled, and a minimum number of
//! properties must be configured overall.

use sift_core::types::findings::Span;

use crate::syntax::{ConstantValue, SymbolKind, SyntaxApi};
use crate::taint::state::ExecutionState;
use crate::taint::variable_state::VariableState;

use super::TaintExtension;

const VALIDATOR_TYPE: &str = "PasswordValidator";
const REQUIRED_LENGTH: &str = "RequiredLength";

const BOOL_PROPERTIES: [&str; 4] = [
    "RequireDigit",
    "RequireLowercase",
    "RequireNonLetterOrDigit",
    "RequireUppercase",
];

pub const RULE_LENGTH_TOO_SMALL: &str = "SCS0032";
pub const RULE_TOO_FEW_PROPERTIES: &str = "SCS0033";
pub const RULE_REQUIRED_PROPERTY: &str = "SCS0034";

pub struct WeakPasswordValidator;

enum PendingFinding {
    LengthTooSmall(Span),
    TooFewProperties(Span),
    RequiredProperty(Span, String),
}

impl<S: SyntaxApi> TaintExtension<S> for WeakPasswordValidator {
    fn method_end(&self, _method: S::Node, state: &mut ExecutionState<'_, S>) {
        let config = state.config;
        let mut pending: Vec<PendingFinding> = Vec::new();

        for variable in state.variables().values() {
            let Some(symbol) = state.syntax.resolve(variable.node) else {
                continue;
            };
            if symbol.kind != SymbolKind::Constructor || !symbol.matches(VALIDATOR_TYPE, ".ctor") {
                continue;
            }

            let span = state.syntax.span(variable.node);
            let mut properties_set = 0usize;

            match variable.property_states.get(REQUIRED_LENGTH) {
                None => {
                    if is_required(config, REQUIRED_LENGTH) {
                        pending.push(PendingFinding::RequiredProperty(span, REQUIRED_LENGTH.into()));
                    }
                }
                Some(length) => {
                    properties_set += 1;
                    if is_too_small(length, config.password_validator_required_length)
                        || (!length.taint.is_constant() && config.audit_mode)
                    {
                        pending.push(PendingFinding::LengthTooSmall(span));
                    }
                }
            }

            for property in BOOL_PROPERTIES {
                if is_enabled(variable, property, config.audit_mode) {
                    properties_set += 1;
                } else if is_required(config, property) {
                    pending.push(PendingFinding::RequiredProperty(span, property.into()));
                }
            }

            if properties_set < config.minimum_password_validator_properties {
                pending.push(PendingFinding::TooFewProperties(span));
            }
        }

        let required_length = config.password_validator_required_length.to_string();
        let minimum = config.minimum_password_validator_properties.to_string();
        for finding in pending {
            match finding {
                PendingFinding::LengthTooSmall(span) => {
                    state.report_with(RULE_LENGTH_TOO_SMALL, span, &[&required_length]);
                }
                PendingFinding::TooFewProperties(span) => {
                    state.report_with(RULE_TOO_FEW_PROPERTIES, span, &[&minimum]);
                }
                PendingFinding::RequiredProperty(span, property) => {
                    state.report_with(RULE_REQUIRED_PROPERTY, span, &[&property]);
                }
            }
        }
    }
}

fn is_required(config: &sift_core::config::AnalyzerConfig, property: &str) -> bool {
    config
        .password_validator_required_properties
        .iter()
        .any(|p| p == property)
}

fn is_too_small<N>(length: &VariableState<N>, required: i64) -> bool {
    length.taint.is_constant()
        && matches!(
            length.value.as_ref().and_then(ConstantValue::as_int),
            Some(value) if value < required
        )
}

/// A boolean property counts as configured unless it is absent, constant
/// `false`, or (in audit mode) not provably constant.
fn is_enabled<N>(variable: &VariableState<N>, property: &str, audit_mode: bool) -> bool {
    match variable.property_states.get(property) {
        None => false,
        Some(state) => {
            if state.taint.is_constant() {
                state.value.as_ref().and_then(ConstantValue::as_bool) != Some(false)
            } else {
                !audit_mode
            }
        }
    }
}
