//! Cookie-flag completeness check.
//!
//! Tags cookie variables when their `Secure`/`HttpOnly` properties are
//! assigned, then reports at method exit for every cookie instance still
//! missing a flag.

use sift_core::types::findings::Span;

use crate::syntax::{Symbol, SymbolKind, SyntaxApi};
use crate::taint::behavior::MethodBehavior;
use crate::taint::state::ExecutionState;
use crate::taint::variable_state::{Tag, VariableState};

use super::TaintExtension;

const COOKIE_TYPE: &str = "HttpCookie";

pub const RULE_SECURE: &str = "SCS0008";
pub const RULE_HTTP_ONLY: &str = "SCS0009";

pub struct InsecureCookie;

impl<S: SyntaxApi> TaintExtension<S> for InsecureCookie {
    fn assignment_visited(
        &self,
        _node: S::Node,
        _state: &mut ExecutionState<'_, S>,
        _behavior: Option<&MethodBehavior>,
        symbol: Option<&Symbol>,
        rhs: &mut VariableState<S::Node>,
    ) {
        let Some(symbol) = symbol else { return };

        if symbol.matches(COOKIE_TYPE, "Secure") {
            rhs.add_tag(Tag::HttpCookieSecure);
        } else if symbol.matches(COOKIE_TYPE, "HttpOnly") {
            rhs.add_tag(Tag::HttpCookieHttpOnly);
        }
    }

    fn method_end(&self, _method: S::Node, state: &mut ExecutionState<'_, S>) {
        let mut missing: Vec<(&str, Span)> = Vec::new();

        for variable in state.variables().values() {
            let Some(symbol) = state.syntax.resolve(variable.node) else {
                continue;
            };
            if symbol.kind != SymbolKind::Constructor || !symbol.matches(COOKIE_TYPE, ".ctor") {
                continue;
            }

            let span = state.syntax.span(variable.node);
            if !variable.has_tag(Tag::HttpCookieSecure) {
                missing.push((RULE_SECURE, span));
            }
            if !variable.has_tag(Tag::HttpCookieHttpOnly) {
                missing.push((RULE_HTTP_ONLY, span));
            }
        }

        for (rule, span) in missing {
            state.report(rule, span);
        }
    }
}
