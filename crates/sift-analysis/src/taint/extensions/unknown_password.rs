//! Heuristic for hardcoded passwords flowing into unconfigured APIs.
//!
//! When a constant is assigned to a member whose name looks like a
//! password in one of several languages, and no behavior is configured
//! for that member, report a hardcoded-password finding.

use crate::syntax::{Symbol, SyntaxApi};
use crate::taint::behavior::MethodBehavior;
use crate::taint::state::ExecutionState;
use crate::taint::variable_state::VariableState;

use super::TaintExtension;

pub const RULE_HARDCODED_PASSWORD: &str = "SCS0015";

const PASSWORD_KEYWORDS: &[&str] = &[
    "password",
    "motdepasse",
    "heslo",
    "adgangskode",
    "wachtwoord",
    "salasana",
    "passwort",
    "passord",
    "senha",
    "geslo",
    "clave",
    "losenord",
    "parola",
    "secretkey",
    "pwd",
];

pub struct UnknownPasswordApi;

impl<S: SyntaxApi> TaintExtension<S> for UnknownPasswordApi {
    fn assignment_visited(
        &self,
        node: S::Node,
        state: &mut ExecutionState<'_, S>,
        behavior: Option<&MethodBehavior>,
        symbol: Option<&Symbol>,
        rhs: &mut VariableState<S::Node>,
    ) {
        // configured password APIs are handled by the core engine
        if behavior.is_some() {
            return;
        }
        let Some(symbol) = symbol else { return };
        if !rhs.taint.is_constant() {
            return;
        }

        let member = symbol.member.to_lowercase();
        if PASSWORD_KEYWORDS.iter().any(|keyword| member == *keyword) {
            let span = state.syntax.span(node);
            state.report(RULE_HARDCODED_PASSWORD, span);
        }
    }
}
