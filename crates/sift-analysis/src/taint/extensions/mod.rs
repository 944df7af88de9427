//! Extension protocol for satellite checks.
//!
//! Extensions observe visitor events without modifying the core engine:
//! they may tag the variable states they are handed and report their own
//! findings, but must not rewrite the execution state's bindings. The
//! extension list is owned by the caller and passed into each analysis;
//! hooks run in list order.

mod cookie;
mod password_validator;
mod unknown_password;

pub use cookie::InsecureCookie;
pub use password_validator::WeakPasswordValidator;
pub use unknown_password::UnknownPasswordApi;

use crate::syntax::{Symbol, SyntaxApi};

use super::behavior::MethodBehavior;
use super::state::ExecutionState;
use super::variable_state::VariableState;

/// Observer over taint-visitor events. Every hook defaults to a no-op;
/// an extension overrides only what it needs.
pub trait TaintExtension<S: SyntaxApi>: Send + Sync {
    /// Fired once per method, before the first statement is visited.
    fn method_begin(&self, _method: S::Node, _state: &mut ExecutionState<'_, S>) {}

    /// Fired after each top-level statement of the method body.
    fn statement_visited(&self, _statement: S::Node, _state: &mut ExecutionState<'_, S>) {}

    /// Fired for every invocation and object creation, after its arguments
    /// were evaluated.
    fn invocation_visited(
        &self,
        _node: S::Node,
        _arguments: &[S::Node],
        _state: &mut ExecutionState<'_, S>,
    ) {
    }

    /// Fired for every assignment (including object-initializer members),
    /// before the execution state is updated. `rhs` is the evaluated
    /// right-hand state; tags added here flow into the assigned variable.
    fn assignment_visited(
        &self,
        _node: S::Node,
        _state: &mut ExecutionState<'_, S>,
        _behavior: Option<&MethodBehavior>,
        _symbol: Option<&Symbol>,
        _rhs: &mut VariableState<S::Node>,
    ) {
    }

    /// Fired once per method, after the last statement. Extensions scan
    /// the final state for incomplete invariants here.
    fn method_end(&self, _method: S::Node, _state: &mut ExecutionState<'_, S>) {}
}

/// The extensions shipped with the analyzer, in dispatch order.
pub fn default_extensions<S: SyntaxApi>() -> Vec<Box<dyn TaintExtension<S>>> {
    vec![
        Box::new(InsecureCookie),
        Box::new(WeakPasswordValidator),
        Box::new(UnknownPasswordApi),
    ]
}
