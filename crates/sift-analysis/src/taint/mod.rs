//! The taint analysis engine.

pub mod behavior;
pub mod extensions;
pub mod lattice;
pub mod state;
pub mod variable_state;
pub mod visitor;

pub use behavior::{BehaviorTable, InjectableArgument, MethodBehavior};
pub use extensions::{default_extensions, TaintExtension};
pub use lattice::Taint;
pub use state::ExecutionState;
pub use variable_state::{Tag, VariableState, VariableTag};
pub use visitor::TaintVisitor;
