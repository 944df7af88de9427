//! The taint visitor: a tree-walking abstract interpreter over one method
//! body.
//!
//! Dispatches on node shape, propagates taint through expressions, consults
//! the behavior table at invocations and assignments to report findings,
//! and notifies extensions at statement/assignment/invocation/method
//! boundaries. The walk is flow-insensitive: control-flow statements are
//! visited by recursing into children in source order, with no forking or
//! joining of execution-state copies. The last textual assignment wins.

use sift_core::types::findings::Span;
use tracing::debug;

use crate::syntax::{NodeShape, Symbol, SymbolKind, SyntaxApi};

use super::behavior::MethodBehavior;
use super::extensions::TaintExtension;
use super::lattice::Taint;
use super::state::ExecutionState;
use super::variable_state::VariableState;

/// Walks one method body, reporting findings into the execution state.
pub struct TaintVisitor<'a, S: SyntaxApi> {
    syntax: &'a S,
    extensions: &'a [Box<dyn TaintExtension<S>>],
}

impl<'a, S: SyntaxApi> TaintVisitor<'a, S> {
    pub fn new(syntax: &'a S, extensions: &'a [Box<dyn TaintExtension<S>>]) -> Self {
        Self { syntax, extensions }
    }

    /// Analyze one method declaration.
    ///
    /// Every formal parameter is seeded `Tainted`: inputs are untrusted
    /// until proven otherwise.
    pub fn analyze_method(&self, method: S::Node, state: &mut ExecutionState<'_, S>) {
        for ext in self.extensions {
            ext.method_begin(method, state);
        }

        for (name, node) in self.syntax.parameters(method) {
            state.add_new_value(&name, VariableState::new(node, Taint::TAINTED));
        }

        for statement in self.syntax.body_statements(method) {
            self.visit_node(statement, state);
            for ext in self.extensions {
                ext.statement_visited(statement, state);
            }
        }

        for ext in self.extensions {
            ext.method_end(method, state);
        }
    }

    /// Visit a statement-position node. The returned state is a
    /// best-effort placeholder for statements.
    fn visit_node(&self, node: S::Node, state: &mut ExecutionState<'_, S>) -> VariableState<S::Node> {
        match self.syntax.shape(node) {
            NodeShape::LocalDeclaration => self.visit_declaration(node, state),
            NodeShape::ExpressionStatement => {
                let mut last = VariableState::new(node, Taint::UNKNOWN);
                for child in self.syntax.children(node) {
                    last = self.visit_node(child, state);
                }
                last
            }
            NodeShape::Block => {
                for child in self.syntax.children(node) {
                    self.visit_node(child, state);
                }
                VariableState::new(node, Taint::UNKNOWN)
            }
            // nested method-like declarations are analyzed separately
            NodeShape::MethodDeclaration => VariableState::new(node, Taint::UNKNOWN),
            _ => self.visit_expression(node, state),
        }
    }

    fn visit_expression(&self, node: S::Node, state: &mut ExecutionState<'_, S>) -> VariableState<S::Node> {
        match self.syntax.shape(node) {
            NodeShape::Literal => match self.syntax.literal_value(node) {
                Some(value) => VariableState::constant(node, value),
                None => VariableState::new(node, Taint::CONSTANT),
            },

            NodeShape::Identifier => match self.syntax.identifier_text(node) {
                Some(name) => state.value_by_identifier(&name, node),
                None => VariableState::new(node, Taint::UNKNOWN),
            },

            // the base object's taint is inherited; member-level
            // granularity on reads is out of scope
            NodeShape::MemberAccess => match self.syntax.member_access_base(node) {
                Some(base) => self.visit_expression(base, state),
                None => VariableState::new(node, Taint::UNKNOWN),
            },

            NodeShape::ElementAccess => {
                for argument in self.syntax.arguments(node) {
                    self.visit_expression(argument, state);
                }
                VariableState::new(node, Taint::UNKNOWN)
            }

            NodeShape::Binary => match self.syntax.binary_operands(node) {
                Some((left, right)) => {
                    let mut result = self.visit_expression(left, state);
                    let right_state = self.visit_expression(right, state);
                    result.merge(&right_state);
                    result.node = node;
                    result
                }
                None => VariableState::new(node, Taint::UNKNOWN),
            },

            NodeShape::Conditional => match self.syntax.conditional_parts(node) {
                Some((condition, when_true, when_false)) => {
                    // condition is evaluated for side effects only
                    self.visit_expression(condition, state);
                    let mut result = VariableState::new(node, Taint::SAFE);
                    let true_state = self.visit_expression(when_true, state);
                    result.merge(&true_state);
                    let false_state = self.visit_expression(when_false, state);
                    result.merge(&false_state);
                    result.node = node;
                    result
                }
                None => VariableState::new(node, Taint::UNKNOWN),
            },

            NodeShape::ArrayCreation => {
                let mut result = VariableState::new(node, Taint::SAFE);
                for element in self.syntax.array_elements(node) {
                    let element_state = self.visit_expression(element, state);
                    result.merge(&element_state);
                }
                result.node = node;
                result
            }

            NodeShape::Invocation | NodeShape::ObjectCreation => {
                self.visit_invocation_or_creation(node, state)
            }

            NodeShape::Assignment => self.visit_assignment(node, state),

            shape => {
                // recurse for side effects so nested sinks are not missed
                for child in self.syntax.children(node) {
                    self.visit_node(child, state);
                }
                if shape == NodeShape::Unsupported {
                    debug!(text = %self.syntax.text(node), "unsupported syntax shape");
                }
                VariableState::new(node, Taint::UNKNOWN)
            }
        }
    }

    /// Shared logic for invocations and object creations.
    fn visit_invocation_or_creation(
        &self,
        node: S::Node,
        state: &mut ExecutionState<'_, S>,
    ) -> VariableState<S::Node> {
        let behaviors = state.behaviors;
        let symbol = state.resolve(node);
        let base_behavior = symbol.as_ref().and_then(|s| behaviors.lookup(s));

        let arguments = self.syntax.arguments(node);
        let mut argument_states = Vec::with_capacity(arguments.len());
        for argument in &arguments {
            argument_states.push(self.visit_expression(*argument, state));
        }

        let call_span = self.syntax.span(node);
        let mut propagated = VariableState::new(node, Taint::SAFE);

        let behavior = base_behavior.map(|base| {
            base.select(|index| {
                argument_states
                    .get(index)
                    .filter(|s| s.taint.is_constant())
                    .and_then(|s| s.value.clone())
            })
        });

        if let Some(behavior) = behavior {
            for (index, argument_state) in argument_states.iter().enumerate() {
                if let Some(injectable) = behavior.injectable_arguments.get(&index) {
                    if !argument_state.taint.satisfies(injectable.required_bits, injectable.negated) {
                        state.report(&injectable.rule_id, call_span);
                    }
                }

                if behavior.password_arguments.contains(&index) && argument_state.taint.is_constant() {
                    if let Some(rule) = &behavior.password_rule {
                        state.report(rule, call_span);
                    }
                }

                if behavior.taint_from_arguments.contains(&index) {
                    propagated.merge(argument_state);
                }
            }
        }

        let mut result = match behavior {
            Some(behavior) => {
                if let Some(return_taint) = behavior.return_taint {
                    VariableState::new(node, return_taint)
                } else if !behavior.taint_from_arguments.is_empty() {
                    propagated.node = node;
                    propagated
                } else {
                    // a known API without propagation info is not trusted
                    VariableState::new(node, Taint::UNKNOWN)
                }
            }
            None => VariableState::new(node, Taint::UNKNOWN),
        };

        if self.syntax.shape(node) == NodeShape::ObjectCreation {
            self.visit_object_initializers(node, symbol.as_ref(), &mut result, state);
        }

        for ext in self.extensions {
            ext.invocation_visited(node, &arguments, state);
        }

        result
    }

    /// Fold member-initializer assignments of an object creation into the
    /// creation's property states, running field-sink checks against a
    /// synthesized property symbol on the created type.
    fn visit_object_initializers(
        &self,
        node: S::Node,
        created: Option<&Symbol>,
        result: &mut VariableState<S::Node>,
        state: &mut ExecutionState<'_, S>,
    ) {
        let behaviors = state.behaviors;
        for assignment in self.syntax.initializer_assignments(node) {
            let Some((target, value)) = self.syntax.assignment_parts(assignment) else {
                continue;
            };
            let property = self
                .syntax
                .identifier_text(target)
                .or_else(|| self.syntax.member_access_name(target));
            let Some(property) = property else {
                self.visit_assignment(assignment, state);
                continue;
            };

            let mut rhs = self.visit_expression(value, state);
            let property_symbol = created.map(|c| {
                Symbol::new(c.containing_type.clone(), property.clone(), SymbolKind::Property)
            });
            let behavior = property_symbol.as_ref().and_then(|s| behaviors.lookup(s));

            for ext in self.extensions {
                ext.assignment_visited(assignment, state, behavior, property_symbol.as_ref(), &mut rhs);
            }

            self.check_field_markers(behavior, &rhs, self.syntax.span(assignment), state);
            result.merge_property(&property, rhs);
        }
    }

    fn visit_assignment(&self, node: S::Node, state: &mut ExecutionState<'_, S>) -> VariableState<S::Node> {
        let Some((target, value)) = self.syntax.assignment_parts(node) else {
            return VariableState::new(node, Taint::UNKNOWN);
        };

        let behaviors = state.behaviors;
        let symbol = state.resolve(target);
        let behavior = symbol.as_ref().and_then(|s| behaviors.lookup(s));

        let mut rhs = self.visit_expression(value, state);

        for ext in self.extensions {
            ext.assignment_visited(node, state, behavior, symbol.as_ref(), &mut rhs);
        }

        if let Some(root) = self.root_identifier(target) {
            if let Some(name) = self.syntax.identifier_text(root) {
                if root == target {
                    if self.syntax.is_compound_assignment(node) {
                        // x += y keeps what x already carried
                        state.merge_value(&name, rhs.clone());
                    } else {
                        // direct assignment: last write wins
                        state.add_or_update_value(&name, rhs.clone());
                    }
                } else {
                    // member write: record the property on the root and
                    // reflect the taint back on it
                    if let Some(property) = self.syntax.member_access_name(target) {
                        if let Some(root_state) = state.value_of_mut(&name) {
                            root_state.merge_property(&property, rhs.clone());
                        }
                    }
                    state.merge_value(&name, rhs.clone());
                }
            }
        }

        self.check_field_markers(behavior, &rhs, self.syntax.span(node), state);

        rhs
    }

    fn check_field_markers(
        &self,
        behavior: Option<&MethodBehavior>,
        rhs: &VariableState<S::Node>,
        span: Span,
        state: &mut ExecutionState<'_, S>,
    ) {
        let Some(behavior) = behavior else { return };

        if let Some(field) = &behavior.injectable_field {
            if !rhs.taint.satisfies(field.required_bits, field.negated) {
                state.report(&field.rule_id, span);
            }
        }

        if let Some(rule) = &behavior.password_field {
            if rhs.taint.is_constant() {
                state.report(rule, span);
            }
        }
    }

    fn visit_declaration(&self, node: S::Node, state: &mut ExecutionState<'_, S>) -> VariableState<S::Node> {
        let mut last = VariableState::new(node, Taint::UNKNOWN);
        for (name, initializer) in self.syntax.declarators(node) {
            if let Some(initializer) = initializer {
                let value = self.visit_expression(initializer, state);
                state.add_new_value(&name, value.clone());
                last = value;
            }
        }
        last
    }

    /// The outermost identifier of an assignment target:
    /// `a.b.c = x` resolves to `a`.
    fn root_identifier(&self, expression: S::Node) -> Option<S::Node> {
        match self.syntax.shape(expression) {
            NodeShape::Identifier => Some(expression),
            NodeShape::MemberAccess | NodeShape::ElementAccess => self
                .syntax
                .member_access_base(expression)
                .and_then(|base| self.root_identifier(base)),
            _ => None,
        }
    }
}
