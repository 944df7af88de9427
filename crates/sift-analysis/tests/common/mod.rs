//! Hand-built syntax trees implementing `SyntaxApi`, plus a small harness
//! for driving the taint visitor in tests.

#![allow(dead_code)]

use sift_analysis::rules::RuleCatalog;
use sift_analysis::syntax::{ConstantValue, NodeShape, Symbol, SymbolKind, SyntaxApi};
use sift_analysis::taint::extensions::TaintExtension;
use sift_analysis::taint::{BehaviorTable, ExecutionState, TaintVisitor};
use sift_core::config::AnalyzerConfig;
use sift_core::types::findings::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
enum Kind {
    Method { params: Vec<(String, NodeId)>, body: Vec<NodeId> },
    Param,
    Literal(ConstantValue),
    Ident(String),
    Member { base: NodeId, name: String },
    Binary { left: NodeId, right: NodeId },
    Conditional { condition: NodeId, when_true: NodeId, when_false: NodeId },
    Array { elements: Vec<NodeId> },
    Invoke { args: Vec<NodeId> },
    New { args: Vec<NodeId>, initializers: Vec<NodeId> },
    Assign { target: NodeId, value: NodeId, compound: bool },
    Decl { declarators: Vec<(String, Option<NodeId>)> },
    ExprStmt(NodeId),
    Block(Vec<NodeId>),
    Raw(Vec<NodeId>),
}

#[derive(Debug, Clone)]
struct MockNode {
    kind: Kind,
    symbol: Option<Symbol>,
}

/// A synthetic compilation unit built by tests.
#[derive(Debug, Default)]
pub struct MockUnit {
    nodes: Vec<MockNode>,
}

impl MockUnit {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: Kind) -> NodeId {
        self.nodes.push(MockNode { kind, symbol: None });
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> &MockNode {
        &self.nodes[id.0]
    }

    /// Attach a resolution result to a node.
    pub fn with_symbol(&mut self, id: NodeId, symbol: Symbol) -> NodeId {
        self.nodes[id.0].symbol = Some(symbol);
        id
    }

    pub fn literal_str(&mut self, value: &str) -> NodeId {
        self.push(Kind::Literal(ConstantValue::Str(value.to_string())))
    }

    pub fn literal_int(&mut self, value: i64) -> NodeId {
        self.push(Kind::Literal(ConstantValue::Int(value)))
    }

    pub fn literal_bool(&mut self, value: bool) -> NodeId {
        self.push(Kind::Literal(ConstantValue::Bool(value)))
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.push(Kind::Ident(name.to_string()))
    }

    /// Member access `base.name`, resolving to a property symbol on
    /// `containing_type`.
    pub fn member(&mut self, base: NodeId, name: &str, containing_type: &str) -> NodeId {
        let id = self.push(Kind::Member { base, name: name.to_string() });
        self.with_symbol(id, Symbol::new(containing_type, name, SymbolKind::Property))
    }

    /// Member access with no symbol resolution.
    pub fn member_unresolved(&mut self, base: NodeId, name: &str) -> NodeId {
        self.push(Kind::Member { base, name: name.to_string() })
    }

    pub fn binary(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Kind::Binary { left, right })
    }

    pub fn conditional(&mut self, condition: NodeId, when_true: NodeId, when_false: NodeId) -> NodeId {
        self.push(Kind::Conditional { condition, when_true, when_false })
    }

    pub fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.push(Kind::Array { elements })
    }

    /// Invocation resolving to `containing_type.member`.
    pub fn invoke(&mut self, containing_type: &str, member: &str, args: Vec<NodeId>) -> NodeId {
        let id = self.push(Kind::Invoke { args });
        self.with_symbol(id, Symbol::new(containing_type, member, SymbolKind::Method))
    }

    /// Invocation with no symbol resolution.
    pub fn invoke_unresolved(&mut self, args: Vec<NodeId>) -> NodeId {
        self.push(Kind::Invoke { args })
    }

    /// Object creation resolving to a constructor of `type_name`.
    pub fn new_object(&mut self, type_name: &str, args: Vec<NodeId>, initializers: Vec<NodeId>) -> NodeId {
        let id = self.push(Kind::New { args, initializers });
        self.with_symbol(id, Symbol::new(type_name, ".ctor", SymbolKind::Constructor))
    }

    pub fn assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.push(Kind::Assign { target, value, compound: false })
    }

    pub fn compound_assign(&mut self, target: NodeId, value: NodeId) -> NodeId {
        self.push(Kind::Assign { target, value, compound: true })
    }

    pub fn decl(&mut self, name: &str, initializer: NodeId) -> NodeId {
        self.push(Kind::Decl { declarators: vec![(name.to_string(), Some(initializer))] })
    }

    pub fn decl_many(&mut self, declarators: Vec<(&str, Option<NodeId>)>) -> NodeId {
        self.push(Kind::Decl {
            declarators: declarators
                .into_iter()
                .map(|(name, init)| (name.to_string(), init))
                .collect(),
        })
    }

    pub fn expr_stmt(&mut self, expression: NodeId) -> NodeId {
        self.push(Kind::ExprStmt(expression))
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.push(Kind::Block(statements))
    }

    /// A node of no recognized shape, with the given children.
    pub fn raw(&mut self, children: Vec<NodeId>) -> NodeId {
        self.push(Kind::Raw(children))
    }

    pub fn method(&mut self, params: &[&str], body: Vec<NodeId>) -> NodeId {
        let params = params
            .iter()
            .map(|name| {
                let node = self.push(Kind::Param);
                (name.to_string(), node)
            })
            .collect();
        self.push(Kind::Method { params, body })
    }
}

impl SyntaxApi for MockUnit {
    type Node = NodeId;

    fn file(&self) -> &str {
        "test.cs"
    }

    fn shape(&self, node: NodeId) -> NodeShape {
        match &self.node(node).kind {
            Kind::Method { .. } => NodeShape::MethodDeclaration,
            Kind::Literal(_) => NodeShape::Literal,
            Kind::Ident(_) => NodeShape::Identifier,
            Kind::Member { .. } => NodeShape::MemberAccess,
            Kind::Binary { .. } => NodeShape::Binary,
            Kind::Conditional { .. } => NodeShape::Conditional,
            Kind::Array { .. } => NodeShape::ArrayCreation,
            Kind::Invoke { .. } => NodeShape::Invocation,
            Kind::New { .. } => NodeShape::ObjectCreation,
            Kind::Assign { .. } => NodeShape::Assignment,
            Kind::Decl { .. } => NodeShape::LocalDeclaration,
            Kind::ExprStmt(_) => NodeShape::ExpressionStatement,
            Kind::Block(_) => NodeShape::Block,
            Kind::Param | Kind::Raw(_) => NodeShape::Unsupported,
        }
    }

    fn span(&self, node: NodeId) -> Span {
        Span::point(node.0 as u32, 0)
    }

    fn text(&self, node: NodeId) -> String {
        format!("{:?}", self.node(node).kind)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        match &self.node(node).kind {
            Kind::Method { body, .. } => body.clone(),
            Kind::Member { base, .. } => vec![*base],
            Kind::Binary { left, right } => vec![*left, *right],
            Kind::Conditional { condition, when_true, when_false } => {
                vec![*condition, *when_true, *when_false]
            }
            Kind::Array { elements } => elements.clone(),
            Kind::Invoke { args } => args.clone(),
            Kind::New { args, initializers } => {
                let mut children = args.clone();
                children.extend(initializers.iter().copied());
                children
            }
            Kind::Assign { target, value, .. } => vec![*target, *value],
            Kind::Decl { declarators } => declarators.iter().filter_map(|(_, init)| *init).collect(),
            Kind::ExprStmt(inner) => vec![*inner],
            Kind::Block(statements) => statements.clone(),
            Kind::Raw(children) => children.clone(),
            Kind::Literal(_) | Kind::Ident(_) | Kind::Param => Vec::new(),
        }
    }

    fn methods(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| matches!(self.node(*id).kind, Kind::Method { .. }))
            .collect()
    }

    fn method_signature(&self, method: NodeId) -> String {
        format!("method@{}", method.0)
    }

    fn parameters(&self, method: NodeId) -> Vec<(String, NodeId)> {
        match &self.node(method).kind {
            Kind::Method { params, .. } => params.clone(),
            _ => Vec::new(),
        }
    }

    fn body_statements(&self, method: NodeId) -> Vec<NodeId> {
        match &self.node(method).kind {
            Kind::Method { body, .. } => body.clone(),
            _ => Vec::new(),
        }
    }

    fn identifier_text(&self, node: NodeId) -> Option<String> {
        match &self.node(node).kind {
            Kind::Ident(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn literal_value(&self, node: NodeId) -> Option<ConstantValue> {
        match &self.node(node).kind {
            Kind::Literal(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn assignment_parts(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        match &self.node(node).kind {
            Kind::Assign { target, value, .. } => Some((*target, *value)),
            _ => None,
        }
    }

    fn is_compound_assignment(&self, node: NodeId) -> bool {
        matches!(self.node(node).kind, Kind::Assign { compound: true, .. })
    }

    fn member_access_base(&self, node: NodeId) -> Option<NodeId> {
        match &self.node(node).kind {
            Kind::Member { base, .. } => Some(*base),
            _ => None,
        }
    }

    fn member_access_name(&self, node: NodeId) -> Option<String> {
        match &self.node(node).kind {
            Kind::Member { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    fn binary_operands(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        match &self.node(node).kind {
            Kind::Binary { left, right } => Some((*left, *right)),
            _ => None,
        }
    }

    fn conditional_parts(&self, node: NodeId) -> Option<(NodeId, NodeId, NodeId)> {
        match &self.node(node).kind {
            Kind::Conditional { condition, when_true, when_false } => {
                Some((*condition, *when_true, *when_false))
            }
            _ => None,
        }
    }

    fn array_elements(&self, node: NodeId) -> Vec<NodeId> {
        match &self.node(node).kind {
            Kind::Array { elements } => elements.clone(),
            _ => Vec::new(),
        }
    }

    fn arguments(&self, node: NodeId) -> Vec<NodeId> {
        match &self.node(node).kind {
            Kind::Invoke { args } => args.clone(),
            Kind::New { args, .. } => args.clone(),
            _ => Vec::new(),
        }
    }

    fn declarators(&self, node: NodeId) -> Vec<(String, Option<NodeId>)> {
        match &self.node(node).kind {
            Kind::Decl { declarators } => declarators.clone(),
            _ => Vec::new(),
        }
    }

    fn initializer_assignments(&self, node: NodeId) -> Vec<NodeId> {
        match &self.node(node).kind {
            Kind::New { initializers, .. } => initializers.clone(),
            _ => Vec::new(),
        }
    }

    fn resolve(&self, node: NodeId) -> Option<Symbol> {
        self.node(node).symbol.clone()
    }
}

/// Behavior table, rule catalog, and config bundled for engine tests.
pub struct Harness {
    pub behaviors: BehaviorTable,
    pub rules: RuleCatalog,
    pub config: AnalyzerConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            behaviors: BehaviorTable::new(),
            rules: RuleCatalog::with_defaults(),
            config: AnalyzerConfig::default(),
        }
    }

    /// Run the visitor over `method` and return the final execution state.
    pub fn run<'a>(
        &'a self,
        unit: &'a MockUnit,
        method: NodeId,
        extensions: &'a [Box<dyn TaintExtension<MockUnit>>],
    ) -> ExecutionState<'a, MockUnit> {
        let visitor = TaintVisitor::new(unit, extensions);
        let mut state = ExecutionState::new(unit, &self.behaviors, &self.rules, &self.config);
        visitor.analyze_method(method, &mut state);
        state
    }
}

/// Rule ids of all reported findings, in report order.
pub fn rule_ids<'a>(state: &'a ExecutionState<'_, MockUnit>) -> Vec<&'a str> {
    state.findings().iter().map(|f| f.rule_id.as_str()).collect()
}
