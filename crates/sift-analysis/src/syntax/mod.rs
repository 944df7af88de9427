//! Abstract syntax capability interface.
//!
//! The taint engine is written against [`SyntaxApi`] rather than any single
//! grammar; one adapter exists per supported dialect. Adapters answer
//! structural questions ("is this an assignment, and what are its parts")
//! plus best-effort symbol resolution.

pub mod csharp;
pub mod java;

use serde::{Deserialize, Serialize};
use sift_core::types::findings::Span;

/// Shape classification for the node kinds the engine understands.
///
/// Control-flow statements (if/for/foreach/while) classify as [`NodeShape::Block`]:
/// the engine recurses into their children in source order without forking
/// the execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    MethodDeclaration,
    /// Any statement container visited by plain recursion.
    Block,
    LocalDeclaration,
    ExpressionStatement,
    Literal,
    Identifier,
    MemberAccess,
    ElementAccess,
    Binary,
    Conditional,
    ArrayCreation,
    Invocation,
    ObjectCreation,
    Assignment,
    /// Anything else; the engine recurses for side effects and logs it.
    Unsupported,
}

/// What kind of declaration a resolved symbol refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Method,
    Constructor,
    Property,
    Field,
    Local,
    Parameter,
}

/// A resolved symbol: the containing type plus the member name.
///
/// Constructors use the member name `.ctor`. `signature` carries an
/// argument-type discriminator (e.g. `(System.String)`) when the resolver
/// can produce one; it selects overload-specific behavior entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub containing_type: String,
    pub member: String,
    pub kind: SymbolKind,
    pub signature: Option<String>,
}

impl Symbol {
    pub fn new(containing_type: impl Into<String>, member: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            containing_type: containing_type.into(),
            member: member.into(),
            kind,
            signature: None,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Name-only behavior-table key: `Type|member`.
    pub fn key(&self) -> String {
        format!("{}|{}", self.containing_type, self.member)
    }

    /// Overload-discriminated key, when a signature is known.
    pub fn signature_key(&self) -> Option<String> {
        self.signature
            .as_ref()
            .map(|sig| format!("{}|{}|{}", self.containing_type, self.member, sig))
    }

    /// True when the symbol is `member` on `containing_type`, ignoring any
    /// namespace qualification on the containing type.
    pub fn matches(&self, type_name: &str, member: &str) -> bool {
        if self.member != member {
            return false;
        }
        self.containing_type == type_name
            || self
                .containing_type
                .rsplit('.')
                .next()
                .is_some_and(|short| short == type_name)
    }
}

/// Literal payloads the engine can reason about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConstantValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Capability interface over one parsed compilation unit.
///
/// All accessors are total: a query that does not apply to the given node
/// returns `None`/empty rather than panicking, so the engine can walk
/// foreign or partially-broken trees.
pub trait SyntaxApi {
    /// Handle to a node in the underlying tree. Cheap to copy.
    type Node: Copy + PartialEq + std::fmt::Debug;

    /// Path of the analyzed file, used in findings.
    fn file(&self) -> &str;

    fn shape(&self, node: Self::Node) -> NodeShape;

    fn span(&self, node: Self::Node) -> Span;

    /// Raw source text of the node, for logging.
    fn text(&self, node: Self::Node) -> String;

    /// Child nodes in source order.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// All method-like declarations (methods and constructors) in the unit.
    fn methods(&self) -> Vec<Self::Node>;

    /// Display signature of a method declaration, used when logging
    /// per-method analysis failures.
    fn method_signature(&self, method: Self::Node) -> String;

    /// Formal parameters of a method declaration.
    fn parameters(&self, method: Self::Node) -> Vec<(String, Self::Node)>;

    /// Top-level statements of the method body, in source order.
    fn body_statements(&self, method: Self::Node) -> Vec<Self::Node>;

    fn identifier_text(&self, node: Self::Node) -> Option<String>;

    fn literal_value(&self, node: Self::Node) -> Option<ConstantValue>;

    /// `(target, value)` of an assignment expression.
    fn assignment_parts(&self, node: Self::Node) -> Option<(Self::Node, Self::Node)>;

    /// True for compound assignments (`+=` and friends), which merge into
    /// the target instead of replacing it.
    fn is_compound_assignment(&self, _node: Self::Node) -> bool {
        false
    }

    /// Base expression of a member access (`a` in `a.b`).
    fn member_access_base(&self, node: Self::Node) -> Option<Self::Node>;

    /// Accessed member name (`b` in `a.b`).
    fn member_access_name(&self, node: Self::Node) -> Option<String>;

    /// `(left, right)` operands of a binary expression.
    fn binary_operands(&self, node: Self::Node) -> Option<(Self::Node, Self::Node)>;

    /// `(condition, when_true, when_false)` of a conditional expression.
    fn conditional_parts(&self, node: Self::Node) -> Option<(Self::Node, Self::Node, Self::Node)>;

    /// Element expressions of an array or collection initializer.
    fn array_elements(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Argument expressions of an invocation or object creation.
    fn arguments(&self, node: Self::Node) -> Vec<Self::Node>;

    /// `(name, initializer)` pairs of a local declaration statement.
    fn declarators(&self, node: Self::Node) -> Vec<(String, Option<Self::Node>)>;

    /// Member-initializer assignments nested under an object creation
    /// (`new T { A = x, B = y }`).
    fn initializer_assignments(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Resolve the declared symbol an expression refers to. `None` means
    /// "unresolved"; callers treat that as "no special behavior".
    fn resolve(&self, node: Self::Node) -> Option<Symbol>;
}
