//! C# dialect adapter over tree-sitter.
//!
//! Symbol resolution here is syntactic: receiver types come from declared
//! locals, fields, and parameters collected in a pre-pass, falling back to
//! the receiver's source text (which covers static receivers like
//! `System.IO.File`). The behavior table's short alias keys make these
//! resolutions line up with namespace-qualified entries.

use std::path::Path;

use sift_core::errors::ParseError;
use sift_core::types::collections::FxHashMap;
use sift_core::types::findings::Span;
use tree_sitter::{Node, Parser, Tree};

use super::{ConstantValue, NodeShape, Symbol, SymbolKind, SyntaxApi};

/// Parse C# source text into a tree.
pub fn parse(source: &str, path: &Path) -> Result<Tree, ParseError> {
    let language: tree_sitter::Language = tree_sitter_c_sharp::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|_| ParseError::GrammarNotFound { language: "C#".to_string() })?;
    parser.parse(source, None).ok_or_else(|| ParseError::TreeSitter {
        path: path.to_path_buf(),
        message: "tree-sitter returned no tree".to_string(),
    })
}

/// One parsed C# compilation unit.
pub struct CSharpUnit<'t> {
    file: String,
    source: &'t str,
    tree: &'t Tree,
    /// Declared identifier -> type text, from locals, fields, and
    /// parameters.
    declared_types: FxHashMap<String, String>,
}

impl<'t> CSharpUnit<'t> {
    pub fn new(file: impl Into<String>, source: &'t str, tree: &'t Tree) -> Self {
        let mut unit = Self {
            file: file.into(),
            source,
            tree,
            declared_types: FxHashMap::default(),
        };
        let root = tree.root_node();
        walk(root, &mut |node| unit.collect_declared_types(node));
        unit
    }

    fn node_text(&self, node: Node<'t>) -> &'t str {
        &self.source[node.byte_range()]
    }

    fn collect_declared_types(&mut self, node: Node<'t>) {
        match node.kind() {
            "variable_declaration" => {
                let declared = node
                    .child_by_field_name("type")
                    .map(|ty| self.node_text(ty).to_string())
                    .filter(|ty| ty != "var");
                for declarator in named_children_of_kind(node, "variable_declarator") {
                    let Some(name) = declarator
                        .child_by_field_name("name")
                        .or_else(|| first_child_of_kind(declarator, "identifier"))
                    else {
                        continue;
                    };
                    let inferred = declared.clone().or_else(|| {
                        initializer_value(declarator)
                            .filter(|value| value.kind() == "object_creation_expression")
                            .and_then(|value| value.child_by_field_name("type"))
                            .map(|ty| self.node_text(ty).to_string())
                    });
                    if let Some(ty) = inferred {
                        self.declared_types.insert(self.node_text(name).to_string(), ty);
                    }
                }
            }
            "parameter" => {
                if let (Some(name), Some(ty)) =
                    (node.child_by_field_name("name"), node.child_by_field_name("type"))
                {
                    self.declared_types
                        .insert(self.node_text(name).to_string(), self.node_text(ty).to_string());
                }
            }
            _ => {}
        }
    }

    /// Best-effort type of a receiver expression.
    fn receiver_type(&self, node: Node<'t>) -> String {
        if node.kind() == "identifier" {
            let name = self.node_text(node);
            if let Some(ty) = self.declared_types.get(name) {
                return ty.clone();
            }
            return name.to_string();
        }
        self.node_text(node).to_string()
    }
}

impl<'t> SyntaxApi for CSharpUnit<'t> {
    type Node = Node<'t>;

    fn file(&self) -> &str {
        &self.file
    }

    fn shape(&self, node: Node<'t>) -> NodeShape {
        match node.kind() {
            "method_declaration" | "constructor_declaration" | "local_function_statement" => {
                NodeShape::MethodDeclaration
            }
            "block" | "if_statement" | "for_statement" | "foreach_statement" | "while_statement"
            | "do_statement" | "switch_statement" | "switch_section" | "try_statement"
            | "catch_clause" | "finally_clause" | "using_statement" | "lock_statement"
            | "return_statement" | "throw_statement" | "yield_statement"
            | "arrow_expression_clause" => NodeShape::Block,
            "local_declaration_statement" => NodeShape::LocalDeclaration,
            "expression_statement" => NodeShape::ExpressionStatement,
            "string_literal" | "verbatim_string_literal" | "raw_string_literal"
            | "integer_literal" | "real_literal" | "character_literal" | "boolean_literal"
            | "null_literal" => NodeShape::Literal,
            "identifier" => NodeShape::Identifier,
            "member_access_expression" => NodeShape::MemberAccess,
            "element_access_expression" => NodeShape::ElementAccess,
            "binary_expression" => NodeShape::Binary,
            "conditional_expression" => NodeShape::Conditional,
            "array_creation_expression" | "implicit_array_creation_expression"
            | "initializer_expression" => NodeShape::ArrayCreation,
            "invocation_expression" => NodeShape::Invocation,
            "object_creation_expression" | "implicit_object_creation_expression" => {
                NodeShape::ObjectCreation
            }
            "assignment_expression" => NodeShape::Assignment,
            // pass-through wrappers: the base expression carries the taint
            "parenthesized_expression" | "cast_expression" | "checked_expression"
            | "await_expression" | "prefix_unary_expression" | "postfix_unary_expression" => {
                NodeShape::MemberAccess
            }
            _ => NodeShape::Unsupported,
        }
    }

    fn span(&self, node: Node<'t>) -> Span {
        let start = node.start_position();
        let end = node.end_position();
        Span::new(start.row as u32, start.column as u32, end.row as u32, end.column as u32)
    }

    fn text(&self, node: Node<'t>) -> String {
        self.node_text(node).to_string()
    }

    fn children(&self, node: Node<'t>) -> Vec<Node<'t>> {
        named_children(node)
    }

    fn methods(&self) -> Vec<Node<'t>> {
        let mut methods = Vec::new();
        walk(self.tree.root_node(), &mut |node| {
            if matches!(
                node.kind(),
                "method_declaration" | "constructor_declaration" | "local_function_statement"
            ) {
                methods.push(node);
            }
        });
        methods
    }

    fn method_signature(&self, method: Node<'t>) -> String {
        let name = method
            .child_by_field_name("name")
            .map(|n| self.node_text(n).to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let parameters = method
            .child_by_field_name("parameters")
            .map(|p| self.node_text(p).to_string())
            .unwrap_or_default();
        format!("{name}{parameters}")
    }

    fn parameters(&self, method: Node<'t>) -> Vec<(String, Node<'t>)> {
        let Some(list) = method.child_by_field_name("parameters") else {
            return Vec::new();
        };
        named_children_of_kind(list, "parameter")
            .into_iter()
            .filter_map(|parameter| {
                let name = parameter
                    .child_by_field_name("name")
                    .or_else(|| first_child_of_kind(parameter, "identifier"))?;
                Some((self.node_text(name).to_string(), parameter))
            })
            .collect()
    }

    fn body_statements(&self, method: Node<'t>) -> Vec<Node<'t>> {
        let Some(body) = method.child_by_field_name("body") else {
            return Vec::new();
        };
        // expression-bodied members have a single expression as their body
        named_children(body)
    }

    fn identifier_text(&self, node: Node<'t>) -> Option<String> {
        (node.kind() == "identifier").then(|| self.node_text(node).to_string())
    }

    fn literal_value(&self, node: Node<'t>) -> Option<ConstantValue> {
        let text = self.node_text(node);
        match node.kind() {
            "string_literal" | "character_literal" => {
                Some(ConstantValue::Str(trim_quotes(text).to_string()))
            }
            "verbatim_string_literal" => {
                Some(ConstantValue::Str(trim_quotes(text.trim_start_matches('@')).to_string()))
            }
            "raw_string_literal" => {
                Some(ConstantValue::Str(text.trim_matches('"').to_string()))
            }
            "integer_literal" => {
                let trimmed = text.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));
                parse_int(trimmed)
                    .map(ConstantValue::Int)
                    .or(Some(ConstantValue::Str(text.to_string())))
            }
            "boolean_literal" => Some(ConstantValue::Bool(text == "true")),
            "real_literal" => Some(ConstantValue::Str(text.to_string())),
            _ => None,
        }
    }

    fn assignment_parts(&self, node: Node<'t>) -> Option<(Node<'t>, Node<'t>)> {
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;
        Some((left, right))
    }

    fn is_compound_assignment(&self, node: Node<'t>) -> bool {
        match self.assignment_parts(node) {
            Some((left, right)) => {
                let operator = self.source[left.end_byte()..right.start_byte()].trim();
                operator != "="
            }
            None => false,
        }
    }

    fn member_access_base(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "member_access_expression" | "element_access_expression" => {
                node.child_by_field_name("expression")
            }
            "cast_expression" => node.child_by_field_name("value"),
            "parenthesized_expression" | "checked_expression" | "await_expression"
            | "prefix_unary_expression" | "postfix_unary_expression" => node.named_child(0),
            _ => None,
        }
    }

    fn member_access_name(&self, node: Node<'t>) -> Option<String> {
        if node.kind() != "member_access_expression" {
            return None;
        }
        node.child_by_field_name("name").map(|n| self.node_text(n).to_string())
    }

    fn binary_operands(&self, node: Node<'t>) -> Option<(Node<'t>, Node<'t>)> {
        let left = node.child_by_field_name("left")?;
        let right = node.child_by_field_name("right")?;
        Some((left, right))
    }

    fn conditional_parts(&self, node: Node<'t>) -> Option<(Node<'t>, Node<'t>, Node<'t>)> {
        let condition = node.child_by_field_name("condition")?;
        let consequence = node.child_by_field_name("consequence")?;
        let alternative = node.child_by_field_name("alternative")?;
        Some((condition, consequence, alternative))
    }

    fn array_elements(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let initializer = if node.kind() == "initializer_expression" {
            Some(node)
        } else {
            first_child_of_kind(node, "initializer_expression")
        };
        initializer.map(named_children).unwrap_or_default()
    }

    fn arguments(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let list = first_child_of_kind(node, "argument_list")
            .or_else(|| first_child_of_kind(node, "bracketed_argument_list"))
            .or_else(|| node.child_by_field_name("arguments"));
        let Some(list) = list else {
            return Vec::new();
        };
        named_children_of_kind(list, "argument")
            .into_iter()
            .filter_map(|argument| argument.named_child(argument.named_child_count().wrapping_sub(1)))
            .collect()
    }

    fn declarators(&self, node: Node<'t>) -> Vec<(String, Option<Node<'t>>)> {
        let Some(declaration) = first_child_of_kind(node, "variable_declaration") else {
            return Vec::new();
        };
        named_children_of_kind(declaration, "variable_declarator")
            .into_iter()
            .filter_map(|declarator| {
                let name = declarator
                    .child_by_field_name("name")
                    .or_else(|| first_child_of_kind(declarator, "identifier"))?;
                Some((self.node_text(name).to_string(), initializer_value(declarator)))
            })
            .collect()
    }

    fn initializer_assignments(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let initializer = node
            .child_by_field_name("initializer")
            .or_else(|| first_child_of_kind(node, "initializer_expression"));
        let Some(initializer) = initializer else {
            return Vec::new();
        };
        named_children_of_kind(initializer, "assignment_expression")
    }

    fn resolve(&self, node: Node<'t>) -> Option<Symbol> {
        match node.kind() {
            "invocation_expression" => {
                let function = node.child_by_field_name("function")?;
                if function.kind() != "member_access_expression" {
                    return None;
                }
                let name = function.child_by_field_name("name")?;
                let base = function.child_by_field_name("expression")?;
                Some(Symbol::new(
                    self.receiver_type(base),
                    self.node_text(name),
                    SymbolKind::Method,
                ))
            }
            "object_creation_expression" => {
                let ty = node.child_by_field_name("type")?;
                Some(Symbol::new(self.node_text(ty), ".ctor", SymbolKind::Constructor))
            }
            "member_access_expression" => {
                let name = node.child_by_field_name("name")?;
                let base = node.child_by_field_name("expression")?;
                Some(Symbol::new(
                    self.receiver_type(base),
                    self.node_text(name),
                    SymbolKind::Property,
                ))
            }
            "identifier" => Some(Symbol::new("", self.node_text(node), SymbolKind::Local)),
            _ => None,
        }
    }
}

fn walk<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    visit(node);
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk(child, visit);
    }
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn named_children_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|n| n.kind() == kind).collect()
}

fn first_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let result = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    result
}

/// The value of a declarator's `= value` clause, if any.
fn initializer_value(declarator: Node<'_>) -> Option<Node<'_>> {
    let clause = first_child_of_kind(declarator, "equals_value_clause")?;
    clause.named_child(clause.named_child_count().wrapping_sub(1))
}

fn trim_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'')
}

fn parse_int(text: &str) -> Option<i64> {
    let text = text.replace('_', "");
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}
