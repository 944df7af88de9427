//! Java dialect adapter over tree-sitter.
//!
//! Same resolution strategy as the C# adapter: declared-type tracking for
//! locals and parameters, receiver text as the fallback.

use std::path::Path;

use sift_core::errors::ParseError;
use sift_core::types::collections::FxHashMap;
use sift_core::types::findings::Span;
use tree_sitter::{Node, Parser, Tree};

use super::{ConstantValue, NodeShape, Symbol, SymbolKind, SyntaxApi};

/// Parse Java source text into a tree.
pub fn parse(source: &str, path: &Path) -> Result<Tree, ParseError> {
    let language: tree_sitter::Language = tree_sitter_java::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|_| ParseError::GrammarNotFound { language: "Java".to_string() })?;
    parser.parse(source, None).ok_or_else(|| ParseError::TreeSitter {
        path: path.to_path_buf(),
        message: "tree-sitter returned no tree".to_string(),
    })
}

/// One parsed Java compilation unit.
pub struct JavaUnit<'t> {
    file: String,
    source: &'t str,
    tree: &'t Tree,
    declared_types: FxHashMap<String, String>,
}

impl<'t> JavaUnit<'t> {
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
            "local_variable_declaration" | "field_declaration" => {
                let Some(ty) = node.child_by_field_name("type") else {
                    return;
                };
                let ty = self.node_text(ty).to_string();
                for declarator in named_children_of_kind(node, "variable_declarator") {
                    if let Some(name) = declarator.child_by_field_name("name") {
                        self.declared_types.insert(self.node_text(name).to_string(), ty.clone());
                    }
                }
            }
            "formal_parameter" => {
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

impl<'t> SyntaxApi for JavaUnit<'t> {
    type Node = Node<'t>;

    fn file(&self) -> &str {
        &self.file
    }

    fn shape(&self, node: Node<'t>) -> NodeShape {
        match node.kind() {
            "method_declaration" | "constructor_declaration" => NodeShape::MethodDeclaration,
            "block" | "constructor_body" | "if_statement" | "for_statement"
            | "enhanced_for_statement" | "while_statement" | "do_statement"
            | "switch_expression" | "switch_block" | "switch_block_statement_group"
            | "try_statement" | "try_with_resources_statement" | "catch_clause"
            | "finally_clause" | "synchronized_statement" | "labeled_statement"
            | "return_statement" | "throw_statement" => NodeShape::Block,
            "local_variable_declaration" => NodeShape::LocalDeclaration,
            "expression_statement" => NodeShape::ExpressionStatement,
            "string_literal" | "character_literal" | "decimal_integer_literal"
            | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal"
            | "decimal_floating_point_literal" | "hex_floating_point_literal" | "true"
            | "false" | "null_literal" => NodeShape::Literal,
            "identifier" => NodeShape::Identifier,
            "field_access" => NodeShape::MemberAccess,
            "array_access" => NodeShape::ElementAccess,
            "binary_expression" => NodeShape::Binary,
            "ternary_expression" => NodeShape::Conditional,
            "array_creation_expression" | "array_initializer" => NodeShape::ArrayCreation,
            "method_invocation" => NodeShape::Invocation,
            "object_creation_expression" => NodeShape::ObjectCreation,
            "assignment_expression" => NodeShape::Assignment,
            "parenthesized_expression" | "cast_expression" | "unary_expression"
            | "update_expression" => NodeShape::MemberAccess,
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
            if matches!(node.kind(), "method_declaration" | "constructor_declaration") {
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
        named_children_of_kind(list, "formal_parameter")
            .into_iter()
            .filter_map(|parameter| {
                let name = parameter.child_by_field_name("name")?;
                Some((self.node_text(name).to_string(), parameter))
            })
            .collect()
    }

    fn body_statements(&self, method: Node<'t>) -> Vec<Node<'t>> {
        method.child_by_field_name("body").map(named_children).unwrap_or_default()
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
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal"
            | "binary_integer_literal" => {
                let trimmed = text.trim_end_matches(|c: char| matches!(c, 'l' | 'L'));
                parse_int(trimmed)
                    .map(ConstantValue::Int)
                    .or(Some(ConstantValue::Str(text.to_string())))
            }
            "true" => Some(ConstantValue::Bool(true)),
            "false" => Some(ConstantValue::Bool(false)),
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                Some(ConstantValue::Str(text.to_string()))
            }
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
            "field_access" => node.child_by_field_name("object"),
            "array_access" => node.child_by_field_name("array"),
            "cast_expression" => node.child_by_field_name("value"),
            "unary_expression" => node.child_by_field_name("operand"),
            "parenthesized_expression" | "update_expression" => node.named_child(0),
            _ => None,
        }
    }

    fn member_access_name(&self, node: Node<'t>) -> Option<String> {
        if node.kind() != "field_access" {
            return None;
        }
        node.child_by_field_name("field").map(|n| self.node_text(n).to_string())
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
        let initializer = if node.kind() == "array_initializer" {
            Some(node)
        } else {
            first_child_of_kind(node, "array_initializer")
        };
        initializer.map(named_children).unwrap_or_default()
    }

    fn arguments(&self, node: Node<'t>) -> Vec<Node<'t>> {
        if node.kind() == "array_access" {
            return node.child_by_field_name("index").into_iter().collect();
        }
        node.child_by_field_name("arguments")
            .or_else(|| first_child_of_kind(node, "argument_list"))
            .map(named_children)
            .unwrap_or_default()
    }

    fn declarators(&self, node: Node<'t>) -> Vec<(String, Option<Node<'t>>)> {
        named_children_of_kind(node, "variable_declarator")
            .into_iter()
            .filter_map(|declarator| {
                let name = declarator.child_by_field_name("name")?;
                Some((
                    self.node_text(name).to_string(),
                    declarator.child_by_field_name("value"),
                ))
            })
            .collect()
    }

    fn initializer_assignments(&self, _node: Node<'t>) -> Vec<Node<'t>> {
        // Java has no object-initializer syntax
        Vec::new()
    }

    fn resolve(&self, node: Node<'t>) -> Option<Symbol> {
        match node.kind() {
            "method_invocation" => {
                let name = node.child_by_field_name("name")?;
                let object = node.child_by_field_name("object")?;
                Some(Symbol::new(
                    self.receiver_type(object),
                    self.node_text(name),
                    SymbolKind::Method,
                ))
            }
            "object_creation_expression" => {
                let ty = node.child_by_field_name("type")?;
                Some(Symbol::new(self.node_text(ty), ".ctor", SymbolKind::Constructor))
            }
            "field_access" => {
                let field = node.child_by_field_name("field")?;
                let object = node.child_by_field_name("object")?;
                Some(Symbol::new(
                    self.receiver_type(object),
                    self.node_text(field),
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
