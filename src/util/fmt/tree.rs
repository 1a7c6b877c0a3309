//! Indented rendering of syntax trees, one node per line.

use std::fmt::{self, Write};

use crate::ast::{ChecksumValue, Node};

const INDENT_WIDTH: usize = 2;

fn sp(w: &mut impl Write, i: usize) -> fmt::Result {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

/// Displays the whole tree under a node.
pub struct Tree<'node>(pub &'node Node);

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_node(f, 0, self.0)
    }
}

pub fn print_tree_string(node: &Node) -> String {
    Tree(node).to_string()
}

fn print_list(w: &mut impl Write, i: usize, label: &str, nodes: &[Node]) -> fmt::Result {
    sp(w, i)?;
    writeln!(w, "{label}")?;
    print_all(w, i + 1, nodes)
}

fn print_all(w: &mut impl Write, i: usize, nodes: &[Node]) -> fmt::Result {
    for node in nodes {
        print_node(w, i, node)?;
    }
    Ok(())
}

pub fn print_node(w: &mut impl Write, i: usize, node: &Node) -> fmt::Result {
    sp(w, i)?;
    match node {
        Node::Root(body) => {
            writeln!(w, "root")?;
            print_all(w, i + 1, body)?;
        }
        Node::Assignment { name, value } => {
            writeln!(w, "assignment")?;
            print_node(w, i + 1, name)?;
            print_node(w, i + 1, value)?;
        }
        Node::CompoundAssignment { op, name, value } => {
            writeln!(w, "compound_assignment {op:?}")?;
            print_node(w, i + 1, name)?;
            print_node(w, i + 1, value)?;
        }
        Node::Invocation { target, params } => {
            writeln!(w, "invocation")?;
            print_node(w, i + 1, target)?;
            print_all(w, i + 1, params)?;
        }
        Node::Script {
            name,
            defaults,
            body,
        } => {
            writeln!(w, "script")?;
            print_node(w, i + 1, name)?;
            if !defaults.is_empty() {
                print_list(w, i + 1, "defaults", defaults)?;
            }
            print_list(w, i + 1, "body", body)?;
        }
        Node::WhileLoop(body) => {
            writeln!(w, "while")?;
            print_all(w, i + 1, body)?;
        }
        Node::IfStatement { conditions, bodies } => {
            writeln!(w, "if")?;
            for (condition, body) in conditions.iter().zip(bodies) {
                sp(w, i + 1)?;
                writeln!(w, "condition")?;
                print_node(w, i + 2, condition)?;
                print_list(w, i + 1, "body", body)?;
            }
            if let Some(otherwise) = bodies.get(conditions.len()) {
                print_list(w, i + 1, "else", otherwise)?;
            }
        }
        Node::LocalReference(inner) => {
            writeln!(w, "local")?;
            print_node(w, i + 1, inner)?;
        }
        Node::AllArguments => writeln!(w, "all_arguments")?,
        Node::Checksum(ChecksumValue::Name(name)) => writeln!(w, "checksum {name}")?,
        Node::Checksum(ChecksumValue::Raw(bytes)) => {
            writeln!(w, "checksum #{:08x}", u32::from_le_bytes(*bytes))?;
        }
        Node::Integer(text) => writeln!(w, "integer {text}")?,
        Node::Float(text) => writeln!(w, "float {text}")?,
        Node::String(text) => writeln!(w, "string {text:?}")?,
        Node::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?}")?;
            print_node(w, i + 1, lhs)?;
            print_node(w, i + 1, rhs)?;
        }
        Node::UnaryExpression(inner) => {
            writeln!(w, "paren")?;
            print_node(w, i + 1, inner)?;
        }
        Node::LogicalNot(inner) => {
            writeln!(w, "not")?;
            print_node(w, i + 1, inner)?;
        }
        Node::Pair(x, y) => {
            writeln!(w, "pair")?;
            print_node(w, i + 1, x)?;
            print_node(w, i + 1, y)?;
        }
        Node::Vector(x, y, z) => {
            writeln!(w, "vector")?;
            print_node(w, i + 1, x)?;
            print_node(w, i + 1, y)?;
            print_node(w, i + 1, z)?;
        }
        Node::Struct(elements) => {
            writeln!(w, "struct")?;
            print_all(w, i + 1, elements)?;
        }
        Node::Array(elements) => {
            writeln!(w, "array")?;
            print_all(w, i + 1, elements)?;
        }
        Node::Random { weights, branches } => {
            writeln!(w, "random")?;
            for (weight, branch) in weights.iter().zip(branches) {
                sp(w, i + 1)?;
                writeln!(w, "weight")?;
                print_node(w, i + 2, weight)?;
                print_list(w, i + 1, "branch", branch)?;
            }
        }
        Node::Break => writeln!(w, "break")?,
        Node::Return(params) => {
            writeln!(w, "return")?;
            print_all(w, i + 1, params)?;
        }
        Node::Comma => writeln!(w, "comma")?,
        Node::NewLine => writeln!(w, "newline")?,
    }
    Ok(())
}
