use std::fmt;

use crate::{
    ast::{BinaryOperator, ChecksumValue, Node},
    bytecode::{Emit, OpCode},
};

pub mod lower;
pub mod names;
pub mod patch;

#[cfg(test)]
mod tests;

use lower::{Branch, Otherwise};
use names::NameTable;
use patch::{Base, PatchList, Width};

const DEFAULT_CODE_CAPACITY: usize = 4 * 1024; // 4 KiB

/// Generates bytecode for a parsed root with the default [`Options`].
pub fn generate(root: &Node) -> Result<Vec<u8>, Error> {
    Generator::with_options(Options::default()).generate(root)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Whether to append the name table. Without it the code still runs, but
    /// hashes can no longer be mapped back to names.
    pub name_table: bool,
    /// Synthetic loop counters are named with this prefix and the loop's
    /// index within the compilation.
    pub loop_guard_prefix: &'static str,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            name_table: true,
            loop_guard_prefix: "__qbc_loop_guard_",
        }
    }
}

pub struct Generator {
    options: Options,
    code: Vec<u8>,
    names: NameTable,
    patches: PatchList,
    /// Loops seen so far.
    loops: u32,
}

impl Generator {
    pub fn with_options(options: Options) -> Generator {
        Generator {
            options,
            code: Vec::with_capacity(DEFAULT_CODE_CAPACITY),
            names: NameTable::new(),
            patches: PatchList::new(),
            loops: 0,
        }
    }

    pub fn generate(mut self, root: &Node) -> Result<Vec<u8>, Error> {
        let Node::Root(body) = root else {
            return Err(Error::unencodable(root));
        };
        self.g_body(body)?;

        let patches = self.patches.len();
        self.patches.resolve(&mut self.code)?;
        if self.options.name_table {
            self.names.write(&mut self.code);
        }
        self.code.op(OpCode::EndOfFile);

        log::debug!(
            "generated {} bytes ({} names, {} patches, {} loops)",
            self.code.len(),
            self.names.len(),
            patches,
            self.loops,
        );
        Ok(self.code)
    }

    /// Statements of a body. Each one starts on its own line, so a line break
    /// is emitted before any statement not already preceded by one.
    fn g_body<'n>(&mut self, body: impl IntoIterator<Item = &'n Node>) -> Result<(), Error> {
        let mut after_line_break = false;
        for statement in body {
            if !statement.is_new_line() && !after_line_break {
                self.code.op(OpCode::NewLine);
            }
            self.g_node(statement)?;
            after_line_break = statement.is_new_line();
        }
        Ok(())
    }

    fn g_node(&mut self, node: &Node) -> Result<(), Error> {
        match node {
            Node::Root(_) => return Err(Error::unencodable(node)),
            Node::NewLine => self.code.op(OpCode::NewLine),
            Node::Comma => self.code.op(OpCode::Comma),
            Node::Break => self.code.op(OpCode::Break),
            Node::AllArguments => self.code.op(OpCode::AllArguments),
            Node::Assignment { name, value } => {
                self.g_node(name)?;
                self.code.op(OpCode::Assign);
                self.g_node(value)?;
            }
            Node::CompoundAssignment { op, name, value } => {
                self.g_node(&lower::compound_assignment(*op, name, value))?;
            }
            Node::Invocation { target, params } => {
                self.g_node(target)?;
                self.g_all(params)?;
            }
            Node::Return(params) => {
                self.code.op(OpCode::Return);
                self.g_all(params)?;
            }
            Node::Script {
                name,
                defaults,
                body,
            } => {
                self.code.op(OpCode::ScriptStart);
                self.g_node(name)?;
                self.g_all(defaults)?;
                self.g_body(body)?;
                self.code.op(OpCode::ScriptEnd);
            }
            Node::WhileLoop(body) => self.g_while(body)?,
            Node::IfStatement { conditions, bodies } => {
                let branch = lower::if_chain(conditions, bodies)
                    .ok_or_else(|| Error::unencodable(node))?;
                self.g_branch(&branch)?;
            }
            Node::Random { weights, branches } => self.g_random(node, weights, branches)?,
            Node::LocalReference(inner) => {
                self.code.op(OpCode::LocalReference);
                self.g_node(inner)?;
            }
            Node::Checksum(ChecksumValue::Name(name)) => {
                let hash = self.names.insert(name);
                self.code.op(OpCode::Checksum);
                self.code.u32(hash);
            }
            Node::Checksum(ChecksumValue::Raw(bytes)) => {
                self.code.op(OpCode::Checksum);
                self.code.extend_from_slice(bytes);
            }
            Node::Integer(text) => {
                self.code.op(OpCode::Integer);
                self.code.i32(parse_integer(text)?);
            }
            Node::Float(text) => {
                self.code.op(OpCode::Float);
                self.code.f32(parse_float(text)?);
            }
            Node::String(text) => {
                let len = u32::try_from(text.len() + 1).map_err(|_| Error::unencodable(node))?;
                self.code.op(OpCode::String);
                self.code.u32(len);
                self.code.c_str(text);
            }
            Node::Binary { op, lhs, rhs } => {
                if let Some(lowered) = lower::derived_comparison(*op, lhs, rhs) {
                    return self.g_node(&lowered);
                }
                self.g_node(lhs)?;
                self.code.op(operator(*op).ok_or_else(|| Error::unencodable(node))?);
                self.g_node(rhs)?;
            }
            Node::UnaryExpression(inner) => {
                self.code.op(OpCode::ParenOpen);
                self.g_node(inner)?;
                self.code.op(OpCode::ParenClose);
            }
            Node::LogicalNot(inner) => {
                self.code.op(OpCode::Not);
                self.g_node(inner)?;
            }
            Node::Pair(x, y) => {
                self.code.op(OpCode::Pair);
                for component in [x, y] {
                    self.code.f32(component_value(component)?);
                }
            }
            Node::Vector(x, y, z) => {
                self.code.op(OpCode::Vector);
                for component in [x, y, z] {
                    self.code.f32(component_value(component)?);
                }
            }
            Node::Struct(elements) => {
                self.code.op(OpCode::StructStart);
                self.g_all(elements)?;
                self.code.op(OpCode::StructEnd);
            }
            Node::Array(elements) => {
                self.code.op(OpCode::ArrayStart);
                self.g_all(elements)?;
                self.code.op(OpCode::ArrayEnd);
            }
        }
        Ok(())
    }

    fn g_all(&mut self, nodes: &[Node]) -> Result<(), Error> {
        for node in nodes {
            self.g_node(node)?;
        }
        Ok(())
    }

    /// The counter initialization, a line break, and the loop itself with the
    /// guard leading its body.
    fn g_while(&mut self, body: &[Node]) -> Result<(), Error> {
        let counter = format!("{}{}", self.options.loop_guard_prefix, self.loops);
        self.loops += 1;
        let lower::LoopGuard { init, guard } = lower::loop_guard(&counter);

        self.g_node(&init)?;
        self.code.op(OpCode::NewLine);
        self.code.op(OpCode::LoopStart);
        self.g_body(std::iter::once(&guard).chain(body))?;
        self.code.op(OpCode::LoopEnd);
        Ok(())
    }

    /// `47 size condition then [48 size otherwise] 28`. Sizes are measured
    /// from their own first byte, up to the else body or the end-if.
    fn g_branch(&mut self, branch: &Branch<'_>) -> Result<(), Error> {
        let then_end = self.patches.label();
        self.code.op(OpCode::OptimisedIf);
        self.patches
            .defer(&mut self.code, Width::U16, Base::Start, then_end);
        self.g_node(branch.condition)?;
        self.g_body(branch.then)?;

        if let Otherwise::None = branch.otherwise {
            self.patches.bind(then_end, &self.code);
            self.code.op(OpCode::EndIf);
            return Ok(());
        }

        let else_end = self.patches.label();
        self.code.op(OpCode::OptimisedElse);
        self.patches
            .defer(&mut self.code, Width::U16, Base::Start, else_end);
        self.patches.bind(then_end, &self.code);
        match &branch.otherwise {
            Otherwise::None => (),
            Otherwise::Body(body) => self.g_body(*body)?,
            Otherwise::Branch(inner) => {
                self.code.op(OpCode::NewLine);
                self.g_branch(inner)?;
            }
        }
        self.patches.bind(else_end, &self.code);
        self.code.op(OpCode::EndIf);
        Ok(())
    }

    /// `2F count weights offsets` followed by the branches. Each offset is
    /// measured from its own end to its branch; every branch but the last
    /// ends with a long jump past the final one.
    fn g_random(&mut self, node: &Node, weights: &[Node], branches: &[Vec<Node>]) -> Result<(), Error> {
        if weights.len() != branches.len() || branches.is_empty() {
            return Err(Error::unencodable(node));
        }
        let count = u16::try_from(branches.len()).map_err(|_| Error::unencodable(node))?;
        self.code.op(OpCode::Random);
        self.code.u16(count);
        for weight in weights {
            self.code.u16(parse_weight(weight)?);
        }

        let starts: Vec<_> = branches.iter().map(|_| self.patches.label()).collect();
        for &start in &starts {
            self.patches
                .defer(&mut self.code, Width::U32, Base::End, start);
        }
        let end = self.patches.label();
        for (i, (branch, &start)) in branches.iter().zip(&starts).enumerate() {
            self.patches.bind(start, &self.code);
            self.g_body(branch)?;
            if i + 1 < branches.len() {
                self.code.op(OpCode::LongJump);
                self.patches
                    .defer(&mut self.code, Width::U32, Base::End, end);
            }
        }
        self.patches.bind(end, &self.code);
        Ok(())
    }
}

fn operator(op: BinaryOperator) -> Option<OpCode> {
    let code = match op {
        BinaryOperator::Add => OpCode::Add,
        BinaryOperator::Sub => OpCode::Sub,
        BinaryOperator::Mul => OpCode::Mul,
        BinaryOperator::Div => OpCode::Div,
        BinaryOperator::Less => OpCode::Less,
        BinaryOperator::Greater => OpCode::Greater,
        BinaryOperator::Equals => OpCode::Equals,
        BinaryOperator::Dot => OpCode::Dot,
        BinaryOperator::Colon => OpCode::Colon,
        BinaryOperator::And => OpCode::And,
        BinaryOperator::Or => OpCode::Or,
        BinaryOperator::NotEquals | BinaryOperator::LessEquals | BinaryOperator::GreaterEquals => {
            return None
        }
    };
    Some(code)
}

/// Decimal or `0x` hex, optionally negative. Texts up to `u32::MAX` are
/// taken as the two's complement bit pattern.
fn parse_integer(text: &str) -> Result<i32, Error> {
    let out_of_range = || Error::IntegerOutOfRange {
        text: text.to_owned(),
    };
    let (negative, digits) = match text.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => digits.parse::<u64>(),
    }
    .map_err(|_| out_of_range())?;

    if negative {
        let value = -i64::try_from(magnitude).map_err(|_| out_of_range())?;
        i32::try_from(value).map_err(|_| out_of_range())
    } else {
        let value = u32::try_from(magnitude).map_err(|_| out_of_range())?;
        Ok(value as i32)
    }
}

fn parse_float(text: &str) -> Result<f32, Error> {
    text.parse().map_err(|_| Error::InvalidFloat {
        text: text.to_owned(),
    })
}

/// A pair or vector component, always encoded as a float.
fn component_value(node: &Node) -> Result<f32, Error> {
    match node {
        Node::Float(text) => parse_float(text),
        Node::Integer(text) => Ok(parse_integer(text)? as f32),
        _ => Err(Error::unencodable(node)),
    }
}

fn parse_weight(node: &Node) -> Result<u16, Error> {
    let Node::Integer(text) = node else {
        return Err(Error::unencodable(node));
    };
    let weight = parse_integer(text)?;
    u16::try_from(weight).map_err(|_| Error::IntegerOutOfRange { text: text.clone() })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A node in a position no encoding exists for.
    UnencodableNode { node: String },
    IntegerOutOfRange { text: String },
    InvalidFloat { text: String },
    PatchOutOfRange {
        offset: usize,
        width: usize,
        value: i64,
    },
    /// A patch targets a label that was never bound.
    UnboundLabel,
}

impl Error {
    fn unencodable(node: &Node) -> Error {
        Error::UnencodableNode {
            node: format!("{node:?}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnencodableNode { node } => write!(f, "no encoding for node {node}"),
            Error::IntegerOutOfRange { text } => write!(f, "integer {text} does not fit 32 bits"),
            Error::InvalidFloat { text } => write!(f, "invalid float {text}"),
            Error::PatchOutOfRange {
                offset,
                width,
                value,
            } => write!(
                f,
                "offset {value} does not fit the {width}-byte field at {offset:#x}"
            ),
            Error::UnboundLabel => write!(f, "jump target was never reached"),
        }
    }
}

impl std::error::Error for Error {}
