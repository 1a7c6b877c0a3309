use pretty_assertions::assert_eq;

use super::{generate, Error, Generator, Options};
use crate::{
    ast::Node,
    bytecode::{checksum, Emit, OpCode},
    lexer, parser,
};

fn root(src: &str) -> Node {
    let tokens = lexer::tokenize(src).unwrap();
    parser::parse(&tokens).unwrap()
}

/// Generates without the name table, so expectations only cover the code.
fn bare(src: &str) -> Vec<u8> {
    let options = Options {
        name_table: false,
        ..Options::default()
    };
    Generator::with_options(options)
        .generate(&root(src))
        .unwrap()
}

/// Builds expected bytecode.
#[derive(Default)]
struct Code(Vec<u8>);

impl Code {
    fn op(mut self, op: OpCode) -> Code {
        self.0.op(op);
        self
    }

    fn line(self) -> Code {
        self.op(OpCode::NewLine)
    }

    fn name(mut self, name: &str) -> Code {
        self.0.op(OpCode::Checksum);
        self.0.u32(checksum(name));
        self
    }

    fn int(mut self, value: i32) -> Code {
        self.0.op(OpCode::Integer);
        self.0.i32(value);
        self
    }

    fn u16(mut self, value: u16) -> Code {
        self.0.u16(value);
        self
    }

    fn u32(mut self, value: u32) -> Code {
        self.0.u32(value);
        self
    }

    fn bytes(mut self, bytes: &[u8]) -> Code {
        self.0.extend_from_slice(bytes);
        self
    }

    fn eof(self) -> Vec<u8> {
        self.op(OpCode::EndOfFile).0
    }
}

#[test]
fn empty_and_separator_only_sources() {
    assert_eq!(generate(&root("")).unwrap(), [0x00]);
    assert_eq!(generate(&root(";")).unwrap(), [0x01, 0x00]);
}

#[test]
fn assignment_with_name_table() {
    let hash = checksum("x").to_le_bytes();
    let expected = Code::default()
        .line()
        .name("x")
        .op(OpCode::Assign)
        .int(10)
        .op(OpCode::NameTableEntry)
        .bytes(&hash)
        .bytes(b"x\0")
        .eof();
    assert_eq!(generate(&root("x = 10")).unwrap(), expected);
}

#[test]
fn parenthesized_operation() {
    let expected = Code::default()
        .line()
        .name("x")
        .op(OpCode::Assign)
        .op(OpCode::ParenOpen)
        .int(1)
        .op(OpCode::Add)
        .int(2)
        .op(OpCode::ParenClose)
        .eof();
    assert_eq!(bare("x = (1 + 2)"), expected);
}

#[test]
fn line_breaks_are_not_doubled() {
    let expected = Code::default()
        .line()
        .name("a")
        .line()
        .name("b")
        .line()
        .eof();
    assert_eq!(bare("a\n\n// comment\n\nb\n"), expected);
    assert_eq!(bare("a; b;"), expected);
}

#[test]
fn if_without_else() {
    // The size reaches the end-if from the first byte of the size field.
    let expected = Code::default()
        .line()
        .op(OpCode::OptimisedIf)
        .u16(13)
        .name("a")
        .line()
        .name("b")
        .op(OpCode::EndIf)
        .eof();
    assert_eq!(bare("if a { b }"), expected);
}

#[test]
fn if_with_else() {
    let expected = Code::default()
        .line()
        .op(OpCode::OptimisedIf)
        .u16(16)
        .name("a")
        .line()
        .name("b")
        .op(OpCode::OptimisedElse)
        .u16(8)
        .line()
        .name("c")
        .op(OpCode::EndIf)
        .eof();
    assert_eq!(bare("if a { b } else { c }"), expected);
}

#[test]
fn else_if_is_a_nested_conditional() {
    let chained = bare("if a { b } else if c { d }");
    let nested = bare("if a { b } else { if c { d } }");
    assert_eq!(chained, nested);

    let expected = Code::default()
        .line()
        .op(OpCode::OptimisedIf)
        .u16(16)
        .name("a")
        .line()
        .name("b")
        .op(OpCode::OptimisedElse)
        .u16(18)
        .line()
        .op(OpCode::OptimisedIf)
        .u16(13)
        .name("c")
        .line()
        .name("d")
        .op(OpCode::EndIf)
        .op(OpCode::EndIf)
        .eof();
    assert_eq!(chained, expected);
}

#[test]
fn random_offsets() {
    let expected = Code::default()
        .line()
        .op(OpCode::Random)
        .u16(2)
        .u16(1)
        .u16(2)
        // Measured from the end of each entry.
        .u32(4)
        .u32(11)
        .line()
        .name("a")
        .op(OpCode::LongJump)
        .u32(6)
        .line()
        .name("b")
        .eof();
    assert_eq!(bare("random { 1 { a } 2 { b } }"), expected);
}

#[test]
fn while_loop_is_guarded() {
    let counter = "__qbc_loop_guard_0";
    let expected = Code::default()
        .line()
        .name(counter)
        .op(OpCode::Assign)
        .int(0)
        .line()
        .op(OpCode::LoopStart)
        .line()
        .op(OpCode::OptimisedIf)
        .u16(17)
        .op(OpCode::ParenOpen)
        .name(counter)
        .op(OpCode::Greater)
        .int(0)
        .op(OpCode::ParenClose)
        .line()
        .op(OpCode::Break)
        .op(OpCode::EndIf)
        .line()
        .op(OpCode::Break)
        .op(OpCode::LoopEnd)
        .eof();
    assert_eq!(bare("while { break }"), expected);
}

#[test]
fn loop_guard_prefix_is_configurable() {
    let options = Options {
        loop_guard_prefix: "guard",
        ..Options::default()
    };
    let code = Generator::with_options(options)
        .generate(&root("while { break }"))
        .unwrap();
    let name_entry = Code::default()
        .op(OpCode::NameTableEntry)
        .u32(checksum("guard0"))
        .bytes(b"guard0\0")
        .0;
    assert!(code.ends_with(&[name_entry, vec![0x00]].concat()));
}

#[test]
fn script_with_default() {
    let expected = Code::default()
        .line()
        .op(OpCode::ScriptStart)
        .name("foo")
        .name("a")
        .op(OpCode::Assign)
        .int(1)
        .line()
        .op(OpCode::Return)
        .op(OpCode::ScriptEnd)
        .eof();
    assert_eq!(bare("script foo a = 1 { return }"), expected);
}

#[test]
fn struct_keeps_line_breaks_and_commas() {
    let expected = Code::default()
        .line()
        .name("foo")
        .name("p")
        .op(OpCode::Assign)
        .op(OpCode::StructStart)
        .line()
        .name("a")
        .op(OpCode::Assign)
        .int(1)
        .op(OpCode::Comma)
        .name("b")
        .op(OpCode::Assign)
        .int(2)
        .line()
        .op(OpCode::StructEnd)
        .eof();
    assert_eq!(bare("foo p = {\n  a = 1, b = 2\n}"), expected);
}

#[test]
fn literal_encodings() {
    let expected = Code::default()
        .line()
        .name("s")
        .op(OpCode::Assign)
        .op(OpCode::String)
        .u32(4)
        .bytes(b"hi\n\0")
        .line()
        .name("p")
        .op(OpCode::Assign)
        .op(OpCode::Pair)
        .bytes(&1.0_f32.to_le_bytes())
        .bytes(&2.5_f32.to_le_bytes())
        .line()
        .name("n")
        .op(OpCode::Assign)
        .int(-1)
        .line()
        .name("m")
        .op(OpCode::Assign)
        .int(i32::MIN)
        .eof();
    let src = "s = \"hi\\n\"\np = (1, 2.5)\nn = 0xFFFFFFFF\nm = -2147483648";
    assert_eq!(bare(src), expected);
}

#[test]
fn raw_hash_is_not_named() {
    let code = generate(&root("x = #DEADBEEF")).unwrap();
    let expected = Code::default()
        .line()
        .name("x")
        .op(OpCode::Assign)
        .op(OpCode::Checksum)
        .bytes(&[0xEF, 0xBE, 0xAD, 0xDE])
        .op(OpCode::NameTableEntry)
        .u32(checksum("x"))
        .bytes(b"x\0")
        .eof();
    assert_eq!(code, expected);
}

#[test]
fn integer_out_of_range() {
    assert_eq!(
        generate(&root("x = 4294967296")),
        Err(Error::IntegerOutOfRange {
            text: "4294967296".into(),
        }),
    );
    assert_eq!(
        generate(&root("x = -2147483649")),
        Err(Error::IntegerOutOfRange {
            text: "-2147483649".into(),
        }),
    );
}

#[test]
fn only_roots_are_generated() {
    assert_eq!(
        generate(&Node::Break),
        Err(Error::UnencodableNode {
            node: "Break".into(),
        }),
    );
}
