//! Property-based tests for literal encoding, hashing and line handling.

use proptest::prelude::*;
use qbc::{
    bytecode::{checksum, OpCode},
    compile, Options,
};

fn bare(src: &str) -> Vec<u8> {
    let options = Options {
        name_table: false,
        ..Options::default()
    };
    compile(src, &options).unwrap()
}

/// `x = <literal>` without the name table.
fn assignment(opcode: OpCode, operand: [u8; 4]) -> Vec<u8> {
    let mut code = vec![OpCode::NewLine.byte(), OpCode::Checksum.byte()];
    code.extend_from_slice(&checksum("x").to_le_bytes());
    code.extend_from_slice(&[OpCode::Assign.byte(), opcode.byte()]);
    code.extend_from_slice(&operand);
    code.push(OpCode::EndOfFile.byte());
    code
}

/// A float as `digits.digits`, the only form the lexer accepts.
fn float_text(value: f32) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

const KEYWORDS: &[&str] = &[
    "script", "if", "else", "while", "break", "return", "random", "and", "or",
];

fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,15}".prop_filter("must not be a keyword", |name| {
        !KEYWORDS.contains(&name.as_str())
    })
}

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("\n"),
        Just("\n\n\n"),
        Just(";"),
        Just("  \n\t\n"),
        Just("// note\n"),
        Just("/* block */\n"),
        Just("\n/* a\n /* nested */ b */\n"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Integers encode as 0x17 and their little-endian bytes.
    #[test]
    fn integers_round_trip(n in any::<i32>()) {
        let code = bare(&format!("x = {n}"));
        prop_assert_eq!(code, assignment(OpCode::Integer, n.to_le_bytes()));
    }

    /// Floats encode as 0x1A and their IEEE-754 little-endian bytes.
    #[test]
    fn floats_round_trip(f in any::<f32>().prop_filter("must be finite", |f| f.is_finite())) {
        let code = bare(&format!("x = {}", float_text(f)));
        prop_assert_eq!(code, assignment(OpCode::Float, f.to_le_bytes()));
    }

    /// Every reference hashes the same and the name is recorded once, with
    /// the first spelling.
    #[test]
    fn names_are_hashed_once(name in arb_identifier()) {
        let src = format!("{name} = {}\nfoo {name}", name.to_uppercase());
        let code = compile(&src, &Options::default()).unwrap();
        let hash = checksum(&name).to_le_bytes();

        let mut reference = vec![OpCode::Checksum.byte()];
        reference.extend_from_slice(&hash);
        let references = code.windows(5).filter(|window| *window == reference.as_slice()).count();
        let expected_references = if checksum(&name) == checksum("foo") { 4 } else { 3 };
        prop_assert_eq!(references, expected_references);

        let mut entry = vec![OpCode::NameTableEntry.byte()];
        entry.extend_from_slice(&hash);
        entry.extend_from_slice(name.as_bytes());
        entry.push(0);
        let entries = code.windows(entry.len()).filter(|window| *window == entry.as_slice()).count();
        prop_assert_eq!(entries, 1);
    }

    /// Any run of blank lines, separators and comments between two statements
    /// compiles like a single line break.
    #[test]
    fn separators_collapse(separators in prop::collection::vec(arb_separator(), 1..6)) {
        let src = format!("a = 1{}b = 2", separators.concat());
        prop_assert_eq!(bare(&src), bare("a = 1\nb = 2"));
    }
}
