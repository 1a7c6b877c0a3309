//! The binary instruction format shared by the generator and its consumers.

use std::fmt;

/// One-byte instruction tags. Operands, where present, follow the tag
/// little-endian.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    EndOfFile = 0x00,
    NewLine = 0x01,
    StructStart = 0x03,
    StructEnd = 0x04,
    ArrayStart = 0x05,
    ArrayEnd = 0x06,
    Assign = 0x07,
    Dot = 0x08,
    Comma = 0x09,
    Sub = 0x0A,
    Add = 0x0B,
    Div = 0x0C,
    Mul = 0x0D,
    ParenOpen = 0x0E,
    ParenClose = 0x0F,
    Equals = 0x11,
    Less = 0x12,
    Greater = 0x14,
    /// Followed by a 4-byte hash.
    Checksum = 0x16,
    /// Followed by an `i32`.
    Integer = 0x17,
    /// Followed by an `f32`.
    Float = 0x1A,
    /// Followed by a `u32` length (counting the NUL), the bytes and a NUL.
    String = 0x1B,
    /// Followed by three `f32`.
    Vector = 0x1E,
    /// Followed by two `f32`.
    Pair = 0x1F,
    LoopStart = 0x20,
    LoopEnd = 0x21,
    Break = 0x22,
    ScriptStart = 0x23,
    ScriptEnd = 0x24,
    If = 0x25,
    Else = 0x26,
    EndIf = 0x28,
    Return = 0x29,
    /// Followed by a 4-byte hash and the NUL-terminated name.
    NameTableEntry = 0x2B,
    AllArguments = 0x2C,
    LocalReference = 0x2D,
    /// Followed by a `u32` relative offset.
    LongJump = 0x2E,
    /// Followed by a `u16` branch count, the `u16` weights and a `u32` offset
    /// per branch.
    Random = 0x2F,
    Or = 0x32,
    And = 0x33,
    Not = 0x39,
    Colon = 0x42,
    /// Followed by a `u16` size.
    OptimisedIf = 0x47,
    /// Followed by a `u16` size.
    OptimisedElse = 0x48,
}

impl OpCode {
    pub const ALL: &[OpCode] = &[
        OpCode::EndOfFile,
        OpCode::NewLine,
        OpCode::StructStart,
        OpCode::StructEnd,
        OpCode::ArrayStart,
        OpCode::ArrayEnd,
        OpCode::Assign,
        OpCode::Dot,
        OpCode::Comma,
        OpCode::Sub,
        OpCode::Add,
        OpCode::Div,
        OpCode::Mul,
        OpCode::ParenOpen,
        OpCode::ParenClose,
        OpCode::Equals,
        OpCode::Less,
        OpCode::Greater,
        OpCode::Checksum,
        OpCode::Integer,
        OpCode::Float,
        OpCode::String,
        OpCode::Vector,
        OpCode::Pair,
        OpCode::LoopStart,
        OpCode::LoopEnd,
        OpCode::Break,
        OpCode::ScriptStart,
        OpCode::ScriptEnd,
        OpCode::If,
        OpCode::Else,
        OpCode::EndIf,
        OpCode::Return,
        OpCode::NameTableEntry,
        OpCode::AllArguments,
        OpCode::LocalReference,
        OpCode::LongJump,
        OpCode::Random,
        OpCode::Or,
        OpCode::And,
        OpCode::Not,
        OpCode::Colon,
        OpCode::OptimisedIf,
        OpCode::OptimisedElse,
    ];

    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op.byte()
    }
}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL
            .iter()
            .copied()
            .find(|op| op.byte() == byte)
            .ok_or(UnknownOpCode(byte))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnknownOpCode(pub u8);

impl fmt::Display for UnknownOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown opcode {:#04x}", self.0)
    }
}

impl std::error::Error for UnknownOpCode {}

const CRC_TABLE: [u32; 256] = crc_table();

const fn crc_table() -> [u32; 256] {
    let mut table = [0; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// The engine's identifier hash: a CRC-32 without the final inversion, over
/// the ASCII-lowercased name with `/` read as `\`.
pub fn checksum(name: &str) -> u32 {
    name.bytes().fold(0xFFFF_FFFF, |crc, byte| {
        let byte = match byte.to_ascii_lowercase() {
            b'/' => b'\\',
            other => other,
        };
        CRC_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8)
    })
}

/// Little-endian operand writers.
pub trait Emit {
    fn op(&mut self, op: OpCode);
    fn u16(&mut self, value: u16);
    fn u32(&mut self, value: u32);
    fn i32(&mut self, value: i32);
    fn f32(&mut self, value: f32);
    /// Text followed by a NUL.
    fn c_str(&mut self, text: &str);
}

impl Emit for Vec<u8> {
    fn op(&mut self, op: OpCode) {
        self.push(op.byte());
    }

    fn u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn i32(&mut self, value: i32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn f32(&mut self, value: f32) {
        self.extend_from_slice(&value.to_le_bytes());
    }

    fn c_str(&mut self, text: &str) {
        self.extend_from_slice(text.as_bytes());
        self.push(0);
    }
}
