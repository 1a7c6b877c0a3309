use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier names, unescaped string contents, literal digits. For
    /// punctuation and keywords, the source text itself.
    pub text: String,
    /// The line (1-based) on which the token starts.
    pub line: u32,
    /// Number of source characters consumed to produce the token.
    pub width: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, width: u32) -> Token {
        Token {
            kind,
            text: text.into(),
            line,
            width,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Line breaks and `;` both end a statement.
    pub fn is_separator(&self) -> bool {
        matches!(self.kind, TokenKind::NewLine | TokenKind::Semicolon)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, line {}, width {})",
            self.kind, self.text, self.line, self.width
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Script,
    If,
    Else,
    While,
    Break,
    Return,
    Random,
    And,
    Or,

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Equals,
    Bang,
    Less,
    Greater,
    Plus,
    Minus,
    Star,
    Slash,
    Backslash,

    /// Plain or backtick-quoted identifier. The text never includes the
    /// backticks.
    Identifier,
    /// `#` followed by exactly eight hex digits. The text holds the digits.
    Hash,
    Integer,
    Float,
    String,

    NewLine,
}

impl TokenKind {
    pub fn is_number(self) -> bool {
        matches!(self, TokenKind::Integer | TokenKind::Float)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "script" => TokenKind::Script,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "break" => TokenKind::Break,
    "return" => TokenKind::Return,
    "random" => TokenKind::Random,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
};

pub static PUNCTUATION: phf::Map<char, TokenKind> = phf::phf_map! {
    '{' => TokenKind::LBrace,
    '}' => TokenKind::RBrace,
    '[' => TokenKind::LBracket,
    ']' => TokenKind::RBracket,
    '(' => TokenKind::LParen,
    ')' => TokenKind::RParen,
    ',' => TokenKind::Comma,
    '.' => TokenKind::Dot,
    ':' => TokenKind::Colon,
    ';' => TokenKind::Semicolon,
    '=' => TokenKind::Equals,
    '!' => TokenKind::Bang,
    '<' => TokenKind::Less,
    '>' => TokenKind::Greater,
    '+' => TokenKind::Plus,
    '-' => TokenKind::Minus,
    '*' => TokenKind::Star,
    '/' => TokenKind::Slash,
    '\\' => TokenKind::Backslash,
};
