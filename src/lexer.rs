use std::fmt;

use crate::token::{Token, TokenKind, KEYWORDS, PUNCTUATION};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string into a new token buffer.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() + 1));
    tokenize_into(src, &mut tokens)?;
    Ok(tokens)
}

/// Lexes the provided string, producing the tokens into the provided buffer.
///
/// On failure the buffer holds every token produced before the error.
pub fn tokenize_into(src: &str, tokens: &mut Vec<Token>) -> Result<(), Error> {
    Lexer::new(src, tokens).lex()
}

/// The QB source lexer.
struct Lexer<'src, 'tok> {
    src: &'src str,
    /// Byte offset of the next character.
    cursor: usize,
    /// Line of the next character.
    line: u32,
    /// Number of characters consumed so far.
    consumed: u32,
    mark: Mark,
    tokens: &'tok mut Vec<Token>,
}

#[derive(Copy, Clone)]
struct Mark {
    cursor: usize,
    line: u32,
    consumed: u32,
}

impl<'src> Lexer<'src, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) -> Result<(), Error> {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            self.mark();
            let Some(c) = self.peek() else {
                return Ok(());
            };
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.new_line();
                }
                '\\' if self.at_escaped_line_break() => self.escaped_line_break(),
                '/' if self.peek_nth(1) == Some('/') => self.line_comment(),
                '/' if self.peek_nth(1) == Some('*') => self.block_comment()?,
                '"' => self.string()?,
                '`' => self.quoted_identifier()?,
                '#' => self.hash()?,
                c if c.is_ascii_digit() => self.number(),
                c if is_identifier_char(c) => self.identifier_or_keyword(),
                c => match PUNCTUATION.get(&c).copied() {
                    Some(kind) => {
                        self.advance();
                        self.produce(kind, c);
                    }
                    None => return Err(self.error(ErrorKind::UnexpectedChar(c))),
                },
            }
        }
    }

    /// Consecutive line breaks collapse into a single token.
    fn new_line(&mut self) {
        if self.tokens.last().is_some_and(|t| t.is(TokenKind::NewLine)) {
            return;
        }
        self.produce(TokenKind::NewLine, "\n");
    }

    fn at_escaped_line_break(&self) -> bool {
        match self.peek_nth(1) {
            Some('\n') => true,
            Some('\r') => self.peek_nth(2) == Some('\n'),
            _ => false,
        }
    }

    fn escaped_line_break(&mut self) {
        assert_eq!(self.advance(), Some('\\'));
        if self.peek() == Some('\r') {
            self.advance();
        }
        assert_eq!(self.advance(), Some('\n'));
    }

    fn line_comment(&mut self) {
        while !matches!(self.peek(), Some('\n') | None) {
            self.advance();
        }
    }

    /// Block comments nest: every `/*` needs its own `*/`.
    fn block_comment(&mut self) -> Result<(), Error> {
        self.advance_by(2);
        let mut depth = 1_u32;
        while depth > 0 {
            match (self.peek(), self.peek_nth(1)) {
                (None, _) => return Err(self.error_at_mark(ErrorKind::UnterminatedComment)),
                (Some('/'), Some('*')) => {
                    self.advance_by(2);
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.advance_by(2);
                    depth -= 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn string(&mut self) -> Result<(), Error> {
        assert_eq!(self.advance(), Some('"'));
        let mut buf = String::new();
        loop {
            let Some(current) = self.advance() else {
                return Err(self.error_at_mark(ErrorKind::UnterminatedString));
            };
            let char = match current {
                '"' => break,
                '\\' => match self.advance() {
                    None => return Err(self.error_at_mark(ErrorKind::UnterminatedString)),
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    // Covers `\\` and `\"`; unknown escapes keep the character.
                    Some(other) => other,
                },
                other => other,
            };
            buf.push(char);
        }
        self.produce(TokenKind::String, buf);
        Ok(())
    }

    /// Backtick identifiers may contain any character (spaces and line breaks
    /// included) except another backtick.
    fn quoted_identifier(&mut self) -> Result<(), Error> {
        assert_eq!(self.advance(), Some('`'));
        let lo = self.cursor;
        loop {
            match self.advance() {
                None => return Err(self.error_at_mark(ErrorKind::UnterminatedIdentifier)),
                Some('`') => break,
                Some(_) => (),
            }
        }
        let name = self.slice(lo, self.cursor - 1);
        self.produce(TokenKind::Identifier, name);
        Ok(())
    }

    fn hash(&mut self) -> Result<(), Error> {
        assert_eq!(self.advance(), Some('#'));
        let lo = self.cursor;
        while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.advance();
        }
        let digits = self.slice(lo, self.cursor);
        if digits.len() != 8 || self.peek().is_some_and(is_identifier_char) {
            return Err(self.error_at_mark(ErrorKind::InvalidHash));
        }
        self.produce(TokenKind::Hash, digits);
        Ok(())
    }

    /// Integers are decimal or `0x`-prefixed hexadecimal. Floats need at least
    /// one digit on each side of the point. A digit run that continues into
    /// identifier characters is an identifier instead (`2D_Thing`).
    fn number(&mut self) {
        let is_hex = self.peek() == Some('0')
            && matches!(self.peek_nth(1), Some('x' | 'X'))
            && self.peek_nth(2).is_some_and(|c| c.is_ascii_hexdigit());
        if is_hex {
            self.advance_by(2);
            self.advance_while(|c| c.is_ascii_hexdigit());
        } else {
            self.advance_while(|c| c.is_ascii_digit());
            let is_float =
                self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit());
            if is_float {
                self.advance();
                self.advance_while(|c| c.is_ascii_digit());
                self.produce(TokenKind::Float, self.substr());
                return;
            }
        }
        if self.peek().is_some_and(is_identifier_char) {
            self.identifier_or_keyword();
            return;
        }
        self.produce(TokenKind::Integer, self.substr());
    }

    /// Scans the identifier run from the current mark. Since the whole run is
    /// consumed before the keyword lookup, keywords never clip identifiers
    /// such as `while_1`.
    fn identifier_or_keyword(&mut self) {
        self.advance_while(is_identifier_char);
        let substr = self.substr();
        let kind = KEYWORDS
            .get(substr)
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.produce(kind, substr);
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &'src str {
        self.slice(self.mark.cursor, self.cursor)
    }

    fn slice(&self, lo: usize, hi: usize) -> &'src str {
        let src = self.src;
        &src[lo..hi]
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        let mark = Mark {
            cursor: 0,
            line: 1,
            consumed: 0,
        };
        Lexer {
            src,
            cursor: 0,
            line: 1,
            consumed: 0,
            mark,
            tokens,
        }
    }

    /// Starts a new token "mark".
    fn mark(&mut self) {
        self.mark = Mark {
            cursor: self.cursor,
            line: self.line,
            consumed: self.consumed,
        };
    }

    /// Returns the next character and advances.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        self.consumed += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn advance_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while self.peek().is_some_and(&mut predicate) {
            self.advance();
        }
    }

    /// Returns the next character without advancing.
    fn peek(&self) -> Option<char> {
        self.src[self.cursor..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.cursor..].chars().nth(n)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind, text: impl Into<String>) {
        let width = self.consumed - self.mark.consumed;
        let text = text.into();
        self.tokens
            .push(Token::new(kind, text, self.mark.line, width));
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error {
            kind,
            line: self.line,
        }
    }

    fn error_at_mark(&self, kind: ErrorKind) -> Error {
        Error {
            kind,
            line: self.mark.line,
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    /// Line at which the failing construct starts.
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnterminatedString,
    UnterminatedIdentifier,
    UnterminatedComment,
    /// `#` not followed by exactly eight hex digits.
    InvalidHash,
    UnexpectedChar(char),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match self.kind {
            ErrorKind::UnterminatedString => write!(f, "unterminated string"),
            ErrorKind::UnterminatedIdentifier => write!(f, "unterminated quoted identifier"),
            ErrorKind::UnterminatedComment => write!(f, "unterminated comment"),
            ErrorKind::InvalidHash => write!(f, "hash literal must have exactly 8 hex digits"),
            ErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
        }
    }
}

impl std::error::Error for Error {}
