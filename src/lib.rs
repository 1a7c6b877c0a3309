use std::fmt;

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The generator takes an AST, lowering and encoding it into bytecode.
pub mod code_gen;

pub mod ast;
pub mod bytecode;
pub mod token;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use code_gen::Options;

/// Compiles QB source into bytecode: tokenize, parse, then generate.
pub fn compile(src: &str, options: &Options) -> Result<Vec<u8>, Error> {
    let tokens = lexer::tokenize(src)?;
    log::debug!("lexed {} tokens", tokens.len());

    let root = parser::parse(&tokens)?;
    if log::log_enabled!(log::Level::Trace) {
        log::trace!("tree:\n{}", util::fmt::tree::Tree(&root));
    }

    let code = code_gen::Generator::with_options(options.clone()).generate(&root)?;
    log::debug!("compiled {} source bytes into {} bytes", src.len(), code.len());
    Ok(code)
}

#[derive(Debug)]
pub enum Error {
    Lex(lexer::Error),
    Parse(parser::Error),
    CodeGen(code_gen::Error),
}

impl From<lexer::Error> for Error {
    fn from(error: lexer::Error) -> Self {
        Error::Lex(error)
    }
}

impl From<parser::Error> for Error {
    fn from(error: parser::Error) -> Self {
        Error::Parse(error)
    }
}

impl From<code_gen::Error> for Error {
    fn from(error: code_gen::Error) -> Self {
        Error::CodeGen(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(error) => write!(f, "lex error: {error}"),
            Error::Parse(error) => write!(f, "parse error: {error}"),
            Error::CodeGen(error) => write!(f, "code generation error: {error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(error) => Some(error),
            Error::Parse(error) => Some(error),
            Error::CodeGen(error) => Some(error),
        }
    }
}
