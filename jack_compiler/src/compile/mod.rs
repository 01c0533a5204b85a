//! Semantic analysis and code generation.
mod codegen;
mod symbol;
mod writer;

pub use codegen::CodeGen;
pub use symbol::{Scope, Symbol, SymbolKind, SymbolTable};
pub use writer::VmWriter;

use crate::{lex::LexError, parsing::ParseError, tokens::Span};
use std::{error, fmt, io};

pub type CompileResult<T> = std::result::Result<T, CompileError>;

#[derive(Debug)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Resolution(ResolutionError),
    Limit(LimitError),
    Io(io::Error),
    Fmt(fmt::Error),
}

impl error::Error for CompileError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            CompileError::Lex(err) => Some(err),
            CompileError::Parse(err) => Some(err),
            CompileError::Resolution(err) => Some(err),
            CompileError::Limit(err) => Some(err),
            CompileError::Io(err) => Some(err),
            CompileError::Fmt(err) => Some(err),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Lex(err) => write!(f, "lexical error: {}", err),
            CompileError::Parse(err) => write!(f, "syntax error: {}", err),
            CompileError::Resolution(err) => write!(f, "resolution error: {}", err),
            CompileError::Limit(err) => write!(f, "limit error: {}", err),
            CompileError::Io(err) => write!(f, "{}", err),
            CompileError::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        // Tokenizing failures travel through the parser, but
        // they are still lexical.
        match err.as_lex_error() {
            Some(lex_err) => CompileError::Lex(lex_err.clone()),
            None => CompileError::Parse(err),
        }
    }
}

impl From<ResolutionError> for CompileError {
    fn from(err: ResolutionError) -> Self {
        CompileError::Resolution(err)
    }
}

impl From<LimitError> for CompileError {
    fn from(err: LimitError) -> Self {
        CompileError::Limit(err)
    }
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::Io(err)
    }
}

impl From<fmt::Error> for CompileError {
    fn from(err: fmt::Error) -> Self {
        CompileError::Fmt(err)
    }
}

/// Identifier in a value position that names no variable
/// in either scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    pub name: String,
    pub span: Span,
    /// Construct the name was used in.
    pub context: &'static str,
}

impl error::Error for ResolutionError {}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: undefined variable '{}' in {}", self.span, self.name, self.context)
    }
}

/// Count that does not fit a 16-bit operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitError {
    /// What was counted.
    pub what: &'static str,
    pub span: Span,
}

impl error::Error for LimitError {}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: number of {} exceeds {}", self.span, self.what, u16::MAX)
    }
}
