//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    string::FromUtf8Error,
};

use crate::asm::Token;

pub type HackResult<T> = std::result::Result<T, HackError>;

#[derive(Debug)]
pub enum HackError {
    /// Malformed assembly source.
    Asm(AsmError),
    /// Malformed VM command text.
    Vm(VmError),
    Io(io::Error),
    Utf8(FromUtf8Error),
    Fmt(fmt::Error),
}

impl Display for HackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asm(err) => write!(f, "assembly error: {}", err),
            Self::Vm(err) => write!(f, "vm error: {}", err),
            Self::Io(err) => write!(f, "{}", err),
            Self::Utf8(err) => write!(f, "source is not valid utf-8: {}", err),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AsmError> for HackError {
    fn from(err: AsmError) -> Self {
        HackError::Asm(err)
    }
}

impl From<VmError> for HackError {
    fn from(err: VmError) -> Self {
        HackError::Vm(err)
    }
}

impl From<io::Error> for HackError {
    fn from(err: io::Error) -> Self {
        HackError::Io(err)
    }
}

impl From<FromUtf8Error> for HackError {
    fn from(err: FromUtf8Error) -> Self {
        HackError::Utf8(err)
    }
}

impl From<fmt::Error> for HackError {
    fn from(err: fmt::Error) -> Self {
        HackError::Fmt(err)
    }
}

/// Assembly error pointing at the offending token.
#[derive(Debug)]
pub struct AsmError {
    pub message: String,
    /// 1-based line number of the token.
    pub line: usize,
    /// 1-based column of the token.
    pub column: usize,
    /// Source line surrounding the token, without the newline.
    pub source_line: String,
}

impl AsmError {
    pub fn new(source_code: &str, token: &Token, message: impl ToString) -> Self {
        let (line_text, line_span) = token.span.surrounding_line(source_code);
        let line = source_code[..line_span.index as usize]
            .chars()
            .filter(|c| *c == '\n')
            .count()
            + 1;
        let column = source_code[line_span.index as usize..token.span.index as usize]
            .chars()
            .count()
            + 1;

        Self {
            message: message.to_string(),
            line,
            column,
            source_line: line_text.trim_end_matches(['\r', '\n']).to_owned(),
        }
    }
}

impl Display for AsmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:{}: {}", self.line, self.column, self.message)?;
        writeln!(f, "    {}", self.source_line)?;
        write!(f, "    {:>width$}", "^", width = self.column)
    }
}

impl std::error::Error for AsmError {}

/// Error in VM command text.
#[derive(Debug)]
pub struct VmError {
    /// 1-based line number, or 0 when the command did not come from text.
    pub line: usize,
    pub message: String,
}

impl VmError {
    pub fn new(line: usize, message: impl ToString) -> Self {
        Self {
            line,
            message: message.to_string(),
        }
    }
}

impl Display for VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "line {}: {}", self.line, self.message)
        }
    }
}

impl std::error::Error for VmError {}
