//! Assembler
mod assembler;
mod cursor;
mod lexer;
mod tokens;

use std::fmt::Write;

use crate::error::HackResult;

/// Translate Hack assembly source into machine words.
pub fn assemble(source_code: impl AsRef<str>) -> HackResult<Vec<u16>> {
    let lexer = Lexer::new(source_code.as_ref());
    let asm = Assembler::new(lexer);
    asm.parse()
}

/// Render machine words as the textual `.hack` format,
/// one 16 digit binary line per word.
pub fn to_hack_text(words: &[u16]) -> HackResult<String> {
    let mut text = String::with_capacity(words.len() * 17);
    for word in words {
        writeln!(text, "{word:016b}")?;
    }
    Ok(text)
}

pub use self::{
    assembler::Assembler,
    lexer::Lexer,
    tokens::{Addr, Span, Token, TokenKind},
};
