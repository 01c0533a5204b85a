//! Compilation unit.
use super::{class::Class, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};

/// One source file, holding exactly one class.
#[derive(Debug)]
pub struct CompilationUnit {
    pub class: Class,
    pub eos: Token,
}

impl Parse for CompilationUnit {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let class = Class::parse(input)?;

        // Nothing may follow the class.
        let eos = match input.peek_kind()? {
            TokenKind::EOS => input.next_token()?,
            _ => return Err(input.unexpected("end of source").into()),
        };

        Ok(CompilationUnit { class, eos })
    }
}
