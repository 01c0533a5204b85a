use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{Token, TokenKind},
};
use smol_str::SmolStr;

/// Name of a class, subroutine or variable.
#[derive(Debug, Clone)]
pub struct Ident {
    pub token: Token,
    pub name: SmolStr,
}

impl Parse for Ident {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let token = input.consume(TokenKind::Ident)?;
        let name = input.fragment_span(&token.span).into();
        Ok(Ident { token, name })
    }
}
