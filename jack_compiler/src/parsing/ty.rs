//! Type annotations.
use super::{ident::Ident, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};
use smol_str::SmolStr;

#[derive(Debug, Clone)]
pub enum Type {
    Int(Token),
    Char(Token),
    Boolean(Token),
    /// User defined or library class.
    Class(Ident),
}

impl Type {
    pub fn name(&self) -> SmolStr {
        match self {
            Type::Int(_) => SmolStr::new("int"),
            Type::Char(_) => SmolStr::new("char"),
            Type::Boolean(_) => SmolStr::new("boolean"),
            Type::Class(ident) => ident.name.clone(),
        }
    }
}

impl Parse for Type {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(K::Int) => Ok(Type::Int(input.next_token()?)),
            T::Keyword(K::Char) => Ok(Type::Char(input.next_token()?)),
            T::Keyword(K::Boolean) => Ok(Type::Boolean(input.next_token()?)),
            T::Ident => Ident::parse(input).map(Type::Class),
            _ => Err(input.unexpected("type").into()),
        }
    }
}

/// Subroutine return type.
#[derive(Debug, Clone)]
pub enum ReturnType {
    Void(Token),
    Type(Type),
}

impl Parse for ReturnType {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        match input.match_token(TokenKind::Keyword(KeywordKind::Void))? {
            Some(token) => Ok(ReturnType::Void(token)),
            None => Type::parse(input).map(ReturnType::Type),
        }
    }
}
