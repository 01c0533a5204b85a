//! Literal values.
use super::{Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};

#[derive(Debug, Clone)]
pub struct Literal {
    pub token: Token,
    pub value: LitValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LitValue {
    Int(u16),
    /// String contents, without the quotes.
    Str(String),
    True,
    False,
    Null,
    This,
}

impl Parse for Literal {
    type Output = Self;
    type Err = ParseError;

    #[inline]
    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        let value = match input.peek_kind()? {
            // Range was checked by the lexer.
            T::Int(value) => LitValue::Int(value),
            T::Str => {
                let span = input.peek()?.span;
                let text = input.fragment_span(&span);
                LitValue::Str(text[1..text.len() - 1].to_owned())
            }
            T::Keyword(K::True) => LitValue::True,
            T::Keyword(K::False) => LitValue::False,
            T::Keyword(K::Null) => LitValue::Null,
            T::Keyword(K::This) => LitValue::This,
            _ => return Err(input.unexpected("literal").into()),
        };

        let token = input.next_token()?;
        Ok(Literal { token, value })
    }
}
