//! Syntactic analysis.
//!
//! Recursive descent over the token stream, one parse routine per
//! grammar rule. The resulting tree is concrete: every terminal token
//! is kept in its node, so the source structure can be written back
//! out exactly as it was parsed.
mod class;
mod delim;
mod expr;
mod func;
mod ident;
mod literal;
mod stmts;
mod ty;
mod unit;
mod visitor;

pub use class::*;
pub use delim::*;
pub use expr::*;
pub use func::*;
pub use ident::*;
pub use literal::*;
pub use stmts::*;
pub use ty::*;
pub use unit::*;
pub use visitor::*;

use crate::{lex::LexError, token_stream::TokenError, token_stream::TokenStream};
use std::{error::Error, fmt};

pub trait Parse: Sized {
    type Output;
    type Err: Error;

    fn parse(input: &mut TokenStream) -> Result<Self::Output, Self::Err>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Token(TokenError),
}

impl ParseError {
    /// The lexical error underneath, when tokenizing failed
    /// rather than the grammar.
    pub fn as_lex_error(&self) -> Option<&LexError> {
        match self {
            ParseError::Token(TokenError::Lex(err)) => Some(err),
            _ => None,
        }
    }
}

impl Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Token(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        ParseError::Token(err)
    }
}
