//! Class declarations.
use super::{delim::Delimited, func::SubroutineDec, ident::Ident, ty::Type, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};

#[derive(Debug)]
pub struct Class {
    pub keyword: Token,
    pub name: Ident,
    pub left_brace: Token,
    pub vars: Vec<ClassVarDec>,
    pub subroutines: Vec<SubroutineDec>,
    pub right_brace: Token,
}

/// `static type name (, name)*;` or `field type name (, name)*;`
#[derive(Debug)]
pub struct ClassVarDec {
    pub keyword: Token,
    pub kind: ClassVarKind,
    pub ty: Type,
    pub names: Delimited<Ident>,
    pub semicolon: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

impl Parse for Class {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        let keyword = input.consume(T::Keyword(K::Class))?;
        let name = Ident::parse(input)?;
        let left_brace = input.consume(T::LeftBrace)?;

        let mut vars = vec![];
        while let T::Keyword(K::Static | K::Field) = input.peek_kind()? {
            vars.push(ClassVarDec::parse(input)?);
        }

        let mut subroutines = vec![];
        while let T::Keyword(K::Constructor | K::Function | K::Method) = input.peek_kind()? {
            subroutines.push(SubroutineDec::parse(input)?);
        }

        let right_brace = input.consume(T::RightBrace)?;

        Ok(Class {
            keyword,
            name,
            left_brace,
            vars,
            subroutines,
            right_brace,
        })
    }
}

impl Parse for ClassVarDec {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;

        let kind = match input.peek_kind()? {
            TokenKind::Keyword(K::Static) => ClassVarKind::Static,
            TokenKind::Keyword(K::Field) => ClassVarKind::Field,
            _ => return Err(input.unexpected("class variable declaration").into()),
        };
        let keyword = input.next_token()?;
        let ty = Type::parse(input)?;
        let names = Delimited::parse_with(input, Ident::parse)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(ClassVarDec {
            keyword,
            kind,
            ty,
            names,
            semicolon,
        })
    }
}
