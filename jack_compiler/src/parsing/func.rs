//! Subroutine declarations.
use super::{
    delim::Delimited,
    ident::Ident,
    stmts::Statements,
    ty::{ReturnType, Type},
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};

#[derive(Debug)]
pub struct SubroutineDec {
    pub keyword: Token,
    pub kind: SubroutineKind,
    pub ret: ReturnType,
    pub name: Ident,
    pub left_paren: Token,
    pub params: Delimited<Param>,
    pub right_paren: Token,
    pub body: SubroutineBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    /// Allocates and returns a new instance.
    Constructor,
    /// Static subroutine, no receiver.
    Function,
    /// Operates on `this`, passed as a hidden first argument.
    Method,
}

#[derive(Debug)]
pub struct Param {
    pub ty: Type,
    pub name: Ident,
}

#[derive(Debug)]
pub struct SubroutineBody {
    pub left_brace: Token,
    pub vars: Vec<VarDec>,
    pub stmts: Statements,
    pub right_brace: Token,
}

/// `var type name (, name)*;`
#[derive(Debug)]
pub struct VarDec {
    pub keyword: Token,
    pub ty: Type,
    pub names: Delimited<Ident>,
    pub semicolon: Token,
}

impl Parse for SubroutineDec {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;

        let kind = match input.peek_kind()? {
            TokenKind::Keyword(K::Constructor) => SubroutineKind::Constructor,
            TokenKind::Keyword(K::Function) => SubroutineKind::Function,
            TokenKind::Keyword(K::Method) => SubroutineKind::Method,
            _ => return Err(input.unexpected("subroutine declaration").into()),
        };
        let keyword = input.next_token()?;
        let ret = ReturnType::parse(input)?;
        let name = Ident::parse(input)?;
        let left_paren = input.consume(TokenKind::LeftParen)?;
        let params = if input.peek_kind()? == TokenKind::RightParen {
            Delimited::empty()
        } else {
            Delimited::parse_with(input, Param::parse)?
        };
        let right_paren = input.consume(TokenKind::RightParen)?;
        let body = SubroutineBody::parse(input)?;

        Ok(Self {
            keyword,
            kind,
            ret,
            name,
            left_paren,
            params,
            right_paren,
            body,
        })
    }
}

impl Parse for Param {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let ty = Type::parse(input)?;
        let name = Ident::parse(input)?;
        Ok(Param { ty, name })
    }
}

impl Parse for SubroutineBody {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_brace = input.consume(TokenKind::LeftBrace)?;

        let mut vars = vec![];
        while input.peek_kind()? == TokenKind::Keyword(KeywordKind::Var) {
            vars.push(VarDec::parse(input)?);
        }

        let stmts = Statements::parse(input)?;
        let right_brace = input.consume(TokenKind::RightBrace)?;

        Ok(SubroutineBody {
            left_brace,
            vars,
            stmts,
            right_brace,
        })
    }
}

impl Parse for VarDec {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Var))?;
        let ty = Type::parse(input)?;
        let names = Delimited::parse_with(input, Ident::parse)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(VarDec {
            keyword,
            ty,
            names,
            semicolon,
        })
    }
}
