//! Statement parsing.
use super::{
    expr::{Expr, Subscript, SubroutineCall},
    ident::Ident,
    Parse, ParseError,
};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};

/// Sequence of zero or more statements.
#[derive(Debug, Default)]
pub struct Statements {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Stmt {
    Let(LetStmt),
    If(IfStmt),
    While(WhileStmt),
    Do(DoStmt),
    Return(ReturnStmt),
}

/// `let name = expr;` or `let name[index] = expr;`
#[derive(Debug)]
pub struct LetStmt {
    pub keyword: Token,
    pub name: Ident,
    pub index: Option<Subscript>,
    pub eq: Token,
    pub rhs: Expr,
    pub semicolon: Token,
}

#[derive(Debug)]
pub struct IfStmt {
    pub keyword: Token,
    pub cond: Condition,
    pub then: Block,
    pub else_clause: Option<ElseClause>,
}

#[derive(Debug)]
pub struct ElseClause {
    pub keyword: Token,
    pub block: Block,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub keyword: Token,
    pub cond: Condition,
    pub body: Block,
}

#[derive(Debug)]
pub struct DoStmt {
    pub keyword: Token,
    pub call: SubroutineCall,
    pub semicolon: Token,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
    pub semicolon: Token,
}

/// Parenthesised condition of `if` and `while`.
#[derive(Debug)]
pub struct Condition {
    pub left_paren: Token,
    pub expr: Expr,
    pub right_paren: Token,
}

/// Braced statements of `if`, `else` and `while`.
#[derive(Debug)]
pub struct Block {
    pub left_brace: Token,
    pub stmts: Statements,
    pub right_brace: Token,
}

impl Parse for Statements {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        let mut stmts = vec![];

        while let T::Keyword(K::Let | K::If | K::While | K::Do | K::Return) = input.peek_kind()? {
            stmts.push(Stmt::parse(input)?);
        }

        Ok(Statements { stmts })
    }
}

impl Parse for Stmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Keyword(K::Let) => LetStmt::parse(input).map(Stmt::Let),
            T::Keyword(K::If) => IfStmt::parse(input).map(Stmt::If),
            T::Keyword(K::While) => WhileStmt::parse(input).map(Stmt::While),
            T::Keyword(K::Do) => DoStmt::parse(input).map(Stmt::Do),
            T::Keyword(K::Return) => ReturnStmt::parse(input).map(Stmt::Return),
            _ => Err(input.unexpected("statement").into()),
        }
    }
}

impl Parse for LetStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Let))?;
        let name = Ident::parse(input)?;
        let index = match input.peek_kind()? {
            TokenKind::LeftBracket => Some(Subscript::parse(input)?),
            _ => None,
        };
        let eq = input.consume(TokenKind::Eq)?;
        let rhs = Expr::parse(input)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(LetStmt {
            keyword,
            name,
            index,
            eq,
            rhs,
            semicolon,
        })
    }
}

impl Parse for IfStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::If))?;
        let cond = Condition::parse(input)?;
        let then = Block::parse(input)?;
        let else_clause = match input.match_token(TokenKind::Keyword(KeywordKind::Else))? {
            Some(keyword) => Some(ElseClause {
                keyword,
                block: Block::parse(input)?,
            }),
            None => None,
        };

        Ok(IfStmt {
            keyword,
            cond,
            then,
            else_clause,
        })
    }
}

impl Parse for WhileStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::While))?;
        let cond = Condition::parse(input)?;
        let body = Block::parse(input)?;

        Ok(WhileStmt {
            keyword,
            cond,
            body,
        })
    }
}

impl Parse for DoStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Do))?;
        let call = SubroutineCall::parse(input)?;
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(DoStmt {
            keyword,
            call,
            semicolon,
        })
    }
}

impl Parse for ReturnStmt {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let keyword = input.consume(TokenKind::Keyword(KeywordKind::Return))?;
        let value = match input.peek_kind()? {
            TokenKind::Semicolon => None,
            _ => Some(Expr::parse(input)?),
        };
        let semicolon = input.consume(TokenKind::Semicolon)?;

        Ok(ReturnStmt {
            keyword,
            value,
            semicolon,
        })
    }
}

impl Parse for Condition {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_paren = input.consume(TokenKind::LeftParen)?;
        let expr = Expr::parse(input)?;
        let right_paren = input.consume(TokenKind::RightParen)?;

        Ok(Condition {
            left_paren,
            expr,
            right_paren,
        })
    }
}

impl Parse for Block {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_brace = input.consume(TokenKind::LeftBrace)?;
        let stmts = Statements::parse(input)?;
        let right_brace = input.consume(TokenKind::RightBrace)?;

        Ok(Block {
            left_brace,
            stmts,
            right_brace,
        })
    }
}
