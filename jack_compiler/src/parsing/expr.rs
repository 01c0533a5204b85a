//! Expressions.
use super::{delim::Delimited, ident::Ident, literal::Literal, Parse, ParseError};
use crate::{
    token_stream::TokenStream,
    tokens::{KeywordKind, Token, TokenKind},
};

/// `term (op term)*`
///
/// Operators have no precedence. The tail is kept in source order
/// and evaluated left to right.
#[derive(Debug)]
pub struct Expr {
    pub head: Term,
    pub tail: Vec<(BinOp, Term)>,
}

#[derive(Debug)]
pub enum Term {
    Literal(Literal),
    /// Plain variable reference.
    Var(Ident),
    /// Array element, `name[expr]`.
    Index(Ident, Subscript),
    Call(SubroutineCall),
    Paren(ParenExpr),
    Unary(UnaryOp, Box<Term>),
}

#[derive(Debug)]
pub struct ParenExpr {
    pub left_paren: Token,
    pub expr: Box<Expr>,
    pub right_paren: Token,
}

/// `[expr]`
#[derive(Debug)]
pub struct Subscript {
    pub left_bracket: Token,
    pub expr: Box<Expr>,
    pub right_bracket: Token,
}

/// `name(args)` or `receiver.name(args)`.
#[derive(Debug)]
pub struct SubroutineCall {
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub left_paren: Token,
    pub args: Delimited<Expr>,
    pub right_paren: Token,
}

/// Class or variable name before the dot of a call.
#[derive(Debug)]
pub struct Receiver {
    pub ident: Ident,
    pub dot: Token,
}

#[derive(Debug, Clone)]
pub struct BinOp {
    pub token: Token,
    pub kind: BinOpKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Lt,
    Gt,
    Eq,
}

impl BinOpKind {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        use TokenKind as T;
        match kind {
            T::Plus => Some(Self::Add),
            T::Minus => Some(Self::Sub),
            T::Star => Some(Self::Mul),
            T::Slash => Some(Self::Div),
            T::Amp => Some(Self::And),
            T::Pipe => Some(Self::Or),
            T::Lt => Some(Self::Lt),
            T::Gt => Some(Self::Gt),
            T::Eq => Some(Self::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub token: Token,
    pub kind: UnaryOpKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    /// Arithmetic negation, `-`
    Neg,
    /// Bitwise not, `~`
    Not,
}

impl Parse for Expr {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let head = Term::parse(input)?;
        let mut tail = vec![];

        while let Some(kind) = BinOpKind::from_token_kind(input.peek_kind()?) {
            let token = input.next_token()?;
            let term = Term::parse(input)?;
            tail.push((BinOp { token, kind }, term));
        }

        Ok(Expr { head, tail })
    }
}

impl Parse for Term {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        use KeywordKind as K;
        use TokenKind as T;

        match input.peek_kind()? {
            T::Int(_)
            | T::Str
            | T::Keyword(K::True)
            | T::Keyword(K::False)
            | T::Keyword(K::Null)
            | T::Keyword(K::This) => Literal::parse(input).map(Term::Literal),
            // An identifier needs a second token of lookahead to
            // tell variables, array elements and calls apart.
            T::Ident => match input.peek_second()? {
                T::LeftBracket => {
                    let ident = Ident::parse(input)?;
                    let subscript = Subscript::parse(input)?;
                    Ok(Term::Index(ident, subscript))
                }
                T::LeftParen | T::Dot => SubroutineCall::parse(input).map(Term::Call),
                _ => Ident::parse(input).map(Term::Var),
            },
            T::LeftParen => ParenExpr::parse(input).map(Term::Paren),
            T::Minus | T::Tilde => {
                let token = input.next_token()?;
                let kind = match token.kind {
                    T::Minus => UnaryOpKind::Neg,
                    _ => UnaryOpKind::Not,
                };
                let term = Term::parse(input)?;
                Ok(Term::Unary(UnaryOp { token, kind }, Box::new(term)))
            }
            _ => Err(input.unexpected("term").into()),
        }
    }
}

impl Parse for ParenExpr {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_paren = input.consume(TokenKind::LeftParen)?;
        let expr = Box::new(Expr::parse(input)?);
        let right_paren = input.consume(TokenKind::RightParen)?;

        Ok(ParenExpr {
            left_paren,
            expr,
            right_paren,
        })
    }
}

impl Parse for Subscript {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let left_bracket = input.consume(TokenKind::LeftBracket)?;
        let expr = Box::new(Expr::parse(input)?);
        let right_bracket = input.consume(TokenKind::RightBracket)?;

        Ok(Subscript {
            left_bracket,
            expr,
            right_bracket,
        })
    }
}

impl Parse for SubroutineCall {
    type Output = Self;
    type Err = ParseError;

    fn parse(input: &mut TokenStream) -> Result<Self, ParseError> {
        let first = Ident::parse(input)?;

        let (receiver, name) = match input.match_token(TokenKind::Dot)? {
            Some(dot) => (Some(Receiver { ident: first, dot }), Ident::parse(input)?),
            None => (None, first),
        };

        let left_paren = input.consume(TokenKind::LeftParen)?;
        let args = if input.peek_kind()? == TokenKind::RightParen {
            Delimited::empty()
        } else {
            Delimited::parse_with(input, Expr::parse)?
        };
        let right_paren = input.consume(TokenKind::RightParen)?;

        Ok(SubroutineCall {
            receiver,
            name,
            left_paren,
            args,
            right_paren,
        })
    }
}
