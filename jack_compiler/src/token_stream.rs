//! Buffered stream of tokens for look ahead.
use crate::{
    lex::{LexError, Lexer},
    tokens::{Span, Token, TokenKind},
};

use itertools::{multipeek, MultiPeek};
use std::{error, fmt, iter::Iterator};

/// Buffered stream of tokens that allows arbitrary look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
///
/// Unlike the `MultiPeek` it wraps, the peek methods here are
/// idempotent. Each resets the peek cursor before looking, so
/// `peek` always returns the next token and `peek_second` always
/// the one after it.
pub struct TokenStream<'a> {
    lexer: MultiPeek<Lexer<'a>>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    source: &'a str,
}

impl<'a> TokenStream<'a> {
    #[inline]
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            source: lexer.source_code(),
            lexer: multipeek(lexer),
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub fn fragment_span(&self, span: &Span) -> &'a str {
        span.fragment(self.source)
    }

    /// Human readable description of a token, for error messages.
    pub fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::EOS => token.kind.to_string(),
            _ => format!("'{}'", self.fragment_span(&token.span)),
        }
    }

    /// Consumes the current token regardless of type.
    #[inline]
    pub fn next_token(&mut self) -> Result<Token, TokenError> {
        match self.lexer.next() {
            Some(result) => result.map_err(TokenError::Lex),
            None => Err(TokenError::EndOfSource),
        }
    }

    /// Consumes the current token if it matches the given token type.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> Result<Option<Token>, TokenError> {
        if self.peek_kind()? == token_kind {
            self.next_token().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Return the current token with advancing the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a mismatch error is returned.
    pub fn consume(&mut self, token_kind: TokenKind) -> Result<Token, TokenError> {
        // We should not consume the token if the types don't match.
        let token = self.peek()?;
        if token.kind != token_kind {
            let token = token.clone();
            return Err(TokenError::Mismatch {
                expected: token_kind,
                encountered: token.kind,
                found: self.describe(&token),
                span: token.span,
            });
        }

        self.next_token()
    }

    /// Return the current token without advancing the cursor.
    pub fn peek(&mut self) -> Result<&Token, TokenError> {
        self.lexer.reset_peek();
        match self.lexer.peek() {
            Some(result) => result.as_ref().map_err(|err| TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource),
        }
    }

    #[inline]
    pub fn peek_kind(&mut self) -> Result<TokenKind, TokenError> {
        self.peek().map(|token| token.kind)
    }

    /// Kind of the token after the current one, without advancing.
    pub fn peek_second(&mut self) -> Result<TokenKind, TokenError> {
        // The current token must lex before the one after it matters.
        self.peek()?;

        let result = match self.lexer.peek() {
            Some(Ok(token)) => Ok(token.kind),
            Some(Err(err)) => Err(TokenError::Lex(err.clone())),
            None => Err(TokenError::EndOfSource),
        };
        self.lexer.reset_peek();
        result
    }

    /// Build an error for a token that fits none of the alternatives
    /// a grammar rule accepts.
    pub fn unexpected(&mut self, expected: &'static str) -> TokenError {
        let token = match self.peek() {
            Ok(token) => token.clone(),
            Err(err) => return err,
        };

        TokenError::Unexpected {
            expected,
            encountered: token.kind,
            found: self.describe(&token),
            span: token.span,
        }
    }
}

/// Error returned when an unexpected token type is encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Mismatch {
        expected: TokenKind,
        encountered: TokenKind,
        /// Source text of the encountered token.
        found: String,
        span: Span,
    },
    Unexpected {
        /// Description of what the grammar allows here.
        expected: &'static str,
        encountered: TokenKind,
        found: String,
        span: Span,
    },
    EndOfSource,
    Lex(LexError),
}

impl error::Error for TokenError {}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenError as E;
        match self {
            E::Mismatch {
                expected,
                found,
                span,
                ..
            } => write!(f, "{}: expected {}, found {}", span, expected, found),
            E::Unexpected {
                expected,
                found,
                span,
                ..
            } => write!(f, "{}: expected {}, found {}", span, expected, found),
            E::EndOfSource => write!(f, "unexpected end of source code"),
            E::Lex(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl From<LexError> for TokenError {
    fn from(err: LexError) -> Self {
        TokenError::Lex(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokens::KeywordKind;

    #[test]
    fn test_peek_is_idempotent() {
        let mut stream = TokenStream::new(Lexer::new("a.b(1)"));
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);
        assert_eq!(stream.peek_second().unwrap(), TokenKind::Dot);
        assert_eq!(stream.peek_second().unwrap(), TokenKind::Dot);
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Ident);

        let ident = stream.consume(TokenKind::Ident).unwrap();
        assert_eq!(stream.fragment_span(&ident.span), "a");
        assert_eq!(stream.peek_kind().unwrap(), TokenKind::Dot);
    }

    #[test]
    fn test_consume_mismatch_does_not_advance() {
        let mut stream = TokenStream::new(Lexer::new("return;"));
        let err = stream.consume(TokenKind::Ident).unwrap_err();
        assert!(matches!(
            err,
            TokenError::Mismatch {
                expected: TokenKind::Ident,
                encountered: TokenKind::Keyword(KeywordKind::Return),
                ..
            }
        ));
        assert_eq!(err.to_string(), "1:1: expected identifier, found 'return'");
        assert!(stream.match_token(TokenKind::Keyword(KeywordKind::Return)).unwrap().is_some());
        assert!(stream.match_token(TokenKind::Dot).unwrap().is_none());
        assert!(stream.consume(TokenKind::Semicolon).is_ok());
        assert!(stream.consume(TokenKind::EOS).is_ok());
        assert_eq!(stream.next_token().unwrap_err(), TokenError::EndOfSource);
    }

    #[test]
    fn test_lex_error_surfaces_on_peek() {
        let mut stream = TokenStream::new(Lexer::new("x 99999"));
        assert_eq!(
            stream.peek_second().unwrap_err().to_string(),
            "1:3: integer constant 99999 out of range 0..=32767"
        );
        assert!(stream.consume(TokenKind::Ident).is_ok());
        assert!(matches!(stream.peek(), Err(TokenError::Lex(_))));
    }
}
