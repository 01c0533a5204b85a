//! Lexical analysis
use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Span, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        // For what it's worth, the cursor gets to decide what the
        // initial byte position is.
        let start_pos = cursor.offset();

        Self {
            cursor,
            original: source_code,
            start_pos,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// The internal iteration of the lexer follows this convention:
    ///
    /// Each iteration (`next_token` call) starts with the assumption that
    /// the internal cursor is pointing to the start of the remaining source
    /// to be consumed.
    ///
    /// Initially, the lexer must be constructed with a cursor pointing to
    /// the start of the source.
    ///
    /// When an iteration is done building a token, it must leave the cursor
    /// at the start of the next token's text. It may not finish leaving the
    /// cursor pointing into its own token.
    pub fn next_token(&mut self) -> Token {
        use TokenKind as TK;

        // Erase leading whitespace.
        while is_whitespace(self.cursor.current()) {
            self.cursor.next();
        }

        // Erase comment line.
        if self.cursor.current() == '/' && self.cursor.peek() == '/' {
            self.erase_comment();
        }

        // Assume that lexer initialization, or previous iteration,
        // leaves the cursor at the next character.
        self.start_token();

        match self.cursor.current() {
            '@' => self.make_token(TK::At),
            '(' => self.make_token(TK::LeftParen),
            ')' => self.make_token(TK::RightParen),
            '=' => self.make_token(TK::Eq),
            ';' => self.make_token(TK::Semicolon),
            '+' => self.make_token(TK::Plus),
            '-' => self.make_token(TK::Minus),
            '!' => self.make_token(TK::Bang),
            '&' => self.make_token(TK::Amp),
            '|' => self.make_token(TK::Pipe),
            '\r' => {
                // Windows :(
                if self.cursor.peek() == '\n' {
                    self.cursor.next();
                }
                self.make_token(TK::Newline)
            }
            '\n' => self.make_token(TK::Newline),
            c if is_symbol_start(c) => self.consume_ident(),
            '0'..='9' => self.consume_number(),

            EOF_CHAR => self.make_token(TK::EOF),
            _ => self.make_token(TK::Unknown),
        }
    }

    /// Indicates whether the lexer is at the end of the source.
    ///
    /// Note that source can contain '\0' (end-of-file) characters,
    /// but not be at the actual end. It's thus important to verify
    /// with this function whenever a [`TokenKind::EOF`] is encountered.
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&mut self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Build a token, using the source text from the position
    /// stored by [`start_token`](struct.Lexer.html#fn-start_token) to the
    /// current cursor position.
    ///
    /// Also prepare the cursor for the next iteration.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        // After this token is built, the lexer's internal state
        // is no longer dedicated to this iteration, but to preparing
        // for the next iteration.
        let token = Token {
            span: self.make_span(),
            kind,
        };

        // Position the cursor to the starting character for the
        // next token, so the lexer's internal state is primed
        // for the next iteration.
        self.cursor.next();
        debug_assert_eq!(self.cursor.offset(), token.span.end());

        token
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_comment(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        while !is_newline(self.cursor.current()) && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Make a symbol token.
    ///
    /// Register names, jump mnemonics and labels are all symbols.
    /// The assembler gives them meaning by position.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_symbol_start(self.cursor.current()));

        while is_symbol_part(self.cursor.peek()) {
            self.cursor.next();
        }

        self.make_token(TokenKind::Ident)
    }

    /// Make a number literal token.
    ///
    /// Only decimal notation exists in Hack assembly.
    fn consume_number(&mut self) -> Token {
        debug_assert!(is_digit(self.cursor.current()));

        while is_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        self.make_token(TokenKind::Number)
    }
}

/// Test whether the character is considered whitespace
/// that should be ignored by the parser later.
///
/// Doesn't include newline characters, because newlines
/// are significant, specifying end-of-statement.
fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_symbol_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_' | '.' | '$' | ':')
}

fn is_symbol_part(c: char) -> bool {
    is_symbol_start(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.lexer.next_token();

        // Source may contain '\0' characters which lex
        // as EOF without being at the actual end.
        if token.kind == TokenKind::EOF && self.lexer.at_end() {
            self.done = true;
        }

        Some(token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind as TK;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_instructions() {
        assert_eq!(
            kinds("@R0\nD=D+1;JGT\n"),
            vec![
                TK::At,
                TK::Ident,
                TK::Newline,
                TK::Ident,
                TK::Eq,
                TK::Ident,
                TK::Plus,
                TK::Number,
                TK::Semicolon,
                TK::Ident,
                TK::Newline,
                TK::EOF,
            ]
        );
    }

    #[test]
    fn test_lex_comments_and_labels() {
        let source = "// header\n(Main.loop$ret.1) // trailing\n  0;JMP";
        assert_eq!(
            kinds(source),
            vec![
                TK::Newline,
                TK::LeftParen,
                TK::Ident,
                TK::RightParen,
                TK::Newline,
                TK::Number,
                TK::Semicolon,
                TK::Ident,
                TK::EOF,
            ]
        );

        let mut lexer = Lexer::new(source);
        lexer.next_token();
        lexer.next_token();
        let label = lexer.next_token();
        assert_eq!(label.span.fragment(source), "Main.loop$ret.1");
    }

    #[test]
    fn test_lex_unknown() {
        assert_eq!(
            kinds("D=D/2"),
            vec![TK::Ident, TK::Eq, TK::Ident, TK::Unknown, TK::Number, TK::EOF]
        );
    }
}
