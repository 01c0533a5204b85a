//! Lexical analysis (tokenizer)
use crate::tokens::{KeywordKind, Span, Token, TokenKind};

use itertools::{multipeek, MultiPeek};
use log::trace;
use std::{
    error, fmt,
    iter::Iterator,
    str::{CharIndices, FromStr},
};

/// Largest integer constant the language allows.
pub const MAX_INT: u16 = 32767;

/// Tokenize the whole source, ending with exactly one end-of-source token.
///
/// Stops at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).collect()
}

/// Lexical analyzer.
///
/// Scanning is a small state machine over characters. The normal state
/// produces tokens. Strings and block comments are states of their own,
/// entered on their opening delimiter and left on the closing one, so
/// comment markers inside a string are plain characters.
pub struct Lexer<'a> {
    pub(crate) source: SourceText<'a>,
    token_start: SourcePos,
    /// Set once end-of-source or an error has been produced.
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source: SourceText::new(source_code),
            token_start: SourcePos {
                position: 0,
                line: 1,
                column: 1,
            },
            done: false,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.source.original
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        use TokenKind as T;

        loop {
            self.source.reset_peek();

            let next_char = match self.source.next_char() {
                Some((_, c)) => c,
                None => {
                    // Give end-of-source its own character position.
                    self.start_token();
                    return Ok(self.make_token(T::EOS));
                }
            };
            self.start_token();

            match next_char {
                '"' => return self.consume_string(),
                '/' => match self.source.peek_char() {
                    Some((_, '/')) => {
                        self.source.next_char();
                        self.skip_line_comment();
                    }
                    Some((_, '*')) => {
                        self.source.next_char();
                        self.skip_block_comment()?;
                    }
                    _ => return Ok(self.make_token(T::Slash)),
                },
                c if c.is_whitespace() => { /* insignificant */ }
                c => match T::from_symbol(c) {
                    Some(symbol) => return Ok(self.make_token(symbol)),
                    None => return self.consume_word(),
                },
            }
        }
    }

    /// Prime the lexer state for recording a new token.
    fn start_token(&mut self) {
        self.token_start = SourcePos {
            position: self.source.current.0,
            column: self.source.current_column,
            line: self.source.current_line,
        };
    }

    fn make_token(&mut self, token_kind: TokenKind) -> Token {
        let span = Span {
            start: self.token_start.position,
            end: self.source.current_end(),
            line: self.token_start.line,
            column: self.token_start.column,
        };

        Token {
            kind: token_kind,
            span,
        }
    }

    #[cold]
    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            line: self.token_start.line,
            column: self.token_start.column,
        }
    }

    fn token_fragment(&self) -> &'a str {
        &self.source.original[self.token_start.position..self.source.current_end()]
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// String state, entered after the opening quote.
    ///
    /// Strings may not span lines.
    fn consume_string(&mut self) -> Result<Token, LexError> {
        loop {
            match self.source.next_char() {
                Some((_, '"')) => return Ok(self.make_token(TokenKind::Str)),
                Some((_, '\n')) | None => {
                    return Err(self.error(LexErrorKind::UnterminatedString));
                }
                Some(_) => continue,
            }
        }
    }

    /// Consume up to, but not including, the trailing newline.
    fn skip_line_comment(&mut self) {
        while let Some((_, c)) = self.source.peek_char() {
            match c {
                '\n' => break,
                _ => {
                    self.source.next_char();
                }
            }
        }
    }

    /// Block comment state, entered after the opening `/*`.
    ///
    /// Covers API comments `/** */` as well. Comments do not nest.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        loop {
            match self.source.next_char() {
                Some((_, '*')) => {
                    if let Some((_, '/')) = self.source.peek_char() {
                        self.source.next_char();
                        return Ok(());
                    }
                    self.source.reset_peek();
                }
                Some(_) => continue,
                None => return Err(self.error(LexErrorKind::UnterminatedComment)),
            }
        }
    }

    /// Keyword, identifier or integer constant.
    ///
    /// A word runs until whitespace, a symbol or a quote.
    fn consume_word(&mut self) -> Result<Token, LexError> {
        self.source.reset_peek();

        while let Some((_, c)) = self.source.peek_char() {
            if c.is_whitespace() || c == '"' || TokenKind::from_symbol(c).is_some() {
                break;
            }
            self.source.next_char();
        }

        let fragment = self.token_fragment();

        // If a valid keyword can be parsed from the source fragment, then
        // the token is a reserved keyword instead of a user defined identifier.
        if let Ok(keyword) = KeywordKind::from_str(fragment) {
            return Ok(self.make_token(TokenKind::Keyword(keyword)));
        }

        if fragment.starts_with(|c: char| c.is_ascii_digit()) {
            if !fragment.chars().all(|c| c.is_ascii_digit()) {
                return Err(self.error(LexErrorKind::MalformedInteger(fragment.to_owned())));
            }
            // All digits, so failing to parse can only mean overflow.
            return match fragment.parse::<u16>() {
                Ok(value) if value <= MAX_INT => Ok(self.make_token(TokenKind::Int(value))),
                _ => Err(self.error(LexErrorKind::IntegerOutOfRange(fragment.to_owned()))),
            };
        }

        if is_identifier(fragment) {
            Ok(self.make_token(TokenKind::Ident))
        } else {
            Err(self.error(LexErrorKind::InvalidIdentifier(fragment.to_owned())))
        }
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Implement `Lexer` as an interator for consuming
/// tokens lazily.
///
/// The end-of-source token is the last item, and iteration
/// also stops after the first error.
impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) => {
                trace!("{} {:?}", token.span, token.kind);
                self.done = token.kind == TokenKind::EOS;
            }
            Err(_) => self.done = true,
        }

        Some(result)
    }
}

/// Wrapper for source code that keeps a cursor position.
///
/// Allows forward lookup via peeking.
pub(crate) struct SourceText<'a> {
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    pub(crate) original: &'a str,

    /// Iterator over UTF-8 encoded source code.
    ///
    /// The `MultiPeek` wrapper allows for arbitrary lookahead by consuming
    /// the iterator internally and buffering the result. This is required
    /// because UTF-8 characters are variable in width. Indexing the string
    /// for individual bytes is possible, but impossible for encoded characters.
    ///
    /// An important semantic feature of `MultiPeek` is that peeking advances
    /// the internal peek cursor by 1. Each call will return the next element.
    /// The peek cursor offset is restored to 0 when calling `MultiPeek::next()`
    /// or `MultiPeek::reset_peek()`.
    source: MultiPeek<CharIndices<'a>>,

    /// Byte position in the source string of the current character.
    current: (usize, char),
    current_line: usize,
    current_column: usize,
}

impl<'a> SourceText<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            original: source,
            source: multipeek(source.char_indices()),
            current: (0, '\0'),
            current_line: 1,
            current_column: 0,
        }
    }

    /// number of bytes in source.
    fn byte_count(&self) -> usize {
        self.original.len()
    }

    /// Advance the cursor and return the next position and character.
    fn next_char(&mut self) -> Option<(usize, char)> {
        // Line changes on the character after the newline,
        // so the newline itself belongs to the line it ends.
        if self.current.1 == '\n' {
            self.current_line += 1;
            self.current_column = 0;
        }

        if let Some((index, c)) = self.source.next() {
            self.current_column += 1;
            self.current = (index, c);
            Some((index, c))
        } else {
            // Source code iterator has reached end-of-file.
            //
            // Set the current index to the size of the source
            // string. There is no End-of-file character, so
            // we just set it to the null-byte.
            self.current = (self.byte_count(), '\0');
            self.current_column += 1;
            None
        }
    }

    /// Byte position just past the current character.
    fn current_end(&self) -> usize {
        if self.at_end() {
            self.byte_count()
        } else {
            self.current.0 + self.current.1.len_utf8()
        }
    }

    /// Peeks the current character in the stream.
    ///
    /// This call advances the peek cursor. Subsequent
    /// calls will look ahead by one character each call.
    fn peek_char(&mut self) -> Option<(usize, char)> {
        self.source.peek().cloned()
    }

    /// Reset the stream peek cursor.
    fn reset_peek(&mut self) {
        self.source.reset_peek()
    }

    /// Indicates if the cursor is at the end of the source.
    fn at_end(&self) -> bool {
        self.current.0 >= self.byte_count()
    }
}

#[derive(Debug, Default)]
struct SourcePos {
    position: usize,
    column: usize,
    line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Line where the offending token starts.
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// String constant without a closing quote on the same line.
    UnterminatedString,
    /// Block comment without a closing `*/`.
    UnterminatedComment,
    /// Integer constant larger than 32767.
    IntegerOutOfRange(String),
    /// Word starting with a digit that is not all digits.
    MalformedInteger(String),
    /// Word that is neither keyword, identifier nor integer.
    InvalidIdentifier(String),
}

impl error::Error for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LexErrorKind as K;
        write!(f, "{}:{}: ", self.line, self.column)?;
        match &self.kind {
            K::UnterminatedString => write!(f, "unterminated string constant"),
            K::UnterminatedComment => write!(f, "unterminated comment"),
            K::IntegerOutOfRange(text) => {
                write!(f, "integer constant {} out of range 0..={}", text, MAX_INT)
            }
            K::MalformedInteger(text) => write!(f, "malformed integer constant '{}'", text),
            K::InvalidIdentifier(text) => write!(f, "invalid identifier '{}'", text),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind as T;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_symbols_and_words() {
        assert_eq!(
            kinds("let x[i]=~-y;"),
            vec![
                T::Keyword(KeywordKind::Let),
                T::Ident,
                T::LeftBracket,
                T::Ident,
                T::RightBracket,
                T::Eq,
                T::Tilde,
                T::Minus,
                T::Ident,
                T::Semicolon,
                T::EOS,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "/** api */ do // line\n f(); /* block\n * more */ return";
        assert_eq!(
            kinds(source),
            vec![
                T::Keyword(KeywordKind::Do),
                T::Ident,
                T::LeftParen,
                T::RightParen,
                T::Semicolon,
                T::Keyword(KeywordKind::Return),
                T::EOS,
            ]
        );
    }

    #[test]
    fn test_division_is_not_comment() {
        assert_eq!(kinds("a/b"), vec![T::Ident, T::Slash, T::Ident, T::EOS]);
    }

    #[test]
    fn test_string_keeps_comment_markers() {
        let source = r#"let s = "// not /* a comment";"#;
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[3].kind, T::Str);
        assert_eq!(tokens[3].span.fragment(source), r#""// not /* a comment""#);
        assert_eq!(tokens[4].kind, T::Semicolon);
    }

    #[test]
    fn test_integer_range() {
        assert_eq!(kinds("32767"), vec![T::Int(32767), T::EOS]);
        assert_eq!(kinds("0"), vec![T::Int(0), T::EOS]);

        let err = tokenize("32768").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::IntegerOutOfRange("32768".to_owned()));
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::IntegerOutOfRange(_)));
    }

    #[test]
    fn test_lex_errors() {
        let err = tokenize("let s = \"open\n\";").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (1, 9));

        let err = tokenize("class /* never closed").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);

        let err = tokenize("\n  12ab").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedInteger("12ab".to_owned()));
        assert_eq!((err.line, err.column), (2, 3));

        let err = tokenize("x = a#b;").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidIdentifier("a#b".to_owned()));
    }

    #[test]
    fn test_spans() {
        let source = "class Main {\n  field int x;\n}";
        let tokens = tokenize(source).unwrap();
        let field = &tokens[3];
        assert_eq!(field.span.fragment(source), "field");
        assert_eq!((field.span.line, field.span.column), (2, 3));

        let eos = tokens.last().unwrap();
        assert_eq!(eos.kind, T::EOS);
        assert_eq!(eos.span.start, source.len());
        assert_eq!(eos.span.end, source.len());
    }

    #[test]
    fn test_single_eos() {
        let results = Lexer::new("  \n").collect::<Vec<_>>();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_ref().unwrap().kind, T::EOS);
    }

    /// Source without comments and without whitespace outside strings.
    fn strip_trivia(source: &str) -> String {
        let mut out = String::new();
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => {
                    out.push(c);
                    for c in chars.by_ref() {
                        out.push(c);
                        if c == '"' {
                            break;
                        }
                    }
                }
                '/' if chars.peek() == Some(&'/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut last = '\0';
                    for c in chars.by_ref() {
                        if last == '*' && c == '/' {
                            break;
                        }
                        last = c;
                    }
                }
                c if c.is_whitespace() => {}
                c => out.push(c),
            }
        }
        out
    }

    #[test]
    fn test_fragments_cover_source() {
        let sources = [
            "class A{/**/field int x;/* ** */ /***/ method void f(){let x=x/2;//c\nreturn;}}//end",
            "let s=\"a b\"*x;/*\n*\n**/",
            "do f(\"/* not // comment\", y / z);\n/* multi\n   line\n **/ return;",
        ];

        for source in sources {
            let fragments = tokenize(source)
                .unwrap()
                .into_iter()
                .filter(|token| token.kind != T::EOS)
                .map(|token| token.span.fragment(source))
                .collect::<String>();
            assert_eq!(fragments, strip_trivia(source), "{:?}", source);
        }
    }
}
