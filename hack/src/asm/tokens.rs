//! Tokens

use std::{fmt, ops};

#[derive(Debug, Clone)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    At,         // @
    LeftParen,  // (
    RightParen, // )
    Eq,         // =
    Semicolon,  // ;
    Plus,       // +
    Minus,      // -
    Bang,       // !
    Amp,        // &
    Pipe,       // |
    /// Line-feed and optionally a carriage return
    Newline,

    // ------------------------------------------------------------------------
    // Complex
    /// Symbol made of letters, digits and `_ . $ :`, not starting with a digit.
    Ident,
    /// Decimal number literal
    Number,

    // ------------------------------------------------------------------------
    // Special
    /// Unsupported token which should be treated as an error, probably
    Unknown,
    /// End-of-file
    EOF,
}

impl TokenKind {
    /// Tokens that may appear in the body of a C-instruction.
    #[inline]
    pub fn is_instruction_part(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Semicolon
                | Self::Plus
                | Self::Minus
                | Self::Bang
                | Self::Amp
                | Self::Pipe
                | Self::Ident
                | Self::Number
        )
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::At         => write!(f, "'@'"),
            Self::LeftParen  => write!(f, "'('"),
            Self::RightParen => write!(f, "')'"),
            Self::Eq         => write!(f, "'='"),
            Self::Semicolon  => write!(f, "';'"),
            Self::Plus       => write!(f, "'+'"),
            Self::Minus      => write!(f, "'-'"),
            Self::Bang       => write!(f, "'!'"),
            Self::Amp        => write!(f, "'&'"),
            Self::Pipe       => write!(f, "'|'"),
            Self::Newline    => write!(f, "newline"),
            Self::Ident      => write!(f, "symbol"),
            Self::Number     => write!(f, "number"),
            Self::Unknown    => write!(f, "unknown token"),
            Self::EOF        => write!(f, "end-of-file"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    pub fn surrounding_line<'a>(&self, text: &'a str) -> (&'a str, Span) {
        const NEWLINE: char = '\n';
        const RETURN: char = '\r';

        let mut chars = text.char_indices().peekable();
        let mut start = 0;
        let mut end = text.len();

        while let Some((i, c)) = chars.next() {
            if i < self.index as usize {
                if c == NEWLINE {
                    // Span not found yet, move the starting cursor to the next line.

                    if chars.peek().map(|(_, c)| *c) == Some(RETURN) {
                        chars.next();
                    }

                    // Line starts at the character after the newline (\n) and carriage return (\r)
                    if let Some((i, _)) = chars.peek() {
                        start = *i;
                    }
                }
            } else if i >= self.index as usize {
                // End the line when we encounter a newline after the start of the token.
                // Newline tokens (and on Windows the carriage return character)
                // will now be included in the line span.
                if c == NEWLINE {
                    end = i + 1;

                    if chars.peek().map(|(_, c)| *c) == Some(RETURN) {
                        chars.next();
                        end += 1;
                    }

                    break;
                }
            }
        }

        let line_span = Span {
            index: start as u32,
            size: end as u32 - start as u32,
        };

        (&text[start..end], line_span)
    }

    /// Combine two spans to produce a new span that
    /// covers both (and everything inbetween).
    ///
    /// ```
    /// use hack::asm::Span;
    ///
    /// let span1 = Span::new(4, 13);
    /// let span2 = Span::new(21, 13);
    /// let span3 = span1.merge(&span2);
    /// assert_eq!(4, span3.index);
    /// assert_eq!(30, span3.size);
    /// ```
    ///
    /// ```text
    /// <-- span1 -->    <-- span2 -->
    /// <---------- span3 ----------->
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        let index = u32::min(self.index, other.index);
        let size = u32::max(self.end(), other.end()) - index;
        Span { index, size }
    }
}

impl ops::Add for Span {
    type Output = Span;

    #[allow(clippy::suspicious_arithmetic_impl)] // subtract needed to merge spans
    fn add(self, rhs: Self) -> Self::Output {
        self.merge(&rhs)
    }
}

/// Operand of an A-instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addr {
    /// Decimal literal, 0 to 32767.
    Num(u16),
    /// Label, predefined symbol or variable.
    Symbol(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "D=M;JGT";

        let spans = &[
            Span::new(0, 1), // D
            Span::new(1, 1), // =
            Span::new(2, 1), // M
            Span::new(3, 1), // ;
            Span::new(4, 3), // JGT
        ];

        assert_eq!(spans[0].fragment(CODE), "D");
        assert_eq!(spans[1].fragment(CODE), "=");
        assert_eq!(spans[2].fragment(CODE), "M");
        assert_eq!(spans[3].fragment(CODE), ";");
        assert_eq!(spans[4].fragment(CODE), "JGT");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "@i\nD=M;here\n0;JMP";

        let span = Span::new(7, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "D=M;here\n");
        assert_eq!(line_span, Span { index: 3, size: 9 });
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line_cr() {
        const CODE: &str = "@LOOP\n\rD;here\n\r0;JMP";

        let span = Span::new(9, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "D;here\n\r");
        assert_eq!(line_span, Span { index: 7, size: 8 });
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "M=here";

        let span = Span::new(2, 4);
        assert_eq!(span.fragment(CODE), "here");

        let (line, line_span) = span.surrounding_line(CODE);
        assert_eq!(line, "M=here");
        assert_eq!(line_span, Span { index: 0, size: 6 });
    }
}
