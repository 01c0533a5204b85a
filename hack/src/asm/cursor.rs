//! Character cursor over source text.
use std::{iter::Peekable, str::CharIndices};

/// Character returned when the cursor is past the end of the source.
pub const EOF_CHAR: char = '\0';

/// Scanner that walks the source one character at a time,
/// tracking the byte offset of the current character.
pub struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    /// Byte offset and value of the current character.
    current: (u32, char),
    len: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            current: (0, EOF_CHAR),
            len: text.len() as u32,
        }
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.current.0
    }

    /// The character after the current one, without advancing.
    pub fn peek(&mut self) -> char {
        self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR)
    }

    /// Byte offset of the character after the current one.
    pub fn peek_offset(&mut self) -> u32 {
        let len = self.len;
        self.chars.peek().map(|(i, _)| *i as u32).unwrap_or(len)
    }

    /// Advance the cursor and return the new current character.
    pub fn next(&mut self) -> char {
        self.current = match self.chars.next() {
            Some((index, c)) => (index as u32, c),
            None => (self.len, EOF_CHAR),
        };
        self.current.1
    }

    pub fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cursor_offsets() {
        let mut cursor = Cursor::new("@é;");
        assert_eq!(cursor.next(), '@');
        assert_eq!(cursor.offset(), 0);
        assert_eq!(cursor.peek(), 'é');
        assert_eq!(cursor.peek_offset(), 1);
        assert_eq!(cursor.next(), 'é');
        // Multi-byte character.
        assert_eq!(cursor.peek_offset(), 3);
        assert_eq!(cursor.next(), ';');
        assert!(!cursor.at_end());
        assert_eq!(cursor.next(), EOF_CHAR);
        assert_eq!(cursor.offset(), 4);
        assert!(cursor.at_end());
    }
}
