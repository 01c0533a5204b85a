use std::{fmt, str::FromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    LeftBrace,    // `{`
    RightBrace,   // `}`
    LeftParen,    // `(`
    RightParen,   // `)`
    LeftBracket,  // `[`
    RightBracket, // `]`
    Dot,          // `.`
    Comma,        // `,`
    Semicolon,    // `;`
    Plus,         // `+`
    Minus,        // `-`
    Star,         // `*`
    Slash,        // `/`
    Amp,          // `&`
    Pipe,         // `|`
    Lt,           // `<`
    Gt,           // `>`
    Eq,           // `=`
    Tilde,        // `~`

    /// Integer constant, 0 to 32767.
    Int(u16),

    /// String constant. The span includes the quotes.
    Str,

    Ident,

    /// Identifier in the set of reserved words.
    Keyword(KeywordKind),

    /// End-of-source
    EOS,
}

impl TokenKind {
    #[rustfmt::skip]
    pub fn from_symbol(c: char) -> Option<Self> {
        use TokenKind as T;
        match c {
            '{' => Some(T::LeftBrace),
            '}' => Some(T::RightBrace),
            '(' => Some(T::LeftParen),
            ')' => Some(T::RightParen),
            '[' => Some(T::LeftBracket),
            ']' => Some(T::RightBracket),
            '.' => Some(T::Dot),
            ',' => Some(T::Comma),
            ';' => Some(T::Semicolon),
            '+' => Some(T::Plus),
            '-' => Some(T::Minus),
            '*' => Some(T::Star),
            '/' => Some(T::Slash),
            '&' => Some(T::Amp),
            '|' => Some(T::Pipe),
            '<' => Some(T::Lt),
            '>' => Some(T::Gt),
            '=' => Some(T::Eq),
            '~' => Some(T::Tilde),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn symbol(&self) -> Option<char> {
        use TokenKind as T;
        match self {
            T::LeftBrace    => Some('{'),
            T::RightBrace   => Some('}'),
            T::LeftParen    => Some('('),
            T::RightParen   => Some(')'),
            T::LeftBracket  => Some('['),
            T::RightBracket => Some(']'),
            T::Dot          => Some('.'),
            T::Comma        => Some(','),
            T::Semicolon    => Some(';'),
            T::Plus         => Some('+'),
            T::Minus        => Some('-'),
            T::Star         => Some('*'),
            T::Slash        => Some('/'),
            T::Amp          => Some('&'),
            T::Pipe         => Some('|'),
            T::Lt           => Some('<'),
            T::Gt           => Some('>'),
            T::Eq           => Some('='),
            T::Tilde        => Some('~'),
            _ => None,
        }
    }

    /// Element name of the token class in XML output.
    pub fn xml_tag(&self) -> &'static str {
        use TokenKind as T;
        match self {
            T::Int(_) => "integerConstant",
            T::Str => "stringConstant",
            T::Ident => "identifier",
            T::Keyword(_) => "keyword",
            T::EOS => "eos",
            _ => "symbol",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as T;
        match self {
            T::Int(_) => write!(f, "integer constant"),
            T::Str => write!(f, "string constant"),
            T::Ident => write!(f, "identifier"),
            T::Keyword(keyword) => write!(f, "'{}'", keyword),
            T::EOS => write!(f, "end of source"),
            symbol => match symbol.symbol() {
                Some(c) => write!(f, "'{}'", c),
                None => write!(f, "{:?}", symbol),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl fmt::Display for KeywordKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use KeywordKind as K;
        match self {
            K::Class       => write!(f, "class"),
            K::Constructor => write!(f, "constructor"),
            K::Function    => write!(f, "function"),
            K::Method      => write!(f, "method"),
            K::Field       => write!(f, "field"),
            K::Static      => write!(f, "static"),
            K::Var         => write!(f, "var"),
            K::Int         => write!(f, "int"),
            K::Char        => write!(f, "char"),
            K::Boolean     => write!(f, "boolean"),
            K::Void        => write!(f, "void"),
            K::True        => write!(f, "true"),
            K::False       => write!(f, "false"),
            K::Null        => write!(f, "null"),
            K::This        => write!(f, "this"),
            K::Let         => write!(f, "let"),
            K::Do          => write!(f, "do"),
            K::If          => write!(f, "if"),
            K::Else        => write!(f, "else"),
            K::While       => write!(f, "while"),
            K::Return      => write!(f, "return"),
        }
    }
}

impl FromStr for KeywordKind {
    type Err = ();

    #[rustfmt::skip]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use KeywordKind as K;
        match s {
            "class"       => Ok(K::Class),
            "constructor" => Ok(K::Constructor),
            "function"    => Ok(K::Function),
            "method"      => Ok(K::Method),
            "field"       => Ok(K::Field),
            "static"      => Ok(K::Static),
            "var"         => Ok(K::Var),
            "int"         => Ok(K::Int),
            "char"        => Ok(K::Char),
            "boolean"     => Ok(K::Boolean),
            "void"        => Ok(K::Void),
            "true"        => Ok(K::True),
            "false"       => Ok(K::False),
            "null"        => Ok(K::Null),
            "this"        => Ok(K::This),
            "let"         => Ok(K::Let),
            "do"          => Ok(K::Do),
            "if"          => Ok(K::If),
            "else"        => Ok(K::Else),
            "while"       => Ok(K::While),
            "return"      => Ok(K::Return),
            _ => Err(()),
        }
    }
}

/// Chunk of source code, encoded as starting and ending positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start position of bytes in source.
    pub start: usize,
    /// End position of bytes in source, exclusive.
    pub end: usize,
    /// Line of the first character, starting at 1.
    pub line: usize,
    /// Column of the first character, starting at 1.
    pub column: usize,
}

impl Span {
    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
