//! Selector token types.
//!
//! The selector grammar is lexed into a flat stream of the following kinds,
//! modelled on the [Selectors Level 3 § 10.2 lexical scanner](https://www.w3.org/TR/selectors-3/#lex):
//! `IDENT`, `HASH`, class (`.` followed by a name), `STRING`, `[` and `]`,
//! `FUNCTION`, the raw argument of a function, `:not(`, `)`, `,`, combinator
//! characters, `:`, significant whitespace, `*`, and end of input.

use core::fmt;

use strum_macros::Display;

/// The kind of a [`Token`].
///
/// Also the terminal alphabet of the selector grammar. The `Display` form is
/// what syntax errors print in their "expected one of" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenKind {
    /// "ident: `[-]?{nmstart}{nmchar}*`" (type names, attribute names,
    /// unquoted attribute values, pseudo-class names)
    #[strum(serialize = "identifier")]
    Ident,

    /// "HASH: `#{name}`" (an id selector; the token text excludes `#`)
    #[strum(serialize = "`#id`")]
    Hash,

    /// `.` immediately followed by a name (the token text excludes `.`)
    #[strum(serialize = "`.class`")]
    Class,

    /// "STRING: `{string1}|{string2}`" (the token text is unquoted and unescaped)
    #[strum(serialize = "string")]
    String,

    /// `*`, the universal selector
    #[strum(serialize = "`*`")]
    Star,

    /// `[`
    #[strum(serialize = "`[`")]
    LeftBracket,

    /// `]`
    #[strum(serialize = "`]`")]
    RightBracket,

    /// One of `=`, `~=`, `|=`, `^=`, `$=`, `*=`
    #[strum(serialize = "attribute operator")]
    AttributeOperator,

    /// `:`
    #[strum(serialize = "`:`")]
    Colon,

    /// "FUNCTION: `{ident}(`" (the token text is the name without `(`)
    #[strum(serialize = "function")]
    Function,

    /// Raw text between a function's `(` and its matching `)`, trimmed
    #[strum(serialize = "function argument")]
    Argument,

    /// "NOT: `:not(`" (lexed after the colon, as `not(`)
    #[strum(serialize = "`not(`")]
    Not,

    /// `)`
    #[strum(serialize = "`)`")]
    RightParen,

    /// "COMMA: `{w}\",\"`"
    #[strum(serialize = "`,`")]
    Comma,

    /// "PLUS: `{w}\"+\"`", "GREATER: `{w}\">\"`", "TILDE: `{w}\"~\"`"
    #[strum(serialize = "combinator")]
    Combinator,

    /// "S: `[ \t\r\n\f]+`" where it stands for the descendant combinator
    #[strum(serialize = "whitespace")]
    Whitespace,

    /// End of input
    #[strum(serialize = "end of input")]
    End,

    /// An illegal character sequence, forwarded so the parser can report it
    /// in context. No parser state has an action for it.
    #[strum(serialize = "invalid character")]
    Error,
}

/// A lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What this token is.
    pub kind: TokenKind,
    /// The token's value: unescaped names for idents/hashes/classes,
    /// unquoted content for strings, the operator or combinator glyph,
    /// raw argument text, or the offending text for [`TokenKind::Error`].
    pub text: String,
    /// Character offset of the token's first character in the source.
    pub position: usize,
}

impl Token {
    /// Create a token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Whether this is the final token of a stream.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident
            | TokenKind::AttributeOperator
            | TokenKind::Combinator
            | TokenKind::Argument
            | TokenKind::Error => write!(f, "{}", self.text),
            TokenKind::Hash => write!(f, "#{}", self.text),
            TokenKind::Class => write!(f, ".{}", self.text),
            TokenKind::String => write!(f, "{:?}", self.text),
            TokenKind::Function => write!(f, "{}(", self.text),
            TokenKind::Not => write!(f, "not("),
            TokenKind::Star => write!(f, "*"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Whitespace => write!(f, " "),
            TokenKind::End => Ok(()),
        }
    }
}
