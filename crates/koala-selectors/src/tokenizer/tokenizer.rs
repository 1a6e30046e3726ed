use super::token::{Token, TokenKind};

/// Lexer start conditions.
///
/// The text of a selector is not lexed uniformly: inside `[...]` whitespace
/// is insignificant and names may start with digits, inside `:fn(...)` the
/// argument is raw text up to the matching `)`, and inside `:not(...)`
/// whitespace is insignificant. The tokenizer keeps a stack of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Top-level selector text.
    Initial,
    /// Between `[` and `]`.
    Attribute,
    /// Immediately after a `FUNCTION` token: the raw argument comes next.
    Argument,
    /// The argument has been emitted; the closing `)` comes next.
    ArgumentEnd,
    /// Between `:not(` and its `)`.
    Negation,
}

/// Selector tokenizer.
///
/// Escapes (`\` followed by up to six hex digits, or by any other character)
/// are resolved at lex time per
/// [CSS Syntax § 4.3.7](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point),
/// so token text holds the unescaped value. Illegal input never aborts
/// tokenizing: it becomes a [`TokenKind::Error`] token and the parser reports it.
pub struct SelectorTokenizer {
    /// The input string being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Collected tokens
    tokens: Vec<Token>,
    /// Start-condition stack; empty means [`LexState::Initial`]
    states: Vec<LexState>,
}

/// Tokenize `input` in one call. The last token is always [`TokenKind::End`].
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = SelectorTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

impl SelectorTokenizer {
    /// Create a new selector tokenizer with the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            tokens: Vec::new(),
            states: Vec::new(),
        }
    }

    /// Consume tokens until (and including) the end token.
    pub fn run(&mut self) {
        loop {
            let token = self.consume_token();
            let is_end = token.is_end();
            self.tokens.push(token);
            if is_end {
                break;
            }
        }
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn state(&self) -> LexState {
        self.states.last().copied().unwrap_or(LexState::Initial)
    }

    fn pop_state(&mut self) {
        let _ = self.states.pop();
    }

    fn consume_token(&mut self) -> Token {
        match self.state() {
            LexState::Argument => return self.consume_argument(),
            LexState::ArgumentEnd => {
                self.pop_state();
                let start = self.position;
                let _ = self.consume(); // )
                return Token::new(TokenKind::RightParen, ")", start);
            }
            LexState::Attribute => {
                self.consume_whitespace();
                return self.consume_attribute_token();
            }
            LexState::Negation => self.consume_whitespace(),
            LexState::Initial => {
                if let Some(token) = self.consume_significant_whitespace() {
                    return token;
                }
            }
        }

        let start = self.position;
        let Some(c) = self.consume() else {
            return Token::new(TokenKind::End, "", start);
        };

        match c {
            '"' | '\'' => self.consume_string_token(c, start),

            // "HASH: #{name}"
            '#' => {
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    let value = self.consume_ident_sequence();
                    Token::new(TokenKind::Hash, value, start)
                } else {
                    Token::new(TokenKind::Error, "#", start)
                }
            }

            // "class: '.' IDENT"
            '.' => {
                if self.would_start_ident_sequence() {
                    let value = self.consume_ident_sequence();
                    Token::new(TokenKind::Class, value, start)
                } else {
                    Token::new(TokenKind::Error, ".", start)
                }
            }

            '*' => Token::new(TokenKind::Star, "*", start),
            '[' => {
                self.states.push(LexState::Attribute);
                Token::new(TokenKind::LeftBracket, "[", start)
            }
            ':' => Token::new(TokenKind::Colon, ":", start),
            ',' => Token::new(TokenKind::Comma, ",", start),
            '>' | '+' | '~' => Token::new(TokenKind::Combinator, c.to_string(), start),
            ')' => {
                if self.state() == LexState::Negation {
                    self.pop_state();
                }
                Token::new(TokenKind::RightParen, ")", start)
            }

            _ => {
                self.reconsume();
                if self.would_start_ident_sequence() {
                    self.consume_ident_like_token(start)
                } else {
                    let _ = self.consume();
                    Token::new(TokenKind::Error, c.to_string(), start)
                }
            }
        }
    }

    /// Whitespace in top-level text is the descendant combinator unless it is
    /// leading, trailing, or next to an explicit combinator or comma; those
    /// runs are dropped. Returns the whitespace token when it is significant.
    fn consume_significant_whitespace(&mut self) -> Option<Token> {
        if !self.peek().is_some_and(is_whitespace) {
            return None;
        }
        let start = self.position;
        self.consume_whitespace();

        let after_separator = matches!(
            self.tokens.last().map(|t| t.kind),
            None | Some(TokenKind::Comma | TokenKind::Combinator)
        );
        let before_separator = matches!(self.peek(), None | Some(',' | '>' | '+' | '~' | ')'));

        if after_separator || before_separator {
            None
        } else {
            Some(Token::new(TokenKind::Whitespace, " ", start))
        }
    }

    /// Tokens inside `[...]`: names (which may start with a digit, for
    /// unquoted values), the six operators, strings, and `]`.
    fn consume_attribute_token(&mut self) -> Token {
        let start = self.position;
        let Some(c) = self.consume() else {
            return Token::new(TokenKind::End, "", start);
        };

        match c {
            ']' => {
                self.pop_state();
                Token::new(TokenKind::RightBracket, "]", start)
            }
            '=' => Token::new(TokenKind::AttributeOperator, "=", start),
            '~' | '|' | '^' | '$' | '*' if self.peek() == Some('=') => {
                let _ = self.consume(); // =
                Token::new(TokenKind::AttributeOperator, format!("{c}="), start)
            }
            '"' | '\'' => self.consume_string_token(c, start),
            c if is_ident_code_point(c) || is_valid_escape(Some(c), self.peek()) => {
                self.reconsume();
                let value = self.consume_ident_sequence();
                Token::new(TokenKind::Ident, value, start)
            }
            c => Token::new(TokenKind::Error, c.to_string(), start),
        }
    }

    /// Raw argument of a functional pseudo-class: everything up to the `)`
    /// that balances the function's `(`, skipping parentheses inside quotes.
    fn consume_argument(&mut self) -> Token {
        let start = self.position;
        let mut raw = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;

        loop {
            let Some(c) = self.consume() else {
                // Unterminated; the parser reports the missing `)` at end of input.
                self.pop_state();
                return Token::new(TokenKind::Argument, raw.trim(), start);
            };

            if let Some(q) = quote {
                raw.push(c);
                if c == '\\' {
                    if let Some(escaped) = self.consume() {
                        raw.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    raw.push(c);
                }
                '(' => {
                    depth += 1;
                    raw.push(c);
                }
                ')' if depth == 0 => {
                    self.reconsume();
                    if let Some(top) = self.states.last_mut() {
                        *top = LexState::ArgumentEnd;
                    }
                    return Token::new(TokenKind::Argument, raw.trim(), start);
                }
                ')' => {
                    depth -= 1;
                    raw.push(c);
                }
                _ => raw.push(c),
            }
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending_code_point: char, start: usize) -> Token {
        // "Initially create a <string-token> with its value set to the empty string."
        let mut value = String::new();

        loop {
            match self.consume() {
                // "ending code point" / "EOF"
                // "Return the <string-token>."
                Some(c) if c == ending_code_point => {
                    return Token::new(TokenKind::String, value, start);
                }
                None => return Token::new(TokenKind::String, value, start),

                // "newline"
                // "This is a parse error. Reconsume the current input code point,
                // create a <bad-string-token>, and return it."
                Some('\n') => {
                    self.reconsume();
                    return Token::new(TokenKind::Error, value, start);
                }

                // "U+005C REVERSE SOLIDUS (\)"
                Some('\\') => match self.peek() {
                    // "If the next input code point is EOF, do nothing."
                    None => {}
                    // "Otherwise, if the next input code point is a newline, consume it."
                    Some('\n') => {
                        let _ = self.consume();
                    }
                    // "Otherwise, consume an escaped code point and append the
                    // returned code point to the <string-token>'s value."
                    Some(_) => value.push(self.consume_escaped_code_point()),
                },

                Some(c) => value.push(c),
            }
        }
    }

    /// An identifier, or a `FUNCTION` / `NOT` token when followed by `(`.
    fn consume_ident_like_token(&mut self, start: usize) -> Token {
        let name = self.consume_ident_sequence();

        if self.peek() != Some('(') {
            return Token::new(TokenKind::Ident, name, start);
        }
        let _ = self.consume(); // (

        if name.eq_ignore_ascii_case("not") {
            self.states.push(LexState::Negation);
            Token::new(TokenKind::Not, name, start)
        } else {
            self.states.push(LexState::Argument);
            Token::new(TokenKind::Function, name, start)
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        // "Let result initially be an empty string."
        let mut result = String::new();

        loop {
            match self.consume() {
                // "ident code point"
                Some(c) if is_ident_code_point(c) => result.push(c),

                // "the stream starts with a valid escape"
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    result.push(self.consume_escaped_code_point());
                }

                // "anything else"
                // "Reconsume the current input code point. Return result."
                Some(_) => {
                    self.reconsume();
                    return result;
                }

                None => return result,
            }
        }
    }

    /// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Assumes the `\` has already been consumed.
    fn consume_escaped_code_point(&mut self) -> char {
        match self.consume() {
            // "hex digit"
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                while hex.len() < 6 {
                    match self.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            hex.push(d);
                            let _ = self.consume();
                        }
                        _ => break,
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(is_whitespace) {
                    let _ = self.consume();
                }
                // "If this number is zero, or is for a surrogate, or is greater than the
                // maximum allowed code point, return U+FFFD REPLACEMENT CHARACTER."
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|&code_point| code_point != 0)
                    .and_then(char::from_u32)
                    .unwrap_or('\u{FFFD}')
            }
            // "EOF"
            // "This is a parse error. Return U+FFFD REPLACEMENT CHARACTER."
            None => '\u{FFFD}',
            // "anything else"
            // "Return the current input code point."
            Some(c) => c,
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        match self.peek() {
            // "U+002D HYPHEN-MINUS"
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(is_ident_start_code_point)
                    || second == Some('-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            // "ident-start code point"
            Some(c) if is_ident_start_code_point(c) => true,
            // "U+005C REVERSE SOLIDUS (\)"
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// Consume whitespace characters.
    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            let _ = self.consume();
        }
    }

    /// Consume and return the next character.
    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    /// Put back the last consumed character.
    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Peek at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peek at a character at an offset from current position.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    // "If the first code point is not U+005C REVERSE SOLIDUS (\), return false."
    // "Otherwise, if the second code point is a newline, return false."
    first == Some('\\') && second.is_some_and(|c| c != '\n')
}

/// [§ 4.2 Definitions - whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions - ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
const fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions - ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
///
/// "An ident-start code point, a digit, or U+002D HYPHEN-MINUS (-)."
const fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}
