//! Integration tests for the selector tokenizer.

use koala_selectors::tokenizer::{SelectorTokenizer, Token, TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input).into_iter().map(|t| t.kind).collect()
}

fn texts(input: &str) -> Vec<String> {
    tokenize(input).into_iter().map(|t| t.text).collect()
}

#[test]
fn test_type_selector() {
    let tokens = tokenize("div");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], Token::new(TokenKind::Ident, "div", 0));
    assert!(tokens[1].is_end());
}

#[test]
fn test_tokenizer_struct_api() {
    let mut tokenizer = SelectorTokenizer::new("*");
    tokenizer.run();
    assert_eq!(tokenizer.tokens().len(), 2);
    let tokens = tokenizer.into_tokens();
    assert_eq!(tokens[0].kind, TokenKind::Star);
}

#[test]
fn test_empty_input_is_just_end() {
    assert_eq!(kinds(""), vec![TokenKind::End]);
    assert_eq!(kinds("   "), vec![TokenKind::End]);
}

// Whitespace significance

#[test]
fn test_whitespace_is_descendant_combinator() {
    assert_eq!(
        kinds("div p"),
        vec![
            TokenKind::Ident,
            TokenKind::Whitespace,
            TokenKind::Ident,
            TokenKind::End
        ]
    );
}

#[test]
fn test_whitespace_around_explicit_combinator_is_dropped() {
    assert_eq!(
        kinds("ul  >  li"),
        vec![
            TokenKind::Ident,
            TokenKind::Combinator,
            TokenKind::Ident,
            TokenKind::End
        ]
    );
    assert_eq!(texts("a+b"), vec!["a", "+", "b", ""]);
    assert_eq!(texts("a ~ b"), vec!["a", "~", "b", ""]);
}

#[test]
fn test_leading_and_trailing_whitespace_dropped() {
    assert_eq!(kinds("  div  "), vec![TokenKind::Ident, TokenKind::End]);
}

#[test]
fn test_whitespace_around_comma_dropped() {
    assert_eq!(
        kinds("a , b"),
        vec![
            TokenKind::Ident,
            TokenKind::Comma,
            TokenKind::Ident,
            TokenKind::End
        ]
    );
}

#[test]
fn test_positions_are_character_offsets() {
    let tokens = tokenize("ul > li");
    let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![0, 3, 5, 7]);

    // Non-ASCII names count as one position per character.
    let tokens = tokenize("é p");
    assert_eq!(tokens[2].position, 2);
}

// Hash, class, star

#[test]
fn test_hash_and_class() {
    let tokens = tokenize("#main.nav-item");
    assert_eq!(tokens[0], Token::new(TokenKind::Hash, "main", 0));
    assert_eq!(tokens[1], Token::new(TokenKind::Class, "nav-item", 5));
}

#[test]
fn test_hash_may_start_with_digit() {
    let tokens = tokenize("#1st");
    assert_eq!(tokens[0].kind, TokenKind::Hash);
    assert_eq!(tokens[0].text, "1st");
}

#[test]
fn test_bare_hash_and_dot_are_errors() {
    assert_eq!(kinds("#")[0], TokenKind::Error);
    assert_eq!(kinds(". x")[0], TokenKind::Error);
}

// Attribute brackets

#[test]
fn test_attribute_with_quoted_value() {
    let tokens = tokenize("[data-x^='a b']");
    let summary: Vec<(TokenKind, &str)> =
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (TokenKind::LeftBracket, "["),
            (TokenKind::Ident, "data-x"),
            (TokenKind::AttributeOperator, "^="),
            (TokenKind::String, "a b"),
            (TokenKind::RightBracket, "]"),
            (TokenKind::End, ""),
        ]
    );
}

#[test]
fn test_attribute_whitespace_is_insignificant() {
    assert_eq!(
        kinds("[ lang |= en ]"),
        vec![
            TokenKind::LeftBracket,
            TokenKind::Ident,
            TokenKind::AttributeOperator,
            TokenKind::Ident,
            TokenKind::RightBracket,
            TokenKind::End
        ]
    );
}

#[test]
fn test_all_attribute_operators() {
    for op in ["=", "~=", "|=", "^=", "$=", "*="] {
        let tokens = tokenize(&format!("[a{op}b]"));
        assert_eq!(tokens[2].kind, TokenKind::AttributeOperator, "{op}");
        assert_eq!(tokens[2].text, op);
    }
}

#[test]
fn test_unquoted_attribute_value_may_start_with_digit() {
    let tokens = tokenize("[width=100]");
    assert_eq!(tokens[3], Token::new(TokenKind::Ident, "100", 7));
}

#[test]
fn test_lone_operator_character_in_attribute_is_error() {
    assert_eq!(kinds("[a|b]")[2], TokenKind::Error);
}

// Functions and negation

#[test]
fn test_function_argument_is_raw_text() {
    let tokens = tokenize("li:nth-child(2n + 1)");
    let summary: Vec<(TokenKind, &str)> =
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (TokenKind::Ident, "li"),
            (TokenKind::Colon, ":"),
            (TokenKind::Function, "nth-child"),
            (TokenKind::Argument, "2n + 1"),
            (TokenKind::RightParen, ")"),
            (TokenKind::End, ""),
        ]
    );
}

#[test]
fn test_argument_balances_parens_and_skips_quoted_parens() {
    let tokens = tokenize(r#":foo(a(b) ")")"#);
    assert_eq!(tokens[2].kind, TokenKind::Argument);
    assert_eq!(tokens[2].text, r#"a(b) ")""#);
    assert_eq!(tokens[3].kind, TokenKind::RightParen);
    assert!(tokens[4].is_end());
}

#[test]
fn test_unterminated_argument_ends_stream() {
    assert_eq!(
        kinds(":nth-child(2"),
        vec![
            TokenKind::Colon,
            TokenKind::Function,
            TokenKind::Argument,
            TokenKind::End
        ]
    );
}

#[test]
fn test_negation() {
    assert_eq!(
        kinds(":not( .x )"),
        vec![
            TokenKind::Colon,
            TokenKind::Not,
            TokenKind::Class,
            TokenKind::RightParen,
            TokenKind::End
        ]
    );
    assert_eq!(kinds(":NOT(p)")[1], TokenKind::Not);
}

#[test]
fn test_function_inside_negation_closes_separately() {
    assert_eq!(
        kinds(":not(:nth-child(2)) p"),
        vec![
            TokenKind::Colon,
            TokenKind::Not,
            TokenKind::Colon,
            TokenKind::Function,
            TokenKind::Argument,
            TokenKind::RightParen,
            TokenKind::RightParen,
            TokenKind::Whitespace,
            TokenKind::Ident,
            TokenKind::End
        ]
    );
}

// Escapes
// [CSS Syntax § 4.3.7](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)

#[test]
fn test_hex_escape_consumes_one_trailing_space() {
    let tokens = tokenize(r"#\31 23");
    assert_eq!(tokens[0].kind, TokenKind::Hash);
    assert_eq!(tokens[0].text, "123");
}

#[test]
fn test_literal_escape_in_class() {
    let tokens = tokenize(r".a\:b");
    assert_eq!(tokens[0], Token::new(TokenKind::Class, "a:b", 0));
    assert!(tokens[1].is_end());
}

#[test]
fn test_escape_starts_identifier() {
    let tokens = tokenize(r"\64 iv");
    assert_eq!(tokens[0], Token::new(TokenKind::Ident, "div", 0));
}

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r#"[title="a\"b\\c"]"#);
    assert_eq!(tokens[3].kind, TokenKind::String);
    assert_eq!(tokens[3].text, r#"a"b\c"#);
}

#[test]
fn test_newline_in_string_is_error() {
    let tokens = tokenize("[title=\"a\nb\"]");
    assert_eq!(tokens[3].kind, TokenKind::Error);
}

// Illegal input is forwarded, not fatal

#[test]
fn test_illegal_character_becomes_error_token() {
    let tokens = tokenize("div $");
    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Ident,
            TokenKind::Whitespace,
            TokenKind::Error,
            TokenKind::End
        ]
    );
    assert_eq!(tokens[2].text, "$");
    assert_eq!(tokens[2].position, 4);
}

#[test]
fn test_token_display() {
    let rendered: Vec<String> = tokenize("a#b.c[d='e']:f(g)")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(rendered.concat(), r#"a#b.c[d="e"]:f(g)"#);
}
