//! Unit tests for the lexer module.

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.schema".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "let func return if else while until for in typeof assert true false";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Let,
            TokenKind::Func,
            TokenKind::Return,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Until,
            TokenKind::For,
            TokenKind::In,
            TokenKind::Typeof,
            TokenKind::Assert,
            TokenKind::True,
            TokenKind::False,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore CamelCase _".to_string();
    let tokens = tokenize(source, Some("test.schema".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].value, "CamelCase");
    assert_eq!(tokens[5].kind, TokenKind::Identifier);
    assert_eq!(tokens[5].value, "_");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100.5".to_string();
    let tokens = tokenize(source, Some("test.schema".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "100.5");
    assert_eq!(tokens[4].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_ranges() {
    assert_eq!(
        kinds("0..5 1..=3 2.."),
        vec![
            TokenKind::Number,
            TokenKind::DotDot,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::DotDotEquals,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::DotDot,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words" "say \"hi\"\n""#.to_string();
    let tokens = tokenize(source, Some("test.schema".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].value, "say \"hi\"\n");
    assert_eq!(tokens[3].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_hex_escape() {
    let tokens = tokenize(r#""\x41\q""#.to_string(), None).unwrap();
    assert_eq!(tokens[0].value, "A\\q");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / /. % << >> < <= > >= == != && || ! = | & ->"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::SlashDot,
            TokenKind::Percent,
            TokenKind::ShiftLeft,
            TokenKind::ShiftRight,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Assignment,
            TokenKind::Pipe,
            TokenKind::Ampersand,
            TokenKind::Arrow,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] ; : , ."),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    assert_eq!(
        kinds("let x // the rest is ignored ; let\nx"),
        vec![
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_token_positions() {
    let tokens = tokenize("let a = 1;\n  print(a)".to_string(), Some("pos.schema".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.line, 1);
    assert_eq!(tokens[0].span.start.column, 1);
    assert_eq!(tokens[1].span.start.column, 5);
    assert_eq!(tokens[5].value, "print");
    assert_eq!(tokens[5].span.start.line, 2);
    assert_eq!(tokens[5].span.start.column, 3);
    assert_eq!(tokens[5].span.end.column, 8);
    assert_eq!(tokens[5].span.start.file.as_str(), "pos.schema");
}

#[test]
fn test_tokenize_unicode_string() {
    let tokens = tokenize("\"héllo\" x".to_string(), None).unwrap();

    assert_eq!(tokens[0].value, "héllo");
    assert_eq!(tokens[1].span.start.column, 9);
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("let a = @;".to_string(), None).unwrap_err();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().column, 9);
}

#[test]
fn test_nested_generic_closes_as_shift() {
    assert_eq!(
        kinds("Array<Array<int>>"),
        vec![
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::Less,
            TokenKind::Identifier,
            TokenKind::ShiftRight,
            TokenKind::EOF,
        ]
    );
}
