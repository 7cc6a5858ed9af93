use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &str);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(regex).unwrap(),
        handler,
    }
}

lazy_static! {
    // Order matters: longer operators come before their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern("^[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern("^[0-9]+(\\.[0-9]+)?", number_handler),
        pattern("^\\s+", skip_handler),
        pattern("^\"(\\\\.|[^\"\\\\])*\"", string_handler),
        pattern("^//[^\n]*", skip_handler),
        pattern("^\\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket)),
        pattern("^\\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket)),
        pattern("^\\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly)),
        pattern("^\\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly)),
        pattern("^\\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen)),
        pattern("^\\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen)),
        pattern("^==", MK_DEFAULT_HANDLER!(TokenKind::Equals)),
        pattern("^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals)),
        pattern("^!", MK_DEFAULT_HANDLER!(TokenKind::Not)),
        pattern("^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment)),
        pattern("^<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft)),
        pattern("^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals)),
        pattern("^<", MK_DEFAULT_HANDLER!(TokenKind::Less)),
        pattern("^>>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight)),
        pattern("^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals)),
        pattern("^>", MK_DEFAULT_HANDLER!(TokenKind::Greater)),
        pattern("^\\|\\|", MK_DEFAULT_HANDLER!(TokenKind::Or)),
        pattern("^\\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe)),
        pattern("^&&", MK_DEFAULT_HANDLER!(TokenKind::And)),
        pattern("^&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand)),
        pattern("^\\.\\.=", MK_DEFAULT_HANDLER!(TokenKind::DotDotEquals)),
        pattern("^\\.\\.", MK_DEFAULT_HANDLER!(TokenKind::DotDot)),
        pattern("^\\.", MK_DEFAULT_HANDLER!(TokenKind::Dot)),
        pattern("^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon)),
        pattern("^:", MK_DEFAULT_HANDLER!(TokenKind::Colon)),
        pattern("^,", MK_DEFAULT_HANDLER!(TokenKind::Comma)),
        pattern("^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow)),
        pattern("^\\+", MK_DEFAULT_HANDLER!(TokenKind::Plus)),
        pattern("^-", MK_DEFAULT_HANDLER!(TokenKind::Dash)),
        pattern("^/\\.", MK_DEFAULT_HANDLER!(TokenKind::SlashDot)),
        pattern("^/", MK_DEFAULT_HANDLER!(TokenKind::Slash)),
        pattern("^\\*", MK_DEFAULT_HANDLER!(TokenKind::Star)),
        pattern("^%", MK_DEFAULT_HANDLER!(TokenKind::Percent)),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = Rc::new(file.unwrap_or_else(|| String::from("shell")));

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            file: file_name,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, Rc::clone(&self.file))
    }

    /// Moves past `n` bytes, keeping line and column in step.
    pub fn advance_n(&mut self, n: usize) {
        let end = (self.pos + n).min(self.source.len());
        for c in self.source[self.pos..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Pushes a token spanning the next `length` bytes and moves past them.
    pub fn emit(&mut self, kind: TokenKind, value: String, length: usize) {
        let start = self.position();
        self.advance_n(length);
        let end = self.position();
        self.push(MK_TOKEN!(kind, value, Span { start, end }));
    }

    pub fn at(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

fn number_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::Number, matched.to_string(), matched.len());
}

fn skip_handler(lexer: &mut Lexer, matched: &str) {
    lexer.advance_n(matched.len());
}

fn string_handler(lexer: &mut Lexer, matched: &str) {
    let literal = unescape(&matched[1..matched.len() - 1]);
    lexer.emit(TokenKind::String, literal, matched.len());
}

fn unescape(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('0') => result.push('\0'),
            Some('x') => {
                chars.next();
                let mut hex = String::new();
                while hex.len() < 2 {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            hex.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => {
                        result.push_str("\\x");
                        result.push_str(&hex);
                    }
                }
                continue;
            }
            // Unknown escapes keep their backslash.
            _ => {
                result.push(ch);
                continue;
            }
        }
        chars.next();
    }

    result
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.emit(kind, matched.to_string(), matched.len());
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        let found = PATTERNS.iter().find_map(|pattern| {
            pattern
                .regex
                .find(lex.remainder())
                .map(|found| (pattern.handler, found.as_str().to_string()))
        });

        match found {
            Some((handler, matched)) if !matched.is_empty() => handler(&mut lex, &matched),
            _ => {
                let token = lex.at().map(String::from).unwrap_or_default();
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken { token },
                    lex.position(),
                ));
            }
        }
    }

    let end = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span {
            start: end.clone(),
            end
        }
    ));
    Ok(lex.tokens)
}
