//! Type annotation parsing.
//!
//! Uses the same NUD/LED scheme as expressions with its own tables:
//! names and generics (`Map<string, int>`), `T[]` array shorthand, tuples
//! `(A, B)`, records `{name: T}`, function types `(A) -> B`, unions
//! `A | B` and intersections `A & B`. Intersection binds tighter than union.

use std::collections::HashMap;

use crate::{
    ast::types::TypeAnnotation,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeAnnotation, Error>;
pub type TypeLEDHandler = fn(&mut Parser, TypeAnnotation, BindingPower) -> Result<TypeAnnotation, Error>;
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;
pub type TypeLEDLookup = HashMap<TokenKind, TypeLEDHandler>;
pub type TypeBPLookup = HashMap<TokenKind, BindingPower>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenParen, parse_paren_type);
    parser.type_nud(TokenKind::OpenCurly, parse_record_type);

    parser.type_led(TokenKind::Pipe, BindingPower::Logical, parse_union_type);
    parser.type_led(TokenKind::Ampersand, BindingPower::Relational, parse_intersection_type);
    parser.type_led(TokenKind::OpenBracket, BindingPower::Call, parse_array_type);
}

/// `name` or `name<args>`
pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    if parser.current_token_kind() != TokenKind::Less {
        return Ok(TypeAnnotation::Simple {
            name: token.value,
            position: token.span.start,
        });
    }

    parser.advance();
    let mut args = vec![];
    loop {
        args.push(parse_type(parser, BindingPower::Default)?);
        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }
    parser.expect_closing_angle()?;

    Ok(TypeAnnotation::Generic {
        name: token.value,
        args,
        position: token.span.start,
    })
}

/// `(A)`, `(A, B)`, `()` or `(A, B) -> C`
pub fn parse_paren_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let open = parser.expect(TokenKind::OpenParen)?;

    let mut members = vec![];
    let mut trailing_comma = false;
    while parser.current_token_kind() != TokenKind::CloseParen {
        members.push(parse_type(parser, BindingPower::Default)?);
        trailing_comma = false;

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            trailing_comma = true;
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in type"));
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        let return_type = parse_type(parser, BindingPower::Default)?;
        return Ok(TypeAnnotation::Function {
            params: members,
            return_type: Box::new(return_type),
            variadic: false,
            position: open.span.start,
        });
    }

    if members.len() == 1 && !trailing_comma {
        return Ok(members.remove(0));
    }

    Ok(TypeAnnotation::Tuple {
        elements: members,
        position: open.span.start,
    })
}

/// `{name: T, other: U}`
pub fn parse_record_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let open = parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let name = parser.expect(TokenKind::Identifier)?.value;
        parser.expect(TokenKind::Colon)?;
        fields.push((name, parse_type(parser, BindingPower::Default)?));

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseCurly {
            return Err(parser.unexpected("expected `,` between record fields"));
        }
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(TypeAnnotation::Record {
        fields,
        position: open.span.start,
    })
}

pub fn parse_array_type(
    parser: &mut Parser,
    left: TypeAnnotation,
    _bp: BindingPower,
) -> Result<TypeAnnotation, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    parser.expect(TokenKind::CloseBracket)?;

    let position = left.position().clone();
    Ok(TypeAnnotation::Generic {
        name: String::from("Array"),
        args: vec![left],
        position,
    })
}

pub fn parse_union_type(
    parser: &mut Parser,
    left: TypeAnnotation,
    bp: BindingPower,
) -> Result<TypeAnnotation, Error> {
    parser.advance();
    let right = parse_type(parser, bp)?;

    let position = left.position().clone();
    let mut members = match left {
        TypeAnnotation::Union { members, .. } => members,
        other => vec![other],
    };
    members.push(right);

    Ok(TypeAnnotation::Union { members, position })
}

pub fn parse_intersection_type(
    parser: &mut Parser,
    left: TypeAnnotation,
    bp: BindingPower,
) -> Result<TypeAnnotation, Error> {
    parser.advance();
    let right = parse_type(parser, bp)?;

    let position = left.position().clone();
    let mut members = match left {
        TypeAnnotation::Intersection { members, .. } => members,
        other => vec![other],
    };
    members.push(right);

    Ok(TypeAnnotation::Intersection { members, position })
}

pub fn parse_type(parser: &mut Parser, bp: BindingPower) -> Result<TypeAnnotation, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(handler) => *handler,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_type_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_type_led_lookup().get(&token_kind) {
            Some(handler) => *handler,
            None => break,
        };
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}
