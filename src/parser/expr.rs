use crate::{
    ast::expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
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
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(handler) => *handler,
            None => break,
        };
        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();

    let kind = match token.kind {
        TokenKind::Number if token.value.contains('.') => match token.value.parse() {
            Ok(value) => ExprKind::Float(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Number => match token.value.parse() {
            Ok(value) => ExprKind::Integer(value),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Identifier => ExprKind::Identifier(token.value),
        TokenKind::String => ExprKind::Str(token.value),
        TokenKind::True => ExprKind::Boolean(true),
        TokenKind::False => ExprKind::Boolean(false),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    Ok(Expr::new(kind, token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = BinaryOp::from_token(operator_token.kind).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value.clone(),
            },
            operator_token.span.start.clone(),
        )
    })?;

    let right = parse_expr(parser, bp)?;

    Ok(Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left.clone()),
            right: Box::new(right.clone()),
        },
        left.span.to(&right.span),
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = match operator_token.kind {
        TokenKind::Not => UnaryOp::Not,
        _ => UnaryOp::Negate,
    };
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(
        ExprKind::Unary {
            op,
            operand: Box::new(operand.clone()),
        },
        operator_token.span.to(&operand.span),
    ))
}

/// Whether the current token can begin an expression.
fn starts_expression(parser: &Parser) -> bool {
    let kind = parser.current_token_kind();
    kind != TokenKind::OpenCurly && parser.get_nud_lookup().contains_key(&kind)
}

pub fn parse_range_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let inclusive = operator_token.kind == TokenKind::DotDotEquals;

    // `start..` with nothing after it is unbounded.
    if !inclusive && !starts_expression(parser) {
        return Ok(Expr::new(
            ExprKind::Range {
                start: Box::new(left.clone()),
                end: None,
                inclusive: false,
            },
            left.span.to(&operator_token.span),
        ));
    }

    let end = parse_expr(parser, bp)?;
    Ok(Expr::new(
        ExprKind::Range {
            start: Box::new(left.clone()),
            end: Some(Box::new(end.clone())),
            inclusive,
        },
        left.span.to(&end.span),
    ))
}

/// Parses comma separated expressions up to `closing`, consuming it.
fn parse_expr_list(parser: &mut Parser, closing: TokenKind) -> Result<(Vec<Expr>, Span), Error> {
    let mut items = vec![];

    while parser.current_token_kind() != closing {
        items.push(parse_expr(parser, BindingPower::Comma)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != closing {
            return Err(parser.unexpected("expected `,` between items"));
        }
    }

    let close = parser.expect(closing)?;
    Ok((items, close.span))
}

/// `(expr)` groups, `()` and `(a, b, ..)` are tuples.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance().clone();

    if parser.current_token_kind() == TokenKind::CloseParen {
        let close = parser.advance().clone();
        return Ok(Expr::new(ExprKind::Tuple(vec![]), open.span.to(&close.span)));
    }

    let first = parse_expr(parser, BindingPower::Comma)?;
    if parser.current_token_kind() == TokenKind::CloseParen {
        parser.advance();
        return Ok(first);
    }

    parser.expect(TokenKind::Comma)?;
    let (mut rest, close) = parse_expr_list(parser, TokenKind::CloseParen)?;
    rest.insert(0, first);

    Ok(Expr::new(ExprKind::Tuple(rest), open.span.to(&close)))
}

pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance().clone();
    let (elements, close) = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(Expr::new(ExprKind::Array(elements), open.span.to(&close)))
}

pub fn parse_record_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance().clone();
    let mut fields = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let name = parser.expect(TokenKind::Identifier)?.value;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Comma)?;
        fields.push((name, value));

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseCurly {
            return Err(parser.unexpected("expected `,` between record fields"));
        }
    }

    let close = parser.expect(TokenKind::CloseCurly)?;
    Ok(Expr::new(ExprKind::Record(fields), open.span.to(&close.span)))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let (arguments, close) = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(Expr::new(
        ExprKind::Call {
            callee: Box::new(left.clone()),
            arguments,
        },
        left.span.to(&close),
    ))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    let close = parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::new(
        ExprKind::Index {
            object: Box::new(left.clone()),
            index: Box::new(index),
        },
        left.span.to(&close.span),
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected("expected a property name after `.`");
    let property = parser.expect_error(TokenKind::Identifier, Some(error))?;

    Ok(Expr::new(
        ExprKind::Member {
            object: Box::new(left.clone()),
            property: property.value,
        },
        left.span.to(&property.span),
    ))
}

pub fn parse_typeof_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let keyword = parser.advance().clone();
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(
        ExprKind::TypeOf(Box::new(operand.clone())),
        keyword.span.to(&operand.span),
    ))
}

/// `assert(condition, message)`
pub fn parse_assert_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let keyword = parser.advance().clone();
    parser.expect(TokenKind::OpenParen)?;
    let condition = parse_expr(parser, BindingPower::Comma)?;
    parser.expect(TokenKind::Comma)?;
    let message = parse_expr(parser, BindingPower::Comma)?;
    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(
        ExprKind::Assert {
            condition: Box::new(condition),
            message: Box::new(message),
        },
        keyword.span.to(&close.span),
    ))
}
