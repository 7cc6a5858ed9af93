use crate::{
    ast::{
        expressions::Expr,
        statements::{Block, FunctionDecl, Parameter, Stmt, StmtKind, VarDecl},
        types::TypeAnnotation,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let kind = parser.current_token_kind();
    if let Some(handler) = parser.get_stmt_lookup().get(&kind).copied() {
        let stmt = handler(parser)?;
        parser.skip_semicolons();
        return Ok(stmt);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    let stmt = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        Stmt::new(
            StmtKind::Assignment {
                target: expr.clone(),
                value: value.clone(),
            },
            expr.span.to(&value.span),
        )
    } else {
        Stmt::new(StmtKind::Expression(expr.clone()), expr.span)
    };

    parser.skip_semicolons();
    Ok(stmt)
}

/// `: type` if present.
fn parse_optional_annotation(parser: &mut Parser) -> Result<Option<TypeAnnotation>, Error> {
    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Ok(Some(parse_type(parser, BindingPower::Default)?))
    } else {
        Ok(None)
    }
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.get_position(),
    );
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    let annotation = parse_optional_annotation(parser)?;

    let error = parser.unexpected("variables must be initialised with `=`");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::new(
        StmtKind::VariableDeclaration(VarDecl {
            name,
            annotation,
            inferred: false,
            value: value.clone(),
        }),
        start_token.span.to(&value.span),
    ))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span;

    let mut body = Vec::new();
    loop {
        parser.skip_semicolons();
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => return Err(parser.unexpected("expected `}` to close the block")),
            _ => body.push(parse_stmt(parser)?),
        }
    }

    let end = parser.expect(TokenKind::CloseCurly)?.span;
    Ok(Block {
        body,
        span: start.to(&end),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let block = parse_block(parser)?;
    Ok(Stmt::new(StmtKind::Block(block.clone()), block.span))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(Box::new(parse_if_stmt(parser)?))
        } else {
            Some(Box::new(parse_block_stmt(parser)?))
        }
    } else {
        None
    };

    let end = match &else_branch {
        Some(stmt) => stmt.span.clone(),
        None => then_branch.span.clone(),
    };

    Ok(Stmt::new(
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        },
        start.to(&end),
    ))
}

fn parse_loop_parts(parser: &mut Parser) -> Result<(Span, Expr, Block), Error> {
    let start = parser.advance().span.clone();
    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;
    Ok((start, condition, body))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let (start, condition, body) = parse_loop_parts(parser)?;
    let span = start.to(&body.span);
    Ok(Stmt::new(StmtKind::While { condition, body }, span))
}

pub fn parse_until_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let (start, condition, body) = parse_loop_parts(parser)?;
    let span = start.to(&body.span);
    Ok(Stmt::new(StmtKind::Until { condition, body }, span))
}

/// `for name in iterable { .. }`
pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();
    let variable = parser.expect(TokenKind::Identifier)?.value;
    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    let span = start.to(&body.span);
    Ok(Stmt::new(
        StmtKind::For {
            variable,
            iterable,
            body,
        },
        span,
    ))
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let name = parser.expect(TokenKind::Identifier)?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let token = parser.expect(TokenKind::Identifier)?;
        let annotation = parse_optional_annotation(parser)?;
        parameters.push(Parameter {
            name: token.value,
            annotation,
            inferred: false,
            span: Span {
                start: token.span.start.clone(),
                end: parser.previous_end(),
            },
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` between parameters"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(parser)?;
    let span = start.to(&body.span);

    Ok(Stmt::new(
        StmtKind::FunctionDeclaration(FunctionDecl {
            name,
            parameters,
            return_type,
            return_inferred: false,
            body,
        }),
        span,
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.clone();

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    let span = match &value {
        Some(value) => start.to(&value.span),
        None => start,
    };
    Ok(Stmt::new(StmtKind::Return(value), span))
}
