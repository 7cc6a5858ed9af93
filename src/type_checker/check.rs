//! Pass 3: checks the annotated program.
//!
//! `synth_expression` derives the type of an expression and
//! `check_expression` checks one against an expected type. Every mismatch is
//! a positioned error. The pass starts from a clean state, so running it
//! again over the same program gives the same outcome.

use log::trace;

use crate::{
    ast::{
        ast::Program,
        expressions::{Expr, ExprKind, UnaryOp},
        statements::{Block, FunctionDecl, Stmt, StmtKind},
        types::{FunctionType, Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    builtins::member_type,
    compat::{binary_result_type, fits_inferred_return, fold_union, iteration_type, types_equal},
    type_checker::{FunctionSignature, TypeChecker},
};

pub fn check_program(checker: &mut TypeChecker, program: &Program) -> Result<(), Error> {
    checker.reset();
    check_stmts(checker, &program.body)
}

fn check_stmts(checker: &mut TypeChecker, stmts: &[Stmt]) -> Result<(), Error> {
    for stmt in stmts {
        check_stmt(checker, stmt)?;
    }
    Ok(())
}

fn check_block(checker: &mut TypeChecker, block: &Block) -> Result<(), Error> {
    checker.scoped(|checker| check_stmts(checker, &block.body))
}

fn resolve(checker: &TypeChecker, annotation: Option<&TypeAnnotation>) -> Result<Type, Error> {
    match annotation {
        Some(annotation) => checker.resolve_annotation(annotation),
        None => Ok(Type::Weak),
    }
}

fn mismatch(expected: &Type, received: &Type, position: Position) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position,
    )
}

fn check_condition(checker: &mut TypeChecker, condition: &Expr) -> Result<(), Error> {
    check_expression(checker, condition, &Type::Boolean).map(|_| ())
}

fn check_stmt(checker: &mut TypeChecker, stmt: &Stmt) -> Result<(), Error> {
    match &stmt.kind {
        StmtKind::FunctionDeclaration(function) => check_function(checker, function),
        StmtKind::VariableDeclaration(declaration) => {
            let received = synth_expression(checker, &declaration.value)?;
            let ty = match &declaration.annotation {
                Some(annotation) => {
                    let declared = checker.resolve_annotation(annotation)?;
                    if !types_equal(&received, &declared) {
                        return Err(mismatch(&declared, &received, declaration.value.position()));
                    }
                    declared
                }
                None => received,
            };
            checker.bind(&declaration.name, ty);
            Ok(())
        }
        StmtKind::Assignment { target, value } => check_assignment(checker, target, value),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            check_condition(checker, condition)?;
            check_block(checker, then_branch)?;
            match else_branch {
                Some(else_branch) => check_stmt(checker, else_branch),
                None => Ok(()),
            }
        }
        StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
            check_condition(checker, condition)?;
            check_block(checker, body)
        }
        StmtKind::For {
            variable,
            iterable,
            body,
        } => {
            let iterable_type = synth_expression(checker, iterable)?;
            let element = iteration_type(&iterable_type).ok_or_else(|| {
                Error::new(
                    ErrorImpl::NotIterable {
                        type_: iterable_type.to_string(),
                    },
                    iterable.position(),
                )
            })?;
            checker.scoped(|checker| {
                checker.bind(variable, element);
                check_block(checker, body)
            })
        }
        StmtKind::Return(value) => {
            let Some(function) = checker.current_function.clone() else {
                return Err(Error::new(ErrorImpl::ReturnOutsideFunction, stmt.position()));
            };
            let (received, position) = match value {
                Some(value) => (synth_expression(checker, value)?, value.position()),
                None => (Type::Void, stmt.position()),
            };
            let fits = if checker.return_inferred {
                fits_inferred_return(&function.return_type, &received)
            } else {
                types_equal(&received, &function.return_type)
            };
            if !fits {
                return Err(Error::new(
                    ErrorImpl::ReturnTypeMatchError {
                        expected: function.return_type.to_string(),
                        received: received.to_string(),
                    },
                    position,
                ));
            }
            Ok(())
        }
        StmtKind::Block(block) => check_block(checker, block),
        StmtKind::Expression(expr) => synth_expression(checker, expr).map(|_| ()),
    }
}

fn check_function(checker: &mut TypeChecker, function: &FunctionDecl) -> Result<(), Error> {
    let params = function
        .parameters
        .iter()
        .map(|parameter| resolve(checker, parameter.annotation.as_ref()))
        .collect::<Result<Vec<_>, Error>>()?;
    let return_type = match &function.return_type {
        Some(annotation) => checker.resolve_annotation(annotation)?,
        None => Type::Void,
    };
    let signature = FunctionSignature::new(params, return_type, false);

    trace!("checking function `{}`: {}", function.name, signature.as_type());
    checker
        .function_env
        .insert(function.name.clone(), signature.clone());

    let previous = checker.current_function.replace(signature.clone());
    let previous_inferred = std::mem::replace(&mut checker.return_inferred, function.return_inferred);
    let result = checker.scoped(|checker| {
        for (parameter, ty) in function.parameters.iter().zip(&signature.params) {
            checker.bind(&parameter.name, ty.clone());
        }
        check_stmts(checker, &function.body.body)
    });
    checker.current_function = previous;
    checker.return_inferred = previous_inferred;

    result
}

fn check_assignment(checker: &mut TypeChecker, target: &Expr, value: &Expr) -> Result<(), Error> {
    let received = synth_expression(checker, value)?;

    match &target.kind {
        ExprKind::Identifier(name) if name == "_" => Ok(()),
        ExprKind::Identifier(name) => {
            let Some(expected) = checker.type_env.get(name).cloned() else {
                return Err(Error::new(
                    ErrorImpl::UndefinedIdentifier { name: name.clone() },
                    target.position(),
                ));
            };
            if !types_equal(&received, &expected) {
                return Err(mismatch(&expected, &received, value.position()));
            }
            Ok(())
        }
        ExprKind::Index { object, index } => {
            let object_type = synth_expression(checker, object)?;
            let expected = match &object_type {
                Type::Weak | Type::Poly => return synth_expression(checker, index).map(|_| ()),
                Type::Array(element) => {
                    check_expression(checker, index, &Type::Int)?;
                    element.as_ref().clone()
                }
                Type::Map(key, value) => {
                    check_expression(checker, index, key)?;
                    value.as_ref().clone()
                }
                other => {
                    return Err(Error::new(
                        ErrorImpl::NotIndexable {
                            type_: other.to_string(),
                        },
                        object.position(),
                    ))
                }
            };
            if !types_equal(&received, &expected) {
                return Err(mismatch(&expected, &received, value.position()));
            }
            Ok(())
        }
        _ => Err(Error::new(ErrorImpl::InvalidAssignmentTarget, target.position())),
    }
}

/// Checks `expr` against `expected` and returns its synthesized type.
pub fn check_expression(checker: &mut TypeChecker, expr: &Expr, expected: &Type) -> Result<Type, Error> {
    let received = synth_expression(checker, expr)?;
    if types_equal(&received, expected) {
        Ok(received)
    } else {
        Err(mismatch(expected, &received, expr.position()))
    }
}

pub fn synth_expression(checker: &mut TypeChecker, expr: &Expr) -> Result<Type, Error> {
    match &expr.kind {
        ExprKind::Integer(_) => Ok(Type::Int),
        ExprKind::Float(_) => Ok(Type::Float),
        ExprKind::Str(_) => Ok(Type::String),
        ExprKind::Boolean(_) => Ok(Type::Boolean),
        ExprKind::Array(elements) => {
            let mut element = None;
            for item in elements {
                let ty = synth_expression(checker, item)?;
                element = Some(match element {
                    Some(current) => fold_union(current, ty),
                    None => ty,
                });
            }
            Ok(Type::array(element.unwrap_or(Type::Weak)))
        }
        ExprKind::Tuple(elements) => Ok(Type::Tuple(
            elements
                .iter()
                .map(|element| synth_expression(checker, element))
                .collect::<Result<_, _>>()?,
        )),
        ExprKind::Record(fields) => {
            let mut typed = Vec::with_capacity(fields.len());
            for (name, value) in fields {
                typed.push((name.clone(), synth_expression(checker, value)?));
            }
            Ok(Type::Record(typed))
        }
        ExprKind::Identifier(name) => checker.lookup(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UndefinedIdentifier { name: name.clone() },
                expr.position(),
            )
        }),
        ExprKind::Binary { op, left, right } => {
            let left_type = synth_expression(checker, left)?;
            let right_type = synth_expression(checker, right)?;
            binary_result_type(*op, &left_type, &right_type).ok_or_else(|| {
                Error::new(
                    ErrorImpl::InvalidOperands {
                        operator: op.symbol().to_string(),
                        left: left_type.to_string(),
                        right: right_type.to_string(),
                    },
                    expr.position(),
                )
            })
        }
        ExprKind::Unary { op, operand } => {
            let ty = synth_expression(checker, operand)?;
            match op {
                UnaryOp::Not if ty == Type::Boolean || ty.is_placeholder() => Ok(Type::Boolean),
                UnaryOp::Negate if ty.is_numeric() || ty.is_placeholder() => Ok(ty),
                UnaryOp::Not => Err(mismatch(&Type::Boolean, &ty, operand.position())),
                UnaryOp::Negate => Err(mismatch(
                    &Type::Union(vec![Type::Int, Type::Float]),
                    &ty,
                    operand.position(),
                )),
            }
        }
        ExprKind::Call { callee, arguments } => synth_call(checker, expr, callee, arguments),
        ExprKind::Member { object, property } => {
            let object_type = synth_expression(checker, object)?;
            member_type(&object_type, property).ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnknownProperty {
                        type_: object_type.to_string(),
                        property: property.clone(),
                    },
                    expr.position(),
                )
            })
        }
        ExprKind::Index { object, index } => {
            let object_type = synth_expression(checker, object)?;
            match &object_type {
                Type::Weak | Type::Poly => {
                    synth_expression(checker, index)?;
                    Ok(Type::Weak)
                }
                Type::Array(element) => {
                    check_expression(checker, index, &Type::Int)?;
                    Ok(element.as_ref().clone())
                }
                Type::String => {
                    check_expression(checker, index, &Type::Int)?;
                    Ok(Type::String)
                }
                Type::Map(key, value) => {
                    check_expression(checker, index, key)?;
                    Ok(value.as_ref().clone())
                }
                Type::Tuple(elements) => {
                    check_expression(checker, index, &Type::Int)?;
                    // Out of range literals are left to the interpreter.
                    match index.kind {
                        ExprKind::Integer(i) if i >= 0 && (i as usize) < elements.len() => {
                            Ok(elements[i as usize].clone())
                        }
                        _ => Ok(Type::Weak),
                    }
                }
                other => Err(Error::new(
                    ErrorImpl::NotIndexable {
                        type_: other.to_string(),
                    },
                    object.position(),
                )),
            }
        }
        ExprKind::Range { start, end, .. } => {
            let start_type = synth_expression(checker, start)?;
            let end_type = match end {
                Some(end) => synth_expression(checker, end)?,
                None => Type::Int,
            };
            let bound = if start_type.is_placeholder() { &end_type } else { &start_type };
            match (bound, end.is_some()) {
                (Type::String, true) if types_equal(&end_type, &Type::String) => {
                    Ok(Type::array(Type::String))
                }
                (Type::Int | Type::Weak | Type::Poly, _) if types_equal(&end_type, &Type::Int) => {
                    Ok(Type::Range)
                }
                _ => Err(Error::new(
                    ErrorImpl::InvalidOperands {
                        operator: String::from(".."),
                        left: start_type.to_string(),
                        right: end_type.to_string(),
                    },
                    expr.position(),
                )),
            }
        }
        ExprKind::TypeOf(operand) => {
            synth_expression(checker, operand)?;
            Ok(Type::String)
        }
        ExprKind::Assert { condition, message } => {
            check_expression(checker, condition, &Type::Boolean)?;
            synth_expression(checker, message)?;
            Ok(Type::Void)
        }
    }
}

fn not_callable(ty: &Type, position: Position) -> Error {
    Error::new(
        ErrorImpl::NotCallable {
            type_: ty.to_string(),
        },
        position,
    )
}

fn synth_call(
    checker: &mut TypeChecker,
    expr: &Expr,
    callee: &Expr,
    arguments: &[Expr],
) -> Result<Type, Error> {
    let callee_type = match &callee.kind {
        ExprKind::Identifier(name) => match checker.lookup(name) {
            Some(ty) => ty,
            None => {
                return Err(Error::new(
                    ErrorImpl::UndefinedFunction { name: name.clone() },
                    callee.position(),
                ))
            }
        },
        _ => synth_expression(checker, callee)?,
    };

    match callee_type {
        Type::Function(function) => check_arguments(checker, &function, arguments, expr.position()),
        Type::Weak | Type::Poly => {
            for argument in arguments {
                synth_expression(checker, argument)?;
            }
            Ok(Type::Weak)
        }
        other => Err(not_callable(&other, callee.position())),
    }
}

/// Checks arity and argument types, returning the call's result type.
///
/// A variadic function accepts zero or more arguments for its last parameter.
fn check_arguments(
    checker: &mut TypeChecker,
    function: &FunctionType,
    arguments: &[Expr],
    position: Position,
) -> Result<Type, Error> {
    let expected = function.params.len();
    let received = arguments.len();

    if function.variadic {
        let required = expected.saturating_sub(1);
        if received < required {
            return Err(Error::new(
                ErrorImpl::MissingArguments {
                    expected: required,
                    received,
                },
                position,
            ));
        }
    } else if received > expected {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments { expected, received },
            position,
        ));
    } else if received < expected {
        return Err(Error::new(
            ErrorImpl::MissingArguments { expected, received },
            position,
        ));
    }

    for (i, argument) in arguments.iter().enumerate() {
        let param = function
            .params
            .get(i)
            .or_else(|| function.params.last())
            .cloned()
            .unwrap_or(Type::Poly);
        let argument_type = synth_expression(checker, argument)?;
        if !types_equal(&argument_type, &param) {
            return Err(Error::new(
                ErrorImpl::ArgumentTypeMatchError {
                    expected: param.to_string(),
                    received: argument_type.to_string(),
                },
                argument.position(),
            ));
        }
    }

    Ok(function.return_type.as_ref().clone())
}
