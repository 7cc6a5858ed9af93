//! Pass 1: fills in every missing annotation.
//!
//! Parameters without a type become `weak`. A function without a return type
//! gets the fold of the returns written directly in its body, or `void`.
//! Variables take the structural type of their initialiser. The result is a
//! new program; the input is left untouched.

use log::debug;

use crate::{
    ast::{
        ast::Program,
        expressions::{Expr, ExprKind, UnaryOp},
        statements::{Block, FunctionDecl, Parameter, Stmt, StmtKind, VarDecl},
        types::{Type, TypeAnnotation},
    },
    errors::errors::Error,
};

use super::{
    builtins::member_type,
    compat::{binary_result_type, fold_union, iteration_type},
    type_checker::{FunctionSignature, TypeChecker},
};

pub fn infer_program(checker: &mut TypeChecker, program: &Program) -> Result<Program, Error> {
    checker.reset();

    let body = infer_stmts(checker, &program.body)?;

    Ok(Program {
        body,
        span: program.span.clone(),
    })
}

fn infer_stmts(checker: &mut TypeChecker, stmts: &[Stmt]) -> Result<Vec<Stmt>, Error> {
    stmts.iter().map(|stmt| infer_stmt(checker, stmt)).collect()
}

fn infer_block(checker: &mut TypeChecker, block: &Block) -> Result<Block, Error> {
    let body = checker.scoped(|checker| infer_stmts(checker, &block.body))?;
    Ok(Block {
        body,
        span: block.span.clone(),
    })
}

fn infer_stmt(checker: &mut TypeChecker, stmt: &Stmt) -> Result<Stmt, Error> {
    let kind = match &stmt.kind {
        StmtKind::FunctionDeclaration(function) => {
            StmtKind::FunctionDeclaration(infer_function(checker, function)?)
        }
        StmtKind::VariableDeclaration(declaration) => {
            StmtKind::VariableDeclaration(infer_variable(checker, declaration)?)
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => StmtKind::If {
            condition: condition.clone(),
            then_branch: infer_block(checker, then_branch)?,
            else_branch: match else_branch {
                Some(else_branch) => Some(Box::new(infer_stmt(checker, else_branch)?)),
                None => None,
            },
        },
        StmtKind::While { condition, body } => StmtKind::While {
            condition: condition.clone(),
            body: infer_block(checker, body)?,
        },
        StmtKind::Until { condition, body } => StmtKind::Until {
            condition: condition.clone(),
            body: infer_block(checker, body)?,
        },
        StmtKind::For {
            variable,
            iterable,
            body,
        } => {
            let element = iteration_type(&infer_expression(checker, iterable)).unwrap_or(Type::Weak);
            let body = checker.scoped(|checker| {
                checker.bind(variable, element);
                infer_block(checker, body)
            })?;
            StmtKind::For {
                variable: variable.clone(),
                iterable: iterable.clone(),
                body,
            }
        }
        StmtKind::Block(block) => StmtKind::Block(infer_block(checker, block)?),
        StmtKind::Assignment { .. } | StmtKind::Return(_) | StmtKind::Expression(_) => {
            stmt.kind.clone()
        }
    };

    Ok(Stmt::new(kind, stmt.span.clone()))
}

fn infer_variable(checker: &mut TypeChecker, declaration: &VarDecl) -> Result<VarDecl, Error> {
    let (ty, annotation, inferred) = match &declaration.annotation {
        Some(annotation) => (
            checker.resolve_annotation(annotation)?,
            annotation.clone(),
            declaration.inferred,
        ),
        None => {
            let ty = infer_expression(checker, &declaration.value);
            let annotation = TypeAnnotation::from_type(&ty, &declaration.value.position());
            (ty, annotation, true)
        }
    };

    checker.bind(&declaration.name, ty);

    Ok(VarDecl {
        name: declaration.name.clone(),
        annotation: Some(annotation),
        inferred,
        value: declaration.value.clone(),
    })
}

fn infer_function(checker: &mut TypeChecker, function: &FunctionDecl) -> Result<FunctionDecl, Error> {
    let mut parameters = Vec::with_capacity(function.parameters.len());
    let mut param_types = Vec::with_capacity(function.parameters.len());

    for parameter in &function.parameters {
        let (annotation, inferred) = match &parameter.annotation {
            Some(annotation) => (annotation.clone(), parameter.inferred),
            None => (TypeAnnotation::simple("weak", parameter.span.start.clone()), true),
        };
        param_types.push(checker.resolve_annotation(&annotation)?);
        parameters.push(Parameter {
            name: parameter.name.clone(),
            annotation: Some(annotation),
            inferred,
            span: parameter.span.clone(),
        });
    }

    let declared_return = match &function.return_type {
        Some(annotation) => Some(checker.resolve_annotation(annotation)?),
        None => None,
    };

    let (body, return_type) = checker.scoped(|checker| -> Result<(Block, Type), Error> {
        for (parameter, ty) in function.parameters.iter().zip(&param_types) {
            checker.bind(&parameter.name, ty.clone());
        }
        // Registered early so recursive calls resolve.
        checker.function_env.insert(
            function.name.clone(),
            FunctionSignature::new(
                param_types.clone(),
                declared_return.clone().unwrap_or(Type::Weak),
                false,
            ),
        );

        let body = infer_stmts(checker, &function.body.body)?;

        let return_type = match &declared_return {
            Some(ty) => ty.clone(),
            None => fold_direct_returns(checker, &body),
        };

        Ok((
            Block {
                body,
                span: function.body.span.clone(),
            },
            return_type,
        ))
    })?;

    debug!(
        "inferred {}({}) -> {}",
        function.name,
        param_types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        return_type
    );

    checker.function_env.insert(
        function.name.clone(),
        FunctionSignature::new(param_types, return_type.clone(), false),
    );

    let (return_annotation, return_inferred) = match &function.return_type {
        Some(annotation) => (annotation.clone(), function.return_inferred),
        None => (
            TypeAnnotation::from_type(&return_type, &function.body.span.start),
            true,
        ),
    };

    Ok(FunctionDecl {
        name: function.name.clone(),
        parameters,
        return_type: Some(return_annotation),
        return_inferred,
        body,
    })
}

/// Fold of the `return` statements that are direct children of a function body.
fn fold_direct_returns(checker: &TypeChecker, body: &[Stmt]) -> Type {
    body.iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Return(value) => Some(match value {
                Some(value) => infer_expression(checker, value),
                None => Type::Void,
            }),
            _ => None,
        })
        .reduce(fold_union)
        .unwrap_or(Type::Void)
}

/// Structural type of an expression as far as it can be told without
/// failing. Anything unknown is `weak`.
pub fn infer_expression(checker: &TypeChecker, expr: &Expr) -> Type {
    match &expr.kind {
        ExprKind::Integer(_) => Type::Int,
        ExprKind::Float(_) => Type::Float,
        ExprKind::Str(_) => Type::String,
        ExprKind::Boolean(_) => Type::Boolean,
        ExprKind::Array(elements) => Type::array(
            elements
                .iter()
                .map(|element| infer_expression(checker, element))
                .reduce(fold_union)
                .unwrap_or(Type::Weak),
        ),
        ExprKind::Tuple(elements) => Type::Tuple(
            elements
                .iter()
                .map(|element| infer_expression(checker, element))
                .collect(),
        ),
        ExprKind::Record(fields) => Type::Record(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), infer_expression(checker, value)))
                .collect(),
        ),
        ExprKind::Identifier(name) => checker.lookup(name).unwrap_or(Type::Weak),
        ExprKind::Binary { op, left, right } => binary_result_type(
            *op,
            &infer_expression(checker, left),
            &infer_expression(checker, right),
        )
        .unwrap_or(Type::Weak),
        ExprKind::Unary { op, operand } => match op {
            UnaryOp::Not => Type::Boolean,
            UnaryOp::Negate => infer_expression(checker, operand),
        },
        ExprKind::Call { callee, .. } => match infer_expression(checker, callee) {
            Type::Function(function) => *function.return_type,
            _ => Type::Weak,
        },
        ExprKind::Member { object, property } => {
            member_type(&infer_expression(checker, object), property).unwrap_or(Type::Weak)
        }
        ExprKind::Index { object, index } => {
            match infer_expression(checker, object) {
                Type::Array(element) => *element,
                Type::Map(_, value) => *value,
                Type::String => Type::String,
                Type::Tuple(elements) => match index.kind {
                    ExprKind::Integer(i) if i >= 0 => {
                        elements.get(i as usize).cloned().unwrap_or(Type::Weak)
                    }
                    _ => Type::Weak,
                },
                _ => Type::Weak,
            }
        }
        ExprKind::Range { start, .. } => match infer_expression(checker, start) {
            Type::String => Type::array(Type::String),
            _ => Type::Range,
        },
        ExprKind::TypeOf(_) => Type::String,
        ExprKind::Assert { .. } => Type::Void,
    }
}
