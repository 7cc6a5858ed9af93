use std::rc::Rc;

use log::debug;

use crate::{
    ast::{
        expressions::{Expr, ExprKind},
        statements::{Block, FunctionDecl, Stmt, StmtKind},
        types::{Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::type_checker::resolve_annotation,
};

use super::{
    expr::{evaluate_expression, expect_boolean},
    interpreter::{Completion, Interpreter},
    value::{FunctionValue, Key, TypedValue, Value},
};

/// Declared type of a binding. Unresolvable annotations only reach here
/// when checking is off, and then behave as `weak`.
fn declared_type(annotation: Option<&TypeAnnotation>) -> Type {
    annotation
        .and_then(|annotation| resolve_annotation(annotation).ok())
        .unwrap_or(Type::Weak)
}

pub fn execute_statement(interpreter: &mut Interpreter, stmt: &Stmt) -> Result<Completion, Error> {
    match &stmt.kind {
        StmtKind::FunctionDeclaration(function) => {
            declare_function(interpreter, function);
            Ok(Completion::Normal)
        }
        StmtKind::VariableDeclaration(declaration) => {
            let value = evaluate_expression(interpreter, &declaration.value)?;
            let declared = declared_type(declaration.annotation.as_ref());
            interpreter
                .env
                .borrow_mut()
                .define(&declaration.name, value.retyped(&declared));
            Ok(Completion::Normal)
        }
        StmtKind::Assignment { target, value } => {
            assign(interpreter, target, value)?;
            Ok(Completion::Normal)
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            if expect_boolean(interpreter, condition)? {
                let env = interpreter.child_env();
                interpreter.execute_block(then_branch, env)
            } else if let Some(else_branch) = else_branch {
                execute_statement(interpreter, else_branch)
            } else {
                Ok(Completion::Normal)
            }
        }
        StmtKind::While { condition, body } => {
            while expect_boolean(interpreter, condition)? {
                if let Completion::Return(value) = execute_body(interpreter, body)? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        }
        StmtKind::Until { condition, body } => {
            while !expect_boolean(interpreter, condition)? {
                if let Completion::Return(value) = execute_body(interpreter, body)? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        }
        StmtKind::For {
            variable,
            iterable,
            body,
        } => {
            let iterable_value = evaluate_expression(interpreter, iterable)?;
            for item in iterate(&iterable_value, iterable)? {
                let env = interpreter.child_env();
                env.borrow_mut().define(variable, item);
                if let Completion::Return(value) = interpreter.execute_block(body, env)? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        }
        StmtKind::Return(value) => {
            let value = match value {
                Some(value) => evaluate_expression(interpreter, value)?,
                None => TypedValue::void(),
            };
            Ok(Completion::Return(value))
        }
        StmtKind::Block(block) => execute_body(interpreter, block),
        StmtKind::Expression(expr) => {
            evaluate_expression(interpreter, expr)?;
            Ok(Completion::Normal)
        }
    }
}

fn execute_body(interpreter: &mut Interpreter, block: &Block) -> Result<Completion, Error> {
    let env = interpreter.child_env();
    interpreter.execute_block(block, env)
}

fn declare_function(interpreter: &mut Interpreter, function: &FunctionDecl) {
    let parameters = function
        .parameters
        .iter()
        .map(|parameter| (parameter.name.clone(), declared_type(parameter.annotation.as_ref())))
        .collect();

    let closure = interpreter.env.borrow().flatten();
    debug!(
        "declared function `{}` capturing {} bindings",
        function.name,
        closure.len()
    );

    let value = FunctionValue {
        name: function.name.clone(),
        parameters,
        return_type: declared_type(function.return_type.as_ref()),
        body: function.body.clone(),
        closure,
    };
    let value = TypedValue::from_value(Value::Function(Rc::new(value)));

    interpreter.env.borrow_mut().define(&function.name, value);
}

fn assign(interpreter: &mut Interpreter, target: &Expr, value: &Expr) -> Result<(), Error> {
    let position = target.position();

    match &target.kind {
        ExprKind::Identifier(name) if name == "_" => {
            evaluate_expression(interpreter, value)?;
            Ok(())
        }
        ExprKind::Identifier(name) => {
            let value = evaluate_expression(interpreter, value)?;
            // Keeps the declared type of the variable.
            let value = match interpreter.env.borrow().get(name) {
                Some(previous) => value.retyped(previous.static_type()),
                None => value,
            };
            interpreter
                .env
                .borrow_mut()
                .set(name, value)
                .map_err(|error| Error::runtime(error, position))
        }
        ExprKind::Index { object, index } => {
            let object = evaluate_expression(interpreter, object)?;
            let index = evaluate_expression(interpreter, index)?;
            let value = evaluate_expression(interpreter, value)?;

            match (&object.value, &index.value) {
                (Value::Array(array), Value::Int(index)) => {
                    let stored = array.borrow_mut().set(*index, value);
                    stored.map_err(|error| Error::from_container(error, position))
                }
                (Value::Map(map), _) => {
                    map.borrow_mut().insert(Key::of(&index.value), (index.clone(), value));
                    Ok(())
                }
                (Value::Array(_), other) => Err(Error::runtime(
                    ErrorImpl::TypeMatchError {
                        expected: String::from("int"),
                        received: other.kind_name().to_string(),
                    },
                    position,
                )),
                (other, _) => Err(Error::runtime(
                    ErrorImpl::NotIndexable {
                        type_: other.kind_name().to_string(),
                    },
                    position,
                )),
            }
        }
        _ => Err(Error::runtime(ErrorImpl::InvalidAssignmentTarget, position)),
    }
}

/// Items a `for` loop visits. Arrays are snapshotted; ranges stay lazy.
fn iterate(iterable: &TypedValue, expr: &Expr) -> Result<Box<dyn Iterator<Item = TypedValue>>, Error> {
    let items: Box<dyn Iterator<Item = TypedValue>> = match &iterable.value {
        Value::Array(array) => Box::new(array.borrow().to_vec().into_iter()),
        Value::Set(set) => Box::new(set.borrow().iter().cloned().collect::<Vec<_>>().into_iter()),
        Value::Map(map) => Box::new(
            map.borrow()
                .values()
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>()
                .into_iter(),
        ),
        Value::Range(range) => Box::new(range.iter().map(TypedValue::int)),
        other => {
            return Err(Error::runtime(
                ErrorImpl::NotIterable {
                    type_: other.kind_name().to_string(),
                },
                expr.position(),
            ))
        }
    };
    Ok(items)
}
