use std::rc::Rc;

use crate::{
    ast::{
        expressions::{Expr, ExprKind},
        types::Type,
    },
    containers::range::{string_range, LazyRange},
    errors::errors::{Error, ErrorImpl},
    type_checker::compat::fold_union,
    Position,
};

use super::{
    interpreter::Interpreter,
    methods::get_member,
    operators::{evaluate_binary, evaluate_unary},
    value::{Key, TypedValue, Value},
};

pub fn evaluate_expression(interpreter: &mut Interpreter, expr: &Expr) -> Result<TypedValue, Error> {
    let position = expr.position();

    match &expr.kind {
        ExprKind::Integer(value) => Ok(TypedValue::int(*value)),
        ExprKind::Float(value) => Ok(TypedValue::float(*value)),
        ExprKind::Str(value) => Ok(TypedValue::string(value.clone())),
        ExprKind::Boolean(value) => Ok(TypedValue::boolean(*value)),
        ExprKind::Array(elements) => {
            let items = evaluate_all(interpreter, elements)?;
            let element = items
                .iter()
                .map(|item| item.static_type().clone())
                .reduce(fold_union)
                .unwrap_or(Type::Weak);
            Ok(TypedValue::array(items, element))
        }
        ExprKind::Tuple(elements) => {
            let items = evaluate_all(interpreter, elements)?;
            Ok(TypedValue::from_value(Value::Tuple(Rc::new(items))))
        }
        ExprKind::Record(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            for (name, value) in fields {
                values.push((name.clone(), evaluate_expression(interpreter, value)?));
            }
            Ok(TypedValue::from_value(Value::Record(Rc::new(values))))
        }
        ExprKind::Identifier(name) => {
            let found = interpreter.env.borrow().get(name);
            found.ok_or_else(|| Error::runtime(ErrorImpl::UndefinedVariable { name: name.clone() }, position))
        }
        ExprKind::Binary { op, left, right } => {
            let left = evaluate_expression(interpreter, left)?;
            let right = evaluate_expression(interpreter, right)?;
            evaluate_binary(*op, &left, &right, &position)
        }
        ExprKind::Unary { op, operand } => {
            let operand = evaluate_expression(interpreter, operand)?;
            evaluate_unary(*op, &operand, &position)
        }
        ExprKind::Call { callee, arguments } => {
            let callee = evaluate_expression(interpreter, callee)?;
            let arguments = evaluate_all(interpreter, arguments)?;
            interpreter.call_function(&callee, arguments, &position)
        }
        ExprKind::Member { object, property } => {
            let object = evaluate_expression(interpreter, object)?;
            get_member(&object, property, &position)
        }
        ExprKind::Index { object, index } => {
            let object = evaluate_expression(interpreter, object)?;
            let index = evaluate_expression(interpreter, index)?;
            evaluate_index(&object, &index, &position)
        }
        ExprKind::Range {
            start,
            end,
            inclusive,
        } => {
            let start = evaluate_expression(interpreter, start)?;
            let end = match end {
                Some(end) => Some(evaluate_expression(interpreter, end)?),
                None => None,
            };
            evaluate_range(&start, end.as_ref(), *inclusive, &position)
        }
        ExprKind::TypeOf(operand) => {
            let operand = evaluate_expression(interpreter, operand)?;
            Ok(TypedValue::string(operand.value.kind_name()))
        }
        ExprKind::Assert { condition, message } => {
            if expect_boolean(interpreter, condition)? {
                return Ok(TypedValue::void());
            }
            let message = evaluate_expression(interpreter, message)?;
            Err(Error::runtime(
                ErrorImpl::AssertionFailed {
                    message: message.to_string(),
                },
                position,
            ))
        }
    }
}

fn evaluate_all(interpreter: &mut Interpreter, exprs: &[Expr]) -> Result<Vec<TypedValue>, Error> {
    exprs
        .iter()
        .map(|expr| evaluate_expression(interpreter, expr))
        .collect()
}

/// Evaluates a condition, which must be a boolean.
pub fn expect_boolean(interpreter: &mut Interpreter, condition: &Expr) -> Result<bool, Error> {
    match evaluate_expression(interpreter, condition)?.value {
        Value::Bool(value) => Ok(value),
        other => Err(Error::runtime(
            ErrorImpl::NonBooleanCondition {
                type_: other.kind_name().to_string(),
            },
            condition.position(),
        )),
    }
}

fn out_of_bounds(index: i64, length: usize, position: &Position) -> Error {
    Error::runtime(ErrorImpl::IndexOutOfBounds { index, length }, position.clone())
}

fn evaluate_index(object: &TypedValue, index: &TypedValue, position: &Position) -> Result<TypedValue, Error> {
    match (&object.value, &index.value) {
        (Value::Array(array), Value::Int(i)) => array
            .borrow()
            .get(*i)
            .cloned()
            .map_err(|error| Error::from_container(error, position.clone())),
        (Value::Str(string), Value::Int(i)) => {
            let length = string.chars().count();
            usize::try_from(*i)
                .ok()
                .and_then(|at| string.chars().nth(at))
                .map(|c| TypedValue::string(c.to_string()))
                .ok_or_else(|| out_of_bounds(*i, length, position))
        }
        (Value::Tuple(items), Value::Int(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| items.get(at))
            .cloned()
            .ok_or_else(|| out_of_bounds(*i, items.len(), position)),
        (Value::Map(map), _) => {
            let found = map
                .borrow()
                .get(&Key::of(&index.value))
                .map(|(_, value)| value.clone());
            found.ok_or_else(|| {
                Error::runtime(
                    ErrorImpl::KeyNotFound {
                        key: index.value.render(true),
                    },
                    position.clone(),
                )
            })
        }
        (Value::Array(_) | Value::Str(_) | Value::Tuple(_), other) => Err(Error::runtime(
            ErrorImpl::TypeMatchError {
                expected: String::from("int"),
                received: other.kind_name().to_string(),
            },
            position.clone(),
        )),
        (other, _) => Err(Error::runtime(
            ErrorImpl::NotIndexable {
                type_: other.kind_name().to_string(),
            },
            position.clone(),
        )),
    }
}

/// `int..int` is a lazy range; `string..string` enumerates into an array.
fn evaluate_range(
    start: &TypedValue,
    end: Option<&TypedValue>,
    inclusive: bool,
    position: &Position,
) -> Result<TypedValue, Error> {
    let invalid = |message: String| Error::runtime(ErrorImpl::InvalidRange { message }, position.clone());

    match (&start.value, end.map(|end| &end.value)) {
        (Value::Int(start), Some(Value::Int(end))) => Ok(TypedValue::new(
            Value::Range(LazyRange::new(*start, Some(*end), inclusive)),
            Type::Range,
        )),
        (Value::Int(start), None) => Ok(TypedValue::new(
            Value::Range(LazyRange::unbounded(*start)),
            Type::Range,
        )),
        (Value::Str(start), Some(Value::Str(end))) => {
            let items = string_range(start, end, inclusive)
                .map_err(|error| Error::from_container(error, position.clone()))?;
            Ok(TypedValue::array(
                items.into_iter().map(TypedValue::string).collect(),
                Type::String,
            ))
        }
        (Value::Str(start), None) => Err(invalid(format!("string range from {:?} needs an end", start))),
        (start, end) => Err(Error::runtime(
            ErrorImpl::InvalidOperands {
                operator: String::from(".."),
                left: start.kind_name().to_string(),
                right: end.map_or("void", Value::kind_name).to_string(),
            },
            position.clone(),
        )),
    }
}
