//! Binary and unary operators on runtime values.
//!
//! Integer arithmetic wraps on overflow. `/` is integer floor division and
//! `%` is the truncating remainder; both fail on a zero divisor. Mixed
//! `int`/`float` operands promote to `float`.

use std::cmp::Ordering;

use crate::{
    ast::expressions::{BinaryOp, UnaryOp},
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::value::{values_equal, TypedValue, Value};

enum Numeric {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric(left: &Value, right: &Value) -> Option<Numeric> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(Numeric::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(Numeric::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(Numeric::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(Numeric::Floats(*a, *b)),
        _ => None,
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        quotient.wrapping_sub(1)
    } else {
        quotient
    }
}

pub fn evaluate_binary(
    op: BinaryOp,
    left: &TypedValue,
    right: &TypedValue,
    position: &Position,
) -> Result<TypedValue, Error> {
    let invalid = || {
        Error::runtime(
            ErrorImpl::InvalidOperands {
                operator: op.symbol().to_string(),
                left: left.value.kind_name().to_string(),
                right: right.value.kind_name().to_string(),
            },
            position.clone(),
        )
    };
    let division_by_zero = || Error::runtime(ErrorImpl::DivisionByZero, position.clone());

    let (l, r) = (&left.value, &right.value);

    let result = match op {
        BinaryOp::Add => match (l, r) {
            (Value::Str(a), Value::Str(b)) => TypedValue::string(format!("{}{}", a, b)),
            _ => match numeric(l, r).ok_or_else(invalid)? {
                Numeric::Ints(a, b) => TypedValue::int(a.wrapping_add(b)),
                Numeric::Floats(a, b) => TypedValue::float(a + b),
            },
        },
        BinaryOp::Subtract => match numeric(l, r).ok_or_else(invalid)? {
            Numeric::Ints(a, b) => TypedValue::int(a.wrapping_sub(b)),
            Numeric::Floats(a, b) => TypedValue::float(a - b),
        },
        BinaryOp::Multiply => match numeric(l, r).ok_or_else(invalid)? {
            Numeric::Ints(a, b) => TypedValue::int(a.wrapping_mul(b)),
            Numeric::Floats(a, b) => TypedValue::float(a * b),
        },
        BinaryOp::Divide => match (l, r) {
            (Value::Int(_), Value::Int(0)) => return Err(division_by_zero()),
            (Value::Int(a), Value::Int(b)) => TypedValue::int(floor_div(*a, *b)),
            _ => return Err(invalid()),
        },
        BinaryOp::FloatDivide => match numeric(l, r).ok_or_else(invalid)? {
            Numeric::Ints(a, b) => TypedValue::float(a as f64 / b as f64),
            Numeric::Floats(a, b) => TypedValue::float(a / b),
        },
        BinaryOp::Modulo => match numeric(l, r).ok_or_else(invalid)? {
            Numeric::Ints(_, 0) => return Err(division_by_zero()),
            Numeric::Ints(a, b) => TypedValue::int(a.wrapping_rem(b)),
            Numeric::Floats(a, b) => TypedValue::float(a % b),
        },
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => match (l, r) {
            (Value::Int(a), Value::Int(b)) => {
                let shifted = if op == BinaryOp::ShiftLeft {
                    a.wrapping_shl(*b as u32)
                } else {
                    a.wrapping_shr(*b as u32)
                };
                TypedValue::int(shifted)
            }
            _ => return Err(invalid()),
        },
        BinaryOp::Less | BinaryOp::LessEquals | BinaryOp::Greater | BinaryOp::GreaterEquals => {
            let ordering = match numeric(l, r).ok_or_else(invalid)? {
                Numeric::Ints(a, b) => a.partial_cmp(&b),
                Numeric::Floats(a, b) => a.partial_cmp(&b),
            };
            // NaN compares false against everything.
            let outcome = match (op, ordering) {
                (_, None) => false,
                (BinaryOp::Less, Some(ordering)) => ordering == Ordering::Less,
                (BinaryOp::LessEquals, Some(ordering)) => ordering != Ordering::Greater,
                (BinaryOp::Greater, Some(ordering)) => ordering == Ordering::Greater,
                (_, Some(ordering)) => ordering != Ordering::Less,
            };
            TypedValue::boolean(outcome)
        }
        BinaryOp::Equals => TypedValue::boolean(values_equal(l, r)),
        BinaryOp::NotEquals => TypedValue::boolean(!values_equal(l, r)),
        BinaryOp::And | BinaryOp::Or => match (l, r) {
            (Value::Bool(a), Value::Bool(b)) => {
                TypedValue::boolean(if op == BinaryOp::And { *a && *b } else { *a || *b })
            }
            _ => return Err(invalid()),
        },
    };

    Ok(result)
}

pub fn evaluate_unary(op: UnaryOp, operand: &TypedValue, position: &Position) -> Result<TypedValue, Error> {
    let mismatch = |expected: &str| {
        Error::runtime(
            ErrorImpl::TypeMatchError {
                expected: expected.to_string(),
                received: operand.value.kind_name().to_string(),
            },
            position.clone(),
        )
    };

    match (op, &operand.value) {
        (UnaryOp::Negate, Value::Int(value)) => Ok(TypedValue::int(value.wrapping_neg())),
        (UnaryOp::Negate, Value::Float(value)) => Ok(TypedValue::float(-value)),
        (UnaryOp::Negate, _) => Err(mismatch("int | float")),
        (UnaryOp::Not, Value::Bool(value)) => Ok(TypedValue::boolean(!value)),
        (UnaryOp::Not, _) => Err(mismatch("boolean")),
    }
}
