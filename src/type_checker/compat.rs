//! Type compatibility and operator typing.

use crate::ast::{expressions::BinaryOp, types::Type};

/// Whether a value of type `source` may be used where `target` is expected.
///
/// Not an equivalence. `weak` and `poly` match anything. A union on either
/// side needs every member to match. An intersection source needs any
/// member to match, an intersection target needs all of them. Containers
/// are invariant in their parameters.
pub fn types_equal(source: &Type, target: &Type) -> bool {
    match (source, target) {
        (Type::Weak | Type::Poly, _) | (_, Type::Weak | Type::Poly) => true,

        (Type::Union(left), Type::Union(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|member| right.iter().any(|other| types_equal(member, other)))
        }
        (Type::Union(members), other) => members.iter().all(|member| types_equal(member, other)),
        (other, Type::Union(members)) => members.iter().all(|member| types_equal(other, member)),

        (Type::Intersection(members), other) => {
            members.iter().any(|member| types_equal(member, other))
        }
        (other, Type::Intersection(members)) => {
            members.iter().all(|member| types_equal(other, member))
        }

        (Type::Array(a), Type::Array(b))
        | (Type::Set(a), Type::Set(b))
        | (Type::Heap(a), Type::Heap(b))
        | (Type::Graph(a), Type::Graph(b))
        | (Type::BinaryTree(a), Type::BinaryTree(b))
        | (Type::AvlTree(a), Type::AvlTree(b)) => types_equal(a, b),
        (Type::Map(ak, av), Type::Map(bk, bv)) | (Type::HeapMap(ak, av), Type::HeapMap(bk, bv)) => {
            types_equal(ak, bk) && types_equal(av, bv)
        }

        (Type::Tuple(a), Type::Tuple(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| types_equal(x, y))
        }
        (Type::Record(a), Type::Record(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|((x_name, x), (y_name, y))| x_name == y_name && types_equal(x, y))
        }
        (Type::Function(a), Type::Function(b)) => {
            a.variadic == b.variadic
                && a.params.len() == b.params.len()
                && a.params.iter().zip(&b.params).all(|(x, y)| types_equal(x, y))
                && types_equal(&a.return_type, &b.return_type)
        }

        (Type::Int, Type::Int)
        | (Type::Float, Type::Float)
        | (Type::String, Type::String)
        | (Type::Boolean, Type::Boolean)
        | (Type::Void, Type::Void)
        | (Type::Range, Type::Range) => true,

        _ => false,
    }
}

/// Whether a `return` of `received` fits a function whose return type was
/// inferred.
///
/// Inference folds differing returns into a union, so each `return` is
/// accepted by its own member of that union. Written return types go
/// through `types_equal` alone.
pub fn fits_inferred_return(expected: &Type, received: &Type) -> bool {
    if types_equal(received, expected) {
        return true;
    }
    match (expected, received) {
        (_, Type::Union(_)) => false,
        (Type::Union(members), _) => members.iter().any(|member| types_equal(received, member)),
        _ => false,
    }
}

fn flatten(ty: Type) -> Vec<Type> {
    match ty {
        Type::Union(members) => members,
        other => vec![other],
    }
}

/// Folds `next` into `current`: equal types stay as they are, differing ones
/// become a flat union without duplicates. A placeholder gives way to the
/// other type.
pub fn fold_union(current: Type, next: Type) -> Type {
    if current == next || next.is_placeholder() {
        return current;
    }
    if current.is_placeholder() {
        return next;
    }

    let mut members = flatten(current);
    for member in flatten(next) {
        if !members.contains(&member) {
            members.push(member);
        }
    }

    if members.len() == 1 {
        members.remove(0)
    } else {
        Type::Union(members)
    }
}

/// Result type of a binary operator, `None` when the operands are invalid.
///
/// A placeholder operand takes the type of the other operand, so `x + 1`
/// with a `weak` x is an `int`.
pub fn binary_result_type(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    let (left, right) = match (left.is_placeholder(), right.is_placeholder()) {
        (true, true) => {
            let ty = match op {
                BinaryOp::FloatDivide => Type::Float,
                BinaryOp::Less
                | BinaryOp::LessEquals
                | BinaryOp::Greater
                | BinaryOp::GreaterEquals
                | BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::And
                | BinaryOp::Or => Type::Boolean,
                _ => Type::Weak,
            };
            return Some(ty);
        }
        (true, false) => (right, right),
        (false, true) => (left, left),
        (false, false) => (left, right),
    };

    match op {
        BinaryOp::Add => match (left, right) {
            (Type::String, Type::String) => Some(Type::String),
            _ => numeric_result(left, right),
        },
        BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Modulo => numeric_result(left, right),
        BinaryOp::Divide | BinaryOp::ShiftLeft | BinaryOp::ShiftRight => match (left, right) {
            (Type::Int, Type::Int) => Some(Type::Int),
            _ => None,
        },
        BinaryOp::FloatDivide => numeric_result(left, right).map(|_| Type::Float),
        BinaryOp::Less | BinaryOp::LessEquals | BinaryOp::Greater | BinaryOp::GreaterEquals => {
            numeric_result(left, right).map(|_| Type::Boolean)
        }
        BinaryOp::Equals | BinaryOp::NotEquals => Some(Type::Boolean),
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Type::Boolean, Type::Boolean) => Some(Type::Boolean),
            _ => None,
        },
    }
}

/// `int, int -> int`, any other numeric mix is `float`.
fn numeric_result(left: &Type, right: &Type) -> Option<Type> {
    match (left, right) {
        (Type::Int, Type::Int) => Some(Type::Int),
        (l, r) if l.is_numeric() && r.is_numeric() => Some(Type::Float),
        _ => None,
    }
}

/// Type of the loop variable when iterating over `ty`.
pub fn iteration_type(ty: &Type) -> Option<Type> {
    match ty {
        Type::Weak | Type::Poly => Some(Type::Weak),
        Type::Array(element) | Type::Set(element) => Some((**element).clone()),
        Type::Map(key, _) => Some((**key).clone()),
        Type::Range => Some(Type::Int),
        _ => None,
    }
}
