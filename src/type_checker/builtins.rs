//! Signatures of the builtin functions and container members.
//!
//! `member_type` is consulted by inference, by the checker and by the
//! interpreter when it types the result of a method call, so all three agree
//! on what a member returns.

use crate::ast::types::{FunctionType, Type};

use super::type_checker::FunctionSignature;

pub fn builtin_functions() -> Vec<(&'static str, FunctionSignature)> {
    let weak = || Box::new(Type::Weak);
    let constructor = |ty: Type| FunctionSignature::new(vec![], ty, false);

    vec![
        ("print", FunctionSignature::new(vec![Type::Poly], Type::Void, true)),
        ("Array", constructor(Type::Array(weak()))),
        ("Map", constructor(Type::Map(weak(), weak()))),
        ("Set", constructor(Type::Set(weak()))),
        ("MinHeap", constructor(Type::Heap(weak()))),
        ("MaxHeap", constructor(Type::Heap(weak()))),
        ("MinHeapMap", constructor(Type::HeapMap(weak(), weak()))),
        ("MaxHeapMap", constructor(Type::HeapMap(weak(), weak()))),
        ("BinaryTree", constructor(Type::BinaryTree(weak()))),
        ("AVLTree", constructor(Type::AvlTree(weak()))),
        ("Graph", FunctionSignature::new(vec![Type::Boolean], Type::Graph(weak()), true)),
    ]
}

fn method(params: Vec<Type>, return_type: Type) -> Option<Type> {
    Some(Type::Function(FunctionType::new(params, return_type)))
}

/// The type of `receiver.property`, `None` if there is no such member.
///
/// Methods are function types; `length` and record fields are plain values.
/// A `weak` or `poly` receiver has members of unknown type.
pub fn member_type(receiver: &Type, property: &str) -> Option<Type> {
    use crate::ast::types::Type::{Boolean, Int, Void};

    match receiver {
        Type::Weak | Type::Poly => Some(Type::Weak),
        Type::String => match property {
            "length" => Some(Int),
            _ => None,
        },
        Type::Range => match property {
            "toArray" => method(vec![], Type::array(Int)),
            _ => None,
        },
        Type::Array(element) => {
            let element = element.as_ref().clone();
            match property {
                "length" => Some(Int),
                "push" => method(vec![element], Void),
                "pop" => method(vec![], element),
                "get" => method(vec![Int], element),
                "set" => method(vec![Int, element], Void),
                "size" => method(vec![], Int),
                "isEmpty" => method(vec![], Boolean),
                "contains" => method(vec![element], Boolean),
                _ => None,
            }
        }
        Type::Map(key, value) => {
            let (key, value) = (key.as_ref().clone(), value.as_ref().clone());
            match property {
                "set" => method(vec![key, value], Void),
                "get" => method(vec![key], value),
                "has" => method(vec![key], Boolean),
                "delete" => method(vec![key], Boolean),
                "keys" => method(vec![], Type::array(key)),
                "values" => method(vec![], Type::array(value)),
                "size" => method(vec![], Int),
                "isEmpty" => method(vec![], Boolean),
                _ => None,
            }
        }
        Type::Set(element) => {
            let element = element.as_ref().clone();
            match property {
                "add" => method(vec![element], Void),
                "has" => method(vec![element], Boolean),
                "delete" => method(vec![element], Boolean),
                "values" => method(vec![], Type::array(element)),
                "size" => method(vec![], Int),
                "isEmpty" => method(vec![], Boolean),
                _ => None,
            }
        }
        Type::Heap(element) => {
            let element = element.as_ref().clone();
            match property {
                "push" => method(vec![element], Void),
                "pop" | "peek" => method(vec![], element),
                "size" => method(vec![], Int),
                "isEmpty" => method(vec![], Boolean),
                _ => None,
            }
        }
        Type::HeapMap(key, value) => {
            let (key, value) = (key.as_ref().clone(), value.as_ref().clone());
            match property {
                "push" => method(vec![key, value], Void),
                "pop" | "peek" => method(vec![], key),
                "size" => method(vec![], Int),
                "isEmpty" => method(vec![], Boolean),
                _ => None,
            }
        }
        Type::BinaryTree(element) | Type::AvlTree(element) => {
            let element = element.as_ref().clone();
            match property {
                "insert" => method(vec![element], Void),
                "search" => method(vec![element], Boolean),
                "preOrderTraversal" | "inOrderTraversal" | "postOrderTraversal" => {
                    method(vec![], Type::array(element))
                }
                "getHeight" | "size" => method(vec![], Int),
                _ => None,
            }
        }
        Type::Graph(node) => {
            let node = node.as_ref().clone();
            match property {
                "addVertex" => method(vec![node], Void),
                "addEdge" => Some(Type::Function(FunctionType::variadic(
                    vec![node.clone(), node, Int],
                    Void,
                ))),
                "getNeighbors" => method(vec![node.clone()], Type::array(node)),
                "getEdges" => method(
                    vec![],
                    Type::array(Type::Tuple(vec![node.clone(), node, Int])),
                ),
                "hasEdge" => method(vec![node.clone(), node], Boolean),
                "getVertices" => method(vec![], Type::array(node)),
                "size" => method(vec![], Int),
                "isDirected" => method(vec![], Boolean),
                _ => None,
            }
        }
        Type::Record(fields) => fields
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, field)| field.clone()),
        _ => None,
    }
}
