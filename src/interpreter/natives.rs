//! Builtin functions bound in the global frame.
//!
//! Signatures come from `builtins::builtin_functions` so arity and result
//! types match what the checker assumed.

use std::rc::Rc;

use crate::{
    ast::types::FunctionType,
    containers::{
        array::SchemaArray,
        graph::Graph,
        heap::{Heap, HeapKind},
        heap_map::HeapMap,
        map::{SchemaMap, SchemaSet},
        tree::{AvlTree, BinaryTree},
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::builtins::builtin_functions,
    Position,
};

use super::{
    environment::EnvRef,
    interpreter::Interpreter,
    methods::check_arity,
    value::{shared, value_comparator, Key, NativeFunction, Tree, TypedValue, Value},
};

pub fn install_natives(globals: &EnvRef) {
    for (name, signature) in builtin_functions() {
        let function_type = signature.as_type();
        let return_type = signature.return_type.clone();
        let checked = FunctionType {
            params: signature.params,
            return_type: Box::new(signature.return_type),
            variadic: signature.variadic,
        };

        let native = NativeFunction {
            name: name.to_string(),
            function: Box::new(
                move |interpreter: &mut Interpreter,
                      arguments: Vec<TypedValue>,
                      position: &Position|
                      -> Result<TypedValue, Error> {
                    check_arity(&checked, arguments.len(), position)?;
                    call_native(name, interpreter, arguments, position)
                        .map(|value| value.retyped(&return_type))
                },
            ),
        };

        globals
            .borrow_mut()
            .define(name, TypedValue::new(Value::Native(Rc::new(native)), function_type));
    }
}

fn call_native(
    name: &str,
    interpreter: &mut Interpreter,
    arguments: Vec<TypedValue>,
    position: &Position,
) -> Result<TypedValue, Error> {
    let value = match name {
        "print" => {
            let line = arguments
                .iter()
                .map(|argument| argument.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            interpreter.emit(line);
            Value::Void
        }
        "Array" => Value::Array(shared(SchemaArray::new())),
        "Map" => Value::Map(shared(SchemaMap::new())),
        "Set" => Value::Set(shared(SchemaSet::new())),
        "MinHeap" => Value::Heap(shared(Heap::new(HeapKind::Min, value_comparator()))),
        "MaxHeap" => Value::Heap(shared(Heap::new(HeapKind::Max, value_comparator()))),
        "MinHeapMap" => Value::HeapMap(shared(HeapMap::new(HeapKind::Min, value_comparator()))),
        "MaxHeapMap" => Value::HeapMap(shared(HeapMap::new(HeapKind::Max, value_comparator()))),
        "BinaryTree" => Value::Tree(shared(Tree::Binary(BinaryTree::new(value_comparator())))),
        "AVLTree" => Value::Tree(shared(Tree::Avl(AvlTree::new(value_comparator())))),
        "Graph" => {
            let directed = match arguments.first().map(|argument| &argument.value) {
                None => false,
                Some(Value::Bool(directed)) => *directed,
                Some(other) => {
                    return Err(Error::runtime(
                        ErrorImpl::ArgumentTypeMatchError {
                            expected: String::from("boolean"),
                            received: other.kind_name().to_string(),
                        },
                        position.clone(),
                    ))
                }
            };
            Value::Graph(shared(Graph::new(
                directed,
                Rc::new(|vertex: &TypedValue| Key::of(&vertex.value)),
            )))
        }
        other => {
            return Err(Error::runtime(
                ErrorImpl::NotCallable {
                    type_: other.to_string(),
                },
                position.clone(),
            ))
        }
    };

    Ok(TypedValue::from_value(value))
}
