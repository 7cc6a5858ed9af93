//! Member access and method dispatch on runtime values.
//!
//! `receiver.property` resolves through the same table the type checker uses
//! (`member_type`). A method resolves to a fresh native function that closes
//! over the receiver handle; calling it runs `call_method` and retypes the
//! result with the method's declared return type.

use std::rc::Rc;

use log::trace;

use crate::{
    ast::types::{FunctionType, Type},
    containers::{graph::Edge, ContainerError},
    errors::errors::{Error, ErrorImpl},
    type_checker::builtins::member_type,
    Position,
};

use super::{
    interpreter::Interpreter,
    value::{values_equal, Key, NativeFunction, TypedValue, Value},
};

pub fn get_member(receiver: &TypedValue, property: &str, position: &Position) -> Result<TypedValue, Error> {
    if let Value::Record(fields) = &receiver.value {
        return fields
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| {
                Error::runtime(
                    ErrorImpl::MissingField {
                        field: property.to_string(),
                    },
                    position.clone(),
                )
            });
    }

    let receiver_type = receiver.dispatch_type();
    let unknown = || {
        Error::runtime(
            ErrorImpl::UnknownMember {
                type_: receiver_type.to_string(),
                property: property.to_string(),
            },
            position.clone(),
        )
    };

    match member_type(&receiver_type, property) {
        Some(Type::Function(signature)) => Ok(bind_method(receiver, property, signature)),
        Some(ty) => property_value(receiver, property).map(|value| value.retyped(&ty)).ok_or_else(unknown),
        None => Err(unknown()),
    }
}

fn property_value(receiver: &TypedValue, property: &str) -> Option<TypedValue> {
    match (&receiver.value, property) {
        (Value::Str(value), "length") => Some(TypedValue::int(value.chars().count() as i64)),
        (Value::Array(array), "length") => Some(TypedValue::int(array.borrow().len() as i64)),
        _ => None,
    }
}

fn bind_method(receiver: &TypedValue, property: &str, signature: FunctionType) -> TypedValue {
    let name = format!("{}.{}", receiver.value.kind_name(), property);
    let receiver = receiver.clone();
    let property = property.to_string();
    let return_type = signature.return_type.as_ref().clone();
    let method_type = Type::Function(signature.clone());

    let native = NativeFunction {
        name,
        function: Box::new(
            move |_: &mut Interpreter,
                  arguments: Vec<TypedValue>,
                  position: &Position|
                  -> Result<TypedValue, Error> {
                check_arity(&signature, arguments.len(), position)?;
                trace!("calling method `{}` on {}", property, receiver.value.kind_name());
                let result = call_method(&receiver, &property, arguments, position)?;
                Ok(result.retyped(&return_type))
            },
        ),
    };

    TypedValue::new(Value::Native(Rc::new(native)), method_type)
}

/// Runtime arity check for natives; the checker reports the same mismatch statically.
pub fn check_arity(signature: &FunctionType, received: usize, position: &Position) -> Result<(), Error> {
    let expected = signature.params.len();
    let error = if signature.variadic {
        (received + 1 < expected).then_some(ErrorImpl::MissingArguments { expected, received })
    } else if received > expected {
        Some(ErrorImpl::UnexpectedArguments { expected, received })
    } else if received < expected {
        Some(ErrorImpl::MissingArguments { expected, received })
    } else {
        None
    };

    match error {
        Some(error) => Err(Error::runtime(error, position.clone())),
        None => Ok(()),
    }
}

fn container_error(position: &Position) -> impl Fn(ContainerError) -> Error + '_ {
    move |error| Error::from_container(error, position.clone())
}

fn index_of(value: &TypedValue, position: &Position) -> Result<i64, Error> {
    match value.value {
        Value::Int(index) => Ok(index),
        _ => Err(Error::runtime(
            ErrorImpl::TypeMatchError {
                expected: String::from("int"),
                received: value.value.kind_name().to_string(),
            },
            position.clone(),
        )),
    }
}

/// Runs a method whose arity has already been checked.
pub fn call_method(
    receiver: &TypedValue,
    property: &str,
    arguments: Vec<TypedValue>,
    position: &Position,
) -> Result<TypedValue, Error> {
    let arg = |i: usize| arguments.get(i).cloned().unwrap_or_else(TypedValue::void);
    let to_error = container_error(position);
    let unknown = || {
        Error::runtime(
            ErrorImpl::UnknownMember {
                type_: receiver.value.kind_name().to_string(),
                property: property.to_string(),
            },
            position.clone(),
        )
    };

    let result = match &receiver.value {
        Value::Array(array) => match property {
            "push" => {
                array.borrow_mut().push(arg(0));
                TypedValue::void()
            }
            "pop" => array.borrow_mut().pop().map_err(&to_error)?,
            "get" => {
                let index = index_of(&arg(0), position)?;
                array.borrow().get(index).map_err(&to_error)?.clone()
            }
            "set" => {
                let index = index_of(&arg(0), position)?;
                array.borrow_mut().set(index, arg(1)).map_err(&to_error)?;
                TypedValue::void()
            }
            "size" => TypedValue::int(array.borrow().len() as i64),
            "isEmpty" => TypedValue::boolean(array.borrow().is_empty()),
            "contains" => {
                let needle = arg(0);
                let found = array.borrow().iter().any(|item| values_equal(&item.value, &needle.value));
                TypedValue::boolean(found)
            }
            _ => return Err(unknown()),
        },
        Value::Map(map) => match property {
            "set" => {
                let key = arg(0);
                let value = arg(1);
                map.borrow_mut().insert(Key::of(&key.value), (key, value));
                TypedValue::void()
            }
            "get" => {
                let key = arg(0);
                let found = map.borrow().get(&Key::of(&key.value)).map(|(_, value)| value.clone());
                found.ok_or_else(|| {
                    Error::runtime(
                        ErrorImpl::KeyNotFound {
                            key: key.value.render(true),
                        },
                        position.clone(),
                    )
                })?
            }
            "has" => TypedValue::boolean(map.borrow().contains_key(&Key::of(&arg(0).value))),
            "delete" => TypedValue::boolean(map.borrow_mut().remove(&Key::of(&arg(0).value)).is_some()),
            "keys" => {
                let keys = map.borrow().values().map(|(key, _)| key.clone()).collect();
                TypedValue::array(keys, Type::Weak)
            }
            "values" => {
                let values = map.borrow().values().map(|(_, value)| value.clone()).collect();
                TypedValue::array(values, Type::Weak)
            }
            "size" => TypedValue::int(map.borrow().len() as i64),
            "isEmpty" => TypedValue::boolean(map.borrow().is_empty()),
            _ => return Err(unknown()),
        },
        Value::Set(set) => match property {
            "add" => {
                let item = arg(0);
                set.borrow_mut().insert(Key::of(&item.value), item);
                TypedValue::void()
            }
            "has" => TypedValue::boolean(set.borrow().contains(&Key::of(&arg(0).value))),
            "delete" => TypedValue::boolean(set.borrow_mut().remove(&Key::of(&arg(0).value))),
            "values" => TypedValue::array(set.borrow().iter().cloned().collect(), Type::Weak),
            "size" => TypedValue::int(set.borrow().len() as i64),
            "isEmpty" => TypedValue::boolean(set.borrow().is_empty()),
            _ => return Err(unknown()),
        },
        Value::Heap(heap) => match property {
            "push" => {
                heap.borrow_mut().push(arg(0));
                TypedValue::void()
            }
            "pop" => heap.borrow_mut().pop().map_err(&to_error)?,
            "peek" => heap.borrow().peek().map_err(&to_error)?.clone(),
            "size" => TypedValue::int(heap.borrow().len() as i64),
            "isEmpty" => TypedValue::boolean(heap.borrow().is_empty()),
            _ => return Err(unknown()),
        },
        Value::HeapMap(heap) => match property {
            "push" => {
                let key = arg(0);
                let value = arg(1);
                heap.borrow_mut().push(key, value);
                TypedValue::void()
            }
            "pop" => heap.borrow_mut().pop().map_err(&to_error)?,
            "peek" => heap.borrow().peek().map_err(&to_error)?.clone(),
            "size" => TypedValue::int(heap.borrow().len() as i64),
            "isEmpty" => TypedValue::boolean(heap.borrow().is_empty()),
            _ => return Err(unknown()),
        },
        Value::Tree(tree) => match property {
            "insert" => {
                tree.borrow_mut().insert(arg(0));
                TypedValue::void()
            }
            "search" => TypedValue::boolean(tree.borrow().search(&arg(0))),
            "preOrderTraversal" => TypedValue::array(tree.borrow().pre_order(), Type::Weak),
            "inOrderTraversal" => TypedValue::array(tree.borrow().in_order(), Type::Weak),
            "postOrderTraversal" => TypedValue::array(tree.borrow().post_order(), Type::Weak),
            "getHeight" => TypedValue::int(tree.borrow().height()),
            "size" => TypedValue::int(tree.borrow().len() as i64),
            _ => return Err(unknown()),
        },
        Value::Graph(graph) => match property {
            "addVertex" => {
                graph.borrow_mut().add_vertex(arg(0));
                TypedValue::void()
            }
            "addEdge" => {
                let from = arg(0);
                let to = arg(1);
                let weight = match arguments.get(2) {
                    Some(weight) => index_of(&weight, position)?,
                    None => 1,
                };
                graph.borrow_mut().add_edge(from, to, weight);
                TypedValue::void()
            }
            "getNeighbors" => TypedValue::array(graph.borrow().neighbors(&arg(0)), Type::Weak),
            "getEdges" => {
                let edges = graph
                    .borrow()
                    .edges()
                    .into_iter()
                    .map(|Edge { from, to, weight }| {
                        TypedValue::from_value(Value::Tuple(Rc::new(vec![from, to, TypedValue::int(weight)])))
                    })
                    .collect();
                TypedValue::array(edges, Type::Weak)
            }
            "hasEdge" => {
                let from = arg(0);
                let to = arg(1);
                TypedValue::boolean(graph.borrow().has_edge(&from, &to))
            }
            "getVertices" => TypedValue::array(graph.borrow().vertices(), Type::Weak),
            "size" => TypedValue::int(graph.borrow().vertex_count() as i64),
            "isDirected" => TypedValue::boolean(graph.borrow().is_directed()),
            _ => return Err(unknown()),
        },
        Value::Range(range) => match property {
            "toArray" => {
                let values = range.materialize().ok_or_else(|| {
                    Error::runtime(
                        ErrorImpl::InvalidRange {
                            message: format!("`{}` is unbounded and cannot become an array", range),
                        },
                        position.clone(),
                    )
                })?;
                TypedValue::array(values.into_iter().map(TypedValue::int).collect(), Type::Int)
            }
            _ => return Err(unknown()),
        },
        _ => return Err(unknown()),
    };

    Ok(result)
}
