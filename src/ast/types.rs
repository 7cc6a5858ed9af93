//! Types and type annotations.
//!
//! `TypeAnnotation` is what the parser produces from source text; the type
//! checker resolves it into a `Type`. The checker also goes the other way
//! with `TypeAnnotation::from_type` when it writes an inferred type back into
//! the program.
//!
//! `Weak` marks a generic slot that is not known yet (a parameter without an
//! annotation, the element type of `Array()`). `Poly` is a permanent
//! wildcard used by polymorphic builtins such as `print`. Both are
//! compatible with every other type.

use std::fmt::Display;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    String,
    Boolean,
    Void,
    Poly,
    Weak,
    Range,
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Set(Box<Type>),
    Heap(Box<Type>),
    HeapMap(Box<Type>, Box<Type>),
    Graph(Box<Type>),
    BinaryTree(Box<Type>),
    AvlTree(Box<Type>),
    Tuple(Vec<Type>),
    /// Fields in declaration order.
    Record(Vec<(String, Type)>),
    Function(FunctionType),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Box<Type>,
    /// The last parameter accepts zero or more arguments.
    pub variadic: bool,
}

impl FunctionType {
    pub fn new(params: Vec<Type>, return_type: Type) -> Self {
        FunctionType {
            params,
            return_type: Box::new(return_type),
            variadic: false,
        }
    }

    pub fn variadic(params: Vec<Type>, return_type: Type) -> Self {
        FunctionType {
            params,
            return_type: Box::new(return_type),
            variadic: true,
        }
    }
}

impl Type {
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn function(params: Vec<Type>, return_type: Type) -> Type {
        Type::Function(FunctionType::new(params, return_type))
    }

    /// The spelling `typeof` uses for values of this type.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Void => "void",
            Type::Poly => "poly",
            Type::Weak => "weak",
            Type::Range => "range",
            Type::Array(_) => "array",
            Type::Map(..) => "map",
            Type::Set(_) => "set",
            Type::Heap(_) => "heap",
            Type::HeapMap(..) => "heapmap",
            Type::Graph(_) => "graph",
            Type::BinaryTree(_) => "binarytree",
            Type::AvlTree(_) => "avltree",
            Type::Tuple(_) => "tuple",
            Type::Record(_) => "record",
            Type::Function(_) => "function",
            Type::Union(_) => "union",
            Type::Intersection(_) => "intersection",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Type::Weak | Type::Poly)
    }

    /// Anything but `weak` and `poly` at the top level.
    pub fn is_concrete(&self) -> bool {
        !self.is_placeholder()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether `weak` or `poly` appears anywhere inside this type.
    pub fn contains_placeholder(&self) -> bool {
        match self {
            Type::Weak | Type::Poly => true,
            Type::Array(inner)
            | Type::Set(inner)
            | Type::Heap(inner)
            | Type::Graph(inner)
            | Type::BinaryTree(inner)
            | Type::AvlTree(inner) => inner.contains_placeholder(),
            Type::Map(key, value) | Type::HeapMap(key, value) => {
                key.contains_placeholder() || value.contains_placeholder()
            }
            Type::Tuple(members) | Type::Union(members) | Type::Intersection(members) => {
                members.iter().any(Type::contains_placeholder)
            }
            Type::Record(fields) => fields.iter().any(|(_, field)| field.contains_placeholder()),
            Type::Function(function) => {
                function.params.iter().any(Type::contains_placeholder)
                    || function.return_type.contains_placeholder()
            }
            Type::Int | Type::Float | Type::String | Type::Boolean | Type::Void | Type::Range => false,
        }
    }
}

fn join(types: &[Type], separator: &str) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Array(element) => write!(f, "Array<{}>", element),
            Type::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            Type::Set(element) => write!(f, "Set<{}>", element),
            Type::Heap(element) => write!(f, "Heap<{}>", element),
            Type::HeapMap(key, value) => write!(f, "HeapMap<{}, {}>", key, value),
            Type::Graph(node) => write!(f, "Graph<{}>", node),
            Type::BinaryTree(element) => write!(f, "BinaryTree<{}>", element),
            Type::AvlTree(element) => write!(f, "AVLTree<{}>", element),
            Type::Tuple(elements) => write!(f, "({})", join(elements, ", ")),
            Type::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, field)| format!("{}: {}", name, field))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", fields)
            }
            Type::Function(function) => {
                let mut params = join(&function.params, ", ");
                if function.variadic {
                    params.push_str("...");
                }
                write!(f, "({}) -> {}", params, function.return_type)
            }
            Type::Union(members) => write!(f, "{}", join(members, " | ")),
            Type::Intersection(members) => write!(f, "{}", join(members, " & ")),
            scalar => write!(f, "{}", scalar.kind_name()),
        }
    }
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAnnotation {
    Simple {
        name: String,
        position: Position,
    },
    Generic {
        name: String,
        args: Vec<TypeAnnotation>,
        position: Position,
    },
    Function {
        params: Vec<TypeAnnotation>,
        return_type: Box<TypeAnnotation>,
        variadic: bool,
        position: Position,
    },
    Union {
        members: Vec<TypeAnnotation>,
        position: Position,
    },
    Intersection {
        members: Vec<TypeAnnotation>,
        position: Position,
    },
    Tuple {
        elements: Vec<TypeAnnotation>,
        position: Position,
    },
    Record {
        fields: Vec<(String, TypeAnnotation)>,
        position: Position,
    },
}

impl TypeAnnotation {
    pub fn simple(name: &str, position: Position) -> Self {
        TypeAnnotation::Simple {
            name: name.to_string(),
            position,
        }
    }

    pub fn position(&self) -> &Position {
        match self {
            TypeAnnotation::Simple { position, .. }
            | TypeAnnotation::Generic { position, .. }
            | TypeAnnotation::Function { position, .. }
            | TypeAnnotation::Union { position, .. }
            | TypeAnnotation::Intersection { position, .. }
            | TypeAnnotation::Tuple { position, .. }
            | TypeAnnotation::Record { position, .. } => position,
        }
    }

    /// Writes a resolved type back out as an annotation that resolves to it again.
    pub fn from_type(ty: &Type, position: &Position) -> TypeAnnotation {
        let generic = |name: &str, args: Vec<&Type>| TypeAnnotation::Generic {
            name: name.to_string(),
            args: args
                .into_iter()
                .map(|arg| TypeAnnotation::from_type(arg, position))
                .collect(),
            position: position.clone(),
        };
        let all = |types: &[Type]| -> Vec<TypeAnnotation> {
            types
                .iter()
                .map(|t| TypeAnnotation::from_type(t, position))
                .collect()
        };

        match ty {
            Type::Array(element) => generic("Array", vec![element.as_ref()]),
            Type::Map(key, value) => generic("Map", vec![key.as_ref(), value.as_ref()]),
            Type::Set(element) => generic("Set", vec![element.as_ref()]),
            Type::Heap(element) => generic("Heap", vec![element.as_ref()]),
            Type::HeapMap(key, value) => generic("HeapMap", vec![key.as_ref(), value.as_ref()]),
            Type::Graph(node) => generic("Graph", vec![node.as_ref()]),
            Type::BinaryTree(element) => generic("BinaryTree", vec![element.as_ref()]),
            Type::AvlTree(element) => generic("AVLTree", vec![element.as_ref()]),
            Type::Tuple(elements) => TypeAnnotation::Tuple {
                elements: all(elements),
                position: position.clone(),
            },
            Type::Record(fields) => TypeAnnotation::Record {
                fields: fields
                    .iter()
                    .map(|(name, field)| (name.clone(), TypeAnnotation::from_type(field, position)))
                    .collect(),
                position: position.clone(),
            },
            Type::Function(function) => TypeAnnotation::Function {
                params: all(&function.params),
                return_type: Box::new(TypeAnnotation::from_type(&function.return_type, position)),
                variadic: function.variadic,
                position: position.clone(),
            },
            Type::Union(members) => TypeAnnotation::Union {
                members: all(members),
                position: position.clone(),
            },
            Type::Intersection(members) => TypeAnnotation::Intersection {
                members: all(members),
                position: position.clone(),
            },
            scalar => TypeAnnotation::simple(scalar.kind_name(), position.clone()),
        }
    }
}

impl Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(annotations: &[TypeAnnotation], separator: &str) -> String {
            annotations
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(separator)
        }

        match self {
            TypeAnnotation::Simple { name, .. } => write!(f, "{}", name),
            TypeAnnotation::Generic { name, args, .. } => write!(f, "{}<{}>", name, join(args, ", ")),
            TypeAnnotation::Function {
                params,
                return_type,
                variadic,
                ..
            } => {
                let dots = if *variadic { "..." } else { "" };
                write!(f, "({}{}) -> {}", join(params, ", "), dots, return_type)
            }
            TypeAnnotation::Union { members, .. } => write!(f, "{}", join(members, " | ")),
            TypeAnnotation::Intersection { members, .. } => write!(f, "{}", join(members, " & ")),
            TypeAnnotation::Tuple { elements, .. } => write!(f, "({})", join(elements, ", ")),
            TypeAnnotation::Record { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|(name, field)| format!("{}: {}", name, field))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", fields)
            }
        }
    }
}
