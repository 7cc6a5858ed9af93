//! Runtime values.
//!
//! Every value travels as a `TypedValue`: the value itself plus the static
//! type it was created or declared with. Containers are shared handles, so
//! copying a `TypedValue` aliases the container rather than duplicating it.

use std::{cell::RefCell, cmp::Ordering, collections::HashMap, fmt::Display, rc::Rc};

use crate::{
    ast::{statements::Block, types::Type},
    containers::{
        array::SchemaArray,
        graph::Graph,
        heap::Heap,
        heap_map::HeapMap,
        map::{SchemaMap, SchemaSet},
        range::LazyRange,
        tree::{AvlTree, BinaryTree},
        Comparator,
    },
    errors::errors::Error,
    Position,
};

use super::interpreter::Interpreter;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Static side of a `TypedValue`.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticType {
    pub static_type: Type,
    /// Reserved. Always empty.
    pub refinements: Vec<Type>,
}

#[derive(Clone)]
pub struct TypedValue {
    pub value: Value,
    pub ty: StaticType,
}

impl TypedValue {
    pub fn new(value: Value, static_type: Type) -> Self {
        TypedValue {
            value,
            ty: StaticType {
                static_type,
                refinements: vec![],
            },
        }
    }

    /// Wraps a value with the type its shape implies.
    pub fn from_value(value: Value) -> Self {
        let static_type = value.shape_type();
        TypedValue::new(value, static_type)
    }

    pub fn int(value: i64) -> Self {
        TypedValue::new(Value::Int(value), Type::Int)
    }

    pub fn float(value: f64) -> Self {
        TypedValue::new(Value::Float(value), Type::Float)
    }

    pub fn string(value: impl Into<String>) -> Self {
        TypedValue::new(Value::Str(value.into()), Type::String)
    }

    pub fn boolean(value: bool) -> Self {
        TypedValue::new(Value::Bool(value), Type::Boolean)
    }

    pub fn void() -> Self {
        TypedValue::new(Value::Void, Type::Void)
    }

    pub fn array(items: Vec<TypedValue>, element: Type) -> Self {
        TypedValue::new(
            Value::Array(shared(SchemaArray::from_vec(items))),
            Type::array(element),
        )
    }

    pub fn static_type(&self) -> &Type {
        &self.ty.static_type
    }

    /// Replaces the static type when `ty` is concrete.
    pub fn retyped(mut self, ty: &Type) -> Self {
        if ty.is_concrete() {
            self.ty.static_type = ty.clone();
        }
        self
    }

    /// The static type when it describes this value's kind, otherwise the
    /// value's own shape.
    pub fn dispatch_type(&self) -> Type {
        if self.ty.static_type.kind_name() == self.value.kind_name() {
            self.ty.static_type.clone()
        } else {
            self.value.shape_type()
        }
    }
}

impl Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value.render(false))
    }
}

impl std::fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.value.render(true), self.ty.static_type)
    }
}

pub type NativeFn = dyn Fn(&mut Interpreter, Vec<TypedValue>, &Position) -> Result<TypedValue, Error>;

pub struct NativeFunction {
    pub name: String,
    pub function: Box<NativeFn>,
}

/// A user defined function.
pub struct FunctionValue {
    pub name: String,
    pub parameters: Vec<(String, Type)>,
    pub return_type: Type,
    pub body: Block,
    /// Every binding visible at the declaration, flattened into one frame.
    pub closure: HashMap<String, TypedValue>,
}

pub enum Tree {
    Binary(BinaryTree<TypedValue>),
    Avl(AvlTree<TypedValue>),
}

impl Tree {
    pub fn name(&self) -> &'static str {
        match self {
            Tree::Binary(_) => "BinaryTree",
            Tree::Avl(_) => "AVLTree",
        }
    }

    pub fn insert(&mut self, value: TypedValue) {
        match self {
            Tree::Binary(tree) => tree.insert(value),
            Tree::Avl(tree) => tree.insert(value),
        }
    }

    pub fn search(&self, value: &TypedValue) -> bool {
        match self {
            Tree::Binary(tree) => tree.search(value),
            Tree::Avl(tree) => tree.search(value),
        }
    }

    pub fn pre_order(&self) -> Vec<TypedValue> {
        let values = match self {
            Tree::Binary(tree) => tree.pre_order(),
            Tree::Avl(tree) => tree.pre_order(),
        };
        values.into_iter().cloned().collect()
    }

    pub fn in_order(&self) -> Vec<TypedValue> {
        let values = match self {
            Tree::Binary(tree) => tree.in_order(),
            Tree::Avl(tree) => tree.in_order(),
        };
        values.into_iter().cloned().collect()
    }

    pub fn post_order(&self) -> Vec<TypedValue> {
        let values = match self {
            Tree::Binary(tree) => tree.post_order(),
            Tree::Avl(tree) => tree.post_order(),
        };
        values.into_iter().cloned().collect()
    }

    pub fn height(&self) -> i64 {
        match self {
            Tree::Binary(tree) => tree.height(),
            Tree::Avl(tree) => tree.height(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Tree::Binary(tree) => tree.len(),
            Tree::Avl(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map entries keep the original key next to the value.
pub type MapStorage = SchemaMap<Key, (TypedValue, TypedValue)>;

#[derive(Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Void,
    Array(Shared<SchemaArray<TypedValue>>),
    Map(Shared<MapStorage>),
    Set(Shared<SchemaSet<Key, TypedValue>>),
    Heap(Shared<Heap<TypedValue>>),
    HeapMap(Shared<HeapMap<TypedValue, TypedValue>>),
    Tree(Shared<Tree>),
    Graph(Shared<Graph<TypedValue, Key>>),
    Range(LazyRange),
    Tuple(Rc<Vec<TypedValue>>),
    Record(Rc<Vec<(String, TypedValue)>>),
    Function(Rc<FunctionValue>),
    Native(Rc<NativeFunction>),
}

impl Value {
    /// The name `typeof` reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Void => "void",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::Heap(_) => "heap",
            Value::HeapMap(_) => "heapmap",
            Value::Tree(tree) => match &*tree.borrow() {
                Tree::Binary(_) => "binarytree",
                Tree::Avl(_) => "avltree",
            },
            Value::Graph(_) => "graph",
            Value::Range(_) => "range",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// The type implied by the value alone. Container slots are `weak`.
    pub fn shape_type(&self) -> Type {
        let weak = || Box::new(Type::Weak);
        match self {
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::String,
            Value::Bool(_) => Type::Boolean,
            Value::Void => Type::Void,
            Value::Array(_) => Type::Array(weak()),
            Value::Map(_) => Type::Map(weak(), weak()),
            Value::Set(_) => Type::Set(weak()),
            Value::Heap(_) => Type::Heap(weak()),
            Value::HeapMap(_) => Type::HeapMap(weak(), weak()),
            Value::Tree(tree) => match &*tree.borrow() {
                Tree::Binary(_) => Type::BinaryTree(weak()),
                Tree::Avl(_) => Type::AvlTree(weak()),
            },
            Value::Graph(_) => Type::Graph(weak()),
            Value::Range(_) => Type::Range,
            Value::Tuple(items) => Type::Tuple(items.iter().map(|item| item.static_type().clone()).collect()),
            Value::Record(fields) => Type::Record(
                fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.static_type().clone()))
                    .collect(),
            ),
            Value::Function(function) => Type::function(
                function.parameters.iter().map(|(_, ty)| ty.clone()).collect(),
                function.return_type.clone(),
            ),
            Value::Native(_) => Type::Poly,
        }
    }

    /// Strings are quoted when `nested` inside another value.
    pub fn render(&self, nested: bool) -> String {
        match self {
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format_float(*value),
            Value::Str(value) if nested => format!("{:?}", value),
            Value::Str(value) => value.clone(),
            Value::Bool(value) => value.to_string(),
            Value::Void => String::from("void"),
            Value::Array(array) => format!("[{}]", render_all(array.borrow().iter())),
            Value::Map(map) => {
                let map = map.borrow();
                let entries = map.values().map(|(key, value)| (key, value));
                format!("{{{}}}", render_entries(entries))
            }
            Value::Set(set) => format!("Set{{{}}}", render_all(set.borrow().iter())),
            Value::Heap(heap) => {
                let heap = heap.borrow();
                format!("{}[{}]", heap.kind().name(), render_all(heap.iter()))
            }
            Value::HeapMap(heap) => {
                let heap = heap.borrow();
                format!("{}Map[{}]", heap.kind().name(), render_entries(heap.iter()))
            }
            Value::Tree(tree) => {
                let tree = tree.borrow();
                format!("{}[{}]", tree.name(), render_all(tree.in_order().iter()))
            }
            Value::Graph(graph) => {
                let entries = graph
                    .borrow()
                    .adjacency()
                    .iter()
                    .map(|(vertex, targets)| {
                        format!("{} -> [{}]", vertex.value.render(true), render_all(targets.iter()))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Graph{{{}}}", entries)
            }
            Value::Range(range) => range.to_string(),
            Value::Tuple(items) => format!("({})", render_all(items.iter())),
            Value::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value.value.render(true)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", fields)
            }
            Value::Function(function) => format!("<function {}>", function.name),
            Value::Native(native) => format!("<native {}>", native.name),
        }
    }
}

fn render_all<'a>(items: impl Iterator<Item = &'a TypedValue>) -> String {
    items
        .map(|item| item.value.render(true))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_entries<'a>(entries: impl Iterator<Item = (&'a TypedValue, &'a TypedValue)>) -> String {
    entries
        .map(|(key, value)| format!("{}: {}", key.value.render(true), value.value.render(true)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Canonical key of a value stored in a map, set, heap map or graph.
///
/// Scalars are keyed by their payload, and a float holding a whole number
/// shares the key of the matching int, so `1` and `1.0` find the same
/// entry. Composite values are keyed by the identity of their shared
/// storage, so two equal-looking arrays are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    /// Bit pattern of a float with a fractional part, NaN or an infinity.
    Float(u64),
    Str(String),
    Bool(bool),
    Void,
    Range(i64, Option<i64>, bool),
    Identity(usize),
}

impl Key {
    pub fn of(value: &Value) -> Key {
        fn identity<T>(rc: &Rc<T>) -> Key {
            Key::Identity(Rc::as_ptr(rc) as *const () as usize)
        }

        match value {
            Value::Int(value) => Key::Int(*value),
            Value::Float(value) => {
                let whole = value.fract() == 0.0 && *value >= i64::MIN as f64 && *value < i64::MAX as f64;
                if whole {
                    Key::Int(*value as i64)
                } else {
                    Key::Float(value.to_bits())
                }
            }
            Value::Str(value) => Key::Str(value.clone()),
            Value::Bool(value) => Key::Bool(*value),
            Value::Void => Key::Void,
            Value::Array(rc) => identity(rc),
            Value::Map(rc) => identity(rc),
            Value::Set(rc) => identity(rc),
            Value::Heap(rc) => identity(rc),
            Value::HeapMap(rc) => identity(rc),
            Value::Tree(rc) => identity(rc),
            Value::Graph(rc) => identity(rc),
            Value::Tuple(rc) => identity(rc),
            Value::Record(rc) => identity(rc),
            Value::Function(rc) => identity(rc),
            Value::Native(rc) => identity(rc),
            Value::Range(range) => Key::Range(range.start, range.end, range.inclusive),
        }
    }
}

/// `==` on values. Defined for scalars and `void`; composites never compare equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Void, Value::Void) => true,
        _ => false,
    }
}

/// Ordering used by heaps and trees. Numbers compare numerically, strings
/// and booleans by their natural order; anything else is unordered.
pub fn compare_values(left: &TypedValue, right: &TypedValue) -> Ordering {
    match (&left.value, &right.value) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

pub fn value_comparator() -> Comparator<TypedValue> {
    Rc::new(compare_values)
}
