use std::collections::HashMap;

use log::debug;

use crate::{
    ast::{
        ast::Program,
        types::{FunctionType, Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{builtins::builtin_functions, check::check_program, infer::infer_program, refine::refine_program};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub params: Vec<Type>,
    pub return_type: Type,
    pub variadic: bool,
}

impl FunctionSignature {
    pub fn new(params: Vec<Type>, return_type: Type, variadic: bool) -> Self {
        FunctionSignature {
            params,
            return_type,
            variadic,
        }
    }

    pub fn as_type(&self) -> Type {
        Type::Function(FunctionType {
            params: self.params.clone(),
            return_type: Box::new(self.return_type.clone()),
            variadic: self.variadic,
        })
    }
}

impl From<&FunctionType> for FunctionSignature {
    fn from(function: &FunctionType) -> Self {
        FunctionSignature::new(
            function.params.clone(),
            (*function.return_type).clone(),
            function.variadic,
        )
    }
}

/// State shared by the three checker passes.
///
/// `type_env` holds variables, `function_env` declared and builtin
/// functions. Both are copied when a scope is entered and restored when it
/// is left.
#[derive(Debug)]
pub struct TypeChecker {
    pub type_env: HashMap<String, Type>,
    pub function_env: HashMap<String, FunctionSignature>,
    pub current_function: Option<FunctionSignature>,
    /// Whether the return type of `current_function` was filled in by inference.
    pub return_inferred: bool,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        let mut checker = TypeChecker {
            type_env: HashMap::new(),
            function_env: HashMap::new(),
            current_function: None,
            return_inferred: false,
        };
        checker.reset();
        checker
    }

    /// Forgets every binding except the builtins.
    pub fn reset(&mut self) {
        self.type_env.clear();
        self.function_env = builtin_functions()
            .into_iter()
            .map(|(name, signature)| (name.to_string(), signature))
            .collect();
        self.current_function = None;
        self.return_inferred = false;
    }

    /// Runs `body` in a nested scope; bindings made inside are dropped afterwards.
    pub fn scoped<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        let saved_types = self.type_env.clone();
        let saved_functions = self.function_env.clone();

        let result = body(self);

        self.type_env = saved_types;
        self.function_env = saved_functions;
        result
    }

    /// Binds a variable. `_` is never bound.
    pub fn bind(&mut self, name: &str, ty: Type) {
        if name != "_" {
            self.type_env.insert(name.to_string(), ty);
        }
    }

    /// Variables shadow functions of the same name.
    pub fn lookup(&self, name: &str) -> Option<Type> {
        if name == "_" {
            return None;
        }
        self.type_env
            .get(name)
            .cloned()
            .or_else(|| self.function_env.get(name).map(FunctionSignature::as_type))
    }

    pub fn resolve_annotation(&self, annotation: &TypeAnnotation) -> Result<Type, Error> {
        resolve_annotation(annotation)
    }

    /// Pass 1: fills every missing annotation and returns the annotated program.
    pub fn infer(&mut self, program: &Program) -> Result<Program, Error> {
        infer_program(self, program)
    }

    /// Pass 2: tightens inferred `weak` parameters and `void` returns from usage.
    pub fn refine(&mut self, program: &Program) -> Program {
        refine_program(self, program)
    }

    /// Pass 3: checks the fully annotated program.
    pub fn check(&mut self, program: &Program) -> Result<(), Error> {
        check_program(self, program)
    }
}

fn unknown_type(annotation: &TypeAnnotation) -> Error {
    Error::new(
        ErrorImpl::UnknownType {
            type_: annotation.to_string(),
        },
        annotation.position().clone(),
    )
}

/// Resolves a written type into a `Type`.
///
/// Container names written without arguments get `weak` slots, so `Array`
/// is `Array<weak>`.
pub fn resolve_annotation(annotation: &TypeAnnotation) -> Result<Type, Error> {
    let all = |annotations: &[TypeAnnotation]| -> Result<Vec<Type>, Error> {
        annotations.iter().map(resolve_annotation).collect()
    };

    match annotation {
        TypeAnnotation::Simple { name, .. } => {
            let weak = || Box::new(Type::Weak);
            let ty = match name.as_str() {
                "int" => Type::Int,
                "float" => Type::Float,
                "string" => Type::String,
                "boolean" | "bool" => Type::Boolean,
                "void" => Type::Void,
                "poly" => Type::Poly,
                "weak" => Type::Weak,
                "range" => Type::Range,
                "Array" => Type::Array(weak()),
                "Map" => Type::Map(weak(), weak()),
                "Set" => Type::Set(weak()),
                "Heap" | "MinHeap" | "MaxHeap" => Type::Heap(weak()),
                "HeapMap" | "MinHeapMap" | "MaxHeapMap" => Type::HeapMap(weak(), weak()),
                "Graph" => Type::Graph(weak()),
                "BinaryTree" => Type::BinaryTree(weak()),
                "AVLTree" => Type::AvlTree(weak()),
                _ => return Err(unknown_type(annotation)),
            };
            Ok(ty)
        }
        TypeAnnotation::Generic { name, args, .. } => {
            let mut args = all(args)?.into_iter().map(Box::new);
            let ty = match (name.as_str(), args.len()) {
                ("Array", 1) => args.next().map(Type::Array),
                ("Map", 2) => args.next().zip(args.next()).map(|(k, v)| Type::Map(k, v)),
                ("Set", 1) => args.next().map(Type::Set),
                ("Heap" | "MinHeap" | "MaxHeap", 1) => args.next().map(Type::Heap),
                ("HeapMap" | "MinHeapMap" | "MaxHeapMap", 2) => {
                    args.next().zip(args.next()).map(|(k, v)| Type::HeapMap(k, v))
                }
                ("Graph", 1) => args.next().map(Type::Graph),
                ("BinaryTree", 1) => args.next().map(Type::BinaryTree),
                ("AVLTree", 1) => args.next().map(Type::AvlTree),
                _ => None,
            };
            ty.ok_or_else(|| unknown_type(annotation))
        }
        TypeAnnotation::Function {
            params,
            return_type,
            variadic,
            ..
        } => Ok(Type::Function(FunctionType {
            params: all(params)?,
            return_type: Box::new(resolve_annotation(return_type)?),
            variadic: *variadic,
        })),
        TypeAnnotation::Union { members, .. } => Ok(Type::Union(all(members)?)),
        TypeAnnotation::Intersection { members, .. } => Ok(Type::Intersection(all(members)?)),
        TypeAnnotation::Tuple { elements, .. } => Ok(Type::Tuple(all(elements)?)),
        TypeAnnotation::Record { fields, .. } => {
            let fields = fields
                .iter()
                .map(|(name, field)| Ok((name.clone(), resolve_annotation(field)?)))
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(Type::Record(fields))
        }
    }
}

/// Runs inference, refinement and checking in order.
pub fn type_check(program: Program) -> (TypeChecker, Result<Program, Error>) {
    let mut type_checker = TypeChecker::new();

    let inferred = match type_checker.infer(&program) {
        Ok(inferred) => inferred,
        Err(error) => return (type_checker, Err(error)),
    };
    debug!("inference finished, {} top level statements", inferred.body.len());

    let refined = type_checker.refine(&inferred);

    match type_checker.check(&refined) {
        Ok(()) => (type_checker, Ok(refined)),
        Err(error) => (type_checker, Err(error)),
    }
}
