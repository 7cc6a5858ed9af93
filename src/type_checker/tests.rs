//! Unit tests for the type checker.

use std::rc::Rc;

use super::{
    compat::{fits_inferred_return, fold_union, types_equal},
    type_checker::{resolve_annotation, type_check, TypeChecker},
};
use crate::{
    ast::{
        ast::Program,
        statements::{FunctionDecl, StmtKind, VarDecl},
        types::{FunctionType, Type, TypeAnnotation},
    },
    errors::errors::{Error, ErrorFamily},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Position,
};

fn parse_source(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.schema".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.schema".to_string()));
    result.unwrap()
}

fn check_source(source: &str) -> Result<Program, Error> {
    let (_, result) = type_check(parse_source(source));
    result
}

fn error_name(source: &str) -> String {
    match check_source(source) {
        Ok(_) => panic!("expected `{}` to be rejected", source),
        Err(error) => {
            assert_eq!(error.family(), ErrorFamily::Type);
            error.get_error_name().to_string()
        }
    }
}

fn function<'a>(program: &'a Program, name: &str) -> &'a FunctionDecl {
    program
        .body
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDeclaration(decl) if decl.name == name => Some(decl),
            _ => None,
        })
        .unwrap()
}

fn variable<'a>(program: &'a Program, name: &str) -> &'a VarDecl {
    program
        .body
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::VariableDeclaration(decl) if decl.name == name => Some(decl),
            _ => None,
        })
        .unwrap()
}

fn annotation_string(annotation: &Option<TypeAnnotation>) -> String {
    annotation.as_ref().unwrap().to_string()
}

#[test]
fn test_resolve_annotations() {
    let position = Position::null();
    let simple = |name: &str| TypeAnnotation::simple(name, position.clone());

    assert_eq!(resolve_annotation(&simple("int")).unwrap(), Type::Int);
    assert_eq!(resolve_annotation(&simple("bool")).unwrap(), Type::Boolean);
    assert_eq!(
        resolve_annotation(&simple("Array")).unwrap(),
        Type::array(Type::Weak)
    );

    let generic = TypeAnnotation::Generic {
        name: "MaxHeapMap".to_string(),
        args: vec![simple("string"), simple("int")],
        position: position.clone(),
    };
    assert_eq!(
        resolve_annotation(&generic).unwrap(),
        Type::HeapMap(Box::new(Type::String), Box::new(Type::Int))
    );
}

#[test]
fn test_resolve_rejects_unknown_types() {
    let position = Position::null();
    let unknown = TypeAnnotation::simple("Widget", position.clone());
    let wrong_arity = TypeAnnotation::Generic {
        name: "Map".to_string(),
        args: vec![TypeAnnotation::simple("int", position.clone())],
        position,
    };

    assert_eq!(
        resolve_annotation(&unknown).unwrap_err().get_error_name(),
        "UnknownType"
    );
    assert_eq!(
        resolve_annotation(&wrong_arity).unwrap_err().get_error_name(),
        "UnknownType"
    );
}

#[test]
fn test_infer_fills_missing_annotations() {
    let program = parse_source("let a = 1; let b = [1, \"x\"]; let h = MinHeap(); func f(x, y: int) { return y }");
    let inferred = TypeChecker::new().infer(&program).unwrap();

    assert!(!program.is_fully_annotated());
    assert!(inferred.is_fully_annotated());

    assert_eq!(annotation_string(&variable(&inferred, "a").annotation), "int");
    assert!(variable(&inferred, "a").inferred);
    assert_eq!(
        annotation_string(&variable(&inferred, "b").annotation),
        "Array<int | string>"
    );
    assert_eq!(annotation_string(&variable(&inferred, "h").annotation), "Heap<weak>");

    let f = function(&inferred, "f");
    assert_eq!(annotation_string(&f.parameters[0].annotation), "weak");
    assert!(f.parameters[0].inferred);
    assert!(!f.parameters[1].inferred);
    assert_eq!(annotation_string(&f.return_type), "int");
    assert!(f.return_inferred);
}

#[test]
fn test_infer_leaves_input_untouched() {
    let program = parse_source("let a = 1");
    let before = program.clone();

    let _ = TypeChecker::new().infer(&program).unwrap();

    assert_eq!(program, before);
}

#[test]
fn test_infer_return_union_and_void() {
    let program = parse_source(
        "func a() { return 1; return \"s\"; return 2 } func b() { print(1) } func c() { if true { return 1 } }",
    );
    let inferred = TypeChecker::new().infer(&program).unwrap();

    assert_eq!(annotation_string(&function(&inferred, "a").return_type), "int | string");
    assert_eq!(annotation_string(&function(&inferred, "b").return_type), "void");
    // Returns nested in blocks are not part of the first pass.
    assert_eq!(annotation_string(&function(&inferred, "c").return_type), "void");
}

#[test]
fn test_refine_weak_parameter_from_operand() {
    let program = check_source("func f(x) { return x + 1 } let r = f(2)").unwrap();

    let f = function(&program, "f");
    assert_eq!(annotation_string(&f.parameters[0].annotation), "int");
    assert_eq!(annotation_string(&f.return_type), "int");
    assert_eq!(annotation_string(&variable(&program, "r").annotation), "int");
}

#[test]
fn test_refine_index_constraint() {
    let program = check_source("func first(xs) { return xs[0] }").unwrap();

    assert_eq!(
        annotation_string(&function(&program, "first").parameters[0].annotation),
        "Array<weak>"
    );
}

#[test]
fn test_refine_keeps_ambiguous_parameter_weak() {
    let program = check_source("func g(x) { let a = x + 1; let b = x + \"s\"; return 0 }").unwrap();

    assert_eq!(
        annotation_string(&function(&program, "g").parameters[0].annotation),
        "weak"
    );
}

#[test]
fn test_refine_nested_return_overrides_void() {
    // The bare return gives `void` in the first pass; the nested `return 1`
    // widens it to a union.
    let program = check_source("func c(n: int) { if n > 0 { return 1 } return }").unwrap();
    assert_eq!(annotation_string(&function(&program, "c").return_type), "int | void");

    let program = check_source("func d(n: int) { if n > 0 { return 1 } }").unwrap();
    assert_eq!(annotation_string(&function(&program, "d").return_type), "int");
}

#[test]
fn test_refine_ignores_nested_function_bodies() {
    let program = check_source("func outer(x) { func inner(y) { return y * 2 } return 0 }").unwrap();

    let outer = function(&program, "outer");
    assert_eq!(annotation_string(&outer.parameters[0].annotation), "weak");

    let StmtKind::FunctionDeclaration(inner) = &outer.body.body[0].kind else {
        panic!("expected nested function");
    };
    assert_eq!(annotation_string(&inner.parameters[0].annotation), "int");
}

#[test]
fn test_check_scenario_annotated_addition() {
    assert!(check_source("let a: int = 1; let b: int = 2; print(a + b)").is_ok());
}

#[test]
fn test_check_is_idempotent() {
    let programs = [
        "let a: int = 1; print(a)",
        "let a: int = \"no\"",
        "func f(x) { return x + 1 } f(2)",
    ];

    for source in programs {
        let inferred = TypeChecker::new().infer(&parse_source(source)).unwrap();
        let mut checker = TypeChecker::new();
        let first = checker.check(&inferred).is_ok();
        let second = checker.check(&inferred).is_ok();
        assert_eq!(first, second, "{}", source);
    }
}

#[test]
fn test_check_errors() {
    assert_eq!(error_name("let a: int = \"s\""), "TypeMatchError");
    assert_eq!(error_name("print(missing)"), "UndefinedIdentifier");
    assert_eq!(error_name("nothing(1)"), "UndefinedFunction");
    assert_eq!(error_name("func f(a: int) { return a } f(1, 2)"), "UnexpectedArguments");
    assert_eq!(error_name("func f(a: int) { return a } f()"), "MissingArguments");
    assert_eq!(error_name("func f(a: int) { return a } f(\"s\")"), "ArgumentTypeMatchError");
    assert_eq!(error_name("func f() -> int { return \"s\" }"), "ReturnTypeMatchError");
    assert_eq!(error_name("return 1"), "ReturnOutsideFunction");
    assert_eq!(error_name("let a = 1 + \"s\""), "InvalidOperands");
    assert_eq!(error_name("let a = 1; a[0]"), "NotIndexable");
    assert_eq!(error_name("let a = 1; a(2)"), "NotCallable");
    assert_eq!(error_name("for x in 5 { print(x) }"), "NotIterable");
    assert_eq!(error_name("let a = [1]; a.nope()"), "UnknownProperty");
    assert_eq!(error_name("1 = 2"), "InvalidAssignmentTarget");
    assert_eq!(error_name("let a: Widget = 1"), "UnknownType");
}

#[test]
fn test_check_conditions_must_be_boolean() {
    assert_eq!(error_name("if 1 { print(1) }"), "TypeMatchError");
    assert_eq!(error_name("while \"s\" { print(1) }"), "TypeMatchError");
}

#[test]
fn test_check_containers_and_members() {
    let source = "
        let h: Heap<int> = MinHeap();
        h.push(3);
        let top: int = h.pop();
        let m: Map<string, int> = Map();
        m.set(\"a\", 1);
        let keys: Array<string> = m.keys();
        let g = Graph(true);
        g.addEdge(1, 2);
        g.addEdge(1, 3, 5);
        let count: int = g.getVertices().length;
        let t = (1, \"a\");
        let s: string = t[1];
        let r = {name: \"x\"};
        let n: string = r.name;
    ";

    assert!(check_source(source).is_ok());
    assert_eq!(
        error_name("let h: Heap<int> = MinHeap(); h.push(\"s\")"),
        "ArgumentTypeMatchError"
    );
    assert_eq!(error_name("let g = Graph(); g.addEdge(1)"), "MissingArguments");
}

#[test]
fn test_check_union_declarations() {
    // Declarations use `types_equal`, so a single member does not fit a union.
    assert_eq!(error_name("let a: int | string = 1"), "TypeMatchError");
    assert!(check_source("let xs: Array<int | string> = [1, \"s\"]").is_ok());
    assert_eq!(
        error_name("func f(x: int | string) { return } f(1)"),
        "ArgumentTypeMatchError"
    );
    assert_eq!(
        error_name("func f() -> int | string { return 1 }"),
        "ReturnTypeMatchError"
    );
    // An inferred union return accepts each of the returns it was folded from.
    assert!(check_source("func f() { return 1; return \"s\" }").is_ok());
    // Only direct returns are folded by inference, so the nested one is checked
    // against `string`.
    assert_eq!(
        error_name("func f(b: boolean) { if b { return 1 } return \"s\" }"),
        "ReturnTypeMatchError"
    );
    assert_eq!(error_name("let a: int | string = true"), "TypeMatchError");
}

#[test]
fn test_check_discard_assignment() {
    assert!(check_source("func g() { return 1 } _ = g(); let _ = g()").is_ok());
    assert_eq!(error_name("let _ = 1; print(_)"), "UndefinedIdentifier");
}

#[test]
fn test_types_equal_wildcards() {
    let types = [Type::Int, Type::array(Type::String), Type::Union(vec![Type::Int, Type::Float])];

    for ty in &types {
        assert!(types_equal(ty, &Type::Weak));
        assert!(types_equal(&Type::Weak, ty));
        assert!(types_equal(ty, &Type::Poly));
        assert!(types_equal(&Type::Poly, ty));
    }
}

#[test]
fn test_union_and_intersection_are_asymmetric() {
    let a_or_b = Type::Union(vec![Type::Int, Type::String]);
    let a_and_b = Type::Intersection(vec![Type::Int, Type::String]);

    // Union source: every member must match.
    assert!(!types_equal(&a_or_b, &Type::Int));
    assert!(types_equal(&Type::Union(vec![Type::Int, Type::Int]), &Type::Int));

    // Intersection source: any member may match.
    assert!(types_equal(&a_and_b, &Type::Int));
    assert!(!types_equal(&a_and_b, &Type::Boolean));

    // Intersection target: all members must match.
    assert!(!types_equal(&Type::Int, &a_and_b));
}

#[test]
fn test_union_against_union() {
    let left = Type::Union(vec![Type::Int, Type::String]);
    let right = Type::Union(vec![Type::String, Type::Int]);
    let longer = Type::Union(vec![Type::String, Type::Int, Type::Boolean]);

    assert!(types_equal(&left, &right));
    assert!(!types_equal(&left, &longer));
}

#[test]
fn test_containers_are_invariant() {
    let ints = Type::array(Type::Int);
    let floats = Type::array(Type::Float);
    let maybe = Type::array(Type::Union(vec![Type::Int, Type::Float]));

    assert!(!types_equal(&ints, &floats));
    assert!(!types_equal(&ints, &maybe));
    assert!(types_equal(&ints, &Type::array(Type::Weak)));
    assert!(!types_equal(&ints, &Type::Set(Box::new(Type::Int))));
}

#[test]
fn test_structural_types() {
    let tuple = Type::Tuple(vec![Type::Int, Type::String]);
    let swapped = Type::Tuple(vec![Type::String, Type::Int]);
    let record = Type::Record(vec![("name".to_string(), Type::String)]);
    let renamed = Type::Record(vec![("title".to_string(), Type::String)]);
    let f = Type::Function(FunctionType::new(vec![Type::Int], Type::Int));
    let g = Type::Function(FunctionType::new(vec![Type::Int, Type::Int], Type::Int));

    assert!(types_equal(&tuple, &tuple.clone()));
    assert!(!types_equal(&tuple, &swapped));
    assert!(!types_equal(&record, &renamed));
    assert!(!types_equal(&f, &g));
}

#[test]
fn test_inferred_return_union_fits_each_member() {
    let union = Type::Union(vec![Type::Int, Type::String]);

    assert!(fits_inferred_return(&union, &Type::Int));
    assert!(!fits_inferred_return(&union, &Type::Boolean));
    assert!(!fits_inferred_return(&Type::Int, &union));
    assert!(!types_equal(&Type::Int, &union));
}

#[test]
fn test_fold_union() {
    let folded = fold_union(Type::Int, Type::String);
    assert_eq!(folded, Type::Union(vec![Type::Int, Type::String]));

    let folded = fold_union(folded, Type::Int);
    assert_eq!(folded, Type::Union(vec![Type::Int, Type::String]));

    let folded = fold_union(folded, Type::Union(vec![Type::Boolean, Type::String]));
    assert_eq!(
        folded,
        Type::Union(vec![Type::Int, Type::String, Type::Boolean])
    );

    assert_eq!(fold_union(Type::Weak, Type::Int), Type::Int);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn concrete_type() -> impl Strategy<Value = Type> {
        let leaf = prop_oneof![
            Just(Type::Int),
            Just(Type::Float),
            Just(Type::String),
            Just(Type::Boolean),
            Just(Type::Void),
            Just(Type::Range),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(Type::array),
                inner.clone().prop_map(|t| Type::Set(Box::new(t))),
                inner.clone().prop_map(|t| Type::Heap(Box::new(t))),
                (inner.clone(), inner.clone())
                    .prop_map(|(k, v)| Type::Map(Box::new(k), Box::new(v))),
                prop::collection::vec(inner.clone(), 0..3).prop_map(Type::Tuple),
                prop::collection::vec(inner.clone(), 1..3)
                    .prop_map(|fields| Type::Record(
                        fields
                            .into_iter()
                            .enumerate()
                            .map(|(i, t)| (format!("f{}", i), t))
                            .collect()
                    )),
                (prop::collection::vec(inner.clone(), 0..3), inner)
                    .prop_map(|(params, ret)| Type::function(params, ret)),
            ]
        })
    }

    proptest! {
        #[test]
        fn weak_and_poly_match_everything(ty in concrete_type()) {
            prop_assert!(types_equal(&ty, &Type::Weak));
            prop_assert!(types_equal(&Type::Weak, &ty));
            prop_assert!(types_equal(&ty, &Type::Poly));
            prop_assert!(types_equal(&Type::Poly, &ty));
        }

        #[test]
        fn types_equal_is_reflexive(ty in concrete_type()) {
            prop_assert!(types_equal(&ty, &ty));
        }

        #[test]
        fn union_source_needs_every_member(a in concrete_type(), b in concrete_type(), c in concrete_type()) {
            let union = Type::Union(vec![a.clone(), b.clone()]);
            prop_assert_eq!(
                types_equal(&union, &c),
                types_equal(&a, &c) && types_equal(&b, &c)
            );
        }

        #[test]
        fn intersection_source_needs_any_member(a in concrete_type(), b in concrete_type(), c in concrete_type()) {
            let intersection = Type::Intersection(vec![a.clone(), b.clone()]);
            prop_assert_eq!(
                types_equal(&intersection, &c),
                types_equal(&a, &c) || types_equal(&b, &c)
            );
        }
    }
}
