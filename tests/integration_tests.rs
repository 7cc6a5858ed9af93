//! Integration tests for the whole pipeline.
//!
//! These drive source text through tokenizing, parsing, the three checker
//! passes and evaluation using only the public API.

use std::rc::Rc;

use schema_lang::{
    ast::{
        ast::Program,
        statements::StmtKind,
        types::{FunctionType, Type},
    },
    errors::errors::ErrorFamily,
    format_error,
    lexer::lexer::tokenize,
    parser::parser::parse,
    run_source,
    type_checker::{
        compat::types_equal,
        type_checker::{type_check, TypeChecker},
    },
    RunOptions,
};

fn parse_program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.schema".to_string())).unwrap();
    let (_, program) = parse(tokens, Rc::new("test.schema".to_string()));
    program.unwrap()
}

fn run(source: &str) -> Vec<String> {
    let (output, error) = run_source(source, &RunOptions::default());
    assert!(error.is_none(), "unexpected error: {:?}", error);
    output
}

#[test]
fn test_annotated_addition() {
    let source = "let a: int = 1; let b: int = 2; print(a + b)";

    let (_, checked) = type_check(parse_program(source));
    let checked = checked.unwrap();
    assert!(checked.is_fully_annotated());

    assert_eq!(run(source), vec!["3"]);
}

#[test]
fn test_unannotated_function_is_refined() {
    let source = "func f(x) { return x + 1 }\nlet r = f(2)\nprint(r)";

    let (_, checked) = type_check(parse_program(source));
    let checked = checked.unwrap();
    assert!(checked.is_fully_annotated());

    let function = checked
        .body
        .iter()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDeclaration(function) => Some(function),
            _ => None,
        })
        .unwrap();
    assert_eq!(function.parameters[0].annotation.as_ref().unwrap().to_string(), "int");

    assert_eq!(run(source), vec!["3"]);
}

#[test]
fn test_min_heap_scenario() {
    let source = "let h = MinHeap(); h.push(3); h.push(1); h.push(2); print(h.pop())";
    assert_eq!(run(source), vec!["1"]);
}

#[test]
fn test_empty_pops_are_fatal() {
    for source in [
        "print(0); let a = Array(); print(a.pop()); print(1)",
        "print(0); let h = MaxHeap(); print(h.pop()); print(1)",
    ] {
        let (output, error) = run_source(source, &RunOptions::default());
        let error = error.unwrap();

        assert_eq!(output, vec!["0"]);
        assert_eq!(error.family(), ErrorFamily::Runtime);
        assert_eq!(error.get_error_name(), "EmptyContainer");
    }
}

#[test]
fn test_closure_sees_declaration_snapshot() {
    let source = "
        let x = 10
        func read() -> int { return x }
        x = 20
        print(read(), x)
    ";
    assert_eq!(run(source), vec!["10 20"]);
}

#[test]
fn test_graph_vertices_are_canonicalized() {
    let source = "let g = Graph(); g.addVertex(5); g.addVertex(5); print(g.getVertices().length == 1)";
    assert_eq!(run(source), vec!["true"]);
}

#[test]
fn test_union_and_intersection_asymmetry() {
    let union = Type::Union(vec![Type::Int, Type::String]);
    let intersection = Type::Intersection(vec![Type::Int, Type::String]);

    assert!(!types_equal(&union, &Type::Int));
    assert!(types_equal(&intersection, &Type::Int));
    assert!(!types_equal(&Type::Int, &intersection));

    let callback = Type::Function(FunctionType::new(vec![Type::Weak], Type::Int));
    assert!(types_equal(&callback, &Type::function(vec![Type::String], Type::Weak)));
}

#[test]
fn test_check_is_idempotent() {
    let source = "
        func total(xs: Array<int>) -> int {
            let sum = 0
            for x in xs { sum = sum + x }
            return sum
        }
        print(total([1, 2, 3]))
    ";
    let (_, annotated) = type_check(parse_program(source));
    let annotated = annotated.unwrap();

    let mut checker = TypeChecker::new();
    assert!(checker.check(&annotated).is_ok());
    assert!(checker.check(&annotated).is_ok());

    let rejected = parse_program("let a: int = \"s\"");
    let mut checker = TypeChecker::new();
    let inferred = checker.infer(&rejected).unwrap();
    let first = checker.check(&inferred).unwrap_err();
    let second = checker.check(&inferred).unwrap_err();
    assert_eq!(first.get_error(), second.get_error());
}

#[test]
fn test_type_errors_stop_before_evaluation() {
    let (output, error) = run_source("print(1); let a: int = \"s\"", &RunOptions::default());
    let error = error.unwrap();

    assert!(output.is_empty());
    assert_eq!(error.family(), ErrorFamily::Type);
    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.get_position().line, 1);
}

#[test]
fn test_unchecked_runs_until_runtime_error() {
    let options = RunOptions {
        type_check: false,
        ..RunOptions::default()
    };
    let (output, error) = run_source("print(1); let a: int = \"s\"; print(a); a = b", &options);

    assert_eq!(output, vec!["1", "s"]);
    assert_eq!(error.unwrap().get_error_name(), "UndefinedVariable");
}

#[test]
fn test_syntax_errors_are_rendered() {
    let source = "let = 5;";
    let (_, error) = run_source(source, &RunOptions::default());
    let error = error.unwrap();

    assert_eq!(error.family(), ErrorFamily::Syntax);
    let rendered = format_error(&error, source);
    assert!(rendered.starts_with("Error: UnexpectedTokenDetailed"));
    assert!(rendered.contains("1 | let = 5;"));
}

#[test]
fn test_program_using_every_container() {
    let source = "
        func shortest(g: Graph<int>, start: int, goal: int) -> int {
            let dist: Map<int, int> = Map()
            let queue: HeapMap<int, int> = MinHeapMap()
            dist.set(start, 0)
            queue.push(start, 0)
            while !queue.isEmpty() {
                let node = queue.pop()
                for edge in g.getEdges() {
                    if edge[0] == node {
                        let next: int = edge[1]
                        let cost = dist.get(node) + edge[2]
                        // `||` evaluates both sides, so the lookup is guarded separately.
                        let better = true
                        if dist.has(next) { better = cost < dist.get(next) }
                        if better {
                            dist.set(next, cost)
                            queue.push(next, cost)
                        }
                    }
                }
            }
            return dist.get(goal)
        }

        let g: Graph<int> = Graph(true)
        g.addEdge(1, 2, 4)
        g.addEdge(1, 3, 1)
        g.addEdge(3, 2, 1)
        g.addEdge(2, 4, 5)
        print(shortest(g, 1, 4))

        let seen: Set<string> = Set()
        for word in [\"b\", \"a\", \"b\"] { seen.add(word) }
        let sorted: AVLTree<string> = AVLTree()
        for word in seen.values() { sorted.insert(word) }
        print(sorted.inOrderTraversal())
    ";
    assert_eq!(run(source), vec!["7", "[\"a\", \"b\"]"]);
}
