//! Unit tests for the interpreter.

use std::{cmp::Ordering, rc::Rc};

use super::{
    environment::Environment,
    value::{compare_values, values_equal, Key, TypedValue, Value},
};
use crate::{
    ast::types::Type,
    errors::errors::{ErrorFamily, ErrorImpl},
    run_source, RunOptions,
};

fn output(source: &str) -> Vec<String> {
    let (lines, error) = run_source(source, &RunOptions::default());
    if let Some(error) = error {
        panic!("`{}` failed: {}", source, error);
    }
    lines
}

fn runtime_error(source: &str, options: &RunOptions) -> (Vec<String>, String) {
    let (lines, error) = run_source(source, options);
    let error = error.unwrap_or_else(|| panic!("expected `{}` to fail", source));
    assert_eq!(error.family(), ErrorFamily::Runtime, "{}", error);
    (lines, error.get_error_name().to_string())
}

fn unchecked() -> RunOptions {
    RunOptions {
        type_check: false,
        ..RunOptions::default()
    }
}

#[test]
fn test_print_annotated_addition() {
    assert_eq!(output("let a: int = 1; let b: int = 2; print(a + b)"), vec!["3"]);
}

#[test]
fn test_call_refined_function() {
    assert_eq!(output("func f(x) { return x + 1 } print(f(2))"), vec!["3"]);
}

#[test]
fn test_min_heap_pop() {
    let source = "let h = MinHeap(); h.push(3); h.push(1); h.push(2); print(h.pop())";
    assert_eq!(output(source), vec!["1"]);
}

#[test]
fn test_empty_pop_stops_without_output() {
    let (lines, name) = runtime_error(
        "print(1); let a: Array<int> = Array(); print(a.pop()); print(2)",
        &RunOptions::default(),
    );
    assert_eq!(lines, vec!["1"]);
    assert_eq!(name, "EmptyContainer");

    let (lines, name) = runtime_error("let h = MinHeap(); print(h.peek())", &RunOptions::default());
    assert!(lines.is_empty());
    assert_eq!(name, "EmptyContainer");
}

#[test]
fn test_closure_snapshot() {
    let source = "
        let x = 1;
        func show() { print(x) }
        x = 2;
        show();
        print(x);
    ";
    assert_eq!(output(source), vec!["1", "2"]);
}

#[test]
fn test_recursion() {
    let source = "
        func fact(n: int) -> int {
            if n <= 1 { return 1 }
            return n * fact(n - 1)
        }
        print(fact(5))
    ";
    assert_eq!(output(source), vec!["120"]);
}

#[test]
fn test_display_formats() {
    let source = "print(1.0, 2.5, \"a\", [1, 2], [\"b\"], (1, \"x\"), {name: \"n\"}, true, 0..3, 1..=2, 4..)";
    assert_eq!(
        output(source),
        vec!["1.0 2.5 a [1, 2] [\"b\"] (1, \"x\") {name: \"n\"} true 0..3 1..=2 4.."]
    );
}

#[test]
fn test_operators() {
    let source = "print(7 / 2, -7 / 2, -7 % 2, 7 /. 2, 1 + 2.5, \"a\" + \"b\", 1 << 3, 1 == 1.0, [1] == [1], 2 < 3)";
    assert_eq!(output(source), vec!["3 -4 -1 3.5 3.5 ab 8 true false true"]);
}

#[test]
fn test_typeof() {
    let source = "print(typeof 1, typeof 1.5, typeof [1], typeof MinHeap(), typeof (1, 2), typeof AVLTree())";
    assert_eq!(output(source), vec!["int float array heap tuple avltree"]);
}

#[test]
fn test_loops() {
    let source = "
        let total = 0;
        for i in 0..=4 { total = total + i }
        let n = 3;
        while n > 0 { n = n - 1 }
        until n == 2 { n = n + 1 }
        let letters = Array();
        for c in \"a\"..=\"c\" { letters.push(c) }
        print(total, n, letters);
    ";
    assert_eq!(output(source), vec!["10 2 [\"a\", \"b\", \"c\"]"]);
}

#[test]
fn test_return_from_infinite_range() {
    let source = "
        func first_over(limit: int) -> int {
            for i in 0.. {
                if i * i > limit { return i }
            }
            return -1
        }
        print(first_over(50))
    ";
    assert_eq!(output(source), vec!["8"]);
}

#[test]
fn test_map_and_set() {
    let source = "
        let m: Map<string, int> = Map();
        m.set(\"a\", 1);
        m.set(\"b\", 2);
        m.set(\"a\", 3);
        print(m.get(\"a\"), m.size(), m.keys(), m.has(\"c\"));
        m[\"c\"] = 4;
        print(m[\"c\"], m.delete(\"a\"), m);

        let s: Set<int> = Set();
        s.add(1);
        s.add(1);
        s.add(2);
        print(s.size(), s.has(2), s);
    ";
    assert_eq!(
        output(source),
        vec![
            "3 2 [\"a\", \"b\"] false",
            "4 true {\"b\": 2, \"c\": 4}",
            "2 true Set{1, 2}",
        ]
    );
}

#[test]
fn test_heap_map_orders_keys_by_value() {
    let source = "
        let q: HeapMap<string, int> = MaxHeapMap();
        q.push(\"low\", 1);
        q.push(\"high\", 9);
        q.push(\"mid\", 5);
        print(q.pop(), q.peek(), q.size());
    ";
    assert_eq!(output(source), vec!["high mid 2"]);
}

#[test]
fn test_trees() {
    let source = "
        let t: AVLTree<int> = AVLTree();
        for i in 1..8 { t.insert(i) }
        print(t.inOrderTraversal(), t.getHeight(), t.size(), t.search(4));

        let b: BinaryTree<int> = BinaryTree();
        b.insert(2);
        b.insert(1);
        b.insert(3);
        print(b.preOrderTraversal(), b.postOrderTraversal(), b);
    ";
    assert_eq!(
        output(source),
        vec!["[1, 2, 3, 4, 5, 6, 7] 3 7 true", "[2, 1, 3] [1, 3, 2] BinaryTree[1, 2, 3]"]
    );
}

#[test]
fn test_graph() {
    let source = "
        let g = Graph();
        g.addVertex(5);
        g.addVertex(5);
        print(g.getVertices().length);
        g.addEdge(1, 2);
        g.addEdge(2, 3, 7);
        print(g.getNeighbors(2), g.hasEdge(2, 1), g.isDirected(), g.size());
        print(g.getEdges()[1]);

        let d = Graph(true);
        d.addEdge(1, 2);
        print(d.hasEdge(2, 1), d);
    ";
    assert_eq!(
        output(source),
        vec!["1", "[1, 3] true false 4", "(2, 1, 1)", "false Graph{1 -> [2], 2 -> []}"]
    );
}

#[test]
fn test_aliasing_shares_containers() {
    let source = "
        let a: Array<int> = Array();
        let b = a;
        b.push(1);
        print(a.length, a);
    ";
    assert_eq!(output(source), vec!["1 [1]"]);
}

#[test]
fn test_runtime_errors() {
    let checked = RunOptions::default();
    assert_eq!(runtime_error("let a = [1, 2]; print(a[5])", &checked).1, "IndexOutOfBounds");
    assert_eq!(
        runtime_error("let m: Map<string, int> = Map(); print(m.get(\"x\"))", &checked).1,
        "KeyNotFound"
    );
    assert_eq!(runtime_error("print(1 / 0)", &checked).1, "DivisionByZero");
    assert_eq!(runtime_error("print(5 % 0)", &checked).1, "DivisionByZero");
    assert_eq!(runtime_error("let r = 0..; print(r.toArray())", &checked).1, "InvalidRange");
    assert_eq!(runtime_error("let t = (1, 2); print(t[2])", &checked).1, "IndexOutOfBounds");
}

#[test]
fn test_assert() {
    assert!(output("assert(1 == 1, \"fine\")").is_empty());

    let (_, error) = run_source("assert(1 == 2, \"nope\")", &RunOptions::default());
    let error = error.unwrap();
    assert_eq!(
        error.get_error(),
        &ErrorImpl::AssertionFailed {
            message: "nope".to_string()
        }
    );
}

#[test]
fn test_unchecked_runtime_errors() {
    let options = unchecked();
    assert_eq!(runtime_error("return 1", &options).1, "ReturnOutsideFunction");
    assert_eq!(runtime_error("x = 1", &options).1, "AssignToUndeclared");
    assert_eq!(runtime_error("print(y)", &options).1, "UndefinedVariable");
    assert_eq!(runtime_error("if 1 { print(1) }", &options).1, "NonBooleanCondition");
    assert_eq!(runtime_error("let a = 1; a(2)", &options).1, "NotCallable");
    assert_eq!(runtime_error("let a = 1; print(a.size())", &options).1, "UnknownMember");
    assert_eq!(runtime_error("let r = {a: 1}; print(r.b)", &options).1, "MissingField");
    assert_eq!(runtime_error("for x in 5 { print(x) }", &options).1, "NotIterable");
    assert_eq!(runtime_error("print(\"a\" - 1)", &options).1, "InvalidOperands");
    assert_eq!(runtime_error("func f(a) { return a } f()", &options).1, "MissingArguments");
}

#[test]
fn test_discard() {
    assert_eq!(output("func g() { print(1); return 2 } _ = g(); let _ = g();"), vec!["1", "1"]);
}

#[test]
fn test_environment_scoping() {
    let root = Environment::new(None);
    root.borrow_mut().define("a", TypedValue::int(1));
    root.borrow_mut().define("_", TypedValue::int(2));

    let child = Environment::new(Some(root.clone()));
    child.borrow_mut().define("b", TypedValue::int(3));
    child.borrow_mut().set("a", TypedValue::int(4)).unwrap();

    assert!(child.borrow().has("a"));
    assert!(!root.borrow().has("b"));
    assert!(child.borrow().get("_").is_none());
    assert_eq!(root.borrow().get("a").unwrap().to_string(), "4");
    assert_eq!(child.borrow_mut().set("_", TypedValue::void()), Err(ErrorImpl::AssignToDiscard));
    assert_eq!(
        child.borrow_mut().set("c", TypedValue::void()),
        Err(ErrorImpl::AssignToUndeclared { name: "c".to_string() })
    );

    let flat = child.borrow().flatten();
    assert_eq!(flat.len(), 2);
}

#[test]
fn test_keys_canonicalize_scalars() {
    assert_eq!(Key::of(&Value::Float(-0.0)), Key::of(&Value::Float(0.0)));
    assert_eq!(Key::of(&Value::Int(5)), Key::of(&Value::Int(5)));
    assert_eq!(Key::of(&Value::Int(1)), Key::of(&Value::Float(1.0)));
    assert_eq!(Key::of(&Value::Float(-0.0)), Key::of(&Value::Int(0)));
    assert_ne!(Key::of(&Value::Int(1)), Key::of(&Value::Float(1.5)));
    assert_eq!(Key::of(&Value::Float(f64::NAN)), Key::of(&Value::Float(f64::NAN)));

    let first = TypedValue::array(vec![], Type::Int);
    let second = TypedValue::array(vec![], Type::Int);
    assert_ne!(Key::of(&first.value), Key::of(&second.value));
    assert_eq!(Key::of(&first.value), Key::of(&first.clone().value));
}

#[test]
fn test_whole_floats_find_int_keys() {
    let source = "
        let m = Map();
        m.set(1, \"a\");
        print(m.has(1.0), m.get(1.0));
        let s = Set();
        s.add(2.0);
        s.add(2);
        print(s.size(), s.has(2.5));
    ";
    assert_eq!(output(source), vec!["true a", "1 false"]);
}

#[test]
fn test_value_equality_and_order() {
    assert!(values_equal(&Value::Int(2), &Value::Float(2.0)));
    assert!(values_equal(&Value::Void, &Value::Void));
    assert!(!values_equal(&Value::Str("a".into()), &Value::Int(1)));

    let tuple = Value::Tuple(Rc::new(vec![]));
    assert!(!values_equal(&tuple, &tuple));

    assert_eq!(compare_values(&TypedValue::int(1), &TypedValue::float(1.5)), Ordering::Less);
    assert_eq!(compare_values(&TypedValue::string("b"), &TypedValue::string("a")), Ordering::Greater);
}

#[test]
fn test_retyping_only_applies_concrete_types() {
    let value = TypedValue::array(vec![], Type::Weak);
    assert_eq!(value.static_type(), &Type::array(Type::Weak));

    let value = value.retyped(&Type::Weak);
    assert_eq!(value.static_type(), &Type::array(Type::Weak));

    let value = value.retyped(&Type::array(Type::Int));
    assert_eq!(value.static_type(), &Type::array(Type::Int));
    assert_eq!(value.dispatch_type(), Type::array(Type::Int));
}
