use quill::prelude::*;

fn run(source: &str) -> Object {
    let mut quill = Quill::new(Engine::Eval);
    quill.run(source).expect("program produced no value").result
}

macro_rules! assert_integer {
    ($source:literal, $expected:expr) => {
        assert_eq!(run($source), Object::Integer($expected));
    };
}

macro_rules! assert_boolean {
    ($source:literal, $expected:expr) => {
        assert_eq!(run($source), Object::Boolean($expected));
    };
}

macro_rules! assert_string {
    ($source:literal, $expected:expr) => {
        assert_eq!(run($source), Object::Str($expected.to_owned()));
    };
}

macro_rules! assert_error {
    ($source:literal, $expected:expr) => {
        assert_eq!(run($source), Object::Error($expected.to_owned()));
    };
}

#[test]
fn arithmetic() {
    assert_integer!("5 + 5 + 5 + 5 - 10", 10);
    assert_integer!("2 * 2 * 2 * 2 * 2", 32);
    assert_integer!("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50);
}

#[test]
fn comparisons() {
    assert_boolean!("1 < 2", true);
    assert_boolean!("1 >= 1", true);
    assert_boolean!("2 <= 1", false);
    assert_boolean!("true != false", true);
    assert_boolean!("(1 < 2) == true", true);
}

#[test]
fn logical_operators_short_circuit() {
    assert_boolean!("true || (1 / 0 == 0)", true);
    assert_boolean!("false && (1 / 0 == 0)", false);
    assert_boolean!("true && false", false);
}

#[test]
fn conditionals() {
    assert_integer!("if (1 < 2) { 10 } else { 20 }", 10);
    assert_integer!("if (1 > 2) { 10 } else { 20 }", 20);
    assert_eq!(run("if (false) { 10 }"), NULL);
}

#[test]
fn functions_and_closures() {
    assert_integer!("let identity = fn(x) { x; }; identity(5);", 5);
    assert_integer!("let add = fn(a, b) { a + b; }; add(add(1, 2), 3);", 6);
    assert_integer!(
        "let adder = fn(x) { fn(y) { x + y }; }; let add_two = adder(2); add_two(40);",
        42
    );
    assert_integer!("fn(x) { x * 2 }(21)", 42);
}

#[test]
fn early_returns() {
    assert_integer!("let f = fn() { return 1; 2; }; f();", 1);
    assert_integer!("if (true) { if (true) { return 10; } return 1; }", 10);
}

#[test]
fn strings() {
    assert_string!(r#""foo" + "bar""#, "foobar");
    assert_integer!(r#"len("hello world")"#, 11);
}

#[test]
fn collections() {
    assert_integer!("[1, 2, 3][0] + [1, 2, 3][2]", 4);
    assert_integer!(r#"{"a": 1, "b": 2}["b"]"#, 2);
    assert_eq!(run("[1, 2, 3][3]"), NULL);
    assert_eq!(run(r#"{"a": 1}["b"]"#), NULL);
}

#[test]
fn runtime_errors_are_values() {
    assert_error!("5 + true;", "type mismatch: INTEGER + BOOLEAN");
    assert_error!("-true", "unknown operator: -BOOLEAN");
    assert_error!("missing", "identifier not found: missing");
    assert_error!("1 / 0", "division by zero");
    assert_error!(r#"{[1]: 2}"#, "unusable as hash key: ARRAY");
}

#[test]
fn closure_call_matches_the_compiled_equivalent() {
    // The instruction set has no call opcodes, so the bytecode side runs
    // the expression the call reduces to.
    let walked = run("fn(x, y) { x + y; }(2, 3);");
    assert_eq!(walked, Object::Integer(5));

    let mut vm_quill = Quill::new(Engine::Vm);
    let compiled = vm_quill.run("2 + 3").expect("vm produced no value");
    assert_eq!(walked, compiled.result);
}

#[test]
fn vm_backend_matches_evaluator_on_expressions() {
    let sources = ["(10 - 4) * 7", "3 * 3 > 2 * 4", "!(1 < 2)", "-(-5)"];

    for source in sources {
        let mut eval_quill = Quill::new(Engine::Eval);
        let mut vm_quill = Quill::new(Engine::Vm);

        let walked = eval_quill.run(source).expect("eval produced no value");
        let compiled = vm_quill.run(source).expect("vm produced no value");

        assert_eq!(walked, compiled, "backends disagree on {}", source);
    }
}
