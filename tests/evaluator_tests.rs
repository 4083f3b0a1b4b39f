// tests/evaluator_tests.rs

use dataview::{
    Context, EvalError, Evaluator, Value,
    parser::{Parser, parse_expression},
    lexer::Lexer,
};
use std::collections::BTreeMap;

fn eval_expr(expr_str: &str, context: &Context) -> Result<Value, EvalError> {
    let expr = parse_expression(expr_str).unwrap();
    Evaluator::new().solve(&expr, context)
}

fn eval(expr_str: &str) -> Value {
    eval_expr(expr_str, &Context::new()).unwrap()
}

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = BTreeMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn sample_context() -> Context {
    Context::new()
        .with(
            "metadata",
            json_object(vec![
                ("featureID", Value::from("X")),
                ("a", Value::Integer(1)),
                ("b", Value::Integer(1)),
                ("empty", Value::Null),
                ("tags", Value::Array(vec![Value::from("x"), Value::from("y")])),
            ]),
        )
        .with("file", json_object(vec![("link", Value::from("L"))]))
        .with(
            "this",
            json_object(vec![(
                "metadata",
                json_object(vec![("featureID", Value::from("x"))]),
            )]),
        )
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_missing_path_is_empty_string() {
    let context = sample_context();
    assert_eq!(eval_expr("metadata.nothing", &context).unwrap(), Value::from(""));
    assert_eq!(eval_expr("nothing.at.all", &context).unwrap(), Value::from(""));
    assert_eq!(eval_expr("metadata.a.deeper", &context).unwrap(), Value::from(""));
}

#[test]
fn test_present_null_stays_null() {
    let context = sample_context();
    assert_eq!(eval_expr("metadata.empty", &context).unwrap(), Value::Null);
}

#[test]
fn test_quoted_identifier_lookup() {
    let context = sample_context();
    assert_eq!(eval_expr("`metadata.featureID`", &context).unwrap(), Value::from("X"));
}

#[test]
fn test_this_membership() {
    let context = sample_context();
    assert_eq!(
        eval_expr("this.metadata.featureID IN metadata.tags", &context).unwrap(),
        Value::Boolean(true)
    );
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_precedence_and_associativity() {
    assert_eq!(eval("3 - 2 * 3 == -3"), Value::Boolean(true));
    assert_eq!(eval("(3 - 2) * 3 == 3"), Value::Boolean(true));
    assert_eq!(eval("1 - 2 - 3"), Value::Integer(-4));
    assert_eq!(eval("1 - 2 - 3 == -4"), Value::Boolean(true));
}

#[test]
fn test_mixed_arithmetic() {
    assert_eq!(eval("1 + 0.5"), Value::Float(1.5));
    assert_eq!(eval("1 + 1.0"), Value::Float(2.0));
    assert_eq!(eval("0.1 + 0.2 == 0.30000000000000004"), Value::Boolean(true));
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
    assert_eq!(eval("6 / 2"), Value::Float(3.0));
    assert_eq!(eval("6 / 2").to_cell(), "3.0");
}

#[test]
fn test_concatenation() {
    assert_eq!(eval(r#""a" + "b""#), Value::from("ab"));
    assert_eq!(
        eval("[1] + [2]"),
        Value::Array(vec![Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
fn test_arithmetic_type_errors() {
    assert!(matches!(eval_expr(r#""a" + 1"#, &Context::new()), Err(EvalError::Type(_))));
    assert!(matches!(eval_expr(r#""a" * 2"#, &Context::new()), Err(EvalError::Type(_))));
    assert!(matches!(eval_expr("-\"a\"", &Context::new()), Err(EvalError::Type(_))));
    assert_eq!(eval_expr("1 / 0", &Context::new()), Err(EvalError::DivisionByZero));
    assert_eq!(eval_expr("1.5 / 0.0", &Context::new()), Err(EvalError::DivisionByZero));
}

// ============================================================================
// Logic
// ============================================================================

#[test]
fn test_boolean_logic() {
    assert_eq!(eval("False OR 0"), Value::Boolean(false));
    assert_eq!(eval("False OR 0 + 1"), Value::Boolean(true));
    assert_eq!(eval("False OR (0 + 1)"), Value::Boolean(true));
    assert_eq!(eval("3 < 4 AND True"), Value::Boolean(true));
    assert_eq!(eval("True AND 4 < 4"), Value::Boolean(false));
    assert_eq!(eval(r#""" OR []"#), Value::Boolean(false));
    assert_eq!(eval(r#""x" AND [1]"#), Value::Boolean(true));
}

#[test]
fn test_and_binds_tighter_than_or() {
    let cases = vec![
        ("True AND False OR True", true),
        ("True OR False AND True", true),
        ("False OR True AND False", false),
        ("True AND False OR False", false),
    ];

    for (expr, expected) in cases {
        assert_eq!(eval(expr), Value::Boolean(expected), "value of {}", expr);
    }
}

#[test]
fn test_not() {
    assert_eq!(eval("NOT true"), Value::Boolean(false));
    assert_eq!(eval("NOT 0"), Value::Boolean(true));
    assert!(matches!(eval_expr(r#"NOT "x""#, &Context::new()), Err(EvalError::Type(_))));
}

// ============================================================================
// Comparison and membership
// ============================================================================

#[test]
fn test_membership() {
    assert_eq!(eval("1 IN [1, 2, 3]"), Value::Boolean(true));
    assert_eq!(eval("[1, 2, 3] CONTAINS 1"), Value::Boolean(true));
    assert_eq!(eval("NOT 0 IN [1, 2, 3]"), Value::Boolean(true));
    assert_eq!(eval("NOT 1 IN [1, 2, 3]"), Value::Boolean(false));
    assert_eq!(eval("NOT [1, 2, 3] CONTAINS 1"), Value::Boolean(false));
    assert_eq!(eval("NOT [1, 2, 3] CONTAINS 0"), Value::Boolean(true));
    assert_eq!(eval(r#""ell" IN "hello""#), Value::Boolean(true));
    assert_eq!(eval(r#""k" IN {k: 1}"#), Value::Boolean(true));
    assert!(matches!(eval_expr("1 IN 2", &Context::new()), Err(EvalError::Type(_))));
}

#[test]
fn test_object_literals() {
    assert_eq!(eval("{ key: 1 }"), json_object(vec![("key", Value::Integer(1))]));
    assert_eq!(
        eval("{ key: { inner: 2 } }"),
        json_object(vec![("key", json_object(vec![("inner", Value::Integer(2))]))])
    );
    assert_eq!(
        eval(r#"{ key: { inner: 2 }, "b": 1 + 1 }"#),
        json_object(vec![
            ("key", json_object(vec![("inner", Value::Integer(2))])),
            ("b", Value::Integer(2)),
        ])
    );

    // Values are expressions and resolve against the context
    assert_eq!(
        eval_expr("{ id: metadata.featureID, missing: metadata.nope }", &sample_context()).unwrap(),
        json_object(vec![("id", Value::from("X")), ("missing", Value::from(""))])
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("2 == 2.0"), Value::Boolean(true));
    assert_eq!(eval(r#""a" < "b""#), Value::Boolean(true));
    assert_eq!(eval("[1, 2] < [1, 3]"), Value::Boolean(true));
    assert_eq!(eval("2 >= 2"), Value::Boolean(true));
    assert_eq!(eval(r#"1 != "1""#), Value::Boolean(true));
    assert_eq!(eval("null == null"), Value::Boolean(true));
    assert!(matches!(eval_expr(r#"1 < "a""#, &Context::new()), Err(EvalError::Type(_))));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_builtin_functions() {
    assert_eq!(eval("sum(1, 2)"), Value::Integer(3));
    assert_eq!(eval("length(null)"), Value::Integer(0));
    assert_eq!(eval(r#"length("abc")"#), Value::Integer(3));
    assert_eq!(eval(r#"econtains(["a", "b", "c"], "b")"#), Value::Boolean(true));
    assert_eq!(eval(r#"econtains(["a", "b", "c"], "bb")"#), Value::Boolean(false));
    assert_eq!(eval(r#"choice(1 > 2, "yes", "no")"#), Value::from("no"));
    assert_eq!(eval(r#"default(null, "fallback")"#), Value::from("fallback"));
    assert_eq!(eval(r#"date("2024-01-01")"#), Value::from("2024-01-01"));
    assert_eq!(eval(r#"link("a.md", "A")"#), Value::from("[A](a.md)"));
}

#[test]
fn test_length_of_missing_path() {
    let context = sample_context();
    assert_eq!(eval_expr("length(metadata.nothing)", &context).unwrap(), Value::Integer(0));
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        eval_expr("nope(1)", &Context::new()),
        Err(EvalError::UnknownFunction("nope".to_string()))
    );
}

#[test]
fn test_wrong_arity() {
    assert!(matches!(
        eval_expr("length(1, 2)", &Context::new()),
        Err(EvalError::Arity { got: 2, .. })
    ));
}

#[test]
fn test_custom_function() {
    fn double(args: &[Value]) -> Result<Value, EvalError> {
        match args {
            [Value::Integer(n)] => Ok(Value::Integer(n * 2)),
            _ => Err(EvalError::Type("double() expects one integer".to_string())),
        }
    }

    let evaluator = Evaluator::new().with_function("double", double);
    let expr = parse_expression("double(21)").unwrap();
    assert_eq!(evaluator.solve(&expr, &Context::new()).unwrap(), Value::Integer(42));
}

// ============================================================================
// Select lists
// ============================================================================

#[test]
fn test_solve_select() {
    let mut parser = Parser::new(Lexer::new(
        r#"metadata.featureID as "featureID", file.link, metadata.a + metadata.b"#,
    ))
    .unwrap();
    let select = parser.parse_select().unwrap();

    let values = Evaluator::new().solve_select(&select, &sample_context()).unwrap();
    assert_eq!(values, vec![Value::from("X"), Value::from("L"), Value::Integer(2)]);
}

#[test]
fn test_evaluation_is_repeatable() {
    let expr = parse_expression("metadata.a + 1").unwrap();
    let evaluator = Evaluator::new();
    let context = sample_context();

    let first = evaluator.solve(&expr, &context).unwrap();
    let second = evaluator.solve(&expr, &context).unwrap();
    assert_eq!(first, second);

    let other = Context::new().with("metadata", json_object(vec![("a", Value::Integer(10))]));
    assert_eq!(evaluator.solve(&expr, &other).unwrap(), Value::Integer(11));
}
