// tests/query_tests.rs

use dataview::{Context, ExpressionService, QueryError, QueryService, Source, Value};
use std::collections::BTreeMap;

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
                ("featureID", Value::from("<feature-ID-value>")),
                ("a", Value::Integer(1)),
                ("b", Value::Integer(1)),
            ]),
        )
        .with("file", json_object(vec![("link", Value::from("<file-link-value>"))]))
}

#[test]
fn test_render_type() {
    assert_eq!(QueryService::new("TABLE a").unwrap().render_type(), "TABLE");
    assert_eq!(QueryService::new("LIST").unwrap().render_type(), "LIST");
}

#[test]
fn test_columns_and_values() {
    let service = QueryService::new(
        r#"TABLE metadata.featureID as "featureID", file.link, metadata.a + metadata.b"#,
    )
    .unwrap();

    assert_eq!(
        service.columns(),
        vec!["featureID", "file.link", "metadata.a + metadata.b"]
    );
    assert_eq!(
        service.render_columns(&sample_context()).unwrap(),
        vec![
            Value::from("<feature-ID-value>"),
            Value::from("<file-link-value>"),
            Value::Integer(2)
        ]
    );
}

#[test]
fn test_column_names_are_normalized() {
    let cases = vec![
        ("TABLE a+b", "a + b"),
        ("TABLE (a + b) * 2", "(a + b) * 2"),
        ("TABLE a  AND   NOT b", "a AND NOT b"),
        ("TABLE 0 in [1,2]", "0 IN [1, 2]"),
        ("TABLE [1,2] contains 1", "[1, 2] CONTAINS 1"),
        (r#"TABLE sum(a,"x")"#, r#"sum(a, "x")"#),
        ("TABLE {key:1}", "{key: 1}"),
        ("TABLE `metadata.in`", "`metadata.in`"),
    ];

    for (query, expected) in cases {
        let service = QueryService::new(query).unwrap();
        assert_eq!(service.columns(), vec![expected], "columns of {}", query);
    }
}

#[test]
fn test_column_name_reparses_to_same_identifier() {
    let service = QueryService::new("TABLE this.metadata.featureID").unwrap();
    let name = &service.columns()[0];

    let reparsed = QueryService::new(&format!("TABLE {}", name)).unwrap();
    assert_eq!(reparsed.clause().select, service.clause().select);
}

#[test]
fn test_sources() {
    let cases = vec![
        ("TABLE a", vec![]),
        ("TABLE a FROM #tag", vec![Source::Tag("tag".to_string())]),
        ("TABLE a FROM #`quoted`", vec![Source::Tag("quoted".to_string())]),
        (
            r#"TABLE a FROM "examples/library""#,
            vec![Source::Path("examples/library".to_string())],
        ),
        (
            r#"TABLE a FROM #x AND #y AND "p""#,
            vec![
                Source::Tag("x".to_string()),
                Source::Tag("y".to_string()),
                Source::Path("p".to_string()),
            ],
        ),
    ];

    for (query, expected) in cases {
        let service = QueryService::new(query).unwrap();
        assert_eq!(service.sources().unwrap(), expected, "sources of {}", query);
    }
}

#[test]
fn test_unsupported_sources() {
    let service = QueryService::new("LIST FROM #x OR #y").unwrap();
    assert_eq!(
        service.sources(),
        Err(QueryError::UnsupportedSource("OR".to_string()))
    );

    let service = QueryService::new("LIST FROM NOT #x").unwrap();
    assert!(matches!(service.sources(), Err(QueryError::UnsupportedSource(_))));
}

#[test]
fn test_where_defaults_to_true() {
    let service = QueryService::new("TABLE file.link").unwrap();
    assert!(service.where_matches(&Context::new()).unwrap());
    assert!(service.where_matches(&sample_context()).unwrap());
    assert_eq!(service.where_expression(), "");
}

#[test]
fn test_where_uses_truthiness() {
    let service = QueryService::new("TABLE a WHERE metadata.a").unwrap();
    assert!(service.where_matches(&sample_context()).unwrap());
    assert!(!service.where_matches(&Context::new()).unwrap());

    let service = QueryService::new("TABLE a WHERE metadata.a + metadata.b == 2").unwrap();
    assert!(service.where_matches(&sample_context()).unwrap());
    assert_eq!(service.where_expression(), "metadata.a + metadata.b == 2");
}

#[test]
fn test_where_errors_propagate() {
    let service = QueryService::new(r#"TABLE a WHERE metadata.a < "x""#).unwrap();
    assert!(service.where_matches(&sample_context()).is_err());
}

#[test]
fn test_syntax_error_carries_fragment() {
    let err = QueryService::new("TABLE a WHERE (1 +").unwrap_err();
    assert_eq!(err.position, 18);
    assert!(err.to_string().contains("Syntax error"));
}

#[test]
fn test_expression_service() {
    let service = ExpressionService::new("sum(this.metadata.a, 2)").unwrap();
    let context = Context::new().with(
        "this",
        json_object(vec![("metadata", json_object(vec![("a", Value::Integer(3))]))]),
    );
    assert_eq!(service.solve(&context).unwrap(), Value::Integer(5));

    assert!(ExpressionService::new("1 +").is_err());
}

#[test]
fn test_services_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryService>();
    assert_send_sync::<ExpressionService>();
}
