// tests/cli_tests.rs

use std::fs;

use dataview::Source;
use dataview::cli::{self, CliError, EvalOptions, QueryOptions};
use serde_json::json;

#[test]
fn test_check_reports_query_parts() {
    let report = cli::execute_check(r#"TABLE file.link AS "Page" FROM #howto WHERE metadata.a>1"#).unwrap();

    assert_eq!(report.view_type, "TABLE");
    assert_eq!(report.sources, vec![Source::Tag("howto".to_string())]);
    assert_eq!(report.columns, vec!["Page"]);
    assert_eq!(report.condition, "metadata.a > 1");
    assert!(report.to_string().contains("from:    #howto"));
}

#[test]
fn test_check_syntax_error() {
    assert!(matches!(cli::execute_check("TABLE (a"), Err(CliError::Syntax(_))));
}

#[test]
fn test_eval_with_context() {
    let options = EvalOptions {
        expression: "metadata.a + 1".to_string(),
        input: Some(r#"{"metadata": {"a": 41}}"#.to_string()),
    };
    assert_eq!(cli::execute_eval(&options).unwrap(), json!(42));
}

#[test]
fn test_eval_without_context() {
    let options = EvalOptions {
        expression: r#"[1, "a", null, 2.5]"#.to_string(),
        input: None,
    };
    assert_eq!(cli::execute_eval(&options).unwrap(), json!([1, "a", null, 2.5]));
}

#[test]
fn test_eval_rejects_non_object_context() {
    let options = EvalOptions {
        expression: "1".to_string(),
        input: Some("[1, 2]".to_string()),
    };
    assert!(matches!(
        cli::execute_eval(&options),
        Err(CliError::InvalidContext("array"))
    ));
}

#[test]
fn test_query_against_docs_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "---\ntags: [x]\nscore: 3\n---\n").unwrap();
    fs::write(dir.path().join("b.md"), "---\ntags: [x]\nscore: 3\n---\n").unwrap();

    let options = QueryOptions {
        query: "LIST file.name WHERE metadata.score == this.metadata.score".to_string(),
        docs_dir: dir.path().to_path_buf(),
        page: Some("a.md".to_string()),
    };
    assert_eq!(cli::execute_query(&options).unwrap(), "- a.md\n- b.md\n");

    let missing = QueryOptions {
        page: Some("nope.md".to_string()),
        ..options
    };
    assert!(matches!(
        cli::execute_query(&missing),
        Err(CliError::PageNotFound(page)) if page == "nope.md"
    ));
}
