// tests/cli_tests.rs

use axis_query::OperationRegistry;
use axis_query::cli::{
    CheckOptions, CheckResult, CliError, execute_canonical, execute_check, get_doc_category,
    get_docs_overview, operations_listing,
};
use axis_query::{QueryResult, Value, to_json};

const STORE: &str = r#"{
  "name": "pbmc",
  "scalars": { "version": 2 },
  "axes": { "cell": ["C1", "C2"], "gene": ["FOX1", "CD4", "RPL1"] },
  "vectors": { "gene": { "marker": [true, false, true], "score": [0.5, 1, 2.5] } },
  "matrices": [
    { "rows": "cell", "columns": "gene", "name": "UMIs",
      "values": [[0, 1, 7], [3, 0, 5]] }
  ]
}"#;

fn check(query: &str) -> Result<CheckResult, CliError> {
    let options = CheckOptions {
        query: query.to_string(),
        store: Some(STORE.to_string()),
        syntax_only: false,
    };
    execute_check(&options, &OperationRegistry::default())
}

fn check_json(query: &str) -> String {
    match check(query).unwrap() {
        CheckResult::Success(result) => to_json(result.as_ref()),
        other => panic!("Expected a result, got {:?}", other),
    }
}

#[test]
fn test_check_scalar() {
    let CheckResult::Success(Some(QueryResult::Scalar(value))) = check("version").unwrap() else {
        panic!("Expected a scalar");
    };
    assert_eq!(value, Value::Int(2));
}

#[test]
fn test_check_vector_json() {
    assert_eq!(
        check_json("gene & marker @ score"),
        r#"{"axis":"gene","entries":["FOX1","RPL1"],"type":"vector","values":[0.5,2.5]}"#
    );
}

#[test]
fn test_check_matrix_from_row_major_json() {
    assert_eq!(
        check_json("cell , gene @ UMIs"),
        r#"{"column_entries":["FOX1","CD4","RPL1"],"columns_axis":"gene","row_entries":["C1","C2"],"rows_axis":"cell","type":"matrix","values":[[0,1,7],[3,0,5]]}"#
    );
    assert_eq!(
        check_json("gene = RPL1 , cell = C2 @ UMIs"),
        r#"{"type":"scalar","value":5}"#
    );
}

#[test]
fn test_check_absent_result() {
    assert_eq!(check_json("gene & score > 10 @ score"), "null");
}

#[test]
fn test_syntax_only_needs_no_store() {
    let options = CheckOptions {
        query: "gene&marker@score%Log".to_string(),
        store: None,
        syntax_only: true,
    };
    let result = execute_check(&options, &OperationRegistry::default()).unwrap();
    let CheckResult::SyntaxValid(canonical) = result else {
        panic!("Expected syntax validation");
    };
    assert_eq!(canonical, "gene & marker @ score % Log ; base = e , eps = 0");
}

#[test]
fn test_check_errors() {
    let options = CheckOptions {
        query: "gene @ score".to_string(),
        store: None,
        syntax_only: false,
    };
    assert!(matches!(
        execute_check(&options, &OperationRegistry::default()),
        Err(CliError::NoInput)
    ));
    assert!(matches!(check("gene @"), Err(CliError::Parse(_))));
    assert!(matches!(check("gene @ missing"), Err(CliError::Eval(_))));

    let options = CheckOptions {
        query: "version".to_string(),
        store: Some("{ not json".to_string()),
        syntax_only: false,
    };
    assert!(matches!(
        execute_check(&options, &OperationRegistry::default()),
        Err(CliError::Store(_))
    ));
}

#[test]
fn test_canonical_command() {
    let registry = OperationRegistry::default();
    assert_eq!(
        execute_canonical("cell,gene@UMIs%>Sum", &registry).unwrap(),
        "cell , gene @ UMIs %> Sum"
    );
    assert!(matches!(execute_canonical("", &registry), Err(CliError::Parse(_))));
}

#[test]
fn test_operations_listing() {
    let listing = operations_listing(&OperationRegistry::default());
    assert!(listing.starts_with("ELEMENT-WISE OPERATIONS (%)"));
    assert!(listing.contains("\n\nREDUCTION OPERATIONS (%>)\n"));
    assert!(listing.ends_with('\n'));
    assert!(listing.contains("  Log "));
    assert!(listing.contains("    base : e or a positive number other than 1 = e"));
    assert!(listing.contains("  Median "));
}

#[test]
fn test_docs() {
    assert!(get_docs_overview().contains("DOCUMENTATION CATEGORIES"));
    assert!(get_doc_category("operators").unwrap().contains("%>"));
    assert!(get_doc_category("Filters").unwrap().starts_with("FILTERS"));
    let error = get_doc_category("methods").unwrap_err();
    assert!(error.to_string().contains("Unknown category: 'methods'"));
}
