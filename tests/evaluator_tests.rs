// tests/evaluator_tests.rs

use axis_query::registry::OperationRegistry;
use axis_query::{
    Array, EvalError, Evaluator, Matrix, MemoryStore, NamedMatrix, NamedVector, Query, QueryResult, Value,
};

fn store() -> MemoryStore {
    let mut store = MemoryStore::new("pbmc");
    store
        .add_axis("cell", ["C1", "C2", "C3"])
        .unwrap()
        .add_axis("gene", ["FOX1", "CD4", "RPL1", "RPS2"])
        .unwrap()
        .add_axis("batch", ["B1", "B2"])
        .unwrap()
        .add_axis("donor", ["D1", "D2"])
        .unwrap()
        .add_axis("empty", Vec::<String>::new())
        .unwrap();
    store
        .set_scalar("version", Value::Int(2))
        .set_scalar("organism", Value::String("human".to_string()));
    store
        .set_vector("cell", "batch", Array::String(vec!["B1".into(), "B2".into(), "B1".into()]))
        .unwrap()
        .set_vector("cell", "batch.raw", Array::String(vec!["B1".into(), "B3".into(), "B2".into()]))
        .unwrap()
        .set_vector("cell", "doublet", Array::Bool(vec![false, true, false]))
        .unwrap()
        .set_vector("gene", "marker", Array::Bool(vec![true, false, true, false]))
        .unwrap()
        .set_vector("gene", "score", Array::Float(vec![0.1, 0.9, 0.5, -0.3]))
        .unwrap()
        .set_vector(
            "gene",
            "kind",
            Array::String(vec!["tf".into(), "surface".into(), "ribosomal".into(), "ribosomal".into()]),
        )
        .unwrap()
        .set_vector("batch", "donor", Array::String(vec!["D2".into(), "D1".into()]))
        .unwrap()
        .set_vector("donor", "age", Array::Int(vec![30, 65]))
        .unwrap()
        .set_vector("empty", "x", Array::Float(vec![]))
        .unwrap();
    // Rows C1..C3, columns FOX1, CD4, RPL1, RPS2:
    //   0 1 7 2
    //   3 0 5 1
    //   4 4 0 8
    let umis = Matrix::new(3, 4, Array::Int(vec![0, 3, 4, 1, 0, 4, 7, 5, 0, 2, 1, 8])).unwrap();
    store.set_matrix("cell", "gene", "UMIs", umis).unwrap();
    store
}

fn eval(input: &str) -> Result<Option<QueryResult>, EvalError> {
    let registry = OperationRegistry::default();
    let query = Query::parse(input, &registry).unwrap();
    Evaluator::new(&store(), &registry).eval(&query)
}

fn scalar(input: &str) -> Value {
    match eval(input).unwrap() {
        Some(QueryResult::Scalar(value)) => value,
        other => panic!("Expected a scalar for {}, got {:?}", input, other),
    }
}

fn vector(input: &str) -> NamedVector {
    match eval(input).unwrap() {
        Some(QueryResult::Vector(vector)) => vector,
        other => panic!("Expected a vector for {}, got {:?}", input, other),
    }
}

fn matrix(input: &str) -> NamedMatrix {
    match eval(input).unwrap() {
        Some(QueryResult::Matrix(matrix)) => matrix,
        other => panic!("Expected a matrix for {}, got {:?}", input, other),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_scalar_properties() {
    assert_eq!(scalar("version"), Value::Int(2));
    assert_eq!(scalar("organism"), Value::String("human".to_string()));
}

#[test]
fn test_vector_entry() {
    assert_eq!(scalar("gene = CD4 @ score"), Value::Float(0.9));
    assert_eq!(scalar("gene = CD4 @ score > 0.5"), Value::Bool(true));
    assert_eq!(scalar("cell = C2 @ batch : donor"), Value::String("D1".to_string()));
}

#[test]
fn test_matrix_entry_in_either_orientation() {
    assert_eq!(scalar("cell = C3 , gene = RPS2 @ UMIs"), Value::Int(8));
    assert_eq!(scalar("gene = RPS2 , cell = C3 @ UMIs"), Value::Int(8));
    assert_eq!(scalar("cell = C1 , gene = RPL1 @ UMIs"), Value::Int(7));
}

#[test]
fn test_scalar_eltwise() {
    assert_eq!(scalar("version % Log ; base = 2"), Value::Float(1.0));
}

// ============================================================================
// Vectors
// ============================================================================

#[test]
fn test_vector_lookup() {
    let result = vector("gene @ score");
    assert_eq!(result.axis, "gene");
    assert_eq!(result.entries, strings(&["FOX1", "CD4", "RPL1", "RPS2"]));
    assert_eq!(result.values, Array::Float(vec![0.1, 0.9, 0.5, -0.3]));
}

#[test]
fn test_name_property() {
    assert_eq!(vector("batch @ name").values, Array::String(strings(&["B1", "B2"])));
}

#[test]
fn test_comparison_gives_mask() {
    assert_eq!(
        vector("gene @ score > 0.4").values,
        Array::Bool(vec![false, true, true, false])
    );
    assert_eq!(
        vector("gene @ kind = ribosomal").values,
        Array::Bool(vec![false, false, true, true])
    );
    assert_eq!(vector("donor @ age >= 65").values, Array::Bool(vec![false, true]));
}

#[test]
fn test_chained_lookup() {
    let result = vector("cell @ batch : donor : age");
    assert_eq!(result.axis, "cell");
    assert_eq!(result.values, Array::Int(vec![65, 30, 65]));
}

#[test]
fn test_chained_lookup_through_name_prefix() {
    let error = eval("cell @ batch.raw : donor").unwrap_err();
    assert_eq!(
        error,
        EvalError::ChainResolution {
            value: "B3".to_string(),
            property: "batch.raw".to_string(),
            axis: "cell".to_string(),
            target_axis: "batch".to_string(),
            store: "pbmc".to_string(),
        }
    );
}

#[test]
fn test_filters() {
    let result = vector("gene & marker @ score");
    assert_eq!(result.entries, strings(&["FOX1", "RPL1"]));
    assert_eq!(result.values, Array::Float(vec![0.1, 0.5]));

    let result = vector("gene & ~ marker @ score");
    assert_eq!(result.entries, strings(&["CD4", "RPS2"]));
}

#[test]
fn test_filters_apply_left_to_right() {
    assert_eq!(
        vector("gene & marker | score > 0.8 @ name").entries,
        strings(&["FOX1", "CD4", "RPL1"])
    );
    assert_eq!(
        vector("gene | score > 0.8 & marker @ name").entries,
        strings(&["FOX1", "RPL1"])
    );
    assert_eq!(vector("gene ^ marker @ name").entries, strings(&["CD4", "RPS2"]));
}

#[test]
fn test_same_combinator_order_does_not_matter() {
    let forward = vector("gene & marker & score > 0.4 @ name");
    let backward = vector("gene & score > 0.4 & marker @ name");
    assert_eq!(forward, backward);
    assert_eq!(forward.entries, strings(&["RPL1"]));
}

#[test]
fn test_chained_filter() {
    let result = vector("cell & batch : donor : age > 60 @ name");
    assert_eq!(result.entries, strings(&["C1", "C3"]));
}

#[test]
fn test_regex_filters_match_whole_values() {
    assert_eq!(vector("gene & kind ~ ribo.\\* @ name").entries, strings(&["RPL1", "RPS2"]));
    assert_eq!(vector("gene & kind !~ ribo.\\* @ name").entries, strings(&["FOX1", "CD4"]));
    assert_eq!(vector("gene & name ~ RP\\[SL\\]1 @ name").entries, strings(&["RPL1"]));
    assert!(eval("gene & kind ~ ribo @ name").unwrap().is_none());
}

#[test]
fn test_matrix_slice() {
    let result = vector("cell , gene = RPL1 @ UMIs");
    assert_eq!(result.axis, "cell");
    assert_eq!(result.values, Array::Int(vec![7, 5, 0]));

    let result = vector("cell & ~ doublet , gene = RPL1 @ UMIs");
    assert_eq!(result.entries, strings(&["C1", "C3"]));
    assert_eq!(result.values, Array::Int(vec![7, 0]));

    let result = vector("gene , cell = C2 @ UMIs");
    assert_eq!(result.axis, "gene");
    assert_eq!(result.values, Array::Int(vec![3, 0, 5, 1]));
}

#[test]
fn test_matrix_slice_with_entry_first() {
    let result = vector("gene = RPL1 , cell @ UMIs");
    assert_eq!(result.axis, "cell");
    assert_eq!(result.entries, strings(&["C1", "C2", "C3"]));
    assert_eq!(result.values, Array::Int(vec![7, 5, 0]));

    let result = vector("cell = C2 , gene & marker @ UMIs");
    assert_eq!(result.axis, "gene");
    assert_eq!(result.entries, strings(&["FOX1", "RPL1"]));
    assert_eq!(result.values, Array::Int(vec![3, 5]));
}

#[test]
fn test_vector_eltwise() {
    let result = vector("gene @ score % Abs");
    assert_eq!(result.values, Array::Float(vec![0.1, 0.9, 0.5, 0.3]));
    assert_eq!(result.entries, strings(&["FOX1", "CD4", "RPL1", "RPS2"]));

    let result = vector("gene @ score % Clamp ; min = 0 , max = 0.6");
    assert_eq!(result.values, Array::Float(vec![0.1, 0.6, 0.5, 0.0]));
}

// ============================================================================
// Matrices
// ============================================================================

#[test]
fn test_matrix_lookup() {
    let result = matrix("cell , gene @ UMIs");
    assert_eq!(result.rows_axis, "cell");
    assert_eq!(result.columns_axis, "gene");
    assert_eq!(result.get("C2", "FOX1"), Some(Value::Int(3)));
    assert_eq!(result.get("C3", "RPS2"), Some(Value::Int(8)));
}

#[test]
fn test_transposed_matrix_lookup() {
    let result = matrix("gene , cell @ UMIs");
    assert_eq!(result.row_entries, strings(&["FOX1", "CD4", "RPL1", "RPS2"]));
    assert_eq!(result.get("FOX1", "C2"), Some(Value::Int(3)));
    assert_eq!((result.matrix.nrows, result.matrix.ncols), (4, 3));
}

#[test]
fn test_filtered_matrix() {
    let result = matrix("cell & ~ doublet , gene & marker @ UMIs");
    assert_eq!(result.row_entries, strings(&["C1", "C3"]));
    assert_eq!(result.column_entries, strings(&["FOX1", "RPL1"]));
    assert_eq!(result.get("C1", "RPL1"), Some(Value::Int(7)));
    assert_eq!(result.get("C3", "FOX1"), Some(Value::Int(4)));
    assert_eq!(result.get("C2", "FOX1"), None);
}

#[test]
fn test_matrix_eltwise_keeps_axes() {
    let result = matrix("cell , gene @ UMIs % Log ; base = 2 , eps = 1");
    assert_eq!(result.row_entries, strings(&["C1", "C2", "C3"]));
    let Some(Value::Float(value)) = result.get("C2", "FOX1") else {
        panic!("Expected a float");
    };
    assert_close(value, 2.0);
}

// ============================================================================
// Reductions
// ============================================================================

#[test]
fn test_matrix_reduction_collapses_rows() {
    let result = vector("cell , gene @ UMIs %> Sum");
    assert_eq!(result.axis, "gene");
    assert_eq!(result.entries, strings(&["FOX1", "CD4", "RPL1", "RPS2"]));
    assert_eq!(result.values, Array::Float(vec![7.0, 5.0, 12.0, 11.0]));

    let result = vector("gene , cell @ UMIs %> Max");
    assert_eq!(result.axis, "cell");
    assert_eq!(result.values, Array::Float(vec![7.0, 5.0, 8.0]));
}

#[test]
fn test_double_reduction() {
    assert_eq!(scalar("cell , gene @ UMIs %> Sum %> Max"), Value::Float(12.0));
}

#[test]
fn test_vector_reductions() {
    let Value::Float(mean) = scalar("gene @ score %> Mean") else {
        panic!("Expected a float");
    };
    assert_close(mean, 0.3);
    let Value::Float(sum) = scalar("gene @ score %> Sum % Abs") else {
        panic!("Expected a float");
    };
    assert_close(sum, 1.2);
    let Value::Float(median) = scalar("gene @ score %> Median") else {
        panic!("Expected a float");
    };
    assert_close(median, 0.3);
    assert_eq!(scalar("gene & marker @ score %> Min"), Value::Float(0.1));
}

#[test]
fn test_reductions_of_empty_axes() {
    assert_eq!(vector("empty @ name").values, Array::String(vec![]));
    assert_eq!(scalar("empty @ x %> Sum"), Value::Float(0.0));
    let Value::Float(mean) = scalar("empty @ x %> Mean") else {
        panic!("Expected a float");
    };
    assert!(mean.is_nan());
}

// ============================================================================
// Absence
// ============================================================================

#[test]
fn test_empty_mask_is_absent() {
    assert_eq!(eval("gene & score > 5 @ name").unwrap(), None);
    assert_eq!(eval("gene & score > 5 @ score %> Sum").unwrap(), None);
    assert_eq!(eval("cell , gene & score > 5 @ UMIs").unwrap(), None);
    assert_eq!(eval("cell & doublet & ~ doublet , gene = FOX1 @ UMIs").unwrap(), None);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_data() {
    assert!(matches!(eval("tissue @ x"), Err(EvalError::MissingAxis { axis, .. }) if axis == "tissue"));
    assert!(matches!(eval("gene @ missing"), Err(EvalError::MissingProperty { .. })));
    assert!(matches!(eval("missing"), Err(EvalError::MissingProperty { .. })));
    assert!(matches!(eval("cell , gene @ Reads"), Err(EvalError::MissingProperty { .. })));
    assert!(matches!(
        eval("gene = XYZ @ score"),
        Err(EvalError::MissingEntry { entry, axis, .. }) if entry == "XYZ" && axis == "gene"
    ));
}

#[test]
fn test_error_messages_name_the_store() {
    let error = eval("gene @ missing").unwrap_err();
    assert!(error.to_string().ends_with("in the data: pbmc"));
}

#[test]
fn test_type_mismatches() {
    let type_mismatch = |input: &str| matches!(eval(input), Err(EvalError::TypeMismatch { .. }));
    assert!(type_mismatch("gene & score @ name"));
    assert!(type_mismatch("gene & ~ score @ name"));
    assert!(type_mismatch("gene & score > abc @ name"));
    assert!(type_mismatch("gene & score ~ 0.\\* @ name"));
    assert!(type_mismatch("gene & kind ~ \\[ @ name"));
    assert!(type_mismatch("gene @ kind % Log"));
    assert!(type_mismatch("gene @ marker %> Sum"));
    assert!(type_mismatch("organism % Abs"));
    assert!(type_mismatch("cell @ doublet : age"));
}

#[test]
fn test_chain_to_missing_axis() {
    assert!(matches!(
        eval("gene @ kind : size"),
        Err(EvalError::MissingAxis { axis, .. }) if axis == "kind"
    ));
}

#[test]
fn test_unknown_operation_in_evaluation_registry() {
    let registry = OperationRegistry::default();
    let query = Query::parse("gene @ score % Abs", &registry).unwrap();
    let result = Evaluator::new(&store(), &OperationRegistry::empty()).eval(&query);
    assert!(matches!(result, Err(EvalError::UnknownOperation { .. })));
}
