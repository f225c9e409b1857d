// tests/canonical_tests.rs

use axis_query::ast::{AxisLookup, ComparisonOperator, FilteredAxis, PropertyLookup, VectorDataLookup, VectorPropertyLookup, VectorQuery};
use axis_query::canonical;
use axis_query::registry::OperationRegistry;

fn canon(input: &str) -> String {
    canonical(input, &OperationRegistry::default()).unwrap()
}

// ============================================================================
// Spacing and escaping
// ============================================================================

#[test]
fn test_spacing_is_normalized() {
    assert_eq!(canon("cell,gene@UMIs"), "cell , gene @ UMIs");
    assert_eq!(canon("  gene   =FOX1@ score # comment\n"), "gene = FOX1 @ score");
    assert_eq!(canon("cell,gene@UMIs%>Sum%>Max"), "cell , gene @ UMIs %> Sum %> Max");
}

#[test]
fn test_names_stay_escaped() {
    assert_eq!(canon("total\\ UMIs"), "total\\ UMIs");
    assert_eq!(canon("cell & type = T\\ cell @ age"), "cell & type = T\\ cell @ age");
}

#[test]
fn test_escaped_line_break_becomes_a_space() {
    let canonical = canon("gene & a\\\nb @ name");
    assert_eq!(canonical, "gene & a\\ b @ name");
    assert!(!canonical.contains('\n'));
    assert_eq!(canon(&canonical), canonical);
}

#[test]
fn test_slice_with_entry_first() {
    assert_eq!(canon("gene=FOX1,cell@UMIs"), "cell , gene = FOX1 @ UMIs");
    assert_eq!(canon("gene = FOX1 , cell & ~ doublet @ UMIs"), "cell & ~ doublet , gene = FOX1 @ UMIs");
}

#[test]
fn test_inversion_and_chains() {
    assert_eq!(canon("gene&~marker@score"), "gene & ~ marker @ score");
    assert_eq!(canon("cell@batch:donor:age"), "cell @ batch : donor : age");
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameters_are_explicit() {
    assert_eq!(
        canon("gene&b&a,cell@UMIs%Log;eps=1"),
        "gene & a & b , cell @ UMIs % Log ; base = e , eps = 1"
    );
    assert_eq!(canon("gene @ score % Round"), "gene @ score % Round ; digits = 0");
    assert_eq!(
        canon("gene @ score % Clamp ; max = 5"),
        "gene @ score % Clamp ; min = auto , max = 5"
    );
    assert_eq!(canon("gene @ score % Abs"), "gene @ score % Abs");
}

#[test]
fn test_parameter_order_and_literals_normalize() {
    assert_eq!(
        canon("version % Log ; eps = 1.0 , base = 2.0"),
        "version % Log ; base = 2 , eps = 1"
    );
    assert_eq!(canon("version % Log ; base = e"), canon("version % Log"));
}

#[test]
fn test_numeric_e_base_renders_as_e() {
    assert_eq!(
        canon("gene @ score % Log ; base = 2.718281828459045"),
        canon("gene @ score % Log ; base = e")
    );
    assert_eq!(
        canon("gene @ score % Log ; base = 2.718281828459045"),
        "gene @ score % Log ; base = e , eps = 0"
    );
    // Only the log base folds onto `e`.
    assert_eq!(
        canon("gene @ score % Clamp ; min = 2.718281828459045"),
        "gene @ score % Clamp ; min = 2.718281828459045 , max = auto"
    );
}

// ============================================================================
// Filter sorting
// ============================================================================

#[test]
fn test_same_combinator_filters_are_sorted() {
    assert_eq!(canon("gene & score > 0.5 & marker @ name"), "gene & marker & score > 0.5 @ name");
    assert_eq!(canon("gene & ~ marker & marker @ name"), "gene & marker & ~ marker @ name");
    assert_eq!(canon("gene & b & a @ x"), canon("gene & a & b @ x"));
}

#[test]
fn test_different_combinators_keep_their_order() {
    assert_eq!(canon("gene & b | a @ x"), "gene & b | a @ x");
    assert_ne!(canon("gene & a | b @ x"), canon("gene | b & a @ x"));
}

#[test]
fn test_sorting_does_not_change_the_tree() {
    let registry = OperationRegistry::default();
    let query = VectorQuery::parse("gene & b & a @ x", &registry).unwrap();
    let VectorQuery::Lookup {
        lookup: VectorDataLookup::Vector(VectorPropertyLookup { axis, .. }),
        ..
    } = query
    else {
        panic!("Expected a vector lookup");
    };
    assert_eq!(axis, FilteredAxis::new("gene").and("b").and("a"));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_canonical_form_is_a_fixed_point() {
    let queries = [
        "version",
        "version % Abs",
        "gene = FOX1 @ score",
        "cell = C1 , gene = FOX1 @ UMIs",
        "gene @ score > 0.4",
        "gene & kind ~ RP\\[SL\\].\\* @ name",
        "cell & ~ doublet , gene = FOX1 @ UMIs",
        "cell & batch : donor : age >= 60 | doublet , gene & marker @ UMIs % Log ; base = 2",
        "cell , gene @ UMIs %> Median % Round ; digits = 2",
    ];
    for query in queries {
        let once = canon(query);
        assert_eq!(canon(&once), once, "Not a fixed point for: {}", query);
    }
}

#[test]
fn test_constructed_queries_render() {
    let axis = FilteredAxis::new("cell type")
        .and(AxisLookup::new(PropertyLookup::new("batch").then("donor")).compare(ComparisonOperator::NotEqual, "D 1"));
    assert_eq!(axis.to_string(), "cell\\ type & batch : donor != D\\ 1");
}
