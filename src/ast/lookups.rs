use crate::ast::{ComparisonOperator, FilterOperator};

/// A chain of property names.
///
/// The first name is looked up on the subject axis. Each following name is
/// looked up on the axis named by the previous property, using the previous
/// values as entry names.
///
/// # Example
/// ```text
/// batch : donor : age
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyLookup {
    /// Never empty
    pub names: Vec<String>,
}

impl PropertyLookup {
    pub fn new(name: impl Into<String>) -> Self {
        PropertyLookup {
            names: vec![name.into()],
        }
    }

    /// Extend the chain with one more hop.
    pub fn then(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// The property looked up on the subject axis.
    pub fn first(&self) -> &str {
        &self.names[0]
    }
}

/// Turns a property into a boolean mask by comparing it with a literal.
///
/// # Example
/// ```text
/// > 0.4
/// ~ RP[LS].*
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyComparison {
    pub operator: ComparisonOperator,
    /// The literal as written, parsed against the property type on evaluation
    pub value: String,
}

/// A property of an axis, optionally inverted or compared with a literal.
///
/// Field order matters: it is the sort order used for canonical filter runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisLookup {
    pub property: PropertyLookup,
    pub comparison: Option<PropertyComparison>,
    /// `~ name`; only valid for boolean properties
    pub inverted: bool,
}

impl AxisLookup {
    pub fn new(property: PropertyLookup) -> Self {
        AxisLookup {
            property,
            comparison: None,
            inverted: false,
        }
    }

    pub fn compare(mut self, operator: ComparisonOperator, value: impl Into<String>) -> Self {
        self.comparison = Some(PropertyComparison {
            operator,
            value: value.into(),
        });
        self
    }

    pub fn invert(mut self) -> Self {
        self.inverted = true;
        self
    }
}

impl From<PropertyLookup> for AxisLookup {
    fn from(property: PropertyLookup) -> Self {
        AxisLookup::new(property)
    }
}

impl From<&str> for AxisLookup {
    fn from(name: &str) -> Self {
        AxisLookup::new(PropertyLookup::new(name))
    }
}

/// One step of a filtered axis: combine the running mask with a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxisFilter {
    pub operator: FilterOperator,
    pub lookup: AxisLookup,
}

/// An axis restricted by zero or more filters, applied left to right.
///
/// # Example
/// ```text
/// gene & marker | score > 0.4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilteredAxis {
    pub axis: String,
    pub filters: Vec<AxisFilter>,
}

impl FilteredAxis {
    pub fn new(axis: impl Into<String>) -> Self {
        FilteredAxis {
            axis: axis.into(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, operator: FilterOperator, lookup: impl Into<AxisLookup>) -> Self {
        self.filters.push(AxisFilter {
            operator,
            lookup: lookup.into(),
        });
        self
    }

    pub fn and(self, lookup: impl Into<AxisLookup>) -> Self {
        self.filter(FilterOperator::And, lookup)
    }

    pub fn or(self, lookup: impl Into<AxisLookup>) -> Self {
        self.filter(FilterOperator::Or, lookup)
    }

    pub fn xor(self, lookup: impl Into<AxisLookup>) -> Self {
        self.filter(FilterOperator::Xor, lookup)
    }
}

/// A single entry of an axis.
///
/// # Example
/// ```text
/// gene = FOX1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxisEntry {
    pub axis: String,
    pub entry: String,
}

impl AxisEntry {
    pub fn new(axis: impl Into<String>, entry: impl Into<String>) -> Self {
        AxisEntry {
            axis: axis.into(),
            entry: entry.into(),
        }
    }
}

/// Rows and columns of a full matrix result (`cell , gene`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixAxes {
    pub rows: FilteredAxis,
    pub columns: FilteredAxis,
}

/// A filtered axis and a single entry of the other axis (`cell , gene = FOX1`).
///
/// The result is a vector along `axis`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixSliceAxes {
    pub axis: FilteredAxis,
    pub entry: AxisEntry,
}

/// A single entry of each axis (`cell = C1 , gene = FOX1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixEntryAxes {
    pub rows: AxisEntry,
    pub columns: AxisEntry,
}

/// A scalar property (`version`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalarPropertyLookup {
    pub name: String,
}

/// A vector property of a filtered axis (`gene & marker @ score > 0.4`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorPropertyLookup {
    pub axis: FilteredAxis,
    pub property: AxisLookup,
}

/// A matrix property (`cell , gene @ UMIs`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixPropertyLookup {
    pub axes: MatrixAxes,
    pub name: String,
}

/// One row or column of a matrix property (`cell , gene = FOX1 @ UMIs`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixSliceLookup {
    pub axes: MatrixSliceAxes,
    pub name: String,
}

/// One entry of a vector property (`cell = C1 @ batch : age`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VectorEntryLookup {
    pub entry: AxisEntry,
    pub property: AxisLookup,
}

/// One entry of a matrix property (`cell = C1 , gene = FOX1 @ UMIs`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatrixEntryLookup {
    pub axes: MatrixEntryAxes,
    pub name: String,
}
