//! Named element-wise and reduction operations.
//!
//! The query language only knows operations by name. An
//! [`OperationRegistry`] maps each name to an [`OperationSchema`] describing
//! its parameters and a builder producing the numeric implementation. The
//! registry is assembled once at start-up and then passed by reference to
//! the parser and the evaluator.
//!
//! ```
//! use axis_query::registry::OperationRegistry;
//!
//! let registry = OperationRegistry::default();
//! assert!(registry.eltwise("Log").is_some());
//! assert!(registry.reduction("Sum").is_some());
//! assert!(registry.reduction("Log").is_none());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::ast::{ParameterValue, Parameters};

/// Whether an operation preserves shape or collapses an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Eltwise,
    Reduction,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Eltwise => f.write_str("eltwise"),
            OperationKind::Reduction => f.write_str("reduction"),
        }
    }
}

/// The literal forms a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// Any floating point number
    Float,
    /// A whole number
    Integer,
    /// `e` or a positive number other than 1
    LogBase,
    /// `auto` or any floating point number
    OptionalFloat,
}

impl ParameterType {
    /// Parse a literal, returning `None` when it does not fit this type.
    pub fn parse(self, literal: &str) -> Option<ParameterValue> {
        match self {
            ParameterType::Float => literal.parse().ok().map(ParameterValue::Float),
            ParameterType::Integer => literal.parse().ok().map(ParameterValue::Integer),
            ParameterType::LogBase => match literal {
                "e" => Some(ParameterValue::E),
                _ => match literal.parse::<f64>().ok()? {
                    base if base == std::f64::consts::E => Some(ParameterValue::E),
                    base if base > 0.0 && base != 1.0 => Some(ParameterValue::Float(base)),
                    _ => None,
                },
            },
            ParameterType::OptionalFloat => match literal {
                "auto" => Some(ParameterValue::Auto),
                _ => literal.parse().ok().map(ParameterValue::Float),
            },
        }
    }

    /// Human readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            ParameterType::Float => "a number",
            ParameterType::Integer => "an integer",
            ParameterType::LogBase => "e or a positive number other than 1",
            ParameterType::OptionalFloat => "auto or a number",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParameterType,
    pub default: ParameterValue,
    pub description: &'static str,
}

/// A shape-preserving numeric transform.
pub trait EltwiseFn: Send + Sync {
    fn apply(&self, value: f64) -> f64;
}

/// A numeric aggregation of a column of values.
pub trait ReductionFn: Send + Sync {
    fn reduce(&self, values: &[f64]) -> f64;
}

#[derive(Clone, Copy)]
pub enum OperationBuilder {
    Eltwise(fn(&Parameters) -> Box<dyn EltwiseFn>),
    Reduction(fn(&Parameters) -> Box<dyn ReductionFn>),
}

impl fmt::Debug for OperationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationBuilder::Eltwise(_) => f.write_str("Eltwise(..)"),
            OperationBuilder::Reduction(_) => f.write_str("Reduction(..)"),
        }
    }
}

/// Everything the parser and evaluator need to know about one operation.
#[derive(Debug, Clone)]
pub struct OperationSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
    pub builder: OperationBuilder,
}

impl OperationSchema {
    pub fn eltwise(
        name: &'static str,
        description: &'static str,
        builder: fn(&Parameters) -> Box<dyn EltwiseFn>,
    ) -> Self {
        OperationSchema {
            name,
            description,
            parameters: Vec::new(),
            builder: OperationBuilder::Eltwise(builder),
        }
    }

    pub fn reduction(
        name: &'static str,
        description: &'static str,
        builder: fn(&Parameters) -> Box<dyn ReductionFn>,
    ) -> Self {
        OperationSchema {
            name,
            description,
            parameters: Vec::new(),
            builder: OperationBuilder::Reduction(builder),
        }
    }

    pub fn parameter(
        mut self,
        name: &'static str,
        kind: ParameterType,
        default: ParameterValue,
        description: &'static str,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name,
            kind,
            default,
            description,
        });
        self
    }

    pub fn kind(&self) -> OperationKind {
        match self.builder {
            OperationBuilder::Eltwise(_) => OperationKind::Eltwise,
            OperationBuilder::Reduction(_) => OperationKind::Reduction,
        }
    }

    pub fn find_parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }
}

/// Lookup table from operation names to their schemas.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    eltwise: BTreeMap<&'static str, OperationSchema>,
    reductions: BTreeMap<&'static str, OperationSchema>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl OperationRegistry {
    /// A registry with no operations at all.
    pub fn empty() -> Self {
        OperationRegistry {
            eltwise: BTreeMap::new(),
            reductions: BTreeMap::new(),
        }
    }

    /// A registry with the builtin operations.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for schema in builtins::eltwise().into_iter().chain(builtins::reductions()) {
            registry = registry.register(schema);
        }
        registry
    }

    /// Add (or replace) an operation.
    pub fn register(mut self, schema: OperationSchema) -> Self {
        match schema.kind() {
            OperationKind::Eltwise => self.eltwise.insert(schema.name, schema),
            OperationKind::Reduction => self.reductions.insert(schema.name, schema),
        };
        self
    }

    pub fn eltwise(&self, name: &str) -> Option<&OperationSchema> {
        self.eltwise.get(name)
    }

    pub fn reduction(&self, name: &str) -> Option<&OperationSchema> {
        self.reductions.get(name)
    }

    pub fn lookup(&self, kind: OperationKind, name: &str) -> Option<&OperationSchema> {
        match kind {
            OperationKind::Eltwise => self.eltwise(name),
            OperationKind::Reduction => self.reduction(name),
        }
    }

    /// All registered operations, element-wise first, each group sorted by name.
    pub fn schemas(&self) -> impl Iterator<Item = &OperationSchema> {
        self.eltwise.values().chain(self.reductions.values())
    }

    pub fn construct_eltwise(&self, name: &str, parameters: &Parameters) -> Option<Box<dyn EltwiseFn>> {
        match self.eltwise(name)?.builder {
            OperationBuilder::Eltwise(build) => Some(build(parameters)),
            OperationBuilder::Reduction(_) => None,
        }
    }

    pub fn construct_reduction(
        &self,
        name: &str,
        parameters: &Parameters,
    ) -> Option<Box<dyn ReductionFn>> {
        match self.reduction(name)?.builder {
            OperationBuilder::Reduction(build) => Some(build(parameters)),
            OperationBuilder::Eltwise(_) => None,
        }
    }
}

mod builtins {
    use super::*;

    struct Abs;

    impl EltwiseFn for Abs {
        fn apply(&self, value: f64) -> f64 {
            value.abs()
        }
    }

    struct Log {
        base: f64,
        eps: f64,
    }

    impl EltwiseFn for Log {
        fn apply(&self, value: f64) -> f64 {
            (value + self.eps).ln() / self.base.ln()
        }
    }

    struct Round {
        scale: f64,
    }

    impl EltwiseFn for Round {
        fn apply(&self, value: f64) -> f64 {
            (value * self.scale).round() / self.scale
        }
    }

    struct Clamp {
        min: f64,
        max: f64,
    }

    impl EltwiseFn for Clamp {
        fn apply(&self, value: f64) -> f64 {
            value.max(self.min).min(self.max)
        }
    }

    pub(super) fn eltwise() -> Vec<OperationSchema> {
        vec![
            OperationSchema::eltwise("Abs", "Absolute value", |_| Box::new(Abs)),
            OperationSchema::eltwise("Log", "Logarithm of the value plus eps", |parameters| {
                Box::new(Log {
                    base: parameters.float("base").unwrap_or(std::f64::consts::E),
                    eps: parameters.float("eps").unwrap_or(0.0),
                })
            })
            .parameter("base", ParameterType::LogBase, ParameterValue::E, "Logarithm base")
            .parameter("eps", ParameterType::Float, ParameterValue::Float(0.0), "Added before the log"),
            OperationSchema::eltwise("Round", "Round to a number of decimal digits", |parameters| {
                let digits = parameters.integer("digits").unwrap_or(0);
                Box::new(Round {
                    scale: 10f64.powi(digits.clamp(-308, 308) as i32),
                })
            })
            .parameter("digits", ParameterType::Integer, ParameterValue::Integer(0), "Decimal digits to keep"),
            OperationSchema::eltwise("Clamp", "Limit values to a range", |parameters| {
                Box::new(Clamp {
                    min: parameters.float("min").unwrap_or(f64::NEG_INFINITY),
                    max: parameters.float("max").unwrap_or(f64::INFINITY),
                })
            })
            .parameter("min", ParameterType::OptionalFloat, ParameterValue::Auto, "Lowest value, auto for none")
            .parameter("max", ParameterType::OptionalFloat, ParameterValue::Auto, "Highest value, auto for none"),
        ]
    }

    struct Sum;

    impl ReductionFn for Sum {
        fn reduce(&self, values: &[f64]) -> f64 {
            values.iter().sum()
        }
    }

    struct Min;

    impl ReductionFn for Min {
        fn reduce(&self, values: &[f64]) -> f64 {
            values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
        }
    }

    struct Max;

    impl ReductionFn for Max {
        fn reduce(&self, values: &[f64]) -> f64 {
            values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
        }
    }

    struct Mean;

    impl ReductionFn for Mean {
        fn reduce(&self, values: &[f64]) -> f64 {
            mean(values)
        }
    }

    struct Median;

    impl ReductionFn for Median {
        fn reduce(&self, values: &[f64]) -> f64 {
            if values.is_empty() {
                return f64::NAN;
            }
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let middle = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[middle - 1] + sorted[middle]) / 2.0
            } else {
                sorted[middle]
            }
        }
    }

    /// Population variance, optionally the standard deviation.
    struct Var {
        sqrt: bool,
    }

    impl ReductionFn for Var {
        fn reduce(&self, values: &[f64]) -> f64 {
            let mean = mean(values);
            let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / values.len() as f64;
            if self.sqrt { var.sqrt() } else { var }
        }
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub(super) fn reductions() -> Vec<OperationSchema> {
        vec![
            OperationSchema::reduction("Sum", "Sum of the values", |_| Box::new(Sum)),
            OperationSchema::reduction("Min", "Smallest value", |_| Box::new(Min)),
            OperationSchema::reduction("Max", "Largest value", |_| Box::new(Max)),
            OperationSchema::reduction("Mean", "Arithmetic mean", |_| Box::new(Mean)),
            OperationSchema::reduction("Median", "Middle value", |_| Box::new(Median)),
            OperationSchema::reduction("Var", "Population variance", |_| Box::new(Var { sqrt: false })),
            OperationSchema::reduction("Std", "Population standard deviation", |_| {
                Box::new(Var { sqrt: true })
            }),
        ]
    }
}
