/// A typed literal value of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Float(f64),
    Integer(i64),
    /// The mathematical constant *e*, written `e`
    E,
    /// Let the operation pick, written `auto`
    Auto,
}

impl ParameterValue {
    /// Numeric value, with `e` resolved and `auto` mapped to `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(x) => Some(*x),
            ParameterValue::Integer(n) => Some(*n as f64),
            ParameterValue::E => Some(std::f64::consts::E),
            ParameterValue::Auto => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// Parameter values of an operation invocation, in schema order.
///
/// Defaults are filled in while parsing, so every parameter the operation
/// declares is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    pub values: Vec<(String, ParameterValue)>,
}

impl Parameters {
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values
            .iter()
            .find(|(parameter, _)| parameter == name)
            .map(|(_, value)| value)
    }

    /// Shorthand for `get(name).and_then(ParameterValue::as_f64)`.
    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParameterValue::as_f64)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParameterValue::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Invocation of a registered element-wise operation.
///
/// # Example
/// ```text
/// % Log ; base = 2 , eps = 1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EltwiseOperation {
    pub name: String,
    pub parameters: Parameters,
}

/// Invocation of a registered reduction operation.
///
/// # Example
/// ```text
/// %> Sum
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionOperation {
    pub name: String,
    pub parameters: Parameters,
}
