//! Fixed feature schema and request validation
//!
//! The scaler and the regressor are fitted on one feature order. Every
//! incoming record is checked against that schema and flattened into a
//! [`FeatureVector`] in exactly that order, so the artifacts never see a
//! permuted row.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Number of features the artifacts are fitted on
pub const N_FEATURES: usize = 14;

/// Kind of value a feature accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Any JSON number, or a string that parses as one
    Float,
    /// Integer in `i64` range, as a JSON number or string; integral floats allowed
    Integer,
}

/// A single named feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn float(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Float,
    }
}

const fn integer(name: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        kind: FeatureKind::Integer,
    }
}

/// Features in fitting order
pub const FEATURES: [FeatureSpec; N_FEATURES] = [
    float("Lat"),
    float("Long"),
    float("FAT Port to Customers"),
    float("Signal OPM ONT (dBm)"),
    float("Mitra_AFB"),
    float("Mitra_IDM"),
    float("Mitra_IFT"),
    float("Mitra_INTENS"),
    integer("Service_10"),
    integer("Service_20"),
    integer("Service_35"),
    integer("Service_50"),
    integer("dispo_dayofweek"),
    integer("dispo_is_weekend"),
];

/// The feature schema the service is built around
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSchema;

impl FeatureSchema {
    /// Create the schema
    pub fn new() -> Self {
        Self
    }

    /// All features in order
    pub fn features(&self) -> &'static [FeatureSpec] {
        &FEATURES
    }

    /// Feature names in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        FEATURES.iter().map(|f| f.name)
    }

    /// Width of a feature vector
    pub fn len(&self) -> usize {
        N_FEATURES
    }

    /// Always false; the schema is never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check that an artifact's recorded feature names match the schema order
    pub fn check_names(&self, names: &[String]) -> std::result::Result<(), String> {
        if names.len() != N_FEATURES {
            return Err(format!(
                "expected {} feature names, found {}",
                N_FEATURES,
                names.len()
            ));
        }

        for (i, (expected, found)) in self.names().zip(names).enumerate() {
            if expected != found.as_str() {
                return Err(format!(
                    "feature {} is '{}', expected '{}'",
                    i, found, expected
                ));
            }
        }

        Ok(())
    }

    /// Validate a decoded JSON body and flatten it in schema order.
    ///
    /// All field errors are collected. Unknown keys are ignored.
    pub fn validate(&self, body: &Value) -> std::result::Result<FeatureVector, ValidationErrors> {
        let object = match body {
            Value::Object(object) => object,
            _ => {
                return Err(ValidationErrors::single(FieldError::new(
                    vec!["body".to_string()],
                    "Input should be a valid dictionary or object to extract fields from",
                    "model_attributes_type",
                )))
            }
        };

        let mut values = [0.0; N_FEATURES];
        let mut errors = Vec::new();

        for (slot, spec) in values.iter_mut().zip(FEATURES.iter()) {
            match extract(object, spec) {
                Ok(v) => *slot = v,
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(FeatureVector(values))
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

fn extract(object: &Map<String, Value>, spec: &FeatureSpec) -> std::result::Result<f64, FieldError> {
    let loc = || vec!["body".to_string(), spec.name.to_string()];
    let fail = |(msg, kind): (&str, &str)| FieldError::new(loc(), msg, kind);

    let Some(value) = object.get(spec.name) else {
        return Err(fail(("Field required", "missing")));
    };

    match spec.kind {
        FeatureKind::Float => float_value(value).map_err(fail),
        FeatureKind::Integer => integer_value(value).map_err(fail),
    }
}

type Rejection = (&'static str, &'static str);

const FLOAT_TYPE: Rejection = ("Input should be a valid number", "float_type");
const FLOAT_PARSING: Rejection = (
    "Input should be a valid number, unable to parse string as a number",
    "float_parsing",
);
const INT_TYPE: Rejection = ("Input should be a valid integer", "int_type");
const INT_PARSING: Rejection = (
    "Input should be a valid integer, unable to parse string as an integer",
    "int_parsing",
);
const INT_FROM_FLOAT: Rejection = (
    "Input should be a valid integer, got a number with a fractional part",
    "int_from_float",
);
const INT_SIZE: Rejection = (
    "Input integer is too large to be represented",
    "int_parsing_size",
);

/// Numbers, or strings that parse as numbers
fn float_value(value: &Value) -> std::result::Result<f64, Rejection> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(FLOAT_TYPE),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| FLOAT_PARSING),
        _ => Err(FLOAT_TYPE),
    }
}

/// Integers that fit in `i64`, integral floats, or strings holding either
fn integer_value(value: &Value) -> std::result::Result<f64, Rejection> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i as f64)
            } else if n.is_u64() {
                Err(INT_SIZE)
            } else {
                integral(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i as f64);
            }
            match s.parse::<f64>() {
                Ok(f) => integral(f),
                Err(_) => Err(INT_PARSING),
            }
        }
        _ => Err(INT_TYPE),
    }
}

// i64::MIN is exactly -2^63; i64::MAX rounds up to 2^63, which is out of range.
fn integral(f: f64) -> std::result::Result<f64, Rejection> {
    if !f.is_finite() {
        Err(INT_PARSING)
    } else if f.fract() != 0.0 {
        Err(INT_FROM_FLOAT)
    } else if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        Err(INT_SIZE)
    } else {
        Ok(f)
    }
}

/// Features flattened in schema order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    /// Build a vector from values already in schema order
    pub fn from_values(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURES
            .iter()
            .position(|f| f.name == name)
            .map(|i| self.0[i])
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "Lat"]`
    pub loc: Vec<String>,

    /// Human-readable message
    pub msg: String,

    /// Machine-readable error type
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: Vec<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc.join("."), self.msg)
    }
}

/// All field errors found in one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.0.len() == 1 { "error" } else { "errors" };
        write!(f, "{} validation {}", self.0.len(), noun)?;
        for (i, e) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, e)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
