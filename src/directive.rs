//! Authored per-field override records.
//!
//! A build-time pass over the type declarations produces an explicit
//! directive record per field, carried in the document as the property-level
//! `x-ui` object; declared validation constraints travel alongside it as
//! `x-constraints`. The inference engine only ever consumes these records and
//! never mutates them.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Key under which a field's directive is stored on its property node.
pub const DIRECTIVE_KEY: &str = "x-ui";
/// Key under which a field's validation constraints are stored.
pub const CONSTRAINTS_KEY: &str = "x-constraints";

/// Explicitly authored rendering overrides for one field. Every member is
/// optional; absence means "no explicit choice".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDirective {
    pub control_type: Option<String>,
    pub data_type: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub pattern: Option<String>,
    pub required: Option<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub icon: Option<String>,
    pub hidden: Option<bool>,
    pub read_only: Option<bool>,
    pub order: Option<i64>,
    /// Authored validation messages, keyed by hint name.
    pub messages: Option<Map<String, Value>>,
    /// Free-form raw overrides applied last and unconditionally.
    pub overrides: Option<Map<String, Value>>,
}

impl FieldDirective {
    /// Parse the directive from a property node, if one is present.
    ///
    /// A malformed directive is treated as absent rather than failing the
    /// whole enrichment.
    pub fn from_property(prop: &Value) -> Option<Self> {
        let raw = prop.get(DIRECTIVE_KEY)?;
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Bounds of a size/length constraint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SizeBounds {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// A decimal bound with an inclusivity flag (defaults to inclusive).
#[derive(Debug, Clone, Deserialize)]
pub struct DecimalBound {
    pub value: f64,
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
}

fn default_inclusive() -> bool {
    true
}

/// Digit-count constraint: allowed integer and fraction digits.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DigitCounts {
    pub integer: u32,
    pub fraction: u32,
}

/// Declared validation constraints for one field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationConstraints {
    pub not_blank: Option<bool>,
    pub required: Option<bool>,
    pub size: Option<SizeBounds>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub decimal_min: Option<DecimalBound>,
    pub decimal_max: Option<DecimalBound>,
    pub pattern: Option<String>,
    pub past: Option<bool>,
    pub past_or_present: Option<bool>,
    pub future: Option<bool>,
    pub future_or_present: Option<bool>,
    pub positive: Option<bool>,
    pub positive_or_zero: Option<bool>,
    pub negative: Option<bool>,
    pub negative_or_zero: Option<bool>,
    pub digits: Option<DigitCounts>,
}

impl ValidationConstraints {
    /// Parse the constraints record from a property node. Malformed records
    /// degrade to the empty record.
    pub fn from_property(prop: &Value) -> Self {
        prop.get(CONSTRAINTS_KEY)
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
            .unwrap_or_default()
    }
}
