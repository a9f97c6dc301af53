//! Runtime-info values embedded in the IR graph.

use serde::Serialize;
use std::collections::BTreeMap;

/// A value stored in the graph's `rt_info` section.
///
/// The IR keeps every value as an attribute string; the variants record
/// the intended type so the same data can also be emitted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RtValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<f64>),
}

/// Render a float the way the IR stores it: integral values keep `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl RtValue {
    /// Attribute text as written into the IR.
    pub fn to_ir_string(&self) -> String {
        match self {
            RtValue::Str(s) => s.clone(),
            RtValue::Int(i) => i.to_string(),
            RtValue::Float(f) => format_float(*f),
            RtValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            RtValue::List(items) => items.iter().map(|v| format_float(*v)).collect::<Vec<_>>().join(" "),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RtValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view; strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RtValue::Int(i) => Some(*i as f64),
            RtValue::Float(f) => Some(*f),
            RtValue::Str(s) => s.trim().parse().ok(),
            RtValue::Bool(_) | RtValue::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RtValue::Bool(b) => Some(*b),
            RtValue::Str(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(true),
                "false" | "0" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// List view; space-separated strings are split.
    pub fn as_f64_list(&self) -> Option<Vec<f64>> {
        match self {
            RtValue::List(items) => Some(items.clone()),
            RtValue::Str(s) => s.split_whitespace().map(|t| t.parse().ok()).collect(),
            RtValue::Int(_) | RtValue::Float(_) => self.as_f64().map(|v| vec![v]),
            RtValue::Bool(_) => None,
        }
    }
}

impl From<&str> for RtValue {
    fn from(value: &str) -> Self {
        RtValue::Str(value.to_string())
    }
}

impl From<String> for RtValue {
    fn from(value: String) -> Self {
        RtValue::Str(value)
    }
}

impl From<f64> for RtValue {
    fn from(value: f64) -> Self {
        RtValue::Float(value)
    }
}

impl From<f32> for RtValue {
    fn from(value: f32) -> Self {
        RtValue::Float(f64::from(value))
    }
}

impl From<i64> for RtValue {
    fn from(value: i64) -> Self {
        RtValue::Int(value)
    }
}

impl From<bool> for RtValue {
    fn from(value: bool) -> Self {
        RtValue::Bool(value)
    }
}

/// The `model_info` section of `rt_info`, keyed by field name.
pub type ModelInfo = BTreeMap<String, RtValue>;
