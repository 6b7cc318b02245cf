// 🔢 Field Values
// A cell is a number, a string, or explicitly missing.
//
// Missing is NOT zero. A derived sentinel of 0.0 and an absent value
// rank differently, so the two must never collapse into each other.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens treated as "no value" when classifying raw cells.
const MISSING_TOKENS: &[&str] = &["", "nan", "na", "n/a", "null", "none", "-nan"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Classify a raw cell read from a tabular source.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        {
            return Value::Missing;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            // "inf" parses as f64 but must not leak into rankings
            Ok(_) => Value::Missing,
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    /// Wrap a computed number, mapping NaN/inf to `Missing`.
    pub fn from_f64(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Missing
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Missing
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Missing => write!(f, "N/A"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
