//! Dashboard data-point models.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored `{label, value}` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataPoint {
    pub id: i64,
    pub label: String,
    pub value: i64,
}

/// Insert payload for a data point (id is assigned by the database).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertDataPoint {
    pub label: String,
    pub value: i64,
}

impl InsertDataPoint {
    pub fn new(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// Validate an untrusted JSON body.
    ///
    /// Checks `label` then `value` and reports only the first problem.
    pub fn validate(body: &Value) -> Result<Self, ValidationIssue> {
        let obj = body.as_object().ok_or_else(|| {
            ValidationIssue::new(format!("Expected object, received {}", type_name(body)), "")
        })?;

        let label = match obj.get("label") {
            None | Some(Value::Null) => return Err(ValidationIssue::new("Required", "label")),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(ValidationIssue::new(
                    format!("Expected string, received {}", type_name(other)),
                    "label",
                ))
            }
        };

        let value = match obj.get("value") {
            None | Some(Value::Null) => return Err(ValidationIssue::new("Required", "value")),
            Some(Value::Number(n)) => {
                let value = integral(n).ok_or_else(|| {
                    ValidationIssue::new("Expected integer, received float", "value")
                })?;
                check_int32(value)?
            }
            Some(other) => {
                return Err(ValidationIssue::new(
                    format!("Expected number, received {}", type_name(other)),
                    "value",
                ))
            }
        };

        Ok(Self { label, value })
    }
}

/// First validation failure of a create request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub message: String,
    /// Dotted path of the offending field, empty for the body itself
    pub field: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: field.into(),
        }
    }
}

/// Aggregates shown on the dashboard header cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPointSummary {
    pub total: i64,
    /// Mean of all values rounded half up, 0 when empty
    pub average: i64,
    /// First point holding the maximum value
    pub highest: Option<DataPoint>,
}

impl DataPointSummary {
    pub fn from_points(points: &[DataPoint]) -> Self {
        let wide: i128 = points.iter().map(|p| i128::from(p.value)).sum();
        let total = i64::try_from(wide).unwrap_or(if wide < 0 { i64::MIN } else { i64::MAX });
        let average = if points.is_empty() {
            0
        } else {
            // Halves round up, toward positive infinity
            (wide as f64 / points.len() as f64 + 0.5).floor() as i64
        };
        let highest = points
            .iter()
            .fold(None::<&DataPoint>, |best, p| match best {
                Some(b) if p.value <= b.value => Some(b),
                _ => Some(p),
            })
            .cloned();

        Self {
            total,
            average,
            highest,
        }
    }
}

/// Rows inserted into an empty table when the dashboard starts.
pub fn seed_data_points() -> Vec<InsertDataPoint> {
    vec![
        InsertDataPoint::new("Jan", 400),
        InsertDataPoint::new("Feb", 300),
        InsertDataPoint::new("Mar", 600),
        InsertDataPoint::new("Apr", 800),
        InsertDataPoint::new("May", 500),
    ]
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    // 5.0 is an integer as far as the client is concerned
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

/// Values are stored as 32-bit integers.
fn check_int32(value: i64) -> Result<i64, ValidationIssue> {
    if value > i64::from(i32::MAX) {
        return Err(ValidationIssue::new(
            format!("Number must be less than or equal to {}", i32::MAX),
            "value",
        ));
    }
    if value < i64::from(i32::MIN) {
        return Err(ValidationIssue::new(
            format!("Number must be greater than or equal to {}", i32::MIN),
            "value",
        ));
    }
    Ok(value)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
