//! Exam record models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of an exam record.
///
/// Persisted collections written by older clients carry integer ids (the
/// built-in sample set uses 1-5); ids generated here are UUID v4 strings.
/// Ids are opaque and only ever compared for equality, so `Number(1)` and
/// `Text("1")` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExamId {
    Number(i64),
    Text(String),
}

impl ExamId {
    /// Generate a fresh, collision-resistant identifier.
    pub fn generate() -> Self {
        ExamId::Text(uuid::Uuid::new_v4().to_string())
    }

    /// Read an identifier from untrusted JSON.
    ///
    /// Returns `None` for missing/falsy values (`null`, `false`, `0`, `""`)
    /// and for shapes that cannot be an identifier (fractional numbers,
    /// booleans, arrays, objects).
    pub fn from_json(value: Option<&serde_json::Value>) -> Option<Self> {
        match value? {
            serde_json::Value::Number(n) => n.as_i64().filter(|&n| n != 0).map(ExamId::Number),
            serde_json::Value::String(s) if !s.is_empty() => Some(ExamId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamId::Number(n) => write!(f, "{}", n),
            ExamId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ExamId {
    type Err = std::convert::Infallible;

    /// Digit-only input maps to a numeric id, everything else to a text id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map(ExamId::Number)
            .unwrap_or_else(|_| ExamId::Text(s.to_string())))
    }
}

impl From<&str> for ExamId {
    fn from(s: &str) -> Self {
        ExamId::Text(s.to_string())
    }
}

impl From<i64> for ExamId {
    fn from(n: i64) -> Self {
        ExamId::Number(n)
    }
}

/// Whether a result falls outside its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    #[default]
    Normal,
    Altered,
}

impl ExamStatus {
    /// Coerce a loosely typed status: only an exact `"altered"` is altered.
    pub fn coerce(value: Option<&serde_json::Value>) -> Self {
        match value.and_then(|v| v.as_str()) {
            Some("altered") => ExamStatus::Altered,
            _ => ExamStatus::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::Normal => "normal",
            ExamStatus::Altered => "altered",
        }
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(ExamStatus::Normal),
            "altered" => Ok(ExamStatus::Altered),
            other => Err(format!("Unknown exam status: {}", other)),
        }
    }
}

/// A single lab exam result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exam {
    /// Unique within the store, never reused
    pub id: ExamId,
    /// Collection date (YYYY-MM-DD)
    pub date: String,
    /// Exam or metric name, e.g. "Glicose"; groups the chart series
    pub name: String,
    /// Free-text result, e.g. "92" or "9,5"
    pub result: String,
    #[serde(default)]
    pub unit: String,
    /// Reference range, e.g. "70 - 99"
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub status: ExamStatus,
    #[serde(default)]
    pub notes: String,
}

impl Exam {
    /// Create a record with a fresh id and required fields.
    pub fn new(date: impl Into<String>, name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: ExamId::generate(),
            date: date.into(),
            name: name.into(),
            result: result.into(),
            unit: String::new(),
            reference: String::new(),
            status: ExamStatus::Normal,
            notes: String::new(),
        }
    }

    /// Whether this record is flagged outside its reference range.
    pub fn is_altered(&self) -> bool {
        self.status == ExamStatus::Altered
    }

    /// Record contents with the id stripped, for comparisons that ignore
    /// identifier reassignment.
    pub fn content(&self) -> (&str, &str, &str, &str, &str, ExamStatus, &str) {
        (
            &self.date,
            &self.name,
            &self.result,
            &self.unit,
            &self.reference,
            self.status,
            &self.notes,
        )
    }
}

/// Input form for a new exam record.
///
/// `name` and `date` are required; the store clears the form after a
/// successful create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamForm {
    pub date: String,
    pub name: String,
    pub result: String,
    pub unit: String,
    pub reference: String,
    pub status: ExamStatus,
    pub notes: String,
}

impl ExamForm {
    /// Whether the required fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.date.is_empty()
    }

    /// Build a record from this form under the given id.
    pub fn to_exam(&self, id: ExamId) -> Exam {
        Exam {
            id,
            date: self.date.clone(),
            name: self.name.clone(),
            result: self.result.clone(),
            unit: self.unit.clone(),
            reference: self.reference.clone(),
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    /// Reset every field to its empty default.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_ids_differ() {
        let a = ExamId::generate();
        let b = ExamId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36); // UUID format
    }

    #[test]
    fn test_id_from_json() {
        assert_eq!(ExamId::from_json(Some(&json!(3))), Some(ExamId::Number(3)));
        assert_eq!(ExamId::from_json(Some(&json!("abc"))), Some(ExamId::Text("abc".into())));
        assert_eq!(ExamId::from_json(None), None);
        assert_eq!(ExamId::from_json(Some(&json!(null))), None);
        assert_eq!(ExamId::from_json(Some(&json!(0))), None);
        assert_eq!(ExamId::from_json(Some(&json!(""))), None);
        assert_eq!(ExamId::from_json(Some(&json!(1.5))), None);
        assert_eq!(ExamId::from_json(Some(&json!(true))), None);
    }

    #[test]
    fn test_id_serializes_in_input_shape() {
        assert_eq!(serde_json::to_string(&ExamId::Number(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&ExamId::from("x-1")).unwrap(), "\"x-1\"");
    }

    #[test]
    fn test_id_from_str() {
        assert_eq!("12".parse::<ExamId>().unwrap(), ExamId::Number(12));
        assert_eq!("12-abc".parse::<ExamId>().unwrap(), ExamId::Text("12-abc".into()));
    }

    #[test]
    fn test_status_coercion() {
        assert_eq!(ExamStatus::coerce(Some(&json!("altered"))), ExamStatus::Altered);
        assert_eq!(ExamStatus::coerce(Some(&json!("Altered"))), ExamStatus::Normal);
        assert_eq!(ExamStatus::coerce(Some(&json!("high"))), ExamStatus::Normal);
        assert_eq!(ExamStatus::coerce(None), ExamStatus::Normal);
    }

    #[test]
    fn test_exam_deserialize_defaults() {
        let exam: Exam =
            serde_json::from_str(r#"{"id":1,"date":"2024-01-01","name":"TSH","result":"2.1"}"#)
                .unwrap();
        assert_eq!(exam.unit, "");
        assert_eq!(exam.status, ExamStatus::Normal);
    }

    #[test]
    fn test_form_completeness() {
        let mut form = ExamForm {
            name: "Glicose".into(),
            ..Default::default()
        };
        assert!(!form.is_complete());
        form.date = "2024-01-01".into();
        assert!(form.is_complete());
        form.clear();
        assert_eq!(form, ExamForm::default());
    }
}
