//! Untrusted JSON -> exam record conversion.
//!
//! Every field has an explicit default and coercion rule:
//!
//! | field                        | rule                                           |
//! |------------------------------|------------------------------------------------|
//! | `id`                         | fresh on import; kept on load when valid       |
//! | `date`, `name`, `result`     | text coercion, missing/null -> `""`            |
//! | `unit`, `reference`, `notes` | falsy -> `""`, otherwise text coercion         |
//! | `status`                     | `"altered"` exactly -> altered, else normal    |

use serde_json::{Map, Value};

use crate::models::{Exam, ExamId, ExamStatus};

/// Build a record from an untrusted JSON value under the given id.
///
/// Non-object values become a record with every field defaulted.
pub fn normalize_exam(value: &Value, id: ExamId) -> Exam {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    Exam {
        id,
        date: coerce_text(obj.get("date")),
        name: coerce_text(obj.get("name")),
        result: coerce_text(obj.get("result")),
        unit: coerce_optional_text(obj.get("unit")),
        reference: coerce_optional_text(obj.get("reference")),
        status: ExamStatus::coerce(obj.get("status")),
        notes: coerce_optional_text(obj.get("notes")),
    }
}

/// Stringify a loosely typed field the way a dynamic client would.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| coerce_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// Like [`coerce_text`], but every falsy value becomes the empty string.
pub fn coerce_optional_text(value: Option<&Value>) -> String {
    match value {
        Some(v) if is_truthy(v) => coerce_text(Some(v)),
        _ => String::new(),
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            // 90.0 prints as "90" on the client
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}
