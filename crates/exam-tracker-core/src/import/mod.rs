//! Lenient import of pasted exam data.
//!
//! Pasted payloads often come wrapped in prose or markdown fences (e.g. the
//! answer of a chat assistant asked to transcribe a lab report). Parsing is
//! tried on the whole text first, then on the span between the first `[` and
//! the last `]`.

mod normalize;

pub use normalize::*;

use serde_json::Value;
use thiserror::Error;

use crate::models::{Exam, ExamId};

/// Import errors.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Paste a valid JSON payload")]
    Empty,

    #[error("No valid data found in the pasted text")]
    NoData,

    #[error("Could not read the data: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Parse pasted text as JSON, recovering a bracketed array from surrounding
/// text when the whole input is not valid JSON.
pub fn parse_lenient(raw: &str) -> ImportResult<Value> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ImportError::Empty);
    }

    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let start = text.find('[').ok_or(ImportError::NoData)?;
    let end = text.rfind(']').ok_or(ImportError::NoData)?;
    if end < start {
        return Err(ImportError::NoData);
    }

    Ok(serde_json::from_str(&text[start..=end])?)
}

/// Turn a parsed payload into normalized records with fresh ids.
///
/// A bare value is treated as a one-element batch; falsy elements are skipped.
pub fn normalize_batch(parsed: &Value) -> Vec<Exam> {
    let items = match parsed {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    items
        .iter()
        .filter(|item| is_truthy(item))
        .map(|item| normalize_exam(item, ExamId::generate()))
        .collect()
}

/// Parse and normalize in one step.
pub fn parse_exams(raw: &str) -> ImportResult<Vec<Exam>> {
    let parsed = parse_lenient(raw)?;
    Ok(normalize_batch(&parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let exams = parse_exams(r#"[{"name":"TSH","date":"2024-02-02","result":"2,1"}]"#).unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].name, "TSH");
        assert_eq!(exams[0].result, "2,1");
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let raw = "Here is the data: [{\"name\":\"Glicose\",\"date\":\"2024-01-01\",\"result\":\"90\"}] Thanks";
        let exams = parse_exams(raw).unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].name, "Glicose");
    }

    #[test]
    fn test_parse_markdown_fence() {
        let raw = "```json\n[{\"name\":\"A\"},{\"name\":\"B\"}]\n```";
        let exams = parse_exams(raw).unwrap();
        let names: Vec<_> = exams.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_bare_object_is_single_batch() {
        let exams = parse_exams(r#"{"name":"Ferritina","result":120}"#).unwrap();
        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].result, "120");
    }

    #[test]
    fn test_falsy_elements_skipped() {
        let exams = parse_exams(r#"[null, {"name":"A"}, 0, "", false]"#).unwrap();
        assert_eq!(exams.len(), 1);
    }

    #[test]
    fn test_imported_ids_are_fresh() {
        let exams = parse_exams(r#"[{"id":1,"name":"A"},{"id":1,"name":"B"}]"#).unwrap();
        assert_ne!(exams[0].id, ExamId::Number(1));
        assert_ne!(exams[0].id, exams[1].id);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_lenient("   "), Err(ImportError::Empty)));
        assert!(matches!(parse_lenient("no json here"), Err(ImportError::NoData)));
        assert!(matches!(parse_lenient("] backwards ["), Err(ImportError::NoData)));
        assert!(matches!(parse_lenient("see [not json]"), Err(ImportError::Parse(_))));
    }
}
