//! JSON export.

use super::ExportArtifact;
use crate::models::Exam;

pub const JSON_FILE_NAME: &str = "exames.json";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialize the collection as a pretty-printed JSON array.
pub fn exams_to_json(exams: &[Exam]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(exams)
}

/// Build the `exames.json` download.
pub fn export_json(exams: &[Exam]) -> Result<ExportArtifact, serde_json::Error> {
    Ok(ExportArtifact {
        file_name: JSON_FILE_NAME,
        content_type: JSON_CONTENT_TYPE,
        contents: exams_to_json(exams)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExamId;

    #[test]
    fn test_json_is_pretty_array() {
        let mut exam = Exam::new("2024-01-12", "Glicose", "92");
        exam.id = ExamId::Number(4);

        let artifact = export_json(&[exam]).unwrap();
        assert_eq!(artifact.file_name, "exames.json");
        assert!(artifact.contents.starts_with("[\n  {\n    \"id\": 4,"));
        assert!(artifact.contents.contains("\"status\": \"normal\""));
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(exams_to_json(&[]).unwrap(), "[]");
    }
}
