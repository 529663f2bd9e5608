//! CSV export.

use super::ExportArtifact;
use crate::models::Exam;

pub const CSV_FILE_NAME: &str = "exames.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8;";

/// Column order of the CSV export.
pub const CSV_HEADER: [&str; 7] = ["date", "name", "result", "unit", "reference", "status", "notes"];

/// Render the collection as CSV.
///
/// Every cell, header included, is quoted; rows are joined by `\n` with no
/// trailing newline.
pub fn exams_to_csv(exams: &[Exam]) -> String {
    let mut lines = Vec::with_capacity(exams.len() + 1);
    lines.push(csv_row(&CSV_HEADER));

    for exam in exams {
        lines.push(csv_row(&[
            exam.date.as_str(),
            exam.name.as_str(),
            exam.result.as_str(),
            exam.unit.as_str(),
            exam.reference.as_str(),
            exam.status.as_str(),
            exam.notes.as_str(),
        ]));
    }

    lines.join("\n")
}

/// Build the `exames.csv` download.
pub fn export_csv(exams: &[Exam]) -> ExportArtifact {
    ExportArtifact {
        file_name: CSV_FILE_NAME,
        content_type: CSV_CONTENT_TYPE,
        contents: exams_to_csv(exams),
    }
}

fn csv_row(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|cell| escape_csv(cell))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a cell unconditionally, doubling inner quotes.
fn escape_csv(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExamStatus;

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "\"simple\"");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("has \"quotes\""), "\"has \"\"quotes\"\"\"");
        assert_eq!(escape_csv(""), "\"\"");
    }

    #[test]
    fn test_csv_layout() {
        let mut exam = Exam::new("2023-06-20", "Colesterol Total", "210");
        exam.unit = "mg/dL".into();
        exam.reference = "< 190".into();
        exam.status = ExamStatus::Altered;
        exam.notes = "Ajustar dieta".into();

        let csv = exams_to_csv(&[exam]);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#""date","name","result","unit","reference","status","notes""#
        );
        assert_eq!(
            lines[1],
            r#""2023-06-20","Colesterol Total","210","mg/dL","< 190","altered","Ajustar dieta""#
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_default_status_exported_as_normal() {
        let exam = Exam::new("2024-01-01", "TSH", "");
        let csv = exams_to_csv(&[exam]);
        assert!(csv.lines().nth(1).unwrap().contains("\"normal\""));
    }

    #[test]
    fn test_notes_with_quotes() {
        let mut exam = Exam::new("2024-01-01", "TSH", "2");
        exam.notes = "has \"quotes\"".into();
        let csv = exams_to_csv(&[exam]);
        assert!(csv.ends_with(",\"has \"\"quotes\"\"\""));
    }
}
