//! Built-in sample collection shown on first run.

use crate::models::{Exam, ExamId, ExamStatus};

fn sample(
    id: i64,
    date: &str,
    name: &str,
    result: &str,
    reference: &str,
    status: ExamStatus,
    notes: &str,
) -> Exam {
    Exam {
        id: ExamId::Number(id),
        date: date.to_string(),
        name: name.to_string(),
        result: result.to_string(),
        unit: "mg/dL".to_string(),
        reference: reference.to_string(),
        status,
        notes: notes.to_string(),
    }
}

/// Five example records with ids 1-5.
pub fn sample_exams() -> Vec<Exam> {
    use ExamStatus::*;

    vec![
        sample(1, "2023-01-15", "Colesterol Total", "...", "< 190", Normal, "Início do ano"),
        sample(2, "2023-06-20", "Colesterol Total", "210", "< 190", Altered, "Ajustar dieta"),
        sample(3, "2024-01-12", "Colesterol Total", "178", "< 190", Normal, "Melhora"),
        sample(4, "2024-01-12", "Glicose", "92", "70 - 99", Normal, ""),
        sample(5, "2024-07-10", "Glicose", "105", "70 - 99", Altered, "Rever hábitos"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_ids_distinct() {
        let exams = sample_exams();
        let ids: HashSet<_> = exams.iter().map(|e| e.id.clone()).collect();
        assert_eq!(exams.len(), 5);
        assert_eq!(ids.len(), 5);
    }
}
