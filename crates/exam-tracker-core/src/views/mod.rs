//! Derived views over the exam collection.
//!
//! All views are pure functions of the current collection and are recomputed
//! on demand after each mutation.

mod chart;

pub use chart::*;

use std::collections::BTreeSet;

use crate::models::Exam;

/// Records matching a free-text query, in collection order.
///
/// The query is trimmed and lowercased; an empty query returns everything.
/// A record matches when the space-joined text of its non-empty fields
/// contains the query.
pub fn filter_exams<'a>(exams: &'a [Exam], query: &str) -> Vec<&'a Exam> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return exams.iter().collect();
    }

    exams
        .iter()
        .filter(|exam| search_haystack(exam).contains(&term))
        .collect()
}

fn search_haystack(exam: &Exam) -> String {
    [
        exam.name.as_str(),
        exam.date.as_str(),
        exam.result.as_str(),
        exam.unit.as_str(),
        exam.reference.as_str(),
        exam.status.as_str(),
        exam.notes.as_str(),
    ]
    .iter()
    .filter(|field| !field.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Distinct exam names, alphabetically sorted.
pub fn exam_types(exams: &[Exam]) -> Vec<String> {
    exams
        .iter()
        .map(|e| e.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Exam type to chart: the current selection if any, otherwise the name of
/// the first (newest) record.
pub fn resolve_selected_type(exams: &[Exam], current: Option<&str>) -> Option<String> {
    match current {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => exams.first().map(|e| e.name.clone()),
    }
}
