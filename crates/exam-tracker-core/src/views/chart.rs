//! Per-exam time series for charting.

use chrono::{DateTime, NaiveDate};

use crate::models::Exam;

/// One point of an exam's evolution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint<'a> {
    /// Axis label, `DD/MM/YYYY`
    pub label: String,
    pub value: f64,
    /// Source record, for tooltips
    pub exam: &'a Exam,
}

/// Chartable history of one exam type, oldest first.
///
/// Records without a date or result are skipped, as are results that do not
/// read as a finite number.
pub fn time_series<'a>(exams: &'a [Exam], exam_type: &str) -> Vec<TimeSeriesPoint<'a>> {
    let mut selected: Vec<(Option<NaiveDate>, &Exam)> = exams
        .iter()
        .filter(|e| e.name == exam_type)
        .filter(|e| !e.date.is_empty() && !e.result.is_empty())
        .map(|e| (parse_exam_date(&e.date), e))
        .collect();

    // Stable; unparseable dates sink to the end
    selected.sort_by_key(|(date, _)| (date.is_none(), *date));

    selected
        .into_iter()
        .filter_map(|(date, exam)| {
            let value = parse_result(&exam.result)?;
            Some(TimeSeriesPoint {
                label: date
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| exam.date.clone()),
                value,
                exam,
            })
        })
        .collect()
}

/// Read a free-text result as a number.
///
/// The first `,` is taken as the decimal separator and the longest numeric
/// prefix is parsed, so `"9,5"` reads as 9.5 and `"92 mg/dL"` as 92.
pub fn parse_result(result: &str) -> Option<f64> {
    let normalized = result.replacen(',', ".", 1);
    let prefix = numeric_prefix(normalized.trim_start());
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a record date: `YYYY-MM-DD`, or an RFC 3339 timestamp.
pub fn parse_exam_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.date_naive()))
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return "";
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    &s[..i]
}
