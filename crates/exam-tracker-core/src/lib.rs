//! Exam Tracker Core Library
//!
//! Local-first tracker for medical lab exam results, plus the relational store
//! behind the companion data-point dashboard.
//!
//! # Architecture
//!
//! ```text
//!   Form submit ──┐        Pasted JSON ──► lenient parse ──► normalize
//!                 │                                              │
//!                 ▼                                              ▼
//!          ┌──────────────────────────────────────────────────────────┐
//!          │                       ExamStore                          │
//!          │   Vec<Exam> (newest first, ids pairwise distinct)        │
//!          └──────┬──────────────────────┬──────────────────┬─────────┘
//!                 │ full rewrite         │ pure views       │ artifacts
//!                 ▼ on every mutation    ▼                  ▼
//!        PersistenceSlot        search / time series   exames.json
//!     (memory | file | sqlite)    / exam types          exames.csv
//! ```
//!
//! On start the store loads the slot and repairs missing or duplicated ids;
//! an empty or corrupt slot falls back to a built-in sample set.
//!
//! # Modules
//!
//! - [`db`]: SQLite layer (key-value slots, dashboard data points)
//! - [`models`]: Domain types (Exam, ExamForm, DataPoint, etc.)
//! - [`store`]: The exam store and its persistence slots
//! - [`import`]: Lenient JSON import and record normalization
//! - [`export`]: JSON and CSV export artifacts
//! - [`views`]: Derived views (search filter, time series, exam types)

pub mod db;
pub mod export;
pub mod import;
pub mod models;
pub mod store;
pub mod views;

// Re-export commonly used types
pub use db::Database;
pub use export::ExportArtifact;
pub use import::ImportError;
pub use models::{
    DataPoint, DataPointSummary, Exam, ExamForm, ExamId, ExamStatus, InsertDataPoint,
    ValidationIssue,
};
pub use store::{ExamStore, FileSlot, MemorySlot, PersistenceSlot, SqliteSlot, STORAGE_KEY};
pub use views::TimeSeriesPoint;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ExamTrackerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<db::DbError> for ExamTrackerError {
    fn from(e: db::DbError) -> Self {
        ExamTrackerError::DatabaseError(e.to_string())
    }
}

impl From<ImportError> for ExamTrackerError {
    fn from(e: ImportError) -> Self {
        ExamTrackerError::ImportError(e.to_string())
    }
}

impl From<serde_json::Error> for ExamTrackerError {
    fn from(e: serde_json::Error) -> Self {
        ExamTrackerError::SerializationError(e.to_string())
    }
}

impl From<store::StoreError> for ExamTrackerError {
    fn from(e: store::StoreError) -> Self {
        ExamTrackerError::StorageError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ExamTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ExamTrackerError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open the tracker with its collection stored in the SQLite file at `path`.
#[uniffi::export]
pub fn open_exam_tracker(path: String) -> Result<Arc<ExamTrackerCore>, ExamTrackerError> {
    let db = Database::open(&path)?;
    Ok(ExamTrackerCore::with_slot(Box::new(SqliteSlot::new(db, STORAGE_KEY))))
}

/// Open the tracker on an in-memory slot (for testing).
#[uniffi::export]
pub fn open_exam_tracker_in_memory() -> Arc<ExamTrackerCore> {
    ExamTrackerCore::with_slot(Box::new(MemorySlot::new()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe exam store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ExamTrackerCore {
    store: Arc<Mutex<ExamStore>>,
}

impl ExamTrackerCore {
    fn with_slot(slot: Box<dyn PersistenceSlot>) -> Arc<Self> {
        Arc::new(Self {
            store: Arc::new(Mutex::new(ExamStore::load(slot))),
        })
    }
}

#[uniffi::export]
impl ExamTrackerCore {
    // =========================================================================
    // Records
    // =========================================================================

    /// List records, newest first, optionally filtered by a search query.
    pub fn list_exams(&self, query: Option<String>) -> Result<Vec<FfiExam>, ExamTrackerError> {
        let store = self.store.lock()?;
        let exams = store.search(query.as_deref().unwrap_or(""));
        Ok(exams.into_iter().map(FfiExam::from).collect())
    }

    /// Create a record. Returns the new id, or `None` when name or date is
    /// missing.
    pub fn create_exam(&self, form: FfiExamForm) -> Result<Option<String>, ExamTrackerError> {
        let mut store = self.store.lock()?;
        let mut form: ExamForm = form.into();
        Ok(store.create(&mut form).map(|id| id.to_string()))
    }

    /// Delete a record by id. Returns whether a record was removed.
    pub fn delete_exam(&self, id: String) -> Result<bool, ExamTrackerError> {
        let mut store = self.store.lock()?;
        if store.delete(&ExamId::Text(id.clone())) {
            return Ok(true);
        }
        // Integer ids from older payloads travel as their decimal text
        Ok(match id.parse::<i64>() {
            Ok(n) => store.delete(&ExamId::Number(n)),
            Err(_) => false,
        })
    }

    /// Import pasted JSON. Returns the number of records added.
    pub fn import_exams(&self, raw: String) -> Result<u32, ExamTrackerError> {
        let mut store = self.store.lock()?;
        Ok(store.import(&raw)? as u32)
    }

    /// Retry persisting the collection after a failed write.
    pub fn flush(&self) -> Result<(), ExamTrackerError> {
        let mut store = self.store.lock()?;
        store.flush()?;
        Ok(())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Contents of `exames.json`.
    pub fn export_json(&self) -> Result<String, ExamTrackerError> {
        let store = self.store.lock()?;
        Ok(store.export_json()?.contents)
    }

    /// Contents of `exames.csv`.
    pub fn export_csv(&self) -> Result<String, ExamTrackerError> {
        let store = self.store.lock()?;
        Ok(store.export_csv().contents)
    }

    // =========================================================================
    // Charts
    // =========================================================================

    /// Distinct exam names, sorted.
    pub fn exam_types(&self) -> Result<Vec<String>, ExamTrackerError> {
        let store = self.store.lock()?;
        Ok(store.exam_types())
    }

    /// Chart series for one exam type, oldest first.
    pub fn time_series(&self, exam_type: String) -> Result<Vec<FfiChartPoint>, ExamTrackerError> {
        let store = self.store.lock()?;
        Ok(store
            .time_series(&exam_type)
            .into_iter()
            .map(FfiChartPoint::from)
            .collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe exam record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExam {
    pub id: String,
    pub date: String,
    pub name: String,
    pub result: String,
    pub unit: String,
    pub reference: String,
    pub altered: bool,
    pub notes: String,
}

impl From<&Exam> for FfiExam {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.to_string(),
            date: exam.date.clone(),
            name: exam.name.clone(),
            result: exam.result.clone(),
            unit: exam.unit.clone(),
            reference: exam.reference.clone(),
            altered: exam.is_altered(),
            notes: exam.notes.clone(),
        }
    }
}

/// FFI-safe input form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExamForm {
    pub date: String,
    pub name: String,
    pub result: String,
    pub unit: String,
    pub reference: String,
    pub altered: bool,
    pub notes: String,
}

impl From<FfiExamForm> for ExamForm {
    fn from(form: FfiExamForm) -> Self {
        ExamForm {
            date: form.date,
            name: form.name,
            result: form.result,
            unit: form.unit,
            reference: form.reference,
            status: if form.altered {
                ExamStatus::Altered
            } else {
                ExamStatus::Normal
            },
            notes: form.notes,
        }
    }
}

/// FFI-safe chart point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChartPoint {
    pub label: String,
    pub value: f64,
    pub exam: FfiExam,
}

impl From<TimeSeriesPoint<'_>> for FfiChartPoint {
    fn from(point: TimeSeriesPoint<'_>) -> Self {
        Self {
            label: point.label,
            value: point.value,
            exam: point.exam.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, date: &str, result: &str) -> FfiExamForm {
        FfiExamForm {
            date: date.into(),
            name: name.into(),
            result: result.into(),
            unit: String::new(),
            reference: String::new(),
            altered: false,
            notes: String::new(),
        }
    }

    #[test]
    fn test_ffi_create_and_list() {
        let core = open_exam_tracker_in_memory();

        let id = core.create_exam(form("TSH", "2024-02-02", "2,1")).unwrap();
        assert!(id.is_some());
        assert!(core.create_exam(form("", "2024-02-02", "1")).unwrap().is_none());

        let found = core.list_exams(Some("tsh".into())).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id.unwrap());
    }

    #[test]
    fn test_ffi_delete_numeric_id() {
        let core = open_exam_tracker_in_memory();
        assert!(core.delete_exam("1".into()).unwrap());
        assert!(!core.delete_exam("1".into()).unwrap());
        assert_eq!(core.list_exams(None).unwrap().len(), 4);
    }

    #[test]
    fn test_ffi_import_error() {
        let core = open_exam_tracker_in_memory();
        let err = core.import_exams("garbage".into()).unwrap_err();
        assert!(matches!(err, ExamTrackerError::ImportError(_)));
    }

    #[test]
    fn test_ffi_time_series() {
        let core = open_exam_tracker_in_memory();
        let series = core.time_series("Glicose".into()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 92.0);
        assert_eq!(series[0].exam.id, "4");
    }

    #[test]
    fn test_open_sqlite_tracker_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.db").to_string_lossy().to_string();

        {
            let core = open_exam_tracker(path.clone()).unwrap();
            core.import_exams(r#"[{"name":"Ferritina","date":"2024-05-05","result":"80"}]"#.into())
                .unwrap();
        }

        let core = open_exam_tracker(path).unwrap();
        assert_eq!(core.list_exams(None).unwrap().len(), 6);
        assert!(core.export_csv().unwrap().contains("\"Ferritina\""));
    }
}
