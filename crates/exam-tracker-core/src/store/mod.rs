//! The exam store: owned collection mirrored to a persistence slot.
//!
//! The store exclusively owns the records in memory. The slot is a passive
//! mirror, rewritten in full after every mutation. Loading repairs missing or
//! duplicated identifiers so that ids are pairwise distinct at every
//! observation point.

mod sample;
mod slot;

pub use sample::*;
pub use slot::*;

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::export::{self, ExportArtifact};
use crate::import::{self, normalize_exam, ImportResult};
use crate::models::{Exam, ExamForm, ExamId};
use crate::views::{self, TimeSeriesPoint};

/// Slot key of the exam collection.
pub const STORAGE_KEY: &str = "medical_exams_data";

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Slot error: {0}")]
    Slot(#[from] SlotError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// In-memory exam collection, newest first.
pub struct ExamStore {
    exams: Vec<Exam>,
    slot: Box<dyn PersistenceSlot>,
    dirty: bool,
}

impl ExamStore {
    /// Load the collection from `slot`, repairing identifiers.
    ///
    /// An empty slot or an unreadable/unparseable payload yields the built-in
    /// sample set; a payload that parses but is not an array yields an empty
    /// collection. Never fails.
    pub fn load(slot: Box<dyn PersistenceSlot>) -> Self {
        let exams = match slot.read() {
            Ok(Some(raw)) => parse_stored(&raw).unwrap_or_else(|e| {
                tracing::warn!(location = %slot.location(), error = %e, "corrupt exam data, using sample set");
                sample_exams()
            }),
            Ok(None) => {
                tracing::debug!(location = %slot.location(), "empty slot, using sample set");
                sample_exams()
            }
            Err(e) => {
                tracing::warn!(location = %slot.location(), error = %e, "slot unreadable, using sample set");
                sample_exams()
            }
        };

        let mut store = Self {
            exams,
            slot,
            dirty: false,
        };
        // Mirror the repaired collection right away
        store.persist();
        store
    }

    /// All records, newest first.
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn len(&self) -> usize {
        self.exams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exams.is_empty()
    }

    pub fn get(&self, id: &ExamId) -> Option<&Exam> {
        self.exams.iter().find(|e| &e.id == id)
    }

    /// Whether the last slot write failed and memory is ahead of the slot.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a record from the form and clear the form.
    ///
    /// Returns `None` without touching anything when `name` or `date` is empty.
    pub fn create(&mut self, form: &mut ExamForm) -> Option<ExamId> {
        if !form.is_complete() {
            return None;
        }

        let id = ExamId::generate();
        self.exams.insert(0, form.to_exam(id.clone()));
        form.clear();
        tracing::debug!(%id, "exam created");
        self.persist();
        Some(id)
    }

    /// Remove the record with `id`. Returns whether one was removed.
    pub fn delete(&mut self, id: &ExamId) -> bool {
        let before = self.exams.len();
        self.exams.retain(|e| &e.id != id);
        let removed = self.exams.len() != before;

        if removed {
            tracing::debug!(%id, "exam deleted");
            self.persist();
        }
        removed
    }

    /// Import pasted JSON, prepending the batch. Returns the imported count.
    ///
    /// On error the collection is left unchanged.
    pub fn import(&mut self, raw: &str) -> ImportResult<usize> {
        let batch = import::parse_exams(raw)?;
        let count = batch.len();

        self.exams.splice(0..0, batch);
        tracing::info!(count, "exams imported");
        self.persist();
        Ok(count)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the full collection to the slot, reporting failure.
    pub fn flush(&mut self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.exams)?;
        self.slot.write(&payload)?;
        self.dirty = false;
        Ok(())
    }

    /// Flush after a mutation. A failed write keeps the change in memory for
    /// this session and marks the store dirty.
    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(location = %self.slot.location(), error = %e, "failed to persist exams");
            self.dirty = true;
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    pub fn export_json(&self) -> Result<ExportArtifact, serde_json::Error> {
        export::export_json(&self.exams)
    }

    pub fn export_csv(&self) -> ExportArtifact {
        export::export_csv(&self.exams)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn search(&self, query: &str) -> Vec<&Exam> {
        views::filter_exams(&self.exams, query)
    }

    pub fn time_series(&self, exam_type: &str) -> Vec<TimeSeriesPoint<'_>> {
        views::time_series(&self.exams, exam_type)
    }

    pub fn exam_types(&self) -> Vec<String> {
        views::exam_types(&self.exams)
    }

    pub fn selected_type(&self, current: Option<&str>) -> Option<String> {
        views::resolve_selected_type(&self.exams, current)
    }
}

/// Parse a stored payload and repair its identifiers.
fn parse_stored(raw: &str) -> Result<Vec<Exam>, serde_json::Error> {
    let parsed: Value = serde_json::from_str(raw)?;
    Ok(match parsed {
        Value::Array(items) => repair_ids(&items),
        _ => Vec::new(),
    })
}

/// Keep each record's id unless it is missing, invalid, or already seen, in
/// which case a fresh one is assigned.
pub fn repair_ids(items: &[Value]) -> Vec<Exam> {
    let mut seen = HashSet::with_capacity(items.len());

    items
        .iter()
        .map(|item| {
            let id = match ExamId::from_json(item.get("id")) {
                Some(id) if !seen.contains(&id) => id,
                _ => ExamId::generate(),
            };
            seen.insert(id.clone());
            normalize_exam(item, id)
        })
        .collect()
}
