//! Persistence slots: durable single-key storage for the serialized collection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::db::{Database, DbError};

/// Slot errors.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Slot unavailable: {0}")]
    Unavailable(String),
}

pub type SlotResult<T> = Result<T, SlotError>;

/// A durable location holding one serialized payload.
///
/// Writes replace the whole payload; there is no incremental update.
pub trait PersistenceSlot: Send {
    /// Read the stored payload, `None` when nothing has been written yet.
    fn read(&self) -> SlotResult<Option<String>>;

    /// Replace the stored payload.
    fn write(&mut self, payload: &str) -> SlotResult<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// In-memory slot.
///
/// Clones share the same storage, so a caller can keep a handle to inspect
/// what a store has written.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    inner: Arc<Mutex<MemorySlotState>>,
}

#[derive(Debug, Default)]
struct MemorySlotState {
    payload: Option<String>,
    fail_writes: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with a payload.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        let slot = Self::new();
        if let Ok(mut state) = slot.inner.lock() {
            state.payload = Some(payload.into());
        }
        slot
    }

    /// Current payload.
    pub fn payload(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|s| s.payload.clone())
    }

    /// Make subsequent writes fail (simulates a full or read-only disk).
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = fail;
        }
    }
}

impl PersistenceSlot for MemorySlot {
    fn read(&self) -> SlotResult<Option<String>> {
        let state = self
            .inner
            .lock()
            .map_err(|e| SlotError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(state.payload.clone())
    }

    fn write(&mut self, payload: &str) -> SlotResult<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|e| SlotError::Unavailable(format!("Lock poisoned: {}", e)))?;
        if state.fail_writes {
            return Err(SlotError::Unavailable("writes disabled".into()));
        }
        state.payload = Some(payload.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Slot backed by a single JSON file, `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Slot for `key` inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P, key: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", key)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SlotError {
        SlotError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PersistenceSlot for FileSlot {
    fn read(&self) -> SlotResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Write to a sibling temp file, then rename over the slot, so a reader
    /// sees either the old or the new payload.
    fn write(&mut self, payload: &str) -> SlotResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Slot stored as a row of the `kv_slots` table.
pub struct SqliteSlot {
    db: Database,
    key: String,
}

impl SqliteSlot {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl PersistenceSlot for SqliteSlot {
    fn read(&self) -> SlotResult<Option<String>> {
        Ok(self.db.get_slot(&self.key)?)
    }

    fn write(&mut self, payload: &str) -> SlotResult<()> {
        Ok(self.db.put_slot(&self.key, payload)?)
    }

    fn location(&self) -> String {
        format!("sqlite:kv_slots/{}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_slot_shares_state() {
        let slot = MemorySlot::new();
        let mut writer = slot.clone();

        assert_eq!(slot.read().unwrap(), None);
        writer.write("[]").unwrap();
        assert_eq!(slot.payload(), Some("[]".to_string()));
    }

    #[test]
    fn test_memory_slot_failing_writes() {
        let mut slot = MemorySlot::with_payload("[1]");
        slot.set_fail_writes(true);
        assert!(slot.write("[2]").is_err());
        assert_eq!(slot.payload(), Some("[1]".to_string()));
    }

    #[test]
    fn test_file_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut slot = FileSlot::in_dir(dir.path().join("data"), "medical_exams_data");

        assert_eq!(slot.read().unwrap(), None);
        slot.write("[{\"id\":1}]").unwrap();
        assert_eq!(slot.read().unwrap(), Some("[{\"id\":1}]".to_string()));
        assert!(slot.path().ends_with("data/medical_exams_data.json"));
        assert!(!slot.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_sqlite_slot_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut slot = SqliteSlot::new(db, "medical_exams_data");

        assert_eq!(slot.read().unwrap(), None);
        slot.write("[]").unwrap();
        slot.write("[1]").unwrap();
        assert_eq!(slot.read().unwrap(), Some("[1]".to_string()));
    }
}
