//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory
//! (`~/.config/exam-tracker`); a missing file means defaults.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use directories::ProjectDirs;
use exam_tracker_core::store::{FileSlot, MemorySlot, PersistenceSlot, SqliteSlot, STORAGE_KEY};
use exam_tracker_core::Database;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine a home directory for config and data")]
    DirectoryNotFound,

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("Failed to open database: {0}")]
    Database(#[from] exam_tracker_core::db::DbError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "exam-tracker", "exam-tracker")
}

/// Default location of `settings.json`.
pub fn default_settings_file() -> ConfigResult<PathBuf> {
    let project = project_dirs().ok_or(ConfigError::DirectoryNotFound)?;
    Ok(project.config_dir().join("settings.json"))
}

/// Where the exam collection is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SlotBackend {
    /// One JSON file per slot in the data directory
    File,
    /// A row of the `kv_slots` table in the SQLite database
    Sqlite,
    /// Nothing survives the process (demo/testing)
    Memory,
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the slot file and the database.
    pub data_dir: PathBuf,
    /// Persistence backend of the exam collection.
    pub slot_backend: SlotBackend,
    /// SQLite file name, relative to `data_dir` unless absolute.
    pub database_file: PathBuf,
    /// Address the dashboard server binds to.
    pub listen_addr: SocketAddr,
    /// Default directory for exported files.
    pub export_dir: PathBuf,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("data"));

        Self {
            data_dir,
            slot_backend: SlotBackend::File,
            database_file: PathBuf::from("exam-tracker.db"),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            export_dir: PathBuf::from("."),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let file = match default_settings_file() {
                    Ok(file) => file,
                    Err(_) => return Ok(Self::default()),
                };
                if !file.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&file)
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Resolved path of the SQLite database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// Open the dashboard database, creating the data directory if needed.
    pub fn open_database(&self) -> ConfigResult<Database> {
        self.ensure_data_dir()?;
        Ok(Database::open(self.database_path())?)
    }

    /// Open the persistence slot of the exam collection.
    pub fn open_slot(&self) -> ConfigResult<Box<dyn PersistenceSlot>> {
        Ok(match self.slot_backend {
            SlotBackend::File => {
                self.ensure_data_dir()?;
                Box::new(FileSlot::in_dir(&self.data_dir, STORAGE_KEY))
            }
            SlotBackend::Sqlite => Box::new(SqliteSlot::new(self.open_database()?, STORAGE_KEY)),
            SlotBackend::Memory => Box::new(MemorySlot::new()),
        })
    }

    fn ensure_data_dir(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| ConfigError::WriteFailed {
            path: self.data_dir.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.slot_backend, SlotBackend::File);
        assert_eq!(settings.listen_addr.port(), 5000);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"slot_backend": "sqlite", "listen_addr": "0.0.0.0:8080"}"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.slot_backend, SlotBackend::Sqlite);
        assert_eq!(settings.listen_addr.port(), 8080);
        assert_eq!(settings.database_file, PathBuf::from("exam-tracker.db"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(Settings::load(Some(&path)), Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let settings = Settings {
            data_dir: dir.path().join("data"),
            slot_backend: SlotBackend::Memory,
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_open_slots() {
        let dir = tempfile::tempdir().unwrap();
        for backend in [SlotBackend::File, SlotBackend::Sqlite, SlotBackend::Memory] {
            let settings = Settings {
                data_dir: dir.path().join(format!("{:?}", backend)),
                slot_backend: backend,
                ..Default::default()
            };
            let mut slot = settings.open_slot().unwrap();
            slot.write("[]").unwrap();
            assert_eq!(slot.read().unwrap(), Some("[]".to_string()));
        }
    }
}
