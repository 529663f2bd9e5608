//! Export of the exam collection as downloadable files.

mod csv;
mod json;

pub use self::csv::*;
pub use self::json::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A transient file produced by an export.
///
/// Saving consumes the artifact, so its contents are released as soon as the
/// file has been written (or the write failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Fixed download name, e.g. `exames.csv`
    pub file_name: &'static str,
    /// MIME type
    pub content_type: &'static str,
    pub contents: String,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its fixed file name.
    pub fn save_to<P: AsRef<Path>>(self, dir: P) -> io::Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        fs::write(&path, self.contents.as_bytes())?;
        tracing::info!(path = %path.display(), "export saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_to_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let artifact = ExportArtifact {
            file_name: "exames.csv",
            content_type: CSV_CONTENT_TYPE,
            contents: "\"date\"".to_string(),
        };

        let path = artifact.save_to(&target).unwrap();
        assert_eq!(path, target.join("exames.csv"));
        assert_eq!(fs::read_to_string(path).unwrap(), "\"date\"");
    }
}
