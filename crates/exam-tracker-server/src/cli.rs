//! Command-line interface definitions for the exam tracker.
//!
//! Uses `clap` derive macros for declarative argument parsing.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use exam_tracker_core::{Exam, ExamForm, ExamId, ExamStatus, ExamStore};

use crate::config::{Settings, SlotBackend};

/// Track lab exam results locally and serve the data-point dashboard.
#[derive(Parser, Debug)]
#[command(name = "exam-tracker")]
#[command(version)]
#[command(about = "Local medical exam tracker and data-point dashboard", long_about = None)]
pub struct Args {
    /// Settings file (defaults to the XDG config directory)
    #[arg(long, env = "EXAM_TRACKER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, env = "EXAM_TRACKER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the persistence backend of the exam collection
    #[arg(long, value_enum, global = true)]
    pub backend: Option<SlotBackend>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List exams, newest first
    List {
        /// Only show exams whose fields contain this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Record a new exam result
    Add {
        /// Collection date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Exam name, e.g. "Glicose"
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        result: String,
        #[arg(long, default_value = "")]
        unit: String,
        /// Reference range, e.g. "70 - 99"
        #[arg(long, default_value = "")]
        reference: String,
        #[arg(long, default_value = "normal")]
        status: ExamStatus,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Delete an exam by id
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Import exams from pasted JSON (file or stdin)
    Import {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Export all exams
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Target directory (defaults to `export_dir` from settings)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List distinct exam names
    Types,

    /// Show the chart series of one exam type
    Chart {
        /// Exam name (defaults to the newest record's name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Run the data-point dashboard server
    Serve {
        /// Listen address (defaults to `listen_addr` from settings)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Args {
    /// Settings file contents with command-line overrides applied.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings =
            Settings::load(self.config.as_deref()).context("Failed to load settings")?;
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(backend) = self.backend {
            settings.slot_backend = backend;
        }
        Ok(settings)
    }
}

/// Run an exam command against `store`, writing user-facing output to `out`.
///
/// `Serve` is not an exam command and is rejected here.
pub fn run_exam_command<W: Write>(
    command: &Command,
    store: &mut ExamStore,
    settings: &Settings,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::List { search } => {
            let exams = store.search(search.as_deref().unwrap_or(""));
            if exams.is_empty() {
                writeln!(out, "No exams found.")?;
            }
            for exam in exams {
                writeln!(out, "{}", format_exam(exam))?;
            }
        }

        Command::Add {
            date,
            name,
            result,
            unit,
            reference,
            status,
            notes,
        } => {
            let mut form = ExamForm {
                date: date.clone(),
                name: name.clone(),
                result: result.clone(),
                unit: unit.clone(),
                reference: reference.clone(),
                status: *status,
                notes: notes.clone(),
            };
            // Incomplete forms are ignored without an error
            if let Some(id) = store.create(&mut form) {
                writeln!(out, "Added {}", id)?;
            }
        }

        Command::Delete { id } => {
            let id: ExamId = id.parse().unwrap_or_else(|e| match e {});
            let removed = store.delete(&id)
                || matches!(&id, ExamId::Number(n) if store.delete(&ExamId::Text(n.to_string())));
            if removed {
                writeln!(out, "Deleted {}", id)?;
            } else {
                writeln!(out, "No exam with id {}", id)?;
            }
        }

        Command::Import { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut raw = String::new();
                    std::io::stdin()
                        .read_to_string(&mut raw)
                        .context("Failed to read stdin")?;
                    raw
                }
            };
            let count = store.import(&raw)?;
            writeln!(out, "Imported {} exams.", count)?;
        }

        Command::Export { format, out: dir } => {
            let artifact = match format {
                ExportFormat::Json => store.export_json()?,
                ExportFormat::Csv => store.export_csv(),
            };
            let dir = dir.clone().unwrap_or_else(|| settings.export_dir.clone());
            let path = artifact
                .save_to(&dir)
                .with_context(|| format!("Failed to write export to {}", dir.display()))?;
            writeln!(out, "Wrote {}", path.display())?;
        }

        Command::Types => {
            for name in store.exam_types() {
                writeln!(out, "{}", name)?;
            }
        }

        Command::Chart { name } => {
            let Some(selected) = store.selected_type(name.as_deref()) else {
                writeln!(out, "No exams recorded.")?;
                return Ok(());
            };
            let series = store.time_series(&selected);
            writeln!(out, "{} ({} points)", selected, series.len())?;
            for point in series {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    point.label, point.value, point.exam.unit
                )?;
            }
        }

        Command::Serve { .. } => bail!("serve is not an exam command"),
    }

    if store.is_dirty() {
        store
            .flush()
            .context("Changes were applied but could not be saved")?;
    }
    Ok(())
}

/// One-line rendering of a record.
pub fn format_exam(exam: &Exam) -> String {
    let mut line = format!("{}  {}  {}  {}", exam.id, exam.date, exam.name, exam.result);
    if !exam.unit.is_empty() {
        line.push(' ');
        line.push_str(&exam.unit);
    }
    line.push_str(&format!("  [{}]", exam.status));
    if !exam.reference.is_empty() {
        line.push_str(&format!("  ref: {}", exam.reference));
    }
    if !exam.notes.is_empty() {
        line.push_str(&format!("  ({})", exam.notes));
    }
    line
}
