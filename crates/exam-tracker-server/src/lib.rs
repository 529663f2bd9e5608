//! REST dashboard and command-line front end for the exam tracker.
//!
//! - [`config`]: settings file, data paths, slot backend selection
//! - [`server`]: axum routes over the `data_points` table
//! - [`cli`]: `exam-tracker` subcommands driving the exam store
//! - [`telemetry`]: tracing subscriber setup

pub mod cli;
pub mod config;
pub mod server;
pub mod telemetry;

pub use config::{Settings, SlotBackend};
