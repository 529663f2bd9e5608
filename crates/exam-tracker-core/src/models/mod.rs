//! Domain models for the exam tracker.

mod data_point;
mod exam;

pub use data_point::*;
pub use exam::*;
