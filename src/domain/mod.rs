//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed sets (`Region`, `Indicator`, `Metric`, `Mode`, `YScale`, `GapPolicy`)
//! - the validated `Query`
//! - result points and per-record diagnostics

pub mod query;
pub mod types;

pub use query::*;
pub use types::*;
