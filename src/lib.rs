//! `epi-series` library crate.
//!
//! Turns a tab-delimited Covid-19 log into dated, per-region series:
//! parse into a [`store::SeriesStore`], then run a [`domain::Query`] through the
//! temporal transforms and metric calculators.
//!
//! The binary (`epi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - parsing and transforms stay free of CLI, file and chart concerns

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod plot;
pub mod report;
pub mod store;
pub mod transform;
