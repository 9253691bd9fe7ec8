//! Input/output helpers.
//!
//! - tab-delimited log parsing into a `SeriesStore` (`parser`)
//! - series exports (CSV/JSON) and JSON read-back (`export`)

pub mod export;
pub mod parser;

pub use export::*;
pub use parser::*;
