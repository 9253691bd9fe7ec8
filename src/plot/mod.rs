//! Chart rendering: a quick ASCII view for the terminal and an SVG file.

pub mod ascii;
pub mod chart;

pub use ascii::render_ascii_plot;
pub use chart::{DEFAULT_SIZE, write_svg};
