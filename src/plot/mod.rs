//! Charts: ASCII for the terminal, SVG for the written report.

pub mod ascii;
pub mod svg;

pub use ascii::{render_faceted_profile, render_histogram, render_profile};
