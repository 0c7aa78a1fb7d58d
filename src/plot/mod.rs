//! Terminal charts for the text report.

pub mod ascii;

pub use ascii::{render_bar_chart, render_heatmap, render_histogram, render_line_chart};
