//! Terminal plotting.

pub mod ascii;

pub use ascii::{Bar, render_bar_chart, render_price_chart, render_probability_chart};
