//! ASCII bar charts for terminal output.
//!
//! Fixed-size grid, deterministic output. Each bar is drawn with its own
//! glyph, its value is printed above it and its label below.

use crate::domain::{CarPrediction, LoanPrediction};
use crate::report::{fmt_money, fmt_percent};

/// One vertical bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Text printed above the bar.
    pub caption: String,
    pub glyph: char,
}

/// Render bars scaled against `y_max` into a `height`-row grid.
pub fn render_bar_chart(title: &str, bars: &[Bar], y_max: f64, height: usize) -> String {
    let height = height.max(3);
    let col_width = bars
        .iter()
        .map(|b| b.label.chars().count().max(b.caption.chars().count()))
        .max()
        .unwrap_or(0)
        .max(6)
        + 2;
    let bar_width = (col_width - 2).min(8);
    let y_max = if y_max.is_finite() && y_max > 0.0 { y_max } else { 1.0 };

    // Row 0 is reserved for captions above the tallest bar.
    let rows = height + 1;
    let mut grid = vec![vec![' '; col_width * bars.len()]; rows];

    for (i, bar) in bars.iter().enumerate() {
        let filled = bar_height(bar.value, y_max, height);
        let left = i * col_width + (col_width - bar_width) / 2;
        for r in 0..filled {
            let y = rows - 1 - r;
            for x in left..left + bar_width {
                grid[y][x] = bar.glyph;
            }
        }

        let caption_row = rows - 1 - filled;
        let caption: Vec<char> = bar.caption.chars().collect();
        let start = i * col_width + (col_width.saturating_sub(caption.len())) / 2;
        for (k, ch) in caption.into_iter().enumerate() {
            if let Some(cell) = grid[caption_row].get_mut(start + k) {
                *cell = ch;
            }
        }
    }

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out.push_str(&"-".repeat(col_width * bars.len()));
    out.push('\n');
    let labels: String = bars
        .iter()
        .map(|b| format!("{:^width$}", b.label, width = col_width))
        .collect();
    out.push_str(labels.trim_end());
    out.push('\n');
    out
}

fn bar_height(value: f64, y_max: f64, height: usize) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let frac = (value / y_max).clamp(0.0, 1.0);
    (frac * height as f64).round() as usize
}

/// Approval vs default probability, on a 0-100% scale.
pub fn render_probability_chart(prediction: &LoanPrediction, height: usize) -> String {
    let bars = [
        Bar {
            label: "Approval".to_string(),
            value: prediction.probability_approved,
            caption: fmt_percent(prediction.probability_approved),
            glyph: '#',
        },
        Bar {
            label: "Default".to_string(),
            value: prediction.probability_default,
            caption: fmt_percent(prediction.probability_default),
            glyph: '=',
        },
    ];
    render_bar_chart("Risk Assessment Probability Distribution", &bars, 1.0, height)
}

/// Predicted price next to the lower and upper estimates.
pub fn render_price_chart(prediction: &CarPrediction, currency: &str, height: usize) -> String {
    let (lo, hi) = prediction.price_range();
    let bars = [
        Bar {
            label: "Predicted".to_string(),
            value: prediction.predicted_price,
            caption: fmt_money(currency, prediction.predicted_price),
            glyph: '#',
        },
        Bar {
            label: "Lower".to_string(),
            value: lo,
            caption: fmt_money(currency, lo),
            glyph: '=',
        },
        Bar {
            label: "Upper".to_string(),
            value: hi,
            caption: fmt_money(currency, hi),
            glyph: '+',
        },
    ];
    render_bar_chart("Price Prediction Analysis", &bars, hi, height)
}
