//! Plotters-powered bar chart widget for Ratatui.
//!
//! Used for the approval/default probability split and the price band. The
//! Plotters output is drawn into the Ratatui buffer via `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One bar of the chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartBar {
    pub value: f64,
    pub color: RGBColor,
}

/// A render-only bar chart description. Bars are laid out left to right on
/// unit-width slots; labels are drawn by the caller underneath.
pub struct BarPlottersChart<'a> {
    pub bars: &'a [ChartBar],
    /// Upper Y bound; the lower bound is always zero.
    pub y_max: f64,
    /// Optional horizontal reference line (e.g. the decision threshold).
    pub reference: Option<f64>,
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for BarPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let n = self.bars.len();
        if n == 0 || !self.y_max.is_finite() || self.y_max <= 0.0 {
            return;
        }
        let x1 = n as f64;
        let y1 = self.y_max;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 1)
                .build_cartesian_2d(0.0..x1, 0.0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .disable_x_axis()
                .y_desc(self.y_label)
                .y_labels(5)
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Leave a gap on both sides of each slot.
            chart.draw_series(self.bars.iter().enumerate().map(|(i, bar)| {
                let left = i as f64 + 0.2;
                let right = i as f64 + 0.8;
                let top = bar.value.clamp(0.0, y1);
                let RGBColor(r, g, b) = bar.color;
                let style = ShapeStyle {
                    color: RGBAColor(r, g, b, 1.0),
                    filled: true,
                    stroke_width: 1,
                };
                Rectangle::new([(left, 0.0), (right, top)], style)
            }))?;

            if let Some(level) = self.reference.filter(|v| (0.0..=y1).contains(v)) {
                chart.draw_series(LineSeries::new([(0.0, level), (x1, level)], &YELLOW))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

pub const APPROVED_COLOR: RGBColor = RGBColor(0, 242, 254);
pub const DEFAULT_COLOR: RGBColor = RGBColor(245, 87, 108);
pub const PRICE_COLOR: RGBColor = RGBColor(255, 107, 107);
pub const LOWER_COLOR: RGBColor = RGBColor(78, 205, 196);
pub const UPPER_COLOR: RGBColor = RGBColor(69, 183, 209);
