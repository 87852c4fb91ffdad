//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! One widget type covers the three chart shapes the dashboard needs: a
//! scatter (temperature), per-year lines (time series), and bars (working day
//! and season totals).
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// What to draw.
pub enum ChartKind<'a> {
    Scatter(&'a [(f64, f64)]),
    /// One `(year, points)` line per year.
    Lines(&'a [(i32, Vec<(f64, f64)>)]),
    /// `(value, highlighted)` per bar, drawn left to right at x = 0, 1, 2, ...
    Bars(&'a [(f64, bool)]),
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call so `render()`
/// stays focused on drawing.
pub struct DashboardChart<'a> {
    pub kind: ChartKind<'a>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

/// Line colors, cycled per year.
pub const YEAR_PALETTE: [RGBColor; 5] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 200, 0),
    RGBColor(255, 0, 255),
    RGBColor(0, 255, 0),
    RGBColor(255, 80, 80),
];

/// Ratatui color matching `YEAR_PALETTE[idx % len]`, for legends.
pub fn year_color(idx: usize) -> Color {
    let RGBColor(r, g, b) = YEAR_PALETTE[idx % YEAR_PALETTE.len()];
    Color::Rgb(r, g, b)
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let is_bars = matches!(self.kind, ChartKind::Bars(_));

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Bar categories are labelled by the legend line under the chart.
            let x_labels = if is_bars { 0 } else { 5 };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(x_labels)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            match &self.kind {
                ChartKind::Scatter(points) => {
                    // Pixels rather than circles: the backend maps circle radii
                    // into canvas units and produces oversized markers.
                    let color = RGBColor(255, 140, 0);
                    chart.draw_series(points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                }
                ChartKind::Lines(lines) => {
                    for (idx, (_, points)) in lines.iter().enumerate() {
                        let color = YEAR_PALETTE[idx % YEAR_PALETTE.len()];
                        chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                    }
                }
                ChartKind::Bars(bars) => {
                    let base = RGBColor(174, 214, 241);
                    let top = RGBColor(46, 134, 193);
                    chart.draw_series(bars.iter().enumerate().map(|(i, &(value, highlight))| {
                        let color = if highlight { top } else { base };
                        let x = i as f64;
                        Rectangle::new([(x + 0.15, 0.0), (x + 0.85, value)], color.filled())
                    }))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
