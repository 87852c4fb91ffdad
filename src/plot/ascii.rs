//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - temperature scatter: `o`
//! - yearly lines: last digit of the year (`1`, `2`, ...)
//! - bars: `=`; the most popular season uses `#`

use chrono::{Datelike, NaiveDate};

use crate::app::pipeline::DashboardViews;
use crate::domain::{
    ChartSpec, SEASON_CHART, SeasonSummary, TEMPERATURE_CHART, TemperaturePoint, WORKING_DAY_CHART,
    WorkingDaySummary, YEARLY_CHART, YearlySeries,
};

/// Render all four views, one chart after another.
pub fn render_views(views: &DashboardViews, width: usize, height: usize) -> String {
    let mut out = String::new();

    out.push_str(&render_temperature_scatter(&views.temperature, width, height));
    out.push('\n');
    match &views.working_day {
        Ok(summary) => out.push_str(&render_working_day_bars(summary, width)),
        Err(e) => out.push_str(&unavailable(&WORKING_DAY_CHART, e)),
    }
    out.push('\n');
    out.push_str(&render_yearly_lines(&views.yearly, width, height));
    out.push('\n');
    match &views.season {
        Ok(summary) => out.push_str(&render_season_bars(summary, width)),
        Err(e) => out.push_str(&unavailable(&SEASON_CHART, e)),
    }

    out
}

/// Scatter of rentals against °C.
pub fn render_temperature_scatter(points: &[TemperaturePoint], width: usize, height: usize) -> String {
    let xy: Vec<(f64, f64)> = points.iter().map(|p| (p.temp_celsius, p.cnt as f64)).collect();

    let mut out = title(&TEMPERATURE_CHART);
    let Some(((x_min, x_max), (y_min, y_max))) = bounds(&xy) else {
        out.push_str("(no rows in range)\n");
        return out;
    };

    let width = width.max(10);
    let height = height.max(5);
    let mut grid = vec![vec![' '; width]; height];
    for &(x, y) in &xy {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    out.push_str(&format!(
        "Plot: x=[{x_min:.1}, {x_max:.1}] {} | y=[{y_min:.0}, {y_max:.0}] {}\n",
        TEMPERATURE_CHART.x_label, TEMPERATURE_CHART.y_label
    ));
    push_grid(&mut out, grid);
    out
}

/// One line per year of rentals over time.
pub fn render_yearly_lines(series: &YearlySeries, width: usize, height: usize) -> String {
    let lines: Vec<(i32, Vec<(f64, f64)>)> = series
        .by_year()
        .into_iter()
        .map(|(year, mut points)| {
            points.sort_by_key(|(d, _)| *d);
            let xy = points
                .into_iter()
                .map(|(d, c)| (d.num_days_from_ce() as f64, c as f64))
                .collect();
            (year, xy)
        })
        .collect();

    let mut out = title(&YEARLY_CHART);
    let all: Vec<(f64, f64)> = lines.iter().flat_map(|(_, xy)| xy.iter().copied()).collect();
    let Some(((x_min, x_max), (y_min, y_max))) = bounds(&all) else {
        out.push_str("(no rows in range)\n");
        return out;
    };

    let width = width.max(10);
    let height = height.max(5);
    let mut grid = vec![vec![' '; width]; height];
    for (year, xy) in &lines {
        let ch = year_marker(*year);
        let mut prev = None;
        for &(x, y) in xy {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            match prev {
                Some((c0, r0)) => draw_line(&mut grid, c0, r0, col, row, ch),
                None => grid[row][col] = ch,
            }
            prev = Some((col, row));
        }
    }

    out.push_str(&format!(
        "Plot: x=[{}, {}] {} | y=[{y_min:.0}, {y_max:.0}] {}\n",
        fmt_day(x_min),
        fmt_day(x_max),
        YEARLY_CHART.x_label,
        YEARLY_CHART.y_label
    ));
    push_grid(&mut out, grid);

    let legend: Vec<String> = lines
        .iter()
        .map(|(year, _)| format!("{}={year}", year_marker(*year)))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));
    out
}

pub fn render_working_day_bars(summary: &WorkingDaySummary, width: usize) -> String {
    let rows: Vec<(&str, u64, bool)> = summary
        .entries
        .iter()
        .map(|e| (e.day_type.label(), e.total, false))
        .collect();
    render_bars(&WORKING_DAY_CHART, &rows, width)
}

/// Season bars in summary order; the most popular season is drawn with `#`.
pub fn render_season_bars(summary: &SeasonSummary, width: usize) -> String {
    let top = summary.most_popular().ok().map(|e| e.season);
    let rows: Vec<(&str, u64, bool)> = summary
        .entries
        .iter()
        .map(|e| (e.season.label(), e.total, Some(e.season) == top))
        .collect();
    render_bars(&SEASON_CHART, &rows, width)
}

fn render_bars(spec: &ChartSpec, rows: &[(&str, u64, bool)], width: usize) -> String {
    let mut out = title(spec);
    if rows.is_empty() {
        out.push_str("(no rows in range)\n");
        return out;
    }

    out.push_str(&format!("Plot: {} by {}\n", spec.y_label, spec.x_label));

    let label_w = rows.iter().map(|(l, _, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, v, _)| *v).max().unwrap_or(0);
    let bar_w = width.max(label_w + 12).saturating_sub(label_w + 12).max(1);

    for &(label, value, highlight) in rows {
        let len = if max == 0 {
            0
        } else {
            ((value as f64 / max as f64) * bar_w as f64).round() as usize
        };
        let ch = if highlight { '#' } else { '=' };
        let bar: String = std::iter::repeat_n(ch, len).collect();
        out.push_str(&format!("{label:<label_w$} |{bar} {value}\n"));
    }
    out
}

fn unavailable(spec: &ChartSpec, err: &crate::error::TransformError) -> String {
    let mut out = title(spec);
    out.push_str(&format!("(view unavailable: {err})\n"));
    out
}

fn title(spec: &ChartSpec) -> String {
    format!("{}\n", spec.title)
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn year_marker(year: i32) -> char {
    char::from_digit(year.rem_euclid(10) as u32, 10).unwrap_or('*')
}

fn fmt_day(days_from_ce: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days_from_ce.round() as i32)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Padded x and y ranges, or `None` when there is nothing to plot.
///
/// A single distinct value on an axis is widened so the point lands mid-grid.
fn bounds(xy: &[(f64, f64)]) -> Option<((f64, f64), (f64, f64))> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(x, y) in xy {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    Some((widen(x_min, x_max), pad_range(y_min, y_max, 0.05)))
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    if span == 0.0 {
        return (min - 1.0, max + 1.0);
    }
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
