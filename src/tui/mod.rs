//! Ratatui-based terminal UI.
//!
//! The TUI is the interactive date-range selector: a settings panel for the
//! window start/end and the data source, and one chart pane showing one of the
//! four views at a time. Every change recomputes all four views from the
//! loaded dataset.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::DashboardViews;
use crate::domain::{
    ChartSpec, DashboardConfig, DataSource, DateRange, SEASON_CHART, TEMPERATURE_CHART, WORKING_DAY_CHART,
    YEARLY_CHART,
};
use crate::error::AppError;
use crate::io::ingest::LoadedData;

mod plotters_chart;

use plotters_chart::{ChartKind, DashboardChart, year_color};

/// Directory the `e` key exports into.
const EXPORT_DIR: &str = "views";

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    // Load before touching the terminal so load errors print normally.
    let mut app = App::new(config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Which view the chart pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewTab {
    Temperature,
    WorkingDay,
    Yearly,
    Season,
}

impl ViewTab {
    const ALL: [ViewTab; 4] = [ViewTab::Temperature, ViewTab::WorkingDay, ViewTab::Yearly, ViewTab::Season];

    fn chart(self) -> &'static ChartSpec {
        match self {
            ViewTab::Temperature => &TEMPERATURE_CHART,
            ViewTab::WorkingDay => &WORKING_DAY_CHART,
            ViewTab::Yearly => &YEARLY_CHART,
            ViewTab::Season => &SEASON_CHART,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ViewTab::Temperature => "Temperature",
            ViewTab::WorkingDay => "Working Day",
            ViewTab::Yearly => "Yearly",
            ViewTab::Season => "Season",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn step(self, delta: isize) -> Self {
        let n = Self::ALL.len() as isize;
        let idx = (self.index() as isize + delta).rem_euclid(n) as usize;
        Self::ALL[idx]
    }
}

/// Settings rows, in display order.
const FIELD_START: usize = 0;
const FIELD_END: usize = 1;
const FIELD_SOURCE: usize = 2;
const FIELD_COUNT: usize = 3;

struct App {
    config: DashboardConfig,
    loaded: LoadedData,
    span: DateRange,
    range: DateRange,
    selected_field: usize,
    editing_date: bool,
    date_input: String,
    tab: ViewTab,
    status: String,
    views: DashboardViews,
}

impl App {
    fn new(config: DashboardConfig) -> Result<Self, AppError> {
        let loaded = crate::io::ingest::load_datasets(&config)?;
        let dataset = crate::app::select_dataset(&loaded, &config)?;
        let span = dataset
            .date_span()
            .ok_or_else(|| AppError::new(2, "Dataset is empty; no date range to select."))?;
        let range = crate::app::pipeline::resolve_range(dataset, config.start, config.end)?;
        let views = crate::app::compute(dataset, range, config.parallel);

        Ok(Self {
            config,
            loaded,
            span,
            range,
            selected_field: FIELD_START,
            editing_date: false,
            date_input: String::new(),
            tab: ViewTab::Temperature,
            status: format!("Loaded {} rows.", views.filtered_rows),
            views,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.editing_date {
            self.handle_date_edit(code);
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::PageUp => self.adjust_field(-30),
            KeyCode::PageDown => self.adjust_field(30),
            KeyCode::Tab => self.tab = self.tab.step(1),
            KeyCode::BackTab => self.tab = self.tab.step(-1),
            KeyCode::Enter => {
                if matches!(self.selected_field, FIELD_START | FIELD_END) {
                    self.editing_date = true;
                    self.date_input.clear();
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('a') => {
                self.range = self.span;
                self.recompute();
                self.status = "Range reset to full span.".to_string();
            }
            KeyCode::Char('p') => {
                self.config.parallel = !self.config.parallel;
                self.recompute();
                self.status = format!("parallel: {}", self.config.parallel);
            }
            KeyCode::Char('e') => {
                self.status = match crate::io::export::write_views(Path::new(EXPORT_DIR), &self.views) {
                    Ok(paths) => format!("Exported {} files to {EXPORT_DIR}/", paths.len()),
                    Err(err) => format!("Export failed: {err}"),
                };
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing_date = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing_date = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.date_input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' || c == '/' {
                    self.date_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i64) {
        match self.selected_field {
            FIELD_START => {
                self.range = self.range.shift_start(delta, self.span);
                self.recompute();
                self.status = format!("start: {}", self.range.start());
            }
            FIELD_END => {
                self.range = self.range.shift_end(delta, self.span);
                self.recompute();
                self.status = format!("end: {}", self.range.end());
            }
            FIELD_SOURCE => self.switch_source(self.config.source.toggle()),
            _ => {}
        }
    }

    fn switch_source(&mut self, source: DataSource) {
        let Some(dataset) = self.loaded.dataset(source) else {
            self.status = format!("No {} dataset loaded (pass --hourly).", source.label());
            return;
        };
        let Some(span) = dataset.date_span() else {
            self.status = format!("The {} dataset is empty.", source.label());
            return;
        };

        self.config.source = source;
        self.span = span;
        // Keep the current window where it still fits, otherwise fall back to the new span.
        self.range = DateRange::from_selection(Some(self.range.start()), Some(self.range.end()), span)
            .unwrap_or(span);
        self.recompute();
        self.status = format!("source: {}", source.label());
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.date_input.trim().to_string();
        let date = match crate::io::ingest::parse_date(&trimmed) {
            Ok(date) => date,
            Err(e) => {
                self.status = e;
                return;
            }
        };

        match self.with_endpoint(date) {
            Ok(range) => {
                self.range = range;
                self.recompute();
                self.status = format!("range: {}", self.range);
            }
            Err(e) => {
                warn!(error = %e, "Rejected date input");
                self.status = e.to_string();
            }
        }
    }

    fn with_endpoint(&self, date: NaiveDate) -> Result<DateRange, crate::error::TransformError> {
        let (start, end) = if self.selected_field == FIELD_START {
            (date, self.range.end())
        } else {
            (self.range.start(), date)
        };
        DateRange::from_selection(Some(start), Some(end), self.span)
    }

    /// Full recomputation of all four views; nothing is cached between calls.
    fn recompute(&mut self) {
        let Some(dataset) = self.loaded.dataset(self.config.source) else {
            return;
        };
        self.views = crate::app::compute(dataset, self.range, self.config.parallel);
        info!(range = %self.range, rows = self.views.filtered_rows, "Recomputed views");
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("rentals", Style::default().fg(Color::Cyan)),
            Span::raw(" - Bike Rental Dashboard"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | range: {} ({} days) | rows={} | rentals={}",
                self.config.source.label(),
                self.range,
                self.range.days(),
                self.views.filtered_rows,
                self.views.filtered_total,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_settings(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let tabs: Vec<Span> = ViewTab::ALL
            .iter()
            .map(|t| {
                let style = if *t == self.tab {
                    Style::default().fg(Color::Black).bg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Span::styled(format!(" {} ", t.name()), style)
            })
            .collect();

        let block = Block::default()
            .title(Line::from(tabs))
            .title_bottom(self.tab.chart().title)
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let data = match chart_data(&self.views, self.tab) {
            Ok(data) => data,
            Err(msg) => {
                let p = Paragraph::new(msg).style(Style::default().fg(Color::Yellow));
                frame.render_widget(p, inner);
                return;
            }
        };

        let chart = self.tab.chart();
        let kind = match &data.series {
            Series::Scatter(points) => ChartKind::Scatter(points),
            Series::Lines(lines) => ChartKind::Lines(lines),
            Series::Bars(bars) => ChartKind::Bars(bars),
        };
        let widget = DashboardChart {
            kind,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: chart.x_label,
            y_label: chart.y_label,
            fmt_x: data.fmt_x,
            fmt_y: fmt_count,
        };
        frame.render_widget(widget, chunks[0]);
        frame.render_widget(Paragraph::new(data.legend), chunks[1]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let field = |idx: usize, value: String| {
            if self.editing_date && self.selected_field == idx {
                format!("{value} [{}_]", self.date_input)
            } else {
                value
            }
        };

        let items = vec![
            ListItem::new(field(FIELD_START, format!("Start: {}", self.range.start()))),
            ListItem::new(field(FIELD_END, format!("End:   {}", self.range.end()))),
            ListItem::new(format!("Source: {}", self.config.source.label())),
            ListItem::new(format!("Span: {}", self.span.start())),
            ListItem::new(format!("   -> {}", self.span.end())),
        ];

        let list = List::new(items)
            .block(Block::default().title("Date Range").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);

        if self.editing_date {
            let hint = Paragraph::new("Editing date…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + 2,
                y: area.y + area.height.saturating_sub(2),
                width: area.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ field  ←/→ ±1d  PgUp/PgDn ±30d  Enter type date  Tab view  a all  e export  p parallel  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

enum Series {
    Scatter(Vec<(f64, f64)>),
    Lines(Vec<(i32, Vec<(f64, f64)>)>),
    Bars(Vec<(f64, bool)>),
}

struct ChartData {
    series: Series,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    fmt_x: fn(f64) -> String,
    legend: Line<'static>,
}

/// Build chart series for the selected view, or a message when it cannot be drawn.
fn chart_data(views: &DashboardViews, tab: ViewTab) -> Result<ChartData, String> {
    match tab {
        ViewTab::Temperature => {
            let points: Vec<(f64, f64)> = views
                .temperature
                .iter()
                .map(|p| (p.temp_celsius, p.cnt as f64))
                .collect();
            let (x_bounds, y_bounds) = xy_bounds(points.iter()).ok_or("No rows in range.")?;
            let legend = Line::from(Span::styled(
                format!("{} points", points.len()),
                Style::default().fg(Color::Gray),
            ));
            Ok(ChartData {
                series: Series::Scatter(points),
                x_bounds,
                y_bounds,
                fmt_x: fmt_celsius,
                legend,
            })
        }
        ViewTab::Yearly => {
            let lines: Vec<(i32, Vec<(f64, f64)>)> = views
                .yearly
                .by_year()
                .into_iter()
                .map(|(year, mut points)| {
                    points.sort_by_key(|(d, _)| *d);
                    let xy = points
                        .into_iter()
                        .map(|(d, c)| (day_number(d), c as f64))
                        .collect();
                    (year, xy)
                })
                .collect();
            let (x_bounds, y_bounds) =
                xy_bounds(lines.iter().flat_map(|(_, xy)| xy.iter())).ok_or("No rows in range.")?;
            let legend = Line::from(
                lines
                    .iter()
                    .enumerate()
                    .map(|(idx, (year, _))| Span::styled(format!("■ {year}  "), Style::default().fg(year_color(idx))))
                    .collect::<Vec<_>>(),
            );
            Ok(ChartData {
                series: Series::Lines(lines),
                x_bounds,
                y_bounds,
                fmt_x: fmt_day_number,
                legend,
            })
        }
        ViewTab::WorkingDay => {
            let summary = views.working_day.as_ref().map_err(|e| e.to_string())?;
            let bars: Vec<(&str, u64, bool)> = summary
                .entries
                .iter()
                .map(|e| (e.day_type.label(), e.total, false))
                .collect();
            bar_data(&bars)
        }
        ViewTab::Season => {
            let summary = views.season.as_ref().map_err(|e| e.to_string())?;
            let top = summary.most_popular().ok().map(|e| e.season);
            let bars: Vec<(&str, u64, bool)> = summary
                .entries
                .iter()
                .map(|e| (e.season.label(), e.total, Some(e.season) == top))
                .collect();
            bar_data(&bars)
        }
    }
}

fn bar_data(bars: &[(&str, u64, bool)]) -> Result<ChartData, String> {
    if bars.is_empty() {
        return Err("No rows in range.".to_string());
    }
    let max = bars.iter().map(|(_, v, _)| *v).max().unwrap_or(0) as f64;
    let y_max = if max > 0.0 { max * 1.05 } else { 1.0 };

    let legend = Line::from(
        bars.iter()
            .map(|(label, total, highlight)| {
                let style = if *highlight {
                    Style::default().fg(Color::Rgb(46, 134, 193)).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Rgb(174, 214, 241))
                };
                Span::styled(format!("{label}: {total}  "), style)
            })
            .collect::<Vec<_>>(),
    );

    Ok(ChartData {
        series: Series::Bars(bars.iter().map(|(_, v, h)| (*v as f64, *h)).collect()),
        x_bounds: [0.0, bars.len() as f64],
        y_bounds: [0.0, y_max],
        fmt_x: fmt_count,
        legend,
    })
}

fn xy_bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<([f64; 2], [f64; 2])> {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1.0);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn day_number(d: NaiveDate) -> f64 {
    use chrono::Datelike;
    d.num_days_from_ce() as f64
}

fn fmt_day_number(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_celsius(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_count(v: f64) -> String {
    format!("{v:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RentalDataset, RentalRecord};

    fn views() -> DashboardViews {
        let d = |m| NaiveDate::from_ymd_opt(2011, m, 1).unwrap();
        let ds = RentalDataset::new(vec![
            RentalRecord::new(d(1), 0.1, 1, 0, 10),
            RentalRecord::new(d(7), 0.9, 3, 1, 50),
            RentalRecord::new(d(8), 0.8, 3, 1, 40),
        ]);
        crate::app::pipeline::compute_views(&ds, ds.date_span().unwrap())
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(ViewTab::Temperature.step(1), ViewTab::WorkingDay);
        assert_eq!(ViewTab::Temperature.step(-1), ViewTab::Season);
        assert_eq!(ViewTab::Season.step(1), ViewTab::Temperature);
    }

    #[test]
    fn season_bars_highlight_most_popular() {
        let data = chart_data(&views(), ViewTab::Season).unwrap();
        let Series::Bars(bars) = data.series else {
            panic!("expected bars");
        };
        assert_eq!(bars, vec![(90.0, true), (10.0, false)]);
        assert_eq!(data.x_bounds, [0.0, 2.0]);
    }

    #[test]
    fn yearly_bounds_cover_all_dates() {
        let data = chart_data(&views(), ViewTab::Yearly).unwrap();
        assert_eq!(fmt_day_number(data.x_bounds[0]), "2011-01");
        assert_eq!(fmt_day_number(data.x_bounds[1]), "2011-08");
    }

    #[test]
    fn empty_window_reports_message() {
        let ds = RentalDataset::new(vec![RentalRecord::new(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(), 0.1, 1, 0, 10)]);
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2011, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2011, 2, 2).unwrap(),
        )
        .unwrap();
        let views = crate::app::pipeline::compute_views(&ds, range);
        for tab in ViewTab::ALL {
            assert!(chart_data(&views, tab).is_err());
        }
    }
}
