use std::path::PathBuf;

use bike_rentals::app::{load_and_compute, pipeline};
use bike_rentals::domain::{DashboardConfig, DataSource, DayType, Season};
use bike_rentals::io::ingest::load_datasets;
use chrono::NaiveDate;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config(source: DataSource, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DashboardConfig {
    DashboardConfig {
        daily_path: fixture("day.csv"),
        hourly_path: Some(fixture("hour.csv")),
        source,
        start,
        end,
        parallel: false,
        plot_width: 60,
        plot_height: 12,
    }
}

#[test]
fn full_span_views_over_daily_fixture() {
    let (loaded, views) = load_and_compute(&config(DataSource::Daily, None, None)).unwrap();

    assert_eq!(loaded.daily.len(), 8);
    assert_eq!(views.range.start(), d(2011, 1, 1));
    assert_eq!(views.range.end(), d(2012, 12, 31));
    assert_eq!(views.filtered_rows, 8);
    assert_eq!(views.filtered_total, 30603);

    let wd = views.working_day.as_ref().unwrap();
    assert_eq!(wd.total_for(DayType::NonWorkingDay), Some(7829));
    assert_eq!(wd.total_for(DayType::WorkingDay), Some(22774));

    let season = views.season.as_ref().unwrap();
    let order: Vec<Season> = season.entries().iter().map(|e| e.season).collect();
    assert_eq!(order, vec![Season::Fall, Season::Winter, Season::Summer, Season::Spring]);
    assert_eq!(season.most_popular().unwrap().total, 11708);

    assert_eq!(views.yearly.years(), vec![2011, 2012]);
    let first = &views.temperature[0];
    assert!((first.temp_celsius - (0.344167 * 47.0 - 8.0)).abs() < 1e-9);
}

#[test]
fn selected_window_narrows_every_view() {
    let cfg = config(DataSource::Daily, Some(d(2011, 1, 1)), Some(d(2011, 1, 3)));
    let (_, views) = load_and_compute(&cfg).unwrap();

    assert_eq!(views.filtered_rows, 3);
    assert_eq!(views.filtered_total, 3135);
    let season = views.season.as_ref().unwrap();
    assert_eq!(season.len(), 1);
    assert_eq!(season.most_popular().unwrap().season, Season::Spring);
    assert_eq!(views.yearly.years(), vec![2011]);
}

#[test]
fn parallel_and_sequential_pipelines_agree() {
    let loaded = load_datasets(&config(DataSource::Daily, None, None)).unwrap();
    let span = loaded.daily.date_span().unwrap();

    let seq = pipeline::compute_views(&loaded.daily, span);
    let par = pipeline::compute_views_parallel(&loaded.daily, span);

    assert_eq!(seq.filtered_total, par.filtered_total);
    assert_eq!(seq.temperature, par.temperature);
    assert_eq!(seq.working_day, par.working_day);
    assert_eq!(seq.yearly, par.yearly);
    assert_eq!(seq.season, par.season);
}

#[test]
fn hourly_source_uses_hourly_rows() {
    let (loaded, views) = load_and_compute(&config(DataSource::Hourly, None, None)).unwrap();

    let hourly = loaded.hourly.as_ref().unwrap();
    assert_eq!(hourly.len(), 5);
    assert_eq!(hourly.records()[1].hour, Some(1));
    assert_eq!(views.range.end(), d(2012, 7, 2));
    assert_eq!(views.filtered_total, 930);
}

#[test]
fn window_outside_dataset_is_rejected() {
    let cfg = config(DataSource::Daily, Some(d(2010, 6, 1)), Some(d(2011, 1, 2)));
    let err = load_and_compute(&cfg).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn missing_hourly_dataset_is_a_usage_error() {
    let mut cfg = config(DataSource::Hourly, None, None);
    cfg.hourly_path = None;
    let err = load_and_compute(&cfg).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("hourly"));
}

#[test]
fn export_writes_tables_and_bundle() {
    let (_, views) = load_and_compute(&config(DataSource::Daily, None, None)).unwrap();
    let dir = std::env::temp_dir().join(format!("rentals-it-export-{}", std::process::id()));

    let written = bike_rentals::io::export::write_views(&dir, &views).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["temperature.csv", "working_day.csv", "yearly.csv", "season.csv", "views.json"]
    );

    let season_csv = std::fs::read_to_string(dir.join("season.csv")).unwrap();
    assert_eq!(
        season_csv,
        "label,total\nFall,11708\nWinter,7095\nSummer,5936\nSpring,5864\n"
    );

    let bundle: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("views.json")).unwrap()).unwrap();
    assert_eq!(bundle["total_rentals"], 30603);
    assert_eq!(bundle["season"]["most_popular"], "Fall");
    assert_eq!(bundle["yearly"]["chart"]["title"], "Daily Bike Rentals Over the Years");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn report_and_plot_render_for_fixture() {
    let cfg = config(DataSource::Daily, None, None);
    let (loaded, views) = load_and_compute(&cfg).unwrap();

    let summary = bike_rentals::report::format_run_summary(&loaded, cfg.source, &views);
    assert!(summary.contains("30603"));
    let tables = bike_rentals::report::format_views(&views);
    assert!(tables.contains("Most popular season: Fall"));

    let plot = bike_rentals::plot::render_views(&views, cfg.plot_width, cfg.plot_height);
    assert!(plot.contains("Daily Bike Rentals vs Season"));
}
