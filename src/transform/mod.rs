//! Pure transforms over a [`RentalDataset`](crate::domain::RentalDataset).
//!
//! Every function here takes the dataset by shared reference and returns a new
//! value; nothing mutates the loaded data and nothing touches rendering or IO.
//!
//! - `filter`: inclusive date-window restriction
//! - `temperature`: normalized temperature → °C
//! - `year`: calendar-year column
//! - `working_day`: totals per working-day flag
//! - `season`: totals per season, sorted descending

pub mod filter;
pub mod season;
pub mod temperature;
pub mod working_day;
pub mod year;

pub use filter::filter_by_date;
pub use season::summarize_by_season;
pub use temperature::{convert_temperature, temperature_table, to_celsius};
pub use working_day::summarize_by_working_day;
pub use year::extract_year;
