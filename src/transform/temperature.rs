//! Normalized temperature → degrees Celsius.
//!
//! The source data stores `temp` as `(t - t_min) / (t_max - t_min)` with
//! `t_min = -8` and `t_max = 39`, so the inverse is `temp * 47 - 8`.

use crate::domain::{RentalDataset, TEMP_MAX_C, TEMP_MIN_C, TemperaturePoint};

/// Convert a normalized temperature to °C. Out-of-range inputs are not clamped.
pub fn to_celsius(temp: f64) -> f64 {
    temp * (TEMP_MAX_C - TEMP_MIN_C) + TEMP_MIN_C
}

/// Return a copy of `dataset` with `temp_celsius` set on every row.
///
/// Always recomputed from `temp`, so applying it twice gives the same result.
pub fn convert_temperature(dataset: &RentalDataset) -> RentalDataset {
    dataset
        .iter()
        .map(|r| {
            let mut row = r.clone();
            row.temp_celsius = Some(to_celsius(r.temp));
            row
        })
        .collect()
}

/// Temperature-correlation table: `(temp_celsius, cnt)` per row.
///
/// Rows that have not been converted yet are converted on the fly.
pub fn temperature_table(dataset: &RentalDataset) -> Vec<TemperaturePoint> {
    dataset
        .iter()
        .map(|r| TemperaturePoint {
            date: r.date,
            temp_celsius: r.temp_celsius.unwrap_or_else(|| to_celsius(r.temp)),
            cnt: r.cnt,
        })
        .collect()
}
