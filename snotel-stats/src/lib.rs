//! Descriptive statistics over SNOTEL observation history.
//!
//! - [`normals`]: per day-of-water-year aggregates across all years of record
//! - [`percent`]: percent of normal against the historical median
//! - [`water_year_stats`]: lowest/highest value and date for each water year

pub mod normals;
pub mod percent;
pub mod water_year_stats;

pub use normals::{DayAggregate, DaySummary, HistoricalNormals};
pub use percent::{observed_on, percent_of_normal, percent_of_normal_on, PercentOfNormal};
pub use water_year_stats::WaterYearStatistics;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation with N-1 denominator. `None` with fewer than
/// two values.
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let mean = mean(data)?;
    let variance = data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (n as f64 - 1.0);
    Some(variance.sqrt())
}

/// Median of pre-sorted data. For even length, averages the middle two values.
pub fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}
