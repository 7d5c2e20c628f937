use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use snotel_core::observation::Observation;
use snotel_core::water_year::WaterYear;
use std::cmp::Ordering;

/// Statistics computed for a single water year: highest/lowest values and
/// their dates. For snow water equivalent the highest value is the seasonal
/// peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterYearStatistics {
    pub water_year: i32,
    pub date_lowest: NaiveDate,
    pub date_highest: NaiveDate,
    pub lowest_value: f64,
    pub highest_value: f64,
    /// Number of present values the statistics were computed from
    pub count: usize,
}

impl WaterYearStatistics {
    /// `None` when the water year has no present value. Ties resolve to the
    /// earliest date.
    pub fn from_water_year(water_year: &WaterYear) -> Option<Self> {
        let mut present = water_year
            .observations
            .iter()
            .filter_map(|o| o.value.filter(|v| v.is_finite()).map(|v| (o.date(), v)));
        let (first_date, first_value) = present.next()?;
        let mut stats = WaterYearStatistics {
            water_year: water_year.year,
            date_lowest: first_date,
            date_highest: first_date,
            lowest_value: first_value,
            highest_value: first_value,
            count: 1,
        };
        for (date, value) in present {
            stats.count += 1;
            if value < stats.lowest_value {
                stats.lowest_value = value;
                stats.date_lowest = date;
            }
            if value > stats.highest_value {
                stats.highest_value = value;
                stats.date_highest = date;
            }
        }
        Some(stats)
    }

    /// Returns true if this is the driest year (lowest minimum) in a collection.
    pub fn is_driest_in(&self, all_stats: &[WaterYearStatistics]) -> bool {
        all_stats
            .iter()
            .all(|other| self.lowest_value <= other.lowest_value)
    }

    /// Returns true if this is the wettest year (highest maximum) in a collection.
    pub fn is_wettest_in(&self, all_stats: &[WaterYearStatistics]) -> bool {
        all_stats
            .iter()
            .all(|other| self.highest_value >= other.highest_value)
    }
}

/// Statistics for every water year with at least one present value, oldest
/// first.
pub fn water_year_statistics(observations: &[Observation]) -> Vec<WaterYearStatistics> {
    WaterYear::partition(observations)
        .iter()
        .filter_map(WaterYearStatistics::from_water_year)
        .collect()
}

/// Sort by peak value, wettest first.
pub fn sort_by_wettest(stats: &mut [WaterYearStatistics]) {
    stats.sort_by(|a, b| {
        b.highest_value
            .partial_cmp(&a.highest_value)
            .unwrap_or(Ordering::Equal)
    });
}
