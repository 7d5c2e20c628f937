use crate::{mean, median, sample_std_dev, StatsError};
use log::debug;
use serde::Serialize;
use snotel_core::observation::Observation;
use std::collections::BTreeMap;
use std::io::Write;

/// Aggregate of every present value recorded on one day of the water year
/// across all years of record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value
    pub std_dev: Option<f64>,
    pub median: f64,
}

impl DaySummary {
    /// Summarize `values`, which are sorted in place. `None` when empty.
    pub fn from_values(values: &mut [f64]) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        Some(DaySummary {
            count: values.len(),
            min: *values.first()?,
            max: *values.last()?,
            mean: mean(values)?,
            std_dev: sample_std_dev(values),
            median: median(values)?,
        })
    }
}

/// Result of looking up one day of the water year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayAggregate {
    /// No present value was ever recorded on this day
    NoData,
    Summary(DaySummary),
}

impl DayAggregate {
    pub fn summary(&self) -> Option<&DaySummary> {
        match self {
            DayAggregate::NoData => None,
            DayAggregate::Summary(summary) => Some(summary),
        }
    }

    pub fn median(&self) -> Option<f64> {
        self.summary().map(|s| s.median)
    }
}

/// Historical statistics for each day of the water year.
///
/// ```
/// use snotel_stats::{DayAggregate, HistoricalNormals};
///
/// let normals = HistoricalNormals::from_pairs([(1, Some(2.0)), (1, Some(4.0)), (2, None)]);
/// assert_eq!(normals.for_day(1).median(), Some(3.0));
/// assert_eq!(normals.for_day(2), DayAggregate::NoData);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalNormals {
    days: BTreeMap<u32, DaySummary>,
}

impl HistoricalNormals {
    /// Build from `(day_of_water_year, value)` pairs. Missing and non-finite
    /// values are skipped; they never count as zero.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, Option<f64>)>,
    {
        let mut values: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (dowy, value) in pairs {
            if let Some(value) = value.filter(|v| v.is_finite()) {
                values.entry(dowy).or_default().push(value);
            }
        }
        let days = values
            .into_iter()
            .filter_map(|(dowy, mut values)| {
                DaySummary::from_values(&mut values).map(|summary| (dowy, summary))
            })
            .collect();
        HistoricalNormals { days }
    }

    pub fn from_observations<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let normals = Self::from_pairs(
            observations
                .into_iter()
                .map(|o| (o.day_of_water_year(), o.value)),
        );
        debug!("Computed normals for {} days of the water year", normals.len());
        normals
    }

    /// Normals from every water year except `water_year`, so a cycle can be
    /// compared against a baseline that does not include itself.
    pub fn excluding_water_year<'a, I>(observations: I, water_year: i32) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        Self::from_observations(
            observations
                .into_iter()
                .filter(|o| o.water_year() != water_year),
        )
    }

    pub fn for_day(&self, dowy: u32) -> DayAggregate {
        match self.days.get(&dowy) {
            Some(summary) => DayAggregate::Summary(*summary),
            None => DayAggregate::NoData,
        }
    }

    /// Days that have data, in day-of-water-year order.
    pub fn days(&self) -> impl Iterator<Item = (u32, &DaySummary)> + '_ {
        self.days.iter().map(|(dowy, summary)| (*dowy, summary))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Serialize)]
struct NormalsRow {
    day_of_water_year: u32,
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
    std_dev: Option<f64>,
    median: f64,
}

/// Write one row per day that has data:
/// `day_of_water_year,count,min,max,mean,std_dev,median`.
pub fn write_normals_csv<W: Write>(
    writer: W,
    normals: &HistoricalNormals,
) -> Result<(), StatsError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (dowy, summary) in normals.days() {
        wtr.serialize(NormalsRow {
            day_of_water_year: dowy,
            count: summary.count,
            min: summary.min,
            max: summary.max,
            mean: summary.mean,
            std_dev: summary.std_dev,
            median: summary.median,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use snotel_core::element::Element;

    fn observation(y: i32, m: u32, d: u32, value: Option<f64>) -> Observation {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Observation {
            site: "335:CO:SNTL".to_string(),
            element: Element::SnowWaterEquivalent,
            timestamp: offset
                .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
                .unwrap(),
            value,
            qc_flag: None,
            qa_flag: None,
        }
    }

    #[test]
    fn test_summary_statistics() {
        let normals = HistoricalNormals::from_pairs([
            (100, Some(8.0)),
            (100, Some(2.0)),
            (100, Some(5.0)),
            (100, Some(5.0)),
        ]);
        let summary = *normals.for_day(100).summary().unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.median, 5.0);
        assert!((summary.std_dev.unwrap() - 6.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_are_excluded_not_zero() {
        let normals = HistoricalNormals::from_pairs([
            (10, Some(4.0)),
            (10, None),
            (10, Some(f64::NAN)),
            (10, Some(6.0)),
        ]);
        let summary = normals.for_day(10).summary().copied().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.min, 4.0);
        assert_eq!(summary.mean, 5.0);
    }

    #[test]
    fn test_day_without_values_is_no_data() {
        let normals = HistoricalNormals::from_pairs([(5, None), (6, Some(1.0))]);
        assert_eq!(normals.for_day(5), DayAggregate::NoData);
        assert_eq!(normals.for_day(200), DayAggregate::NoData);
        assert_eq!(normals.len(), 1);
        assert!(HistoricalNormals::from_pairs(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        let normals = HistoricalNormals::from_pairs([(1, Some(0.0))]);
        let summary = normals.for_day(1).summary().copied().unwrap();
        assert_eq!(summary.std_dev, None);
        assert_eq!(summary.median, 0.0);
    }

    #[test]
    fn test_from_observations_groups_by_day_of_water_year() {
        let observations = vec![
            observation(2020, 4, 1, Some(20.0)),
            observation(2021, 4, 1, Some(10.0)),
            observation(2022, 4, 1, Some(30.0)),
            observation(2021, 10, 1, Some(0.0)),
        ];
        let normals = HistoricalNormals::from_observations(&observations);
        // Apr 1 2020 falls one day later in the leap water year
        assert_eq!(normals.for_day(184).summary().unwrap().count, 1);
        let apr_1 = normals.for_day(183).summary().copied().unwrap();
        assert_eq!(apr_1.count, 2);
        assert_eq!(apr_1.median, 20.0);
        assert_eq!(normals.days().map(|(d, _)| d).collect::<Vec<_>>(), vec![1, 183, 184]);
    }

    #[test]
    fn test_excluding_water_year() {
        let observations = vec![
            observation(2021, 4, 1, Some(10.0)),
            observation(2022, 4, 1, Some(30.0)),
            observation(2023, 4, 1, Some(50.0)),
        ];
        let normals = HistoricalNormals::excluding_water_year(&observations, 2023);
        let summary = normals.for_day(183).summary().copied().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.median, 20.0);
    }

    #[test]
    fn test_write_normals_csv() {
        let normals = HistoricalNormals::from_pairs([(2, Some(1.0)), (1, Some(3.0)), (1, Some(5.0))]);
        let mut buf = Vec::new();
        write_normals_csv(&mut buf, &normals).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "day_of_water_year,count,min,max,mean,std_dev,median");
        assert!(lines[1].starts_with("1,2,3.0,5.0,4.0,"));
        assert_eq!(lines[2], "2,1,1.0,1.0,1.0,,1.0");
    }
}
