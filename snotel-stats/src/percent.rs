use crate::normals::{DayAggregate, HistoricalNormals};
use chrono::NaiveDate;
use snotel_core::observation::Observation;
use snotel_core::water_year::day_of_water_year;
use std::fmt;

/// An observed value expressed against the historical median for the same
/// day of the water year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentOfNormal {
    Percent(f64),
    /// The historical median is absent, zero or not a number
    NoBaseline,
    /// Nothing was observed on the requested date
    NoObservation,
}

impl PercentOfNormal {
    pub fn percent(&self) -> Option<f64> {
        match self {
            PercentOfNormal::Percent(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for PercentOfNormal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentOfNormal::Percent(p) => write!(f, "{p:.1}%"),
            PercentOfNormal::NoBaseline => write!(f, "no baseline"),
            PercentOfNormal::NoObservation => write!(f, "no observation"),
        }
    }
}

/// `100 * observed / median`.
///
/// ```
/// use snotel_stats::{percent_of_normal, HistoricalNormals, PercentOfNormal};
///
/// let normals = HistoricalNormals::from_pairs([(150, Some(50.0))]);
/// assert_eq!(percent_of_normal(40.0, &normals.for_day(150)), PercentOfNormal::Percent(80.0));
/// assert_eq!(percent_of_normal(40.0, &normals.for_day(151)), PercentOfNormal::NoBaseline);
/// ```
pub fn percent_of_normal(observed: f64, aggregate: &DayAggregate) -> PercentOfNormal {
    if !observed.is_finite() {
        return PercentOfNormal::NoObservation;
    }
    match aggregate.median() {
        Some(median) if median.is_finite() && median != 0.0 => {
            PercentOfNormal::Percent(100.0 * observed / median)
        }
        _ => PercentOfNormal::NoBaseline,
    }
}

/// The value observed on `date`. With several observations that day
/// (hourly data) the latest present value is used.
pub fn observed_on(date: NaiveDate, observations: &[Observation]) -> Option<f64> {
    observations
        .iter()
        .filter(|o| o.date() == date)
        .filter_map(|o| o.value.map(|v| (o.timestamp, v)))
        .max_by_key(|(timestamp, _)| *timestamp)
        .map(|(_, v)| v)
}

/// Percent of normal for the value [`observed_on`] `reference_date`.
pub fn percent_of_normal_on(
    reference_date: NaiveDate,
    observations: &[Observation],
    normals: &HistoricalNormals,
) -> PercentOfNormal {
    match observed_on(reference_date, observations) {
        Some(value) => percent_of_normal(value, &normals.for_day(day_of_water_year(reference_date))),
        None => PercentOfNormal::NoObservation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normals::DaySummary;
    use chrono::{FixedOffset, TimeZone};
    use snotel_core::element::Element;

    fn observation(date: NaiveDate, hour: u32, value: Option<f64>) -> Observation {
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        Observation {
            site: "1000:OR:SNTL".to_string(),
            element: Element::SnowWaterEquivalent,
            timestamp: offset
                .from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
                .unwrap(),
            value,
            qc_flag: None,
            qa_flag: None,
        }
    }

    fn summary(median: f64) -> DayAggregate {
        DayAggregate::Summary(DaySummary {
            count: 3,
            min: median,
            max: median,
            mean: median,
            std_dev: Some(0.0),
            median,
        })
    }

    #[test]
    fn test_forty_against_fifty_is_eighty_percent() {
        assert_eq!(percent_of_normal(40.0, &summary(50.0)), PercentOfNormal::Percent(80.0));
    }

    #[test]
    fn test_exact_ratio() {
        let observed = 13.7;
        let median = 9.3;
        assert_eq!(
            percent_of_normal(observed, &summary(median)),
            PercentOfNormal::Percent(100.0 * observed / median)
        );
    }

    #[test]
    fn test_no_baseline() {
        assert_eq!(percent_of_normal(4.0, &summary(0.0)), PercentOfNormal::NoBaseline);
        assert_eq!(percent_of_normal(4.0, &summary(f64::NAN)), PercentOfNormal::NoBaseline);
        assert_eq!(percent_of_normal(4.0, &DayAggregate::NoData), PercentOfNormal::NoBaseline);
    }

    #[test]
    fn test_zero_observed_against_baseline_is_zero_percent() {
        assert_eq!(percent_of_normal(0.0, &summary(12.0)), PercentOfNormal::Percent(0.0));
    }

    #[test]
    fn test_percent_of_normal_on_reference_date() {
        let history = vec![
            observation(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(), 0, Some(40.0)),
            observation(NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(), 0, Some(60.0)),
        ];
        let normals = HistoricalNormals::from_observations(&history);
        let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let current = vec![
            observation(today, 0, Some(30.0)),
            observation(today, 12, None),
            observation(today, 6, Some(40.0)),
        ];
        let result = percent_of_normal_on(today, &current, &normals);
        assert_eq!(result, PercentOfNormal::Percent(80.0));
        assert_eq!(result.to_string(), "80.0%");
    }

    #[test]
    fn test_percent_of_normal_on_missing_observation() {
        let normals = HistoricalNormals::from_pairs([(152, Some(10.0))]);
        let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let current = vec![observation(today, 0, None)];
        assert_eq!(
            percent_of_normal_on(today, &current, &normals),
            PercentOfNormal::NoObservation
        );
        assert_eq!(percent_of_normal_on(today, &[], &normals), PercentOfNormal::NoObservation);
        assert_eq!(PercentOfNormal::NoObservation.percent(), None);
    }

    #[test]
    fn test_observed_on_takes_latest_present_value() {
        let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let observations = vec![
            observation(today, 18, None),
            observation(today, 6, Some(12.0)),
            observation(today, 0, Some(11.0)),
            observation(NaiveDate::from_ymd_opt(2023, 3, 2).unwrap(), 0, Some(13.0)),
        ];
        assert_eq!(observed_on(today, &observations), Some(12.0));
        assert_eq!(observed_on(NaiveDate::from_ymd_opt(2023, 2, 28).unwrap(), &observations), None);
    }
}
