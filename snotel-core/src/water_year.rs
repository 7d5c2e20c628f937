use crate::observation::Observation;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

/// A water year runs from October 1 to September 30 and is the 12-month
/// timeframe used by hydrologists to compile and compare records. It is
/// named by the calendar year in which it ends: water year 2022 is
/// October 1, 2021 through September 30, 2022.
pub const WATER_YEAR_START_MONTH: u32 = 10;

/// Days from October 1 through December 31, identical in every year.
const DAYS_OCT_THROUGH_DEC: u32 = 92;

/// Ordinal of September 30 in a non-leap year.
const SEP_30_ORDINAL: u32 = 273;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The water year a calendar date belongs to.
///
/// ```
/// use chrono::NaiveDate;
/// use snotel_core::water_year::water_year_for_date;
///
/// let oct = NaiveDate::from_ymd_opt(2021, 10, 1).unwrap();
/// let sep = NaiveDate::from_ymd_opt(2022, 9, 30).unwrap();
/// assert_eq!(water_year_for_date(oct), 2022);
/// assert_eq!(water_year_for_date(sep), 2022);
/// ```
pub fn water_year_for_date(date: NaiveDate) -> i32 {
    if date.month() >= WATER_YEAR_START_MONTH {
        date.year() + 1
    } else {
        date.year()
    }
}

/// October 1 of the year preceding `water_year`.
pub fn water_year_start(water_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(water_year - 1, WATER_YEAR_START_MONTH, 1)
}

/// September 30 of `water_year`.
pub fn water_year_end(water_year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(water_year, 9, 30)
}

/// 366 when February 29 falls inside the water year, otherwise 365.
pub fn days_in_water_year(water_year: i32) -> u32 {
    if is_leap_year(water_year) {
        366
    } else {
        365
    }
}

/// Day of water year (DOWY): October 1 is day 1.
///
/// Computed as days elapsed since the most recent October 1 on or before
/// `date`, so leap years need no special case. January through September
/// always sit 92 days after the ordinal day of year (October, November and
/// December never change length), and October through December sit 273 days
/// before it, one more when the calendar year is a leap year.
///
/// ```
/// use chrono::NaiveDate;
/// use snotel_core::water_year::day_of_water_year;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// assert_eq!(day_of_water_year(d(2021, 10, 1)), 1);
/// assert_eq!(day_of_water_year(d(2021, 12, 31)), 92);
/// assert_eq!(day_of_water_year(d(2021, 9, 30)), 365);
/// assert_eq!(day_of_water_year(d(2024, 9, 30)), 366);
/// ```
pub fn day_of_water_year(date: NaiveDate) -> u32 {
    let ordinal = date.ordinal();
    if date.month() >= WATER_YEAR_START_MONTH {
        let sep_30 = SEP_30_ORDINAL + u32::from(is_leap_year(date.year()));
        ordinal - sep_30
    } else {
        ordinal + DAYS_OCT_THROUGH_DEC
    }
}

/// Inverse of [`day_of_water_year`]. Returns `None` when `dowy` is zero or
/// past the end of the given water year.
pub fn date_for_day_of_water_year(water_year: i32, dowy: u32) -> Option<NaiveDate> {
    if dowy == 0 || dowy > days_in_water_year(water_year) {
        return None;
    }
    water_year_start(water_year)?.checked_add_days(Days::new(u64::from(dowy - 1)))
}

/// All observations belonging to one water year, in timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterYear {
    pub year: i32,
    pub observations: Vec<Observation>,
}

impl WaterYear {
    /// Partition observations into water years, oldest first. Water years
    /// without a single observation are not produced.
    pub fn partition(observations: &[Observation]) -> Vec<WaterYear> {
        let mut by_year: BTreeMap<i32, Vec<Observation>> = BTreeMap::new();
        for observation in observations {
            by_year
                .entry(observation.water_year())
                .or_default()
                .push(observation.clone());
        }
        by_year
            .into_iter()
            .map(|(year, mut observations)| {
                observations.sort_by_key(|o| o.timestamp);
                WaterYear { year, observations }
            })
            .collect()
    }

    /// Number of observations that carry a value.
    pub fn present_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|o| o.value.is_some())
            .count()
    }

    /// Fraction of the water year's days that have a present value.
    pub fn completeness(&self) -> f64 {
        self.present_count() as f64 / f64::from(days_in_water_year(self.year))
    }
}

/// Observations that fall in `water_year`, e.g. the current cycle selected
/// from a reference date with [`water_year_for_date`].
pub fn observations_in_water_year(
    observations: &[Observation],
    water_year: i32,
) -> Vec<&Observation> {
    observations
        .iter()
        .filter(|o| o.water_year() == water_year)
        .collect()
}
