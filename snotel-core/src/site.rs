use crate::water_year::water_year_for_date;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// AWDB network code for SNOTEL stations.
pub const SNOTEL_NETWORK: &str = "SNTL";

/// A snow monitoring site.
///
/// Holds the station metadata the AWDB station service reports. Sites are
/// fetched once and treated as read-only reference data afterwards.
///
/// See: <https://www.nrcs.usda.gov/resources/data-and-reports/snow-and-water-interactive-map>
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Station triplet, `<station id>:<state>:<network>` (e.g. "1000:OR:SNTL")
    pub triplet: String,
    /// Human-readable name of the station
    pub name: String,
    /// Two-letter state code
    pub state: String,
    /// Network code ("SNTL" for SNOTEL)
    pub network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// Hydrologic unit code of the watershed the station sits in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub huc: Option<String>,
    /// Elevation of the station in feet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_ft: Option<f64>,
    /// Latitude in decimal degrees (WGS84)
    pub latitude: f64,
    /// Longitude in decimal degrees (WGS84)
    pub longitude: f64,
    /// Offset from UTC in hours of the station's reporting clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_time_zone: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Site {
    /// Split a station triplet into (station id, state, network).
    pub fn split_triplet(triplet: &str) -> Option<(&str, &str, &str)> {
        let mut parts = triplet.split(':');
        let id = parts.next()?;
        let state = parts.next()?;
        let network = parts.next()?;
        if parts.next().is_some() || id.is_empty() || state.is_empty() || network.is_empty() {
            return None;
        }
        Some((id, state, network))
    }

    /// The station id portion of the triplet.
    pub fn station_id(&self) -> &str {
        self.triplet.split(':').next().unwrap_or(&self.triplet)
    }

    /// (longitude, latitude), the axis order GeoJSON and `geo` use.
    pub fn point(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }

    /// The fixed UTC offset observation timestamps are reported in. Falls
    /// back to UTC when the station reports no (or an impossible) offset.
    pub fn utc_offset(&self) -> FixedOffset {
        self.data_time_zone
            .filter(|hours| hours.is_finite())
            .and_then(|hours| FixedOffset::east_opt((hours * 3600.0).round() as i32))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Whether the station was reporting on `date` according to its
    /// begin/end of record. Unknown bounds are treated as open.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        let started = self.begin_date.map_or(true, |begin| begin <= date);
        let not_ended = self.end_date.map_or(true, |end| date <= end);
        started && not_ended
    }

    /// Number of complete water years of record as of `reference`, or `None`
    /// when the begin date is unknown.
    pub fn record_years(&self, reference: NaiveDate) -> Option<u32> {
        let begin = self.begin_date?;
        let last = match self.end_date {
            Some(end) if end < reference => end,
            _ => reference,
        };
        if last < begin {
            return Some(0);
        }
        // partial first and last water years do not count
        let first_complete = if begin == first_day_of_water_year(begin) {
            water_year_for_date(begin)
        } else {
            water_year_for_date(begin) + 1
        };
        let last_complete = if last == last_day_of_water_year(last) {
            water_year_for_date(last)
        } else {
            water_year_for_date(last) - 1
        };
        Some((last_complete - first_complete + 1).max(0) as u32)
    }
}

fn first_day_of_water_year(date: NaiveDate) -> NaiveDate {
    crate::water_year::water_year_start(water_year_for_date(date)).unwrap_or(date)
}

fn last_day_of_water_year(date: NaiveDate) -> NaiveDate {
    crate::water_year::water_year_end(water_year_for_date(date)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::Site;
    use chrono::NaiveDate;

    fn site() -> Site {
        Site {
            triplet: "1000:OR:SNTL".to_string(),
            name: "Annie Springs".to_string(),
            state: "OR".to_string(),
            network: "SNTL".to_string(),
            county: Some("Klamath".to_string()),
            huc: Some("171003020201".to_string()),
            elevation_ft: Some(6010.0),
            latitude: 42.87,
            longitude: -122.17,
            data_time_zone: Some(-8.0),
            begin_date: NaiveDate::from_ymd_opt(2000, 10, 1),
            end_date: None,
        }
    }

    #[test]
    fn test_split_triplet() {
        assert_eq!(
            Site::split_triplet("1000:OR:SNTL"),
            Some(("1000", "OR", "SNTL"))
        );
        assert_eq!(Site::split_triplet("1000:OR"), None);
        assert_eq!(Site::split_triplet("1000::SNTL"), None);
        assert_eq!(Site::split_triplet("1:2:3:4"), None);
        assert_eq!(site().station_id(), "1000");
    }

    #[test]
    fn test_utc_offset_from_data_time_zone() {
        assert_eq!(site().utc_offset().local_minus_utc(), -8 * 3600);
        let mut unknown = site();
        unknown.data_time_zone = None;
        assert_eq!(unknown.utc_offset().local_minus_utc(), 0);
        unknown.data_time_zone = Some(99.0);
        assert_eq!(unknown.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_is_active_on() {
        let mut s = site();
        assert!(s.is_active_on(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()));
        assert!(!s.is_active_on(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()));
        s.end_date = NaiveDate::from_ymd_opt(2010, 9, 30);
        assert!(!s.is_active_on(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap()));
    }

    #[test]
    fn test_record_years_counts_complete_water_years() {
        let s = site();
        // WY2001 through WY2021 complete as of 2021-09-30
        let end_of_wy = NaiveDate::from_ymd_opt(2021, 9, 30).unwrap();
        assert_eq!(s.record_years(end_of_wy), Some(21));
        // mid-year reference does not count the running year
        let mid = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        assert_eq!(s.record_years(mid), Some(21));

        let mut late_start = site();
        late_start.begin_date = NaiveDate::from_ymd_opt(2000, 11, 15);
        assert_eq!(late_start.record_years(end_of_wy), Some(20));

        let mut unknown = site();
        unknown.begin_date = None;
        assert_eq!(unknown.record_years(end_of_wy), None);
    }

    #[test]
    fn test_json_round_trip_skips_missing_optionals() {
        let mut s = site();
        s.county = None;
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("county"));
        let back: Site = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
