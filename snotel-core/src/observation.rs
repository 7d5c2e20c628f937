use crate::element::Element;
use crate::water_year::{day_of_water_year, water_year_for_date};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use thiserror::Error;

/// Numeric code the upstream service uses in place of a measurement when
/// none was recorded. It must never reach an aggregate as a real value.
pub const NO_DATA_SENTINEL: f64 = -9999.0;

/// Errors that can occur when reading or writing observations.
#[derive(Debug, Error)]
pub enum ObservationError {
    #[error("observation CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("observation I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single daily (or hourly) measurement from one site for one element.
///
/// `value` is `None` when the station reported nothing for the timestamp;
/// that is distinct from a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Station triplet of the reporting site
    pub site: String,
    pub element: Element,
    /// Timestamp in the station's reporting offset
    pub timestamp: DateTime<FixedOffset>,
    pub value: Option<f64>,
    /// Quality control flag ("V" valid, "E" edited, "S" suspect, ...)
    pub qc_flag: Option<String>,
    /// Quality assurance flag ("P" provisional, "A" approved, ...)
    pub qa_flag: Option<String>,
}

/// Translate a value as it arrives on the wire into the in-memory
/// representation: the sentinel and non-finite numbers become `None`.
pub fn value_from_wire(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite() && *v != NO_DATA_SENTINEL)
}

/// Attach a fixed offset to a station-local timestamp.
pub fn local_timestamp(
    local: NaiveDateTime,
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    local.and_local_timezone(offset).single()
}

impl Observation {
    /// Calendar date in the station's local time.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn day_of_water_year(&self) -> u32 {
        day_of_water_year(self.date())
    }

    pub fn water_year(&self) -> i32 {
        water_year_for_date(self.date())
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// Group observations by site triplet, each group in timestamp order.
    pub fn group_by_site(observations: Vec<Observation>) -> BTreeMap<String, Vec<Observation>> {
        let mut result: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            result.entry(obs.site.clone()).or_default().push(obs);
        }
        for group in result.values_mut() {
            group.sort_by_key(|o| o.timestamp);
        }
        result
    }

    /// Observations for one site and element, in timestamp order.
    pub fn series<'a>(
        observations: &'a [Observation],
        site: &str,
        element: Element,
    ) -> Vec<&'a Observation> {
        let mut series: Vec<&Observation> = observations
            .iter()
            .filter(|o| o.site == site && o.element == element)
            .collect();
        series.sort_by_key(|o| o.timestamp);
        series
    }
}

/// Write observations as CSV with a header row:
/// `site,element,timestamp,value,qc_flag,qa_flag`. Missing values are empty.
pub fn write_observations_csv<W: Write>(
    writer: W,
    observations: &[Observation],
) -> Result<(), ObservationError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for observation in observations {
        wtr.serialize(observation)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read observations written by [`write_observations_csv`]. The no-data
/// sentinel and non-finite values read back as missing.
pub fn read_observations_csv<R: Read>(reader: R) -> Result<Vec<Observation>, ObservationError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut observations = Vec::new();
    for row in rdr.deserialize() {
        let mut observation: Observation = row?;
        observation.value = value_from_wire(observation.value);
        observations.push(observation);
    }
    Ok(observations)
}
