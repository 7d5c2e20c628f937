//! Async client for the NRCS Air-Water Database (AWDB) REST API.
//!
//! Station metadata comes from `/stations`, daily values from `/data`.
//! Transport and parsing are kept apart: the `parse_*` functions take a
//! response body and are exercised against fixture payloads in the tests,
//! while [`AwdbClient`] only issues requests and classifies their outcome.
//!
//! Every fetch resolves to one of three expected outcomes
//! ([`FetchOutcome`]) or a permanent [`ClientError`]. Callers decide
//! whether a transient failure is retried or the site is skipped.

use crate::date_range::DateRange;
use crate::element::Element;
use crate::observation::{local_timestamp, value_from_wire, Observation};
use crate::site::Site;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use snotel_utils::dates::{format_date, parse_date_time};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://wcc.sc.egov.usda.gov/awdbRestApi/services/v1";

/// Connection settings for [`AwdbClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Pause to take between consecutive requests of a loop
    pub request_pause: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            request_pause: Duration::from_millis(500),
        }
    }
}

/// The expected outcomes of a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    /// The service does not know the site (or the site does not report
    /// the requested element). A normal result, not an error.
    NotFound,
    /// The request may succeed if tried again later.
    TransientFailure(String),
}

impl<T> FetchOutcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Success(value) => FetchOutcome::Success(f(value)),
            FetchOutcome::NotFound => FetchOutcome::NotFound,
            FetchOutcome::TransientFailure(reason) => FetchOutcome::TransientFailure(reason),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FetchOutcome::TransientFailure(_))
    }
}

/// Failures that retrying will not fix.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("{url} rejected the request with HTTP {status}")]
    Rejected { url: String, status: u16 },
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid timestamp {0:?} in response")]
    Timestamp(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationRecord {
    station_triplet: String,
    #[serde(default)]
    state_code: Option<String>,
    #[serde(default)]
    network_code: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    county_name: Option<String>,
    #[serde(default)]
    huc: Option<String>,
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    data_time_zone: Option<f64>,
    #[serde(default)]
    begin_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationData {
    station_triplet: String,
    #[serde(default)]
    data: Vec<ElementData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementData {
    station_element: StationElement,
    #[serde(default)]
    values: Vec<DataValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationElement {
    element_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataValue {
    date: String,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    qc_flag: Option<String>,
    #[serde(default)]
    qa_flag: Option<String>,
}

/// Station metadata query for every station of `network`, optionally
/// restricted to one state.
pub fn stations_url(base_url: &str, network: &str, state: Option<&str>, active_only: bool) -> String {
    format!(
        "{}/stations?stationTriplets=*:{}:{}&activeOnly={}&returnForecastPointMetadata=false&returnReservoirMetadata=false&returnStationElements=false",
        base_url.trim_end_matches('/'),
        state.unwrap_or("*"),
        network,
        active_only
    )
}

/// Station metadata query for a single triplet.
pub fn station_url(base_url: &str, triplet: &str) -> String {
    format!(
        "{}/stations?stationTriplets={}&activeOnly=false&returnForecastPointMetadata=false&returnReservoirMetadata=false&returnStationElements=false",
        base_url.trim_end_matches('/'),
        triplet
    )
}

/// Daily values query for one site and element over an inclusive range.
pub fn data_url(base_url: &str, triplet: &str, element: Element, range: &DateRange) -> String {
    format!(
        "{}/data?stationTriplets={}&elements={}&duration=DAILY&beginDate={}&endDate={}&periodRef=END&centralTendencyType=NONE&returnFlags=true&returnOriginalValues=false&returnSuspectData=false",
        base_url.trim_end_matches('/'),
        triplet,
        element.code(),
        format_date(&range.start()),
        format_date(&range.end())
    )
}

fn parse_record_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, ClientError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date_time(s)
            .map(|dt| Some(dt.date()))
            .map_err(|_| ClientError::Timestamp(s.to_string())),
    }
}

/// Parse a `/stations` response. Stations without coordinates cannot be
/// placed on a map or filtered spatially and are dropped.
pub fn parse_stations(body: &str) -> Result<Vec<Site>, ClientError> {
    let records: Vec<StationRecord> = serde_json::from_str(body)?;
    let mut sites = Vec::with_capacity(records.len());
    for record in records {
        let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
            debug!("Skipping {}: no coordinates", record.station_triplet);
            continue;
        };
        let (triplet_state, triplet_network) = match Site::split_triplet(&record.station_triplet) {
            Some((_, state, network)) => (state.to_string(), network.to_string()),
            None => (String::new(), String::new()),
        };
        let begin_date = parse_record_date(record.begin_date.as_deref())?;
        let end_date = parse_record_date(record.end_date.as_deref())?;
        sites.push(Site {
            name: record.name.unwrap_or_else(|| record.station_triplet.clone()),
            state: record.state_code.unwrap_or(triplet_state),
            network: record.network_code.unwrap_or(triplet_network),
            triplet: record.station_triplet,
            county: record.county_name,
            huc: record.huc,
            elevation_ft: record.elevation,
            latitude,
            longitude,
            data_time_zone: record.data_time_zone,
            begin_date,
            end_date,
        });
    }
    Ok(sites)
}

/// Parse a `/data` response for one site and element.
///
/// Returns `None` when the response has no entry for the site or the site
/// has no series for the element. Sentinel values are translated to
/// missing values here, before anything downstream sees them.
pub fn parse_data(
    body: &str,
    site: &Site,
    element: Element,
) -> Result<Option<Vec<Observation>>, ClientError> {
    let stations: Vec<StationData> = serde_json::from_str(body)?;
    let Some(station) = stations
        .into_iter()
        .find(|s| s.station_triplet == site.triplet)
    else {
        return Ok(None);
    };
    let Some(series) = station
        .data
        .into_iter()
        .find(|d| d.station_element.element_code.eq_ignore_ascii_case(element.code()))
    else {
        return Ok(None);
    };

    let offset = site.utc_offset();
    let mut observations = Vec::with_capacity(series.values.len());
    for raw in series.values {
        let local =
            parse_date_time(&raw.date).map_err(|_| ClientError::Timestamp(raw.date.clone()))?;
        let timestamp =
            local_timestamp(local, offset).ok_or_else(|| ClientError::Timestamp(raw.date.clone()))?;
        observations.push(Observation {
            site: site.triplet.clone(),
            element,
            timestamp,
            value: value_from_wire(raw.value),
            qc_flag: raw.qc_flag.filter(|f| !f.trim().is_empty()),
            qa_flag: raw.qa_flag.filter(|f| !f.trim().is_empty()),
        });
    }
    observations.sort_by_key(|o| o.timestamp);
    Ok(Some(observations))
}

/// Server-side conditions worth retrying.
pub fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn is_transient_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// AWDB REST client. Requests are issued one at a time.
pub struct AwdbClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl AwdbClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sleep for the configured pause. Loops call this between requests.
    pub async fn pause(&self) {
        tokio::time::sleep(self.config.request_pause).await;
    }

    async fn get(&self, url: &str) -> Result<FetchOutcome<String>, ClientError> {
        debug!("GET {}", url);
        let response = match self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if is_transient_error(&e) => {
                return Ok(FetchOutcome::TransientFailure(e.to_string()))
            }
            Err(e) => return Err(ClientError::Request(e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if is_transient_status(status) {
            return Ok(FetchOutcome::TransientFailure(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ClientError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        match response.text().await {
            Ok(body) => Ok(FetchOutcome::Success(body)),
            Err(e) if is_transient_error(&e) => Ok(FetchOutcome::TransientFailure(e.to_string())),
            Err(e) => Err(ClientError::Request(e)),
        }
    }

    /// All stations of a network, optionally limited to one state.
    pub async fn fetch_sites(
        &self,
        network: &str,
        state: Option<&str>,
        active_only: bool,
    ) -> Result<FetchOutcome<Vec<Site>>, ClientError> {
        let url = stations_url(&self.config.base_url, network, state, active_only);
        match self.get(&url).await? {
            FetchOutcome::Success(body) => {
                let sites = parse_stations(&body)?;
                if sites.is_empty() {
                    Ok(FetchOutcome::NotFound)
                } else {
                    Ok(FetchOutcome::Success(sites))
                }
            }
            FetchOutcome::NotFound => Ok(FetchOutcome::NotFound),
            FetchOutcome::TransientFailure(reason) => Ok(FetchOutcome::TransientFailure(reason)),
        }
    }

    /// Metadata for a single station triplet.
    pub async fn fetch_site(&self, triplet: &str) -> Result<FetchOutcome<Site>, ClientError> {
        let url = station_url(&self.config.base_url, triplet);
        match self.get(&url).await? {
            FetchOutcome::Success(body) => {
                let site = parse_stations(&body)?
                    .into_iter()
                    .find(|s| s.triplet == triplet);
                Ok(site.map_or(FetchOutcome::NotFound, FetchOutcome::Success))
            }
            FetchOutcome::NotFound => Ok(FetchOutcome::NotFound),
            FetchOutcome::TransientFailure(reason) => Ok(FetchOutcome::TransientFailure(reason)),
        }
    }

    /// Daily values of `element` at `site` over `range`.
    pub async fn fetch_observations(
        &self,
        site: &Site,
        element: Element,
        range: &DateRange,
    ) -> Result<FetchOutcome<Vec<Observation>>, ClientError> {
        let url = data_url(&self.config.base_url, &site.triplet, element, range);
        match self.get(&url).await? {
            FetchOutcome::Success(body) => Ok(parse_data(&body, site, element)?
                .map_or(FetchOutcome::NotFound, FetchOutcome::Success)),
            FetchOutcome::NotFound => Ok(FetchOutcome::NotFound),
            FetchOutcome::TransientFailure(reason) => Ok(FetchOutcome::TransientFailure(reason)),
        }
    }
}
