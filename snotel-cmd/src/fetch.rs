//! Sequential observation fetch for a list of sites.

use crate::retry::with_retries;
use crate::sites::read_sites_file;
use crate::ApiArgs;
use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use snotel_core::client::{AwdbClient, FetchOutcome};
use snotel_core::date_range::DateRange;
use snotel_core::element::Element;
use snotel_core::observation::{write_observations_csv, Observation};
use snotel_core::site::Site;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Per-site tallies of a fetch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchSummary {
    pub total: usize,
    pub fetched: usize,
    /// Sites without data for the element or outside the requested range
    pub not_found: usize,
    /// Sites skipped after transient failures or permanent errors
    pub failed: usize,
    pub observations: usize,
}

impl FetchSummary {
    pub fn log(&self) {
        let message = format!(
            "Fetch complete: {}/{} sites fetched, {} without data, {} failed, {} observations",
            self.fetched, self.total, self.not_found, self.failed, self.observations
        );
        if self.failed == 0 {
            info!("{}", message);
        } else if self.fetched == 0 {
            error!("{}", message);
        } else {
            warn!("{}", message);
        }
    }
}

/// Clip `range` to the site's period of record. `None` when they do not
/// overlap.
pub fn site_range(site: &Site, range: &DateRange) -> Option<DateRange> {
    let start = match site.begin_date {
        Some(begin) if begin > range.start() => begin,
        _ => range.start(),
    };
    let end = match site.end_date {
        Some(end) if end < range.end() => end,
        _ => range.end(),
    };
    (start <= end).then_some(DateRange(start, end))
}

/// Fetch `element` for every site in `sites_path` and write all
/// observations to `out`. Sites are fetched one at a time; a site that
/// fails is skipped and the run continues.
pub async fn run_fetch(
    api: &ApiArgs,
    sites_path: &Path,
    element: Element,
    begin: NaiveDate,
    end: Option<NaiveDate>,
    retries: u32,
    out: &Path,
) -> anyhow::Result<()> {
    let end = end.unwrap_or_else(|| Local::now().date_naive());
    if begin > end {
        bail!("--begin {} is after --end {}", begin, end);
    }
    let range = DateRange(begin, end);
    let sites = read_sites_file(sites_path)?;
    let client = AwdbClient::new(api.client_config())?;

    info!(
        "Fetching {} for {} sites from {} to {}",
        element,
        sites.len(),
        begin,
        end
    );

    let mut summary = FetchSummary {
        total: sites.len(),
        ..Default::default()
    };
    let mut all_obs: Vec<Observation> = Vec::new();

    for (i, site) in sites.iter().enumerate() {
        let Some(clipped) = site_range(site, &range) else {
            info!("{} ({}) has no record in {}", site.name, site.triplet, range);
            summary.not_found += 1;
            continue;
        };
        if i > 0 {
            client.pause().await;
        }
        info!("Fetching {} for {} ({})", element, site.name, site.triplet);

        let outcome = with_retries(&site.triplet, retries, client.config().request_pause, || {
            client.fetch_observations(site, element, &clipped)
        })
        .await;

        match outcome {
            Ok(FetchOutcome::Success(observations)) => {
                info!("  {} observations", observations.len());
                summary.fetched += 1;
                summary.observations += observations.len();
                all_obs.extend(observations);
            }
            Ok(FetchOutcome::NotFound) => {
                info!("No {} data for {}", element, site.triplet);
                summary.not_found += 1;
            }
            Ok(FetchOutcome::TransientFailure(reason)) => {
                warn!(
                    "Skipping {} after {} retries: {}",
                    site.triplet, retries, reason
                );
                summary.failed += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", site.triplet, e);
                summary.failed += 1;
            }
        }
    }

    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    write_observations_csv(BufWriter::new(file), &all_obs)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    summary.log();
    info!("Observations written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn site(begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Site {
        Site {
            triplet: "335:CO:SNTL".to_string(),
            name: "Berthoud Summit".to_string(),
            state: "CO".to_string(),
            network: "SNTL".to_string(),
            county: None,
            huc: None,
            elevation_ft: Some(11300.0),
            latitude: 39.8,
            longitude: -105.78,
            data_time_zone: Some(-7.0),
            begin_date: begin,
            end_date: end,
        }
    }

    #[test]
    fn test_site_range_clips_to_record() {
        let range = DateRange(d(1970, 10, 1), d(2023, 9, 30));
        let clipped = site_range(&site(Some(d(1978, 10, 1)), None), &range).unwrap();
        assert_eq!(clipped, DateRange(d(1978, 10, 1), d(2023, 9, 30)));

        let clipped = site_range(&site(None, Some(d(2001, 6, 1))), &range).unwrap();
        assert_eq!(clipped, DateRange(d(1970, 10, 1), d(2001, 6, 1)));

        let unbounded = site_range(&site(None, None), &range).unwrap();
        assert_eq!(unbounded, range);
    }

    #[test]
    fn test_site_range_without_overlap() {
        let range = DateRange(d(2020, 10, 1), d(2021, 9, 30));
        assert_eq!(site_range(&site(None, Some(d(2010, 1, 1))), &range), None);
        assert_eq!(site_range(&site(Some(d(2022, 1, 1)), None), &range), None);
    }

    #[test]
    fn test_summary_defaults() {
        let summary = FetchSummary {
            total: 3,
            fetched: 2,
            not_found: 1,
            ..Default::default()
        };
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.observations, 0);
        summary.log();
    }
}
