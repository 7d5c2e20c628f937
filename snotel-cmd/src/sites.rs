//! Site listing and geographic filtering.

use crate::retry::with_retries;
use crate::ApiArgs;
use anyhow::{bail, Context};
use log::{info, warn};
use snotel_core::client::{AwdbClient, FetchOutcome};
use snotel_core::site::Site;
use snotel_geo::geojson_io::{read_region, sites_from_geojson, sites_to_geojson};
use snotel_geo::{BoundingBox, SiteFilter};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the unfiltered site list comes from.
#[derive(Debug, Clone)]
pub enum SiteSource {
    /// A sites GeoJSON file written by an earlier run
    File(PathBuf),
    Service {
        network: String,
        state: Option<String>,
        active_only: bool,
        retries: u32,
    },
}

pub fn build_filter(
    bbox: Option<&str>,
    region: Option<&Path>,
    name: Option<String>,
    min_elevation_ft: Option<f64>,
) -> anyhow::Result<SiteFilter> {
    let bbox = bbox
        .map(|text| text.parse::<BoundingBox>())
        .transpose()
        .context("Invalid --bbox")?;
    let region = match region {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read region file {}", path.display()))?;
            let region = read_region(&text)
                .with_context(|| format!("Failed to load region from {}", path.display()))?;
            info!(
                "Loaded region {} from {}",
                region.name.as_deref().unwrap_or("(unnamed)"),
                path.display()
            );
            Some(region)
        }
        None => None,
    };
    Ok(SiteFilter {
        bbox,
        region,
        name_contains: name.filter(|n| !n.trim().is_empty()),
        min_elevation_ft,
    })
}

pub fn read_sites_file(path: &Path) -> anyhow::Result<Vec<Site>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sites file {}", path.display()))?;
    sites_from_geojson(&text).with_context(|| format!("Failed to parse sites from {}", path.display()))
}

async fn load_sites(api: &ApiArgs, source: SiteSource) -> anyhow::Result<Vec<Site>> {
    let (network, state, active_only, retries) = match source {
        SiteSource::File(path) => return read_sites_file(&path),
        SiteSource::Service {
            network,
            state,
            active_only,
            retries,
        } => (network, state, active_only, retries),
    };
    let client = AwdbClient::new(api.client_config())?;
    let scope = match &state {
        Some(state) => format!("{network} stations in {state}"),
        None => format!("{network} stations"),
    };
    info!("Querying {}", scope);
    let outcome = with_retries(&scope, retries, client.config().request_pause, || {
        client.fetch_sites(&network, state.as_deref(), active_only)
    })
    .await?;
    match outcome {
        FetchOutcome::Success(sites) => Ok(sites),
        FetchOutcome::NotFound => bail!("No {} found", scope),
        FetchOutcome::TransientFailure(reason) => {
            bail!("AWDB unavailable while listing {}: {}", scope, reason)
        }
    }
}

/// Load sites, apply `filter` and write the survivors to `out` as GeoJSON.
pub async fn run_sites(
    api: &ApiArgs,
    source: SiteSource,
    filter: &SiteFilter,
    out: &Path,
) -> anyhow::Result<()> {
    let sites = load_sites(api, source).await?;
    let kept = filter.apply(&sites);
    info!("{} of {} sites pass the filters", kept.len(), sites.len());
    if kept.is_empty() {
        warn!("No sites matched; writing an empty collection");
    }
    let geojson = sites_to_geojson(&kept)?;
    fs::write(out, geojson).with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Sites written to {}", out.display());
    Ok(())
}
