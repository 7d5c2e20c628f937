//! Command implementations for the SNOTEL CLI.
//!
//! Provides subcommands for listing and filtering sites, fetching daily
//! observations, and computing day-of-water-year normals.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use snotel_core::client::{ClientConfig, DEFAULT_BASE_URL};
use snotel_core::element::Element;
use snotel_core::site::SNOTEL_NETWORK;
use snotel_utils::dates::parse_date;
use std::path::PathBuf;
use std::time::Duration;

pub mod dowy;
pub mod fetch;
pub mod normals;
pub mod retry;
pub mod sites;

/// Connection options shared by every subcommand that talks to AWDB.
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// Base URL of the AWDB REST service
    #[arg(long, env = "SNOTEL_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,

    /// Pause between consecutive requests in milliseconds
    #[arg(long, default_value_t = 500, global = true)]
    pub pause_ms: u64,
}

impl ApiArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.timeout_secs),
            request_pause: Duration::from_millis(self.pause_ms),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List stations of a network and write the ones passing the filters as GeoJSON
    Sites {
        /// Network code
        #[arg(long, default_value = SNOTEL_NETWORK)]
        network: String,

        /// Two-letter state code
        #[arg(long)]
        state: Option<String>,

        /// Keep sites inside "min_lon,min_lat,max_lon,max_lat"
        #[arg(long)]
        bbox: Option<String>,

        /// Keep sites inside the polygons of a GeoJSON file
        #[arg(long)]
        region: Option<PathBuf>,

        /// Keep sites whose name contains this text (case-insensitive)
        #[arg(long)]
        name: Option<String>,

        /// Keep sites at or above this elevation in feet
        #[arg(long)]
        min_elevation: Option<f64>,

        /// Include stations that no longer report
        #[arg(long)]
        include_inactive: bool,

        /// Filter an existing sites GeoJSON file instead of querying AWDB
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Retries for transient failures
        #[arg(long, default_value_t = 2)]
        retries: u32,

        /// Output path for the sites GeoJSON
        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Fetch daily observations for every site in a sites GeoJSON file
    Fetch {
        /// Sites GeoJSON written by `sites`
        #[arg(short = 's', long)]
        sites: PathBuf,

        /// Element code (WTEQ, SNWD, PREC, TAVG)
        #[arg(short = 'e', long, default_value = "WTEQ")]
        element: Element,

        /// First day to fetch (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        begin: NaiveDate,

        /// Last day to fetch (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Retries per site for transient failures
        #[arg(long, default_value_t = 2)]
        retries: u32,

        /// Output path for the observations CSV
        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Compute day-of-water-year normals and percent of normal for one site
    Normals {
        /// Observations CSV written by `fetch`
        #[arg(long)]
        observations: PathBuf,

        /// Station triplet, e.g. 335:CO:SNTL
        #[arg(long)]
        site: String,

        /// Element code
        #[arg(short = 'e', long, default_value = "WTEQ")]
        element: Element,

        /// Reference date (YYYY-MM-DD), defaults to the latest observation
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Leave the reference date's water year out of the baseline
        #[arg(long)]
        exclude_current: bool,

        /// Output path for the per-day normals CSV
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// Print the water year and day of water year of a date
    Dowy {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

pub async fn run(api: &ApiArgs, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Sites {
            network,
            state,
            bbox,
            region,
            name,
            min_elevation,
            include_inactive,
            input,
            retries,
            out,
        } => {
            let filter = sites::build_filter(
                bbox.as_deref(),
                region.as_deref(),
                name,
                min_elevation,
            )?;
            let source = match input {
                Some(path) => sites::SiteSource::File(path),
                None => sites::SiteSource::Service {
                    network,
                    state,
                    active_only: !include_inactive,
                    retries,
                },
            };
            sites::run_sites(api, source, &filter, &out).await
        }
        Command::Fetch {
            sites,
            element,
            begin,
            end,
            retries,
            out,
        } => fetch::run_fetch(api, &sites, element, begin, end, retries, &out).await,
        Command::Normals {
            observations,
            site,
            element,
            date,
            exclude_current,
            out,
        } => normals::run_normals(
            &observations,
            &site,
            element,
            date,
            exclude_current,
            out.as_deref(),
        ),
        Command::Dowy { date } => {
            dowy::run_dowy(date);
            Ok(())
        }
    }
}
