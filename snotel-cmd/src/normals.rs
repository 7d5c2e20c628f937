//! Day-of-water-year normals and percent of normal for one site.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use log::info;
use snotel_core::element::Element;
use snotel_core::observation::{read_observations_csv, Observation};
use snotel_core::water_year::{day_of_water_year, water_year_for_date};
use snotel_stats::normals::write_normals_csv;
use snotel_stats::water_year_stats::{sort_by_wettest, water_year_statistics};
use snotel_stats::{
    observed_on, percent_of_normal_on, HistoricalNormals, PercentOfNormal, WaterYearStatistics,
};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Everything `normals` reports for one site and element.
#[derive(Debug)]
pub struct NormalsReport {
    pub site: String,
    pub element: Element,
    pub reference_date: NaiveDate,
    pub water_year: i32,
    pub day_of_water_year: u32,
    pub observed: Option<f64>,
    pub median: Option<f64>,
    pub percent: PercentOfNormal,
    pub normals: HistoricalNormals,
    /// Wettest first
    pub statistics: Vec<WaterYearStatistics>,
}

/// Build the report from the site's series. The reference date defaults to
/// the latest observation; `None` when the series is empty.
pub fn build_report(
    site: &str,
    element: Element,
    series: &[Observation],
    reference_date: Option<NaiveDate>,
    exclude_current: bool,
) -> Option<NormalsReport> {
    let reference_date = match reference_date {
        Some(date) => date,
        None => series.iter().map(|o| o.timestamp).max()?.date_naive(),
    };
    let water_year = water_year_for_date(reference_date);
    let dowy = day_of_water_year(reference_date);

    let normals = if exclude_current {
        HistoricalNormals::excluding_water_year(series, water_year)
    } else {
        HistoricalNormals::from_observations(series)
    };
    let percent = percent_of_normal_on(reference_date, series, &normals);
    let observed = observed_on(reference_date, series);

    let mut statistics = water_year_statistics(series);
    sort_by_wettest(&mut statistics);

    Some(NormalsReport {
        site: site.to_string(),
        element,
        reference_date,
        water_year,
        day_of_water_year: dowy,
        observed,
        median: normals.for_day(dowy).median(),
        percent,
        normals,
        statistics,
    })
}

impl fmt::Display for NormalsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.element.units();
        writeln!(
            f,
            "{} {} on {} (water year {}, day {})",
            self.site, self.element, self.reference_date, self.water_year, self.day_of_water_year
        )?;
        match self.observed {
            Some(v) => writeln!(f, "  observed: {v:.1} {units}")?,
            None => writeln!(f, "  observed: missing")?,
        }
        match self.median {
            Some(v) => writeln!(f, "  median:   {v:.1} {units}")?,
            None => writeln!(f, "  median:   none")?,
        }
        writeln!(f, "  percent of normal: {}", self.percent)?;
        writeln!(f)?;
        writeln!(f, "Water year   lowest (date)            highest (date)")?;
        for stats in &self.statistics {
            let mut marks = Vec::new();
            if stats.is_wettest_in(&self.statistics) {
                marks.push("wettest");
            }
            if stats.is_driest_in(&self.statistics) {
                marks.push("driest");
            }
            writeln!(
                f,
                "{:<12} {:>6.1} ({})  {:>8.1} ({})  {}",
                stats.water_year,
                stats.lowest_value,
                stats.date_lowest,
                stats.highest_value,
                stats.date_highest,
                marks.join(", ")
            )?;
        }
        Ok(())
    }
}

pub fn run_normals(
    observations_path: &Path,
    site: &str,
    element: Element,
    reference_date: Option<NaiveDate>,
    exclude_current: bool,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let file = File::open(observations_path)
        .with_context(|| format!("Failed to open {}", observations_path.display()))?;
    let all = read_observations_csv(file)
        .with_context(|| format!("Failed to read {}", observations_path.display()))?;
    let series: Vec<Observation> = Observation::series(&all, site, element)
        .into_iter()
        .cloned()
        .collect();
    info!(
        "{} {} observations for {} in {}",
        series.len(),
        element,
        site,
        observations_path.display()
    );

    let Some(report) = build_report(site, element, &series, reference_date, exclude_current)
    else {
        bail!("No {} observations for {}", element, site);
    };

    if let Some(out) = out {
        let file =
            File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
        write_normals_csv(BufWriter::new(file), &report.normals)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!("Normals for {} days written to {}", report.normals.len(), out.display());
    }
    print!("{report}");
    Ok(())
}
