//! Dataset validation report.
//!
//! Decodes every indexed composite in a year range and reports pixel
//! counts, summary statistics, decode failures, monthly coverage per year
//! and files whose valid-pixel count falls in the bottom decile.

use std::collections::BTreeSet;
use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};
use ndvi_common::{NdviError, NdviResult, YearMonth};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::geotiff::{PixelClass, RasterComposite};
use crate::statistics::RasterStatistics;
use crate::store::RasterStore;

/// Files below this quantile of valid-pixel counts are flagged.
pub const LOW_COVERAGE_QUANTILE: f64 = 0.1;

/// Pixel counts of one composite by classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PixelCensus {
    pub pixel_count: usize,
    pub valid_count: usize,
    pub nodata_count: usize,
    pub invalid_range_count: usize,
}

impl PixelCensus {
    pub fn compute(raster: &RasterComposite) -> Self {
        (0..raster.pixel_count())
            .into_par_iter()
            .fold(Self::default, |mut census, i| {
                census.pixel_count += 1;
                match raster.classify(i) {
                    PixelClass::Valid(_) => census.valid_count += 1,
                    PixelClass::NoData => census.nodata_count += 1,
                    PixelClass::OutOfRange => census.invalid_range_count += 1,
                }
                census
            })
            .reduce(Self::default, |a, b| Self {
                pixel_count: a.pixel_count + b.pixel_count,
                valid_count: a.valid_count + b.valid_count,
                nodata_count: a.nodata_count + b.nodata_count,
                invalid_range_count: a.invalid_range_count + b.invalid_range_count,
            })
    }
}

/// Properties of a composite that decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDetails {
    pub width: usize,
    pub height: usize,
    pub crs: String,
    pub dtype: &'static str,
    #[serde(flatten)]
    pub census: PixelCensus,
    pub statistics: RasterStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
}

/// Validation outcome of one indexed composite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub year: i32,
    pub month: u32,
    /// Path relative to the data directory.
    pub file: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub details: Option<FileDetails>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }
}

/// Readable and missing months of one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCoverage {
    pub year: i32,
    pub months: Vec<u32>,
    pub missing_months: Vec<u32>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub total_files: usize,
    pub valid_files: usize,
    pub error_files: Vec<String>,
    pub coverage: Vec<YearCoverage>,
    /// Mean valid-pixel count over readable files.
    pub average_valid_pixels: Option<f64>,
    /// Mean of the per-file NDVI means.
    pub average_ndvi: Option<f64>,
    pub ndvi_min: Option<f64>,
    pub ndvi_max: Option<f64>,
    pub low_coverage_threshold: Option<f64>,
    pub low_coverage_files: Vec<String>,
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Summarise per-file reports. `years` bounds the coverage table; each
    /// year in it appears even without any file.
    pub fn build(years: Option<(i32, i32)>, files: Vec<FileReport>) -> Self {
        let ok: Vec<&FileReport> = files.iter().filter(|f| f.is_ok()).collect();
        let details: Vec<&FileDetails> = ok.iter().filter_map(|f| f.details.as_ref()).collect();

        let error_files = files
            .iter()
            .filter(|f| !f.is_ok())
            .map(|f| f.file.clone())
            .collect();

        let readable: BTreeSet<YearMonth> = ok
            .iter()
            .filter_map(|f| YearMonth::new(f.year, f.month).ok())
            .collect();
        let coverage = match years {
            Some((start, end)) => year_coverage(start, end, &readable),
            None => match (files.first(), files.last()) {
                (Some(first), Some(last)) => year_coverage(first.year, last.year, &readable),
                _ => Vec::new(),
            },
        };

        let valid_counts: Vec<f64> = details.iter().map(|d| d.census.valid_count as f64).collect();
        let average_valid_pixels = mean(&valid_counts);

        let means: Vec<f64> = details.iter().filter_map(|d| d.statistics.mean).collect();
        let average_ndvi = mean(&means);
        let ndvi_min = details
            .iter()
            .filter_map(|d| d.statistics.min)
            .reduce(f64::min);
        let ndvi_max = details
            .iter()
            .filter_map(|d| d.statistics.max)
            .reduce(f64::max);

        let mut sorted = valid_counts;
        sorted.sort_by(f64::total_cmp);
        let low_coverage_threshold = quantile(&sorted, LOW_COVERAGE_QUANTILE);
        let low_coverage_files = match low_coverage_threshold {
            Some(threshold) => ok
                .iter()
                .filter(|f| {
                    f.details
                        .as_ref()
                        .is_some_and(|d| (d.census.valid_count as f64) < threshold)
                })
                .map(|f| f.file.clone())
                .collect(),
            None => Vec::new(),
        };
        let valid_files = ok.len();

        Self {
            start_year: years.map(|(s, _)| s),
            end_year: years.map(|(_, e)| e),
            total_files: files.len(),
            valid_files,
            error_files,
            coverage,
            average_valid_pixels,
            average_ndvi,
            ndvi_min,
            ndvi_max,
            low_coverage_threshold,
            low_coverage_files,
            files,
        }
    }
}

fn year_coverage(start: i32, end: i32, readable: &BTreeSet<YearMonth>) -> Vec<YearCoverage> {
    (start..=end)
        .map(|year| {
            let (months, missing_months): (Vec<u32>, Vec<u32>) =
                (1..=12).partition(|&month| readable.contains(&YearMonth { year, month }));
            YearCoverage {
                year,
                complete: missing_months.is_empty(),
                months,
                missing_months,
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linearly interpolated quantile of an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

fn display_path(path: &Path, data_dir: &Path) -> String {
    path.strip_prefix(data_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}

impl RasterStore {
    /// Validate every indexed composite, optionally limited to an
    /// inclusive year range.
    ///
    /// Files that fail to decode are reported, not propagated. A file that
    /// vanished after indexing is left out.
    pub async fn validate(&self, years: Option<(i32, i32)>) -> NdviResult<ValidationReport> {
        let index = self.file_index().await?;
        let periods: Vec<YearMonth> = match years {
            Some((start, end)) => index.periods_in_years(start, end),
            None => index.periods().collect(),
        };
        let concurrency = self.config().read_concurrency.max(1);
        info!(files = periods.len(), ?years, "Validating NDVI composites");

        let index = &index;
        let reports: Vec<Option<FileReport>> = stream::iter(periods)
            .map(|period| async move {
                let Some(path) = index.get(&period) else {
                    return Ok(None);
                };
                let file = display_path(path, self.data_dir());
                let mut report = FileReport {
                    year: period.year,
                    month: period.month,
                    file,
                    status: FileStatus::Ok,
                    error: None,
                    details: None,
                };

                match self.open_indexed(index, period).await {
                    Ok(raster) => {
                        let details = tokio::task::spawn_blocking(move || FileDetails {
                            width: raster.width(),
                            height: raster.height(),
                            crs: raster.crs().to_string(),
                            dtype: raster.samples().dtype(),
                            census: PixelCensus::compute(&raster),
                            statistics: RasterStatistics::compute(&raster),
                        })
                        .await
                        .map_err(|e| {
                            NdviError::Internal(format!("validation task failed: {}", e))
                        })?;
                        report.details = Some(details);
                    }
                    Err(NdviError::NotFound(_)) => return Ok(None),
                    Err(e @ NdviError::Internal(_)) => return Err(e),
                    Err(e) => {
                        warn!(file = %report.file, error = %e, "Composite failed validation");
                        report.status = FileStatus::Error;
                        report.error = Some(e.to_string());
                    }
                }
                Ok::<_, NdviError>(Some(report))
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        let report = ValidationReport::build(years, reports.into_iter().flatten().collect());
        info!(
            total = report.total_files,
            valid = report.valid_files,
            errors = report.error_files.len(),
            low_coverage = report.low_coverage_files.len(),
            "Validated NDVI composites"
        );
        Ok(report)
    }
}
