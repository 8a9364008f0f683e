//! Point-in-time yield summaries.
//!
//! A [`YieldSummary`] is derived from one [`AcquisitionSnapshot`] per cycle
//! and never carried over to the next one.

use std::time::{Duration, SystemTime};

use serde::Serialize;

use super::model::{AcquisitionSnapshot, Histogram};
use crate::error::SummaryError;
use crate::source::{HistogramKind, HistogramRequest};

/// How summaries and their histograms are produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    /// Bucket reads by count instead of by bases.
    pub use_read_counts: bool,
    /// Percentage of reads discarded from each histogram tail.
    pub discard_outlier_percent: f64,
    /// Plot histograms on log10(x + 1) axes.
    pub log_scale: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            use_read_counts: false,
            discard_outlier_percent: 0.25,
            log_scale: false,
        }
    }
}

impl SummaryOptions {
    pub fn histogram_kind(&self) -> HistogramKind {
        if self.use_read_counts {
            HistogramKind::ReadCounts
        } else {
            HistogramKind::ReadLengths
        }
    }

    /// The histogram to ask the instrument for.
    pub fn histogram_request(&self) -> HistogramRequest {
        HistogramRequest {
            kind: self.histogram_kind(),
            discard_outliers_percent: self.discard_outlier_percent,
        }
    }
}

/// Histogram ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub kind: HistogramKind,
    /// Whether both axes were transformed with log10(x + 1).
    pub log_scale: bool,
    pub starts: Vec<f64>,
    pub values: Vec<f64>,
}

impl HistogramSeries {
    pub fn new(histogram: &Histogram, kind: HistogramKind, log_scale: bool) -> Self {
        let (starts, values) = if log_scale {
            log_axes(&histogram.starts, &histogram.values)
        } else {
            (
                histogram.starts.iter().map(|&s| s as f64).collect(),
                histogram.values.iter().map(|&v| v as f64).collect(),
            )
        };
        Self {
            kind,
            log_scale,
            starts,
            values,
        }
    }

    /// `(start, value)` pairs.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.starts.iter().copied().zip(self.values.iter().copied()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Largest value, or 0 for an empty histogram.
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

/// Headline figures for one running position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldSummary {
    pub run_id: String,
    pub sample_id: String,
    pub flow_cell_id: String,
    pub flow_cell_type: Option<String>,
    pub kit: Option<String>,
    /// Time since run start, `HHh:MMm`.
    pub elapsed: String,
    /// Estimated selected bases in gigabases.
    pub yield_gb: f64,
    /// Bytes written to disk in gigabytes.
    pub written_gb: f64,
    pub read_count: u64,
    pub n50: f64,
    pub histogram: HistogramSeries,
}

/// Derive the summary for a running snapshot at wall-clock time `now`.
///
/// Fails with the path of the first absent field, or if the run is not
/// active.
pub fn summarize(
    snapshot: &AcquisitionSnapshot,
    options: &SummaryOptions,
    now: SystemTime,
) -> Result<YieldSummary, SummaryError> {
    if !snapshot.status().is_running() {
        return Err(SummaryError::NotRunning(snapshot.status().to_string()));
    }

    let elapsed = now.duration_since(snapshot.start_time()?).unwrap_or(Duration::ZERO);
    let sample = snapshot.sample();

    Ok(YieldSummary {
        run_id: snapshot.run_id()?.to_string(),
        sample_id: sample.sample_id()?.to_string(),
        flow_cell_id: sample.flow_cell_id()?.to_string(),
        flow_cell_type: sample.flow_cell_type.clone(),
        kit: sample.kit.clone(),
        elapsed: format_elapsed(elapsed),
        yield_gb: round2(snapshot.estimated_selected_bases()? as f64 / 1e9),
        written_gb: round2(snapshot.bytes_written()? as f64 / 1e9),
        read_count: snapshot.read_count()?,
        n50: snapshot.n50()?,
        histogram: HistogramSeries::new(
            snapshot.histogram()?,
            options.histogram_kind(),
            options.log_scale,
        ),
    })
}

/// Format as zero-padded `HHh:MMm`. Hours are not capped.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}h:{:02}m", secs / 3600, (secs % 3600) / 60)
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Apply log10(x + 1) to both axes so empty buckets stay plottable.
pub fn log_axes(starts: &[u64], values: &[u64]) -> (Vec<f64>, Vec<f64>) {
    let transform = |x: &u64| (*x as f64 + 1.0).log10();
    (
        starts.iter().map(transform).collect(),
        values.iter().map(transform).collect(),
    )
}
