//! Wire shapes for position reports.
//!
//! These types mirror what the control server (or a dump of it) returns.
//! Every field is optional because presence varies between firmware and
//! gateway versions; normalization into typed snapshots happens in
//! [`crate::data::fetch`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{HistogramKind, HistogramRequest};

/// Everything known about one position, read in a single round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPositionReport {
    /// Acquisition state, e.g. `"running"` or `"not_running"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition: Option<RawAcquisition>,

    /// N50 as computed by the instrument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n50: Option<f64>,

    /// Histogram of the requested kind, with outliers already discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<RawHistogram>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<RawProtocolInfo>,

    /// Full mux scan history of the current run.
    #[serde(default)]
    pub mux_scans: Vec<RawMuxScan>,
}

/// Acquisition run information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAcquisition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<RawTimestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_summary: Option<RawYieldSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer_summary: Option<RawWriterSummary>,
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawYieldSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_selected_bases: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWriterSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_to_write_completed: Option<u64>,
}

/// Bucketed histogram: one range per value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistogram {
    #[serde(default)]
    pub bucket_ranges: Vec<RawBucketRange>,
    #[serde(default)]
    pub bucket_values: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBucketRange {
    pub start: u64,
    pub end: u64,
}

/// Sample and flow cell details from the running protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProtocolInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_cell_product_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_cell_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit: Option<String>,
}

/// One pore-category census, keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMuxScan {
    /// Seconds since the start of the run.
    pub timestamp: u64,
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

/// A position as stored in an instrument dump or scripted in memory.
///
/// Both histogram kinds are kept so that either can be served on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition: Option<RawAcquisition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_length_histogram: Option<RawHistogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_count_histogram: Option<RawHistogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<RawProtocolInfo>,
    #[serde(default)]
    pub mux_scans: Vec<RawMuxScan>,
}

impl PositionRecord {
    /// Answer a report request the way the control server would.
    pub fn report(&self, request: &HistogramRequest) -> RawPositionReport {
        let histogram = match request.kind {
            HistogramKind::ReadLengths => self.read_length_histogram.as_ref(),
            HistogramKind::ReadCounts => self.read_count_histogram.as_ref(),
        };

        RawPositionReport {
            status: self.status.clone(),
            acquisition: self.acquisition.clone(),
            n50: self.n50,
            histogram: histogram.map(|h| discard_outliers(h, request.discard_outliers_percent)),
            protocol: self.protocol.clone(),
            mux_scans: self.mux_scans.clone(),
        }
    }
}

/// Trim buckets from both ends of a histogram while the trimmed mass stays
/// within `percent` of the total.
pub fn discard_outliers(histogram: &RawHistogram, percent: f64) -> RawHistogram {
    let len = histogram.bucket_ranges.len().min(histogram.bucket_values.len());
    let values = &histogram.bucket_values[..len];
    // Bucket values may be near u64::MAX
    let total: u128 = values.iter().map(|&v| u128::from(v)).sum();
    let budget = total as f64 * percent / 100.0;

    let mut first = 0;
    let mut trimmed = 0u128;
    while first < len && (trimmed + u128::from(values[first])) as f64 <= budget {
        trimmed += u128::from(values[first]);
        first += 1;
    }

    let mut last = len;
    let mut trimmed = 0u128;
    while last > first && (trimmed + u128::from(values[last - 1])) as f64 <= budget {
        trimmed += u128::from(values[last - 1]);
        last -= 1;
    }

    RawHistogram {
        bucket_ranges: histogram.bucket_ranges[first..last].to_vec(),
        bucket_values: values[first..last].to_vec(),
    }
}
