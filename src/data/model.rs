//! Typed acquisition snapshots.
//!
//! Vendor responses are normalized into [`AcquisitionSnapshot`] values whose
//! fields are individually optional. Each field has an accessor that reports
//! its own absence as a [`FieldMissing`] carrying the field path, so callers
//! never rely on a catch-all lookup failure.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::FieldMissing;
use crate::source::raw::{RawHistogram, RawPositionReport, RawTimestamp};

/// A named hardware slot on the instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    name: String,
}

impl Position {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Acquisition state of a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    NotRunning,
    Running,
    /// Any other state reported by the instrument (starting, finishing, ...).
    Other(String),
}

impl RunStatus {
    /// Parse a wire status string. Case and separators are not significant.
    pub fn parse(status: &str) -> Self {
        let normalized = status.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "running" | "acquisition_running" => RunStatus::Running,
            "not_running" | "idle" | "ready" => RunStatus::NotRunning,
            _ => RunStatus::Other(status.trim().to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::NotRunning => f.write_str("not running"),
            RunStatus::Running => f.write_str("running"),
            RunStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Bucketed read histogram: bucket start offsets and one value per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    pub starts: Vec<u64>,
    pub values: Vec<u64>,
}

impl Histogram {
    /// Build from the wire shape. Extra ranges or values beyond the shorter
    /// of the two sequences are dropped.
    pub fn from_raw(raw: &RawHistogram) -> Self {
        let len = raw.bucket_ranges.len().min(raw.bucket_values.len());
        if raw.bucket_ranges.len() != raw.bucket_values.len() {
            tracing::debug!(
                ranges = raw.bucket_ranges.len(),
                values = raw.bucket_values.len(),
                "Histogram length mismatch, truncating"
            );
        }
        Self {
            starts: raw.bucket_ranges[..len].iter().map(|r| r.start).collect(),
            values: raw.bucket_values[..len].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Sample and flow cell details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleMetadata {
    sample_id: Option<String>,
    flow_cell_id: Option<String>,
    /// Flow cell product code. Older firmware does not report it.
    pub flow_cell_type: Option<String>,
    /// Sequencing kit. Not every protocol declares one.
    pub kit: Option<String>,
}

impl SampleMetadata {
    pub fn sample_id(&self) -> Result<&str, FieldMissing> {
        self.sample_id.as_deref().ok_or_else(|| FieldMissing::new("protocol.sample_id"))
    }

    pub fn flow_cell_id(&self) -> Result<&str, FieldMissing> {
        self.flow_cell_id.as_deref().ok_or_else(|| FieldMissing::new("protocol.flow_cell_id"))
    }
}

/// A point-in-time read of one position's active run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSnapshot {
    position: Position,
    status: RunStatus,
    run_id: Option<String>,
    start_time: Option<SystemTime>,
    estimated_selected_bases: Option<u64>,
    read_count: Option<u64>,
    bytes_written: Option<u64>,
    n50: Option<f64>,
    histogram: Option<Histogram>,
    sample: SampleMetadata,
}

impl AcquisitionSnapshot {
    /// Normalize a raw report. Nothing is required here; absence surfaces
    /// through the accessors.
    pub fn from_report(position: Position, report: &RawPositionReport) -> Self {
        let status = report
            .status
            .as_deref()
            .map(RunStatus::parse)
            .unwrap_or_else(|| RunStatus::Other("unknown".to_string()));

        let acquisition = report.acquisition.as_ref();
        let yields = acquisition.and_then(|a| a.yield_summary.as_ref());
        let protocol = report.protocol.as_ref();

        Self {
            position,
            status,
            run_id: acquisition.and_then(|a| a.run_id.clone()),
            start_time: acquisition.and_then(|a| a.start_time).map(to_system_time),
            estimated_selected_bases: yields.and_then(|y| y.estimated_selected_bases),
            read_count: yields.and_then(|y| y.read_count),
            bytes_written: acquisition
                .and_then(|a| a.writer_summary.as_ref())
                .and_then(|w| w.bytes_to_write_completed),
            n50: report.n50,
            histogram: report.histogram.as_ref().map(Histogram::from_raw),
            sample: SampleMetadata {
                sample_id: protocol.and_then(|p| p.sample_id.clone()),
                flow_cell_id: protocol.and_then(|p| p.flow_cell_id.clone()),
                flow_cell_type: protocol.and_then(|p| p.flow_cell_product_code.clone()),
                kit: protocol.and_then(|p| p.kit.clone()),
            },
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn run_id(&self) -> Result<&str, FieldMissing> {
        self.run_id.as_deref().ok_or_else(|| FieldMissing::new("acquisition.run_id"))
    }

    pub fn start_time(&self) -> Result<SystemTime, FieldMissing> {
        self.start_time.ok_or_else(|| FieldMissing::new("acquisition.start_time"))
    }

    pub fn estimated_selected_bases(&self) -> Result<u64, FieldMissing> {
        self.estimated_selected_bases
            .ok_or_else(|| FieldMissing::new("acquisition.yield_summary.estimated_selected_bases"))
    }

    pub fn read_count(&self) -> Result<u64, FieldMissing> {
        self.read_count.ok_or_else(|| FieldMissing::new("acquisition.yield_summary.read_count"))
    }

    pub fn bytes_written(&self) -> Result<u64, FieldMissing> {
        self.bytes_written
            .ok_or_else(|| FieldMissing::new("acquisition.writer_summary.bytes_to_write_completed"))
    }

    pub fn n50(&self) -> Result<f64, FieldMissing> {
        self.n50.ok_or_else(|| FieldMissing::new("n50"))
    }

    pub fn histogram(&self) -> Result<&Histogram, FieldMissing> {
        self.histogram.as_ref().ok_or_else(|| FieldMissing::new("histogram"))
    }

    pub fn sample(&self) -> &SampleMetadata {
        &self.sample
    }
}

fn to_system_time(ts: RawTimestamp) -> SystemTime {
    let nanos = Duration::from_nanos(u64::from(ts.nanos));
    if ts.seconds >= 0 {
        UNIX_EPOCH + Duration::from_secs(ts.seconds as u64) + nanos
    } else {
        UNIX_EPOCH - Duration::from_secs(ts.seconds.unsigned_abs()) + nanos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> RawPositionReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_run_status_parse() {
        assert_eq!(RunStatus::parse("running"), RunStatus::Running);
        assert_eq!(RunStatus::parse("ACQUISITION_RUNNING"), RunStatus::Running);
        assert_eq!(RunStatus::parse("not-running"), RunStatus::NotRunning);
        assert_eq!(
            RunStatus::parse("Finishing"),
            RunStatus::Other("Finishing".to_string())
        );
    }

    #[test]
    fn test_snapshot_accessors_report_paths() {
        let snapshot = AcquisitionSnapshot::from_report(
            Position::new("X1"),
            &report(r#"{ "status": "running", "acquisition": { "run_id": "r1" } }"#),
        );

        assert!(snapshot.status().is_running());
        assert_eq!(snapshot.run_id(), Ok("r1"));
        assert_eq!(
            snapshot.start_time().unwrap_err().path,
            "acquisition.start_time"
        );
        assert_eq!(
            snapshot.read_count().unwrap_err().path,
            "acquisition.yield_summary.read_count"
        );
        assert_eq!(snapshot.n50().unwrap_err().path, "n50");
        assert_eq!(
            snapshot.sample().sample_id().unwrap_err().path,
            "protocol.sample_id"
        );
    }

    #[test]
    fn test_missing_status_is_other() {
        let snapshot = AcquisitionSnapshot::from_report(Position::new("X1"), &report("{}"));
        assert_eq!(snapshot.status(), &RunStatus::Other("unknown".to_string()));
    }

    #[test]
    fn test_start_time_conversion() {
        let snapshot = AcquisitionSnapshot::from_report(
            Position::new("X1"),
            &report(r#"{ "acquisition": { "start_time": { "seconds": 100, "nanos": 500 } } }"#),
        );
        let start = snapshot.start_time().unwrap();
        assert_eq!(
            start.duration_since(UNIX_EPOCH).unwrap(),
            Duration::new(100, 500)
        );
    }

    #[test]
    fn test_histogram_truncates_to_shorter() {
        let snapshot = AcquisitionSnapshot::from_report(
            Position::new("X1"),
            &report(
                r#"{ "histogram": {
                    "bucket_ranges": [{ "start": 0, "end": 10 }, { "start": 10, "end": 20 }],
                    "bucket_values": [5]
                } }"#,
            ),
        );
        let histogram = snapshot.histogram().unwrap();
        assert_eq!(histogram.starts, vec![0]);
        assert_eq!(histogram.values, vec![5]);
    }
}
