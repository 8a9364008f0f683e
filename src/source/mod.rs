//! Instrument abstraction for reading position state.
//!
//! This module provides a trait-based abstraction over the sequencing
//! instrument's control server. The polling loop only ever talks to an
//! [`Instrument`]; concrete backends read a JSON dump from disk, query an
//! HTTP gateway, or serve scripted records from memory.

mod file;
mod http;
mod memory;
pub mod raw;

pub use file::FileInstrument;
pub use http::{HttpInstrument, HttpInstrumentBuilder};
pub use memory::MemoryInstrument;
pub use raw::{PositionRecord, RawMuxScan, RawPositionReport};

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::data::Position;
use crate::error::SourceError;

/// Bucketing used for the read histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramKind {
    /// Bases per read-length bucket.
    #[default]
    ReadLengths,
    /// Reads per read-length bucket.
    ReadCounts,
}

impl HistogramKind {
    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistogramKind::ReadLengths => "read_lengths",
            HistogramKind::ReadCounts => "read_counts",
        }
    }
}

impl fmt::Display for HistogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for the histogram carried in a position report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramRequest {
    pub kind: HistogramKind,
    /// Percentage of reads to drop from each tail before bucketing.
    pub discard_outliers_percent: f64,
}

impl Default for HistogramRequest {
    fn default() -> Self {
        Self {
            kind: HistogramKind::ReadLengths,
            discard_outliers_percent: 0.25,
        }
    }
}

/// Trait for querying a sequencing instrument.
///
/// Calls are blocking. A report is read in one round trip so that status,
/// yield and mux scan history always describe the same moment.
///
/// # Example
///
/// ```
/// use poretop::source::{HistogramRequest, Instrument, MemoryInstrument, PositionRecord};
///
/// let mut instrument = MemoryInstrument::new(vec![PositionRecord {
///     name: "X1".to_string(),
///     status: Some("not_running".to_string()),
///     ..Default::default()
/// }]);
///
/// for position in instrument.positions().unwrap() {
///     let report = instrument.report(&position, &HistogramRequest::default()).unwrap();
///     println!("{}: {:?}", position, report.status);
/// }
/// ```
pub trait Instrument: Send + Debug {
    /// Returns a human-readable description of the instrument connection.
    fn description(&self) -> &str;

    /// Enumerate positions in display order.
    fn positions(&mut self) -> Result<Vec<Position>, SourceError>;

    /// Read the current state of one position.
    fn report(
        &mut self,
        position: &Position,
        histogram: &HistogramRequest,
    ) -> Result<RawPositionReport, SourceError>;
}

impl<T: Instrument + ?Sized> Instrument for Box<T> {
    fn description(&self) -> &str {
        (**self).description()
    }

    fn positions(&mut self) -> Result<Vec<Position>, SourceError> {
        (**self).positions()
    }

    fn report(
        &mut self,
        position: &Position,
        histogram: &HistogramRequest,
    ) -> Result<RawPositionReport, SourceError> {
        (**self).report(position, histogram)
    }
}
