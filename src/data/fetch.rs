//! Per-position snapshot retrieval.

use std::fmt;

use tracing::debug;

use super::model::{AcquisitionSnapshot, Position, RunStatus};
use crate::error::FetchError;
use crate::source::{HistogramRequest, Instrument, RawMuxScan};

/// Outcome of querying one position.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// An active run, with the raw mux scan history read alongside it.
    Running {
        snapshot: AcquisitionSnapshot,
        scans: Vec<RawMuxScan>,
    },
    /// The position answered but has nothing to summarize.
    Unavailable(Unavailable),
}

/// Why a reachable position has no summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    NotRunning,
    Status(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NotRunning => f.write_str("No active run"),
            Unavailable::Status(status) => write!(f, "No active run (status: {})", status),
        }
    }
}

/// Queries one position at a time and normalizes the answer.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    request: HistogramRequest,
}

impl SnapshotFetcher {
    pub fn new(request: HistogramRequest) -> Self {
        Self { request }
    }

    /// Read a position's current state.
    ///
    /// Connection failures become [`FetchError::PositionUnreachable`]; a
    /// position that is reachable but not running is not an error.
    pub fn fetch<I: Instrument + ?Sized>(
        &self,
        instrument: &mut I,
        position: &Position,
    ) -> Result<Fetched, FetchError> {
        let report = instrument.report(position, &self.request).map_err(|source| {
            FetchError::PositionUnreachable {
                position: position.name().to_string(),
                source,
            }
        })?;

        let snapshot = AcquisitionSnapshot::from_report(position.clone(), &report);
        debug!(position = %position, status = %snapshot.status(), "Fetched position");

        match snapshot.status() {
            RunStatus::Running => Ok(Fetched::Running {
                snapshot,
                scans: report.mux_scans,
            }),
            RunStatus::NotRunning => Ok(Fetched::Unavailable(Unavailable::NotRunning)),
            RunStatus::Other(status) => Ok(Fetched::Unavailable(Unavailable::Status(status.clone()))),
        }
    }
}

impl Default for SnapshotFetcher {
    fn default() -> Self {
        Self::new(HistogramRequest::default())
    }
}
