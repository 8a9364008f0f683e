//! File-based instrument.
//!
//! Reads a JSON dump of the control server's state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::raw::PositionRecord;
use super::{HistogramRequest, Instrument, RawPositionReport};
use crate::data::Position;
use crate::error::SourceError;

/// On-disk layout of an instrument dump.
#[derive(Debug, Deserialize)]
struct InstrumentDump {
    #[serde(default)]
    positions: Vec<PositionRecord>,
}

/// An instrument backed by a JSON file.
///
/// The file is re-read every time positions are enumerated, so an external
/// process can keep it up to date. Reports are served from the copy loaded
/// at enumeration time, which keeps one cycle internally consistent.
#[derive(Debug)]
pub struct FileInstrument {
    path: PathBuf,
    description: String,
    records: Vec<PositionRecord>,
}

impl FileInstrument {
    /// Create a new file instrument for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            records: Vec::new(),
        }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&mut self) -> Result<(), SourceError> {
        let content = fs::read_to_string(&self.path)?;
        let dump: InstrumentDump = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), positions = dump.positions.len(), "Loaded instrument dump");
        self.records = dump.positions;
        Ok(())
    }
}

impl Instrument for FileInstrument {
    fn description(&self) -> &str {
        &self.description
    }

    fn positions(&mut self) -> Result<Vec<Position>, SourceError> {
        self.load()?;
        Ok(self.records.iter().map(|r| Position::new(r.name.clone())).collect())
    }

    fn report(
        &mut self,
        position: &Position,
        histogram: &HistogramRequest,
    ) -> Result<RawPositionReport, SourceError> {
        self.records
            .iter()
            .find(|r| r.name == position.name())
            .map(|r| r.report(histogram))
            .ok_or_else(|| SourceError::UnknownPosition(position.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "positions": [
                {
                    "name": "X2",
                    "status": "running",
                    "n50": 9000.0,
                    "read_length_histogram": {
                        "bucket_ranges": [{ "start": 0, "end": 10 }],
                        "bucket_values": [100]
                    },
                    "mux_scans": [{ "timestamp": 60, "counts": { "single_pore": 10 } }]
                },
                { "name": "X1", "status": "not_running" }
            ]
        }"#
    }

    #[test]
    fn test_file_instrument_new() {
        let instrument = FileInstrument::new("/tmp/instrument.json");
        assert_eq!(instrument.path(), Path::new("/tmp/instrument.json"));
        assert_eq!(instrument.description(), "file: /tmp/instrument.json");
    }

    #[test]
    fn test_positions_keep_document_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut instrument = FileInstrument::new(file.path());
        let positions = instrument.positions().unwrap();
        let names: Vec<&str> = positions.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["X2", "X1"]);
    }

    #[test]
    fn test_report_for_position() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut instrument = FileInstrument::new(file.path());
        let positions = instrument.positions().unwrap();

        let report = instrument.report(&positions[0], &HistogramRequest::default()).unwrap();
        assert_eq!(report.status.as_deref(), Some("running"));
        assert_eq!(report.n50, Some(9000.0));
        assert_eq!(report.histogram.unwrap().bucket_values, vec![100]);
        assert_eq!(report.mux_scans.len(), 1);
    }

    #[test]
    fn test_unknown_position() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut instrument = FileInstrument::new(file.path());
        instrument.positions().unwrap();

        let err = instrument
            .report(&Position::new("P9"), &HistogramRequest::default())
            .unwrap_err();
        assert!(matches!(err, SourceError::UnknownPosition(ref name) if name == "P9"));
    }

    #[test]
    fn test_missing_file() {
        let mut instrument = FileInstrument::new("/nonexistent/path/instrument.json");
        let err = instrument.positions().unwrap_err();
        assert!(err.to_string().contains("Read error"));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut instrument = FileInstrument::new(file.path());
        let err = instrument.positions().unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
