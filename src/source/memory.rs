//! In-memory instrument.
//!
//! Serves scripted position records. Used by tests and for embedding the
//! dashboard in other programs that already hold instrument state.

use std::collections::BTreeMap;

use super::raw::PositionRecord;
use super::{HistogramRequest, Instrument, RawPositionReport};
use crate::data::Position;
use crate::error::SourceError;

/// An instrument that answers from a fixed set of records.
///
/// Positions can be marked unreachable to exercise failure handling, and
/// every call is counted.
///
/// # Example
///
/// ```
/// use poretop::source::{Instrument, MemoryInstrument, PositionRecord};
///
/// let mut instrument = MemoryInstrument::new(vec![PositionRecord {
///     name: "X1".to_string(),
///     ..Default::default()
/// }]);
/// instrument.set_unreachable("X1", "connection refused");
///
/// assert_eq!(instrument.positions().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryInstrument {
    records: Vec<PositionRecord>,
    unreachable: BTreeMap<String, String>,
    enumeration_error: Option<String>,
    position_calls: usize,
    report_calls: usize,
}

impl MemoryInstrument {
    /// Create an instrument serving the given records in order.
    pub fn new(records: Vec<PositionRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Make reports for `name` fail with a connection error.
    pub fn set_unreachable(&mut self, name: &str, reason: &str) {
        self.unreachable.insert(name.to_string(), reason.to_string());
    }

    /// Make position enumeration fail with a connection error.
    pub fn fail_enumeration(&mut self, reason: &str) {
        self.enumeration_error = Some(reason.to_string());
    }

    /// Replace the record with the same name, or append it.
    pub fn upsert(&mut self, record: PositionRecord) {
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Number of times positions were enumerated.
    pub fn position_calls(&self) -> usize {
        self.position_calls
    }

    /// Number of reports requested.
    pub fn report_calls(&self) -> usize {
        self.report_calls
    }
}

impl Instrument for MemoryInstrument {
    fn description(&self) -> &str {
        "memory"
    }

    fn positions(&mut self) -> Result<Vec<Position>, SourceError> {
        self.position_calls += 1;
        if let Some(ref reason) = self.enumeration_error {
            return Err(SourceError::Connection(reason.clone()));
        }
        Ok(self.records.iter().map(|r| Position::new(r.name.clone())).collect())
    }

    fn report(
        &mut self,
        position: &Position,
        histogram: &HistogramRequest,
    ) -> Result<RawPositionReport, SourceError> {
        self.report_calls += 1;
        if let Some(reason) = self.unreachable.get(position.name()) {
            return Err(SourceError::Connection(reason.clone()));
        }
        self.records
            .iter()
            .find(|r| r.name == position.name())
            .map(|r| r.report(histogram))
            .ok_or_else(|| SourceError::UnknownPosition(position.name().to_string()))
    }
}
