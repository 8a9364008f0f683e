//! Pore-category time series built from mux scans.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Pore states reported by a mux scan.
///
/// The set is closed; any other name in a scan is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoreCategory {
    SinglePore,
    ReservedPore,
    Unavailable,
    Multiple,
    Saturated,
    Zero,
    Other,
}

impl PoreCategory {
    /// All categories in stacking order.
    pub const ALL: [PoreCategory; 7] = [
        PoreCategory::SinglePore,
        PoreCategory::ReservedPore,
        PoreCategory::Unavailable,
        PoreCategory::Multiple,
        PoreCategory::Saturated,
        PoreCategory::Zero,
        PoreCategory::Other,
    ];

    /// Name used by the instrument.
    pub fn name(&self) -> &'static str {
        match self {
            PoreCategory::SinglePore => "single_pore",
            PoreCategory::ReservedPore => "reserved_pore",
            PoreCategory::Unavailable => "unavailable",
            PoreCategory::Multiple => "multiple",
            PoreCategory::Saturated => "saturated",
            PoreCategory::Zero => "zero",
            PoreCategory::Other => "other",
        }
    }

    /// Short label for chart axes.
    pub fn label(&self) -> &'static str {
        match self {
            PoreCategory::SinglePore => "single",
            PoreCategory::ReservedPore => "resv",
            PoreCategory::Unavailable => "unav",
            PoreCategory::Multiple => "mult",
            PoreCategory::Saturated => "sat",
            PoreCategory::Zero => "zero",
            PoreCategory::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for PoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One timestamped pore census.
///
/// Only categories the scan actually reported are stored; the rest read
/// as zero through [`MuxScanEntry::count`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MuxScanEntry {
    /// Seconds since run start.
    pub timestamp: u64,
    counts: BTreeMap<PoreCategory, u64>,
}

impl MuxScanEntry {
    /// Keep the known categories of a raw census, exactly as reported.
    pub fn new<M, K>(timestamp: u64, counts: M) -> Self
    where
        M: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let counts = counts
            .into_iter()
            .filter_map(|(name, count)| PoreCategory::from_name(name.as_ref()).map(|c| (c, count)))
            .collect();
        Self { timestamp, counts }
    }

    /// Count for a category, zero when the scan did not report it.
    pub fn count(&self, category: PoreCategory) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Count for a category only if the scan reported it.
    pub fn reported(&self, category: PoreCategory) -> Option<u64> {
        self.counts.get(&category).copied()
    }

    /// The stored counts.
    pub fn counts(&self) -> &BTreeMap<PoreCategory, u64> {
        &self.counts
    }

    /// Sum over all categories.
    pub fn total(&self) -> u64 {
        PoreCategory::ALL.iter().map(|c| self.count(*c)).sum()
    }
}

/// Chronologically ordered mux scans for one position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MuxSeries {
    entries: Vec<MuxScanEntry>,
}

impl MuxSeries {
    /// Build a series from raw `(timestamp, category -> count)` scans.
    ///
    /// Entries are sorted by timestamp with a stable sort, so scans sharing a
    /// timestamp keep their input order. Nothing is merged or dropped.
    pub fn build<I, M, K>(scans: I) -> Self
    where
        I: IntoIterator<Item = (u64, M)>,
        M: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let mut entries: Vec<MuxScanEntry> = scans
            .into_iter()
            .map(|(timestamp, counts)| MuxScanEntry::new(timestamp, counts))
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Self { entries }
    }

    pub fn entries(&self) -> &[MuxScanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent scan, used for headline pore counts.
    pub fn latest(&self) -> Option<&MuxScanEntry> {
        self.entries.last()
    }

    /// Per-entry totals across all categories (height of each stacked bar).
    pub fn stacked_totals(&self) -> Vec<u64> {
        self.entries.iter().map(MuxScanEntry::total).collect()
    }

    /// `(hours since start, count)` points for one category.
    pub fn category_series(&self, category: PoreCategory) -> Vec<(f64, f64)> {
        self.entries
            .iter()
            .map(|e| (e.timestamp as f64 / 3600.0, e.count(category) as f64))
            .collect()
    }

    /// Time span covered, in seconds.
    pub fn span(&self) -> Option<(u64, u64)> {
        Some((self.entries.first()?.timestamp, self.entries.last()?.timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(timestamp: u64, counts: &[(&str, u64)]) -> (u64, Vec<(String, u64)>) {
        (
            timestamp,
            counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    #[test]
    fn test_build_sorts_by_timestamp() {
        let series = MuxSeries::build(vec![
            scan(300, &[("single_pore", 3)]),
            scan(0, &[("single_pore", 1)]),
            scan(120, &[("single_pore", 2)]),
        ]);

        let timestamps: Vec<u64> = series.entries().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![0, 120, 300]);
        assert_eq!(series.latest().unwrap().count(PoreCategory::SinglePore), 3);
    }

    #[test]
    fn test_build_keeps_duplicate_timestamps_in_input_order() {
        let series = MuxSeries::build(vec![
            scan(60, &[("zero", 1)]),
            scan(0, &[("zero", 0)]),
            scan(60, &[("zero", 2)]),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.entries()[1].count(PoreCategory::Zero), 1);
        assert_eq!(series.entries()[2].count(PoreCategory::Zero), 2);
        // Last of the tied entries is the latest.
        assert_eq!(series.latest().unwrap().count(PoreCategory::Zero), 2);
    }

    #[test]
    fn test_build_preserves_every_entry() {
        let input = vec![
            scan(5, &[("single_pore", 10), ("saturated", 1)]),
            scan(1, &[("multiple", 4)]),
            scan(5, &[("other", 7)]),
            scan(3, &[]),
        ];
        let series = MuxSeries::build(input.clone());

        let mut expected: Vec<MuxScanEntry> =
            input.into_iter().map(|(t, c)| MuxScanEntry::new(t, c)).collect();
        let mut actual = series.entries().to_vec();
        expected.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.total().cmp(&b.total())));
        actual.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.total().cmp(&b.total())));
        assert_eq!(actual, expected);
        assert!(series.entries().windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_absent_categories_read_as_zero_but_are_not_stored() {
        let series = MuxSeries::build(vec![scan(0, &[("single_pore", 400), ("zero", 12)])]);
        let entry = series.latest().unwrap();

        assert_eq!(entry.count(PoreCategory::Saturated), 0);
        assert_eq!(entry.reported(PoreCategory::Saturated), None);
        assert_eq!(entry.counts().len(), 2);
        assert_eq!(series.stacked_totals(), vec![412]);
    }

    #[test]
    fn test_unknown_categories_dropped() {
        let entry = MuxScanEntry::new(0, vec![("single_pore", 5), ("strand", 9)]);
        assert_eq!(entry.counts().len(), 1);
        assert_eq!(entry.total(), 5);
    }

    #[test]
    fn test_empty_series() {
        let series = MuxSeries::build(Vec::<(u64, Vec<(String, u64)>)>::new());
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert!(series.span().is_none());
        assert!(series.stacked_totals().is_empty());
        assert!(series.category_series(PoreCategory::SinglePore).is_empty());
    }

    #[test]
    fn test_category_series_in_hours() {
        let series = MuxSeries::build(vec![
            scan(0, &[("single_pore", 10)]),
            scan(5400, &[("zero", 3)]),
        ]);
        assert_eq!(
            series.category_series(PoreCategory::SinglePore),
            vec![(0.0, 10.0), (1.5, 0.0)]
        );
        assert_eq!(series.span(), Some((0, 5400)));
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in PoreCategory::ALL {
            assert_eq!(PoreCategory::from_name(category.name()), Some(category));
        }
        assert_eq!(PoreCategory::from_name("strand"), None);
    }
}
