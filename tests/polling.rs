//! End-to-end polling cycles against an in-memory instrument.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use poretop::data::{PlaceholderReason, PositionPanel};
use poretop::source::raw::{
    RawAcquisition, RawBucketRange, RawHistogram, RawMuxScan, RawProtocolInfo, RawTimestamp,
    RawWriterSummary, RawYieldSummary,
};
use poretop::{
    DashboardBatch, DashboardSink, LoopState, MemoryInstrument, Pacer, PollingLoop,
    PoreCategory, PositionRecord, SummaryOptions, WaitOutcome,
};

/// Records every batch it is given.
#[derive(Default)]
struct Recorder {
    batches: Vec<DashboardBatch>,
}

impl DashboardSink for Recorder {
    fn render(&mut self, batch: &DashboardBatch) -> Result<()> {
        self.batches.push(batch.clone());
        Ok(())
    }
}

/// Returns scripted wait outcomes and raises an interrupt after a number of
/// non-blocking checks.
#[derive(Default)]
struct Script {
    waits: Vec<WaitOutcome>,
    wait_calls: usize,
    interrupt_after_checks: Option<usize>,
    checks: usize,
}

impl Script {
    fn waits(waits: Vec<WaitOutcome>) -> Self {
        Self {
            waits,
            ..Default::default()
        }
    }
}

impl Pacer for Script {
    fn wait(&mut self, _timeout: Duration) -> Result<WaitOutcome> {
        let outcome = self
            .waits
            .get(self.wait_calls)
            .copied()
            .unwrap_or(WaitOutcome::Interrupted);
        self.wait_calls += 1;
        Ok(outcome)
    }

    fn interrupted(&mut self) -> bool {
        self.checks += 1;
        matches!(self.interrupt_after_checks, Some(n) if self.checks > n)
    }
}

fn scan(timestamp: u64, single: u64, zero: u64) -> RawMuxScan {
    let mut counts = BTreeMap::new();
    counts.insert("single_pore".to_string(), single);
    counts.insert("zero".to_string(), zero);
    counts.insert("unclassified_following_reset".to_string(), 7);
    RawMuxScan { timestamp, counts }
}

fn running(name: &str) -> PositionRecord {
    let started = SystemTime::now() - Duration::from_secs(3720);
    let seconds = started.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;

    PositionRecord {
        name: name.to_string(),
        status: Some("running".to_string()),
        acquisition: Some(RawAcquisition {
            run_id: Some("run-42".to_string()),
            start_time: Some(RawTimestamp { seconds, nanos: 0 }),
            yield_summary: Some(RawYieldSummary {
                estimated_selected_bases: Some(2_350_000_000),
                read_count: Some(812_000),
            }),
            writer_summary: Some(RawWriterSummary {
                bytes_to_write_completed: Some(1_000_000_000),
            }),
        }),
        n50: Some(8123.0),
        read_length_histogram: Some(RawHistogram {
            bucket_ranges: vec![
                RawBucketRange { start: 0, end: 1000 },
                RawBucketRange { start: 1000, end: 2000 },
                RawBucketRange { start: 2000, end: 3000 },
            ],
            bucket_values: vec![10, 20, 30],
        }),
        protocol: Some(RawProtocolInfo {
            sample_id: Some("sample-7".to_string()),
            flow_cell_product_code: Some("FLO-MIN114".to_string()),
            flow_cell_id: Some("FAQ12345".to_string()),
            kit: Some("SQK-LSK114".to_string()),
        }),
        mux_scans: vec![scan(7200, 380, 120), scan(0, 450, 50), scan(3600, 410, 90)],
        ..Default::default()
    }
}

fn idle(name: &str) -> PositionRecord {
    PositionRecord {
        name: name.to_string(),
        status: Some("not_running".to_string()),
        ..Default::default()
    }
}

fn polling(instrument: MemoryInstrument) -> PollingLoop<MemoryInstrument> {
    PollingLoop::new(instrument, SummaryOptions::default(), Duration::from_secs(300))
}

#[test]
fn test_running_and_idle_positions() {
    let mut polling = polling(MemoryInstrument::new(vec![running("X1"), idle("X2")]));
    let mut sink = Recorder::default();
    let mut pacer = Script::waits(vec![WaitOutcome::Elapsed, WaitOutcome::Interrupted]);

    polling.run(&mut sink, &mut pacer).unwrap();

    assert_eq!(polling.state(), LoopState::Stopped);
    assert_eq!(sink.batches.len(), 2);
    assert_eq!(polling.instrument().position_calls(), 2);
    assert_eq!(polling.instrument().report_calls(), 4);

    let batch = &sink.batches[0];
    let names: Vec<&str> = batch.positions.iter().map(|p| p.position.as_str()).collect();
    assert_eq!(names, vec!["X1", "X2"]);

    let x1 = batch.get("X1").unwrap();
    let summary = x1.yield_summary().unwrap();
    assert_eq!(summary.run_id, "run-42");
    assert_eq!(summary.sample_id, "sample-7");
    assert_eq!(summary.flow_cell_type.as_deref(), Some("FLO-MIN114"));
    assert_eq!(summary.elapsed, "01h:02m");
    assert_eq!(summary.yield_gb, 2.35);
    assert_eq!(summary.written_gb, 1.0);
    assert_eq!(summary.read_count, 812_000);
    assert_eq!(summary.histogram.values, vec![10.0, 20.0, 30.0]);

    let timestamps: Vec<u64> = x1.series.entries().iter().map(|e| e.timestamp).collect();
    assert_eq!(timestamps, vec![0, 3600, 7200]);
    let latest = x1.series.latest().unwrap();
    assert_eq!(latest.count(PoreCategory::SinglePore), 380);
    assert_eq!(latest.count(PoreCategory::Saturated), 0);
    assert_eq!(latest.total(), 500);

    let x2 = batch.get("X2").unwrap();
    assert_eq!(
        x2.panel,
        PositionPanel::Placeholder {
            reason: PlaceholderReason::NoRun,
            message: "No active run".to_string()
        }
    );
    assert!(x2.series.is_empty());

    assert_eq!(sink.batches[1].cycle, 2);
}

#[test]
fn test_interrupt_while_waiting_stops_without_refetch() {
    let mut polling = polling(MemoryInstrument::new(vec![running("X1")]));
    let mut sink = Recorder::default();
    let mut pacer = Script::waits(vec![WaitOutcome::Interrupted]);

    polling.run(&mut sink, &mut pacer).unwrap();

    assert_eq!(polling.state(), LoopState::Stopped);
    assert_eq!(sink.batches.len(), 1);
    assert_eq!(polling.instrument().position_calls(), 1);
    assert_eq!(polling.instrument().report_calls(), 1);
}

#[test]
fn test_interrupt_mid_cycle_skips_render() {
    let mut polling = polling(MemoryInstrument::new(vec![idle("X1"), idle("X2"), idle("X3")]));
    let mut sink = Recorder::default();
    // Start-of-cycle check and the check before X1 pass; the check before X2 fires
    let mut pacer = Script {
        interrupt_after_checks: Some(2),
        ..Default::default()
    };

    polling.run(&mut sink, &mut pacer).unwrap();

    assert_eq!(polling.state(), LoopState::Stopped);
    assert!(sink.batches.is_empty());
    assert_eq!(polling.instrument().report_calls(), 1);
    assert_eq!(polling.cycles(), 0);
}

#[test]
fn test_unreachable_position_is_omitted() {
    let mut instrument = MemoryInstrument::new(vec![idle("X1"), running("X2"), idle("X3")]);
    instrument.set_unreachable("X2", "connection reset");
    let mut polling = polling(instrument);

    let batch = polling.poll_cycle(&mut Script::default()).unwrap();

    let names: Vec<&str> = batch.positions.iter().map(|p| p.position.as_str()).collect();
    assert_eq!(names, vec!["X1", "X3"]);
}

#[test]
fn test_missing_field_keeps_series() {
    let mut record = running("X1");
    record.n50 = None;
    let mut polling = polling(MemoryInstrument::new(vec![record]));

    let batch = polling.poll_cycle(&mut Script::default()).unwrap();

    let x1 = batch.get("X1").unwrap();
    assert_eq!(
        x1.panel,
        PositionPanel::Placeholder {
            reason: PlaceholderReason::Incomplete,
            message: "Error: Missing field: n50".to_string()
        }
    );
    assert_eq!(x1.series.len(), 3);
    assert_eq!(batch.running_count(), 0);
}

#[test]
fn test_redraw_renders_same_batch_again() {
    let mut polling = polling(MemoryInstrument::new(vec![idle("X1")]));
    let mut sink = Recorder::default();
    let mut pacer = Script::waits(vec![WaitOutcome::Redraw, WaitOutcome::Interrupted]);

    polling.run(&mut sink, &mut pacer).unwrap();

    assert_eq!(sink.batches.len(), 2);
    assert_eq!(sink.batches[0], sink.batches[1]);
    assert_eq!(polling.instrument().position_calls(), 1);
}

#[test]
fn test_positions_come_and_go_between_cycles() {
    let mut polling = polling(MemoryInstrument::new(vec![idle("X1")]));
    let mut pacer = Script::default();

    let first = polling.poll_cycle(&mut pacer).unwrap();
    assert_eq!(first.len(), 1);

    polling.instrument_mut().upsert(running("X2"));
    let second = polling.poll_cycle(&mut pacer).unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second.running_count(), 1);
    assert_eq!(second.cycle, 2);
}
