//! The polling loop and its collaborators.
//!
//! [`PollingLoop`] owns the instrument and the current cycle's batch. Each
//! cycle it queries every position in order, builds the batch, hands it to a
//! [`DashboardSink`] and then waits for the interval through a [`Pacer`].
//!
//! ```text
//!   Idle ──▶ Polling ──▶ Rendering ──▶ Idle ──▶ ...
//!     │         │                        │
//!     └─────────┴──── interrupt ─────────┴──▶ Stopped
//! ```
//!
//! Interrupts are honoured at loop boundaries only: before each position
//! query, before rendering and while waiting. A query or render already in
//! progress runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::data::{
    summarize, DashboardBatch, Fetched, MuxSeries, PlaceholderReason, Position, PositionView,
    SnapshotFetcher, SummaryOptions,
};
use crate::source::Instrument;

/// Where the loop is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Between cycles.
    Idle,
    /// Querying positions and building the batch.
    Polling,
    /// Handing the batch to the sink.
    Rendering,
    /// Interrupted; the loop will not poll or render again.
    Stopped,
}

/// Receives one complete batch per cycle.
pub trait DashboardSink {
    fn render(&mut self, batch: &DashboardBatch) -> Result<()>;
}

/// Result of waiting between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full timeout passed.
    Elapsed,
    /// A stop was requested.
    Interrupted,
    /// The display needs the current batch drawn again (e.g. after a resize).
    Redraw,
}

/// Paces the loop and reports interrupts.
pub trait Pacer {
    /// Block for up to `timeout`. May return early on interrupt or redraw.
    fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome>;

    /// Non-blocking check for a pending stop request.
    fn interrupted(&mut self) -> bool;
}

/// Shared stop flag, set from a signal handler or key handler.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Upper bound on a single wait, for timeouts past what [`Instant`] can hold.
const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 3600);

/// The instant `timeout` from now, clamped to [`MAX_WAIT`].
pub fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(MAX_WAIT))
        .unwrap_or(now)
}

/// Sleeps in short slices, checking a [`StopSignal`] between them.
#[derive(Debug, Clone)]
pub struct SleepPacer {
    stop: StopSignal,
    tick: Duration,
}

impl SleepPacer {
    pub fn new(stop: StopSignal) -> Self {
        Self {
            stop,
            tick: Duration::from_millis(100),
        }
    }
}

impl Pacer for SleepPacer {
    fn wait(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        let deadline = deadline_after(timeout);
        loop {
            if self.stop.is_requested() {
                return Ok(WaitOutcome::Interrupted);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::Elapsed);
            }
            thread::sleep(remaining.min(self.tick));
        }
    }

    fn interrupted(&mut self) -> bool {
        self.stop.is_requested()
    }
}

/// Periodically polls every position and renders the result.
#[derive(Debug)]
pub struct PollingLoop<I: Instrument> {
    instrument: I,
    fetcher: SnapshotFetcher,
    options: SummaryOptions,
    interval: Duration,
    state: LoopState,
    cycle: u64,
}

impl<I: Instrument> PollingLoop<I> {
    pub fn new(instrument: I, options: SummaryOptions, interval: Duration) -> Self {
        Self {
            fetcher: SnapshotFetcher::new(options.histogram_request()),
            instrument,
            options,
            interval,
            state: LoopState::Idle,
            cycle: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of cycles that completed polling.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn instrument(&self) -> &I {
        &self.instrument
    }

    pub fn instrument_mut(&mut self) -> &mut I {
        &mut self.instrument
    }

    /// Run until interrupted.
    ///
    /// Returns `Ok(())` once stopped. Sink and pacer failures end the loop
    /// with an error.
    pub fn run(&mut self, sink: &mut dyn DashboardSink, pacer: &mut dyn Pacer) -> Result<()> {
        info!(
            source = self.instrument.description(),
            interval_secs = self.interval.as_secs(),
            "Starting polling loop"
        );

        loop {
            let Some(batch) = self.poll_cycle(pacer) else {
                break;
            };

            self.state = LoopState::Rendering;
            sink.render(&batch)?;
            self.state = LoopState::Idle;

            if !self.wait(&batch, sink, pacer)? {
                break;
            }
        }

        info!(cycles = self.cycle, "Polling loop stopped");
        Ok(())
    }

    /// Sleep out the interval, redrawing on request. Returns false when
    /// interrupted.
    fn wait(
        &mut self,
        batch: &DashboardBatch,
        sink: &mut dyn DashboardSink,
        pacer: &mut dyn Pacer,
    ) -> Result<bool> {
        let deadline = deadline_after(self.interval);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match pacer.wait(remaining)? {
                WaitOutcome::Elapsed => return Ok(true),
                WaitOutcome::Interrupted => {
                    self.state = LoopState::Stopped;
                    return Ok(false);
                }
                WaitOutcome::Redraw => {
                    self.state = LoopState::Rendering;
                    sink.render(batch)?;
                    self.state = LoopState::Idle;
                    if remaining.is_zero() {
                        return Ok(true);
                    }
                }
            }
        }
    }

    /// Query every position once and assemble the batch.
    ///
    /// Returns `None`, leaving the loop [`LoopState::Stopped`], if an
    /// interrupt arrives before the batch is complete.
    pub fn poll_cycle(&mut self, pacer: &mut dyn Pacer) -> Option<DashboardBatch> {
        if pacer.interrupted() {
            self.state = LoopState::Stopped;
            return None;
        }
        self.state = LoopState::Polling;

        let positions = match self.instrument.positions() {
            Ok(positions) => positions,
            Err(err) => {
                warn!(error = %err, "Failed to enumerate positions");
                Vec::new()
            }
        };

        let now = SystemTime::now();
        let mut views = Vec::with_capacity(positions.len());
        for position in &positions {
            if pacer.interrupted() {
                self.state = LoopState::Stopped;
                return None;
            }
            if let Some(view) = self.view_for(position, now) {
                views.push(view);
            }
        }

        if pacer.interrupted() {
            self.state = LoopState::Stopped;
            return None;
        }

        self.cycle += 1;
        info!(
            cycle = self.cycle,
            positions = positions.len(),
            shown = views.len(),
            "Poll cycle complete"
        );

        Some(DashboardBatch {
            cycle: self.cycle,
            generated_at_ms: unix_millis(SystemTime::now()),
            positions: views,
        })
    }

    fn view_for(&mut self, position: &Position, now: SystemTime) -> Option<PositionView> {
        let fetched = match self.fetcher.fetch(&mut self.instrument, position) {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(error = %err, "Skipping position this cycle");
                return None;
            }
        };

        let view = match fetched {
            Fetched::Unavailable(reason) => {
                debug!(position = %position, %reason, "Position not running");
                PositionView::placeholder(
                    position.name(),
                    MuxSeries::default(),
                    PlaceholderReason::NoRun,
                    reason.to_string(),
                )
            }
            Fetched::Running { snapshot, scans } => {
                let series = MuxSeries::build(scans.into_iter().map(|s| (s.timestamp, s.counts)));
                match summarize(&snapshot, &self.options, now) {
                    Ok(summary) => PositionView::summary(position.name(), series, summary),
                    Err(err) => {
                        warn!(position = %position, error = %err, "Incomplete snapshot");
                        PositionView::placeholder(
                            position.name(),
                            series,
                            PlaceholderReason::Incomplete,
                            format!("Error: {}", err),
                        )
                    }
                }
            }
        };
        Some(view)
    }
}

fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
