//! # poretop
//!
//! A terminal dashboard for nanopore sequencing instruments.
//!
//! Every few minutes the dashboard asks the instrument which flow-cell
//! positions it has, queries each one, and shows its run yield, read-length
//! histogram and pore-occupancy history side by side.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (loop)  │    │(processing)   │(rendering)   │ / stdout│  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘  │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌───────────┐                                              │
//! │  │  source   │◀── FileInstrument | HttpInstrument | Memory  │
//! │  │(instrument)                                              │
//! │  └───────────┘                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: The [`PollingLoop`], its state machine and the
//!   [`DashboardSink`]/[`Pacer`] seams
//! - **[`source`]**: The [`Instrument`] trait with file, HTTP and in-memory
//!   implementations
//! - **[`data`]**: Snapshots, mux series, yield summaries and the
//!   [`DashboardBatch`] each cycle produces
//! - **[`ui`]**: ratatui and plain-text dashboards
//! - **[`config`]**: Layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Read an instrument dump every 5 minutes
//! poretop --file instrument.json
//!
//! # Query a gateway every minute, read counts on log axes
//! poretop --connect http://sequencer.local:8000 -i 60 --readcounts --log
//!
//! # Poll once and write the batch as JSON
//! poretop --file instrument.json --export batch.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::time::Duration;
//! use poretop::{MemoryInstrument, PollingLoop, PositionRecord, SummaryOptions};
//! use poretop::app::{SleepPacer, StopSignal};
//!
//! let instrument = MemoryInstrument::new(vec![PositionRecord {
//!     name: "X1".to_string(),
//!     status: Some("not_running".to_string()),
//!     ..Default::default()
//! }]);
//! let mut polling = PollingLoop::new(instrument, SummaryOptions::default(), Duration::from_secs(300));
//!
//! let batch = polling.poll_cycle(&mut SleepPacer::new(StopSignal::new())).unwrap();
//! assert!(batch.get("X1").unwrap().is_placeholder());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{DashboardSink, LoopState, Pacer, PollingLoop, StopSignal, WaitOutcome};
pub use config::Settings;
pub use data::{
    summarize, AcquisitionSnapshot, DashboardBatch, MuxSeries, PoreCategory, Position,
    PositionView, RunStatus, SummaryOptions, YieldSummary,
};
pub use error::{FetchError, FieldMissing, SourceError, SummaryError};
pub use source::{
    FileInstrument, HistogramKind, HistogramRequest, HttpInstrument, Instrument,
    MemoryInstrument, PositionRecord,
};
