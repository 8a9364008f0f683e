//! Data models and processing for position snapshots.
//!
//! This module turns raw position reports into the typed values the
//! dashboard renders.
//!
//! ## Submodules
//!
//! - [`model`]: Positions, run status and [`AcquisitionSnapshot`] with
//!   per-field accessors
//! - [`fetch`]: [`SnapshotFetcher`], one query per position
//! - [`mux`]: Pore categories and the [`MuxSeries`] time series
//! - [`summary`]: [`YieldSummary`] derivation, rounding and log axes
//! - [`batch`]: The immutable [`DashboardBatch`] handed to sinks
//!
//! ## Data Flow
//!
//! ```text
//! RawPositionReport
//!        │
//!        ▼
//! SnapshotFetcher::fetch()
//!        │
//!        ├──▶ mux scans ──▶ MuxSeries::build()   (accumulated history)
//!        │
//!        └──▶ AcquisitionSnapshot ──▶ summarize() (point in time)
//!                         │
//!                         ▼
//!                   PositionView ──▶ DashboardBatch
//! ```

pub mod batch;
pub mod fetch;
pub mod model;
pub mod mux;
pub mod summary;

pub use batch::{DashboardBatch, PlaceholderReason, PositionPanel, PositionView};
pub use fetch::{Fetched, SnapshotFetcher, Unavailable};
pub use model::{AcquisitionSnapshot, Histogram, Position, RunStatus, SampleMetadata};
pub use mux::{MuxScanEntry, MuxSeries, PoreCategory};
pub use summary::{summarize, HistogramSeries, SummaryOptions, YieldSummary};
