//! Dashboard sinks.
//!
//! Both sinks implement [`DashboardSink`](crate::app::DashboardSink) and
//! only read the batch they are given.
//!
//! ## Submodules
//!
//! - [`terminal`]: [`TerminalDashboard`], full-screen ratatui rendering
//! - [`dashboard`]: Layout and widgets drawn by the terminal sink
//! - [`text`]: [`TextDashboard`], plain text for `--plain`
//! - [`common`]: Formatting shared by both sinks
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (cycle, running count, source)│
//! ├────────────┬────────────┬────────────┤
//! │ Position 1 │ Position 2 │ ...        │
//! │  yield     │  yield     │            │
//! │  pores     │  pores     │            │
//! │  histogram │  histogram │            │
//! ├────────────┴────────────┴────────────┤
//! │ Status Bar (interval, keys)          │
//! └──────────────────────────────────────┘
//! ```

pub mod common;
pub mod dashboard;
pub mod terminal;
pub mod text;
pub mod theme;

pub use terminal::TerminalDashboard;
pub use text::TextDashboard;
pub use theme::Theme;
