//! The per-cycle dashboard batch.
//!
//! A batch is assembled once per polling cycle and handed to the sink as a
//! whole. Sinks only read it; all layout state lives in the sink.

use serde::Serialize;

use super::mux::MuxSeries;
use super::summary::YieldSummary;

/// Why a position shows a placeholder instead of a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    /// The position has no active run.
    NoRun,
    /// The run is active but its snapshot lacks a required field.
    Incomplete,
}

/// What a position column shows next to its mux series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionPanel {
    Summary(YieldSummary),
    /// Explanation shown instead of a summary.
    Placeholder {
        reason: PlaceholderReason,
        message: String,
    },
}

/// One position's column in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionView {
    pub position: String,
    pub series: MuxSeries,
    pub panel: PositionPanel,
}

impl PositionView {
    pub fn summary(position: impl Into<String>, series: MuxSeries, summary: YieldSummary) -> Self {
        Self {
            position: position.into(),
            series,
            panel: PositionPanel::Summary(summary),
        }
    }

    pub fn placeholder(
        position: impl Into<String>,
        series: MuxSeries,
        reason: PlaceholderReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            position: position.into(),
            series,
            panel: PositionPanel::Placeholder {
                reason,
                message: message.into(),
            },
        }
    }

    pub fn yield_summary(&self) -> Option<&YieldSummary> {
        match &self.panel {
            PositionPanel::Summary(summary) => Some(summary),
            PositionPanel::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.panel, PositionPanel::Placeholder { .. })
    }
}

/// Everything rendered in one cycle, in position enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardBatch {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Unix time in milliseconds when polling finished.
    pub generated_at_ms: u64,
    pub positions: Vec<PositionView>,
}

impl DashboardBatch {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, position: &str) -> Option<&PositionView> {
        self.positions.iter().find(|p| p.position == position)
    }

    /// Positions showing a real summary.
    pub fn running_count(&self) -> usize {
        self.positions.iter().filter(|p| !p.is_placeholder()).count()
    }
}
