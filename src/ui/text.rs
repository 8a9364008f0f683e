//! Plain-text dashboard for pipes and logs.

use std::io::Write;

use anyhow::Result;

use super::common::{format_count, pore_headline, summary_rows};
use crate::app::DashboardSink;
use crate::data::{DashboardBatch, PoreCategory, PositionPanel};

/// Writes one text block per position each cycle.
#[derive(Debug)]
pub struct TextDashboard<W: Write> {
    out: W,
}

impl<W: Write> TextDashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DashboardSink for TextDashboard<W> {
    fn render(&mut self, batch: &DashboardBatch) -> Result<()> {
        self.out.write_all(format_batch(batch).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Render a batch as text.
pub fn format_batch(batch: &DashboardBatch) -> String {
    let mut out = format!(
        "== cycle {} | {}/{} running ==\n",
        batch.cycle,
        batch.running_count(),
        batch.len()
    );
    if batch.is_empty() {
        out.push_str("No positions reported\n");
        return out;
    }

    for view in &batch.positions {
        out.push_str(&format!("[{}]\n", view.position));
        match &view.panel {
            PositionPanel::Summary(summary) => {
                for (label, value) in summary_rows(summary) {
                    out.push_str(&format!("  {:<10}{}\n", label, value));
                }
            }
            PositionPanel::Placeholder { message, .. } => {
                out.push_str(&format!("  {}\n", message));
            }
        }
        out.push_str(&format!("  {:<10}{}\n", "Pores", pore_headline(view.series.latest())));
        if let Some(latest) = view.series.latest() {
            let counts: Vec<String> = PoreCategory::ALL
                .iter()
                .filter_map(|c| latest.reported(*c).map(|n| format!("{}={}", c.label(), format_count(n))))
                .collect();
            out.push_str(&format!("  {:<10}{}\n", "Latest", counts.join(" ")));
        }
    }
    out
}
