//! Formatting shared by the terminal and text dashboards.

use crate::data::{MuxScanEntry, PoreCategory, YieldSummary};

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Headline pore occupancy from the latest scan, e.g. "412/512 single (80%)".
pub fn pore_headline(latest: Option<&MuxScanEntry>) -> String {
    let Some(entry) = latest else {
        return "no mux scan yet".to_string();
    };
    let single = entry.count(PoreCategory::SinglePore);
    let total = entry.total();
    if total == 0 {
        return format!("{}/0 single", single);
    }
    format!(
        "{}/{} single ({:.0}%)",
        single,
        total,
        single as f64 * 100.0 / total as f64
    )
}

/// `(label, value)` rows of the yield block.
pub fn summary_rows(summary: &YieldSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Run", summary.run_id.clone()),
        ("Sample", summary.sample_id.clone()),
        (
            "Flow cell",
            match &summary.flow_cell_type {
                Some(kind) => format!("{} ({})", summary.flow_cell_id, kind),
                None => summary.flow_cell_id.clone(),
            },
        ),
        ("Kit", summary.kit.clone().unwrap_or_else(|| "-".to_string())),
        ("Elapsed", summary.elapsed.clone()),
        ("Yield", format!("{:.2} Gb", summary.yield_gb)),
        ("Written", format!("{:.2} GB", summary.written_gb)),
        ("Reads", format_count(summary.read_count)),
        ("N50", format!("{:.0}", summary.n50)),
    ]
}
