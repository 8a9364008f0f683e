//! Dashboard layout: one column per position.
//!
//! ```text
//! ┌ header ──────────────────────────────────────────┐
//! │┌ X1 ─────────────┐┌ X2 ─────────────┐            │
//! ││ yield block     ││ placeholder     │   ...      │
//! ││ pore categories ││ pore categories │            │
//! ││ read histogram  ││                 │            │
//! │└─────────────────┘└─────────────────┘            │
//! └ status bar ──────────────────────────────────────┘
//! ```

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::common::{format_count, pore_headline, summary_rows};
use super::theme::Theme;
use crate::data::{
    DashboardBatch, HistogramSeries, MuxSeries, PoreCategory, PositionPanel, PositionView,
};
use crate::source::HistogramKind;

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 16;

/// Rows taken by the yield block (9 figures, pore headline, padding).
const INFO_HEIGHT: u16 = 11;

/// Context shown around the batch.
#[derive(Debug, Clone)]
pub struct Header<'a> {
    pub source: &'a str,
    pub interval: Duration,
}

/// Draw a whole batch.
pub fn render(frame: &mut Frame, batch: &DashboardBatch, theme: &Theme, header: &Header) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(8),    // Position columns
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_header(frame, batch, header, chunks[0]);
    render_positions(frame, batch, theme, header, chunks[1]);
    render_status_bar(frame, header, chunks[2]);
}

fn render_header(frame: &mut Frame, batch: &DashboardBatch, header: &Header, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" PORETOP ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", batch.running_count()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("/{} running │ cycle {} │ {}", batch.len(), batch.cycle, header.source)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, header: &Header, area: Rect) {
    let status = format!(
        " Refresh every {}s | q/Esc:quit",
        header.interval.as_secs()
    );
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

fn render_positions(
    frame: &mut Frame,
    batch: &DashboardBatch,
    theme: &Theme,
    header: &Header,
    area: Rect,
) {
    if batch.is_empty() {
        let paragraph = Paragraph::new(format!("No positions reported by {}", header.source))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted));
        let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        frame.render_widget(paragraph, centered);
        return;
    }

    let count = batch.len() as u32;
    let columns = Layout::horizontal(vec![Constraint::Ratio(1, count); batch.len()]).split(area);

    for (view, column) in batch.positions.iter().zip(columns.iter()) {
        render_position(frame, view, theme, *column);
    }
}

fn render_position(frame: &mut Frame, view: &PositionView, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(Span::styled(format!(" {} ", view.position), theme.header))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(INFO_HEIGHT),
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .split(inner);

    let headline = pore_headline(view.series.latest());
    match &view.panel {
        PositionPanel::Summary(summary) => {
            let mut lines: Vec<Line> = summary_rows(summary)
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::raw(format!(" {:<10}", label)),
                        Span::styled(value, theme.value),
                    ])
                })
                .collect();
            lines.push(Line::from(vec![
                Span::raw(format!(" {:<10}", "Pores")),
                Span::styled(headline, theme.value),
            ]));
            frame.render_widget(Paragraph::new(lines), rows[0]);
            render_pores(frame, &view.series, theme, rows[1]);
            render_histogram(frame, &summary.histogram, theme, rows[2]);
        }
        PositionPanel::Placeholder { reason, message } => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!(" {}", message),
                    theme.placeholder_style(*reason),
                )),
                Line::from(""),
                Line::from(format!(" Pores: {}", headline)),
            ];
            frame.render_widget(Paragraph::new(lines), rows[0]);
            if !view.series.is_empty() {
                render_pores(frame, &view.series, theme, rows[1]);
            }
        }
    }
}

/// Pore categories over time on the left, the latest scan on the right.
fn render_pores(frame: &mut Frame, series: &MuxSeries, theme: &Theme, area: Rect) {
    let halves = Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);
    render_mux_chart(frame, series, theme, halves[0]);
    render_latest_scan(frame, series, theme, halves[1]);
}

fn render_latest_scan(frame: &mut Frame, series: &MuxSeries, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Latest scan ")
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.border));

    let Some(latest) = series.latest() else {
        frame.render_widget(block, area);
        return;
    };

    let bars: Vec<Bar> = PoreCategory::ALL
        .iter()
        .map(|category| {
            Bar::default()
                .value(latest.count(*category))
                .text_value(format_count(latest.count(*category)))
                .label(Line::from(&category.label()[..2]))
                .style(Style::default().fg(theme.category_color(*category)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(3)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Category counts over time, plus the stacked total.
fn render_mux_chart(frame: &mut Frame, series: &MuxSeries, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(" Pore categories ")
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.border));

    let Some((first, last)) = series.span() else {
        let paragraph = Paragraph::new(" No mux scans")
            .style(Style::default().fg(theme.muted))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let points: Vec<(PoreCategory, Vec<(f64, f64)>)> = PoreCategory::ALL
        .iter()
        .filter(|c| series.entries().iter().any(|e| e.reported(**c).is_some()))
        .map(|c| (*c, series.category_series(*c)))
        .collect();
    let totals: Vec<(f64, f64)> = series
        .entries()
        .iter()
        .zip(series.stacked_totals())
        .map(|(e, total)| (e.timestamp as f64 / 3600.0, total as f64))
        .collect();

    let mut datasets: Vec<Dataset> = points
        .iter()
        .map(|(category, data)| {
            Dataset::default()
                .name(category.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.category_color(*category)))
                .data(data)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .name("total")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(theme.muted))
            .data(&totals),
    );

    let x_min = first as f64 / 3600.0;
    let x_max = (last as f64 / 3600.0).max(x_min + 0.1);
    let y_max = series.stacked_totals().into_iter().max().unwrap_or(0).max(1) as f64;

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("h")
                .style(Style::default().fg(theme.muted))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", x_min)),
                    Span::raw(format!("{:.1}", x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(format_count(y_max as u64))]),
        );
    frame.render_widget(chart, area);
}

fn render_histogram(frame: &mut Frame, histogram: &HistogramSeries, theme: &Theme, area: Rect) {
    let title = match (histogram.kind, histogram.log_scale) {
        (HistogramKind::ReadLengths, false) => " Read lengths ",
        (HistogramKind::ReadLengths, true) => " Read lengths (log10) ",
        (HistogramKind::ReadCounts, false) => " Read counts ",
        (HistogramKind::ReadCounts, true) => " Read counts (log10) ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme.border));

    if histogram.is_empty() {
        let paragraph = Paragraph::new(" Empty histogram")
            .style(Style::default().fg(theme.muted))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let points = histogram.points();
    let x_min = histogram.starts.first().copied().unwrap_or(0.0);
    let x_max = histogram.starts.last().copied().unwrap_or(0.0).max(x_min + 1.0);
    let y_max = histogram.max_value().max(1.0);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.histogram))
        .data(&points);

    let label = |v: f64| {
        if histogram.log_scale {
            format!("{:.1}", v)
        } else {
            format_count(v as u64)
        }
    };

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme.muted))
                .bounds([x_min, x_max])
                .labels(vec![Span::raw(label(x_min)), Span::raw(label(x_max))]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme.muted))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw(label(0.0)), Span::raw(label(y_max))]),
        );
    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PlaceholderReason;
    use ratatui::{backend::TestBackend, Terminal};

    fn header() -> Header<'static> {
        Header {
            source: "memory",
            interval: Duration::from_secs(300),
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_placeholder_column() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let batch = DashboardBatch {
            cycle: 4,
            generated_at_ms: 0,
            positions: vec![PositionView::placeholder(
                "X1",
                MuxSeries::default(),
                PlaceholderReason::NoRun,
                "No active run",
            )],
        };

        terminal
            .draw(|frame| render(frame, &batch, &Theme::dark(), &header()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("PORETOP"));
        assert!(text.contains("cycle 4"));
        assert!(text.contains("X1"));
        assert!(text.contains("No active run"));
    }

    #[test]
    fn test_placeholder_color_follows_reason() {
        let theme = Theme::dark();
        // The reason alone picks the color, whatever the message says
        let batch = DashboardBatch {
            cycle: 1,
            generated_at_ms: 0,
            positions: vec![
                PositionView::placeholder(
                    "X1",
                    MuxSeries::default(),
                    PlaceholderReason::Incomplete,
                    "Missing field: n50",
                ),
                PositionView::placeholder(
                    "X2",
                    MuxSeries::default(),
                    PlaceholderReason::NoRun,
                    "Errored run",
                ),
            ],
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, &batch, &theme, &header()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let color_of = |needle: &str| {
            let width = buffer.area.width as usize;
            let symbols: Vec<&str> = buffer.content().iter().map(|cell| cell.symbol()).collect();
            symbols.chunks(width).enumerate().find_map(|(y, row)| {
                let line: String = row.concat();
                let x = line.find(needle).map(|byte| line[..byte].chars().count())?;
                Some(buffer.content()[y * width + x].fg)
            })
        };
        assert_eq!(color_of("Missing field: n50"), Some(theme.error));
        assert_eq!(color_of("Errored run"), Some(theme.muted));
    }

    #[test]
    fn test_render_empty_batch() {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render(frame, &DashboardBatch::default(), &Theme::dark(), &header()))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No positions reported by memory"));
    }

    #[test]
    fn test_render_too_small() {
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal
            .draw(|frame| render(frame, &DashboardBatch::default(), &Theme::dark(), &header()))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }
}
