//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{PlaceholderReason, PoreCategory};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Color for placeholder and error text.
    pub muted: Color,
    /// Color for field-missing errors.
    pub error: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for block titles.
    pub header: Style,
    /// Style for figures in the yield block.
    pub value: Style,
    /// Histogram line color.
    pub histogram: Color,
    /// One color per pore category, in [`PoreCategory::ALL`] order.
    pub categories: [Color; 7],
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            muted: Color::Gray,
            error: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            value: Style::default().add_modifier(Modifier::BOLD),
            histogram: Color::LightMagenta,
            categories: [
                Color::Green,
                Color::LightGreen,
                Color::Blue,
                Color::Magenta,
                Color::Yellow,
                Color::Red,
                Color::Gray,
            ],
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            muted: Color::DarkGray,
            error: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            value: Style::default().add_modifier(Modifier::BOLD),
            histogram: Color::Magenta,
            categories: [
                Color::Green,
                Color::Cyan,
                Color::Blue,
                Color::Magenta,
                Color::Yellow,
                Color::Red,
                Color::DarkGray,
            ],
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a pore category.
    pub fn category_color(&self, category: PoreCategory) -> Color {
        let index = PoreCategory::ALL.iter().position(|c| *c == category).unwrap_or(0);
        self.categories[index]
    }

    /// Style for placeholder text; incomplete snapshots stand out.
    pub fn placeholder_style(&self, reason: PlaceholderReason) -> Style {
        match reason {
            PlaceholderReason::Incomplete => {
                Style::default().fg(self.error).add_modifier(Modifier::BOLD)
            }
            PlaceholderReason::NoRun => {
                Style::default().fg(self.muted).add_modifier(Modifier::ITALIC)
            }
        }
    }
}
