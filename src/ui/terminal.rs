//! Full-screen dashboard on the controlling terminal.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::dashboard::{self, Header};
use super::theme::Theme;
use crate::app::DashboardSink;
use crate::data::DashboardBatch;

/// Renders each batch with ratatui.
///
/// [`TerminalDashboard::start`] switches the terminal to raw mode on the
/// alternate screen; call [`TerminalDashboard::restore`] when the loop ends.
pub struct TerminalDashboard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
    source: String,
    interval: Duration,
}

impl TerminalDashboard {
    pub fn start(source: impl Into<String>, interval: Duration, theme: Theme) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Restore the terminal before the panic message is printed
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic);
        }));

        Ok(Self {
            terminal,
            theme,
            source: source.into(),
            interval,
        })
    }

    pub fn restore(mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl DashboardSink for TerminalDashboard {
    fn render(&mut self, batch: &DashboardBatch) -> Result<()> {
        let header = Header {
            source: &self.source,
            interval: self.interval,
        };
        let theme = &self.theme;
        self.terminal
            .draw(|frame| dashboard::render(frame, batch, theme, &header))?;
        Ok(())
    }
}
