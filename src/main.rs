use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use poretop::app::{Pacer, SleepPacer, StopSignal};
use poretop::config::{Overrides, Settings};
use poretop::events::KeyboardPacer;
use poretop::source::{FileInstrument, HttpInstrument, Instrument};
use poretop::ui::{TerminalDashboard, TextDashboard, Theme};
use poretop::PollingLoop;

#[derive(Parser, Debug)]
#[command(name = "poretop")]
#[command(about = "Terminal dashboard for nanopore sequencing positions")]
struct Args {
    /// Seconds between polling cycles [default: 300]
    #[arg(short, long)]
    interval: Option<u64>,

    /// Plot histograms on log10 axes
    #[arg(long)]
    log: bool,

    /// Show the read-count histogram instead of read lengths
    #[arg(long)]
    readcounts: bool,

    /// Instrument dump to read [default: instrument.json]
    #[arg(short, long, conflicts_with = "connect")]
    file: Option<PathBuf>,

    /// Gateway URL to query (e.g. http://localhost:8000)
    #[arg(short, long, conflicts_with = "file")]
    connect: Option<String>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poll once, write the batch as JSON and exit
    #[arg(short, long, conflicts_with = "plain")]
    export: Option<PathBuf>,

    /// Print plain text blocks instead of the full-screen dashboard
    #[arg(long)]
    plain: bool,

    /// Write logs to this file (the dashboard owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            interval: self.interval,
            log: self.log.then_some(true),
            readcounts: self.readcounts.then_some(true),
            file: self.file.clone(),
            endpoint: self.connect.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let full_screen = args.export.is_none() && !args.plain;
    init_logging(&args, full_screen)?;

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    let instrument = open_instrument(&settings, args.file.is_some())?;
    let mut polling =
        PollingLoop::new(instrument, settings.summary_options(), settings.interval());

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return export_to_file(&mut polling, &export_path);
    }

    let stop = StopSignal::new();
    if args.plain {
        // Ctrl-C arrives as a signal, not a key, outside raw mode
        let runtime = tokio::runtime::Runtime::new()?;
        let signal_stop = stop.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_stop.request();
            }
        });
        let mut sink = TextDashboard::new(io::stdout());
        let mut pacer = SleepPacer::new(stop);
        polling.run(&mut sink, &mut pacer)?;
        runtime.shutdown_background();
    } else {
        let mut dashboard = TerminalDashboard::start(
            polling.instrument().description(),
            settings.interval(),
            Theme::auto_detect(),
        )?;
        let mut pacer = KeyboardPacer::new(stop);
        let result = polling.run(&mut dashboard, &mut pacer);
        dashboard.restore()?;
        result?;
    }

    println!("Stopped after {} cycle(s).", polling.cycles());
    Ok(())
}

fn init_logging(args: &Args, full_screen: bool) -> Result<()> {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Logging to the terminal would tear the dashboard
        None if full_screen => {}
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn open_instrument(settings: &Settings, file_given: bool) -> Result<Box<dyn Instrument>> {
    // An explicit --file beats an endpoint from the config file or environment
    match &settings.endpoint {
        Some(endpoint) if !file_given => {
            let mut builder = HttpInstrument::builder().endpoint(endpoint.as_str());
            if let Some(timeout) = settings.timeout() {
                builder = builder.timeout(timeout);
            }
            let instrument = builder
                .build()
                .with_context(|| format!("Failed to set up client for {}", endpoint))?;
            Ok(Box::new(instrument))
        }
        _ => Ok(Box::new(FileInstrument::new(settings.file_or_default()))),
    }
}

/// Poll every position once and write the batch as pretty JSON.
fn export_to_file<I: Instrument>(polling: &mut PollingLoop<I>, export_path: &Path) -> Result<()> {
    let mut pacer = NeverInterrupted;
    let batch = polling
        .poll_cycle(&mut pacer)
        .context("Polling was interrupted")?;

    let json = serde_json::to_string_pretty(&batch)?;
    std::fs::write(export_path, json)
        .with_context(|| format!("Failed to write {}", export_path.display()))?;

    info!(positions = batch.len(), path = %export_path.display(), "Exported batch");
    println!("Exported {} position(s) to {}", batch.len(), export_path.display());
    Ok(())
}

/// Pacer for a single cycle.
struct NeverInterrupted;

impl Pacer for NeverInterrupted {
    fn wait(&mut self, _timeout: Duration) -> Result<poretop::WaitOutcome> {
        Ok(poretop::WaitOutcome::Elapsed)
    }

    fn interrupted(&mut self) -> bool {
        false
    }
}
