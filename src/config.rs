//! Layered settings.
//!
//! Built-in defaults, then an optional TOML file, then `PORETOP_*`
//! environment variables, then command-line overrides.
//!
//! ```toml
//! interval = 60
//! readcounts = true
//! endpoint = "http://sequencer.local:8000"
//! timeout = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::SummaryOptions;

/// Environment variable prefix, e.g. `PORETOP_INTERVAL=60`.
pub const ENV_PREFIX: &str = "PORETOP";

/// Longest accepted polling interval, one week in seconds.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Dump read when no other source is configured.
pub const DEFAULT_FILE: &str = "instrument.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Seconds between polling cycles.
    pub interval: u64,
    /// Plot histograms on log10 axes.
    pub log: bool,
    /// Use the read-count histogram instead of read lengths.
    pub readcounts: bool,
    pub discard_outlier_percent: f64,
    /// Instrument dump to read.
    pub file: Option<PathBuf>,
    /// Gateway URL to query.
    pub endpoint: Option<String>,
    /// Request timeout in seconds. Unset means wait forever.
    pub timeout: Option<u64>,
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<u64>,
    pub log: Option<bool>,
    pub readcounts: Option<bool>,
    pub file: Option<PathBuf>,
    pub endpoint: Option<String>,
}

impl Settings {
    /// Load from all layers.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::build(
            config_path,
            Environment::with_prefix(ENV_PREFIX).try_parsing(true),
            overrides,
        )
    }

    fn build(
        config_path: Option<&Path>,
        environment: Environment,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("interval", 300_i64)?
            .set_default("log", false)?
            .set_default("readcounts", false)?
            .set_default("discard_outlier_percent", 0.25)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let interval = overrides
            .interval
            .map(i64::try_from)
            .transpose()
            .context("interval is out of range")?;

        let settings: Settings = builder
            .add_source(environment)
            .set_override_option("interval", interval)?
            .set_override_option("log", overrides.log)?
            .set_override_option("readcounts", overrides.readcounts)?
            .set_override_option(
                "file",
                overrides.file.as_ref().map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("endpoint", overrides.endpoint.clone())?
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            bail!("interval must be greater than zero");
        }
        if self.interval > MAX_INTERVAL_SECS {
            bail!(
                "interval must be at most {} seconds, got {}",
                MAX_INTERVAL_SECS,
                self.interval
            );
        }
        if !(0.0..100.0).contains(&self.discard_outlier_percent) {
            bail!(
                "discard_outlier_percent must be in [0, 100), got {}",
                self.discard_outlier_percent
            );
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            use_read_counts: self.readcounts,
            discard_outlier_percent: self.discard_outlier_percent,
            log_scale: self.log,
        }
    }

    /// The dump to read when no endpoint is configured.
    pub fn file_or_default(&self) -> PathBuf {
        self.file.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
    }
}
