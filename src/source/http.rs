//! HTTP gateway instrument.
//!
//! Queries a JSON gateway placed in front of the instrument control server.
//!
//! ## Endpoints
//!
//! - `GET {endpoint}/positions`: position names in display order
//! - `GET {endpoint}/positions/{name}/report?data_type=..&discard_outliers_percent=..`:
//!   one [`RawPositionReport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use poretop::source::{HistogramRequest, HttpInstrument, Instrument};
//!
//! let mut instrument = HttpInstrument::builder()
//!     .endpoint("http://sequencer.local:8000")
//!     .build()
//!     .unwrap();
//!
//! for position in instrument.positions().unwrap() {
//!     let report = instrument.report(&position, &HistogramRequest::default()).unwrap();
//!     println!("{}: {} mux scans", position, report.mux_scans.len());
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{HistogramRequest, Instrument, RawPositionReport};
use crate::data::Position;
use crate::error::SourceError;

/// Instrument reached over HTTP.
///
/// Owns a single-threaded runtime so each query blocks the caller until
/// the response has been decoded.
#[derive(Debug)]
pub struct HttpInstrument {
    runtime: Runtime,
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpInstrument {
    /// Create a new builder for configuring the instrument.
    pub fn builder() -> HttpInstrumentBuilder {
        HttpInstrumentBuilder::default()
    }

    /// The gateway base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        debug!(url, "Querying instrument gateway");
        self.runtime.block_on(async {
            let response = self.client.get(url).query(query).send().await?;
            let response = check_status(response)?;
            let body = response.json::<T>().await.map_err(|e| SourceError::Parse(e.to_string()))?;
            Ok(body)
        })
    }
}

fn check_status(response: Response) -> Result<Response, SourceError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(SourceError::NotFound(response.url().path().to_string())),
        status => Err(SourceError::Http(format!("API returned status {}", status))),
    }
}

impl Instrument for HttpInstrument {
    fn description(&self) -> &str {
        &self.description
    }

    fn positions(&mut self) -> Result<Vec<Position>, SourceError> {
        let url = format!("{}/positions", self.endpoint);
        let names: Vec<String> = self.get(&url, &[])?;
        Ok(names.into_iter().map(Position::new).collect())
    }

    fn report(
        &mut self,
        position: &Position,
        histogram: &HistogramRequest,
    ) -> Result<RawPositionReport, SourceError> {
        let url = format!(
            "{}/positions/{}/report",
            self.endpoint,
            urlencoded(position.name())
        );
        let query = [
            ("data_type", histogram.kind.as_str().to_string()),
            (
                "discard_outliers_percent",
                histogram.discard_outliers_percent.to_string(),
            ),
        ];
        self.get(&url, &query).map_err(|err| match err {
            SourceError::NotFound(_) => SourceError::UnknownPosition(position.name().to_string()),
            other => other,
        })
    }
}

/// Builder for HttpInstrument.
#[derive(Debug, Default)]
pub struct HttpInstrumentBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpInstrumentBuilder {
    /// Set the gateway endpoint (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set a per-request timeout. Requests wait indefinitely by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the instrument.
    pub fn build(self) -> Result<HttpInstrument, SourceError> {
        let mut client = Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }
        let client = client.build()?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("http: {}", endpoint);

        Ok(HttpInstrument {
            runtime,
            client,
            endpoint,
            description,
        })
    }
}

// URL encode a position name for use in paths
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F").replace(' ', "%20")
}
