//! Error types for instrument queries and snapshot normalization.

use thiserror::Error;

/// Errors raised by an [`Instrument`](crate::source::Instrument) while
/// talking to the control server.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The control server could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server answered with an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered 404 for this path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Reading a local instrument dump failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// The instrument does not know this position.
    #[error("Unknown position '{0}'")]
    UnknownPosition(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

/// A position could not be queried this cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Position {position} unreachable: {source}")]
    PositionUnreachable {
        position: String,
        #[source]
        source: SourceError,
    },
}

/// An expected field was structurally absent from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing field: {path}")]
pub struct FieldMissing {
    /// Dotted path of the absent field, e.g. `yield_summary.read_count`.
    pub path: String,
}

impl FieldMissing {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Why a yield summary could not be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error(transparent)]
    FieldMissing(#[from] FieldMissing),

    /// Summaries are only meaningful for an active run.
    #[error("No active run (status: {0})")]
    NotRunning(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_missing_message() {
        let err = FieldMissing::new("yield_summary.read_count");
        assert_eq!(err.to_string(), "Missing field: yield_summary.read_count");
    }

    #[test]
    fn test_unreachable_message_includes_position() {
        let err = FetchError::PositionUnreachable {
            position: "X1".to_string(),
            source: SourceError::Timeout,
        };
        assert_eq!(err.to_string(), "Position X1 unreachable: Request timed out");
    }
}
