use thiserror::Error;

/// Failures while talking to or reading from the TARIC site.
///
/// Structural absence (no results table, no details container) is not an
/// error and never shows up here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// DNS, connect, timeout or non-2xx status. Never retried.
    #[error("failed to fetch data from TARIC website ({url}): {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid endpoint URL {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid CSS selector {0:?}")]
    Selector(&'static str),
}

impl ScrapeError {
    pub fn is_timeout(&self) -> bool {
        match self {
            ScrapeError::Fetch { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Bad input at the calling boundary, kept apart from scraping failures.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid JSON in request body")]
    InvalidJson(#[from] serde_json::Error),

    #[error("At least one of 'origin' or 'order_number' must be provided")]
    MissingCriteria,
}
