use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a [`PageClient`](crate::client::PageClient) operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The browser could not load the page
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The page did not finish loading in time
    #[error("navigation to {url} did not finish within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    /// No element matched the selector before the wait expired
    #[error("timed out after {timeout:?} waiting for `{selector}`")]
    Timeout { selector: String, timeout: Duration },

    /// The selector could not be parsed
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// Any other automation command failure
    #[error("browser command failed: {0}")]
    Command(String),
}

/// Errors raised while building a pipeline configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("url template `{0}` has no {{page}} placeholder")]
    MissingPlaceholder(String),

    #[error("generated page url `{url}` is not a valid absolute url: {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("at least one detail selector is required")]
    NoDetailSelectors,
}

/// Fatal errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to open browser session at {webdriver_url}: {source}")]
    Session {
        webdriver_url: String,
        #[source]
        source: fantoccini::error::NewSessionError,
    },

    #[error("listing page {page_index} ({url}) failed: {source}")]
    Listing {
        page_index: i64,
        url: String,
        #[source]
        source: ClientError,
    },

    #[error("failed to write output to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
