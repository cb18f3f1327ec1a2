//! Shared error types for the services crate.

use thiserror::Error;

use wim_core::ProgressError;

/// Errors emitted while building a `ReporterConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReporterConfigError {
    #[error("invalid base url {raw:?}: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header name: {raw:?}")]
    InvalidHeaderName { raw: String },
    #[error("cookie name must not be empty")]
    EmptyCookieName,
    #[error("invalid timeout in seconds: {raw:?}")]
    InvalidTimeout { raw: String },
    #[error("unknown validation policy: {raw:?}")]
    InvalidPolicy { raw: String },
    #[error("invalid boolean for {var}: {raw:?}")]
    InvalidFlag { var: &'static str, raw: String },
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Errors returned synchronously by `ProgressReporter::report`.
///
/// Nothing has been sent when one of these is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error("could not build progress endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("progress reports must be sent from within a tokio runtime")]
    NoRuntime,
}

/// Errors observed by callers that await a `ReportHandle`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("progress report rejected with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("progress report was cancelled")]
    Cancelled,
    #[error("progress report task panicked")]
    Panicked,
}
