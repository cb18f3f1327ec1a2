use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderName};
use reqwest::{Client, StatusCode};
use url::Url;
use wim_core::{LessonId, ProgressReport};

use crate::error::DispatchError;

/// A fully built progress request, ready to be written to the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRequest {
    pub lesson_id: LessonId,
    pub url: Url,
    pub csrf_header: HeaderName,
    /// `None` when the cookie store had no token; the request is still sent.
    pub csrf_token: Option<String>,
    pub cookie_header: Option<String>,
    pub report: ProgressReport,
}

impl ProgressRequest {
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// The JSON body as it will be sent.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        serde_json::to_value(self.report).unwrap_or(serde_json::Value::Null)
    }
}

/// Delivers progress requests.
#[async_trait]
pub trait ProgressTransport: Send + Sync {
    /// Send one request and return the response status.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` when the request cannot be delivered or the
    /// server answers with a non-success status.
    async fn send(&self, request: ProgressRequest) -> Result<StatusCode, DispatchError>;
}

/// `ProgressTransport` over HTTP using `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProgressTransport for HttpTransport {
    async fn send(&self, request: ProgressRequest) -> Result<StatusCode, DispatchError> {
        let mut builder = self.client.post(request.url).json(&request.report);

        if let Some(token) = request.csrf_token {
            builder = builder.header(request.csrf_header, token);
        }
        if let Some(cookies) = request.cookie_header {
            builder = builder.header(COOKIE, cookies);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::HttpStatus(status));
        }

        Ok(status)
    }
}
