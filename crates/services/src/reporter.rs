use std::sync::Arc;

use reqwest::StatusCode;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;
use wim_core::model::progress_url;
use wim_core::{CookieStore, LessonId, PlaybackSample, ProgressReport};

use crate::config::ReporterConfig;
use crate::error::{DispatchError, ReportError, ReporterConfigError};
use crate::transport::{HttpTransport, ProgressRequest, ProgressTransport};

/// What the server said about a delivered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    pub lesson_id: LessonId,
    pub status: StatusCode,
}

/// A report in flight.
///
/// Dropping the handle detaches the task: the request is still sent and its
/// result is discarded.
#[derive(Debug)]
pub struct ReportHandle {
    lesson_id: LessonId,
    task: JoinHandle<Result<ReportOutcome, DispatchError>>,
}

impl ReportHandle {
    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the report. A request that already reached the server is not recalled.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the report to finish.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` if delivery failed, the server rejected the
    /// report, or the task was aborted.
    pub async fn outcome(self) -> Result<ReportOutcome, DispatchError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(DispatchError::Cancelled),
            Err(_) => Err(DispatchError::Panicked),
        }
    }
}

/// Computes lesson progress and posts it to the platform.
///
/// Every successful call to [`ProgressReporter::report`] issues exactly one
/// request on its own task. Calls are not batched, deduplicated, or ordered.
#[derive(Clone)]
pub struct ProgressReporter {
    config: Arc<ReporterConfig>,
    cookies: Arc<dyn CookieStore>,
    transport: Arc<dyn ProgressTransport>,
}

impl ProgressReporter {
    /// Build a reporter that sends over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ReporterConfigError::Client` if the HTTP client cannot be built.
    pub fn new(
        config: ReporterConfig,
        cookies: Arc<dyn CookieStore>,
    ) -> Result<Self, ReporterConfigError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, cookies, Arc::new(transport)))
    }

    /// Build a reporter from `WIM_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ReporterConfigError` for unusable configuration values.
    pub fn from_env(cookies: Arc<dyn CookieStore>) -> Result<Self, ReporterConfigError> {
        Self::new(ReporterConfig::from_env()?, cookies)
    }

    #[must_use]
    pub fn with_transport(
        config: ReporterConfig,
        cookies: Arc<dyn CookieStore>,
        transport: Arc<dyn ProgressTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            cookies,
            transport,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Build the request for a playback position without sending it.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Progress` when the configured validation policy
    /// rejects the numbers, and `ReportError::Endpoint` if the URL cannot be built.
    pub fn prepare(
        &self,
        lesson_id: LessonId,
        current_time: f64,
        duration: f64,
    ) -> Result<ProgressRequest, ReportError> {
        let report = ProgressReport::compute(current_time, duration, self.config.validation)?;
        let url = progress_url(&self.config.base_url, lesson_id)?;
        let csrf_token = self.cookies.get_token(&self.config.csrf_cookie);
        let cookie_header = if self.config.forward_cookies {
            self.cookies.header_value()
        } else {
            None
        };

        Ok(ProgressRequest {
            lesson_id,
            url,
            csrf_header: self.config.csrf_header.clone(),
            csrf_token,
            cookie_header,
            report,
        })
    }

    /// Compute and send a progress report without waiting for the response.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when the sample is rejected or no tokio runtime is
    /// available. Nothing is sent in that case.
    pub fn report(
        &self,
        lesson_id: LessonId,
        current_time: f64,
        duration: f64,
    ) -> Result<ReportHandle, ReportError> {
        let request = self.prepare(lesson_id, current_time, duration)?;
        self.dispatch(request)
    }

    /// # Errors
    ///
    /// See [`ProgressReporter::report`].
    pub fn report_sample(&self, sample: &PlaybackSample) -> Result<ReportHandle, ReportError> {
        self.report(
            sample.lesson_id,
            sample.current_time_seconds,
            sample.duration_seconds,
        )
    }

    /// Send an already built request on a new task.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NoRuntime` outside a tokio runtime.
    pub fn dispatch(&self, request: ProgressRequest) -> Result<ReportHandle, ReportError> {
        let runtime = Handle::try_current().map_err(|_| ReportError::NoRuntime)?;
        let transport = Arc::clone(&self.transport);
        let lesson_id = request.lesson_id;

        debug!(
            lesson = %lesson_id,
            progress = request.report.progress(),
            has_token = request.csrf_token.is_some(),
            "dispatching progress report"
        );

        let task = runtime.spawn(async move {
            match transport.send(request).await {
                Ok(status) => {
                    debug!(lesson = %lesson_id, %status, "progress report delivered");
                    Ok(ReportOutcome { lesson_id, status })
                }
                Err(err) => {
                    debug!(lesson = %lesson_id, error = %err, "progress report failed");
                    Err(err)
                }
            }
        });

        Ok(ReportHandle { lesson_id, task })
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
