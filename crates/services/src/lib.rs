#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod reporter;
pub mod transport;

pub use reqwest::StatusCode;
pub use wim_core::{CookieStore, DocumentCookies, LessonId, StaticCookies, ValidationPolicy};

pub use config::ReporterConfig;
pub use error::{DispatchError, ReportError, ReporterConfigError};
pub use reporter::{ProgressReporter, ReportHandle, ReportOutcome};
pub use transport::{HttpTransport, ProgressRequest, ProgressTransport};
