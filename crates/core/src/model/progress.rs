use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::model::LessonId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("duration must be a finite number of seconds greater than zero, got {duration}")]
    InvalidDuration { duration: f64 },

    #[error("current time must be a finite, non-negative number of seconds, got {current_time}")]
    InvalidPosition { current_time: f64 },
}

/// How playback samples are checked before a report is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Reject samples with a non-positive or non-finite duration, or a
    /// negative or non-finite position.
    #[default]
    Strict,
    /// Forward whatever the player reported. A zero duration produces a
    /// non-finite percentage.
    PassThrough,
}

impl ValidationPolicy {
    /// Parses `strict` or `pass-through` (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "pass-through" | "passthrough" | "pass_through" => Some(Self::PassThrough),
            _ => None,
        }
    }
}

/// Body of a lesson progress report.
///
/// Serializes as `{"progress": <percent>, "current_time": <seconds>}`.
/// Non-finite values serialize as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressReport {
    progress: f64,
    current_time: f64,
}

impl ProgressReport {
    /// Compute a report from a playback position and duration.
    ///
    /// The percentage is `current_time / duration * 100` with no rounding or
    /// clamping, so a position past the end yields more than 100.
    ///
    /// # Errors
    ///
    /// Under `ValidationPolicy::Strict`, returns `ProgressError::InvalidDuration`
    /// when `duration` is not finite or not positive, and
    /// `ProgressError::InvalidPosition` when `current_time` is not finite or is
    /// negative. `ValidationPolicy::PassThrough` never fails.
    pub fn compute(
        current_time: f64,
        duration: f64,
        policy: ValidationPolicy,
    ) -> Result<Self, ProgressError> {
        if policy == ValidationPolicy::Strict {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(ProgressError::InvalidDuration { duration });
            }
            if !current_time.is_finite() || current_time < 0.0 {
                return Err(ProgressError::InvalidPosition { current_time });
            }
        }

        Ok(Self {
            progress: (current_time / duration) * 100.0,
            current_time,
        })
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Whether the percentage is a real number (false for zero-duration samples
    /// forwarded under `ValidationPolicy::PassThrough`).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.progress.is_finite()
    }
}

/// Server path for a lesson's progress endpoint: `/api/lessons/{id}/progress/`.
#[must_use]
pub fn progress_path(lesson_id: LessonId) -> String {
    format!("/api/lessons/{lesson_id}/progress/")
}

/// Resolve the progress endpoint against a base URL.
///
/// A path prefix on `base` is kept, so `https://host/wim` resolves to
/// `https://host/wim/api/lessons/{id}/progress/`.
///
/// # Errors
///
/// Returns `url::ParseError` if the joined URL is invalid.
pub fn progress_url(base: &Url, lesson_id: LessonId) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(progress_path(lesson_id).trim_start_matches('/'))
}
