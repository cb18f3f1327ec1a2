use crate::model::{LessonId, ProgressError, ProgressReport, ValidationPolicy};

/// One reading from a video player, produced per reporting tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSample {
    pub lesson_id: LessonId,
    pub current_time_seconds: f64,
    pub duration_seconds: f64,
}

impl PlaybackSample {
    #[must_use]
    pub fn new(lesson_id: LessonId, current_time_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            lesson_id,
            current_time_seconds,
            duration_seconds,
        }
    }

    /// Build the report for this sample.
    ///
    /// # Errors
    ///
    /// See [`ProgressReport::compute`].
    pub fn to_report(&self, policy: ValidationPolicy) -> Result<ProgressReport, ProgressError> {
        ProgressReport::compute(self.current_time_seconds, self.duration_seconds, policy)
    }
}
