use services::{ProgressReporter, ReportError, ReportHandle};
use tracing::debug;
use wim_core::LessonId;

/// Connects a video player on a lesson page to the progress reporter.
///
/// The player calls [`PlaybackBinding::on_time_update`] at its own cadence;
/// every call becomes one report.
#[derive(Debug, Clone)]
pub struct PlaybackBinding {
    reporter: ProgressReporter,
    lesson_id: LessonId,
}

impl PlaybackBinding {
    #[must_use]
    pub fn new(reporter: ProgressReporter, lesson_id: LessonId) -> Self {
        Self {
            reporter,
            lesson_id,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    /// Report the player's position. Rejected samples are logged and dropped.
    pub fn on_time_update(&self, current_time: f64, duration: f64) -> Option<ReportHandle> {
        match self.reporter.report(self.lesson_id, current_time, duration) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log_rejected(self.lesson_id, &err);
                None
            }
        }
    }
}

fn log_rejected(lesson_id: LessonId, err: &ReportError) {
    debug!(lesson = %lesson_id, error = %err, "progress sample not reported");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use services::{
        DispatchError, ProgressRequest, ProgressTransport, ReporterConfig, StaticCookies,
        StatusCode,
    };

    use super::*;

    #[derive(Default)]
    struct CountingTransport {
        paths: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProgressTransport for CountingTransport {
        async fn send(&self, request: ProgressRequest) -> Result<StatusCode, DispatchError> {
            self.paths.lock().unwrap().push(request.path().to_string());
            Ok(StatusCode::OK)
        }
    }

    fn binding() -> (PlaybackBinding, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport::default());
        let reporter = ProgressReporter::with_transport(
            ReporterConfig::parse("http://wim.test").unwrap(),
            Arc::new(StaticCookies::new().with("csrftoken", "t")),
            Arc::clone(&transport) as Arc<dyn ProgressTransport>,
        );
        (PlaybackBinding::new(reporter, LessonId::new(12)), transport)
    }

    #[tokio::test]
    async fn every_time_update_is_reported() {
        let (binding, transport) = binding();

        let handles: Vec<_> = [1.0, 2.0, 3.0]
            .into_iter()
            .filter_map(|t| binding.on_time_update(t, 90.0))
            .collect();
        assert_eq!(handles.len(), 3);
        for handle in handles {
            handle.outcome().await.unwrap();
        }

        let paths = transport.paths.lock().unwrap().clone();
        assert_eq!(paths, vec!["/api/lessons/12/progress/"; 3]);
    }

    #[tokio::test]
    async fn metadata_not_loaded_is_skipped() {
        let (binding, transport) = binding();

        // Players report NaN until the media duration is known.
        assert!(binding.on_time_update(0.0, f64::NAN).is_none());
        assert!(transport.paths.lock().unwrap().is_empty());
    }
}
