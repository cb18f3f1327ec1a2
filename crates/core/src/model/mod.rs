mod ids;
mod playback;
mod progress;

pub use ids::{LessonId, ParseIdError};
pub use playback::PlaybackSample;
pub use progress::{ProgressError, ProgressReport, ValidationPolicy, progress_path, progress_url};
