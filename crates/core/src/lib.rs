#![forbid(unsafe_code)]

pub mod cookies;
pub mod model;

pub use cookies::{CookieStore, DocumentCookies, StaticCookies};
pub use model::{LessonId, PlaybackSample, ProgressError, ProgressReport, ValidationPolicy};
