//! Headless page behaviours: the mobile menu toggle, course-card reveal on
//! scroll, and the bridge from a video player to the progress reporter.
//!
//! Components take the elements they drive as arguments, so several can live
//! on one page and none of them depend on a document being loaded.

#![forbid(unsafe_code)]

pub mod element;
pub mod menu;
pub mod playback;
pub mod reveal;

pub use element::{Element, MemoryElement};
pub use menu::MenuToggle;
pub use playback::PlaybackBinding;
pub use reveal::{CardReveal, IntersectionEntry, ObservedId};
