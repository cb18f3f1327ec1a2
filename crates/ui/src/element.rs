use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// A styled element whose presentation is driven by CSS classes.
///
/// Methods take `&self`: element handles are shared references to a node that
/// lives elsewhere.
pub trait Element: Send + Sync {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    /// Flip `class` and return whether it is now present.
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }
}

impl<E: Element + ?Sized> Element for Arc<E> {
    fn add_class(&self, class: &str) {
        (**self).add_class(class);
    }

    fn remove_class(&self, class: &str) {
        (**self).remove_class(class);
    }

    fn has_class(&self, class: &str) -> bool {
        (**self).has_class(class)
    }

    fn toggle_class(&self, class: &str) -> bool {
        (**self).toggle_class(class)
    }
}

/// In-memory element, used when no real document is attached.
#[derive(Debug, Default)]
pub struct MemoryElement {
    classes: Mutex<BTreeSet<String>>,
}

impl MemoryElement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            classes: Mutex::new(classes.into_iter().map(str::to_string).collect()),
        }
    }

    /// Current classes, sorted.
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Element for MemoryElement {
    fn add_class(&self, class: &str) {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(class)
    }
}
