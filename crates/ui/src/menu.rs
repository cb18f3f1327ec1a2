use crate::element::Element;

pub const ACTIVE_CLASS: &str = "active";

/// Opens and closes the mobile navigation panel.
#[derive(Debug)]
pub struct MenuToggle<E> {
    panel: E,
    class: String,
}

impl<E: Element> MenuToggle<E> {
    #[must_use]
    pub fn new(panel: E) -> Self {
        Self {
            panel,
            class: ACTIVE_CLASS.to_string(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Flip the panel and return whether it is now open.
    pub fn toggle(&self) -> bool {
        self.panel.toggle_class(&self.class)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.panel.has_class(&self.class)
    }

    #[must_use]
    pub fn panel(&self) -> &E {
        &self.panel
    }
}
