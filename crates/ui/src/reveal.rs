use crate::element::Element;

pub const FADE_IN_CLASS: &str = "fade-in";

/// Handle for an element registered with a [`CardReveal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservedId(usize);

/// One intersection change reported by the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ObservedId,
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    #[must_use]
    pub fn new(target: ObservedId, intersection_ratio: f64) -> Self {
        Self {
            target,
            intersection_ratio,
        }
    }

    #[must_use]
    pub fn is_intersecting(&self) -> bool {
        self.intersection_ratio > 0.0
    }
}

#[derive(Debug)]
struct Observed<E> {
    element: E,
    revealed: bool,
}

/// Fades course cards in the first time they become visible.
///
/// Reveals are permanent; later entries for a revealed card are ignored.
#[derive(Debug)]
pub struct CardReveal<E> {
    class: String,
    observed: Vec<Observed<E>>,
}

impl<E: Element> Default for CardReveal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> CardReveal<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            class: FADE_IN_CLASS.to_string(),
            observed: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    pub fn observe(&mut self, element: E) -> ObservedId {
        self.observed.push(Observed {
            element,
            revealed: false,
        });
        ObservedId(self.observed.len() - 1)
    }

    pub fn observe_all(&mut self, elements: impl IntoIterator<Item = E>) -> Vec<ObservedId> {
        elements.into_iter().map(|element| self.observe(element)).collect()
    }

    /// Apply a batch of intersection changes; returns how many cards were newly revealed.
    ///
    /// Entries for unknown ids are ignored.
    pub fn handle_entries(&mut self, entries: impl IntoIterator<Item = IntersectionEntry>) -> usize {
        let mut newly_revealed = 0;
        for entry in entries {
            if !entry.is_intersecting() {
                continue;
            }
            let Some(observed) = self.observed.get_mut(entry.target.0) else {
                continue;
            };
            if observed.revealed {
                continue;
            }
            observed.element.add_class(&self.class);
            observed.revealed = true;
            newly_revealed += 1;
        }
        newly_revealed
    }

    #[must_use]
    pub fn is_revealed(&self, id: ObservedId) -> bool {
        self.observed.get(id.0).is_some_and(|observed| observed.revealed)
    }

    /// Number of observed cards still waiting to be revealed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.observed.iter().filter(|observed| !observed.revealed).count()
    }

    #[must_use]
    pub fn element(&self, id: ObservedId) -> Option<&E> {
        self.observed.get(id.0).map(|observed| &observed.element)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::element::MemoryElement;

    fn cards(count: usize) -> Vec<Arc<MemoryElement>> {
        (0..count)
            .map(|_| Arc::new(MemoryElement::with_classes(["course-card"])))
            .collect()
    }

    #[test]
    fn reveals_only_intersecting_cards() {
        let cards = cards(3);
        let mut reveal = CardReveal::new();
        let ids = reveal.observe_all(cards.iter().cloned());

        let revealed = reveal.handle_entries([
            IntersectionEntry::new(ids[0], 0.25),
            IntersectionEntry::new(ids[1], 0.0),
        ]);

        assert_eq!(revealed, 1);
        assert!(cards[0].has_class("fade-in"));
        assert!(!cards[1].has_class("fade-in"));
        assert!(!cards[2].has_class("fade-in"));
        assert_eq!(reveal.pending(), 2);
    }

    #[test]
    fn reveal_is_permanent_and_idempotent() {
        let cards = cards(1);
        let mut reveal = CardReveal::new();
        let id = reveal.observe(Arc::clone(&cards[0]));

        assert_eq!(reveal.handle_entries([IntersectionEntry::new(id, 1.0)]), 1);
        assert_eq!(reveal.handle_entries([IntersectionEntry::new(id, 0.0)]), 0);
        assert_eq!(reveal.handle_entries([IntersectionEntry::new(id, 0.5)]), 0);

        assert!(reveal.is_revealed(id));
        assert_eq!(cards[0].classes(), vec!["course-card", "fade-in"]);
    }

    #[test]
    fn custom_class_and_unknown_ids() {
        let mut reveal = CardReveal::new().with_class("visible");
        let id = reveal.observe(MemoryElement::new());

        assert_eq!(reveal.handle_entries([IntersectionEntry::new(ObservedId(99), 1.0)]), 0);
        reveal.handle_entries([IntersectionEntry::new(id, 0.1)]);
        assert!(reveal.element(id).is_some_and(|card| card.has_class("visible")));
        assert!(!reveal.is_revealed(ObservedId(99)));
    }
}
