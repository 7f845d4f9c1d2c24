//! Input registries for the upload slots
//!
//! Each upload slot owns one `InputRegistry`: the ordered set of images the
//! user has currently selected for that side of the operation. Registries
//! never interact with each other; the active mode wires zero, one, or two
//! of them as the source of a batch run.

use super::data::{ImageRef, PickedFile};

/// Selection policy for one upload slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The slot holds at most one image; a new selection replaces it.
    Single,
    /// The slot holds up to `limit` images; the oldest are dropped first
    /// when the limit is exceeded.
    Multi { limit: usize },
}

/// The ordered set of selected images for one upload slot.
#[derive(Debug)]
pub struct InputRegistry {
    label: &'static str,
    selection: Selection,
    entries: Vec<ImageRef>,
}

impl InputRegistry {
    /// Create an empty registry for a slot.
    pub fn new(label: &'static str, selection: Selection) -> Self {
        InputRegistry {
            label,
            selection,
            entries: Vec::new(),
        }
    }

    /// Slot label shown in the UI (e.g., "Model photo", "Outfits").
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The slot's selection policy.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Add picked files to the slot.
    ///
    /// Non-image payloads are silently filtered out. A single-selection slot
    /// keeps only the last image of the batch, replacing any prior
    /// selection. A multi-selection slot appends in order and then truncates
    /// from the front, so the most recently added `limit` images survive.
    ///
    /// Returns the number of images accepted from this batch.
    pub fn add(&mut self, files: Vec<PickedFile>) -> usize {
        let mut accepted: Vec<ImageRef> = files
            .into_iter()
            .filter_map(ImageRef::from_picked)
            .collect();
        let count = accepted.len();

        if count == 0 {
            return 0;
        }

        match self.selection {
            Selection::Single => {
                // Only the last image of the batch is kept
                let last = accepted.remove(accepted.len() - 1);
                self.entries.clear();
                self.entries.push(last);
            }
            Selection::Multi { limit } => {
                self.entries.append(&mut accepted);
                if self.entries.len() > limit {
                    let overflow = self.entries.len() - limit;
                    self.entries.drain(0..overflow);
                }
            }
        }

        count
    }

    /// Remove the first entry with the given display name.
    ///
    /// Names are assumed unique within a slot.
    pub fn remove(&mut self, name: &str) {
        if let Some(position) = self.entries.iter().position(|entry| entry.name == name) {
            self.entries.remove(position);
        }
    }

    /// Release all entries. Used when the mode changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The current selection, in order.
    pub fn entries(&self) -> &[ImageRef] {
        &self.entries
    }

    /// Number of selected images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the slot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x00";

    fn png(name: &str) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            bytes: PNG_HEADER.to_vec(),
        }
    }

    fn text_file(name: &str) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            bytes: b"not an image".to_vec(),
        }
    }

    fn names(registry: &InputRegistry) -> Vec<&str> {
        registry
            .entries()
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }

    #[test]
    fn test_non_images_are_filtered() {
        let mut registry = InputRegistry::new("Outfits", Selection::Multi { limit: 6 });

        let accepted = registry.add(vec![png("a.png"), text_file("readme.md"), png("b.png")]);

        assert_eq!(accepted, 2);
        assert_eq!(names(&registry), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_single_slot_keeps_only_last_of_batch() {
        let mut registry = InputRegistry::new("Model photo", Selection::Single);

        registry.add(vec![png("first.png"), png("second.png"), png("third.png")]);

        assert_eq!(names(&registry), vec!["third.png"]);
    }

    #[test]
    fn test_single_slot_replaces_prior_selection() {
        let mut registry = InputRegistry::new("Model photo", Selection::Single);

        registry.add(vec![png("old.png")]);
        registry.add(vec![png("new.png")]);

        assert_eq!(names(&registry), vec!["new.png"]);
    }

    #[test]
    fn test_multi_slot_truncates_from_front() {
        let mut registry = InputRegistry::new("Outfits", Selection::Multi { limit: 3 });

        registry.add(vec![png("1.png"), png("2.png")]);
        registry.add(vec![png("3.png"), png("4.png"), png("5.png")]);

        // The most recent 3 survive, in their original relative order
        assert_eq!(names(&registry), vec!["3.png", "4.png", "5.png"]);
    }

    #[test]
    fn test_multi_slot_preserves_order_under_limit() {
        let mut registry = InputRegistry::new("Outfits", Selection::Multi { limit: 6 });

        registry.add(vec![png("a.png")]);
        registry.add(vec![png("b.png"), png("c.png")]);

        assert_eq!(names(&registry), vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn test_remove_by_name() {
        let mut registry = InputRegistry::new("Outfits", Selection::Multi { limit: 6 });

        registry.add(vec![png("a.png"), png("b.png"), png("c.png")]);
        registry.remove("b.png");

        assert_eq!(names(&registry), vec!["a.png", "c.png"]);

        // Removing an unknown name is a no-op
        registry.remove("missing.png");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut registry = InputRegistry::new("Posters", Selection::Multi { limit: 6 });

        registry.add(vec![png("a.png"), png("b.png")]);
        registry.clear();

        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_filtered_batch_leaves_single_slot_untouched() {
        let mut registry = InputRegistry::new("Model photo", Selection::Single);

        registry.add(vec![png("keep.png")]);
        let accepted = registry.add(vec![text_file("junk.bin")]);

        assert_eq!(accepted, 0);
        assert_eq!(names(&registry), vec!["keep.png"]);
    }
}
