//! Operating modes
//!
//! Exactly one mode is active at a time. Each mode decides which upload
//! slots exist, what the instruction defaults to, and when a run may start.
//! Switching modes clears every slot and the result set and resets the
//! instruction to the new mode's default.

use super::registry::Selection;

/// Images a multi-selection slot will hold before the oldest are dropped
pub const MULTI_SELECT_LIMIT: usize = 6;

/// The five operating modes of the studio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One model photo combined with each of N outfits
    TryOnOutfits,
    /// Each of N model photos combined with one outfit
    TryOnModels,
    /// Edit a single image via a text instruction
    EditImage,
    /// Generate an image from a text prompt alone
    GenerateImage,
    /// Place each poster graphic on the wall of a room scene
    PosterPlacement,
}

/// Configuration for one upload slot wired by a mode.
#[derive(Debug, Clone, Copy)]
pub struct SlotConfig {
    /// Label shown in the slot header
    pub label: &'static str,
    /// Selection policy for the slot
    pub selection: Selection,
}

impl Mode {
    /// All modes, in tab order.
    pub const ALL: [Mode; 5] = [
        Mode::TryOnOutfits,
        Mode::TryOnModels,
        Mode::EditImage,
        Mode::GenerateImage,
        Mode::PosterPlacement,
    ];

    /// Tab label.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::TryOnOutfits => "One Model, Many Outfits",
            Mode::TryOnModels => "Many Models, One Outfit",
            Mode::EditImage => "Edit Image",
            Mode::GenerateImage => "Generate Image",
            Mode::PosterPlacement => "Poster in Room",
        }
    }

    /// The upload slots this mode wires: (primary, secondary).
    ///
    /// Primary is the first argument of the remote call in paired modes
    /// (the model photo side); secondary is the outfit side.
    pub fn slots(&self) -> (Option<SlotConfig>, Option<SlotConfig>) {
        match self {
            Mode::TryOnOutfits => (
                Some(SlotConfig {
                    label: "Model photo",
                    selection: Selection::Single,
                }),
                Some(SlotConfig {
                    label: "Outfits",
                    selection: Selection::Multi {
                        limit: MULTI_SELECT_LIMIT,
                    },
                }),
            ),
            Mode::TryOnModels => (
                Some(SlotConfig {
                    label: "Model photos",
                    selection: Selection::Multi {
                        limit: MULTI_SELECT_LIMIT,
                    },
                }),
                Some(SlotConfig {
                    label: "Outfit",
                    selection: Selection::Single,
                }),
            ),
            Mode::EditImage => (
                Some(SlotConfig {
                    label: "Image",
                    selection: Selection::Single,
                }),
                None,
            ),
            Mode::GenerateImage => (None, None),
            Mode::PosterPlacement => (
                Some(SlotConfig {
                    label: "Posters",
                    selection: Selection::Multi {
                        limit: MULTI_SELECT_LIMIT,
                    },
                }),
                None,
            ),
        }
    }

    /// The instruction text a mode starts with.
    ///
    /// Paired modes ship a ready-to-use try-on prompt; edit and generate
    /// start empty and force the user to describe what they want.
    pub fn default_instruction(&self) -> &'static str {
        match self {
            Mode::TryOnOutfits | Mode::TryOnModels => {
                "Make the model in the first image wear the outfit from the second image. \
                 Keep the model's pose, face, and the background unchanged. \
                 Return only the final image."
            }
            Mode::EditImage => "",
            Mode::GenerateImage => "",
            Mode::PosterPlacement => {
                "Hang this poster as a framed print on the wall of a bright, modern living room. \
                 Keep the poster's artwork exactly as provided."
            }
        }
    }

    /// Placeholder for the instruction field.
    pub fn instruction_placeholder(&self) -> &'static str {
        match self {
            Mode::TryOnOutfits | Mode::TryOnModels => "Describe how the outfit should be worn...",
            Mode::EditImage => "Describe the edit to apply...",
            Mode::GenerateImage => "Describe the image to generate...",
            Mode::PosterPlacement => "Describe the room and how the poster should hang...",
        }
    }

    /// Whether a run in this mode needs a non-empty instruction.
    ///
    /// The paired modes work off their default prompt; edit, generate, and
    /// poster placement refuse to start without one.
    pub fn requires_instruction(&self) -> bool {
        matches!(
            self,
            Mode::EditImage | Mode::GenerateImage | Mode::PosterPlacement
        )
    }

    /// Run precondition, enforced by the submit gating (not the runner):
    /// paired modes need an image on each side, single-image modes need
    /// their image, generate needs none.
    pub fn can_start(&self, primary_count: usize, secondary_count: usize, instruction: &str) -> bool {
        if self.requires_instruction() && instruction.trim().is_empty() {
            return false;
        }

        match self {
            Mode::TryOnOutfits | Mode::TryOnModels => primary_count >= 1 && secondary_count >= 1,
            Mode::EditImage | Mode::PosterPlacement => primary_count >= 1,
            Mode::GenerateImage => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_modes_have_default_prompt() {
        assert!(!Mode::TryOnOutfits.default_instruction().is_empty());
        assert!(!Mode::TryOnModels.default_instruction().is_empty());
        assert!(Mode::EditImage.default_instruction().is_empty());
        assert!(Mode::GenerateImage.default_instruction().is_empty());
    }

    #[test]
    fn test_instruction_requirements() {
        assert!(!Mode::TryOnOutfits.requires_instruction());
        assert!(!Mode::TryOnModels.requires_instruction());
        assert!(Mode::EditImage.requires_instruction());
        assert!(Mode::GenerateImage.requires_instruction());
        assert!(Mode::PosterPlacement.requires_instruction());
    }

    #[test]
    fn test_paired_mode_needs_both_sides() {
        let mode = Mode::TryOnOutfits;
        let instruction = mode.default_instruction();

        assert!(!mode.can_start(0, 0, instruction));
        assert!(!mode.can_start(1, 0, instruction));
        assert!(!mode.can_start(0, 3, instruction));
        assert!(mode.can_start(1, 3, instruction));
    }

    #[test]
    fn test_generate_needs_only_instruction() {
        assert!(!Mode::GenerateImage.can_start(0, 0, ""));
        assert!(!Mode::GenerateImage.can_start(0, 0, "   "));
        assert!(Mode::GenerateImage.can_start(0, 0, "a cat wearing a top hat"));
    }

    #[test]
    fn test_edit_needs_image_and_instruction() {
        assert!(!Mode::EditImage.can_start(1, 0, ""));
        assert!(!Mode::EditImage.can_start(0, 0, "remove the background"));
        assert!(Mode::EditImage.can_start(1, 0, "remove the background"));
    }

    #[test]
    fn test_slot_wiring() {
        let (primary, secondary) = Mode::TryOnOutfits.slots();
        assert_eq!(primary.map(|slot| slot.selection), Some(Selection::Single));
        assert!(matches!(
            secondary.map(|slot| slot.selection),
            Some(Selection::Multi { .. })
        ));

        let (primary, secondary) = Mode::GenerateImage.slots();
        assert!(primary.is_none());
        assert!(secondary.is_none());

        let (primary, secondary) = Mode::PosterPlacement.slots();
        assert!(matches!(
            primary.map(|slot| slot.selection),
            Some(Selection::Multi { .. })
        ));
        assert!(secondary.is_none());
    }
}
