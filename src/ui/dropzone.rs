//! Upload slot widget
//!
//! One bordered panel per input registry: header with the slot label and
//! selection count, a wrap of selection thumbnails with remove buttons,
//! and browse / add-folder actions. Clicking the panel header makes the
//! slot the target for window file drops.

use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::registry::{InputRegistry, Selection};
use crate::{Message, Slot};

const THUMBNAIL_SIZE: f32 = 96.0;

/// Build the upload panel for one slot.
pub fn upload_slot<'a>(
    slot: Slot,
    registry: &'a InputRegistry,
    is_drop_target: bool,
    is_running: bool,
) -> Element<'a, Message> {
    let count = match registry.selection() {
        Selection::Single => format!("{} of 1", registry.len()),
        Selection::Multi { limit } => format!("{} of {}", registry.len(), limit),
    };

    let header = row![
        button(text(registry.label()).size(16))
            .style(button::text)
            .padding(0)
            .on_press(Message::SetDropTarget(slot)),
        Space::with_width(Length::Fill),
        text(count).size(13),
    ]
    .align_y(Alignment::Center);

    let thumbnails: Vec<Element<'a, Message>> = registry
        .entries()
        .iter()
        .map(|entry| {
            column![
                image(entry.handle.clone())
                    .width(Length::Fixed(THUMBNAIL_SIZE))
                    .height(Length::Fixed(THUMBNAIL_SIZE)),
                row![
                    text(&entry.name).size(11).width(Length::Fixed(THUMBNAIL_SIZE - 24.0)),
                    button(text("✕").size(11))
                        .style(button::danger)
                        .padding(2)
                        .on_press_maybe(
                            (!is_running)
                                .then(|| Message::RemoveImage(slot, entry.name.clone())),
                        ),
                ]
                .spacing(4)
                .align_y(Alignment::Center),
            ]
            .spacing(4)
            .into()
        })
        .collect();

    let selection = if thumbnails.is_empty() {
        Element::from(
            container(text("Drop images here or browse below").size(13))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .padding(24),
        )
    } else {
        Element::from(Wrap::with_elements(thumbnails).spacing(10.0).line_spacing(10.0))
    };

    let mut actions = row![button(text("Browse...").size(13))
        .padding([6.0, 12.0])
        .on_press_maybe((!is_running).then_some(Message::BrowseFiles(slot)))]
    .spacing(8);

    // Folder import only makes sense where more than one image can land
    if matches!(registry.selection(), Selection::Multi { .. }) {
        actions = actions.push(
            button(text("Add Folder...").size(13))
                .style(button::secondary)
                .padding([6.0, 12.0])
                .on_press_maybe((!is_running).then_some(Message::BrowseFolder(slot))),
        );
    }

    if is_drop_target {
        actions = actions.push(Space::with_width(Length::Fill)).push(
            text("drop target").size(12),
        );
    }

    let style = if is_drop_target {
        container::bordered_box
    } else {
        container::rounded_box
    };

    container(column![header, selection, actions].spacing(12))
        .style(style)
        .width(Length::Fill)
        .padding(14)
        .into()
}
