//! Results grid
//!
//! Shows the outcome of the last batch run: a wrap of produced images with
//! per-item save actions and a bulk zip download. While a run is in flight
//! the grid is replaced by the live progress label.

use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::data::ResultRecord;
use crate::Message;

const RESULT_WIDTH: f32 = 220.0;

/// Build the results section.
pub fn results_panel<'a>(
    results: &'a [ResultRecord],
    is_running: bool,
    progress: &'a str,
) -> Element<'a, Message> {
    let header = row![
        text("Results").size(18),
        Space::with_width(Length::Fill),
        button(text("Download All (.zip)").size(13))
            .padding([6.0, 12.0])
            .on_press_maybe((!is_running && !results.is_empty()).then_some(Message::DownloadAll)),
    ]
    .align_y(Alignment::Center);

    let body: Element<'a, Message> = if is_running {
        container(text(progress).size(15))
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(32)
            .into()
    } else if results.is_empty() {
        container(text("Run a generation to see results here").size(13))
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding(32)
            .into()
    } else {
        let cards: Vec<Element<'a, Message>> = results.iter().map(result_card).collect();
        Wrap::with_elements(cards).spacing(14.0).line_spacing(14.0).into()
    };

    column![header, body].spacing(12).into()
}

fn result_card(record: &ResultRecord) -> Element<'_, Message> {
    container(
        column![
            image(record.handle.clone()).width(Length::Fixed(RESULT_WIDTH)),
            row![
                text(&record.name).size(12).width(Length::Fill),
                button(text("Save").size(12))
                    .style(button::secondary)
                    .padding([4.0, 10.0])
                    .on_press(Message::SaveResult(record.name.clone())),
            ]
            .spacing(6)
            .align_y(Alignment::Center),
        ]
        .spacing(8),
    )
    .style(container::rounded_box)
    .padding(10)
    .into()
}
