use std::path::PathBuf;
use std::sync::Arc;

use iced::futures::{SinkExt, Stream};
use iced::widget::{button, column, container, row, scrollable, text, text_input};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use walkdir::WalkDir;

mod api;
mod archive;
mod batch;
mod state;
mod ui;

use api::{ApiConfig, GeminiImageClient};
use batch::WorkPlan;
use state::data::{PickedFile, ResultRecord};
use state::mode::Mode;
use state::registry::{InputRegistry, Selection};

/// File extensions offered by the browse dialog and accepted by the
/// add-folder import. Anything else is sniffed out by the registries.
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// Which upload slot a UI action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Primary,
    Secondary,
}

/// Events emitted by an in-flight batch run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A new progress label, emitted before each unit's remote call
    Progress(String),
    /// The run settled: the full result set, or a single failure
    Finished(Result<Vec<ResultRecord>, String>),
}

/// Main application state
struct TryOnStudio {
    /// The active operating mode
    mode: Mode,
    /// Primary upload slot (model photos / image / posters)
    primary: Option<InputRegistry>,
    /// Secondary upload slot (outfits), wired by the paired modes only
    secondary: Option<InputRegistry>,
    /// Instruction text sent with every remote call
    instruction: String,
    /// Result set of the last successful run
    results: Vec<ResultRecord>,
    /// Whether a batch run is in flight
    is_running: bool,
    /// Live progress label while running
    progress: String,
    /// Status message to display to the user
    status: String,
    /// Failure banner for the last run
    error: Option<String>,
    /// The slot that receives window file drops
    drop_target: Slot,
    /// Remote client; `None` when the API key is missing
    client: Option<Arc<GeminiImageClient>>,
    /// Why the client could not be built, shown as a banner
    config_error: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User picked another mode tab
    ModeSelected(Mode),
    InstructionChanged(String),
    /// Open the native file picker for a slot
    BrowseFiles(Slot),
    /// Open the native folder picker for a multi slot
    BrowseFolder(Slot),
    /// Background file loading finished
    FilesLoaded(Slot, Vec<PickedFile>),
    /// Remove one selection by display name
    RemoveImage(Slot, String),
    /// Make a slot the target for window file drops
    SetDropTarget(Slot),
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// Start a batch run
    Submit,
    /// Progress or completion of the in-flight run
    RunProgressed(RunEvent),
    /// Save one result to the download directory
    SaveResult(String),
    SaveFinished(Result<String, String>),
    /// Package the full result set as a zip
    DownloadAll,
    ArchiveFinished(Result<Option<String>, String>),
}

impl TryOnStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let (client, config_error) = match ApiConfig::from_env().and_then(GeminiImageClient::new) {
            Ok(client) => (Some(Arc::new(client)), None),
            Err(e) => {
                eprintln!("⚠️  {e}");
                (None, Some(e.to_string()))
            }
        };

        let mode = Mode::TryOnOutfits;
        let (primary, secondary) = registries_for(mode);

        println!("🧥 Try-On Studio initialized");

        (
            TryOnStudio {
                mode,
                primary,
                secondary,
                instruction: mode.default_instruction().to_string(),
                results: Vec::new(),
                is_running: false,
                progress: String::new(),
                status: String::new(),
                error: None,
                drop_target: Slot::Primary,
                client,
                config_error,
            },
            Task::none(),
        )
    }

    fn registry(&self, slot: Slot) -> Option<&InputRegistry> {
        match slot {
            Slot::Primary => self.primary.as_ref(),
            Slot::Secondary => self.secondary.as_ref(),
        }
    }

    fn registry_mut(&mut self, slot: Slot) -> Option<&mut InputRegistry> {
        match slot {
            Slot::Primary => self.primary.as_mut(),
            Slot::Secondary => self.secondary.as_mut(),
        }
    }

    /// Whether a run may start right now. Enforces the per-mode
    /// preconditions, the single-run-at-a-time rule, and a usable client.
    fn can_submit(&self) -> bool {
        let primary_count = self.primary.as_ref().map(InputRegistry::len).unwrap_or(0);
        let secondary_count = self.secondary.as_ref().map(InputRegistry::len).unwrap_or(0);

        !self.is_running
            && self.client.is_some()
            && self
                .mode
                .can_start(primary_count, secondary_count, &self.instruction)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ModeSelected(mode) => {
                if self.is_running || mode == self.mode {
                    return Task::none();
                }

                // Switching modes clears every selection, the result set,
                // and the instruction, regardless of prior state
                self.mode = mode;
                let (primary, secondary) = registries_for(mode);
                self.primary = primary;
                self.secondary = secondary;
                self.instruction = mode.default_instruction().to_string();
                self.results.clear();
                self.error = None;
                self.status.clear();
                self.progress.clear();
                self.drop_target = Slot::Primary;

                Task::none()
            }

            Message::InstructionChanged(instruction) => {
                self.instruction = instruction;
                Task::none()
            }

            Message::BrowseFiles(slot) => {
                let Some(registry) = self.registry(slot) else {
                    return Task::none();
                };

                // Show the native file picker dialog
                let title = format!("Select {}", registry.label());
                let dialog = FileDialog::new()
                    .set_title(&title)
                    .add_filter("Images", &IMAGE_EXTENSIONS);

                let paths = match registry.selection() {
                    Selection::Single => dialog.pick_file().map(|path| vec![path]).unwrap_or_default(),
                    Selection::Multi { .. } => dialog.pick_files().unwrap_or_default(),
                };

                if paths.is_empty() {
                    return Task::none();
                }

                self.drop_target = slot;
                Task::perform(load_files(paths), move |files| {
                    Message::FilesLoaded(slot, files)
                })
            }

            Message::BrowseFolder(slot) => {
                if self.registry(slot).is_none() {
                    return Task::none();
                }

                let folder = FileDialog::new()
                    .set_title("Select Folder with Images")
                    .pick_folder();

                let Some(folder) = folder else {
                    return Task::none();
                };

                self.status = format!("Importing from {}...", folder.display());
                self.drop_target = slot;
                Task::perform(load_folder(folder), move |files| {
                    Message::FilesLoaded(slot, files)
                })
            }

            Message::FilesLoaded(slot, files) => {
                if let Some(registry) = self.registry_mut(slot) {
                    let label = registry.label();
                    let accepted = registry.add(files);
                    if accepted > 0 {
                        self.status = format!("Added {} image(s) to {}", accepted, label);
                    }
                }
                Task::none()
            }

            Message::RemoveImage(slot, name) => {
                if let Some(registry) = self.registry_mut(slot) {
                    registry.remove(&name);
                }
                Task::none()
            }

            Message::SetDropTarget(slot) => {
                if self.registry(slot).is_some() {
                    self.drop_target = slot;
                }
                Task::none()
            }

            Message::FileDropped(path) => {
                if self.is_running {
                    return Task::none();
                }

                let slot = self.drop_target;
                if self.registry(slot).is_none() {
                    return Task::none();
                }

                Task::perform(load_files(vec![path]), move |files| {
                    Message::FilesLoaded(slot, files)
                })
            }

            Message::Submit => {
                if !self.can_submit() {
                    return Task::none();
                }
                let Some(client) = self.client.clone() else {
                    return Task::none();
                };

                let primary = self
                    .primary
                    .as_ref()
                    .map(|registry| registry.entries().to_vec())
                    .unwrap_or_default();
                let secondary = self
                    .secondary
                    .as_ref()
                    .map(|registry| registry.entries().to_vec())
                    .unwrap_or_default();

                let plan = match WorkPlan::build(self.mode, &primary, &secondary, &self.instruction)
                {
                    Ok(plan) => plan,
                    Err(e) => {
                        self.error = Some(e.to_string());
                        return Task::none();
                    }
                };

                // Prior results are cleared the moment a new run begins
                self.results.clear();
                self.error = None;
                self.status.clear();
                self.progress.clear();
                self.is_running = true;

                Task::run(run_stream(client, plan), Message::RunProgressed)
            }

            Message::RunProgressed(RunEvent::Progress(label)) => {
                self.progress = label;
                Task::none()
            }

            Message::RunProgressed(RunEvent::Finished(outcome)) => {
                self.is_running = false;
                self.progress.clear();

                match outcome {
                    Ok(results) => {
                        println!("✅ Batch run produced {} image(s)", results.len());
                        self.status = format!("Generated {} image(s)", results.len());
                        self.results = results;
                    }
                    Err(e) => {
                        eprintln!("❌ Batch run failed: {e}");
                        self.error = Some(format!("Generation failed: {e}"));
                    }
                }

                Task::none()
            }

            Message::SaveResult(name) => {
                let Some(record) = self.results.iter().find(|record| record.name == name) else {
                    return Task::none();
                };

                let name = record.name.clone();
                let bytes = record.bytes.clone();
                Task::perform(save_bytes(name, bytes), Message::SaveFinished)
            }

            Message::SaveFinished(outcome) => {
                match outcome {
                    Ok(path) => self.status = format!("Saved {}", path),
                    Err(e) => self.status = format!("⚠️  {e}"),
                }
                Task::none()
            }

            Message::DownloadAll => {
                // Packaging an empty result set is a no-op
                if self.is_running || self.results.is_empty() {
                    return Task::none();
                }

                let records = self.results.clone();
                Task::perform(archive_results(records), Message::ArchiveFinished)
            }

            Message::ArchiveFinished(outcome) => {
                match outcome {
                    Ok(Some(path)) => self.status = format!("Archive written to {}", path),
                    Ok(None) => {}
                    Err(e) => self.status = format!("⚠️  Archive failed: {e}"),
                }
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("Try-On Studio").size(28),
            iced::widget::Space::with_width(Length::Fill),
            text("powered by a generative image service").size(13),
        ]
        .align_y(Alignment::Center);

        let mode_tabs = row(Mode::ALL
            .iter()
            .map(|mode| {
                let active = *mode == self.mode;
                button(text(mode.label()).size(13))
                    .style(if active { button::primary } else { button::secondary })
                    .padding([8.0, 14.0])
                    .on_press_maybe((!self.is_running).then_some(Message::ModeSelected(*mode)))
                    .into()
            })
            .collect::<Vec<Element<Message>>>())
        .spacing(8);

        let mut page = column![header, mode_tabs].spacing(16);

        if let Some(config_error) = &self.config_error {
            page = page.push(
                container(text(config_error).size(14).color(Color::from_rgb(0.95, 0.6, 0.3)))
                    .style(container::bordered_box)
                    .width(Length::Fill)
                    .padding(12),
            );
        }

        let slots: Element<Message> = match (&self.primary, &self.secondary) {
            (Some(primary), Some(secondary)) => row![
                ui::dropzone::upload_slot(
                    Slot::Primary,
                    primary,
                    self.drop_target == Slot::Primary,
                    self.is_running,
                ),
                ui::dropzone::upload_slot(
                    Slot::Secondary,
                    secondary,
                    self.drop_target == Slot::Secondary,
                    self.is_running,
                ),
            ]
            .spacing(16)
            .into(),
            (Some(primary), None) => ui::dropzone::upload_slot(
                Slot::Primary,
                primary,
                self.drop_target == Slot::Primary,
                self.is_running,
            ),
            _ => container(text("This mode works from the prompt alone").size(13))
                .width(Length::Fill)
                .padding(8)
                .into(),
        };
        page = page.push(slots);

        let instruction = text_input(self.mode.instruction_placeholder(), &self.instruction)
            .on_input(Message::InstructionChanged)
            .on_submit(Message::Submit)
            .padding(10)
            .size(14);

        let submit = button(
            text(if self.is_running { "Generating..." } else { "Generate" }).size(15),
        )
        .padding([10.0, 24.0])
        .on_press_maybe(self.can_submit().then_some(Message::Submit));

        page = page.push(row![instruction, submit].spacing(12).align_y(Alignment::Center));

        if let Some(error) = &self.error {
            page = page.push(text(error).size(14).color(Color::from_rgb(0.9, 0.4, 0.4)));
        }

        if !self.status.is_empty() {
            page = page.push(text(&self.status).size(13));
        }

        page = page.push(ui::results::results_panel(
            &self.results,
            self.is_running,
            &self.progress,
        ));

        scrollable(container(page).width(Length::Fill).padding(24)).into()
    }

    /// Listen for files dropped onto the window
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    // A .env file next to the binary is honored; real env wins
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tryon_studio=info")),
        )
        .init();

    iced::application("Try-On Studio", TryOnStudio::update, TryOnStudio::view)
        .subscription(TryOnStudio::subscription)
        .theme(TryOnStudio::theme)
        .window_size(iced::Size::new(1200.0, 880.0))
        .centered()
        .run_with(TryOnStudio::new)
}

/// Wire the upload slots for a mode.
fn registries_for(mode: Mode) -> (Option<InputRegistry>, Option<InputRegistry>) {
    let (primary, secondary) = mode.slots();
    (
        primary.map(|slot| InputRegistry::new(slot.label, slot.selection)),
        secondary.map(|slot| InputRegistry::new(slot.label, slot.selection)),
    )
}

/// Bridge the batch runner into an event stream the UI can consume.
///
/// The runner itself is a pure function over the plan; progress reaches the
/// UI through this channel, one label per unit.
fn run_stream(client: Arc<GeminiImageClient>, plan: WorkPlan) -> impl Stream<Item = RunEvent> {
    iced::stream::channel(16, |mut output| async move {
        let mut progress = output.clone();
        let outcome = batch::run(client.as_ref(), &plan, |label| {
            let _ = progress.try_send(RunEvent::Progress(label.to_string()));
        })
        .await
        .map_err(|e| e.to_string());

        let _ = output.send(RunEvent::Finished(outcome)).await;
    })
}

/// Read picked files from disk. Unreadable files are skipped; non-image
/// payloads are filtered later by the registry.
async fn load_files(paths: Vec<PathBuf>) -> Vec<PickedFile> {
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        match tokio::fs::read(&path).await {
            Ok(bytes) => files.push(PickedFile { name, bytes }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
        }
    }

    files
}

/// Walk a folder recursively and load everything with an image extension.
async fn load_folder(folder: PathBuf) -> Vec<PickedFile> {
    let paths = tokio::task::spawn_blocking(move || {
        WalkDir::new(&folder)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|extension| {
                        let extension = extension.to_string_lossy().to_lowercase();
                        IMAGE_EXTENSIONS.contains(&extension.as_str())
                    })
                    .unwrap_or(false)
            })
            .map(|entry| entry.into_path())
            .collect::<Vec<_>>()
    })
    .await
    .unwrap_or_default();

    load_files(paths).await
}

/// Write one result to the user's download directory.
async fn save_bytes(name: String, bytes: Vec<u8>) -> Result<String, String> {
    let path = download_dir()?.join(&name);

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;

    Ok(path.display().to_string())
}

/// Package the result set into a zip in the download directory.
async fn archive_results(records: Vec<ResultRecord>) -> Result<Option<String>, String> {
    let dir = download_dir()?;

    let path = tokio::task::spawn_blocking(move || archive::write_zip(&records, &dir))
        .await
        .map_err(|e| format!("archive task failed: {e}"))?
        .map_err(|e| e.to_string())?;

    Ok(path.map(|path| path.display().to_string()))
}

fn download_dir() -> Result<PathBuf, String> {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| "could not determine a download directory".to_string())
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

    #[test]
    fn test_mode_switch_clears_everything() {
        let (mut app, _) = TryOnStudio::new();

        app.primary
            .as_mut()
            .expect("try-on mode has a primary slot")
            .add(vec![png("model.png")]);
        app.instruction = "a custom instruction".to_string();
        app.results
            .push(ResultRecord::new("old.png".to_string(), PNG_HEADER.to_vec()));

        let _ = app.update(Message::ModeSelected(Mode::PosterPlacement));

        assert_eq!(app.mode, Mode::PosterPlacement);
        assert!(app.primary.as_ref().is_some_and(InputRegistry::is_empty));
        assert!(app.secondary.is_none());
        assert!(app.results.is_empty());
        assert_eq!(app.instruction, Mode::PosterPlacement.default_instruction());
    }

    #[test]
    fn test_switch_to_generate_drops_all_slots() {
        let (mut app, _) = TryOnStudio::new();

        let _ = app.update(Message::ModeSelected(Mode::GenerateImage));

        assert!(app.primary.is_none());
        assert!(app.secondary.is_none());
    }

    #[test]
    fn test_submit_is_gated_while_running() {
        let (mut app, _) = TryOnStudio::new();

        app.is_running = true;
        assert!(!app.can_submit());
    }

    #[test]
    fn test_mode_switch_ignored_while_running() {
        let (mut app, _) = TryOnStudio::new();

        app.is_running = true;
        let _ = app.update(Message::ModeSelected(Mode::EditImage));

        assert_eq!(app.mode, Mode::TryOnOutfits);
    }

    #[test]
    fn test_drop_routes_to_selected_slot() {
        let (mut app, _) = TryOnStudio::new();

        let _ = app.update(Message::SetDropTarget(Slot::Secondary));
        assert_eq!(app.drop_target, Slot::Secondary);

        // A slot that does not exist in this mode cannot become the target
        let _ = app.update(Message::ModeSelected(Mode::EditImage));
        let _ = app.update(Message::SetDropTarget(Slot::Secondary));
        assert_eq!(app.drop_target, Slot::Primary);
    }
}
