//! Shared data structures for the application state
//!
//! These structs represent the data that flows between the upload slots,
//! the batch runner, and the results view.

use iced::widget::image::Handle;

/// A file picked from disk before it has been accepted into a slot.
///
/// Carries the raw payload so non-image files can be sniffed out before an
/// `ImageRef` is ever created.
#[derive(Clone)]
pub struct PickedFile {
    /// Filename only (e.g., "model_01.jpg")
    pub name: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PickedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickedFile")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A user-selected input image.
///
/// Immutable once created. The preview `handle` is derived from the payload
/// at construction and released when the value is dropped, which happens
/// when the entry is removed from its slot or a mode switch clears it.
#[derive(Clone)]
pub struct ImageRef {
    /// Display name, used verbatim when deriving output names
    pub name: String,
    /// MIME type sniffed from the payload (e.g., "image/png")
    pub mime: String,
    /// Raw image payload, sent to the remote service as inline data
    pub bytes: Vec<u8>,
    /// Preview handle for rendering the selection thumbnail
    pub handle: Handle,
}

impl ImageRef {
    /// Build an `ImageRef` from a picked file, sniffing the payload.
    ///
    /// Returns `None` when the payload is not a recognized image format.
    /// Non-image files are silently filtered at selection time.
    pub fn from_picked(file: PickedFile) -> Option<Self> {
        let format = image::guess_format(&file.bytes).ok()?;
        let handle = Handle::from_bytes(file.bytes.clone());

        Some(ImageRef {
            name: file.name,
            mime: format.to_mime_type().to_string(),
            bytes: file.bytes,
            handle,
        })
    }
}

impl std::fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRef")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// One produced output image.
///
/// Created only when a remote call succeeds. The full result set is
/// replaced atomically at the start of each batch run.
#[derive(Clone)]
pub struct ResultRecord {
    /// Derived output name (e.g., "model_outfit.png")
    pub name: String,
    /// Produced image payload
    pub bytes: Vec<u8>,
    /// Preview handle for the results grid
    pub handle: Handle,
}

impl ResultRecord {
    /// Wrap a produced payload together with its derived name.
    pub fn new(name: String, bytes: Vec<u8>) -> Self {
        let handle = Handle::from_bytes(bytes.clone());
        ResultRecord {
            name,
            bytes,
            handle,
        }
    }
}

impl std::fmt::Debug for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRecord")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PNG magic bytes are enough for format sniffing
    pub const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x00";

    #[test]
    fn test_image_ref_from_png_payload() {
        let file = PickedFile {
            name: "model.png".to_string(),
            bytes: PNG_HEADER.to_vec(),
        };

        let image = ImageRef::from_picked(file).expect("PNG payload should be accepted");
        assert_eq!(image.name, "model.png");
        assert_eq!(image.mime, "image/png");
    }

    #[test]
    fn test_non_image_payload_is_rejected() {
        let file = PickedFile {
            name: "notes.txt".to_string(),
            bytes: b"just some text".to_vec(),
        };

        assert!(ImageRef::from_picked(file).is_none());
    }
}
