//! UI building blocks
//!
//! Widget helpers that keep `view()` readable:
//! - Upload slot with thumbnails and browse actions (dropzone.rs)
//! - Results grid with per-item and bulk download (results.rs)

pub mod dropzone;
pub mod results;
