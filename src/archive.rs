//! Result packaging
//!
//! Bundles a finished result set into a single zip archive for bulk
//! download. Packaging only ever runs over the final result set of a
//! successful run, after the runner has settled; it never overlaps with an
//! in-flight batch.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::state::data::ResultRecord;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create archive at {}: {source}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to finish archive: {0}")]
    Finish(#[from] zip::result::ZipError),
}

/// Write the result set into `tryon_results_{timestamp}.zip` under `dir`.
///
/// An empty result set is a no-op: no file is created and `Ok(None)` is
/// returned. A single record failing to serialize is logged and omitted
/// from the archive; the remaining records are still packaged.
pub fn write_zip(records: &[ResultRecord], dir: &Path) -> Result<Option<PathBuf>, ArchiveError> {
    if records.is_empty() {
        return Ok(None);
    }

    let filename = format!("tryon_results_{}.zip", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);

    let file = File::create(&path).map_err(|source| ArchiveError::Create {
        path: path.clone(),
        source,
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default();

    let mut packaged = 0usize;
    for record in records {
        if let Err(e) = add_entry(&mut writer, record, options) {
            tracing::warn!(name = %record.name, error = %e, "skipping result in archive");
            continue;
        }
        packaged += 1;
    }

    writer.finish()?.flush().map_err(|source| ArchiveError::Create {
        path: path.clone(),
        source,
    })?;

    tracing::info!(packaged, path = %path.display(), "archive written");

    Ok(Some(path))
}

fn add_entry<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    record: &ResultRecord,
    options: SimpleFileOptions,
) -> Result<(), zip::result::ZipError> {
    writer.start_file(record.name.as_str(), options)?;
    writer.write_all(&record.bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn record(name: &str, bytes: &[u8]) -> ResultRecord {
        ResultRecord::new(name.to_string(), bytes.to_vec())
    }

    #[test]
    fn test_empty_result_set_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_zip(&[], dir.path()).unwrap();

        assert!(path.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_archive_contains_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("model_dress.png", b"first image"),
            record("model_coat.png", b"second image"),
        ];

        let path = write_zip(&records, dir.path()).unwrap().unwrap();

        let file = File::open(&path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = Vec::new();
        archive
            .by_name("model_dress.png")
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, b"first image");

        contents.clear();
        archive
            .by_name("model_coat.png")
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, b"second image");
    }

    #[test]
    fn test_archive_filename_carries_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record("generated_image.png", b"payload")];

        let path = write_zip(&records, dir.path()).unwrap().unwrap();
        let filename = path.file_name().unwrap().to_string_lossy();

        assert!(filename.starts_with("tryon_results_"));
        assert!(filename.ends_with(".zip"));
    }
}
