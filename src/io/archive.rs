//! Locate the dataset CSV, extracting it from a ZIP archive on first use.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::AppError;

/// Archive looked for next to the CSV when none is configured.
pub const DEFAULT_ARCHIVE_NAME: &str = "activity.zip";

/// Return a path to an existing CSV.
///
/// If `csv_path` is absent, the entry with the same file name is extracted
/// from `archive_path` (or `activity.zip` beside the CSV) into the CSV's
/// directory. An existing CSV is never overwritten.
pub fn ensure_csv(csv_path: &Path, archive_path: Option<&Path>) -> Result<PathBuf, AppError> {
    if csv_path.is_file() {
        return Ok(csv_path.to_path_buf());
    }

    let archive_path = match archive_path {
        Some(p) => p.to_path_buf(),
        None => csv_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEFAULT_ARCHIVE_NAME),
    };

    if !archive_path.is_file() {
        return Err(AppError::io(format!(
            "CSV '{}' not found and no archive at '{}'.",
            csv_path.display(),
            archive_path.display()
        )));
    }

    extract_entry(&archive_path, csv_path)?;
    info!(
        archive = %archive_path.display(),
        csv = %csv_path.display(),
        "extracted dataset from archive"
    );
    Ok(csv_path.to_path_buf())
}

fn extract_entry(archive_path: &Path, csv_path: &Path) -> Result<(), AppError> {
    let wanted = csv_path
        .file_name()
        .ok_or_else(|| AppError::io(format!("CSV path '{}' has no file name.", csv_path.display())))?;

    let file = File::open(archive_path).map_err(|e| {
        AppError::io(format!("Failed to open archive '{}': {e}", archive_path.display()))
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AppError::io(format!("Failed to read ZIP archive '{}': {e}", archive_path.display())))?;

    for idx in 0..archive.len() {
        let mut entry = archive
            .by_index(idx)
            .map_err(|e| AppError::io(format!("Failed to read archive entry {idx}: {e}")))?;
        if !entry.is_file() {
            continue;
        }
        // Entries may sit in a folder inside the archive; match on file name only.
        if Path::new(entry.name()).file_name() != Some(wanted) {
            continue;
        }

        // Stage next to the target so a failed copy never leaves a CSV behind.
        let dir = match csv_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| {
            AppError::io(format!("Failed to create temp file in '{}': {e}", dir.display()))
        })?;
        std::io::copy(&mut entry, staged.as_file_mut())
            .map_err(|e| AppError::io(format!("Failed to extract '{}': {e}", entry.name())))?;
        staged.persist(csv_path).map_err(|e| {
            AppError::io(format!("Failed to create '{}': {}", csv_path.display(), e.error))
        })?;
        return Ok(());
    }

    Err(AppError::io(format!(
        "Archive '{}' has no entry named '{}'.",
        archive_path.display(),
        wanted.to_string_lossy()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entry: &str, body: &str) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn existing_csv_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("activity.csv");
        std::fs::write(&csv, "steps,date,interval\n").unwrap();

        assert_eq!(ensure_csv(&csv, None).unwrap(), csv);
    }

    #[test]
    fn extracts_from_default_archive() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("activity.csv");
        write_zip(
            &dir.path().join(DEFAULT_ARCHIVE_NAME),
            "data/activity.csv",
            "steps,date,interval\n1,2012-10-01,0\n",
        );

        let path = ensure_csv(&csv, None).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("2012-10-01"));
    }

    #[test]
    fn missing_csv_and_archive_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_csv(&dir.path().join("activity.csv"), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn corrupt_entry_leaves_no_csv_behind() {
        let body = "steps,date,interval\n1,2012-10-01,0\n";
        let mut buf = std::io::Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            zip.start_file("activity.csv", opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        let mut bytes = buf.into_inner();
        let at = bytes
            .windows(10)
            .position(|w| w == b"2012-10-01")
            .unwrap();
        bytes[at] = b'3';

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_ARCHIVE_NAME), &bytes).unwrap();
        let csv = dir.path().join("activity.csv");

        let err = ensure_csv(&csv, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!csv.exists());
        assert!(ensure_csv(&csv, None).is_err());

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "only the archive should remain");
    }

    #[test]
    fn archive_without_entry_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("other.zip");
        write_zip(&zip_path, "readme.txt", "hello");

        let err = ensure_csv(&dir.path().join("activity.csv"), Some(&zip_path)).unwrap_err();
        assert!(err.message().contains("no entry named"));
    }
}
