//! Input files: reading, zip extraction and extension dispatch.
//!
//! Reading from disk and extracting from an archive are the two places a run
//! suspends. Callers pass their [`RunToken`] so cancellation is observed right
//! after each one.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::{ArchiveError, ArchiveResult, InputError, ReconcileResult};
use crate::transform::run::RunToken;

/// Where the bytes of an input file come from.
#[derive(Debug, Clone)]
enum FileSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A named input file, either uploaded or on disk.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// File name, used for extension dispatch and messages
    pub name: String,
    source: FileSource,
}

impl InputFile {
    /// An uploaded file held in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// A file on disk, read lazily.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// Read the raw bytes.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await,
        }
    }

    fn has_extension(&self, ext: &str) -> bool {
        self.name.to_lowercase().ends_with(ext)
    }
}

/// Extract the first `.csv` entry of a zip archive.
///
/// Returns the entry name and its bytes.
pub fn extract_first_csv(archive_name: &str, bytes: &[u8]) -> ArchiveResult<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|source| ArchiveError::Zip {
        name: archive_name.to_string(),
        source,
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| ArchiveError::Zip {
            name: archive_name.to_string(),
            source,
        })?;
        if !entry.is_file() || !entry.name().to_lowercase().ends_with(".csv") {
            continue;
        }

        let name = entry.name().to_string();
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;
        return Ok((name, content));
    }

    Err(ArchiveError::NoCsvEntry(archive_name.to_string()))
}

/// Read an input file down to CSV bytes.
///
/// `.zip` files are unpacked to their first CSV on a blocking worker, `.csv`
/// files pass straight through, anything else is rejected before parsing.
pub async fn load_file(file: &InputFile, token: &RunToken) -> ReconcileResult<(String, Vec<u8>)> {
    let bytes = file.read().await.map_err(ArchiveError::IoError)?;
    token.checkpoint()?;

    let (name, bytes) = if file.has_extension(".zip") {
        let archive_name = file.name.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_first_csv(&archive_name, &bytes))
            .await
            .map_err(|e| ArchiveError::Aborted(e.to_string()))??;
        token.checkpoint()?;
        extracted
    } else {
        (file.name.clone(), bytes)
    };

    if !name.to_lowercase().ends_with(".csv") {
        return Err(InputError::UnsupportedFile(name).into());
    }

    Ok((name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_first_csv_entry() {
        let bytes = zip_with(&[("readme.txt", b"hi"), ("feed.csv", b"SKU\nA1\n"), ("other.csv", b"x")]);
        let (name, content) = extract_first_csv("feed.zip", &bytes).unwrap();

        assert_eq!(name, "feed.csv");
        assert_eq!(content, b"SKU\nA1\n");
    }

    #[test]
    fn test_zip_without_csv() {
        let bytes = zip_with(&[("readme.txt", b"hi")]);
        let err = extract_first_csv("feed.zip", &bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::NoCsvEntry(_)));
    }

    #[test]
    fn test_garbage_archive() {
        let err = extract_first_csv("feed.zip", b"not a zip").unwrap_err();
        assert!(matches!(err, ArchiveError::Zip { .. }));
    }

    #[tokio::test]
    async fn test_load_zip_file() {
        let bytes = zip_with(&[("stock.csv", b"SKU\nA1\n")]);
        let file = InputFile::from_bytes("stock.zip", bytes);
        let (name, content) = load_file(&file, &RunToken::new()).await.unwrap();

        assert_eq!(name, "stock.csv");
        assert_eq!(content, b"SKU\nA1\n");
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.csv");
        std::fs::write(&path, "SKU\nA1\n").unwrap();

        let (name, content) = load_file(&InputFile::from_path(&path), &RunToken::new()).await.unwrap();
        assert_eq!(name, "stock.csv");
        assert_eq!(content, b"SKU\nA1\n");
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let file = InputFile::from_bytes("stock.xlsx", vec![1, 2, 3]);
        let err = load_file(&file, &RunToken::new()).await.unwrap_err();
        assert!(err.is_expected());
        assert!(err.to_string().contains("stock.xlsx"));
    }

    #[tokio::test]
    async fn test_cancelled_after_read() {
        let token = RunToken::new();
        token.cancel();
        let file = InputFile::from_bytes("stock.csv", b"SKU\n".to_vec());
        let err = load_file(&file, &token).await.unwrap_err();
        assert!(matches!(err, crate::error::ReconcileError::Cancelled));
    }
}
