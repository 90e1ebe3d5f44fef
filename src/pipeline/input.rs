//! Input discovery: list the documents a batch will process.
//!
//! Every regular file directly inside the directory whose extension matches
//! case-insensitively is eligible (`scan.pdf`, `SCAN.PDF`, `Scan.Pdf`).
//! Subdirectories are not descended into. Order is whatever the platform's
//! directory iteration yields; nothing is sorted.

use crate::error::RenameError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Collect the eligible documents in `dir`.
///
/// `extension` is given without the leading dot (`"pdf"`).
pub async fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, RenameError> {
    let meta = tokio::fs::metadata(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RenameError::DirectoryNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            RenameError::DirectoryReadFailed {
                path: dir.to_path_buf(),
                source: e,
            }
        }
    })?;
    if !meta.is_dir() {
        return Err(RenameError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_failed = |e: std::io::Error| RenameError::DirectoryReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_failed)?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);

        if is_file && has_extension(&path, extension) {
            documents.push(path);
        } else {
            debug!("Ignoring unrelated entry: {}", path.display());
        }
    }

    Ok(documents)
}

/// Case-insensitive extension check.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension_ignores_case() {
        assert!(has_extension(Path::new("/a/scan.pdf"), "pdf"));
        assert!(has_extension(Path::new("/a/SCAN.PDF"), "pdf"));
        assert!(!has_extension(Path::new("/a/scan.pdf.txt"), "pdf"));
        assert!(!has_extension(Path::new("/a/pdf"), "pdf"));
    }

    #[tokio::test]
    async fn test_lists_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("B.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let mut found = list_documents(dir.path(), "pdf").await.unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![dir.path().join("B.PDF"), dir.path().join("a.pdf")]
        );
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_documents(dir.path(), "pdf").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = list_documents(&missing, "pdf").await.unwrap_err();
        assert!(matches!(err, RenameError::DirectoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"x").unwrap();
        let err = list_documents(&file, "pdf").await.unwrap_err();
        assert!(matches!(err, RenameError::NotADirectory { .. }));
    }
}
