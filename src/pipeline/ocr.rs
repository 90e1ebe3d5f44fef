//! Page transcription through the Tesseract command-line tool.
//!
//! The page image is written to a temporary PNG and handed to
//! `tesseract <png> stdout -l <lang>`. Using the CLI rather than linking
//! libtesseract keeps the build free of C toolchain requirements; the only
//! runtime dependency is a `tesseract` binary with the language data
//! installed (`por` by default: the forms are Brazilian Portuguese).

use crate::error::DocumentError;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Turns a page image into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, page: &DynamicImage) -> Result<String, DocumentError>;
}

/// [`Transcriber`] that shells out to `tesseract`.
#[derive(Debug, Clone)]
pub struct TesseractTranscriber {
    /// Binary to run. Default: `tesseract` from `PATH`.
    pub binary: PathBuf,
    /// Tesseract language code(s), e.g. `por` or `por+eng`.
    pub language: String,
}

impl Default for TesseractTranscriber {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "por".to_string(),
        }
    }
}

#[async_trait]
impl Transcriber for TesseractTranscriber {
    async fn transcribe(&self, page: &DynamicImage) -> Result<String, DocumentError> {
        let dir = tempfile::tempdir().map_err(|e| DocumentError::TranscribeFailed {
            detail: format!("cannot create temp directory: {}", e),
        })?;
        let png_path = dir.path().join("page.png");

        page.save_with_format(&png_path, image::ImageFormat::Png)
            .map_err(|e| DocumentError::TranscribeFailed {
                detail: format!("cannot write page image: {}", e),
            })?;

        let output = Command::new(&self.binary)
            .arg(&png_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| DocumentError::TranscribeFailed {
                detail: format!(
                    "failed to run '{}' (is tesseract installed?): {}",
                    self.binary.display(),
                    e
                ),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocumentError::TranscribeFailed {
                detail: format!(
                    "tesseract exited with code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract produced {} chars", text.len());
        Ok(text)
    }
}
