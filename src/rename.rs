//! Batch coordinator: the only part of the crate that touches the directory.
//!
//! ## Per-document flow
//!
//! ```text
//! rasterize ─▶ transcribe ─▶ extract ─▶ sanitize ─▶ resolve ─▶ rename
//!  (pdfium)     (tesseract)   (regex)    (fixes)    (oracle)   (fs)
//! ```
//!
//! Documents are processed strictly one after another; each one finishes
//! (renamed, skipped or failed) before the next is opened. Failures are
//! recorded in the [`BatchReport`] and never stop the batch. Nothing is
//! retried here; a decision, once made, is final for this run.

use crate::config::{OcrEngine, RenameConfig};
use crate::error::{DocumentError, RenameError};
use crate::output::{BatchReport, BatchTally, DocumentOutcome, DocumentStatus};
use crate::pipeline::input::list_documents;
use crate::pipeline::normalize::sanitize;
use crate::pipeline::ocr::{TesseractTranscriber, Transcriber};
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::pipeline::resolve::{resolve, DocumentRecord, FsOracle, RenameDecision};
use crate::pipeline::vision::VisionTranscriber;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rename every eligible document in `dir` after the student it names.
///
/// # Returns
/// `Ok(BatchReport)` whenever the directory could be listed, even if every
/// document failed. Check [`BatchReport::status`] to tell an empty
/// directory apart from a batch with failures.
///
/// # Errors
/// Only fatal conditions: the directory is missing or unreadable, or the
/// configured transcription engine cannot be set up.
pub async fn rename_directory(
    dir: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<BatchReport, RenameError> {
    let batch_start = Instant::now();
    let dir = dir.as_ref();
    info!("Scanning '{}' for .{} documents", dir.display(), config.extension);

    let documents = list_documents(dir, &config.extension).await?;
    let total = documents.len();
    info!("Found {} documents in '{}'", total, dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut tally = BatchTally::default();
    let mut outcomes = Vec::with_capacity(total);

    if total > 0 {
        let rasterizer = resolve_rasterizer(config);
        let transcriber = resolve_transcriber(config)?;

        for (i, source) in documents.iter().enumerate() {
            let index = i + 1;
            info!("[{}/{}] {}", index, total, source.display());
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_start(index, total, source);
            }

            let outcome =
                process_document(source, config, rasterizer.as_ref(), transcriber.as_ref()).await;

            match &outcome.status {
                DocumentStatus::Renamed { target, .. } => {
                    info!("Renamed '{}' → '{}'", source.display(), target.display())
                }
                DocumentStatus::AlreadyNamed => {
                    info!("'{}' already has the correct name", source.display())
                }
                DocumentStatus::Failed { error } => warn!("'{}': {}", source.display(), error),
            }

            tally.record(&outcome.status);
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_complete(index, total, &outcome);
            }
            outcomes.push(outcome);
        }
    }

    info!(
        "Batch complete: {} succeeded ({} renamed, {} already named), {} failed",
        tally.succeeded, tally.renamed, tally.already_named, tally.failed
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&tally);
    }

    Ok(BatchReport {
        directory: dir.to_path_buf(),
        documents: outcomes,
        tally,
        duration_ms: batch_start.elapsed().as_millis() as u64,
    })
}

/// Synchronous wrapper around [`rename_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn rename_directory_sync(
    dir: impl AsRef<Path>,
    config: &RenameConfig,
) -> Result<BatchReport, RenameError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenameError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(rename_directory(dir, config))
}

/// Run the full pipeline for one document and perform its rename.
///
/// Never returns an error: every failure is folded into the outcome.
pub async fn process_document(
    source: &Path,
    config: &RenameConfig,
    rasterizer: &dyn Rasterizer,
    transcriber: &dyn Transcriber,
) -> DocumentOutcome {
    let start = Instant::now();
    let mut name = None;

    let status = match run_pipeline(source, config, rasterizer, transcriber, &mut name).await {
        Ok(status) => status,
        Err(error) => DocumentStatus::Failed { error },
    };

    DocumentOutcome {
        source: source.to_path_buf(),
        name,
        status,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

async fn run_pipeline(
    source: &Path,
    config: &RenameConfig,
    rasterizer: &dyn Rasterizer,
    transcriber: &dyn Transcriber,
    name_out: &mut Option<String>,
) -> Result<DocumentStatus, DocumentError> {
    debug!("Rasterising first page of '{}'", source.display());
    let page = rasterizer.rasterize(source).await?;

    debug!("Transcribing page image");
    let transcript = transcriber.transcribe(&page).await?;

    if config.keep_artifacts {
        save_artifacts(source, &page, &transcript).await;
    }

    let raw = config
        .extractor
        .extract(&transcript)
        .ok_or(DocumentError::NameNotFound)?;
    debug!("Extracted raw name: {:?}", raw);

    let name = sanitize(&raw, &config.spelling_fixes)
        .ok_or_else(|| DocumentError::EmptyName { raw: raw.clone() })?;
    info!("Student name: {}", name);
    *name_out = Some(name.clone());

    let record = DocumentRecord::from_path(source);
    match resolve(&record, &name, &FsOracle) {
        RenameDecision::Skip => Ok(DocumentStatus::AlreadyNamed),
        RenameDecision::Rename(target) => {
            if !config.dry_run {
                tokio::fs::rename(source, &target).await.map_err(|e| {
                    DocumentError::RenameFailed {
                        target: target.clone(),
                        detail: e.to_string(),
                    }
                })?;
            }
            Ok(DocumentStatus::Renamed {
                target,
                dry_run: config.dry_run,
            })
        }
    }
}

/// Write `<stem>.jpg` and `<stem>.txt` beside the document. Best effort.
async fn save_artifacts(source: &Path, page: &DynamicImage, transcript: &str) {
    let jpg = source.with_extension("jpg");
    let txt = source.with_extension("txt");

    let page = page.clone();
    let jpg_path = jpg.clone();
    let saved = tokio::task::spawn_blocking(move || {
        page.save_with_format(&jpg_path, image::ImageFormat::Jpeg)
    })
    .await;
    match saved {
        Ok(Ok(())) => debug!("Wrote page image to '{}'", jpg.display()),
        Ok(Err(e)) => warn!("Could not write '{}': {}", jpg.display(), e),
        Err(e) => warn!("Could not write '{}': {}", jpg.display(), e),
    }

    match tokio::fs::write(&txt, transcript).await {
        Ok(()) => debug!("Wrote transcript to '{}'", txt.display()),
        Err(e) => warn!("Could not write '{}': {}", txt.display(), e),
    }
}

fn resolve_rasterizer(config: &RenameConfig) -> Arc<dyn Rasterizer> {
    if let Some(ref r) = config.rasterizer {
        return Arc::clone(r);
    }
    Arc::new(PdfiumRasterizer {
        dpi: config.dpi,
        max_rendered_pixels: config.max_rendered_pixels,
        password: config.password.clone(),
        library_path: config.pdfium_library.clone(),
    })
}

fn resolve_transcriber(config: &RenameConfig) -> Result<Arc<dyn Transcriber>, RenameError> {
    if let Some(ref t) = config.transcriber {
        return Ok(Arc::clone(t));
    }
    match config.engine {
        OcrEngine::Tesseract => Ok(Arc::new(TesseractTranscriber {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
        })),
        OcrEngine::Vision => {
            let mut vision = VisionTranscriber::from_settings(
                config.provider_name.as_deref(),
                config.model.as_deref(),
            )?;
            vision.max_retries = config.max_retries;
            Ok(Arc::new(vision))
        }
    }
}

/// Paths a dry run would produce, for callers that only want the plan.
pub fn planned_targets(report: &BatchReport) -> Vec<(PathBuf, PathBuf)> {
    report
        .documents
        .iter()
        .filter_map(|d| match &d.status {
            DocumentStatus::Renamed { target, .. } => Some((d.source.clone(), target.clone())),
            _ => None,
        })
        .collect()
}
