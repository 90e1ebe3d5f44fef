//! # pdf-student-rename
//!
//! Batch-rename a folder of scanned student forms to the name printed on
//! each one.
//!
//! Scanners hand back `scan001.pdf`, `scan002.pdf`, … This crate reads the
//! first page of every document with OCR, finds the `Nome:` field, cleans
//! the recognised text into a filename and renames the document in place,
//! without ever overwriting another file. Running it twice over the same
//! folder is safe: documents that already carry their name are recognised
//! and left alone.
//!
//! ## Pipeline Overview
//!
//! ```text
//! directory
//!  │
//!  ├─ 1. Input      list *.pdf (case-insensitive)
//!  ├─ 2. Render     first page → grayscale image (pdfium)
//!  ├─ 3. OCR        image → text (tesseract, or a vision LLM)
//!  ├─ 4. Extract    text → raw name between "Nome:" and "RG"/"Matrícula"
//!  ├─ 5. Normalize  raw name → "MIGUEL NOGUEIRA"
//!  ├─ 6. Resolve    free target, "NAME (1).pdf", … or already-named
//!  └─ 7. Rename     in place; extension preserved
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_student_rename::{rename_directory, BatchStatus, RenameConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenameConfig::default();
//!     let report = rename_directory("scans/", &config).await?;
//!     if report.status() == BatchStatus::NoDocuments {
//!         eprintln!("no PDFs found");
//!     }
//!     eprintln!("{} succeeded, {} failed", report.tally.succeeded, report.tally.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `pdfrename` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `bundled` | off     | Embed the pdfium library in the binary at compile time |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rename;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OcrEngine, RenameConfig, RenameConfigBuilder};
pub use error::{DocumentError, RenameError};
pub use output::{BatchReport, BatchStatus, BatchTally, DocumentOutcome, DocumentStatus};
pub use pipeline::extract::{NameExtractor, NamePattern, DEFAULT_NAME_PATTERN};
pub use pipeline::normalize::{normalize, sanitize, SpellingFixes};
pub use pipeline::ocr::{TesseractTranscriber, Transcriber};
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use pipeline::resolve::{resolve, DocumentRecord, FsOracle, PathOracle, RenameDecision};
pub use pipeline::vision::VisionTranscriber;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use rename::{planned_targets, process_document, rename_directory, rename_directory_sync};
