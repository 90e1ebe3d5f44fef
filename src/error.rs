//! Error types for the pdf-student-rename library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RenameError`] — **Fatal**: the batch cannot proceed at all (the
//!   directory is missing, the name pattern does not compile, the vision
//!   provider is not configured). Returned as `Err(RenameError)` from the
//!   top-level `rename_directory*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (no name on
//!   the page, OCR crashed, rename refused by the OS) but the rest of the
//!   directory is fine. Stored inside [`crate::output::DocumentOutcome`] so
//!   the report lists every failure instead of losing the batch to one scan.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-student-rename library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RenameError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The directory to scan does not exist.
    #[error("Directory not found: '{path}'\nCheck the path exists and is readable.")]
    DirectoryNotFound { path: PathBuf },

    /// The path exists but is a regular file, not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// Listing the directory failed part-way.
    #[error("Failed to read directory '{path}': {source}")]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The name-extraction expression is unusable.
    #[error("Invalid name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A spelling-fix table could not be parsed.
    #[error("Invalid spelling fix on line {line}: '{content}' (expected WRONG=RIGHT, letters and spaces only)")]
    InvalidSpellingFix { line: usize, content: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The configured vision provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// The batch records it and moves on to the next file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentError {
    /// The first page could not be rasterised.
    #[error("rasterisation failed: {detail}")]
    RasterizeFailed { detail: String },

    /// The OCR engine returned an error or could not be started.
    #[error("transcription failed: {detail}")]
    TranscribeFailed { detail: String },

    /// The name pattern did not match anywhere in the transcript.
    #[error("could not find a student name in the recognised text")]
    NameNotFound,

    /// A candidate was found but nothing usable survived sanitisation.
    #[error("name is blank after removing unsupported characters (raw: {raw:?})")]
    EmptyName { raw: String },

    /// The operating system refused the rename.
    #[error("failed to rename to '{target}': {detail}")]
    RenameFailed { target: PathBuf, detail: String },
}

impl DocumentError {
    /// Short machine-friendly label, used in progress lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::RasterizeFailed { .. } => "rasterize",
            DocumentError::TranscribeFailed { .. } => "transcribe",
            DocumentError::NameNotFound => "name_not_found",
            DocumentError::EmptyName { .. } => "empty_name",
            DocumentError::RenameFailed { .. } => "rename",
        }
    }
}
