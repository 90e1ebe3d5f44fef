//! Pipeline stages for renaming one scanned document.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the two external engines can be swapped without touching the
//! name logic.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ ocr/vision ──▶ extract ──▶ normalize ──▶ resolve
//! (list)    (pdfium)   (text)         (regex)     (clean+fix)   (target)
//! ```
//!
//! 1. [`input`]     — list the eligible documents of a directory
//! 2. [`render`]    — rasterise the first page, grayscale; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`ocr`]       — Tesseract transcription ([`ocr::Transcriber`] trait)
//! 4. [`vision`]    — vision-model transcription, using [`encode`] for the
//!    image payload
//! 5. [`extract`]   — locate the raw name between the form's landmarks
//! 6. [`normalize`] — reduce it to a filename-safe upper-case name and fix
//!    known misreads
//! 7. [`resolve`]   — choose a non-clobbering target or recognise that the
//!    file is already named

pub mod encode;
pub mod extract;
pub mod input;
pub mod normalize;
pub mod ocr;
pub mod render;
pub mod resolve;
pub mod vision;
