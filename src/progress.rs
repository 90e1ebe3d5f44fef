//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::RenameConfigBuilder::progress_callback`] to receive
//! events as the coordinator works through the directory. The library never
//! prints; the binary turns these events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use pdf_student_rename::{BatchProgressCallback, DocumentOutcome, RenameConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     done: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, _outcome: &DocumentOutcome) {
//!         self.done.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} done", index, total);
//!     }
//! }
//!
//! let config = RenameConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { done: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchTally, DocumentOutcome};
use std::path::Path;
use std::sync::Arc;

/// Called by the coordinator as it processes each document.
///
/// Documents are processed one at a time, so calls never overlap, but the
/// trait is `Send + Sync` because the config travels across tokio tasks.
/// All methods default to no-ops.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after the directory has been listed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a document is rasterised.
    ///
    /// # Arguments
    /// * `index`  — 1-indexed position in the batch
    /// * `total`  — number of eligible documents
    /// * `source` — path of the document
    fn on_document_start(&self, index: usize, total: usize, source: &Path) {
        let _ = (index, total, source);
    }

    /// Called with every outcome, success or failure.
    fn on_document_complete(&self, index: usize, total: usize, outcome: &DocumentOutcome) {
        let _ = (index, total, outcome);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, tally: &BatchTally) {
        let _ = tally;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenameConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DocumentStatus;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn on_document_start(&self, _index: usize, _total: usize, _source: &Path) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _index: usize, _total: usize, _outcome: &DocumentOutcome) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_document_start(1, 2, Path::new("a.pdf"));
        cb.on_batch_complete(&BatchTally::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = TrackingCallback::default();
        let outcome = DocumentOutcome {
            source: PathBuf::from("a.pdf"),
            name: Some("ANA".into()),
            status: DocumentStatus::AlreadyNamed,
            duration_ms: 1,
        };

        cb.on_batch_start(2);
        cb.on_document_start(1, 2, Path::new("a.pdf"));
        cb.on_document_complete(1, 2, &outcome);
        cb.on_document_start(2, 2, Path::new("b.pdf"));

        assert_eq!(cb.total.load(Ordering::SeqCst), 2);
        assert_eq!(cb.starts.load(Ordering::SeqCst), 2);
        assert_eq!(cb.completes.load(Ordering::SeqCst), 1);
    }
}
