//! Rename-target resolution: pick a destination that never clobbers a file.
//!
//! Given a document and its sanitised name the resolver walks the
//! candidates `NAME.ext`, `NAME (1).ext`, `NAME (2).ext`, … until one is
//! free, unless it first decides the document already carries its correct
//! name, in which case the batch leaves it alone.
//!
//! "Already correct" is judged two different ways, depending on whether the
//! current file name ends in a `(N)` sequence number:
//!
//! - without one, the upper-cased stem must equal the sanitised name;
//! - with one, the disambiguation counter must reach `N` while every earlier
//!   candidate is taken.
//!
//! Both checks look at the *original* file name, never at the candidate
//! under test. They are kept as two separate arms on purpose: merging them
//! changes which re-runs are recognised.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

static RE_SEQUENCE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s*\((\d+)\)\s*$").unwrap());

/// A source document's path split into the parts the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    pub path: PathBuf,
    pub parent: PathBuf,
    /// File name without extension, and without any `(N)` suffix.
    pub stem: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    /// Number from a trailing `(N)` in the original file name.
    pub sequence: Option<u64>,
}

impl DocumentRecord {
    pub fn from_path(path: &Path) -> Self {
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let (stem, sequence) = match RE_SEQUENCE_SUFFIX.captures(&base) {
            // Digits too long for u64 cannot be reached by the counter anyway.
            Some(caps) => match caps[2].parse::<u64>() {
                Ok(n) => (caps[1].to_string(), Some(n)),
                Err(_) => (base.clone(), None),
            },
            None => (base, None),
        };

        Self {
            path: path.to_path_buf(),
            parent,
            stem,
            extension,
            sequence,
        }
    }

    /// `parent/NAME.ext` for `counter == 0`, `parent/NAME (counter).ext` otherwise.
    pub fn candidate(&self, name: &str, counter: u64) -> PathBuf {
        let file_name = if counter == 0 {
            format!("{}{}", name, self.extension)
        } else {
            format!("{} ({}){}", name, counter, self.extension)
        };
        self.parent.join(file_name)
    }
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum RenameDecision {
    /// The document already bears its correct name.
    Skip,
    /// Move the document to this (currently free) path.
    Rename(PathBuf),
}

/// Existence checks against the directory being processed.
pub trait PathOracle {
    fn exists(&self, path: &Path) -> bool;
}

/// [`PathOracle`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOracle;

impl PathOracle for FsOracle {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Decide where `record` should go given its sanitised name.
///
/// `name` must be non-empty. The returned [`RenameDecision::Rename`] target
/// did not exist when checked; nothing guards against another process
/// creating it before the rename happens.
pub fn resolve(record: &DocumentRecord, name: &str, oracle: &dyn PathOracle) -> RenameDecision {
    let mut candidate = record.candidate(name, 0);
    let mut counter: u64 = 1;

    while oracle.exists(&candidate) {
        let already_named = match record.sequence {
            None => record.stem.to_uppercase() == name,
            Some(seq) => counter == seq,
        };
        if already_named {
            return RenameDecision::Skip;
        }

        debug!(
            "'{}' already exists, trying another name",
            candidate.display()
        );
        candidate = record.candidate(name, counter);
        counter += 1;
    }

    RenameDecision::Rename(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Snapshot(HashSet<PathBuf>);

    impl Snapshot {
        fn of(dir: &str, names: &[&str]) -> Self {
            Self(names.iter().map(|n| Path::new(dir).join(n)).collect())
        }
    }

    impl PathOracle for Snapshot {
        fn exists(&self, path: &Path) -> bool {
            self.0.contains(path)
        }
    }

    fn record(name: &str) -> DocumentRecord {
        DocumentRecord::from_path(&Path::new("/scans").join(name))
    }

    #[test]
    fn test_record_without_sequence() {
        let r = record("scan003.pdf");
        assert_eq!(r.parent, PathBuf::from("/scans"));
        assert_eq!(r.stem, "scan003");
        assert_eq!(r.extension, ".pdf");
        assert_eq!(r.sequence, None);
    }

    #[test]
    fn test_record_with_sequence() {
        let r = record("scan (2).pdf");
        assert_eq!(r.stem, "scan");
        assert_eq!(r.sequence, Some(2));

        let tight = record("MARIA SILVA(12).PDF");
        assert_eq!(tight.stem, "MARIA SILVA");
        assert_eq!(tight.sequence, Some(12));
        assert_eq!(tight.extension, ".PDF");
    }

    #[test]
    fn test_record_parenthesised_text_is_not_a_sequence() {
        let r = record("scan (copy).pdf");
        assert_eq!(r.stem, "scan (copy)");
        assert_eq!(r.sequence, None);
    }

    #[test]
    fn test_record_without_extension() {
        let r = record("scan");
        assert_eq!(r.extension, "");
        assert_eq!(r.candidate("ANA", 1), PathBuf::from("/scans/ANA (1)"));
    }

    #[test]
    fn test_free_target_is_renamed() {
        let snap = Snapshot::of("/scans", &["scan003.pdf"]);
        assert_eq!(
            resolve(&record("scan003.pdf"), "MARIA SILVA", &snap),
            RenameDecision::Rename(PathBuf::from("/scans/MARIA SILVA.pdf"))
        );
    }

    #[test]
    fn test_already_named_is_skipped() {
        let snap = Snapshot::of("/scans", &["MARIA SILVA.pdf"]);
        assert_eq!(
            resolve(&record("MARIA SILVA.pdf"), "MARIA SILVA", &snap),
            RenameDecision::Skip
        );
    }

    #[test]
    fn test_stem_comparison_is_case_insensitive_on_the_file_side() {
        let snap = Snapshot::of("/scans", &["Maria Silva.pdf", "MARIA SILVA.pdf"]);
        assert_eq!(
            resolve(&record("Maria Silva.pdf"), "MARIA SILVA", &snap),
            RenameDecision::Skip
        );
    }

    #[test]
    fn test_conflict_gets_first_free_suffix() {
        let snap = Snapshot::of("/scans", &["MARIA SILVA.pdf", "scan003.pdf"]);
        assert_eq!(
            resolve(&record("scan003.pdf"), "MARIA SILVA", &snap),
            RenameDecision::Rename(PathBuf::from("/scans/MARIA SILVA (1).pdf"))
        );
    }

    #[test]
    fn test_conflict_skips_taken_suffixes() {
        let snap = Snapshot::of(
            "/scans",
            &["MARIA SILVA.pdf", "MARIA SILVA (1).pdf", "MARIA SILVA (2).pdf"],
        );
        assert_eq!(
            resolve(&record("scan003.pdf"), "MARIA SILVA", &snap),
            RenameDecision::Rename(PathBuf::from("/scans/MARIA SILVA (3).pdf"))
        );
    }

    #[test]
    fn test_sequence_number_matches_counter() {
        let snap = Snapshot::of(
            "/scans",
            &["JOAO PEREIRA.pdf", "JOAO PEREIRA (1).pdf", "scan (2).pdf"],
        );
        assert_eq!(
            resolve(&record("scan (2).pdf"), "JOAO PEREIRA", &snap),
            RenameDecision::Skip
        );
    }

    #[test]
    fn test_renamed_duplicate_is_recognised_on_rerun() {
        // second run over "MARIA SILVA (1).pdf" produced by the first run
        let snap = Snapshot::of("/scans", &["MARIA SILVA.pdf", "MARIA SILVA (1).pdf"]);
        assert_eq!(
            resolve(&record("MARIA SILVA (1).pdf"), "MARIA SILVA", &snap),
            RenameDecision::Skip
        );
    }

    #[test]
    fn test_sequence_number_never_reached() {
        let snap = Snapshot::of("/scans", &["ANA.pdf", "scan (5).pdf"]);
        assert_eq!(
            resolve(&record("scan (5).pdf"), "ANA", &snap),
            RenameDecision::Rename(PathBuf::from("/scans/ANA (1).pdf"))
        );
    }

    #[test]
    fn test_sequence_branch_ignores_stem_equality() {
        // the stem matches but the counter never reaches 3
        let snap = Snapshot::of("/scans", &["ANA.pdf", "ANA (3).pdf"]);
        assert_eq!(
            resolve(&record("ANA (3).pdf"), "ANA", &snap),
            RenameDecision::Rename(PathBuf::from("/scans/ANA (1).pdf"))
        );
    }

    #[test]
    fn test_resolve_is_deterministic_and_never_targets_existing() {
        let snap = Snapshot::of("/scans", &["ANA.pdf", "ANA (1).pdf", "x.pdf"]);
        let r = record("x.pdf");
        let first = resolve(&r, "ANA", &snap);
        assert_eq!(first, resolve(&r, "ANA", &snap));
        match first {
            RenameDecision::Rename(target) => assert!(!snap.exists(&target)),
            RenameDecision::Skip => panic!("unexpected skip"),
        }
    }
}
