//! Name normalisation: raw OCR capture → filename-safe, upper-case name.
//!
//! Two passes with no shared state:
//!
//! 1. [`normalize`] strips everything that cannot appear in a student's
//!    name (punctuation, digits, underscores), deletes runs of two or more
//!    whitespace characters outright, upper-cases and trims.
//! 2. [`SpellingFixes::apply`] replaces OCR misreads that are known to recur
//!    on these forms (`MIQUEL` → `MIGUEL`, …).
//!
//! The correction table is plain data passed in by the caller so a batch
//! can be run with a site-specific table.

use crate::error::RenameError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static RE_NON_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]|[\d_]").unwrap());

// Multi-space runs are removed, not collapsed to one space. Scans with wide
// gaps between given name and surname therefore come out joined.
static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Reduce a raw name capture to upper-case letters and single spaces.
///
/// The result may be empty; callers must treat that as a failure, never as
/// a valid name.
pub fn normalize(raw: &str) -> String {
    let stripped = RE_NON_NAME_CHARS.replace_all(raw, "");
    let collapsed = RE_WHITESPACE_RUN.replace_all(&stripped, "");
    collapsed.to_uppercase().trim().to_string()
}

/// Ordered table of exact-substring corrections applied after [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellingFixes {
    rules: Vec<(String, String)>,
}

impl Default for SpellingFixes {
    fn default() -> Self {
        Self {
            rules: [
                ("MIQUEL", "MIGUEL"),
                ("NOQUEIRA", "NOGUEIRA"),
                ("RODRIQUES", "RODRIGUES"),
            ]
            .into_iter()
            .map(|(w, r)| (w.to_string(), r.to_string()))
            .collect(),
        }
    }
}

/// A rule may only trade letters and spaces for letters and spaces, so a
/// fixed name stays a valid file stem inside the scanned directory.
fn is_name_text(s: &str) -> bool {
    s.chars().all(|c| c.is_alphabetic() || c == ' ')
}

fn check_rule(line: usize, wrong: String, right: String) -> Result<(String, String), RenameError> {
    if wrong.trim().is_empty() || !is_name_text(&wrong) || !is_name_text(&right) {
        return Err(RenameError::InvalidSpellingFix {
            line,
            content: format!("{}={}", wrong, right),
        });
    }
    Ok((wrong, right))
}

impl SpellingFixes {
    /// Build a table from `(wrong, right)` pairs, kept in the given order.
    ///
    /// # Errors
    /// [`RenameError::InvalidSpellingFix`] (with the 1-based rule number as
    /// `line`) when either side holds anything but letters and spaces,
    /// or the wrong side is blank.
    pub fn new<W, R>(rules: impl IntoIterator<Item = (W, R)>) -> Result<Self, RenameError>
    where
        W: Into<String>,
        R: Into<String>,
    {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(i, (w, r))| check_rule(i + 1, w.into(), r.into()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// A table that changes nothing.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse `WRONG=RIGHT` lines. Blank lines and `#` comments are ignored;
    /// both sides are trimmed and upper-cased to match normalised names.
    pub fn parse(text: &str) -> Result<Self, RenameError> {
        let mut rules = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (wrong, right) =
                line.split_once('=')
                    .ok_or_else(|| RenameError::InvalidSpellingFix {
                        line: i + 1,
                        content: line.to_string(),
                    })?;
            rules.push(check_rule(
                i + 1,
                wrong.trim().to_uppercase(),
                right.trim().to_uppercase(),
            )?);
        }
        Ok(Self { rules })
    }

    /// Load a table from a `WRONG=RIGHT` file.
    pub fn from_file(path: &Path) -> Result<Self, RenameError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            RenameError::InvalidConfig(format!(
                "cannot read spelling fixes from '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    /// Append a rule; it runs after every existing one.
    pub fn push(
        &mut self,
        wrong: impl Into<String>,
        right: impl Into<String>,
    ) -> Result<(), RenameError> {
        let rule = check_rule(self.rules.len() + 1, wrong.into(), right.into())?;
        self.rules.push(rule);
        Ok(())
    }

    /// Append every rule of `other` after the existing ones.
    pub fn extend(&mut self, other: SpellingFixes) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every matching rule, in table order, to all occurrences.
    pub fn apply(&self, name: &str) -> String {
        let mut name = name.to_string();
        for (wrong, right) in &self.rules {
            if name.contains(wrong.as_str()) {
                debug!("Replacing misspelling '{}' with '{}'", wrong, right);
                name = name.replace(wrong.as_str(), right);
            }
        }
        name
    }
}

/// Normalise and spell-fix a raw capture; `None` when nothing usable is left.
pub fn sanitize(raw: &str, fixes: &SpellingFixes) -> Option<String> {
    let fixed = fixes.apply(&normalize(raw));
    let name = fixed.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        assert_eq!(normalize("  Maria Silva "), "MARIA SILVA");
    }

    #[test]
    fn test_normalize_strips_punctuation_digits_underscores() {
        assert_eq!(normalize("Jo_ão P. Pereira 123!"), "JOÃO P PEREIRA");
    }

    #[test]
    fn test_normalize_deletes_whitespace_runs() {
        assert_eq!(normalize("Ana   Costa"), "ANACOSTA");
        assert_eq!(normalize("Ana\t\nCosta"), "ANACOSTA");
    }

    #[test]
    fn test_normalize_punctuation_between_spaces_joins_words() {
        // "A . B" → "A  B" → "AB"
        assert_eq!(normalize("Ana . Costa"), "ANACOSTA");
    }

    #[test]
    fn test_normalize_keeps_diacritics() {
        assert_eq!(normalize("José Antônio"), "JOSÉ ANTÔNIO");
    }

    #[test]
    fn test_normalize_can_be_empty() {
        assert_eq!(normalize("12.345-6 __ ;"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Miquel Noqueira",
            "  a . b  ",
            "RG: 12.345.678-9",
            "Jo_ão\t\tda Silva!!",
            "ß straße",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn test_normalize_output_has_only_letters_and_spaces() {
        let out = normalize("Nome: Pedro_2 (Álvares) — Cabral, 1500.");
        assert_eq!(out, "NOME PEDRO ÁLVARESCABRAL");
        assert!(out.chars().all(|c| c.is_alphabetic() || c == ' '));
    }

    #[test]
    fn test_default_fixes() {
        let fixes = SpellingFixes::default();
        assert_eq!(fixes.apply("MIQUEL NOQUEIRA"), "MIGUEL NOGUEIRA");
        assert_eq!(fixes.apply("ANA RODRIQUES"), "ANA RODRIGUES");
        assert_eq!(fixes.apply("MARIA SILVA"), "MARIA SILVA");
    }

    #[test]
    fn test_fixes_replace_every_occurrence() {
        let fixes = SpellingFixes::default();
        assert_eq!(fixes.apply("MIQUEL MIQUEL"), "MIGUEL MIGUEL");
    }

    #[test]
    fn test_fixes_are_case_sensitive() {
        let fixes = SpellingFixes::default();
        assert_eq!(fixes.apply("Miquel"), "Miquel");
    }

    #[test]
    fn test_fixes_run_in_table_order() {
        let fixes = SpellingFixes::new([("AB", "X"), ("XC", "Y")]).unwrap();
        assert_eq!(fixes.apply("ABC"), "Y");
        let reversed = SpellingFixes::new([("XC", "Y"), ("AB", "X")]).unwrap();
        assert_eq!(reversed.apply("ABC"), "XC");
    }

    #[test]
    fn test_parse_fixes_file() {
        let fixes = SpellingFixes::parse("# comment\n\nmiquel = Miguel\nSOUZ=SOUZA\n").unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes.apply("MIQUEL"), "MIGUEL");
        assert_eq!(fixes.apply("SOUZ LIMA"), "SOUZA LIMA");
    }

    #[test]
    fn test_parse_fixes_rejects_malformed_line() {
        let err = SpellingFixes::parse("MIQUEL=MIGUEL\nNOQUEIRA\n").unwrap_err();
        assert!(matches!(err, RenameError::InvalidSpellingFix { line: 2, .. }));
    }

    #[test]
    fn test_parse_fixes_rejects_path_and_digit_characters() {
        for text in ["ANA=../X", "ANA COSTA=../ESCAPED 1", "SOUZ4=SOUZA", "ANA=A/B", "=X"] {
            let err = SpellingFixes::parse(text).unwrap_err();
            assert!(
                matches!(err, RenameError::InvalidSpellingFix { line: 1, .. }),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn test_new_and_push_reject_non_letters() {
        let err = SpellingFixes::new([("ANA", "ANA"), ("ANA", "../X")]).unwrap_err();
        assert!(matches!(err, RenameError::InvalidSpellingFix { line: 2, .. }));

        let mut fixes = SpellingFixes::empty();
        assert!(fixes.push("ANA", "X.Y").is_err());
        assert!(fixes.push("", "X").is_err());
        assert!(fixes.is_empty());
        fixes.push("ANA", "ANNA").unwrap();
        assert_eq!(fixes.apply("ANA COSTA"), "ANNA COSTA");
    }

    #[test]
    fn test_sanitized_names_stay_letters_and_spaces() {
        let fixes = SpellingFixes::parse("COSTA=DA COSTA\nANA= \n").unwrap();
        let name = sanitize("Ana Costa", &fixes).unwrap();
        assert_eq!(name, "DA COSTA");
        assert!(name.chars().all(|c| c.is_alphabetic() || c == ' '));
    }

    #[test]
    fn test_sanitize_empty_is_none() {
        assert_eq!(sanitize("--- 42 ---", &SpellingFixes::default()), None);
        assert_eq!(
            sanitize("Miquel Noqueira", &SpellingFixes::default()).as_deref(),
            Some("MIGUEL NOGUEIRA")
        );
    }
}
