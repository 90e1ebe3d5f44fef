//! Name extraction: locate the student's name inside a noisy transcript.
//!
//! The forms carry the name on a line that starts with a `Nome:` label and is
//! followed either by the `RG` identity-number label or by the `Matrícula`
//! enrolment label. OCR regularly mangles all three (a stray glyph before the
//! label, `í` read as `i` or dropped, `M` read as `l`), so the default
//! expression is deliberately loose.
//!
//! Extraction is a [`NameExtractor`] strategy. [`NamePattern`] is the only
//! implementation shipped, and its expression is plain configuration: a new
//! form template means a new pattern string, nothing else.

use crate::error::RenameError;
use regex::Regex;
use std::fmt;

/// Default expression: `nome:` label, lazy capture, then `RG` or `matrícula`.
pub const DEFAULT_NAME_PATTERN: &str =
    r"(?i)n?o?me:\s*(.+?)(?:(?:\n*i?RG\b)|(?:\s[lm]?atr[ií]?cula))";

/// Finds the candidate name substring in a transcript.
pub trait NameExtractor: Send + Sync {
    /// Returns the raw (un-normalised) capture, or `None` on no match.
    fn extract(&self, transcript: &str) -> Option<String>;
}

/// Regex-driven [`NameExtractor`]: the first capture group is the name.
#[derive(Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// Compile `pattern`; it must contain at least one capture group.
    pub fn new(pattern: &str) -> Result<Self, RenameError> {
        let regex = Regex::new(pattern).map_err(|e| RenameError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if regex.captures_len() < 2 {
            return Err(RenameError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern needs a capture group around the name".into(),
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for NamePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_NAME_PATTERN).unwrap(),
        }
    }
}

impl fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamePattern").field(&self.regex.as_str()).finish()
    }
}

impl NameExtractor for NamePattern {
    fn extract(&self, transcript: &str) -> Option<String> {
        self.regex
            .captures(transcript)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<String> {
        NamePattern::default().extract(text)
    }

    #[test]
    fn test_extract_before_rg_on_next_line() {
        let text = "ESCOLA ESTADUAL\nnome: Miquel Noqueira\nRG 12.345.678-9\n";
        assert_eq!(extract(text).as_deref(), Some("Miquel Noqueira"));
    }

    #[test]
    fn test_extract_before_rg_on_same_line() {
        let text = "Nome: Maria Silva RG: 1234";
        assert_eq!(extract(text).as_deref(), Some("Maria Silva "));
    }

    #[test]
    fn test_extract_before_matricula() {
        let text = "NOME: Ana Costa Matrícula 2023001";
        assert_eq!(extract(text).as_deref(), Some("Ana Costa"));
    }

    #[test]
    fn test_extract_tolerates_ocr_damage() {
        // stray glyph before the label, 'M' read as 'l', accent dropped
        assert_eq!(
            extract("ome: João Pereira latricula 77").as_deref(),
            Some("João Pereira")
        );
        assert_eq!(
            extract("|Nome: João Pereira atrcula 77").as_deref(),
            Some("João Pereira")
        );
    }

    #[test]
    fn test_extract_stops_at_first_landmark() {
        let text = "Nome: Ana Costa matricula 1 RG 2";
        assert_eq!(extract(text).as_deref(), Some("Ana Costa"));
    }

    #[test]
    fn test_rg_needs_word_boundary() {
        // "RGB" is not the identity label; the capture runs on to "matrícula"
        let text = "Nome: Ana RGBosa matrícula 9";
        assert_eq!(extract(text).as_deref(), Some("Ana RGBosa"));
    }

    #[test]
    fn test_no_label_is_none() {
        assert_eq!(extract("Aluno Maria Silva RG 1234"), None);
    }

    #[test]
    fn test_no_end_landmark_is_none() {
        assert_eq!(extract("Nome: Maria Silva\nTurma 3B\n"), None);
    }

    #[test]
    fn test_custom_pattern() {
        let p = NamePattern::new(r"(?i)student:\s*(.+?)\s+id\b").unwrap();
        assert_eq!(p.extract("Student: Ana Costa ID 4").as_deref(), Some("Ana Costa"));
    }

    #[test]
    fn test_pattern_without_group_is_rejected() {
        let err = NamePattern::new(r"nome:\s*\w+").unwrap_err();
        assert!(matches!(err, RenameError::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_that_does_not_compile_is_rejected() {
        assert!(NamePattern::new(r"nome:(").is_err());
    }
}
