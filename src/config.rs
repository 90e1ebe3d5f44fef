//! Configuration for a batch rename.
//!
//! Every knob lives in [`RenameConfig`], built through
//! [`RenameConfigBuilder`]. Collaborators (rasteriser, transcriber) can be
//! injected as trait objects; when they are not, the coordinator builds the
//! defaults from the plain fields here (pdfium for rendering, the selected
//! [`OcrEngine`] for transcription).

use crate::error::RenameError;
use crate::pipeline::extract::{NameExtractor, NamePattern};
use crate::pipeline::normalize::SpellingFixes;
use crate::pipeline::ocr::Transcriber;
use crate::pipeline::render::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Upper bound for [`RenameConfig::max_retries`].
pub const MAX_RETRIES: u32 = 10;

/// Artifact files written by `keep_artifacts`; documents may not share them.
const ARTIFACT_EXTENSIONS: [&str; 2] = ["jpg", "txt"];

/// Configuration for [`crate::rename_directory`].
///
/// # Example
/// ```rust
/// use pdf_student_rename::{OcrEngine, RenameConfig};
///
/// let config = RenameConfig::builder()
///     .language("por+eng")
///     .engine(OcrEngine::Tesseract)
///     .dry_run(true)
///     .build()
///     .unwrap();
/// assert!(config.dry_run);
/// ```
#[derive(Clone)]
pub struct RenameConfig {
    /// Extension of eligible documents, without the dot. Default: `pdf`.
    pub extension: String,

    /// Rendering DPI for the first page. Range: 72–600. Default: 200.
    ///
    /// Tesseract is most accurate around 200–300 DPI on typed forms.
    pub dpi: u32,

    /// Longest rendered edge in pixels. Default: 3000.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted scans.
    pub password: Option<String>,

    /// Explicit pdfium library; `None` lets `pdfium-auto` locate or download it.
    pub pdfium_library: Option<PathBuf>,

    /// Which built-in transcriber to use. Default: [`OcrEngine::Tesseract`].
    pub engine: OcrEngine,

    /// Tesseract language code(s). Default: `por`.
    pub language: String,

    /// Tesseract binary. Default: `tesseract` from `PATH`.
    pub tesseract_path: PathBuf,

    /// Vision provider name (e.g. "openai") for [`OcrEngine::Vision`].
    pub provider_name: Option<String>,

    /// Vision model identifier for [`OcrEngine::Vision`].
    pub model: Option<String>,

    /// Retries per document for the vision engine. Range: 0–10. Default: 3.
    pub max_retries: u32,

    /// Name-extraction strategy. Default: [`NamePattern::default`].
    pub extractor: Arc<dyn NameExtractor>,

    /// OCR spelling corrections applied after normalisation.
    pub spelling_fixes: SpellingFixes,

    /// Decide and report, but do not rename anything. Default: false.
    pub dry_run: bool,

    /// Save `<stem>.jpg` (page image) and `<stem>.txt` (transcript) next to
    /// each document. Default: false.
    pub keep_artifacts: bool,

    /// Injected rasteriser; takes precedence over the pdfium fields.
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Injected transcriber; takes precedence over `engine`.
    pub transcriber: Option<Arc<dyn Transcriber>>,

    /// Per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            extension: "pdf".to_string(),
            dpi: 200,
            max_rendered_pixels: 3000,
            password: None,
            pdfium_library: None,
            engine: OcrEngine::default(),
            language: "por".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            provider_name: None,
            model: None,
            max_retries: 3,
            extractor: Arc::new(NamePattern::default()),
            spelling_fixes: SpellingFixes::default(),
            dry_run: false,
            keep_artifacts: false,
            rasterizer: None,
            transcriber: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameConfig")
            .field("extension", &self.extension)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("engine", &self.engine)
            .field("language", &self.language)
            .field("tesseract_path", &self.tesseract_path)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("spelling_fixes", &self.spelling_fixes.len())
            .field("dry_run", &self.dry_run)
            .field("keep_artifacts", &self.keep_artifacts)
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"))
            .field("transcriber", &self.transcriber.as_ref().map(|_| "<dyn Transcriber>"))
            .finish()
    }
}

impl RenameConfig {
    /// Create a new builder for `RenameConfig`.
    pub fn builder() -> RenameConfigBuilder {
        RenameConfigBuilder {
            config: Self::default(),
            pattern: None,
        }
    }
}

/// Builder for [`RenameConfig`].
pub struct RenameConfigBuilder {
    config: RenameConfig,
    pattern: Option<String>,
}

impl RenameConfigBuilder {
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.config.extension = ext.into().trim_start_matches('.').to_string();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn engine(mut self, engine: OcrEngine) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(MAX_RETRIES);
        self
    }

    /// Name-extraction expression; compiled and checked in [`Self::build`].
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn NameExtractor>) -> Self {
        self.config.extractor = extractor;
        self.pattern = None;
        self
    }

    pub fn spelling_fixes(mut self, fixes: SpellingFixes) -> Self {
        self.config.spelling_fixes = fixes;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn keep_artifacts(mut self, v: bool) -> Self {
        self.config.keep_artifacts = v;
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.config.transcriber = Some(transcriber);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<RenameConfig, RenameError> {
        if let Some(pattern) = self.pattern.take() {
            self.config.extractor = Arc::new(NamePattern::new(&pattern)?);
        }

        let c = &self.config;
        if c.extension.is_empty() {
            return Err(RenameError::InvalidConfig(
                "document extension must not be empty".into(),
            ));
        }
        if c.keep_artifacts
            && ARTIFACT_EXTENSIONS
                .iter()
                .any(|a| c.extension.eq_ignore_ascii_case(a))
        {
            return Err(RenameError::InvalidConfig(format!(
                "keep_artifacts writes .jpg and .txt files and cannot be used \
                 with '.{}' documents",
                c.extension
            )));
        }
        if c.language.trim().is_empty() {
            return Err(RenameError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Built-in transcription backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngine {
    /// Local `tesseract` binary. No network, no API key. (default)
    #[default]
    Tesseract,
    /// Vision language model through `edgequake-llm`.
    Vision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RenameConfig::default();
        assert_eq!(c.extension, "pdf");
        assert_eq!(c.language, "por");
        assert_eq!(c.engine, OcrEngine::Tesseract);
        assert!(!c.dry_run);
        assert_eq!(c.spelling_fixes, SpellingFixes::default());
    }

    #[test]
    fn builder_clamps_and_strips() {
        let c = RenameConfig::builder()
            .dpi(10)
            .extension(".PDF")
            .build()
            .unwrap();
        assert_eq!(c.dpi, 72);
        assert_eq!(c.extension, "PDF");
    }

    #[test]
    fn builder_compiles_custom_pattern() {
        let c = RenameConfig::builder()
            .pattern(r"(?i)aluno:\s*(.+?)\n")
            .build()
            .unwrap();
        assert_eq!(
            c.extractor.extract("Aluno: Ana Costa\n").as_deref(),
            Some("Ana Costa")
        );
    }

    #[test]
    fn builder_rejects_bad_pattern() {
        let err = RenameConfig::builder().pattern("nome:(").build().unwrap_err();
        assert!(matches!(err, RenameError::InvalidPattern { .. }));
    }

    #[test]
    fn builder_rejects_empty_extension() {
        assert!(RenameConfig::builder().extension("").build().is_err());
    }

    #[test]
    fn builder_rejects_artifact_extensions_with_keep_artifacts() {
        for ext in ["txt", "JPG", ".jpg"] {
            let err = RenameConfig::builder()
                .extension(ext)
                .keep_artifacts(true)
                .build()
                .unwrap_err();
            assert!(matches!(err, RenameError::InvalidConfig(_)), "accepted {ext}");
        }
        assert!(RenameConfig::builder().extension("txt").build().is_ok());
        assert!(RenameConfig::builder().keep_artifacts(true).build().is_ok());
    }

    #[test]
    fn builder_caps_retries() {
        let c = RenameConfig::builder().max_retries(1000).build().unwrap();
        assert_eq!(c.max_retries, MAX_RETRIES);
        let c = RenameConfig::builder().max_retries(2).build().unwrap();
        assert_eq!(c.max_retries, 2);
    }

    #[test]
    fn debug_hides_trait_objects() {
        let s = format!("{:?}", RenameConfig::default());
        assert!(s.contains("RenameConfig"));
        assert!(s.contains("extension"));
    }
}
