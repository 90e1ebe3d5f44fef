//! Page transcription through a vision language model.
//!
//! An alternative to [`crate::pipeline::ocr::TesseractTranscriber`] for scans
//! that Tesseract reads poorly (handwriting in the name field, heavy
//! skew). The page is PNG-encoded, sent with a transcription-only system
//! prompt, and the reply is returned as-is for the name pattern to search.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors are transient. Exponential backoff
//! (`retry_backoff_ms * 2^attempt`, at most 30 s per wait) is applied; with
//! 500 ms base and 3 retries the wait sequence is 500 ms → 1 s → 2 s. This is the only retry anywhere
//! in the pipeline.

use crate::error::{DocumentError, RenameError};
use crate::pipeline::encode::encode_page;
use crate::pipeline::ocr::Transcriber;
use crate::prompts::DEFAULT_TRANSCRIBE_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use image::DynamicImage;
use std::fmt;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Default model when a provider is named without one.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1-nano";

/// Upper bound on a single wait between attempts.
const MAX_BACKOFF_MS: u64 = 30_000;

/// Wait before retry number `attempt` (1-based): `base * 2^(attempt-1)`,
/// capped at [`MAX_BACKOFF_MS`].
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_BACKOFF_MS, |ms| ms.min(MAX_BACKOFF_MS))
}

/// [`Transcriber`] that asks a vision LLM to read the page.
#[derive(Clone)]
pub struct VisionTranscriber {
    provider: Arc<dyn LLMProvider>,
    pub system_prompt: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub api_timeout_secs: u64,
}

impl fmt::Debug for VisionTranscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionTranscriber")
            .field("provider", &"<dyn LLMProvider>")
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl VisionTranscriber {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            system_prompt: DEFAULT_TRANSCRIBE_PROMPT.to_string(),
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
        }
    }

    /// Build from a provider name / model, or auto-detect from the environment.
    ///
    /// Resolution order: explicit `provider_name`, then the
    /// `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL` pair, then
    /// `OPENAI_API_KEY`, then [`ProviderFactory::from_env`].
    pub fn from_settings(
        provider_name: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self, RenameError> {
        let provider = resolve_provider(provider_name, model)?;
        Ok(Self::new(provider))
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(0.0),
            max_tokens: Some(2048),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Transcriber for VisionTranscriber {
    async fn transcribe(&self, page: &DynamicImage) -> Result<String, DocumentError> {
        let image_data = encode_page(page).map_err(|e| DocumentError::TranscribeFailed {
            detail: format!("image encoding failed: {}", e),
        })?;

        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images("", vec![image_data]),
        ];
        let options = self.build_options();
        let call_timeout = Duration::from_secs(self.api_timeout_secs);

        let mut last_err: Option<String> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = backoff_ms(self.retry_backoff_ms, attempt);
                warn!(
                    "Vision transcription: retry {}/{} after {}ms",
                    attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match timeout(call_timeout, self.provider.chat(&messages, Some(&options))).await {
                Ok(Ok(response)) => {
                    debug!(
                        "Vision transcription: {} input tokens, {} output tokens",
                        response.prompt_tokens, response.completion_tokens
                    );
                    return Ok(response.content);
                }
                Ok(Err(e)) => {
                    let err_msg = format!("{}", e);
                    warn!("Vision attempt {} failed — {}", attempt + 1, err_msg);
                    last_err = Some(err_msg);
                }
                Err(_) => {
                    let err_msg = format!("timed out after {}s", self.api_timeout_secs);
                    warn!("Vision attempt {} {}", attempt + 1, err_msg);
                    last_err = Some(err_msg);
                }
            }
        }

        Err(DocumentError::TranscribeFailed {
            detail: format!(
                "vision model failed after {} retries: {}",
                self.max_retries,
                last_err.unwrap_or_else(|| "unknown error".to_string())
            ),
        })
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, RenameError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        RenameError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn resolve_provider(
    provider_name: Option<&str>,
    model: Option<&str>,
) -> Result<Arc<dyn LLMProvider>, RenameError> {
    let model_or_default = model.unwrap_or(DEFAULT_VISION_MODEL);

    if let Some(name) = provider_name {
        return create_vision_provider(name, model_or_default);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_vision_provider("openai", model_or_default);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| RenameError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No vision provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
