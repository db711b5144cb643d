// Translation collaborator
//
// - Translator: trait the pipeline depends on
// - GoogleTranslator: public web translation endpoint

pub mod google;

use async_trait::async_trait;
use tracing::{debug, info};

pub use google::GoogleTranslator;
use crate::error::Result;
use crate::transcribe::TranscriptionResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (a language tag or "auto") to `target`
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Translate a single string. Empty input returns empty output without
/// calling the backend.
pub async fn translate_text(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
) -> Result<String> {
    debug!("trans input src:{}, dest:{}", source, target);
    if text.is_empty() {
        return Ok(String::new());
    }
    translator.translate(text, source, target).await
}

/// Replace every segment's text, and the flat text, with its translation.
/// The first failure is returned and the transcript is left partly
/// translated.
pub async fn translate_transcript(
    translator: &dyn Translator,
    transcript: &mut TranscriptionResult,
    source: &str,
    target: &str,
) -> Result<()> {
    info!("Translating {} segments to {}", transcript.segments.len(), target);

    for segment in transcript.segments.iter_mut() {
        segment.text = translate_text(translator, &segment.text, source, target).await?;
    }
    transcript.text = translate_text(translator, &transcript.text, source, target).await?;
    transcript.language = Some(target.to_string());

    Ok(())
}
