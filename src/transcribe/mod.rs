// Speech recognition collaborator
//
// The pipeline only depends on the `Transcriber` trait. The shipped
// implementation drives the OpenAI whisper command-line tool.

pub mod whisper_cli;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use whisper_cli::WhisperCliTranscriber;

use crate::config::TranscribeSettings;
use crate::error::Result;
use crate::subtitle::Segment;

/// Options passed through to the recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeOptions {
    /// Model size tag (tiny, base, small, medium, large)
    pub model: String,
    /// Spoken language; `None` lets the model detect it
    pub language: Option<String>,
    /// Hardware acceleration
    pub use_gpu: bool,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            language: None,
            use_gpu: false,
        }
    }
}

impl From<&TranscribeSettings> for TranscribeOptions {
    fn from(settings: &TranscribeSettings) -> Self {
        Self {
            model: settings.model.clone(),
            language: settings.language.clone(),
            use_gpu: settings.use_gpu,
        }
    }
}

/// Recognizer output: ordered segments plus the flat text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub language: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio (or video) file
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<TranscriptionResult>;

    /// Fail early when the recognizer cannot be launched
    async fn check_availability(&self) -> Result<()>;
}
