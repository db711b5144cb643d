// OpenAI whisper command-line implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SubtitlerError};
use super::{Transcriber, TranscribeOptions, TranscriptionResult};

pub struct WhisperCliTranscriber {
    binary_path: PathBuf,
}

impl WhisperCliTranscriber {
    pub fn new<P: Into<PathBuf>>(binary_path: P) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    fn build_command(&self, audio_path: &Path, output_dir: &Path, options: &TranscribeOptions) -> Command {
        let (device, fp16) = if options.use_gpu { ("cuda", "True") } else { ("cpu", "False") };

        let mut cmd = Command::new(&self.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&options.model)
            .arg("--output_dir").arg(output_dir)
            .arg("--output_format").arg("json")
            .arg("--device").arg(device)
            .arg("--fp16").arg(fp16)
            .arg("--verbose").arg("False");

        if let Some(language) = &options.language {
            cmd.arg("--language").arg(language);
        }
        cmd
    }
}

/// Parse whisper's JSON result, trimming the leading space whisper puts on
/// each segment
pub fn parse_whisper_json(content: &str) -> Result<TranscriptionResult> {
    let mut result: TranscriptionResult = serde_json::from_str(content)
        .map_err(|e| SubtitlerError::Transcription(format!("Failed to parse whisper JSON: {}", e)))?;

    for segment in &mut result.segments {
        segment.text = segment.text.trim().to_string();
    }
    result.text = result.text.trim().to_string();
    Ok(result)
}

#[async_trait]
impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path, options: &TranscribeOptions) -> Result<TranscriptionResult> {
        if !audio_path.exists() {
            return Err(SubtitlerError::FileNotFound(audio_path.display().to_string()));
        }

        info!(
            "Transcribing {} (model: {}, language: {}, gpu: {})",
            audio_path.display(),
            options.model,
            options.language.as_deref().unwrap_or("auto"),
            options.use_gpu
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let output = self
            .build_command(audio_path, output_dir, options)
            .output()
            .await
            .map_err(|e| SubtitlerError::Transcription(format!("Failed to execute whisper command: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubtitlerError::Transcription(format!("Whisper transcription failed: {}", stderr)));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| SubtitlerError::Transcription("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        if !json_file.exists() {
            return Err(SubtitlerError::Transcription("Whisper JSON output file not found".to_string()));
        }

        let json_content = tokio::fs::read_to_string(&json_file).await?;
        let result = parse_whisper_json(&json_content)?;

        debug!("Transcript text: {}", result.text);
        info!("Transcribed {} segments", result.segments.len());
        Ok(result)
    }

    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg("--help")
            .output()
            .await
            .map_err(|e| SubtitlerError::Transcription(format!(
                "{} command not found: {}",
                self.binary_path.display(),
                e
            )))?;

        if output.status.success() {
            info!("Whisper command-line tool is available");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SubtitlerError::Transcription(format!(
                "Whisper not available. Install with: pip install openai-whisper\nError: {}",
                stderr
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHISPER_OUTPUT: &str = r#"{
        "text": " Hello World",
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 1.5, "text": " Hello", "tokens": [50364, 2425], "avg_logprob": -0.25},
            {"id": 1, "seek": 0, "start": 1.5, "end": 3.25, "text": " World", "tokens": [3937], "avg_logprob": -0.31}
        ],
        "language": "en"
    }"#;

    #[test]
    fn test_parse_whisper_json() {
        let result = parse_whisper_json(WHISPER_OUTPUT).unwrap();

        assert_eq!(result.text, "Hello World");
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].text, "Hello");
        assert_eq!(result.segments[1].end, 3.25);
        assert_eq!(result.segments[1].extra["id"], serde_json::json!(1));
    }

    #[test]
    fn test_parse_whisper_json_rejects_segment_without_text() {
        let broken = r#"{"text": "", "segments": [{"start": 0.0, "end": 1.0}]}"#;
        assert!(matches!(parse_whisper_json(broken), Err(SubtitlerError::Transcription(_))));
    }

    #[tokio::test]
    async fn test_missing_audio_file() {
        let transcriber = WhisperCliTranscriber::new("whisper");
        let err = transcriber
            .transcribe(Path::new("/nonexistent/audio.mp3"), &TranscribeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubtitlerError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let audio = tempfile::NamedTempFile::new().unwrap();
        let transcriber = WhisperCliTranscriber::new("/nonexistent/whisper-binary");
        let err = transcriber
            .transcribe(audio.path(), &TranscribeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubtitlerError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_check_availability_reports_missing_binary() {
        let transcriber = WhisperCliTranscriber::new("/nonexistent/whisper-binary");
        let err = transcriber.check_availability().await.unwrap_err();
        assert!(err.to_string().contains("command not found"));
    }
}
