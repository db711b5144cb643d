use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::{Result, SubtitlerError};
use crate::subtitle::{write_outputs, OutputFormat, Segment};
use crate::transcribe::{TranscribeOptions, Transcriber, TranscriptionResult, WhisperCliTranscriber};
use crate::translate::{translate_transcript, GoogleTranslator, Translator};

const MEDIA_EXTENSIONS: [&str; 12] = [
    "mp3", "wav", "m4a", "flac", "ogg", "opus", "aac", "mp4", "mkv", "mov", "webm", "avi",
];

/// Source and destination languages for an optional translation pass
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateRequest {
    pub source: String,
    pub target: String,
}

/// What to produce for each input file
#[derive(Debug, Clone)]
pub struct JobOptions {
    pub formats: Vec<String>,
    pub transcribe: TranscribeOptions,
    pub translate: Option<TranslateRequest>,
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
}

pub struct Workflow {
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn Translator>,
}

impl Workflow {
    pub fn new(transcriber: Box<dyn Transcriber>, translator: Box<dyn Translator>) -> Self {
        Self { transcriber, translator }
    }

    /// Whisper command-line transcriber and web translator from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transcriber = WhisperCliTranscriber::new(&settings.transcribe.binary_path);
        let translator = GoogleTranslator::new(&settings.translate)?;
        Ok(Self::new(Box::new(transcriber), Box::new(translator)))
    }

    /// Make sure the transcriber can run before any file is touched
    pub async fn check_availability(&self) -> Result<()> {
        self.transcriber.check_availability().await
    }

    /// Transcribe one file, optionally translate it, and write every
    /// requested format next to the input (or into `output_dir`).
    pub async fn transcribe_file(
        &self,
        input_path: &Path,
        output_dir: Option<&Path>,
        job: &JobOptions,
    ) -> Result<Vec<PathBuf>> {
        info!("Processing file: {}", input_path.display());

        if !input_path.exists() {
            return Err(SubtitlerError::FileNotFound(input_path.display().to_string()));
        }
        validate_formats(&job.formats)?;

        let output_dir = resolve_output_dir(input_path, output_dir)?;
        let stem = file_stem(input_path)?;

        let mut transcript = self.transcriber.transcribe(input_path, &job.transcribe).await?;

        if let Some(request) = &job.translate {
            translate_transcript(self.translator.as_ref(), &mut transcript, &request.source, &request.target)
                .await?;
        }

        write_outputs(&transcript.segments, &job.formats, &output_dir, &stem).await
    }

    /// Process every media file under `input_dir`. A failing file is logged
    /// and counted; it does not stop the batch.
    pub async fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        job: &JobOptions,
    ) -> Result<BatchSummary> {
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(SubtitlerError::Config("Input path is not a directory".to_string()));
        }
        validate_formats(&job.formats)?;

        let media_files = find_media_files(input_dir);
        info!("Found {} media files to process", media_files.len());

        let pb = ProgressBar::new(media_files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut summary = BatchSummary::default();
        for media_path in media_files {
            pb.set_message(media_path.display().to_string());
            match self.transcribe_file(&media_path, output_dir, job).await {
                Ok(_) => {
                    info!("Successfully processed: {}", media_path.display());
                    summary.processed += 1;
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", media_path.display(), e);
                    summary.failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");

        Ok(summary)
    }
}

/// Re-render a saved JSON transcript (either a recognizer result or a bare
/// segment array) into other formats.
pub async fn reformat_transcript(
    input_path: &Path,
    output_dir: Option<&Path>,
    formats: &[String],
) -> Result<Vec<PathBuf>> {
    if !input_path.exists() {
        return Err(SubtitlerError::FileNotFound(input_path.display().to_string()));
    }
    let content = fs::read_to_string(input_path).await?;
    let segments = parse_transcript_json(&content)?;

    let output_dir = resolve_output_dir(input_path, output_dir)?;
    let stem = file_stem(input_path)?;
    write_outputs(&segments, formats, &output_dir, &stem).await
}

pub fn parse_transcript_json(content: &str) -> Result<Vec<Segment>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.is_array() {
        Ok(serde_json::from_value(value)?)
    } else {
        let result: TranscriptionResult = serde_json::from_value(value)?;
        Ok(result.segments)
    }
}

fn validate_formats(formats: &[String]) -> Result<()> {
    for tag in formats {
        tag.parse::<OutputFormat>()?;
    }
    Ok(())
}

fn resolve_output_dir(input_path: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    match output_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| SubtitlerError::Config("Cannot determine output directory".to_string())),
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| SubtitlerError::Config(format!("Invalid file name: {}", path.display())))
}

fn find_media_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
