use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtitlerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported output format '{0}' (expected one of: txt, json, srt, vtt, tsv)")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, SubtitlerError>;
