use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe an audio or video file into subtitle files
    Transcribe {
        /// Input audio or video file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Transcribe every media file in a directory
    Batch {
        /// Input directory containing media files
        #[arg(short, long)]
        input_dir: PathBuf,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Render a saved JSON transcript into other formats
    Format {
        /// JSON transcript (whisper result or segment array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output formats (comma-separated: txt,json,srt,vtt,tsv)
        #[arg(short, long, default_value = "srt")]
        formats: String,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Translate a piece of text
    Translate {
        /// Text to translate
        text: String,

        /// Source language tag, or "auto"
        #[arg(short, long)]
        source: Option<String>,

        /// Destination language tag
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Read or update the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by `transcribe` and `batch`; unset values fall back to the
/// configuration file
#[derive(ClapArgs, Debug, Clone)]
pub struct JobArgs {
    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output formats (comma-separated: txt,json,srt,vtt,tsv)
    #[arg(short, long)]
    pub formats: Option<String>,

    /// Whisper model size (tiny, base, small, medium, large)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Spoken language; detected when omitted
    #[arg(short, long)]
    pub language: Option<String>,

    /// Run the model on the GPU
    #[arg(long)]
    pub gpu: bool,

    /// Translate the transcript into this language before writing
    #[arg(short, long)]
    pub translate_to: Option<String>,

    /// Source language for translation
    #[arg(long)]
    pub translate_from: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the value at a dotted key path
    Get {
        /// Dotted key path, e.g. translate.target
        key: String,
    },

    /// Set the value at a dotted key path and save the file
    Set {
        /// Dotted key path, e.g. translate.target
        key: String,

        /// JSON value; anything that does not parse as JSON is stored as a string
        value: String,
    },
}

pub fn parse_formats(formats: &str) -> Vec<String> {
    formats
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn parse_key_path(key: &str) -> Vec<&str> {
    key.split('.').filter(|k| !k.is_empty()).collect()
}

pub fn parse_config_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
