//! Subtitler - speech-to-subtitle pipeline
//!
//! Entry point: loads the JSON configuration, initializes logging, and runs
//! the requested subcommand.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::info;

use subtitler::cli::{parse_config_value, parse_formats, parse_key_path, Args, Commands, ConfigAction, JobArgs};
use subtitler::config::{ConfigStore, Settings};
use subtitler::error::SubtitlerError;
use subtitler::logging::init_logging;
use subtitler::transcribe::TranscribeOptions;
use subtitler::translate::{translate_text, GoogleTranslator};
use subtitler::workflow::{reformat_transcript, JobOptions, TranslateRequest, Workflow};

const DEFAULT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut store = match &args.config {
        Some(config_path) => ConfigStore::load(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG).exists() {
                ConfigStore::load(DEFAULT_CONFIG)?
            } else {
                ConfigStore::empty(DEFAULT_CONFIG)
            }
        }
    };
    let settings = store.settings()?;

    let mut log_options = settings.log.clone();
    if args.verbose {
        log_options.level = "debug".to_string();
    }
    let _guard = init_logging(&log_options)?;
    info!("Using configuration: {}", store.path().display());

    match args.command {
        Commands::Transcribe { input, job } => {
            let workflow = Workflow::from_settings(&settings)?;
            workflow.check_availability().await?;
            let job_options = build_job(&settings, &job);
            let written = workflow
                .transcribe_file(&input, job.output_dir.as_deref(), &job_options)
                .await?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Batch { input_dir, job } => {
            let workflow = Workflow::from_settings(&settings)?;
            workflow.check_availability().await?;
            let job_options = build_job(&settings, &job);
            let summary = workflow
                .process_directory(&input_dir, job.output_dir.as_deref(), &job_options)
                .await?;
            println!("Processed {} file(s), {} failed", summary.processed, summary.failed);
        }
        Commands::Format { input, formats, output_dir } => {
            let written = reformat_transcript(&input, output_dir.as_deref(), &parse_formats(&formats)).await?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Commands::Translate { text, source, target } => {
            let translator = GoogleTranslator::new(&settings.translate)?;
            let source = source.unwrap_or_else(|| settings.translate.source.clone());
            let target = target.unwrap_or_else(|| settings.translate.target.clone());
            let translated = translate_text(&translator, &text, &source, &target).await?;
            println!("{}", translated);
        }
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                let value = store.get(&parse_key_path(&key), serde_json::Value::Null);
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            ConfigAction::Set { key, value } => {
                let keys = parse_key_path(&key);
                if keys.is_empty() {
                    return Err(SubtitlerError::Config(format!("Invalid key path '{}'", key)).into());
                }
                store.set(&keys, parse_config_value(&value))?;
                println!("Saved {} to {}", key, store.path().display());
            }
        },
    }

    info!("Subtitler completed successfully");
    Ok(())
}

/// Merge command-line overrides onto the configured defaults
fn build_job(settings: &Settings, job: &JobArgs) -> JobOptions {
    let mut transcribe = TranscribeOptions::from(&settings.transcribe);
    if let Some(model) = &job.model {
        transcribe.model = model.clone();
    }
    if job.language.is_some() {
        transcribe.language = job.language.clone();
    }
    transcribe.use_gpu |= job.gpu;

    let formats = match &job.formats {
        Some(formats) => parse_formats(formats),
        None => settings.transcribe.formats.clone(),
    };

    let translate = job.translate_to.as_ref().map(|target| TranslateRequest {
        source: job
            .translate_from
            .clone()
            .unwrap_or_else(|| settings.translate.source.clone()),
        target: target.clone(),
    });

    JobOptions {
        formats,
        transcribe,
        translate,
    }
}
