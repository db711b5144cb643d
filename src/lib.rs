//! Subtitler - speech-to-subtitle pipeline
//!
//! Transcribes audio with whisper, optionally translates the transcript, and
//! renders it as plain text, JSON, SRT, WebVTT or TSV.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
