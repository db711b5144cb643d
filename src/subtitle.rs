//! Transcript rendering into txt, json, srt, vtt and tsv subtitle files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, SubtitlerError};

/// One timed unit of transcribed speech.
///
/// Fields other than `start`, `end` and `text` (segment id, token ids,
/// log-probabilities, ...) are kept in `extra`. A deserialized segment
/// remembers the object it came from, so serializing it again keeps the
/// recognizer's key order and writes unchanged times exactly as they were
/// read (`1` stays `1`, not `1.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub extra: Map<String, Value>,
    source: Map<String, Value>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            extra: Map::new(),
            source: Map::new(),
        }
    }
}

// Equality is by content; where a segment was read from is irrelevant.
impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.text == other.text
            && self.extra == other.extra
    }
}

impl TryFrom<Map<String, Value>> for Segment {
    type Error = String;

    fn try_from(source: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let time = |key: &str| {
            source
                .get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| format!("segment is missing numeric field `{}`", key))
        };
        let start = time("start")?;
        let end = time("end")?;
        let text = source
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| "segment is missing string field `text`".to_string())?
            .to_string();

        let extra = source
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "start" | "end" | "text"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            start,
            end,
            text,
            extra,
            source,
        })
    }
}

impl From<Segment> for Map<String, Value> {
    fn from(segment: Segment) -> Self {
        let Segment {
            start,
            end,
            text,
            mut extra,
            source,
        } = segment;

        let mut start = Some(time_value(start, source.get("start")));
        let mut end = Some(time_value(end, source.get("end")));
        let mut text = Some(Value::String(text));

        let mut map = Map::new();
        for key in source.keys() {
            let value = match key.as_str() {
                "start" => start.take(),
                "end" => end.take(),
                "text" => text.take(),
                _ => extra.remove(key),
            };
            if let Some(value) = value {
                map.insert(key.clone(), value);
            }
        }

        for (key, value) in [("start", start), ("end", end), ("text", text)] {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        }
        map.extend(extra);
        map
    }
}

/// The value as originally read when it still holds `seconds`
fn time_value(seconds: f64, original: Option<&Value>) -> Value {
    match original {
        Some(value) if value.as_f64() == Some(seconds) => value.clone(),
        _ => Value::from(seconds),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Txt,
    Json,
    Srt,
    Vtt,
    Tsv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Txt,
        OutputFormat::Json,
        OutputFormat::Srt,
        OutputFormat::Vtt,
        OutputFormat::Tsv,
    ];

    /// File extension, which is also the format tag
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Tsv => "tsv",
        }
    }

    /// Render a transcript in this format
    pub fn render(&self, segments: &[Segment]) -> Result<String> {
        match self {
            OutputFormat::Txt => Ok(render_txt(segments)),
            OutputFormat::Json => render_json(segments),
            OutputFormat::Srt => Ok(render_srt(segments)),
            OutputFormat::Vtt => Ok(render_vtt(segments)),
            OutputFormat::Tsv => Ok(render_tsv(segments)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = SubtitlerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" => Ok(OutputFormat::Vtt),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(SubtitlerError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render a transcript in the format named by `format`
pub fn format_transcript(segments: &[Segment], format: &str) -> Result<String> {
    format.parse::<OutputFormat>()?.render(segments)
}

/// Parse every tag and render every format before returning anything, so a
/// bad tag anywhere in the list produces no output at all.
pub fn render_all<S: AsRef<str>>(
    segments: &[Segment],
    formats: &[S],
) -> Result<Vec<(OutputFormat, String)>> {
    let parsed = formats
        .iter()
        .map(|tag| tag.as_ref().parse::<OutputFormat>())
        .collect::<Result<Vec<_>>>()?;

    parsed
        .into_iter()
        .map(|format| format.render(segments).map(|content| (format, content)))
        .collect()
}

/// Format seconds as `H:MM:SS,mmm`.
///
/// Hours are not padded. The comma separator is used for every format,
/// WebVTT included. Input is trusted: negative values and NaN render as
/// `0:00:00,000`, and infinities saturate at the largest representable
/// millisecond count.
pub fn format_timestamp(seconds: f64) -> String {
    let total_milliseconds = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn render_txt(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_json(segments: &[Segment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(segments)?)
}

fn render_srt(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_timestamp(segment.start),
                format_timestamp(segment.end),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_vtt(segments: &[Segment]) -> String {
    let cues = segments
        .iter()
        .map(|segment| {
            format!(
                "{} --> {}\n{}\n",
                format_timestamp(segment.start),
                format_timestamp(segment.end),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("WEBVTT\n\n{}", cues)
}

fn render_tsv(segments: &[Segment]) -> String {
    let mut tsv = String::from("start\tend\ttext");
    for segment in segments {
        tsv.push('\n');
        tsv.push_str(&format!(
            "{}\t{}\t{}",
            format_timestamp(segment.start),
            format_timestamp(segment.end),
            segment.text
        ));
    }
    tsv
}

/// Render the requested formats and write `<stem>.<ext>` for each into
/// `output_dir`. Nothing is written unless every format renders.
pub async fn write_outputs<S: AsRef<str>>(
    segments: &[Segment],
    formats: &[S],
    output_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let rendered = render_all(segments, formats)?;

    fs::create_dir_all(output_dir).await?;

    let mut written = Vec::with_capacity(rendered.len());
    for (format, content) in rendered {
        let path = output_dir.join(format!("{}.{}", stem, format.extension()));
        debug!("Writing {} output: {}", format, path.display());
        fs::write(&path, content).await?;
        written.push(path);
    }

    info!("Wrote {} subtitle file(s) to {}", written.len(), output_dir.display());
    Ok(written)
}
