use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SubtitlerError};
use crate::logging::LogOptions;

/// Nested JSON configuration document bound to the file it was loaded from.
///
/// Values are addressed by key path (`&["translate", "target"]`). Every
/// `set` persists the whole document back to disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    root: Value,
}

impl ConfigStore {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Config path: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtitlerError::Config(format!("Failed to read config file: {}", e)))?;

        let root: Value = serde_json::from_str(&content)
            .map_err(|e| SubtitlerError::Config(format!("Failed to parse config file: {}", e)))?;

        debug!("Config: {}", root);

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Empty document that will be written to `path` on the first `set`
    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            root: Value::Object(Map::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Value at `keys`, or `default` when any key along the way is missing or
    /// an intermediate value is not an object.
    pub fn get(&self, keys: &[&str], default: Value) -> Value {
        lookup(&self.root, keys).cloned().unwrap_or(default)
    }

    pub fn get_as<T: DeserializeOwned>(&self, keys: &[&str]) -> Option<T> {
        lookup(&self.root, keys).and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Assign `value` at `keys`, creating intermediate objects (and replacing
    /// non-object intermediates), then save.
    pub fn set(&mut self, keys: &[&str], value: Value) -> Result<()> {
        if keys.is_empty() {
            return Err(SubtitlerError::Config("Cannot set a value at an empty key path".to_string()));
        }
        insert_at(&mut self.root, keys, value);

        self.save()
    }

    /// Write the full document with four-space indentation
    pub fn save(&self) -> Result<()> {
        info!("Save config to {}", self.path.display());

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.root.serialize(&mut serializer)?;

        std::fs::write(&self.path, buffer)
            .map_err(|e| SubtitlerError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Typed view of the sections the pipeline reads
    pub fn settings(&self) -> Result<Settings> {
        serde_json::from_value(self.root.clone())
            .map_err(|e| SubtitlerError::Config(format!("Invalid configuration: {}", e)))
    }
}

fn lookup<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(root, |current, key| current.as_object()?.get(*key))
}

/// Assign `value` below `node` at `keys`. Any node that has to hold a child
/// but is not an object is replaced by an empty object.
fn insert_at(node: &mut Value, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        insert_at(child, rest, value);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogOptions,
    pub transcribe: TranscribeSettings,
    pub translate: TranslateSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscribeSettings {
    /// Path to the whisper command-line tool
    pub binary_path: String,
    /// Model size tag (tiny, base, small, medium, large)
    pub model: String,
    /// Spoken language; detected when absent
    pub language: Option<String>,
    /// Run inference on the GPU
    pub use_gpu: bool,
    /// Formats written by default
    pub formats: Vec<String>,
}

impl Default for TranscribeSettings {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "base".to_string(),
            language: None,
            use_gpu: false,
            formats: vec!["txt".to_string(), "srt".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateSettings {
    /// Base URL of the translation service
    pub endpoint: String,
    /// Source language tag, or "auto"
    pub source: String,
    /// Destination language tag
    pub target: String,
    pub timeout_secs: u64,
}

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com".to_string(),
            source: "auto".to_string(),
            target: "en".to_string(),
            timeout_secs: 30,
        }
    }
}
