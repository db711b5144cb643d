use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, Level};
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Result, SubtitlerError};

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Write to rotating files instead of the console
    pub save: bool,
    /// Log file name without the `.log` extension
    pub filename: String,
    /// Number of rotated files kept besides the active one
    pub file_num: usize,
    /// Maximum size of one log file in MB
    pub file_size: u64,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            save: false,
            filename: "run".to_string(),
            file_num: 10,
            file_size: 50,
        }
    }
}

impl LogOptions {
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.log", self.filename))
    }
}

pub fn parse_level(level: &str) -> Result<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SubtitlerError::Logging(format!(
            "Invalid log level '{}'. Valid levels: trace, debug, info, warn, error",
            level
        ))),
    }
}

/// Install the global subscriber, either on the console or on a rotating
/// log file. The returned guard flushes the file writer on drop and must
/// live as long as the program logs.
pub fn init_logging(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let level = parse_level(&options.level)?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if !options.save {
        let console_layer = fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| SubtitlerError::Logging(format!("Failed to initialize logging: {}", e)))?;

        info!("init log_level:{}, save:false", level);
        return Ok(None);
    }

    let log_path = options.log_path();
    let writer = RotatingFileWriter::new(
        &log_path,
        options.file_size.saturating_mul(BYTES_PER_MB),
        options.file_num,
    )?;
    let (non_blocking_file, guard) = non_blocking(writer);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| SubtitlerError::Logging(format!("Failed to initialize logging: {}", e)))?;

    info!(
        "init log_level:{}, save:true, file:{}, max {} MB x {} backups",
        level,
        log_path.display(),
        options.file_size,
        options.file_num
    );
    Ok(Some(guard))
}

/// Append-mode log file that rolls over once a write would bring it to
/// `max_bytes` or beyond. An empty active file never rolls over, so a single
/// oversized record is written instead of rotating forever.
///
/// Rolling shifts `name.log.N` to `name.log.N+1`, drops anything past
/// `max_files`, and moves the active file to `name.log.1`. With
/// `max_files == 0` or `max_bytes == 0` the file grows without bound.
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    pub fn new<P: AsRef<Path>>(path: P, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        self.max_bytes > 0
            && self.max_files > 0
            && self.written > 0
            && self.written + incoming as u64 >= self.max_bytes
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.backup_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len()) {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_level("warning").unwrap(), Level::WARN);
        assert!(matches!(parse_level("loud"), Err(SubtitlerError::Logging(_))));
    }

    #[test]
    fn test_log_path_appends_extension() {
        let options = LogOptions {
            filename: "logs/app".to_string(),
            ..LogOptions::default()
        };
        assert_eq!(options.log_path(), PathBuf::from("logs/app.log"));
    }

    #[test]
    fn test_rotating_writer_rolls_and_caps_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let mut writer = RotatingFileWriter::new(&path, 10, 2).unwrap();

        for line in ["aaaaaaaa\n", "bbbbbbbb\n", "cccccccc\n", "dddddddd\n"] {
            writer.write_all(line.as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "dddddddd\n");
        assert_eq!(fs::read_to_string(dir.path().join("run.log.1")).unwrap(), "cccccccc\n");
        assert_eq!(fs::read_to_string(dir.path().join("run.log.2")).unwrap(), "bbbbbbbb\n");
        assert!(!dir.path().join("run.log.3").exists());
    }

    #[test]
    fn test_rotating_writer_rolls_when_reaching_limit_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let mut writer = RotatingFileWriter::new(&path, 10, 1).unwrap();

        writer.write_all(b"12345").unwrap();
        writer.write_all(b"6789\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "6789\n");
        assert_eq!(fs::read_to_string(dir.path().join("run.log.1")).unwrap(), "12345");
    }

    #[test]
    fn test_rotating_writer_keeps_oversized_first_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let mut writer = RotatingFileWriter::new(&path, 4, 2).unwrap();

        writer.write_all(b"0123456789").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "0123456789");
        assert!(!dir.path().join("run.log.1").exists());
    }

    #[test]
    fn test_rotating_writer_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        fs::write(&path, "old\n").unwrap();

        let mut writer = RotatingFileWriter::new(&path, 1024, 3).unwrap();
        writer.write_all(b"new\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_rotating_writer_without_backups_never_rolls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let mut writer = RotatingFileWriter::new(&path, 4, 0).unwrap();

        writer.write_all(b"0123456789").unwrap();
        writer.write_all(b"0123456789").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), 20);
        assert!(!dir.path().join("run.log.1").exists());
    }
}
