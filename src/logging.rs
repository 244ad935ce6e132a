//! File sink for the `log` facade. The terminal is in raw mode while playing, so log
//! lines only ever go to a file.

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("logger already installed")]
    AlreadySet(#[from] log::SetLoggerError),
}

struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let _ = writeln!(file, "{}", format_line(record));
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// `<unix ms> LEVEL target: message`
fn format_line(record: &Record) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    format!(
        "{millis} {:<5} {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Appends log output at `level` and above to `path`.
pub fn init(path: &Path, level: LevelFilter) -> Result<(), LogError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    log::set_boxed_logger(Box::new(FileLogger {
        level,
        file: Mutex::new(file),
    }))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn line_has_level_target_and_message() {
        let line = format_line(
            &Record::builder()
                .level(Level::Debug)
                .target("fruitris::cascade")
                .args(format_args!("cleared {} fruits", 3))
                .build(),
        );
        assert!(line.ends_with("DEBUG fruitris::cascade: cleared 3 fruits"), "{line}");
    }

    #[test]
    fn filters_below_level() {
        let dir = std::env::temp_dir().join(format!("fruitris-log-{}", std::process::id()));
        let logger = FileLogger {
            level: LevelFilter::Info,
            file: Mutex::new(File::create(&dir).unwrap()),
        };
        assert!(logger.enabled(&Metadata::builder().level(Level::Warn).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
        let _ = std::fs::remove_file(dir);
    }

    #[test]
    fn open_error_names_path() {
        let err = init(Path::new("/nonexistent-dir/fruitris.log"), LevelFilter::Info).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/fruitris.log"));
    }
}
