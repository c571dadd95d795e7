use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Append-only file logger.
pub struct Logger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    pub fn new(log_file: &Path, level: LevelFilter) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_file)?;

        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A poisoned lock or a failed write must never take the scanner down.
        if let Ok(mut file) = self.file.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(
                file,
                "{} [{}] {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the global logger: a file logger when `log_file` is given, otherwise
/// `env_logger` honouring `RUST_LOG`. `debug` raises the default level.
pub fn init(log_file: Option<&Path>, debug: bool) -> anyhow::Result<()> {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };

    match log_file {
        Some(path) => {
            let logger = Logger::new(path, level)?;
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(level);
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
                .try_init()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log};
    use std::fs;

    #[test]
    fn test_file_logger_appends_lines() {
        let path = std::env::temp_dir().join(format!("pump-scanner-log-{}.log", std::process::id()));
        let logger = Logger::new(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .args(format_args!("scan started"))
                .level(Level::Info)
                .target("pump_scanner")
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("hidden"))
                .level(Level::Debug)
                .target("pump_scanner")
                .build(),
        );
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert!(contents.contains("[INFO] pump_scanner: scan started"));
        assert!(!contents.contains("hidden"));
    }
}
