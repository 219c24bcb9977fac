use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Config;
use crate::output_folder::OutputFolder;
use crate::stats::{ImportStats, SkipReason};

/// Simple file logger for import operations with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/raw-import/import_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let log_dir = raw_import::config::log_dir().context("Failed to get home directory")?;
        Self::in_directory(&log_dir)
    }

    /// Create a new timestamped log file in the given directory.
    pub(crate) fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let path = log_dir.join(format!("import_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the import
    pub(crate) fn log_init(&mut self, config: &Config) {
        let _ = writeln!(
            self.writer,
            "[{}] INIT \"{}\" -> \"{}\"",
            Self::timestamp(),
            config.input.display(),
            config.output.display()
        );
        let _ = writeln!(self.writer, "  capacity: {}", config.capacity);
        let _ = writeln!(self.writer, "  dryrun: {}", config.dryrun);
        let _ = writeln!(self.writer, "  verbose: {}", config.verbose);
        let _ = self.writer.flush();
    }

    /// Log a new active output folder
    pub(crate) fn log_folder(&mut self, folder: &OutputFolder) {
        let _ = writeln!(
            self.writer,
            "[{}] FOLDER  {} \"{}\"",
            Self::timestamp(),
            folder.name,
            folder.path.display()
        );
        let _ = self.writer.flush();
    }

    /// Log a copied file
    pub(crate) fn log_copy(&mut self, source: &Path, destination: &Path) {
        let _ = writeln!(
            self.writer,
            "[{}] COPY    \"{}\" -> \"{}\"",
            Self::timestamp(),
            source.display(),
            destination.display()
        );
    }

    /// Log a skipped source entry
    pub(crate) fn log_skip(&mut self, path: &Path, reason: SkipReason) {
        let _ = writeln!(
            self.writer,
            "[{}] SKIP    \"{}\" | {reason}",
            Self::timestamp(),
            path.display()
        );
    }

    /// Log a fatal error that aborted the import
    pub(crate) fn log_failure(&mut self, error: &anyhow::Error) {
        let _ = writeln!(self.writer, "[{}] ERROR   {error:#}", Self::timestamp());
        let _ = self.writer.flush();
    }

    /// Log final statistics
    pub(crate) fn log_stats(&mut self, stats: &ImportStats, duration: Duration) {
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Files copied:    {}", stats.files_copied);
        let _ = writeln!(
            self.writer,
            "  Data copied:     {}",
            raw_import::format_size(stats.bytes_copied)
        );
        let _ = writeln!(self.writer, "  Output folders:  {}", stats.folders_used);
        let _ = writeln!(self.writer, "  Entries skipped: {}", stats.total_skipped());
        let _ = writeln!(
            self.writer,
            "  Total time: {}",
            raw_import::format_duration(duration)
        );
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use crate::output_folder::OutputFolderAllocator;

    #[test]
    fn writes_log_lines_to_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let log_dir = temp_dir.path().join("logs");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        let folder = OutputFolderAllocator::new(temp_dir.path().to_path_buf(), true)
            .allocate_next_folder_on(date)
            .expect("allocation should succeed");

        let mut logger = FileLogger::in_directory(&log_dir).expect("logger should be created");
        let log_path = logger.path().to_path_buf();
        logger.log_folder(&folder);
        logger.log_copy(Path::new("/in/202110__/IMG_1.HEIC"), Path::new("/out/Raw001/202110___IMG_1.HEIC"));
        logger.log_skip(Path::new("/in/stray.txt"), SkipReason::StrayFile);
        let mut stats = ImportStats::default();
        stats.add_copied(10);
        logger.log_stats(&stats, Duration::from_secs(1));
        drop(logger);

        assert!(log_path.starts_with(&log_dir));
        let content = fs::read_to_string(&log_path).expect("Failed to read log file");
        assert!(content.contains("FOLDER"));
        assert!(content.contains("Raw001_20240309"));
        assert!(content.contains("202110___IMG_1.HEIC"));
        assert!(content.contains("unexpected file not in a folder"));
        assert!(content.contains("Files copied:    1"));
        assert!(content.trim_end().ends_with("END"));
    }
}
