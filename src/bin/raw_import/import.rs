use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use filetime::FileTime;
use walkdir::{DirEntry, WalkDir};

use raw_import::print_warning;

use crate::RawImportArgs;
use crate::config::Config;
use crate::logger::FileLogger;
use crate::output_folder::{OutputFolder, OutputFolderAllocator};
use crate::stats::{ImportStats, SkipReason};

/// Copies files from dated source folders into numbered output folders.
pub struct RawImport {
    config: Config,
    logger: Option<FileLogger>,
}

/// Mutable state for one import run.
#[derive(Debug)]
struct ImportState {
    /// The active output folder receiving files.
    folder: OutputFolder,
    /// Number of files copied into the active folder.
    files_in_folder: usize,
    stats: ImportStats,
}

impl ImportState {
    fn new(folder: OutputFolder) -> Self {
        Self {
            folder,
            files_in_folder: 0,
            stats: ImportStats {
                folders_used: 1,
                ..ImportStats::default()
            },
        }
    }

    /// Close the active folder and continue in the given one.
    fn rotate(&mut self, folder: OutputFolder) {
        self.folder = folder;
        self.files_in_folder = 0;
        self.stats.folders_used += 1;
    }
}

impl RawImport {
    pub fn new(args: RawImportArgs) -> Result<Self> {
        let config = Config::from_args(args)?;
        if config.verbose {
            eprintln!("Config: {config:#?}");
        }
        let logger = if config.log { Some(FileLogger::new()?) } else { None };
        Ok(Self { config, logger })
    }

    pub fn run(&mut self) -> Result<()> {
        println!("dryrun: {}", raw_import::colorize_bool(self.config.dryrun));
        println!(
            "{}",
            format!(
                "Importing photos/videos from [{}] to [{}]...",
                self.config.input.display(),
                self.config.output.display()
            )
            .bold()
        );
        if let Some(logger) = self.logger.as_mut() {
            println!("Log file: {}", logger.path().display());
            logger.log_init(&self.config);
        }

        let start = Instant::now();
        match self.import_files() {
            Ok(stats) => {
                let duration = start.elapsed();
                stats.print_summary(duration, self.config.dryrun);
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_stats(&stats, duration);
                }
                Ok(())
            }
            Err(error) => {
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_failure(&error);
                }
                Err(error)
            }
        }
    }

    /// Import all files from the input root.
    ///
    /// Returns the run statistics, including the total number of files copied.
    /// Any filesystem error aborts the whole run.
    fn import_files(&mut self) -> Result<ImportStats> {
        let mut allocator = OutputFolderAllocator::new(self.config.output.clone(), self.config.dryrun);
        let mut state = ImportState::new(self.next_folder(&mut allocator)?);

        for entry in list_entries(&self.config.input)? {
            let file_type = entry.file_type();
            if file_type.is_dir() {
                self.import_folder(entry.path(), &mut state, &mut allocator)?;
            } else if file_type.is_symlink() {
                self.skip(entry.path(), SkipReason::Symlink, &mut state);
            } else {
                self.skip(entry.path(), SkipReason::StrayFile, &mut state);
            }
        }

        Ok(state.stats)
    }

    /// Copy the files of one dated source folder.
    fn import_folder(
        &mut self,
        folder: &Path,
        state: &mut ImportState,
        allocator: &mut OutputFolderAllocator,
    ) -> Result<()> {
        let folder_name = folder
            .file_name()
            .with_context(|| format!("Failed to get folder name for {}", folder.display()))?;

        println!("Processing input folder: {}", folder.display());
        state.stats.source_folders += 1;

        for entry in list_entries(folder)? {
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                self.skip(entry.path(), SkipReason::Symlink, state);
            } else if file_type.is_dir() {
                self.skip(entry.path(), SkipReason::NestedDirectory, state);
            } else if file_type.is_file() {
                self.copy_file(entry.path(), folder_name, state)?;
            } else {
                self.skip(entry.path(), SkipReason::SpecialFile, state);
            }

            if state.files_in_folder >= self.config.capacity {
                let next = self.next_folder(allocator)?;
                state.rotate(next);
            }
        }

        Ok(())
    }

    fn copy_file(&mut self, source: &Path, folder_name: &OsStr, state: &mut ImportState) -> Result<()> {
        let file_name = source
            .file_name()
            .with_context(|| format!("Failed to get file name for {}", source.display()))?;
        let destination = state.folder.path.join(destination_file_name(folder_name, file_name));

        let size = if self.config.dryrun {
            println!(
                "{} copy {} -> {}",
                "Dryrun:".cyan().bold(),
                source.display(),
                destination.display()
            );
            fs::metadata(source)
                .with_context(|| format!("Failed to read metadata for {}", source.display()))?
                .len()
        } else {
            if self.config.verbose {
                println!("{} -> {}", source.display(), destination.display());
            }
            copy_with_metadata(source, &destination)?
        };

        if let Some(logger) = self.logger.as_mut() {
            logger.log_copy(source, &destination);
        }
        state.files_in_folder += 1;
        state.stats.add_copied(size);
        Ok(())
    }

    fn next_folder(&mut self, allocator: &mut OutputFolderAllocator) -> Result<OutputFolder> {
        let folder = allocator.allocate_next_folder()?;
        if self.config.dryrun {
            println!("{} create folder {}", "Dryrun:".cyan().bold(), folder);
        }
        println!("{}", format!("Current output folder: [{folder}]").green().bold());
        if let Some(logger) = self.logger.as_mut() {
            logger.log_folder(&folder);
        }
        Ok(folder)
    }

    fn skip(&mut self, path: &Path, reason: SkipReason, state: &mut ImportState) {
        print_warning!("Skipping {reason}: {}", path.display());
        if let Some(logger) = self.logger.as_mut() {
            logger.log_skip(path, reason);
        }
        state.stats.add_skipped(reason);
    }
}

/// Name for a copied file: the source folder name and the original file name joined with an underscore.
///
/// Files with the same name in different dated folders end up with distinct names.
#[must_use]
pub fn destination_file_name(folder_name: &OsStr, file_name: &OsStr) -> OsString {
    let mut name = OsString::with_capacity(folder_name.len() + file_name.len() + 1);
    name.push(folder_name);
    name.push("_");
    name.push(file_name);
    name
}

/// Copy file contents and permissions, then the access and modification times.
/// An existing destination file is overwritten.
///
/// Returns the number of bytes copied.
pub fn copy_with_metadata(source: &Path, destination: &Path) -> Result<u64> {
    let metadata =
        fs::metadata(source).with_context(|| format!("Failed to read metadata for {}", source.display()))?;

    let bytes = fs::copy(source, destination)
        .with_context(|| format!("Failed to copy {} to {}", source.display(), destination.display()))?;

    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(destination, accessed, modified)
        .with_context(|| format!("Failed to set file times for {}", destination.display()))?;

    Ok(bytes)
}

/// Immediate children of a directory in file name order. Symlinks are not followed.
fn list_entries(path: &Path) -> Result<Vec<DirEntry>> {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.with_context(|| format!("Failed to read directory {}", path.display())))
        .collect()
}
