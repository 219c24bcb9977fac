use std::fmt;
use std::time::Duration;

use colored::Colorize;

/// Why a source entry was not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory inside a dated folder.
    NestedDirectory,
    /// Symlink at either level of the source tree.
    Symlink,
    /// File directly under the source root.
    StrayFile,
    /// Fifo, socket, device or anything else that is not a regular file.
    SpecialFile,
}

/// Statistics for the import run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub(crate) files_copied: usize,
    pub(crate) bytes_copied: u64,
    pub(crate) folders_used: usize,
    pub(crate) source_folders: usize,
    pub(crate) skipped_directories: usize,
    pub(crate) skipped_symlinks: usize,
    pub(crate) skipped_stray_files: usize,
    pub(crate) skipped_special_files: usize,
}

impl SkipReason {
    pub(crate) const fn description(self) -> &'static str {
        match self {
            Self::NestedDirectory => "unexpected child folder",
            Self::Symlink => "unexpected symlink",
            Self::StrayFile => "unexpected file not in a folder",
            Self::SpecialFile => "not a regular file",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl ImportStats {
    pub(crate) const fn add_copied(&mut self, size: u64) {
        self.files_copied += 1;
        self.bytes_copied += size;
    }

    pub(crate) const fn add_skipped(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NestedDirectory => self.skipped_directories += 1,
            SkipReason::Symlink => self.skipped_symlinks += 1,
            SkipReason::StrayFile => self.skipped_stray_files += 1,
            SkipReason::SpecialFile => self.skipped_special_files += 1,
        }
    }

    pub(crate) const fn total_skipped(&self) -> usize {
        self.skipped_directories + self.skipped_symlinks + self.skipped_stray_files + self.skipped_special_files
    }

    pub(crate) fn print_summary(&self, duration: Duration, dryrun: bool) {
        let heading = if dryrun {
            "\n--- Import Summary (dryrun) ---"
        } else {
            "\n--- Import Summary ---"
        };
        println!("{}", heading.bold().magenta());
        println!("Files copied:           {}", self.files_copied.to_string().green());
        println!("Data copied:            {}", raw_import::format_size(self.bytes_copied));
        println!("Source folders:         {}", self.source_folders);
        println!("Output folders:         {}", self.folders_used);
        println!(
            "Entries skipped:        {}",
            if self.total_skipped() > 0 {
                self.total_skipped().to_string().yellow()
            } else {
                "0".normal()
            }
        );
        if self.total_skipped() > 0 {
            println!("  - Child folders:      {}", self.skipped_directories);
            println!("  - Symlinks:           {}", self.skipped_symlinks);
            println!("  - Stray files:        {}", self.skipped_stray_files);
            println!("  - Special files:      {}", self.skipped_special_files);
        }
        println!("Total time:             {}", raw_import::format_duration(duration));
    }
}
