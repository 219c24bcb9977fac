use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;

/// Matches output folder names like `Raw012_20230505`.
static RE_OUTPUT_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Raw(?P<sequence>\d{3})_(?P<date>\d{8})$").expect("Failed to create regex pattern for output folder")
});

/// Highest sequence number that fits the three digit folder name format.
pub const MAX_SEQUENCE: u16 = 999;

const FOLDER_PREFIX: &str = "Raw";

/// A numbered output folder inside the destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFolder {
    pub(crate) path: PathBuf,
    pub(crate) name: String,
    pub(crate) sequence: u16,
}

/// Hands out new output folders in the destination root.
///
/// The destination root listing is the only index:
/// the next sequence number is re-derived from the existing folder names on every call.
#[derive(Debug)]
pub struct OutputFolderAllocator {
    root: PathBuf,
    dryrun: bool,
    /// Last sequence number handed out during this run.
    /// Keeps dryrun numbering identical to a real run since no folders get created.
    last_allocated: u16,
}

impl OutputFolder {
    fn new(root: &Path, sequence: u16, date: NaiveDate) -> Self {
        let name = folder_name(sequence, date);
        let path = root.join(&name);
        Self { path, name, sequence }
    }
}

impl fmt::Display for OutputFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl OutputFolderAllocator {
    pub const fn new(root: PathBuf, dryrun: bool) -> Self {
        Self {
            root,
            dryrun,
            last_allocated: 0,
        }
    }

    /// Create the next output folder stamped with the current local date.
    pub fn allocate_next_folder(&mut self) -> Result<OutputFolder> {
        self.allocate_next_folder_on(Local::now().date_naive())
    }

    /// Create the next output folder stamped with the given date.
    ///
    /// The folder must not exist yet: an existing folder with the same name
    /// means something else is writing to the destination root.
    pub fn allocate_next_folder_on(&mut self, date: NaiveDate) -> Result<OutputFolder> {
        let highest = highest_sequence_number(&self.root)?.max(self.last_allocated);
        if highest >= MAX_SEQUENCE {
            anyhow::bail!(
                "No output folder numbers left: {} already contains {FOLDER_PREFIX}{MAX_SEQUENCE}",
                self.root.display()
            );
        }

        let folder = OutputFolder::new(&self.root, highest + 1, date);
        if self.dryrun {
            if folder.path.exists() {
                anyhow::bail!("Output folder already exists: {}", folder.path.display());
            }
        } else {
            fs::create_dir(&folder.path)
                .with_context(|| format!("Failed to create output folder {}", folder.path.display()))?;
        }

        self.last_allocated = folder.sequence;
        Ok(folder)
    }
}

/// Format an output folder name from sequence number and date.
///
/// `folder_name(7, 2023-01-05)` gives `Raw007_20230105`.
#[must_use]
pub fn folder_name(sequence: u16, date: NaiveDate) -> String {
    format!("{FOLDER_PREFIX}{sequence:03}_{}", date.format("%Y%m%d"))
}

/// Get the sequence number from an output folder name.
/// Returns `None` for names that do not follow the `RawNNN_YYYYMMDD` format.
#[must_use]
pub fn parse_sequence_number(name: &str) -> Option<u16> {
    RE_OUTPUT_FOLDER
        .captures(name)
        .and_then(|captures| captures.name("sequence"))
        .and_then(|sequence| sequence.as_str().parse().ok())
}

/// Find the highest sequence number among the entries of the destination root.
/// Returns zero when there are no matching entries.
pub fn highest_sequence_number(root: &Path) -> Result<u16> {
    let mut highest = 0;
    for entry in fs::read_dir(root).with_context(|| format!("Failed to read directory {}", root.display()))? {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", root.display()))?;
        if let Some(sequence) = entry.file_name().to_str().and_then(parse_sequence_number) {
            highest = highest.max(sequence);
        }
    }
    Ok(highest)
}
