pub mod config;

pub use config::config_path;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::{ColoredString, Colorize};

/// Format bool value as a coloured string.
#[must_use]
pub fn colorize_bool(value: bool) -> ColoredString {
    if value { "true".green() } else { "false".red() }
}

/// Resolves the given path to an existing directory and returns it as an absolute path.
///
/// `name` describes the path in error messages, for example "Input path".
///
/// ```rust
/// use std::path::Path;
/// use raw_import::resolve_directory;
///
/// let absolute_path = resolve_directory(Path::new("src"), "Input path").unwrap();
/// assert!(absolute_path.is_absolute());
///
/// assert!(resolve_directory(Path::new("Cargo.toml"), "Input path").is_err());
/// ```
pub fn resolve_directory(path: &Path, name: &str) -> Result<PathBuf> {
    if path_to_string(path).trim().is_empty() {
        anyhow::bail!("{name} is empty");
    }
    if !path.exists() {
        anyhow::bail!("{name} does not exist or is not accessible: '{}'", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("{name} is not a directory: '{}'", path.display());
    }

    let absolute_path =
        dunce::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))?;

    // Canonicalize fails for network drives on Windows :(
    if path_to_string(&absolute_path).starts_with(r"\\?") && !path_to_string(path).starts_with(r"\\?") {
        Ok(path.to_path_buf())
    } else {
        Ok(absolute_path)
    }
}

/// Convert given path to string with invalid Unicode handling.
pub fn path_to_string(path: &Path) -> String {
    path.to_str().map_or_else(
        || path.to_string_lossy().to_string().replace('\u{FFFD}', ""),
        std::string::ToString::to_string,
    )
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

/// Format bytes as human-readable size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    }
}

/// Format duration as a human-readable string
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

/// Print a shell completion script for the given shell to stdout.
pub fn generate_shell_completion(shell: Shell, mut command: Command, command_name: &str) {
    clap_complete::generate(shell, &mut command, command_name, &mut std::io::stdout());
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    use std::fs::File;

    use tempfile::tempdir;

    #[test]
    fn resolve_directory_returns_absolute_path() {
        let dir = tempdir().unwrap();
        let resolved = resolve_directory(dir.path(), "Input path").unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn resolve_directory_nonexistent() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let error = resolve_directory(&missing, "Output path").unwrap_err();
        assert!(error.to_string().starts_with("Output path does not exist"));
    }

    #[test]
    fn resolve_directory_rejects_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("file.txt");
        File::create(&file_path).unwrap();
        let error = resolve_directory(&file_path, "Input path").unwrap_err();
        assert!(error.to_string().contains("is not a directory"));
    }

    #[test]
    fn resolve_directory_rejects_empty() {
        let path = Path::new("  \n");
        assert!(resolve_directory(path, "Input path").is_err());
    }

    #[test]
    fn resolve_directory_keeps_surrounding_whitespace() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();
        let spaced = dir.path().join("photos ");
        std::fs::create_dir(&spaced).unwrap();

        let resolved = resolve_directory(&spaced, "Input path").unwrap();
        assert_eq!(resolved, dunce::canonicalize(&spaced).unwrap());
        assert_eq!(resolved.file_name().unwrap(), "photos ");
    }

    #[test]
    fn resolve_directory_rejects_trimmed_sibling_only() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();

        let error = resolve_directory(&dir.path().join("photos "), "Input path").unwrap_err();
        assert!(error.to_string().starts_with("Input path does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_directory_accepts_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();
        let non_utf8 = dir.path().join(OsStr::from_bytes(b"ph\xffotos"));
        if std::fs::create_dir(&non_utf8).is_err() {
            // Filesystem does not allow non UTF-8 names
            return;
        }

        let resolved = resolve_directory(&non_utf8, "Input path").unwrap();
        assert_eq!(resolved.file_name().unwrap().as_bytes(), b"ph\xffotos");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "0.50 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 02m 05s");
    }
}
