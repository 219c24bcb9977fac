use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::RawImportArgs;

/// Default maximum number of files copied into one output folder.
pub const DEFAULT_CAPACITY: usize = 500;

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) capacity: usize,
    pub(crate) dryrun: bool,
    pub(crate) log: bool,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
struct RawImportConfig {
    #[serde(default)]
    capacity: Option<usize>,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    log: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    rawimport: RawImportConfig,
}

impl RawImportConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = raw_import::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.rawimport)
            .context("Failed to parse rawimport config TOML")
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// Input and output must both be existing directories.
    ///
    /// # Errors
    /// Returns an error if a path is invalid, the capacity is zero,
    /// or the config file cannot be read or parsed.
    pub fn from_args(args: RawImportArgs) -> anyhow::Result<Self> {
        let user_config = RawImportConfig::get_user_config()?;
        Self::from_parts(args, user_config)
    }

    fn from_parts(args: RawImportArgs, user_config: RawImportConfig) -> anyhow::Result<Self> {
        let input = raw_import::resolve_directory(
            args.input.as_deref().context("Input path is required")?,
            "Input path",
        )?;
        let output = raw_import::resolve_directory(
            args.output.as_deref().context("Output path is required")?,
            "Output path",
        )?;

        // args > config > default
        let capacity = args
            .capacity
            .or(user_config.capacity)
            .unwrap_or(DEFAULT_CAPACITY);
        if capacity == 0 {
            anyhow::bail!("Output folder capacity must be at least 1");
        }

        Ok(Self {
            input,
            output,
            capacity,
            dryrun: args.dryrun || user_config.dryrun,
            log: args.log || user_config.log,
            verbose: args.verbose || user_config.verbose,
        })
    }
}
