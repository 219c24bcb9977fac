mod config;
mod import;
mod logger;
mod output_folder;
mod stats;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::import::RawImport;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Copy photos and videos from dated phone folders into numbered Raw folders"
)]
pub struct RawImportArgs {
    /// Input directory containing the dated folders
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, required_unless_present = "completion")]
    input: Option<PathBuf>,

    /// Output directory for the RawNNN_YYYYMMDD folders
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, required_unless_present = "completion")]
    output: Option<PathBuf>,

    /// Maximum number of files per output folder [default: 500]
    #[arg(short, long, value_name = "COUNT")]
    capacity: Option<usize>,

    /// Only print actions without making filesystem changes
    #[arg(short = 'n', long)]
    dryrun: bool,

    /// Write a log file of the import
    #[arg(short = 'L', long)]
    log: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = RawImportArgs::parse();
    if let Some(shell) = args.completion {
        raw_import::generate_shell_completion(shell, RawImportArgs::command(), env!("CARGO_BIN_NAME"));
        Ok(())
    } else {
        RawImport::new(args)?.run()
    }
}
