//! Configuration for the huffpress command line.
//!
//! Arguments are parsed with clap into [`Cli`], then resolved into a
//! [`Config`] with every default filled in, so a run can be printed and
//! reproduced exactly.
//!
//! # Defaults
//!
//! - `compress FILE` writes `FILE.huf`
//! - `decompress FILE` writes `FILE.decomp`
//! - `demo` picks a time-based seed unless `--seed` is given

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};

/// Extension appended to compressed files.
pub const COMPRESSED_EXT: &str = "huf";

/// Extension appended to decompressed files.
pub const DECOMPRESSED_EXT: &str = "decomp";

/// Default demo input size (64 KiB).
const DEFAULT_DEMO_BYTES: usize = 65536;

#[derive(Debug, Parser)]
#[command(
    name = "huffpress",
    version,
    about = "Huffman compressor with a self-describing tree header"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Don't print the metrics summary
    #[arg(long, global = true)]
    pub no_metrics: bool,

    /// Print the resolved configuration before running
    #[arg(long, global = true)]
    pub print_config: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compress a file
    Compress {
        /// File to compress
        input: PathBuf,
        /// Output path (default: INPUT.huf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decompress a .huf file
    Decompress {
        /// File to decompress
        input: PathBuf,
        /// Output path (default: INPUT.decomp)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Round-trip generated sample data in memory and report
    Demo {
        /// Random seed for determinism
        #[arg(long)]
        seed: Option<u64>,
        /// Sample size in bytes
        #[arg(long, default_value_t = DEFAULT_DEMO_BYTES)]
        size: usize,
    },
}

/// What a run does, with all paths and seeds resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Compress { input: PathBuf, output: PathBuf },
    Decompress { input: PathBuf, output: PathBuf },
    Demo { seed: u64, size_bytes: usize },
}

/// Complete configuration for a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    /// Log verbosity from -v flags
    pub verbosity: u8,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print detailed metrics summary
    pub print_metrics: bool,
}

impl Config {
    /// Resolve parsed arguments into a configuration.
    ///
    /// # Errors
    /// Returns a message if the output path equals the input path or the
    /// demo size is zero.
    pub fn from_cli(cli: Cli) -> Result<Self, String> {
        let mode = match cli.command {
            Command::Compress { input, output } => {
                let output = output.unwrap_or_else(|| with_suffix(&input, COMPRESSED_EXT));
                check_distinct(&input, &output)?;
                Mode::Compress { input, output }
            }
            Command::Decompress { input, output } => {
                let output = output.unwrap_or_else(|| with_suffix(&input, DECOMPRESSED_EXT));
                check_distinct(&input, &output)?;
                Mode::Decompress { input, output }
            }
            Command::Demo { seed, size } => {
                if size == 0 {
                    return Err("--size must be at least 1".to_string());
                }
                Mode::Demo {
                    seed: seed.unwrap_or_else(time_seed),
                    size_bytes: size,
                }
            }
        };

        Ok(Config {
            mode,
            verbosity: cli.verbose,
            print_config: cli.print_config,
            print_metrics: !cli.no_metrics,
        })
    }

    /// Parse and resolve in one step.
    pub fn from_args<I, T>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
        Self::from_cli(cli)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.mode {
            Mode::Compress { input, output } => {
                println!("Mode:   compress");
                println!("Input:  {}", input.display());
                println!("Output: {}", output.display());
            }
            Mode::Decompress { input, output } => {
                println!("Mode:   decompress");
                println!("Input:  {}", input.display());
                println!("Output: {}", output.display());
            }
            Mode::Demo { seed, size_bytes } => {
                println!("Mode: demo");
                println!("Seed: {}", seed);
                println!("Size: {} bytes ({} KiB)", size_bytes, size_bytes / 1024);
            }
        }
        println!("Verbosity: {}", self.verbosity);
        println!();
    }
}

/// `path` with `.ext` appended to the full file name (`a.txt` -> `a.txt.huf`).
fn with_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Rejects an output that is the input file, however the path is spelled.
fn check_distinct(input: &Path, output: &Path) -> Result<(), String> {
    let same_file = match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if input == output || same_file {
        return Err(format!(
            "output path {} is the same as the input",
            output.display()
        ));
    }
    Ok(())
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
