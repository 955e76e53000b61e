//! raid6 - generalized RAID-6 style erasure-coded object store
//!
//! ```text
//! raid6 store <path> [--name NAME]
//! raid6 read <name> <dst-path>
//! raid6 recover
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use raid6::ec::encoding::{checksum_matrix, checksum_matrix_classic};
use raid6::ec::{Catalog, Store};
use raid6::error::Result;

// =============================================================================
// CLI Arguments
// =============================================================================

/// A generalized RAID-6 style erasure-coded object store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Number of data shards
    #[arg(long = "data", short = 'd', env = "RAID_DATA_SHARDS", default_value = "6", global = true)]
    data_shards: usize,

    /// Number of parity shards
    #[arg(long = "parity", short = 'c', env = "RAID_PARITY_SHARDS", default_value = "2", global = true)]
    parity_shards: usize,

    /// Use the classic Linux RAID-6 (6, 2) matrix instead of building one
    /// from `--data`/`--parity`. Fails unless they are 6 and 2.
    #[arg(long, env = "RAID_CLASSIC", global = true)]
    classic: bool,

    /// Shard directory
    #[arg(long, env = "RAID_DIR", default_value = "./data", global = true)]
    dir: PathBuf,

    /// Catalog file path
    #[arg(long = "raid", env = "RAID_CATALOG", default_value = "./raid.json", global = true)]
    catalog: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RAID_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "RAID_LOG_JSON", global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a file and append its shards to the store
    Store {
        /// Path to the file to store
        path: PathBuf,
        /// Name to register the file under in the catalog; defaults to
        /// the input path's file name
        #[arg(long)]
        name: Option<String>,
    },
    /// Decode a previously stored file back to disk
    Read {
        /// Name the file was stored under
        name: String,
        /// Where to write the decoded file
        dst: PathBuf,
    },
    /// Rebuild any missing shards from the survivors
    Recover,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_json);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let matrix = if args.classic {
        if args.data_shards != 6 || args.parity_shards != 2 {
            return Err(raid6::Error::NotClassicShape {
                data: args.data_shards as u32,
                parity: args.parity_shards as u32,
            });
        }
        checksum_matrix_classic()?
    } else {
        checksum_matrix(args.data_shards, args.parity_shards)?
    };

    let store = Store::new(matrix, args.dir.clone());

    match &args.command {
        Command::Store { path, name } => {
            let mut catalog = Catalog::load(&args.catalog)?;
            let name = name.clone().unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            });
            store.store(&mut catalog, &args.catalog, &name, path)
        }
        Command::Read { name, dst } => {
            let catalog = Catalog::load(&args.catalog)?;
            store.read(&catalog, name, dst)
        }
        Command::Recover => store.recover(),
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(log_level: &str, log_json: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
