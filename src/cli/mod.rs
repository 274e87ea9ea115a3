use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod build;
mod config;
mod gene;
mod info;
mod row;

/// cellpack - single-cell dataset converter for web viewers
#[derive(Parser)]
#[command(name = "cellpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a dataset described by a TOML config into a bundle
    Build {
        /// Dataset config file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Directory receiving the bundle directory `<OUT>/<name>`
        #[arg(short, long, value_name = "OUT", default_value = ".")]
        out: PathBuf,

        /// Override the zlib level of the expression records (0-9)
        #[arg(short = 'c', long)]
        compression_level: Option<u32>,

        /// Override the number of genes compressed per batch
        #[arg(short = 'b', long)]
        batch_size: Option<usize>,
    },

    /// Print a summary of a built bundle
    Info {
        /// Bundle directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Decode the expression values of one gene
    Gene {
        /// Bundle directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Gene symbol
        #[arg(value_name = "SYMBOL")]
        symbol: String,
    },

    /// Print one metadata row, looked up through the row index
    Row {
        /// Bundle directory
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Zero-based sample number
        #[arg(value_name = "N")]
        row: usize,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            config,
            out,
            compression_level,
            batch_size,
        } => build::run(config, out, compression_level, batch_size),
        Commands::Info { dir } => info::run(dir),
        Commands::Gene { dir, symbol } => gene::run(dir, symbol),
        Commands::Row { dir, row } => row::run(dir, row),
    }
}
