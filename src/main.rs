//! # cellpack
//!
//! Command-line front end of the `cellpack` library.
//!
//! ## Usage
//!
//! ```bash
//! # Build a bundle into out/<name>
//! cellpack -v build cellpack.toml --out out
//!
//! # Inspect it
//! cellpack info out/pbmc3k
//! cellpack gene out/pbmc3k CD3E
//! cellpack row out/pbmc3k 0
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity
    cli::init_logging(cli.verbosity());

    cli::dispatch(cli)
}
