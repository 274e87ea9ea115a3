use anyhow::{Context, Result};
use std::path::PathBuf;

use cellpack::dataset::Bundle;
use cellpack::expr::ExprValues;

/// Print the expression values of one gene, one line per sample
pub fn run(dir: PathBuf, symbol: String) -> Result<()> {
    let bundle = Bundle::open(&dir).context("Failed to read dataset descriptor")?;
    let record = bundle
        .gene(&symbol)
        .with_context(|| format!("Failed to read gene {}", symbol))?;

    println!("# {} ({} samples)", record.symbol, record.values.len());
    match &record.values {
        ExprValues::Int32(values) => {
            for value in values {
                println!("{}", value);
            }
        }
        ExprValues::Float32(values) => {
            for value in values {
                println!("{}", value);
            }
        }
    }
    Ok(())
}
