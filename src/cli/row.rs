use anyhow::{Context, Result};
use std::path::PathBuf;

use cellpack::dataset::Bundle;

/// Print metadata row `row` as `column: value` pairs
pub fn run(dir: PathBuf, row: usize) -> Result<()> {
    let bundle = Bundle::open(&dir).context("Failed to read dataset descriptor")?;
    let line = bundle
        .meta_row(row)
        .with_context(|| format!("Failed to read meta data row {}", row))?;

    let labels = bundle.descriptor().meta_fields.iter().map(|f| f.label.as_str());
    for (label, value) in labels.zip(line.split('\t')) {
        println!("{}: {}", label, value);
    }
    Ok(())
}
