use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use cellpack::dataset::build_dataset;

use super::config::Config;

/// Build the bundle described by a TOML config
pub fn run(
    config_path: PathBuf,
    out: PathBuf,
    compression_level: Option<u32>,
    batch_size: Option<usize>,
) -> Result<()> {
    if !config_path.exists() {
        anyhow::bail!("Config file does not exist: {}", config_path.display());
    }

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut config = Config::from_file(&config_path)?.into_dataset_config(base_dir);
    if let Some(level) = compression_level {
        config.expression.compression_level = level;
    }
    if let Some(size) = batch_size {
        config.expression.batch_size = size;
    }

    let out_dir = out.join(&config.name);

    info!("cellpack - dataset to web bundle");
    info!("================================");
    info!("Config: {}", config_path.display());
    info!("Output: {}", out_dir.display());
    info!("Compression level: {}", config.expression.compression_level);
    info!("Batch size: {}", config.expression.batch_size);
    if cfg!(feature = "parallel") {
        info!("Parallel encoding: enabled");
    }

    let stats = build_dataset(config, &out_dir)
        .with_context(|| format!("Failed to build dataset from {}", config_path.display()))?;

    println!("{}", stats);
    println!("Bundle written to {}", out_dir.display());
    Ok(())
}
