use anyhow::{Context, Result};
use std::path::PathBuf;

use cellpack::dataset::Bundle;

/// Display information about a built bundle
pub fn run(dir: PathBuf) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("Bundle directory does not exist: {}", dir.display());
    }

    let bundle = Bundle::open(&dir).context("Failed to read dataset descriptor")?;
    let descriptor = bundle.descriptor();

    println!("cellpack Bundle Information");
    println!("===========================");
    println!("Directory: {}", dir.display());
    println!("Name: {} ({})", descriptor.name, descriptor.short_label);
    println!("Created: {} by {}", descriptor.created, descriptor.converter);
    if !descriptor.tags.is_empty() {
        println!("Tags: {}", descriptor.tags.join(", "));
    }
    println!();

    println!("Samples: {}", descriptor.sample_count);
    println!("Expression values: {}", descriptor.matrix_arr_type);
    if descriptor.matrix_was_filtered {
        println!("  (matrix samples without meta data were removed)");
    }
    let genes = bundle
        .expression_reader()
        .context("Failed to open expression index")?
        .index()
        .len();
    println!("Genes: {}", genes);
    println!();

    println!("Meta Data Fields:");
    for field in &descriptor.meta_fields {
        println!(
            "  {:<24} {:?}, {} values",
            field.label, field.field_type, field.diff_val_count
        );
    }
    println!();

    if !descriptor.coords.is_empty() {
        println!("Layouts:");
        for coords in &descriptor.coords {
            println!(
                "  {:<24} {:?}, x {}..{}, y {}..{}",
                coords.short_label,
                coords.stats.encoding,
                coords.stats.min_x,
                coords.stats.max_x,
                coords.stats.min_y,
                coords.stats.max_y
            );
        }
        println!();
    }

    if !descriptor.markers.is_empty() {
        println!("Marker Tables:");
        for markers in &descriptor.markers {
            println!("  {} ({})", markers.short_label, markers.name);
        }
        println!();
    }

    if let Some(label_field) = &descriptor.label_field {
        println!("Label field: {}", label_field);
    }
    if !descriptor.quick_genes.is_empty() {
        println!("Quick genes: {}", descriptor.quick_genes.len());
    }
    if !descriptor.acronyms.is_empty() {
        println!("Acronyms: {}", descriptor.acronyms.len());
    }

    Ok(())
}
