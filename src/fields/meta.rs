//! Conversion of a whole metadata table into per-field binary files.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::info;

use super::category::ColorTable;
use super::codec::{encode_column, write_field, EncodedField, FieldOptions};
use super::types::{FieldSchema, FieldType};
use super::FieldError;
use crate::output;
use crate::table::Column;

/// Name of the schema sidecar written next to the field files
pub const FIELDS_JSON: &str = "fields.json";

/// Dataset-wide options for metadata encoding
#[derive(Debug, Clone, Default)]
pub struct MetaOptions {
    /// Field labels that are always categorical
    pub enum_fields: HashSet<String>,
    /// Optional value-to-color table
    pub colors: Option<ColorTable>,
    /// Per-field display options, keyed by field label
    pub field_opts: HashMap<String, serde_json::Value>,
}

impl MetaOptions {
    fn for_field(&self, label: &str) -> FieldOptions<'_> {
        FieldOptions {
            force_enum: self.enum_fields.contains(label),
            colors: self.colors.as_ref(),
            opt: self.field_opts.get(label).cloned(),
        }
    }
}

#[cfg(feature = "parallel")]
fn encode_all(columns: &[Column], options: &MetaOptions) -> Result<Vec<EncodedField>, FieldError> {
    use rayon::prelude::*;

    columns
        .par_iter()
        .map(|column| encode_column(column, &options.for_field(&column.name)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn encode_all(columns: &[Column], options: &MetaOptions) -> Result<Vec<EncodedField>, FieldError> {
    columns
        .iter()
        .map(|column| encode_column(column, &options.for_field(&column.name)))
        .collect()
}

fn check_unique_names(fields: &[EncodedField]) -> Result<(), FieldError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for field in fields {
        if let Some(first) = seen.insert(&field.schema.name, &field.schema.label) {
            return Err(FieldError::DuplicateFieldName {
                name: field.schema.name.clone(),
                first: first.to_string(),
                second: field.schema.label.clone(),
            });
        }
    }
    Ok(())
}

/// Encode every column, write one `<name>.bin` per field plus `fields.json`
/// into `out_dir`, and return the schemas in column order.
pub fn write_meta_fields<P: AsRef<Path>>(
    columns: &[Column],
    out_dir: P,
    options: &MetaOptions,
) -> Result<Vec<FieldSchema>, FieldError> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let fields = encode_all(columns, options)?;
    check_unique_names(&fields)?;

    let mut schemas = Vec::with_capacity(fields.len());
    for (index, field) in fields.into_iter().enumerate() {
        write_field(out_dir, &field)?;
        let schema = field.schema;
        info!("Meta data field index {}: '{}'", index, schema.label);
        match schema.field_type {
            FieldType::UniqueString => info!(
                "Type: uniqueString, {} different values, max size {}",
                schema.diff_val_count,
                schema.max_size.unwrap_or(0)
            ),
            other => info!(
                "Type: {:?}, {} different values, bin counts {:?}",
                other, schema.diff_val_count, schema.bin_counts
            ),
        }
        schemas.push(schema);
    }

    output::write_json(out_dir.join(FIELDS_JSON), &schemas, true)?;
    Ok(schemas)
}
