//! Matching metadata rows to expression matrix columns.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use log::{info, warn};

use super::DatasetError;
use crate::output::AtomicFile;
use crate::table::Column;

const MAX_REPORTED_SAMPLES: usize = 10;

/// The samples kept in the bundle and where they come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOrder {
    /// Kept sample ids, in matrix column order
    pub samples: Vec<String>,
    /// Metadata row of every kept sample
    pub meta_rows: Vec<usize>,
    /// True if the matrix has samples without metadata
    pub matrix_was_filtered: bool,
    /// Metadata samples dropped because the matrix lacks them
    pub meta_only: usize,
    /// Matrix samples dropped because the metadata lacks them
    pub matrix_only: usize,
}

fn report_dropped(what: &str, dropped: &[&str]) {
    if dropped.is_empty() {
        return;
    }
    warn!(
        "{} samples are only in the {} and are removed; examples: {}",
        dropped.len(),
        what,
        dropped[..dropped.len().min(MAX_REPORTED_SAMPLES)].join(", ")
    );
}

/// Keep the matrix samples that have metadata, in matrix order.
///
/// Samples found in only one of the two inputs are dropped with one warning
/// per side. No shared sample at all is fatal.
pub fn reconcile_samples(matrix_samples: &[String], meta_samples: &[String]) -> Result<SampleOrder, DatasetError> {
    let meta_rows: HashMap<&str, usize> = meta_samples
        .iter()
        .enumerate()
        .map(|(row, id)| (id.as_str(), row))
        .collect();

    let mut samples = Vec::new();
    let mut rows = Vec::new();
    let mut matrix_only = Vec::new();
    for id in matrix_samples {
        match meta_rows.get(id.as_str()) {
            Some(&row) => {
                samples.push(id.clone());
                rows.push(row);
            }
            None => matrix_only.push(id.as_str()),
        }
    }

    if samples.is_empty() {
        return Err(DatasetError::NoSampleOverlap {
            meta_example: meta_samples.first().cloned().unwrap_or_default(),
            matrix_example: matrix_samples.first().cloned().unwrap_or_default(),
        });
    }

    let in_matrix: HashSet<&str> = matrix_samples.iter().map(String::as_str).collect();
    let meta_only: Vec<&str> = meta_samples
        .iter()
        .map(String::as_str)
        .filter(|id| !in_matrix.contains(id))
        .collect();

    report_dropped("meta data", &meta_only);
    report_dropped("expression matrix", &matrix_only);
    info!("{} samples are shared by the meta data and the matrix", samples.len());

    Ok(SampleOrder {
        samples,
        meta_rows: rows,
        matrix_was_filtered: !matrix_only.is_empty(),
        meta_only: meta_only.len(),
        matrix_only: matrix_only.len(),
    })
}

/// Reorder (and filter) the rows of every column to `rows`.
pub fn reorder_columns(columns: Vec<Column>, rows: &[usize]) -> Vec<Column> {
    columns
        .into_iter()
        .map(|column| {
            let values = rows.iter().map(|&row| column.values[row].clone()).collect();
            Column::new(column.name, values)
        })
        .collect()
}

fn clean_cell(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

/// Replace tabs and line breaks in labels and cells by spaces.
///
/// The metadata table and the uniqueString field files are both line based,
/// so every value must stay on one line.
pub fn clean_columns(columns: Vec<Column>) -> Vec<Column> {
    columns
        .into_iter()
        .map(|column| {
            let values = column.values.iter().map(|v| clean_cell(v)).collect();
            Column::new(clean_cell(&column.name), values)
        })
        .collect()
}

/// Write the columns back as a tab-separated table with a header line.
///
/// Tabs and line breaks inside cells are replaced by spaces so every row is
/// exactly one line, as the row index requires.
pub fn write_meta_table<P: AsRef<Path>>(columns: &[Column], path: P) -> Result<u64, DatasetError> {
    let mut file = AtomicFile::create(path.as_ref())?;
    let header: Vec<String> = columns.iter().map(|c| clean_cell(&c.name)).collect();
    writeln!(file, "{}", header.join("\t"))?;

    let rows = columns.first().map_or(0, Column::len);
    for row in 0..rows {
        let line: Vec<String> = columns.iter().map(|c| clean_cell(&c.values[row])).collect();
        writeln!(file, "{}", line.join("\t"))?;
    }
    Ok(file.commit()?)
}
