//! Per-cluster marker gene tables.
//!
//! A marker table (`cluster, gene, score, ...`) is split into one
//! `<cluster>.tsv` per cluster with the header `id, symbol, <score and
//! remaining columns>`. Scores are rounded to three decimals.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info};

use crate::expr::GeneMap;
use crate::output::AtomicFile;
use crate::table::{self, TableError};

/// Errors that can occur while splitting a marker table
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error opening or parsing the table
    #[error("Table error: {0}")]
    TableError(#[from] TableError),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A line has fewer than the three required columns
    #[error("{source_name}, line {line}: marker tables need at least 3 columns (cluster, gene, score), found {found}")]
    ColumnCount {
        /// File the markers were read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Number of columns found
        found: usize,
    },

    /// The score column is not a number
    #[error("{source_name}, line {line}: score '{value}' is not a number")]
    InvalidScore {
        /// File the markers were read from
        source_name: String,
        /// One-based line number
        line: u64,
        /// Offending cell
        value: String,
    },
}

/// Summary of a split marker table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerStats {
    /// Files written, one per cluster
    pub files_written: usize,
    /// Marker rows written
    pub rows_written: usize,
}

/// File name for a cluster: slashes would create directories.
pub fn cluster_file_name(cluster: &str) -> String {
    format!("{}.tsv", cluster.replace('/', "_"))
}

struct ClusterRows {
    file_name: String,
    lines: Vec<String>,
}

/// Split a marker table read from `reader` into `out_dir`.
pub fn split_markers_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    source_name: &str,
    gene_map: Option<&GeneMap>,
    out_dir: &Path,
) -> Result<MarkerStats, MarkerError> {
    let mut records = table::csv_reader(reader, delimiter).into_byte_records();
    let header = match records.next() {
        Some(header) => table::record_to_strings(&header?),
        None => {
            return Err(TableError::MissingHeader {
                source_name: source_name.to_string(),
            }
            .into())
        }
    };

    let mut out_header = vec!["id".to_string(), "symbol".to_string()];
    out_header.extend(header.into_iter().skip(2));

    let mut clusters: Vec<ClusterRows> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows_written = 0;

    for (i, record) in records.enumerate() {
        let line = i as u64 + 2;
        let row = table::record_to_strings(&record?);
        if row.len() < 3 {
            return Err(MarkerError::ColumnCount {
                source_name: source_name.to_string(),
                line,
                found: row.len(),
            });
        }
        let score: f64 = row[2].trim().parse().map_err(|_| MarkerError::InvalidScore {
            source_name: source_name.to_string(),
            line,
            value: row[2].clone(),
        })?;

        let gene_id = &row[1];
        let symbol = gene_map
            .and_then(|map| map.lookup(gene_id))
            .unwrap_or(gene_id.as_str());

        let mut fields = vec![gene_id.clone(), symbol.to_string(), format!("{:.3}", score)];
        fields.extend(row[3..].iter().cloned());

        let file_name = cluster_file_name(&row[0]);
        let position = *positions.entry(file_name.clone()).or_insert_with(|| {
            clusters.push(ClusterRows {
                file_name,
                lines: Vec::new(),
            });
            clusters.len() - 1
        });
        clusters[position].lines.push(fields.join("\t"));
        rows_written += 1;
    }

    std::fs::create_dir_all(out_dir)?;
    let header_line = out_header.join("\t");
    for cluster in &clusters {
        let path = out_dir.join(&cluster.file_name);
        debug!("Writing {}", path.display());
        let mut file = AtomicFile::create(&path)?;
        writeln!(file, "{}", header_line)?;
        for line in &cluster.lines {
            writeln!(file, "{}", line)?;
        }
        file.commit()?;
    }

    info!(
        "Wrote {} marker files into {}",
        clusters.len(),
        out_dir.display()
    );
    Ok(MarkerStats {
        files_written: clusters.len(),
        rows_written,
    })
}

/// Split the marker table at `path` into one file per cluster in `out_dir`.
pub fn split_marker_table<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    gene_map: Option<&GeneMap>,
    out_dir: Q,
) -> Result<MarkerStats, MarkerError> {
    let path = path.as_ref();
    info!(
        "Splitting cluster markers from {} into {}",
        path.display(),
        out_dir.as_ref().display()
    );
    split_markers_from_reader(
        table::open_text(path)?,
        table::delimiter_for(path),
        &path.display().to_string(),
        gene_map,
        out_dir.as_ref(),
    )
}
