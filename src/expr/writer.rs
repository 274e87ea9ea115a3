//! Batched, ordered writing of the record stream and its index.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::gene_map::GeneMap;
use super::index::{ExpressionIndex, IndexEntry};
use super::matrix::{detect_file_matrix_type, MatrixReader, MatrixType, DEFAULT_DETECT_ROWS};
use super::record::{encode_record, DEFAULT_COMPRESSION_LEVEL};
use super::ExprError;
use crate::output::{self, AtomicFile};

/// Default number of genes compressed per batch
pub const DEFAULT_BATCH_SIZE: usize = 256;

const PROGRESS_INTERVAL: usize = 1000;
const MAX_REPORTED_IDS: usize = 10;

/// Options for expression matrix conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ExprOptions {
    /// Genes compressed together before their bytes are written
    pub batch_size: usize,
    /// zlib level, 0-9
    pub compression_level: u32,
    /// Leading rows inspected to detect the matrix type
    pub detect_rows: usize,
    /// Force a matrix type instead of detecting it
    pub matrix_type: Option<MatrixType>,
}

impl Default for ExprOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            detect_rows: DEFAULT_DETECT_ROWS,
            matrix_type: None,
        }
    }
}

/// Statistics from an expression matrix conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStats {
    /// Matrix rows read
    pub genes_read: usize,
    /// Records written
    pub genes_written: usize,
    /// Rows skipped because their identifier has no symbol
    pub unmapped: usize,
    /// Rows skipped because their symbol was already written
    pub duplicates: usize,
    /// Values per record
    pub sample_count: usize,
    /// Value type of the records
    pub matrix_type: MatrixType,
    /// Size of the record stream
    pub bytes_written: u64,
}

impl fmt::Display for ExprStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expression: {} of {} genes written ({} unmapped, {} duplicates), {} samples, {}, {} bytes",
            self.genes_written,
            self.genes_read,
            self.unmapped,
            self.duplicates,
            self.sample_count,
            self.matrix_type,
            self.bytes_written
        )
    }
}

/// Writes compressed gene records and collects their index.
///
/// Records are compressed in batches (concurrently with the `parallel`
/// feature) but always appended in the order they were pushed, so offsets in
/// the index follow input order.
pub struct ExpressionMatrixWriter {
    file: AtomicFile,
    index: ExpressionIndex,
    seen: HashSet<String>,
    batch: Vec<(String, Vec<f64>)>,
    batch_size: usize,
    matrix_type: MatrixType,
    level: u32,
}

impl ExpressionMatrixWriter {
    /// Create the record stream at `path`.
    pub fn create<P: AsRef<Path>>(
        path: P,
        matrix_type: MatrixType,
        options: &ExprOptions,
    ) -> Result<Self, ExprError> {
        Ok(Self {
            file: AtomicFile::create(path)?,
            index: ExpressionIndex::new(),
            seen: HashSet::new(),
            batch: Vec::with_capacity(options.batch_size.max(1)),
            batch_size: options.batch_size.max(1),
            matrix_type,
            level: options.compression_level.min(9),
        })
    }

    /// Queue one gene. Returns `false` if the symbol was already queued.
    pub fn push(&mut self, symbol: &str, values: Vec<f64>) -> Result<bool, ExprError> {
        if !self.seen.insert(symbol.to_string()) {
            return Ok(false);
        }
        self.batch.push((symbol.to_string(), values));
        if self.batch.len() >= self.batch_size {
            self.flush_batch()?;
        }
        Ok(true)
    }

    /// Number of genes queued so far
    pub fn gene_count(&self) -> usize {
        self.seen.len()
    }

    #[cfg(feature = "parallel")]
    fn encode_batch(&mut self) -> Result<Vec<(String, Vec<u8>)>, ExprError> {
        let (matrix_type, level) = (self.matrix_type, self.level);
        self.batch
            .par_drain(..)
            .map(|(symbol, values)| {
                let record = encode_record(&symbol, &values, matrix_type, level)?;
                Ok((symbol, record))
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn encode_batch(&mut self) -> Result<Vec<(String, Vec<u8>)>, ExprError> {
        let (matrix_type, level) = (self.matrix_type, self.level);
        self.batch
            .drain(..)
            .map(|(symbol, values)| {
                let record = encode_record(&symbol, &values, matrix_type, level)?;
                Ok((symbol, record))
            })
            .collect()
    }

    fn flush_batch(&mut self) -> Result<(), ExprError> {
        use std::io::Write;

        for (symbol, record) in self.encode_batch()? {
            let entry = IndexEntry {
                offset: self.file.position(),
                length: record.len() as u64,
            };
            self.file.write_all(&record)?;
            debug!("{}: {} compressed bytes at {}", symbol, entry.length, entry.offset);
            self.index.insert(symbol, entry);
        }
        Ok(())
    }

    /// Write the remaining records, commit the stream and return the index
    /// with the stream size.
    pub fn finish(mut self) -> Result<(ExpressionIndex, u64), ExprError> {
        self.flush_batch()?;
        let size = self.file.commit()?;
        Ok((self.index, size))
    }
}

fn warn_skipped(what: &str, count: usize, examples: &[String]) {
    if count > 0 {
        warn!(
            "Skipped {} expression matrix rows with {} (examples: {})",
            count,
            what,
            examples.join(", ")
        );
    }
}

/// Convert a gene-by-sample matrix into a record stream plus its JSON index.
///
/// `gene_map` translates row identifiers into symbols; without it the
/// identifiers are used as they are. `samples` restricts and reorders the
/// value columns.
pub fn convert_matrix<P, Q, R>(
    matrix_path: P,
    bin_path: Q,
    json_path: R,
    gene_map: Option<&GeneMap>,
    samples: Option<&[String]>,
    options: &ExprOptions,
) -> Result<ExprStats, ExprError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let matrix_path = matrix_path.as_ref();
    info!(
        "Converting {} to {}",
        matrix_path.display(),
        bin_path.as_ref().display()
    );

    let matrix_type = match options.matrix_type {
        Some(matrix_type) => matrix_type,
        None => detect_file_matrix_type(matrix_path, options.detect_rows)?,
    };
    info!("Numbers in matrix are of type {}", matrix_type);

    let mut reader = MatrixReader::open(matrix_path)?;
    if let Some(samples) = samples {
        reader.project(samples);
    }
    let sample_count = reader.row_len();

    let mut writer = ExpressionMatrixWriter::create(bin_path, matrix_type, options)?;
    let mut genes_read = 0;
    let mut unmapped = Vec::new();
    let mut duplicates = Vec::new();
    let (mut unmapped_count, mut duplicate_count) = (0, 0);
    let mut last_id = String::new();

    for row in reader {
        let row = row?;
        genes_read += 1;

        let symbol = match gene_map {
            Some(map) => map.lookup(&row.gene_id).map(str::to_string),
            None => Some(row.gene_id.clone()),
        };
        match symbol {
            None => {
                unmapped_count += 1;
                if unmapped.len() < MAX_REPORTED_IDS {
                    unmapped.push(row.gene_id.clone());
                }
            }
            Some(symbol) => {
                if !writer.push(&symbol, row.values)? {
                    duplicate_count += 1;
                    if duplicates.len() < MAX_REPORTED_IDS {
                        duplicates.push(format!("{} ({})", row.gene_id, symbol));
                    }
                }
            }
        }
        last_id = row.gene_id;

        if genes_read % PROGRESS_INTERVAL == 0 {
            info!("Read expression values for {} genes", genes_read);
        }
    }

    if writer.gene_count() == 0 {
        return Err(ExprError::NoGenesMapped { example: last_id });
    }

    let (index, bytes_written) = writer.finish()?;
    output::write_json(json_path, &index, false)?;

    warn_skipped("an unknown gene identifier", unmapped_count, &unmapped);
    warn_skipped("a duplicate gene symbol", duplicate_count, &duplicates);

    let stats = ExprStats {
        genes_read,
        genes_written: index.len(),
        unmapped: unmapped_count,
        duplicates: duplicate_count,
        sample_count,
        matrix_type,
        bytes_written,
    };
    info!("{}", stats);
    Ok(stats)
}
