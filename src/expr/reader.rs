//! Random access to converted genes.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::index::ExpressionIndex;
use super::matrix::MatrixType;
use super::record::{decode_record, ExpressionRecord};
use super::ExprError;

/// Random access to the genes of a converted matrix.
///
/// Reading a gene seeks to its offset, reads exactly its compressed length
/// and inflates that one record.
pub struct ExpressionReader<R> {
    stream: R,
    index: ExpressionIndex,
    matrix_type: MatrixType,
}

impl ExpressionReader<BufReader<File>> {
    /// Open a record stream and its JSON index.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        bin_path: P,
        json_path: Q,
        matrix_type: MatrixType,
    ) -> Result<Self, ExprError> {
        let index: ExpressionIndex =
            serde_json::from_reader(BufReader::new(File::open(json_path)?))?;
        let stream = BufReader::new(File::open(bin_path)?);
        Ok(Self::new(stream, index, matrix_type))
    }
}

impl<R: Read + Seek> ExpressionReader<R> {
    /// Wrap an already opened stream
    pub fn new(stream: R, index: ExpressionIndex, matrix_type: MatrixType) -> Self {
        Self {
            stream,
            index,
            matrix_type,
        }
    }

    /// The gene index
    pub fn index(&self) -> &ExpressionIndex {
        &self.index
    }

    /// Value type of the records
    pub fn matrix_type(&self) -> MatrixType {
        self.matrix_type
    }

    /// Read and decode one gene.
    pub fn gene(&mut self, symbol: &str) -> Result<ExpressionRecord, ExprError> {
        let entry = self
            .index
            .get(symbol)
            .ok_or_else(|| ExprError::UnknownGene(symbol.to_string()))?;
        self.stream.seek(SeekFrom::Start(entry.offset))?;
        let mut compressed = vec![0u8; entry.length as usize];
        self.stream.read_exact(&mut compressed)?;
        decode_record(&compressed, self.matrix_type)
    }
}
