//! Fixed-size row index over a line-oriented table.
//!
//! Each data line (the header is skipped) gets a six-byte entry: the `u32`
//! byte offset of the line start followed by the `u16` line length without
//! its `\n`, both little-endian. The client finds row `i` at `6 * i`.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;

use crate::output::AtomicFile;

/// Bytes per index entry
pub const ENTRY_SIZE: usize = 6;

/// Errors that can occur while building or using a row index
#[derive(Debug, thiserror::Error)]
pub enum RowIndexError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A line is too long for the two-byte length field
    #[error("line {line} is {length} bytes long, rows must be shorter than 65536 bytes")]
    LineTooLong {
        /// One-based line number
        line: u64,
        /// Line length without the newline
        length: usize,
    },

    /// A line starts beyond what the four-byte offset can address
    #[error("line {line} starts at byte {offset}, beyond the 4 GiB the index can address")]
    OffsetOverflow {
        /// One-based line number
        line: u64,
        /// Byte offset of the line
        offset: u64,
    },

    /// A data line is empty
    #[error("line {line} is empty")]
    EmptyLine {
        /// One-based line number
        line: u64,
    },

    /// The index file size is not a multiple of the entry size
    #[error("row index of {0} bytes is not a multiple of 6")]
    Truncated(usize),

    /// Row number past the end of the index
    #[error("row {row} requested, but the table has {count} rows")]
    RowOutOfRange {
        /// Zero-based row requested
        row: usize,
        /// Number of indexed rows
        count: usize,
    },
}

/// Location of one data line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIndexEntry {
    /// Byte offset of the first character of the line
    pub offset: u32,
    /// Line length in bytes, newline excluded
    pub length: u16,
}

impl RowIndexEntry {
    /// Append the entry in its on-disk layout
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u16::<LittleEndian>(self.length)
    }

    /// Read one entry
    pub fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let offset = reader.read_u32::<LittleEndian>()?;
        let length = reader.read_u16::<LittleEndian>()?;
        Ok(Self { offset, length })
    }
}

/// Index every data line of `reader`.
///
/// Offsets come from the reader's stream position rather than from summing
/// line lengths, so they stay exact whatever the line endings are.
pub fn build_row_index<R: BufRead + Seek>(mut reader: R) -> Result<Vec<RowIndexEntry>, RowIndexError> {
    let mut entries = Vec::new();
    let mut line = Vec::new();
    let mut line_no = 0u64;

    loop {
        let start = reader.stream_position()?;
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_no += 1;
        if line_no == 1 {
            continue;
        }

        let length = line.len() - usize::from(line.last() == Some(&b'\n'));
        if length == 0 {
            return Err(RowIndexError::EmptyLine { line: line_no });
        }
        let length = u16::try_from(length).map_err(|_| RowIndexError::LineTooLong {
            line: line_no,
            length,
        })?;
        let offset = u32::try_from(start).map_err(|_| RowIndexError::OffsetOverflow {
            line: line_no,
            offset: start,
        })?;
        entries.push(RowIndexEntry { offset, length });
    }
    Ok(entries)
}

/// Index the table at `table_path` and write the entries to `index_path`.
///
/// Returns the number of indexed rows.
pub fn write_row_index<P: AsRef<Path>, Q: AsRef<Path>>(
    table_path: P,
    index_path: Q,
) -> Result<usize, RowIndexError> {
    let table_path = table_path.as_ref();
    info!(
        "Indexing {} to {}",
        table_path.display(),
        index_path.as_ref().display()
    );
    let entries = build_row_index(BufReader::new(File::open(table_path)?))?;

    let mut file = AtomicFile::create(index_path)?;
    for entry in &entries {
        entry.write_to(&mut file)?;
    }
    file.commit()?;
    Ok(entries.len())
}

/// A loaded row index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    entries: Vec<RowIndexEntry>,
}

impl RowIndex {
    /// Wrap entries built in memory
    pub fn new(entries: Vec<RowIndexEntry>) -> Self {
        Self { entries }
    }

    /// Parse an index file's bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RowIndexError> {
        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(RowIndexError::Truncated(bytes.len()));
        }
        let mut cursor = std::io::Cursor::new(bytes);
        let entries = (0..bytes.len() / ENTRY_SIZE)
            .map(|_| RowIndexEntry::read_from(&mut cursor))
            .collect::<std::io::Result<_>>()?;
        Ok(Self { entries })
    }

    /// Load an index file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RowIndexError> {
        Self::from_bytes(&std::fs::read(path)?)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of row `row`
    pub fn get(&self, row: usize) -> Option<RowIndexEntry> {
        self.entries.get(row).copied()
    }

    /// Read the text of data row `row` (zero-based) from `table`.
    pub fn read_row<R: Read + Seek>(&self, table: &mut R, row: usize) -> Result<String, RowIndexError> {
        let entry = self.get(row).ok_or(RowIndexError::RowOutOfRange {
            row,
            count: self.entries.len(),
        })?;
        table.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        let mut buf = vec![0u8; usize::from(entry.length)];
        table.read_exact(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        Ok(text.trim_end_matches('\r').to_string())
    }
}
