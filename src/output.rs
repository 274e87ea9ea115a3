//! Atomic output files.
//!
//! Every artifact of a bundle is first written to a temporary file in the
//! destination directory and only renamed onto its final path once it has been
//! completely written and flushed. A run that aborts half way therefore never
//! leaves a truncated `exprMatrix.bin` or `dataset.json` behind.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

/// Buffered writer that lands on `path` only when [`AtomicFile::commit`] is called.
///
/// Dropping an uncommitted `AtomicFile` removes the temporary file.
pub struct AtomicFile {
    target: PathBuf,
    temp_file: NamedTempFile,
    writer: BufWriter<File>,
    written: u64,
}

impl AtomicFile {
    /// Create a temporary file next to `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let target = path.as_ref().to_path_buf();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp_file = NamedTempFile::new_in(&dir)?;
        let writer = BufWriter::new(temp_file.reopen()?);
        Ok(Self {
            target,
            temp_file,
            writer,
            written: 0,
        })
    }

    /// Final destination of this file.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Current write position, i.e. the number of bytes written so far.
    pub fn position(&self) -> u64 {
        self.written
    }

    /// Flush and rename the temporary file onto the target path.
    ///
    /// Returns the final size in bytes.
    pub fn commit(self) -> io::Result<u64> {
        let Self {
            target,
            temp_file,
            writer,
            ..
        } = self;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        let size = file.metadata()?.len();
        drop(file);
        temp_file.persist(&target).map_err(|e| e.error)?;
        Ok(size)
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.writer.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Serialize `value` as JSON and write it to `path` atomically.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    value: &T,
    pretty: bool,
) -> io::Result<u64> {
    let mut file = AtomicFile::create(path)?;
    if pretty {
        serde_json::to_writer_pretty(&mut file, value)?;
    } else {
        serde_json::to_writer(&mut file, value)?;
    }
    file.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commit_moves_into_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.bin");

        let mut file = AtomicFile::create(&path).unwrap();
        file.write_all(&[1, 2, 3]).unwrap();
        assert!(!path.exists());
        assert_eq!(file.position(), 3);

        let size = file.commit().unwrap();
        assert_eq!(size, 3);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_uncommitted_file_leaves_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exprMatrix.bin");
        {
            let mut file = AtomicFile::create(&path).unwrap();
            file.write_all(b"partial").unwrap();
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        write_json(&path, &vec![1, 2], false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1,2]");
    }
}
